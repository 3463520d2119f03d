use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::booking::{random_base36, to_base36};

/// How points accrue on a paid invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyKind {
    Visit,
    Spend,
}

impl LoyaltyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyKind::Visit => "visit",
            LoyaltyKind::Spend => "spend",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("spend") {
            LoyaltyKind::Spend
        } else {
            LoyaltyKind::Visit
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoyaltyProgram {
    pub id: i32,
    pub merchant_id: i32,
    pub kind: LoyaltyKind,
    pub points_per_visit: i32,
    pub points_per_dollar: i32,
    pub reward_threshold: i32,
    pub reward_value_cents: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LoyaltyProgram {
    /// Points earned for a paid invoice of `total_cents`.
    pub fn points_for(&self, total_cents: i64) -> i32 {
        match self.kind {
            LoyaltyKind::Visit => self.points_per_visit,
            LoyaltyKind::Spend => {
                let points = total_cents
                    .max(0)
                    .checked_mul(i64::from(self.points_per_dollar))
                    .map_or(i64::MAX, |points| points / 100);
                i32::try_from(points).unwrap_or(i32::MAX)
            }
        }
    }

    /// Value of the rewards a balance of `points` unlocks.
    pub fn reward_value_cents(&self, points: i32) -> i64 {
        if self.reward_threshold <= 0 || points <= 0 {
            return 0;
        }
        i64::from(points / self.reward_threshold).saturating_mul(self.reward_value_cents)
    }
}

/// Program settings written by `PUT /v1/loyalty/program`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyaltyProgramSettings {
    pub merchant_id: i32,
    pub kind: LoyaltyKind,
    pub points_per_visit: i32,
    pub points_per_dollar: i32,
    pub reward_threshold: i32,
    pub reward_value_cents: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyCardStatus {
    Active,
    Suspended,
}

impl LoyaltyCardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyCardStatus::Active => "active",
            LoyaltyCardStatus::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("suspended") {
            LoyaltyCardStatus::Suspended
        } else {
            LoyaltyCardStatus::Active
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoyaltyCard {
    pub id: i32,
    pub merchant_id: i32,
    pub customer_id: i32,
    pub card_number: String,
    pub points: i32,
    pub lifetime_points: i32,
    pub status: LoyaltyCardStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoyaltyCard {
    pub merchant_id: i32,
    pub customer_id: i32,
    pub card_number: String,
}

/// Card reference: `LC`, base-36 millis, four random chars.
pub fn generate_card_number<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> String {
    let millis = now.and_utc().timestamp_millis().max(0) as u64;
    format!("LC{}{}", to_base36(millis), random_base36(rng, 4))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTransactionKind {
    Earned,
    Redeemed,
    Adjusted,
}

impl LoyaltyTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTransactionKind::Earned => "earned",
            LoyaltyTransactionKind::Redeemed => "redeemed",
            LoyaltyTransactionKind::Adjusted => "adjusted",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("redeemed") {
            LoyaltyTransactionKind::Redeemed
        } else if value.eq_ignore_ascii_case("adjusted") {
            LoyaltyTransactionKind::Adjusted
        } else {
            LoyaltyTransactionKind::Earned
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoyaltyTransaction {
    pub id: i32,
    pub card_id: i32,
    pub kind: LoyaltyTransactionKind,
    /// Signed; redemptions and deductions are negative.
    pub points: i32,
    pub description: String,
    pub invoice_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoyaltyTransaction {
    pub card_id: i32,
    pub kind: LoyaltyTransactionKind,
    pub points: i32,
    pub description: String,
    pub invoice_id: Option<i32>,
}

/// Points redemption request for a customer's card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyaltyRedemption {
    pub merchant_id: i32,
    pub customer_id: i32,
    pub points: i32,
    pub description: String,
}

/// Manual correction of a customer's balance by staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyaltyAdjustment {
    pub merchant_id: i32,
    pub customer_id: i32,
    /// Signed; negative values deduct points.
    pub points: i32,
    pub reason: String,
}

/// Card state as seen from a customer's profile.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CustomerLoyalty {
    pub card: Option<LoyaltyCard>,
    pub transactions: Vec<LoyaltyTransaction>,
    pub reward_value_available_cents: i64,
}

/// Result of a redemption checked inside its transaction.
#[derive(Debug, Clone)]
pub enum RedemptionOutcome {
    Redeemed {
        card: LoyaltyCard,
        transaction: LoyaltyTransaction,
    },
    Rejected(String),
}

/// Result of a manual adjustment checked inside its transaction.
#[derive(Debug, Clone)]
pub enum AdjustmentOutcome {
    Adjusted {
        card: LoyaltyCard,
        transaction: LoyaltyTransaction,
    },
    Rejected(String),
}
