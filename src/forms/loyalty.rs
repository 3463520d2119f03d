use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::invoice::MAX_AMOUNT_CENTS;
use crate::domain::loyalty::{
    LoyaltyAdjustment, LoyaltyKind, LoyaltyProgramSettings, LoyaltyRedemption,
};
use crate::forms::optional_inline;

#[derive(Debug, Error)]
pub enum LoyaltyFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("unknown program kind `{0}`")]
    InvalidKind(String),
    #[error("adjustment must change the balance")]
    ZeroAdjustment,
    #[error("a reason is required")]
    MissingReason,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoyaltyProgramForm {
    pub kind: String,
    #[validate(range(min = 0, max = 10000))]
    pub points_per_visit: Option<i32>,
    #[validate(range(min = 0, max = 10000))]
    pub points_per_dollar: Option<i32>,
    #[validate(range(min = 1))]
    pub reward_threshold: i32,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub reward_value_cents: i64,
    pub is_active: Option<bool>,
}

impl LoyaltyProgramForm {
    pub fn into_settings(self, merchant_id: i32) -> Result<LoyaltyProgramSettings, LoyaltyFormError> {
        self.validate()?;
        let kind = match self.kind.trim().to_ascii_lowercase().as_str() {
            "visit" => LoyaltyKind::Visit,
            "spend" => LoyaltyKind::Spend,
            _ => return Err(LoyaltyFormError::InvalidKind(self.kind)),
        };
        Ok(LoyaltyProgramSettings {
            merchant_id,
            kind,
            points_per_visit: self.points_per_visit.unwrap_or(1),
            points_per_dollar: self.points_per_dollar.unwrap_or(1),
            reward_threshold: self.reward_threshold,
            reward_value_cents: self.reward_value_cents,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RedeemPointsForm {
    #[validate(range(min = 1))]
    pub points: i32,
    #[validate(length(max = 256))]
    pub description: Option<String>,
}

impl RedeemPointsForm {
    pub fn into_redemption(
        self,
        merchant_id: i32,
        customer_id: i32,
    ) -> Result<LoyaltyRedemption, LoyaltyFormError> {
        self.validate()?;
        Ok(LoyaltyRedemption {
            merchant_id,
            customer_id,
            points: self.points,
            description: optional_inline(self.description.as_deref())
                .unwrap_or_else(|| "Points redeemed".to_string()),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustPointsForm {
    /// Positive to credit, negative to deduct.
    #[validate(range(min = -1_000_000, max = 1_000_000))]
    pub points: i32,
    #[validate(length(min = 1, max = 256))]
    pub reason: String,
}

impl AdjustPointsForm {
    pub fn into_adjustment(
        self,
        merchant_id: i32,
        customer_id: i32,
    ) -> Result<LoyaltyAdjustment, LoyaltyFormError> {
        self.validate()?;
        if self.points == 0 {
            return Err(LoyaltyFormError::ZeroAdjustment);
        }
        let reason =
            optional_inline(Some(self.reason.as_str())).ok_or(LoyaltyFormError::MissingReason)?;
        Ok(LoyaltyAdjustment {
            merchant_id,
            customer_id,
            points: self.points,
            reason,
        })
    }
}
