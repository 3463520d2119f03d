use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::loyalty::{
    LoyaltyCard as DomainLoyaltyCard, LoyaltyCardStatus, LoyaltyKind,
    LoyaltyProgram as DomainLoyaltyProgram, LoyaltyProgramSettings,
    LoyaltyTransaction as DomainLoyaltyTransaction, LoyaltyTransactionKind,
    NewLoyaltyCard as DomainNewLoyaltyCard, NewLoyaltyTransaction as DomainNewLoyaltyTransaction,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::loyalty_programs)]
pub struct LoyaltyProgram {
    pub id: i32,
    pub merchant_id: i32,
    pub kind: String,
    pub points_per_visit: i32,
    pub points_per_dollar: i32,
    pub reward_threshold: i32,
    pub reward_value_cents: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insert and upsert payload for a merchant's program.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::loyalty_programs)]
pub struct LoyaltyProgramRow<'a> {
    pub merchant_id: i32,
    pub kind: &'a str,
    pub points_per_visit: i32,
    pub points_per_dollar: i32,
    pub reward_threshold: i32,
    pub reward_value_cents: i64,
    pub is_active: bool,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::loyalty_cards)]
pub struct LoyaltyCard {
    pub id: i32,
    pub merchant_id: i32,
    pub customer_id: i32,
    pub card_number: String,
    pub points: i32,
    pub lifetime_points: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::loyalty_cards)]
pub struct NewLoyaltyCard<'a> {
    pub merchant_id: i32,
    pub customer_id: i32,
    pub card_number: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::loyalty_transactions)]
pub struct LoyaltyTransaction {
    pub id: i32,
    pub card_id: i32,
    pub kind: String,
    pub points: i32,
    pub description: String,
    pub invoice_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::loyalty_transactions)]
pub struct NewLoyaltyTransaction<'a> {
    pub card_id: i32,
    pub kind: &'a str,
    pub points: i32,
    pub description: &'a str,
    pub invoice_id: Option<i32>,
}

impl From<LoyaltyProgram> for DomainLoyaltyProgram {
    fn from(value: LoyaltyProgram) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            kind: LoyaltyKind::parse(&value.kind),
            points_per_visit: value.points_per_visit,
            points_per_dollar: value.points_per_dollar,
            reward_threshold: value.reward_threshold,
            reward_value_cents: value.reward_value_cents,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> LoyaltyProgramRow<'a> {
    pub fn from_domain(value: &'a LoyaltyProgramSettings, now: NaiveDateTime) -> Self {
        Self {
            merchant_id: value.merchant_id,
            kind: value.kind.as_str(),
            points_per_visit: value.points_per_visit,
            points_per_dollar: value.points_per_dollar,
            reward_threshold: value.reward_threshold,
            reward_value_cents: value.reward_value_cents,
            is_active: value.is_active,
            updated_at: now,
        }
    }
}

impl From<LoyaltyCard> for DomainLoyaltyCard {
    fn from(value: LoyaltyCard) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            customer_id: value.customer_id,
            card_number: value.card_number,
            points: value.points,
            lifetime_points: value.lifetime_points,
            status: LoyaltyCardStatus::parse(&value.status),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewLoyaltyCard> for NewLoyaltyCard<'a> {
    fn from(value: &'a DomainNewLoyaltyCard) -> Self {
        Self {
            merchant_id: value.merchant_id,
            customer_id: value.customer_id,
            card_number: value.card_number.as_str(),
        }
    }
}

impl From<LoyaltyTransaction> for DomainLoyaltyTransaction {
    fn from(value: LoyaltyTransaction) -> Self {
        Self {
            id: value.id,
            card_id: value.card_id,
            kind: LoyaltyTransactionKind::parse(&value.kind),
            points: value.points,
            description: value.description,
            invoice_id: value.invoice_id,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewLoyaltyTransaction> for NewLoyaltyTransaction<'a> {
    fn from(value: &'a DomainNewLoyaltyTransaction) -> Self {
        Self {
            card_id: value.card_id,
            kind: value.kind.as_str(),
            points: value.points,
            description: value.description.as_str(),
            invoice_id: value.invoice_id,
        }
    }
}
