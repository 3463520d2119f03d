use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::audit::{AuditLog as DomainAuditLog, NewAuditLog as DomainNewAuditLog};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::audit_logs)]
pub struct AuditLog {
    pub id: i32,
    pub merchant_id: i32,
    pub staff_id: Option<i32>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::audit_logs)]
pub struct NewAuditLog<'a> {
    pub merchant_id: i32,
    pub staff_id: Option<i32>,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: &'a str,
    pub details: String,
}

impl From<AuditLog> for DomainAuditLog {
    fn from(value: AuditLog) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            staff_id: value.staff_id,
            action: value.action,
            entity_type: value.entity_type,
            entity_id: value.entity_id,
            details: serde_json::from_str(&value.details).unwrap_or_default(),
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewAuditLog> for NewAuditLog<'a> {
    fn from(value: &'a DomainNewAuditLog) -> Self {
        Self {
            merchant_id: value.merchant_id,
            staff_id: value.staff_id,
            action: value.action.as_str(),
            entity_type: value.entity_type.as_str(),
            entity_id: value.entity_id.as_str(),
            details: value.details.to_string(),
        }
    }
}
