use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Entry in a merchant's audit trail.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuditLog {
    pub id: i32,
    pub merchant_id: i32,
    pub staff_id: Option<i32>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub merchant_id: i32,
    pub staff_id: Option<i32>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub details: Value,
}

impl NewAuditLog {
    pub fn new(
        merchant_id: i32,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl ToString,
    ) -> Self {
        Self {
            merchant_id,
            staff_id: None,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            details: Value::Object(Default::default()),
        }
    }

    pub fn by_staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
