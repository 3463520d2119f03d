use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::staff_block::{NewStaffBlock, StaffBlockListQuery};
use crate::forms::{deserialize_instant, deserialize_optional_instant, optional_inline};

#[derive(Debug, Error)]
pub enum StaffBlockFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("block must end after it starts")]
    EndBeforeStart,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddStaffBlockForm {
    pub staff_id: i32,
    #[serde(deserialize_with = "deserialize_instant")]
    pub start_time: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_instant")]
    pub end_time: NaiveDateTime,
    #[validate(length(max = 256))]
    pub reason: Option<String>,
}

impl AddStaffBlockForm {
    pub fn into_new_block(self, merchant_id: i32) -> Result<NewStaffBlock, StaffBlockFormError> {
        self.validate()?;
        if self.end_time <= self.start_time {
            return Err(StaffBlockFormError::EndBeforeStart);
        }
        Ok(NewStaffBlock {
            merchant_id,
            staff_id: self.staff_id,
            start_time: self.start_time,
            end_time: self.end_time,
            reason: optional_inline(self.reason.as_deref()),
        })
    }
}

/// `GET /v1/staff-blocks` filters.
#[derive(Debug, Default, Deserialize)]
pub struct StaffBlockQueryParams {
    pub staff_id: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub from: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub to: Option<NaiveDateTime>,
}

impl StaffBlockQueryParams {
    pub fn into_query(self, merchant_id: i32) -> StaffBlockListQuery {
        let mut query = StaffBlockListQuery::new(merchant_id);
        query.staff_id = self.staff_id;
        query.from = self.from;
        query.to = self.to;
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_rfc3339_and_rejects_reversed_ranges() {
        let form: AddStaffBlockForm = serde_json::from_value(json!({
            "staff_id": 3,
            "start_time": "2025-03-03T01:00:00Z",
            "end_time": "2025-03-03T02:30:00Z",
            "reason": " lunch "
        }))
        .unwrap();
        let block = form.into_new_block(1).unwrap();
        assert_eq!(block.reason.as_deref(), Some("lunch"));
        assert_eq!((block.end_time - block.start_time).num_minutes(), 90);

        let form: AddStaffBlockForm = serde_json::from_value(json!({
            "staff_id": 3,
            "start_time": "2025-03-03T02:00:00Z",
            "end_time": "2025-03-03T02:00:00Z"
        }))
        .unwrap();
        assert!(matches!(
            form.into_new_block(1),
            Err(StaffBlockFormError::EndBeforeStart)
        ));
    }
}
