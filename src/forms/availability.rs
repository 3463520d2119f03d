use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::forms::{deserialize_instant, parse_date};

/// Longest range accepted by the staff availability endpoint.
pub const MAX_AVAILABILITY_DAYS: i64 = 31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvailabilityFormError {
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("`to` must not be before `from`")]
    ReversedRange,
    #[error("Date range cannot exceed 31 days")]
    RangeTooLong,
    #[error("`end` must be after `start`")]
    EmptyWindow,
}

/// `GET /v1/availability` query: local dates, inclusive.
#[derive(Debug, Deserialize)]
pub struct AvailabilityQueryParams {
    pub staff_id: i32,
    pub service_id: i32,
    pub from: String,
    pub to: String,
}

impl AvailabilityQueryParams {
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), AvailabilityFormError> {
        let from = parse_date(&self.from)
            .ok_or_else(|| AvailabilityFormError::InvalidDate(self.from.clone()))?;
        let to =
            parse_date(&self.to).ok_or_else(|| AvailabilityFormError::InvalidDate(self.to.clone()))?;
        if to < from {
            return Err(AvailabilityFormError::ReversedRange);
        }
        if (to - from).num_days() + 1 > MAX_AVAILABILITY_DAYS {
            return Err(AvailabilityFormError::RangeTooLong);
        }
        Ok((from, to))
    }
}

/// `GET /v1/public/availability` query for a single local date.
#[derive(Debug, Deserialize)]
pub struct PublicAvailabilityQueryParams {
    pub service_id: i32,
    pub date: String,
    pub staff_id: Option<i32>,
}

impl PublicAvailabilityQueryParams {
    pub fn local_date(&self) -> Result<NaiveDate, AvailabilityFormError> {
        parse_date(&self.date).ok_or_else(|| AvailabilityFormError::InvalidDate(self.date.clone()))
    }
}

/// `GET /v1/availability/capacity` window in UTC.
#[derive(Debug, Deserialize)]
pub struct CapacityQueryParams {
    #[serde(deserialize_with = "deserialize_instant")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_instant")]
    pub end: NaiveDateTime,
}

impl CapacityQueryParams {
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime), AvailabilityFormError> {
        if self.end <= self.start {
            return Err(AvailabilityFormError::EmptyWindow);
        }
        Ok((self.start, self.end))
    }
}
