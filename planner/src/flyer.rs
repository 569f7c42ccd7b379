//! Flyer distribution time slots attached to `flyers` strategies.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[cfg(test)]
#[path = "flyer_test.rs"]
mod flyer_test;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_time_range"))]
pub struct FlyerTimeSlot {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub confirmed: bool,
}

impl FlyerTimeSlot {
    #[must_use]
    pub fn new(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime, location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            start_time,
            end_time,
            location: location.into(),
            assignees: Vec::new(),
            confirmed: false,
        }
    }

    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

fn check_time_range(slot: &FlyerTimeSlot) -> Result<(), ValidationError> {
    if slot.end_time <= slot.start_time {
        return Err(ValidationError::new("end_before_start"));
    }
    Ok(())
}
