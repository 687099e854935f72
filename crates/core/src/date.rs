//! Calendar dates stored in `Date.value_us`
//!
//! `value_us` holds the date as a `YYYYMMDD` integer (`19900101` for
//! 1 January 1990), not a microsecond timestamp.

use chrono::{Datelike, NaiveDate};

use crate::error::RecordError;
use crate::record::Record;
use crate::schema::types;

/// `YYYYMMDD` integer for a calendar date
pub fn date_value(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Calendar date from a `YYYYMMDD` integer
pub fn parse_date_value(value: i64) -> Result<NaiveDate, RecordError> {
    let invalid = || RecordError::SchemaViolation(format!("{} is not a YYYYMMDD date", value));
    if value < 0 {
        return Err(invalid());
    }
    let year = i32::try_from(value / 10_000).map_err(|_| invalid())?;
    let month = (value / 100 % 100) as u32;
    let day = (value % 100) as u32;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

impl Record {
    /// Set a `Date` field from a calendar date
    pub fn set_date(&mut self, field_name: &str, date: NaiveDate) -> Result<&mut Self, RecordError> {
        let mut value = Record::of_type(types::DATE)?;
        value.set_scalar("value_us", date_value(date))?;
        self.set_message(field_name, value)
    }

    /// Read a `Date` field as a calendar date; `Ok(None)` when unset
    pub fn date(&self, field_name: &str) -> Result<Option<NaiveDate>, RecordError> {
        match self.message(field_name).and_then(|d| d.int64("value_us")) {
            Some(value) => parse_date_value(value).map(Some),
            None => Ok(None),
        }
    }
}
