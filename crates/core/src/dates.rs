//! Calendar date ranges
//!
//! Expands an inclusive start/end pair into the list of calendar days it
//! covers. All arithmetic is done on civil dates, so month ends, leap years
//! and daylight-saving changes need no special handling.

use jiff::civil::Date;

use crate::error::{Error, Result};

/// An inclusive range of calendar days, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Create a range, failing if `start` is after `end`
    pub fn new(start: Date, end: Date) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Every day from start to end, ascending
    pub fn days(&self) -> Result<Vec<Date>> {
        let mut days = Vec::new();
        let mut day = self.start;
        loop {
            days.push(day);
            if day == self.end {
                break;
            }
            day = day
                .tomorrow()
                .map_err(|e| Error::Validation(format!("Date out of range: {e}")))?;
        }
        Ok(days)
    }
}

/// Expand optional start/end dates into the days they cover
///
/// No start means no dates at all. No end means a single-day range.
pub fn expand(start: Option<Date>, end: Option<Date>) -> Result<Vec<Date>> {
    let Some(start) = start else {
        return Ok(Vec::new());
    };
    let end = end.unwrap_or(start);
    DateRange::new(start, end)?.days()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<Date> {
    let input = input.trim();
    let well_formed = input.len() == 10
        && input
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_formed {
        return Err(Error::Validation(format!(
            "Invalid date '{input}': expected YYYY-MM-DD"
        )));
    }
    input
        .parse::<Date>()
        .map_err(|e| Error::Validation(format!("Invalid date '{input}': {e}")))
}
