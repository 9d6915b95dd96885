use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::error::{CronError, Result};

/// Upper bound on the forward scan, in minutes (~one year).
///
/// A schedule with no occurrence inside the bound is treated as having no
/// next run at all.
pub const SCAN_LIMIT_MINUTES: u32 = 525_960;

/// A validated cron expression with each field expanded to its concrete
/// value set.
///
/// Sets are sorted and deduplicated at parse time; day-of-week 7 is
/// normalised to 0 (both mean Sunday). Evaluation requires a timestamp to
/// match **all five** sets — see the crate docs for the day-field
/// conjunction semantics.
#[derive(Debug, Clone)]
pub struct CronExpression {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days_of_month: Vec<u32>,
    months: Vec<u32>,
    days_of_week: Vec<u32>,
    source: String,
}

impl CronExpression {
    /// Parse and validate a 5-field expression.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount {
                found: fields.len(),
            });
        }

        let minutes = parse_field("minute", fields[0], 0, 59)?;
        let hours = parse_field("hour", fields[1], 0, 23)?;
        let days_of_month = parse_field("day-of-month", fields[2], 1, 31)?;
        let months = parse_field("month", fields[3], 1, 12)?;
        // 0 and 7 both denote Sunday; fold to 0 after expansion.
        let days_of_week: BTreeSet<u32> = parse_field("day-of-week", fields[4], 0, 7)?
            .into_iter()
            .map(|d| d % 7)
            .collect();

        Ok(Self {
            minutes: minutes.into_iter().collect(),
            hours: hours.into_iter().collect(),
            days_of_month: days_of_month.into_iter().collect(),
            months: months.into_iter().collect(),
            days_of_week: days_of_week.into_iter().collect(),
            source: expr.to_string(),
        })
    }

    /// The original expression string.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `t`'s minute, hour, day-of-month, month and day-of-week all
    /// belong to their expanded sets.
    pub fn matches(&self, t: DateTime<Utc>) -> bool {
        contains(&self.months, t.month())
            && contains(&self.days_of_month, t.day())
            && contains(&self.days_of_week, t.weekday().num_days_from_sunday())
            && contains(&self.hours, t.hour())
            && contains(&self.minutes, t.minute())
    }

    /// Earliest matching minute strictly after `from` (seconds zeroed),
    /// or `None` if the bounded scan finds nothing within ~one year.
    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = from.with_second(0)?.with_nanosecond(0)?;
        let mut candidate = start + Duration::minutes(1);
        for _ in 0..SCAN_LIMIT_MINUTES {
            if self.matches(candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }

    /// Earliest matching minute after the current instant.
    pub fn next(&self) -> Option<DateTime<Utc>> {
        self.next_after(Utc::now())
    }
}

/// `true` when `expr` is a syntactically valid 5-field expression.
///
/// Never panics; every malformed input yields `false`.
pub fn is_valid(expr: &str) -> bool {
    CronExpression::parse(expr).is_ok()
}

fn contains(set: &[u32], value: u32) -> bool {
    set.binary_search(&value).is_ok()
}

/// Expand one field (a comma list of `*`, integers, ranges, and steps)
/// into its value set.
fn parse_field(field: &'static str, spec: &str, min: u32, max: u32) -> Result<BTreeSet<u32>> {
    let mut values = BTreeSet::new();
    // A list is valid only if every sub-token is valid on its own.
    for token in spec.split(',') {
        expand_token(field, token, min, max, &mut values)?;
    }
    Ok(values)
}

fn expand_token(
    field: &'static str,
    token: &str,
    min: u32,
    max: u32,
    out: &mut BTreeSet<u32>,
) -> Result<()> {
    if let Some((base, step_str)) = token.split_once('/') {
        let step = parse_int(field, step_str)? as usize;
        if step == 0 {
            return Err(CronError::ZeroStep { field });
        }
        // The step base must be `*` or a range; a bare integer has no
        // expansion to step over.
        let (start, end) = if base == "*" {
            (min, max)
        } else if base.contains('-') {
            parse_range(field, base, min, max)?
        } else {
            return Err(CronError::InvalidToken {
                field,
                token: token.to_string(),
            });
        };
        out.extend((start..=end).step_by(step));
        return Ok(());
    }

    if token == "*" {
        out.extend(min..=max);
        return Ok(());
    }

    if token.contains('-') {
        let (start, end) = parse_range(field, token, min, max)?;
        out.extend(start..=end);
        return Ok(());
    }

    let value = parse_int(field, token)?;
    check_range(field, value, min, max)?;
    out.insert(value);
    Ok(())
}

fn parse_range(field: &'static str, token: &str, min: u32, max: u32) -> Result<(u32, u32)> {
    let (a, b) = token.split_once('-').ok_or_else(|| CronError::InvalidToken {
        field,
        token: token.to_string(),
    })?;
    let start = parse_int(field, a)?;
    let end = parse_int(field, b)?;
    check_range(field, start, min, max)?;
    check_range(field, end, min, max)?;
    if start > end {
        return Err(CronError::DescendingRange { field, start, end });
    }
    Ok((start, end))
}

fn parse_int(field: &'static str, token: &str) -> Result<u32> {
    token.parse::<u32>().map_err(|_| CronError::InvalidToken {
        field,
        token: token.to_string(),
    })
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(CronError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
