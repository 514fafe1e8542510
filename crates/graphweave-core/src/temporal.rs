//! Temporal comparison-value handling
//!
//! Duration filter values cannot be compared directly in Cypher; they are
//! decomposed into calendar and clock components and re-assembled with the
//! `duration()` function inside the generated program. Datetime comparison
//! values are validated eagerly so that a bad literal fails the compile
//! instead of the database call.

use crate::error::{Error, Result};
use crate::value::CypherValue;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A duration decomposed into the components Cypher's `duration()` accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationComponents {
    /// Calendar months (years fold into months)
    pub months: i64,

    /// Calendar days (weeks fold into days)
    pub days: i64,

    /// Clock seconds (hours and minutes fold into seconds)
    pub seconds: i64,

    /// Sub-second part in nanoseconds
    pub nanoseconds: i64,
}

impl DurationComponents {
    /// Parse a duration comparison value.
    ///
    /// Accepts either an ISO-8601 duration string (`"P1Y2M3DT4H5M6S"`) or a
    /// component map (`{ "months": 14, "days": 3, ... }`).
    pub fn from_json(field: &str, value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse_iso(s).ok_or_else(|| {
                Error::InvalidComparisonValue {
                    field: field.to_string(),
                    detail: format!("`{s}` is not an ISO-8601 duration"),
                }
            }),
            serde_json::Value::Object(map) => {
                let mut components = DurationComponents::default();
                for (key, raw) in map {
                    let n = raw.as_i64().ok_or_else(|| Error::InvalidComparisonValue {
                        field: field.to_string(),
                        detail: format!("duration component `{key}` must be an integer"),
                    })?;
                    match key.as_str() {
                        "months" => components.months = n,
                        "days" => components.days = n,
                        "seconds" => components.seconds = n,
                        "nanoseconds" => components.nanoseconds = n,
                        other => {
                            return Err(Error::InvalidComparisonValue {
                                field: field.to_string(),
                                detail: format!("unknown duration component `{other}`"),
                            });
                        }
                    }
                }
                Ok(components)
            }
            other => Err(Error::InvalidComparisonValue {
                field: field.to_string(),
                detail: format!("cannot build a duration from {other}"),
            }),
        }
    }

    /// Parse an ISO-8601 duration string into components.
    ///
    /// Returns `None` when the string is not a valid duration.
    pub fn parse_iso(input: &str) -> Option<Self> {
        let rest = input.strip_prefix('P')?;
        if rest.is_empty() {
            return None;
        }
        let (date_part, time_part) = match rest.split_once('T') {
            Some((d, t)) if !t.is_empty() => (d, Some(t)),
            Some(_) => return None,
            None => (rest, None),
        };

        let mut components = DurationComponents::default();
        let mut saw_designator = false;

        for (number, designator) in split_designators(date_part)? {
            saw_designator = true;
            let number: i64 = number.parse().ok()?;
            match designator {
                'Y' => components.months = components.months.checked_add(number.checked_mul(12)?)?,
                'M' => components.months = components.months.checked_add(number)?,
                'W' => components.days = components.days.checked_add(number.checked_mul(7)?)?,
                'D' => components.days = components.days.checked_add(number)?,
                _ => return None,
            }
        }

        if let Some(time_part) = time_part {
            for (number, designator) in split_designators(time_part)? {
                saw_designator = true;
                let seconds = match designator {
                    'H' => number.parse::<i64>().ok()?.checked_mul(3600)?,
                    'M' => number.parse::<i64>().ok()?.checked_mul(60)?,
                    'S' => {
                        let (seconds, nanoseconds) = parse_seconds(&number)?;
                        components.nanoseconds =
                            components.nanoseconds.checked_add(nanoseconds)?;
                        seconds
                    }
                    _ => return None,
                };
                components.seconds = components.seconds.checked_add(seconds)?;
            }
        }

        saw_designator.then_some(components)
    }

    /// Convert to the map value that backs the `duration($param)` call.
    pub fn to_value(self) -> CypherValue {
        let mut map = BTreeMap::new();
        map.insert("months".to_string(), CypherValue::Integer(self.months));
        map.insert("days".to_string(), CypherValue::Integer(self.days));
        map.insert("seconds".to_string(), CypherValue::Integer(self.seconds));
        map.insert(
            "nanoseconds".to_string(),
            CypherValue::Integer(self.nanoseconds),
        );
        CypherValue::Map(map)
    }
}

/// Split `"1Y2M"` into `[("1", 'Y'), ("2", 'M')]`, leaving the numbers raw
/// so the seconds designator can carry a decimal fraction.
fn split_designators(part: &str) -> Option<Vec<(String, char)>> {
    let mut result = Vec::new();
    let mut digits = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() || c == '-' || c == '.' {
            digits.push(c);
        } else if c.is_ascii_uppercase() {
            if digits.is_empty() {
                return None;
            }
            result.push((std::mem::take(&mut digits), c));
        } else {
            return None;
        }
    }
    digits.is_empty().then_some(result)
}

/// Parse a seconds value like `"1"` or `"-1.5"` into whole seconds and a
/// nanosecond remainder carrying the same sign.
fn parse_seconds(raw: &str) -> Option<(i64, i64)> {
    let (negative, raw) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) if !f.is_empty() => (w, f),
        Some(_) => return None,
        None => (raw, ""),
    };
    if fraction.len() > 9 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let seconds: i64 = whole.parse().ok()?;
    let nanoseconds = if fraction.is_empty() {
        0
    } else {
        fraction.parse::<i64>().ok()? * 10i64.pow(9 - fraction.len() as u32)
    };
    if negative {
        Some((-seconds, -nanoseconds))
    } else {
        Some((seconds, nanoseconds))
    }
}

/// Validate a datetime comparison value.
///
/// String literals must be RFC 3339 timestamps; anything else is rejected at
/// compile time with the offending field name.
pub fn validate_datetime(field: &str, value: &serde_json::Value) -> Result<()> {
    let s = value
        .as_str()
        .ok_or_else(|| Error::InvalidComparisonValue {
            field: field.to_string(),
            detail: "datetime comparison values must be strings".to_string(),
        })?;
    DateTime::parse_from_rfc3339(s)
        .map(|_| ())
        .map_err(|e| Error::InvalidComparisonValue {
            field: field.to_string(),
            detail: format!("`{s}` is not a valid datetime: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_iso_full() {
        let d = DurationComponents::parse_iso("P1Y2M3DT4H5M6S").unwrap();
        assert_eq!(d.months, 14);
        assert_eq!(d.days, 3);
        assert_eq!(d.seconds, 4 * 3600 + 5 * 60 + 6);
        assert_eq!(d.nanoseconds, 0);
    }

    #[test]
    fn test_parse_iso_weeks() {
        let d = DurationComponents::parse_iso("P2W").unwrap();
        assert_eq!(d.days, 14);
    }

    #[test]
    fn test_parse_iso_fractional_seconds() {
        let d = DurationComponents::parse_iso("PT1.5S").unwrap();
        assert_eq!(d.seconds, 1);
        assert_eq!(d.nanoseconds, 500_000_000);

        let d = DurationComponents::parse_iso("PT-0.25S").unwrap();
        assert_eq!(d.seconds, 0);
        assert_eq!(d.nanoseconds, -250_000_000);

        let d = DurationComponents::parse_iso("PT2M0.000000001S").unwrap();
        assert_eq!(d.seconds, 120);
        assert_eq!(d.nanoseconds, 1);
    }

    #[test]
    fn test_parse_iso_rejects_garbage() {
        assert!(DurationComponents::parse_iso("P").is_none());
        assert!(DurationComponents::parse_iso("1Y").is_none());
        assert!(DurationComponents::parse_iso("PT").is_none());
        assert!(DurationComponents::parse_iso("P1X").is_none());
        assert!(DurationComponents::parse_iso("P1.5D").is_none());
        assert!(DurationComponents::parse_iso("PT1.S").is_none());
        assert!(DurationComponents::parse_iso("PT.5S").is_none());
        assert!(DurationComponents::parse_iso("PT1.0000000001S").is_none());
    }

    #[test]
    fn test_from_json_map() {
        let d = DurationComponents::from_json("shift", &json!({ "months": 2, "seconds": 30 }))
            .unwrap();
        assert_eq!(d.months, 2);
        assert_eq!(d.seconds, 30);
        assert_eq!(d.days, 0);
    }

    #[test]
    fn test_from_json_rejects_unknown_component() {
        let err =
            DurationComponents::from_json("shift", &json!({ "weeks": 1 })).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_datetime() {
        assert!(validate_datetime("born", &json!("2024-05-01T12:00:00Z")).is_ok());
        assert!(validate_datetime("born", &json!("yesterday")).is_err());
        assert!(validate_datetime("born", &json!(12)).is_err());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_parse_iso_never_panics(s in "\\PC*") {
            let _ = DurationComponents::parse_iso(&s);
        }

        #[test]
        fn prop_component_roundtrip(months in -240i64..240, days in -31i64..31) {
            let d = DurationComponents::from_json(
                "shift",
                &json!({ "months": months, "days": days }),
            ).unwrap();
            prop_assert_eq!(d.months, months);
            prop_assert_eq!(d.days, days);
        }
    }
}
