//! Spatial comparison-value handling
//!
//! Point filter values are validated at compile time and re-assembled with
//! the `point()` function inside the generated program.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Coordinates accepted for a point comparison value
///
/// Geographic points carry longitude/latitude (plus optional height);
/// cartesian points carry x/y (plus optional z). Exactly one of the two
/// conventions must be used.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl PointInput {
    /// Parse and validate a point comparison value.
    pub fn from_json(field: &str, value: &serde_json::Value) -> Result<Self> {
        let point: PointInput = serde_json::from_value(value.clone()).map_err(|e| {
            Error::InvalidComparisonValue {
                field: field.to_string(),
                detail: format!("not a point value: {e}"),
            }
        })?;
        let geographic = point.longitude.is_some() && point.latitude.is_some();
        let cartesian = point.x.is_some() && point.y.is_some();
        if geographic == cartesian {
            return Err(Error::InvalidComparisonValue {
                field: field.to_string(),
                detail: "a point needs either longitude/latitude or x/y".to_string(),
            });
        }
        Ok(point)
    }
}

/// Validate a `_DISTANCE` comparison value: `{ point: <point>, distance: <number> }`.
pub fn validate_distance(field: &str, value: &serde_json::Value) -> Result<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| Error::InvalidComparisonValue {
            field: field.to_string(),
            detail: "distance comparisons take { point, distance }".to_string(),
        })?;
    let point = obj.get("point").ok_or_else(|| Error::InvalidComparisonValue {
        field: field.to_string(),
        detail: "missing `point`".to_string(),
    })?;
    PointInput::from_json(field, point)?;
    match obj.get("distance").and_then(|d| d.as_f64()) {
        Some(_) => Ok(()),
        None => Err(Error::InvalidComparisonValue {
            field: field.to_string(),
            detail: "missing numeric `distance`".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_geographic_point() {
        let p = PointInput::from_json("location", &json!({ "longitude": 1.0, "latitude": 2.0 }))
            .unwrap();
        assert_eq!(p.longitude, Some(1.0));
        assert!(p.x.is_none());
    }

    #[test]
    fn test_rejects_mixed_conventions() {
        assert!(PointInput::from_json("location", &json!({ "x": 1.0, "latitude": 2.0 })).is_err());
        assert!(PointInput::from_json("location", &json!({})).is_err());
    }

    #[test]
    fn test_validate_distance() {
        let value = json!({ "point": { "x": 0.0, "y": 0.0 }, "distance": 10.5 });
        assert!(validate_distance("location", &value).is_ok());
        assert!(validate_distance("location", &json!({ "distance": 1 })).is_err());
    }
}
