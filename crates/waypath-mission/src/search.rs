//! Search configuration carried alongside the waypoint path.
//!
//! Pattern parameters are inert: nothing edits or consumes them yet, and only the
//! ordinals of the object and pattern reach the canonical payload.

use serde::{Deserialize, Serialize};
use waypath_core::error::ParseError;
use waypath_core::{GeoPoint, Result};

/// Object the rover searches for at the end of the path.
///
/// Ordinals are part of the wire contract. Append new kinds; never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SearchObject {
    #[default]
    None = 0,
    Mallet = 1,
    WaterBottle = 2,
    RockPickHammer = 3,
}

impl SearchObject {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::Mallet),
            2 => Some(Self::WaterBottle),
            3 => Some(Self::RockPickHammer),
            _ => None,
        }
    }
}

/// Discriminant of [`SearchPattern`], with the wire ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PatternKind {
    None = 0,
    Spiral = 1,
    Lawnmower = 2,
}

impl PatternKind {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::Spiral),
            2 => Some(Self::Lawnmower),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralParams {
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub lane_spacing_meters: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LawnmowerParams {
    pub corners: [GeoPoint; 4],
    pub lane_spacing_meters: f64,
}

/// Search pattern with its parameters. The variant is the pattern, so parameters can
/// never disagree with it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchPattern {
    #[default]
    None,
    Spiral(SpiralParams),
    Lawnmower(LawnmowerParams),
}

impl SearchPattern {
    pub fn kind(&self) -> PatternKind {
        match self {
            SearchPattern::None => PatternKind::None,
            SearchPattern::Spiral(_) => PatternKind::Spiral,
            SearchPattern::Lawnmower(_) => PatternKind::Lawnmower,
        }
    }

    pub fn ordinal(&self) -> u8 {
        self.kind().ordinal()
    }

    /// Checks coordinates and distances in the parameters.
    pub fn validate(&self) -> Result<()> {
        match self {
            SearchPattern::None => Ok(()),
            SearchPattern::Spiral(params) => {
                params.center.validate()?;
                positive("radius_meters", params.radius_meters)?;
                positive("lane_spacing_meters", params.lane_spacing_meters)
            }
            SearchPattern::Lawnmower(params) => {
                for corner in &params.corners {
                    corner.validate()?;
                }
                positive("lane_spacing_meters", params.lane_spacing_meters)
            }
        }
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParseError::invalid_value(field, format!("must be positive, got {}", value)).into())
    }
}

/// What to look for and how to sweep for it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub target_object: SearchObject,
    #[serde(default)]
    pub pattern: SearchPattern,
}

impl SearchConfig {
    pub fn new(target_object: SearchObject, pattern: SearchPattern) -> Self {
        Self {
            target_object,
            pattern,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pattern.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypath_core::WaypathError;

    #[test]
    fn test_ordinals_are_fixed() {
        assert_eq!(SearchObject::None.ordinal(), 0);
        assert_eq!(SearchObject::Mallet.ordinal(), 1);
        assert_eq!(SearchObject::WaterBottle.ordinal(), 2);
        assert_eq!(SearchObject::RockPickHammer.ordinal(), 3);

        assert_eq!(SearchPattern::None.ordinal(), 0);
        assert_eq!(PatternKind::Spiral.ordinal(), 1);
        assert_eq!(PatternKind::Lawnmower.ordinal(), 2);
    }

    #[test]
    fn test_from_ordinal() {
        for object in [
            SearchObject::None,
            SearchObject::Mallet,
            SearchObject::WaterBottle,
            SearchObject::RockPickHammer,
        ] {
            assert_eq!(SearchObject::from_ordinal(object.ordinal()), Some(object));
        }
        assert_eq!(SearchObject::from_ordinal(9), None);

        for kind in [PatternKind::None, PatternKind::Spiral, PatternKind::Lawnmower] {
            assert_eq!(PatternKind::from_ordinal(kind.ordinal()), Some(kind));
        }
        assert_eq!(PatternKind::from_ordinal(3), None);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
target_object: water_bottle
pattern:
  kind: spiral
  center:
    latitude: 38.4063
    longitude: -110.7918
  radius_meters: 20.0
  lane_spacing_meters: 2.5
"#;
        let config: SearchConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.target_object, SearchObject::WaterBottle);
        assert_eq!(config.pattern.kind(), PatternKind::Spiral);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_defaults_to_none() {
        let config: SearchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.pattern.ordinal(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let corner = GeoPoint::new(38.0, -110.0).unwrap();
        let pattern = SearchPattern::Lawnmower(LawnmowerParams {
            corners: [corner; 4],
            lane_spacing_meters: 0.0,
        });
        assert!(matches!(
            pattern.validate(),
            Err(WaypathError::Parse(ParseError::InvalidValue { .. }))
        ));

        let pattern = SearchPattern::Spiral(SpiralParams {
            center: GeoPoint {
                latitude: 89.0,
                longitude: 0.0,
            },
            radius_meters: 5.0,
            lane_spacing_meters: 1.0,
        });
        assert!(matches!(pattern.validate(), Err(WaypathError::Geo(_))));
    }
}
