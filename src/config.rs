// Particle field configuration. Every field has a default, so hosts can pass a
// partial JSON object (or nothing at all).

use crate::color::Color;
use crate::error::{FieldError, Result};
use crate::pointer::Pointer;
use crate::viewport::Viewport;
use serde::Deserialize;

/// How the connection list is cut down to `max_connections`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// First qualifying pairs in index order, the look the page was designed with.
    IndexOrder,
    /// Closest qualifying pairs, ascending by distance.
    Nearest,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        ConnectionPolicy::IndexOrder
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    pub count: usize,
    pub palette: Vec<Color>,
    /// Width of the speed range above the 0.5 floor.
    pub speed: f64,
    pub interactive: bool,
    pub width: f64,
    pub height: f64,
    pub tick_interval_ms: u32,
    pub attraction_radius: f64,
    pub attraction_strength: f64,
    pub connection_distance: f64,
    pub max_connections: usize,
    pub connection_policy: ConnectionPolicy,
    pub connection_color: Color,
    /// Draw a fading trail behind the cursor on top of the field.
    pub cursor_trail: bool,
    /// Wrap tick and render in console.time labels.
    pub profile: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            count: 50,
            palette: vec![
                Color::rgba(155, 17, 30, 153),
                Color::rgba(122, 0, 0, 102),
                Color::rgba(255, 255, 255, 51),
            ],
            speed: 1.0,
            interactive: true,
            width: 1280.0,
            height: 720.0,
            tick_interval_ms: 50,
            attraction_radius: Pointer::DEFAULT_RADIUS,
            attraction_strength: Pointer::DEFAULT_STRENGTH,
            connection_distance: 100.0,
            max_connections: 20,
            connection_policy: ConnectionPolicy::IndexOrder,
            connection_color: Color::rgba(155, 17, 30, 51),
            cursor_trail: false,
            profile: false,
        }
    }
}

impl FieldConfig {
    pub fn from_json(text: &str) -> Result<FieldConfig> {
        let config: FieldConfig = if text.trim().is_empty() {
            FieldConfig::default()
        } else {
            serde_json::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(FieldError::invalid("count", "must be greater than zero"));
        }
        if self.palette.is_empty() {
            return Err(FieldError::invalid("palette", "needs at least one color"));
        }
        positive("speed", self.speed)?;
        self.viewport()?;
        if self.tick_interval_ms == 0 {
            return Err(FieldError::invalid("tick_interval_ms", "must be greater than zero"));
        }
        // setInterval takes a signed 32-bit delay
        if self.tick_interval_ms > i32::MAX as u32 {
            return Err(FieldError::invalid("tick_interval_ms", "too large for a timer"));
        }
        positive("attraction_radius", self.attraction_radius)?;
        positive("attraction_strength", self.attraction_strength)?;
        positive("connection_distance", self.connection_distance)?;
        if self.max_connections == 0 {
            return Err(FieldError::invalid("max_connections", "must be greater than zero"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::invalid(field, format!("{} is not a positive number", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        FieldConfig::default().validate().unwrap();
    }

    #[test]
    fn empty_json_means_defaults() {
        assert_eq!(FieldConfig::from_json("").unwrap(), FieldConfig::default());
        assert_eq!(FieldConfig::from_json("{}").unwrap(), FieldConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config = FieldConfig::from_json(
            r#"{ "count": 3, "palette": ["red"], "connection_policy": "nearest" }"#,
        )
        .unwrap();
        assert_eq!(config.count, 3);
        assert_eq!(config.palette, vec![Color::rgba(255, 0, 0, 255)]);
        assert_eq!(config.connection_policy, ConnectionPolicy::Nearest);
        assert_eq!(config.tick_interval_ms, 50);
    }

    #[test]
    fn rejects_zero_particles() {
        let err = FieldConfig::from_json(r#"{ "count": 0 }"#).unwrap_err();
        assert!(matches!(err, FieldError::InvalidConfig { field: "count", .. }));
    }

    #[test]
    fn rejects_bad_values() {
        for (json, field) in &[
            (r#"{ "palette": [] }"#, "palette"),
            (r#"{ "speed": 0 }"#, "speed"),
            (r#"{ "width": -5 }"#, "width"),
            (r#"{ "tick_interval_ms": 0 }"#, "tick_interval_ms"),
            (r#"{ "tick_interval_ms": 3000000000 }"#, "tick_interval_ms"),
            (r#"{ "max_connections": 0 }"#, "max_connections"),
        ] {
            match FieldConfig::from_json(json) {
                Err(FieldError::InvalidConfig { field: f, .. }) => assert_eq!(f, *field),
                other => panic!("{} gave {:?}", json, other),
            }
        }
    }

    #[test]
    fn rejects_unparseable_input() {
        assert!(matches!(
            FieldConfig::from_json(r#"{ "palette": ["not-a-color"] }"#),
            Err(FieldError::ConfigParse(_))
        ));
        assert!(matches!(
            FieldConfig::from_json(r#"{ "count": -1 }"#),
            Err(FieldError::ConfigParse(_))
        ));
        assert!(matches!(
            FieldConfig::from_json(r#"{ "colour": "red" }"#),
            Err(FieldError::ConfigParse(_))
        ));
    }
}
