// Cursor-follow tilt for cards. The pointer's position over the card, as a
// fraction in [-0.5, 0.5] per axis, is sprung toward and mapped onto a
// rotation of up to 15 degrees times the intensity. Leaving the card springs
// it back flat.

use crate::error::{FieldError, Result};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TiltConfig {
    pub intensity: f64,
    /// CSS perspective in px.
    pub perspective: f64,
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Scale while hovered.
    pub hover_scale: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        TiltConfig {
            intensity: 1.0,
            perspective: 1000.0,
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            hover_scale: 1.05,
        }
    }
}

impl TiltConfig {
    pub fn from_json(text: &str) -> Result<TiltConfig> {
        let config: TiltConfig = if text.trim().is_empty() {
            TiltConfig::default()
        } else {
            serde_json::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.intensity.is_finite() {
            return Err(FieldError::invalid("intensity", format!("{} is not finite", self.intensity)));
        }
        for (field, value) in [
            ("perspective", self.perspective),
            ("stiffness", self.stiffness),
            ("mass", self.mass),
            ("hover_scale", self.hover_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FieldError::invalid(field, format!("{} is not a positive number", value)));
            }
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(FieldError::invalid("damping", format!("{} is negative", self.damping)));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    const REST_DELTA: f64 = 0.0005;
    const REST_SPEED: f64 = 0.005;

    fn step(&mut self, config: &TiltConfig, dt: f64) {
        let accel = (-config.stiffness * (self.value - self.target) - config.damping * self.velocity)
            / config.mass;
        self.velocity += accel * dt;
        self.value += self.velocity * dt;
        if self.is_resting() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn is_resting(&self) -> bool {
        (self.value - self.target).abs() < Spring::REST_DELTA && self.velocity.abs() < Spring::REST_SPEED
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tilt {
    config: TiltConfig,
    x: Spring,
    y: Spring,
    hovered: bool,
}

impl Tilt {
    pub const MAX_DEGREES: f64 = 15.0;
    // Longest integration step; larger frame gaps are split.
    const MAX_STEP_S: f64 = 1.0 / 240.0;

    pub fn new(config: TiltConfig) -> Result<Tilt> {
        config.validate()?;
        Ok(Tilt {
            config,
            x: Spring::default(),
            y: Spring::default(),
            hovered: false,
        })
    }

    pub fn config(&self) -> &TiltConfig {
        &self.config
    }

    /// Pointer at `(x, y)` inside a card whose box starts at `(left, top)`.
    pub fn point_at(&mut self, x: f64, y: f64, left: f64, top: f64, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.hovered = true;
        self.x.target = ((x - left) / width - 0.5).clamp(-0.5, 0.5);
        self.y.target = ((y - top) / height - 0.5).clamp(-0.5, 0.5);
    }

    pub fn leave(&mut self) {
        self.hovered = false;
        self.x.target = 0.0;
        self.y.target = 0.0;
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_resting() && self.y.is_resting()
            && self.x.value == self.x.target
            && self.y.value == self.y.target
    }

    /// Advances both springs by `dt_ms`.
    pub fn step(&mut self, dt_ms: f64) {
        let mut remaining = (dt_ms / 1000.0).max(0.0);
        while remaining > 0.0 && !self.is_settled() {
            let dt = remaining.min(Tilt::MAX_STEP_S);
            self.x.step(&self.config, dt);
            self.y.step(&self.config, dt);
            remaining -= dt;
        }
    }

    /// `(rotate_x, rotate_y)` in degrees. Pointer low on the card tips its top
    /// toward the viewer, pointer on the right turns it right.
    pub fn rotation(&self) -> (f64, f64) {
        let max = Tilt::MAX_DEGREES * self.config.intensity;
        (-2.0 * max * self.y.value, 2.0 * max * self.x.value)
    }

    pub fn css_transform(&self) -> String {
        let (rotate_x, rotate_y) = self.rotation();
        let scale = if self.hovered { self.config.hover_scale } else { 1.0 };
        format!(
            "perspective({}px) rotateX({:.3}deg) rotateY({:.3}deg) scale({})",
            self.config.perspective, rotate_x, rotate_y, scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tilt() -> Tilt {
        Tilt::new(TiltConfig::default()).unwrap()
    }

    fn settle(tilt: &mut Tilt) {
        for _ in 0..600 {
            tilt.step(1000.0 / 60.0);
        }
    }

    #[test]
    fn corners_map_to_full_rotation() {
        let mut t = tilt();
        // bottom right corner of a 200x100 card at (50, 50)
        t.point_at(250.0, 150.0, 50.0, 50.0, 200.0, 100.0);
        settle(&mut t);
        let (rx, ry) = t.rotation();
        assert!((rx + 15.0).abs() < 0.01, "rotate_x {}", rx);
        assert!((ry - 15.0).abs() < 0.01, "rotate_y {}", ry);
    }

    #[test]
    fn intensity_scales_rotation() {
        let mut t = Tilt::new(TiltConfig {
            intensity: 2.0,
            ..TiltConfig::default()
        })
        .unwrap();
        t.point_at(0.0, 0.0, 0.0, 0.0, 100.0, 100.0);
        settle(&mut t);
        let (rx, ry) = t.rotation();
        assert!((rx - 30.0).abs() < 0.02);
        assert!((ry + 30.0).abs() < 0.02);
    }

    #[test]
    fn springs_toward_the_target_instead_of_jumping() {
        let mut t = tilt();
        t.point_at(100.0, 50.0, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(t.rotation().1, 0.0);
        t.step(16.0);
        let first = t.rotation().1;
        assert!(first > 0.0 && first < 15.0);
        assert!(!t.is_settled());
    }

    #[test]
    fn leaving_resets_to_flat() {
        let mut t = tilt();
        t.point_at(100.0, 100.0, 0.0, 0.0, 100.0, 100.0);
        settle(&mut t);
        assert!(t.css_transform().contains("scale(1.05)"));
        t.leave();
        settle(&mut t);
        assert!(t.is_settled());
        assert_eq!(t.rotation(), (0.0, 0.0));
        assert!(t.css_transform().ends_with("scale(1)"));
    }

    #[test]
    fn outside_points_are_clamped() {
        let mut t = tilt();
        t.point_at(500.0, -500.0, 0.0, 0.0, 100.0, 100.0);
        settle(&mut t);
        let (rx, ry) = t.rotation();
        assert!(rx <= 15.0 + 0.01 && ry <= 15.0 + 0.01);
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(TiltConfig::from_json(r#"{ "stiffness": 0 }"#).is_err());
        assert!(TiltConfig::from_json(r#"{ "damping": -1 }"#).is_err());
        assert!(TiltConfig::from_json(r#"{ "glow": 1 }"#).is_err());
        assert_eq!(TiltConfig::from_json("").unwrap(), TiltConfig::default());
    }
}
