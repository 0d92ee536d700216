// Scroll-synchronized parallax: an element drifts by up to `speed * 100` px
// while it crosses the viewport, from the moment its top enters at the bottom
// until its bottom leaves at the top. Scrubbed, so the shift is a pure function
// of the scroll offset.

use crate::error::{FieldError, Result};
use crate::scroll::ScrollEvent;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParallaxDirection {
    Up,
    Down,
    Left,
    Right,
}

impl Default for ParallaxDirection {
    fn default() -> Self {
        ParallaxDirection::Up
    }
}

impl FromStr for ParallaxDirection {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<ParallaxDirection> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(ParallaxDirection::Up),
            "down" => Ok(ParallaxDirection::Down),
            "left" => Ok(ParallaxDirection::Left),
            "right" => Ok(ParallaxDirection::Right),
            _ => Err(FieldError::invalid("direction", format!("{:?} is not up, down, left or right", s))),
        }
    }
}

/// Where an element sits on the page, in document coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementBox {
    pub top: f64,
    pub height: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Parallax {
    pub speed: f64,
    pub direction: ParallaxDirection,
}

impl Default for Parallax {
    fn default() -> Self {
        Parallax {
            speed: 0.5,
            direction: ParallaxDirection::Up,
        }
    }
}

impl Parallax {
    // Pixels of travel per unit of speed.
    const TRAVEL_PX: f64 = 100.0;

    pub fn new(speed: f64, direction: ParallaxDirection) -> Result<Parallax> {
        if !speed.is_finite() {
            return Err(FieldError::invalid("speed", format!("{} is not finite", speed)));
        }
        Ok(Parallax { speed, direction })
    }

    pub fn distance(&self) -> f64 {
        self.speed * Parallax::TRAVEL_PX
    }

    /// 0 while the element is still below the viewport, 1 once it has left
    /// through the top.
    pub fn progress(element: ElementBox, scroll: f64, viewport_height: f64) -> f64 {
        let start = element.top - viewport_height;
        let end = element.top + element.height;
        let span = end - start;
        if span <= 0.0 {
            return if scroll >= end { 1.0 } else { 0.0 };
        }
        ((scroll - start) / span).clamp(0.0, 1.0)
    }

    /// `[x, y]` translation at the given progress.
    pub fn offset(&self, progress: f64) -> [f64; 2] {
        let shift = self.distance() * progress.clamp(0.0, 1.0);
        match self.direction {
            ParallaxDirection::Up => [0.0, -shift],
            ParallaxDirection::Down => [0.0, shift],
            ParallaxDirection::Left => [-shift, 0.0],
            ParallaxDirection::Right => [shift, 0.0],
        }
    }

    pub fn offset_for(&self, element: ElementBox, event: &ScrollEvent, viewport_height: f64) -> [f64; 2] {
        self.offset(Parallax::progress(element, event.scroll, viewport_height))
    }

    pub fn css_transform(offset: [f64; 2]) -> String {
        format!("translate3d({:.2}px, {:.2}px, 0px)", offset[0], offset[1])
    }
}

/// Parallax text block: the inner text moves up by half its own height over the crossing.
pub fn text_shift_percent(progress: f64) -> f64 {
    -50.0 * progress.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: ElementBox = ElementBox {
        top: 2000.0,
        height: 400.0,
    };

    #[test]
    fn progress_spans_the_whole_crossing() {
        // top reaches the bottom of an 800 px viewport at scroll 1200
        assert_eq!(Parallax::progress(SECTION, 0.0, 800.0), 0.0);
        assert_eq!(Parallax::progress(SECTION, 1200.0, 800.0), 0.0);
        assert!((Parallax::progress(SECTION, 1800.0, 800.0) - 0.5).abs() < 1e-12);
        // bottom leaves the top at scroll 2400
        assert_eq!(Parallax::progress(SECTION, 2400.0, 800.0), 1.0);
        assert_eq!(Parallax::progress(SECTION, 9000.0, 800.0), 1.0);
    }

    #[test]
    fn offset_follows_direction() {
        let half = 0.5;
        let cases = [
            (ParallaxDirection::Up, [0.0, -20.0]),
            (ParallaxDirection::Down, [0.0, 20.0]),
            (ParallaxDirection::Left, [-20.0, 0.0]),
            (ParallaxDirection::Right, [20.0, 0.0]),
        ];
        for (direction, expected) in cases {
            let parallax = Parallax::new(0.4, direction).unwrap();
            let [x, y] = parallax.offset(half);
            assert!((x - expected[0]).abs() < 1e-9 && (y - expected[1]).abs() < 1e-9);
        }
    }

    #[test]
    fn driven_by_scroll_events() {
        let parallax = Parallax::default();
        let event = ScrollEvent {
            scroll: 2400.0,
            limit: 5000.0,
            velocity: 3.0,
            direction: 1,
            progress: 0.48,
        };
        assert_eq!(parallax.offset_for(SECTION, &event, 800.0), [0.0, -50.0]);
        assert_eq!(
            Parallax::css_transform([0.0, -50.0]),
            "translate3d(0.00px, -50.00px, 0px)"
        );
    }

    #[test]
    fn parses_directions() {
        assert_eq!("Left".parse::<ParallaxDirection>().unwrap(), ParallaxDirection::Left);
        assert!("sideways".parse::<ParallaxDirection>().is_err());
        assert!(Parallax::new(f64::NAN, ParallaxDirection::Up).is_err());
    }

    #[test]
    fn text_moves_half_its_height() {
        assert_eq!(text_shift_percent(0.0), 0.0);
        assert_eq!(text_shift_percent(1.0), -50.0);
        assert_eq!(text_shift_percent(2.0), -50.0);
    }
}
