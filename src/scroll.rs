// Smooth scrolling: input moves a target offset, and every animation frame the
// visible offset either follows an eased scroll_to animation or is damped
// toward the target.
//
// A SmoothScroll is an ordinary value. Whoever needs one constructs it and
// passes it along; start/stop are explicit.

use crate::error::{FieldError, Result};
use serde::Deserialize;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    ExpoOut,
    CubicOut,
    Linear,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::ExpoOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::Linear => t,
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::ExpoOut
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Damping intensity in (0, 1]. Lower is smoother and lazier.
    pub lerp: f64,
    /// Seconds taken by a non-immediate scroll_to.
    pub duration: f64,
    pub easing: Easing,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
    /// Let the offset run past both ends instead of clamping to [0, limit].
    pub infinite: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            lerp: 0.1,
            duration: 1.2,
            easing: Easing::ExpoOut,
            wheel_multiplier: 1.0,
            touch_multiplier: 2.0,
            infinite: false,
        }
    }
}

impl ScrollConfig {
    pub fn from_json(text: &str) -> Result<ScrollConfig> {
        let config: ScrollConfig = if text.trim().is_empty() {
            ScrollConfig::default()
        } else {
            serde_json::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lerp > 0.0 && self.lerp <= 1.0) {
            return Err(FieldError::invalid("lerp", format!("{} is outside (0, 1]", self.lerp)));
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            return Err(FieldError::invalid("duration", format!("{} is not a duration", self.duration)));
        }
        for (field, value) in [
            ("wheel_multiplier", self.wheel_multiplier),
            ("touch_multiplier", self.touch_multiplier),
        ] {
            if !value.is_finite() {
                return Err(FieldError::invalid(field, format!("{} is not finite", value)));
            }
        }
        Ok(())
    }
}

/// Runs once when a scroll_to lands. Dropped unrun if the scroll is cancelled.
pub type OnComplete = Box<dyn FnOnce()>;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScrollTarget {
    Offset(f64),
    Top,
    Bottom,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollToOptions {
    /// Added to the resolved target.
    pub offset: f64,
    /// Seconds; None uses the controller's configured duration.
    pub duration: Option<f64>,
    pub easing: Easing,
    pub immediate: bool,
    /// Ignore user input until the animation completes.
    pub lock: bool,
    /// Scroll even while the controller is stopped.
    pub force: bool,
    #[serde(skip)]
    pub on_complete: Option<OnComplete>,
}

impl ScrollToOptions {
    /// Options from a JSON object; empty text gives the defaults.
    pub fn from_json(text: &str) -> Result<ScrollToOptions> {
        let options: ScrollToOptions = if text.trim().is_empty() {
            ScrollToOptions::default()
        } else {
            serde_json::from_str(text)?
        };
        if let Some(duration) = options.duration {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(FieldError::invalid("duration", format!("{} is not a duration", duration)));
            }
        }
        if !options.offset.is_finite() {
            return Err(FieldError::invalid("offset", format!("{} is not finite", options.offset)));
        }
        Ok(options)
    }

    pub fn then(self, on_complete: impl FnOnce() + 'static) -> ScrollToOptions {
        ScrollToOptions {
            on_complete: Some(Box::new(on_complete)),
            ..self
        }
    }
}

impl fmt::Debug for ScrollToOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollToOptions")
            .field("offset", &self.offset)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("immediate", &self.immediate)
            .field("lock", &self.lock)
            .field("force", &self.force)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for ScrollToOptions {
    fn default() -> Self {
        ScrollToOptions {
            offset: 0.0,
            duration: None,
            easing: Easing::CubicOut,
            immediate: false,
            lock: false,
            force: false,
            on_complete: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollEvent {
    pub scroll: f64,
    pub limit: f64,
    pub velocity: f64,
    /// -1 up, 1 down, 0 idle.
    pub direction: i8,
    pub progress: f64,
}

struct Animation {
    from: f64,
    to: f64,
    duration_ms: f64,
    elapsed_ms: f64,
    easing: Easing,
    on_complete: Option<OnComplete>,
}

pub struct SmoothScroll {
    config: ScrollConfig,
    scroll: f64,
    // offset as of the last frame
    rendered: f64,
    target: f64,
    limit: f64,
    velocity: f64,
    direction: i8,
    stopped: bool,
    locked: bool,
    animation: Option<Animation>,
    last_time: Option<f64>,
}

impl SmoothScroll {
    // Within this many pixels the damped offset snaps onto the target.
    const SNAP_DISTANCE: f64 = 0.5;
    // Damping is tuned per 60 Hz frame.
    const REFERENCE_FPS: f64 = 60.0;

    pub fn new(config: ScrollConfig, limit: f64) -> Result<SmoothScroll> {
        config.validate()?;
        Ok(SmoothScroll {
            config,
            scroll: 0.0,
            rendered: 0.0,
            target: 0.0,
            limit: limit.max(0.0),
            velocity: 0.0,
            direction: 0,
            stopped: false,
            locked: false,
            animation: None,
            last_time: None,
        })
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn progress(&self) -> f64 {
        if self.limit > 0.0 {
            (self.scroll / self.limit).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.animation.is_some() || self.scroll != self.target
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn start(&mut self) {
        self.stopped = false;
    }

    /// Freezes at the current offset and drops any running animation.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.animation = None;
        self.locked = false;
        self.target = self.scroll;
        self.velocity = 0.0;
        self.direction = 0;
    }

    pub fn on_wheel(&mut self, delta: f64) -> bool {
        let multiplier = self.config.wheel_multiplier;
        self.nudge(delta * multiplier)
    }

    pub fn on_touch(&mut self, delta: f64) -> bool {
        let multiplier = self.config.touch_multiplier;
        self.nudge(delta * multiplier)
    }

    // Returns whether the input was taken.
    fn nudge(&mut self, delta: f64) -> bool {
        if self.stopped || self.locked || !delta.is_finite() {
            return false;
        }
        // user input takes over from a programmatic scroll
        self.animation = None;
        self.target = self.clamp(self.target + delta);
        true
    }

    /// Starts an eased scroll, or jumps when `immediate` (or a zero duration) is set.
    /// `on_complete` runs when the offset lands; a jump lands right away.
    pub fn scroll_to(&mut self, target: ScrollTarget, options: ScrollToOptions) -> bool {
        if (self.stopped || self.locked) && !options.force {
            return false;
        }
        let base = match target {
            ScrollTarget::Offset(offset) => offset,
            ScrollTarget::Top => 0.0,
            ScrollTarget::Bottom => self.limit,
        };
        let destination = self.clamp(base + options.offset);
        let duration = options.duration.unwrap_or(self.config.duration);

        if options.immediate || duration <= 0.0 {
            self.animation = None;
            self.locked = false;
            self.set_scroll(destination);
            self.target = destination;
            if let Some(on_complete) = options.on_complete {
                on_complete();
            }
            return true;
        }

        self.target = destination;
        self.locked = options.lock;
        self.animation = Some(Animation {
            from: self.scroll,
            to: destination,
            duration_ms: duration * 1000.0,
            elapsed_ms: 0.0,
            easing: options.easing,
            on_complete: options.on_complete,
        });
        true
    }

    pub fn resize(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.target = self.clamp(self.target);
        let scroll = self.clamp(self.scroll);
        self.scroll = scroll;
        if let Some(animation) = self.animation.as_mut() {
            animation.to = if self.config.infinite {
                animation.to
            } else {
                animation.to.clamp(0.0, self.limit)
            };
        }
    }

    /// Advances one animation frame at `time_ms` (a requestAnimationFrame timestamp).
    /// Returns an event when the visible offset moved since the last frame,
    /// jumps and resizes included.
    pub fn raf(&mut self, time_ms: f64) -> Option<ScrollEvent> {
        let dt_ms = match self.last_time.replace(time_ms) {
            Some(last) => (time_ms - last).max(0.0),
            None => 1000.0 / SmoothScroll::REFERENCE_FPS,
        };
        let before = self.rendered;
        let mut landed = None;

        if let Some(mut animation) = self.animation.take() {
            animation.elapsed_ms += dt_ms;
            let t = if animation.duration_ms > 0.0 {
                animation.elapsed_ms / animation.duration_ms
            } else {
                1.0
            };
            if t >= 1.0 {
                self.scroll = animation.to;
                self.locked = false;
                landed = animation.on_complete.take();
            } else {
                let eased = animation.easing.apply(t);
                self.scroll = animation.from + (animation.to - animation.from) * eased;
                self.animation = Some(animation);
            }
        } else if !self.stopped && self.scroll != self.target {
            let dt = dt_ms / 1000.0;
            let factor = 1.0 - (-self.config.lerp * SmoothScroll::REFERENCE_FPS * dt).exp();
            let next = self.scroll + (self.target - self.scroll) * factor;
            self.scroll = if (self.target - next).abs() < SmoothScroll::SNAP_DISTANCE {
                self.target
            } else {
                next
            };
        }

        self.velocity = self.scroll - before;
        self.rendered = self.scroll;
        self.direction = if self.velocity > 0.0 {
            1
        } else if self.velocity < 0.0 {
            -1
        } else {
            0
        };

        if let Some(on_complete) = landed {
            on_complete();
        }
        if self.velocity != 0.0 {
            Some(self.event())
        } else {
            None
        }
    }

    pub fn event(&self) -> ScrollEvent {
        ScrollEvent {
            scroll: self.scroll,
            limit: self.limit,
            velocity: self.velocity,
            direction: self.direction,
            progress: self.progress(),
        }
    }

    fn set_scroll(&mut self, value: f64) {
        self.velocity = value - self.scroll;
        self.direction = self.velocity.signum() as i8;
        if self.velocity == 0.0 {
            self.direction = 0;
        }
        self.scroll = value;
    }

    fn clamp(&self, value: f64) -> f64 {
        if self.config.infinite {
            value
        } else {
            value.clamp(0.0, self.limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const FRAME: f64 = 1000.0 / 60.0;

    fn controller(limit: f64) -> SmoothScroll {
        SmoothScroll::new(ScrollConfig::default(), limit).unwrap()
    }

    fn run(scroll: &mut SmoothScroll, from_ms: f64, frames: usize) -> f64 {
        let mut t = from_ms;
        for _ in 0..frames {
            t += FRAME;
            scroll.raf(t);
        }
        t
    }

    #[test]
    fn easing_endpoints() {
        for easing in [Easing::ExpoOut, Easing::CubicOut, Easing::Linear] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert!(easing.apply(0.5) >= 0.5);
        }
    }

    #[test]
    fn rejects_bad_config() {
        assert!(ScrollConfig::from_json(r#"{ "lerp": 0 }"#).is_err());
        assert!(ScrollConfig::from_json(r#"{ "duration": -1 }"#).is_err());
        assert_eq!(ScrollConfig::from_json("").unwrap(), ScrollConfig::default());
        let config = ScrollConfig::from_json(r#"{ "easing": "linear" }"#).unwrap();
        assert_eq!(config.easing, Easing::Linear);
    }

    #[test]
    fn wheel_input_is_damped_then_snaps() {
        let mut s = controller(2000.0);
        assert!(s.on_wheel(300.0));
        assert_eq!(s.target(), 300.0);

        let first = s.raf(0.0).unwrap();
        assert!(first.scroll > 0.0 && first.scroll < 300.0);
        assert_eq!(first.direction, 1);

        run(&mut s, 0.0, 240);
        assert_eq!(s.scroll(), 300.0);
        assert!(!s.is_scrolling());
        assert_eq!(s.raf(5000.0), None);
    }

    #[test]
    fn target_is_clamped_to_limit() {
        let mut s = controller(500.0);
        s.on_wheel(10_000.0);
        assert_eq!(s.target(), 500.0);
        s.on_wheel(-20_000.0);
        assert_eq!(s.target(), 0.0);
    }

    #[test]
    fn infinite_scroll_is_not_clamped() {
        let config = ScrollConfig {
            infinite: true,
            ..ScrollConfig::default()
        };
        let mut s = SmoothScroll::new(config, 500.0).unwrap();
        s.on_wheel(-50.0);
        assert_eq!(s.target(), -50.0);
    }

    #[test]
    fn touch_uses_its_own_multiplier() {
        let mut s = controller(1000.0);
        s.on_touch(10.0);
        assert_eq!(s.target(), 20.0);
    }

    #[test]
    fn stopped_controller_ignores_input() {
        let mut s = controller(1000.0);
        s.stop();
        assert!(!s.on_wheel(100.0));
        assert!(!s.scroll_to(ScrollTarget::Bottom, ScrollToOptions::default()));
        assert_eq!(s.target(), 0.0);

        let forced = ScrollToOptions {
            immediate: true,
            force: true,
            ..ScrollToOptions::default()
        };
        assert!(s.scroll_to(ScrollTarget::Offset(250.0), forced));
        assert_eq!(s.scroll(), 250.0);

        s.start();
        assert!(s.on_wheel(100.0));
    }

    #[test]
    fn immediate_scroll_to_jumps() {
        let mut s = controller(1000.0);
        let options = ScrollToOptions {
            immediate: true,
            offset: -100.0,
            ..ScrollToOptions::default()
        };
        s.scroll_to(ScrollTarget::Bottom, options);
        assert_eq!(s.scroll(), 900.0);
        assert_eq!(s.direction(), 1);
        assert!((s.progress() - 0.9).abs() < 1e-12);

        // the next frame reports the jump so the page follows it
        let jump = s.raf(0.0).unwrap();
        assert_eq!(jump.scroll, 900.0);
        assert_eq!(jump.velocity, 900.0);
        assert_eq!(s.raf(16.0), None);
    }

    #[test]
    fn eased_scroll_to_lands_after_duration() {
        let mut s = controller(1000.0);
        let options = ScrollToOptions {
            duration: Some(0.5),
            ..ScrollToOptions::default()
        };
        s.scroll_to(ScrollTarget::Offset(600.0), options);
        s.raf(0.0);
        let halfway = s.raf(250.0).unwrap();
        assert!(halfway.scroll > 300.0 && halfway.scroll < 600.0);
        s.raf(600.0);
        assert_eq!(s.scroll(), 600.0);
        assert!(!s.is_scrolling());
    }

    #[test]
    fn lock_blocks_wheel_until_done() {
        let mut s = controller(1000.0);
        let options = ScrollToOptions {
            duration: Some(0.2),
            lock: true,
            ..ScrollToOptions::default()
        };
        s.scroll_to(ScrollTarget::Offset(400.0), options);
        assert!(s.is_locked());
        assert!(!s.on_wheel(50.0));
        s.raf(0.0);
        s.raf(300.0);
        assert!(!s.is_locked());
        assert!(s.on_wheel(50.0));
        assert_eq!(s.target(), 450.0);
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let bump = Rc::clone(&count);
        (count, move || bump.set(bump.get() + 1))
    }

    #[test]
    fn on_complete_runs_once_when_the_animation_lands() {
        let mut s = controller(1000.0);
        let (count, bump) = counter();
        let options = ScrollToOptions {
            duration: Some(0.2),
            ..ScrollToOptions::default()
        }
        .then(bump);
        assert!(s.scroll_to(ScrollTarget::Offset(300.0), options));
        s.raf(0.0);
        s.raf(100.0);
        assert_eq!(count.get(), 0);
        s.raf(250.0);
        assert_eq!(count.get(), 1);
        assert_eq!(s.scroll(), 300.0);
        s.raf(400.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn on_complete_runs_at_once_for_jumps() {
        let mut s = controller(1000.0);
        let (count, bump) = counter();
        let options = ScrollToOptions {
            immediate: true,
            ..ScrollToOptions::default()
        }
        .then(bump);
        s.scroll_to(ScrollTarget::Bottom, options);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancelled_or_refused_scrolls_never_complete() {
        let mut s = controller(1000.0);
        let (count, bump) = counter();
        s.scroll_to(ScrollTarget::Offset(500.0), ScrollToOptions::default().then(bump));
        s.raf(0.0);
        // wheel input takes over from the animation
        assert!(s.on_wheel(10.0));
        run(&mut s, 0.0, 200);
        assert_eq!(count.get(), 0);

        let (refused, bump) = counter();
        s.stop();
        assert!(!s.scroll_to(ScrollTarget::Top, ScrollToOptions::default().then(bump)));
        assert_eq!(refused.get(), 0);
    }

    #[test]
    fn options_parse_from_json() {
        let options = ScrollToOptions::from_json(
            r#"{ "offset": -80, "duration": 1.5, "easing": "expo_out", "lock": true }"#,
        )
        .unwrap();
        assert_eq!(options.offset, -80.0);
        assert_eq!(options.duration, Some(1.5));
        assert_eq!(options.easing, Easing::ExpoOut);
        assert!(options.lock && !options.force && !options.immediate);
        assert!(options.on_complete.is_none());

        assert_eq!(ScrollToOptions::from_json("").unwrap().easing, Easing::CubicOut);
        assert!(ScrollToOptions::from_json(r#"{ "duration": -1 }"#).is_err());
        assert!(ScrollToOptions::from_json(r#"{ "on_complete": 1 }"#).is_err());
    }

    #[test]
    fn resize_clamps_everything() {
        let mut s = controller(1000.0);
        s.scroll_to(
            ScrollTarget::Offset(800.0),
            ScrollToOptions {
                immediate: true,
                ..ScrollToOptions::default()
            },
        );
        s.resize(300.0);
        assert_eq!(s.scroll(), 300.0);
        assert_eq!(s.target(), 300.0);
        assert_eq!(s.progress(), 1.0);
        s.resize(0.0);
        assert_eq!(s.progress(), 0.0);
    }
}
