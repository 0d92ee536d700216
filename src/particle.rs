// Particle: a drifting point with a bounded lifetime. Particles are values; the
// field advances them by producing the next particle from the previous one.

use crate::color::Color;
use crate::pointer::Pointer;
use crate::viewport::Viewport;
use rand::Rng;
use std::f64::consts::PI;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: [f64; 2],
    pub size: f64,
    pub speed: f64,
    /// Base opacity drawn at spawn. Rendered opacity is derived from it every frame.
    pub opacity: f64,
    pub color: Color,
    pub heading: f64,
    pub age: u32,
    pub lifetime: u32,
    /// Attraction force applied on the last tick, 0 when untouched.
    pub boost: f64,
}

/// Inputs shared by every particle during one tick.
#[derive(Copy, Clone, Debug)]
pub struct TickContext<'a> {
    pub viewport: &'a Viewport,
    pub pointer: Pointer,
    pub attraction_radius: f64,
    pub attraction_strength: f64,
}

impl Particle {
    pub const MIN_SIZE: f64 = 1.0;
    pub const MAX_SIZE: f64 = 4.0;
    pub const MIN_SPEED: f64 = 0.5;
    pub const MIN_OPACITY: f64 = 0.2;
    pub const MAX_OPACITY: f64 = 1.0;
    pub const MIN_LIFETIME: u32 = 100;
    pub const MAX_LIFETIME: u32 = 400;

    pub fn spawn<R: Rng>(
        rng: &mut R,
        viewport: &Viewport,
        palette: &[Color],
        speed_scale: f64,
    ) -> Particle {
        let color = palette[rng.gen_range(0, palette.len())];
        Particle {
            pos: [
                rng.gen_range(0.0, viewport.width),
                rng.gen_range(0.0, viewport.height),
            ],
            size: rng.gen_range(Particle::MIN_SIZE, Particle::MAX_SIZE),
            speed: rng.gen_range(Particle::MIN_SPEED, Particle::MIN_SPEED + speed_scale),
            opacity: rng.gen_range(Particle::MIN_OPACITY, Particle::MAX_OPACITY),
            color,
            heading: rng.gen_range(0.0, 2.0 * PI),
            age: 0,
            lifetime: rng.gen_range(Particle::MIN_LIFETIME, Particle::MAX_LIFETIME),
            boost: 0.0,
        }
    }

    pub fn velocity(&self) -> [f64; 2] {
        [self.heading.cos() * self.speed, self.heading.sin() * self.speed]
    }

    pub fn is_expired(&self) -> bool {
        self.age > self.lifetime
    }

    /// Moves one step and ages by one frame. The caller replaces expired particles.
    ///
    /// The field wraps, so the pointer is measured across edges: a particle just
    /// past the right edge of a pointer near the left edge is pulled too.
    pub fn advanced(&self, ctx: &TickContext<'_>) -> Particle {
        let [vx, vy] = self.velocity();
        let mut pos = [self.pos[0] + vx, self.pos[1] + vy];
        let mut boost = 0.0;

        let pointer = Pointer {
            pos: ctx.viewport.nearest_image(ctx.pointer.pos, self.pos),
            ..ctx.pointer
        };
        if let Some(force) = pointer.pull_on(self.pos, ctx.attraction_radius) {
            let start_distance = pointer.distance_to(self.pos);
            pos = pointer.attract(pos, start_distance, force * ctx.attraction_strength);
            boost = force;
        }

        Particle {
            pos: ctx.viewport.wrap(pos),
            age: self.age.saturating_add(1),
            boost,
            ..*self
        }
    }

    /// Remaining fraction of life, 1 at birth and 0 at the last frame.
    pub fn life_fraction(&self) -> f64 {
        if self.lifetime == 0 {
            return 0.0;
        }
        (1.0 - self.age as f64 / self.lifetime as f64).max(0.0)
    }

    pub fn render_opacity(&self) -> f64 {
        let lit = (self.opacity + self.boost * 0.5).min(1.0);
        (lit * self.life_fraction()).clamp(0.0, 1.0)
    }

    pub fn render_radius(&self) -> f64 {
        self.size * (1.0 + self.boost * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0).unwrap()
    }

    fn still(pos: [f64; 2]) -> Particle {
        Particle {
            pos,
            size: 2.0,
            speed: 0.5,
            opacity: 0.5,
            color: Color::rgba(255, 0, 0, 255),
            heading: 0.0,
            age: 0,
            lifetime: 100,
            boost: 0.0,
        }
    }

    #[test]
    fn spawn_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let palette = [Color::rgba(1, 2, 3, 4), Color::rgba(5, 6, 7, 8)];
        let v = viewport();
        for _ in 0..500 {
            let p = Particle::spawn(&mut rng, &v, &palette, 1.5);
            assert!(p.pos[0] >= 0.0 && p.pos[0] < v.width);
            assert!(p.pos[1] >= 0.0 && p.pos[1] < v.height);
            assert!(p.size >= 1.0 && p.size < 4.0);
            assert!(p.speed >= 0.5 && p.speed < 2.0);
            assert!(p.opacity >= 0.2 && p.opacity < 1.0);
            assert!(p.heading >= 0.0 && p.heading < 2.0 * PI);
            assert!(p.lifetime >= 100 && p.lifetime < 400);
            assert_eq!(p.age, 0);
            assert!(palette.contains(&p.color));
        }
    }

    #[test]
    fn drifts_along_heading() {
        let v = viewport();
        let ctx = TickContext {
            viewport: &v,
            pointer: Pointer::inactive(),
            attraction_radius: 150.0,
            attraction_strength: 2.0,
        };
        let p = Particle {
            heading: PI / 2.0,
            speed: 2.0,
            ..still([100.0, 100.0])
        };
        let next = p.advanced(&ctx);
        assert!((next.pos[0] - 100.0).abs() < 1e-9);
        assert!((next.pos[1] - 102.0).abs() < 1e-9);
        assert_eq!(next.age, 1);
        assert_eq!(next.boost, 0.0);
    }

    #[test]
    fn boost_is_transient() {
        let v = viewport();
        let near = TickContext {
            viewport: &v,
            pointer: Pointer::new(150.0, 100.0, true),
            attraction_radius: 150.0,
            attraction_strength: 2.0,
        };
        let p = still([100.0, 100.0]);
        let pulled = p.advanced(&near);
        assert!(pulled.boost > 0.0);
        assert!(pulled.render_radius() > p.size);
        assert_eq!(pulled.size, p.size);

        let away = TickContext {
            pointer: Pointer::inactive(),
            ..near
        };
        let released = pulled.advanced(&away);
        assert_eq!(released.boost, 0.0);
        assert_eq!(released.render_radius(), p.size);
    }

    #[test]
    fn render_opacity_fades_with_age_and_stays_in_range() {
        let mut p = still([0.0, 0.0]);
        p.opacity = 0.9;
        p.boost = 1.0;
        assert_eq!(p.render_opacity(), 1.0);
        p.age = 50;
        assert!((p.render_opacity() - 0.5).abs() < 1e-12);
        p.age = 100;
        assert_eq!(p.render_opacity(), 0.0);
    }
}
