// ParticleField owns a fixed-size particle population and advances it one tick
// at a time. Each tick builds the next population from the previous one and
// swaps it in, so a population is never observed half-updated.

use crate::color::Color;
use crate::config::FieldConfig;
use crate::connection::{find_connections, Connection};
use crate::error::{FieldError, Result};
use crate::particle::{Particle, TickContext};
use crate::pointer::Pointer;
use crate::utils::Timer;
use crate::viewport::Viewport;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What the renderer needs to draw one particle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParticleSprite {
    pub pos: [f64; 2],
    pub radius: f64,
    pub opacity: f64,
    pub color: Color,
}

/// Render descriptors for one snapshot.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub sprites: Vec<ParticleSprite>,
    pub connections: Vec<Connection>,
}

pub struct ParticleField {
    config: FieldConfig,
    viewport: Viewport,
    particles: Vec<Particle>,
    rng: StdRng,
    ticks: u64,
}

impl ParticleField {
    pub fn new(config: FieldConfig) -> Result<ParticleField> {
        ParticleField::with_rng(config, StdRng::from_entropy())
    }

    /// Reproducible field, same seed gives the same population and motion.
    pub fn with_seed(config: FieldConfig, seed: u64) -> Result<ParticleField> {
        ParticleField::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, mut rng: StdRng) -> Result<ParticleField> {
        config.validate()?;
        let viewport = config.viewport()?;
        let particles = (0..config.count)
            .map(|_| Particle::spawn(&mut rng, &viewport, &config.palette, config.speed))
            .collect();
        log!(
            "particle field: {} particles over {}x{}",
            config.count,
            viewport.width,
            viewport.height
        );
        Ok(ParticleField {
            config,
            viewport,
            particles,
            rng,
            ticks: 0,
        })
    }

    /// Field seeded with an explicit population. The population size becomes the count.
    pub fn from_particles(
        mut config: FieldConfig,
        particles: Vec<Particle>,
        seed: u64,
    ) -> Result<ParticleField> {
        if particles.is_empty() {
            return Err(FieldError::invalid("count", "must be greater than zero"));
        }
        config.count = particles.len();
        let mut field = ParticleField::with_seed(config, seed)?;
        field.particles = particles;
        Ok(field)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advances every particle one step. Expired slots are refilled in place,
    /// so the population size never changes.
    pub fn tick(&mut self, pointer: Pointer) {
        let _timer = Timer::new("ParticleField::tick", self.config.profile);
        let pointer = if self.config.interactive {
            pointer
        } else {
            Pointer::inactive()
        };
        let ctx = TickContext {
            viewport: &self.viewport,
            pointer,
            attraction_radius: self.config.attraction_radius,
            attraction_strength: self.config.attraction_strength,
        };

        let rng = &mut self.rng;
        let palette = &self.config.palette;
        let speed = self.config.speed;
        let next: Vec<Particle> = self
            .particles
            .iter()
            .map(|particle| {
                let moved = particle.advanced(&ctx);
                if moved.is_expired() {
                    Particle::spawn(&mut *rng, ctx.viewport, palette, speed)
                } else {
                    moved
                }
            })
            .collect();

        self.particles = next;
        self.ticks += 1;
    }

    pub fn compute_connections(&self) -> Vec<Connection> {
        find_connections(
            &self.particles,
            self.config.connection_distance,
            self.config.max_connections,
            self.config.connection_policy,
        )
    }

    pub fn frame(&self) -> Frame {
        let sprites = self
            .particles
            .iter()
            .map(|p| ParticleSprite {
                pos: p.pos,
                radius: p.render_radius(),
                opacity: p.render_opacity(),
                color: p.color,
            })
            .collect();
        Frame {
            sprites,
            connections: self.compute_connections(),
        }
    }

    /// Wraps existing particles into the new bounds; spawns use them from now on.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        let viewport = Viewport::new(width, height)?;
        self.viewport = viewport;
        self.config.width = width;
        self.config.height = height;
        self.particles = self
            .particles
            .iter()
            .map(|p| Particle {
                pos: viewport.wrap(p.pos),
                ..*p
            })
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize) -> FieldConfig {
        FieldConfig {
            count,
            width: 400.0,
            height: 300.0,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_config() {
        assert!(ParticleField::with_seed(config(0), 1).is_err());
        let no_colors = FieldConfig {
            palette: Vec::new(),
            ..config(5)
        };
        assert!(ParticleField::with_seed(no_colors, 1).is_err());
    }

    #[test]
    fn same_seed_same_motion() {
        let mut a = ParticleField::with_seed(config(10), 42).unwrap();
        let mut b = ParticleField::with_seed(config(10), 42).unwrap();
        for _ in 0..50 {
            a.tick(Pointer::inactive());
            b.tick(Pointer::inactive());
        }
        assert_eq!(a.particles(), b.particles());
        assert_eq!(a.ticks(), 50);
    }

    #[test]
    fn non_interactive_fields_ignore_the_pointer() {
        let cfg = FieldConfig {
            interactive: false,
            ..config(20)
        };
        let mut field = ParticleField::with_seed(cfg, 9).unwrap();
        field.tick(Pointer::new(200.0, 150.0, true));
        assert!(field.particles().iter().all(|p| p.boost == 0.0));
    }

    #[test]
    fn frame_matches_population() {
        let field = ParticleField::with_seed(config(25), 5).unwrap();
        let frame = field.frame();
        assert_eq!(frame.sprites.len(), 25);
        assert!(frame.connections.len() <= 20);
    }

    #[test]
    fn resize_keeps_particles_inside() {
        let mut field = ParticleField::with_seed(config(40), 11).unwrap();
        field.resize(100.0, 50.0).unwrap();
        assert!(field.particles().iter().all(|p| field.viewport().contains(p.pos)));
        assert!(field.resize(0.0, 50.0).is_err());
    }

    #[test]
    fn from_particles_takes_count_from_the_list() {
        let seedling = ParticleField::with_seed(config(4), 1).unwrap();
        let field =
            ParticleField::from_particles(config(50), seedling.particles().to_vec(), 2).unwrap();
        assert_eq!(field.len(), 4);
        assert_eq!(field.particles(), seedling.particles());
        assert!(ParticleField::from_particles(config(1), Vec::new(), 2).is_err());
    }
}
