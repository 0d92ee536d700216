// Pointer attractor: tracks the cursor position and whether it is over the
// viewport, and works out how strongly it pulls on a nearby particle

use nalgebra_glm as glm;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pointer {
    pub pos: [f64; 2],
    pub active: bool,
}

impl Default for Pointer {
    fn default() -> Self {
        Pointer::inactive()
    }
}

impl Pointer {
    pub const DEFAULT_RADIUS: f64 = 150.0;
    pub const DEFAULT_STRENGTH: f64 = 2.0;

    pub fn new(x: f64, y: f64, active: bool) -> Self {
        Pointer {
            pos: [x, y],
            active,
        }
    }

    pub fn inactive() -> Self {
        Pointer {
            pos: [0.0, 0.0],
            active: false,
        }
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.pos = [x, y];
    }

    pub fn distance_to(&self, pos: [f64; 2]) -> f64 {
        glm::distance(
            &glm::vec2(self.pos[0], self.pos[1]),
            &glm::vec2(pos[0], pos[1]),
        )
    }

    // Attraction force in (0, 1] for a point strictly inside `radius`.
    // A point sitting exactly on the pointer has no direction to be pulled in.
    pub fn pull_on(&self, pos: [f64; 2], radius: f64) -> Option<f64> {
        if !self.active {
            return None;
        }
        let distance = self.distance_to(pos);
        if distance > 0.0 && distance < radius {
            Some((radius - distance) / radius)
        } else {
            None
        }
    }

    // Moves `drifted` toward the pointer by `pull` pixels, then limits the result so it
    // ends no farther than `start_distance - pull` from the pointer.
    // Drift away from the pointer can never outrun the pull.
    pub fn attract(&self, drifted: [f64; 2], start_distance: f64, pull: f64) -> [f64; 2] {
        let pointer = glm::vec2(self.pos[0], self.pos[1]);
        let here = glm::vec2(drifted[0], drifted[1]);
        let pull = pull.min(start_distance);

        let to_pointer = pointer - here;
        let candidate = if glm::length(&to_pointer) > 0.0 {
            here + glm::normalize(&to_pointer) * pull.min(glm::length(&to_pointer))
        } else {
            here
        };

        let limit = start_distance - pull;
        let offset = candidate - pointer;
        let out = if glm::length(&offset) > limit {
            pointer + glm::normalize(&offset) * limit
        } else {
            candidate
        };
        [out.x, out.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_pointer_never_pulls() {
        let p = Pointer::new(10.0, 10.0, false);
        assert_eq!(p.pull_on([12.0, 10.0], 150.0), None);
    }

    #[test]
    fn pull_falls_off_linearly() {
        let p = Pointer::new(0.0, 0.0, true);
        let force = p.pull_on([75.0, 0.0], 150.0).unwrap();
        assert!((force - 0.5).abs() < 1e-12);
        assert_eq!(p.pull_on([150.0, 0.0], 150.0), None);
        assert_eq!(p.pull_on([0.0, 0.0], 150.0), None);
    }

    #[test]
    fn attract_never_ends_farther_than_it_started() {
        let p = Pointer::new(100.0, 100.0, true);
        // drift carried the point away from the pointer
        let out = p.attract([160.0, 100.0], 50.0, 1.0);
        assert!(p.distance_to(out) <= 49.0 + 1e-9);
        assert!(p.distance_to(out) < 50.0);
    }

    #[test]
    fn attract_does_not_overshoot_the_pointer() {
        let p = Pointer::new(0.0, 0.0, true);
        let out = p.attract([0.5, 0.0], 0.5, 2.0);
        assert!(p.distance_to(out) < 1e-9);
    }
}
