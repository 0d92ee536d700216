// Cursor trail: the most recent pointer positions, each fading out over a fixed span

use std::collections::VecDeque;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrailPoint {
    pub pos: [f64; 2],
    pub born_ms: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrailSprite {
    pub pos: [f64; 2],
    pub opacity: f64,
    pub scale: f64,
}

pub struct CursorTrail {
    // newest first
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Default for CursorTrail {
    fn default() -> Self {
        CursorTrail::new(CursorTrail::DEFAULT_CAPACITY)
    }
}

impl CursorTrail {
    pub const DEFAULT_CAPACITY: usize = 20;
    pub const FADE_MS: f64 = 800.0;
    pub const START_OPACITY: f64 = 0.8;
    pub const END_SCALE: f64 = 0.3;

    pub fn new(capacity: usize) -> Self {
        CursorTrail {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, x: f64, y: f64, time_ms: f64) {
        self.points.push_front(TrailPoint {
            pos: [x, y],
            born_ms: time_ms,
        });
        self.points.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    /// Drops points that have fully faded, then describes the rest, newest first.
    pub fn sprites(&mut self, now_ms: f64) -> Vec<TrailSprite> {
        // oldest points sit at the back
        while let Some(oldest) = self.points.back() {
            if now_ms - oldest.born_ms >= CursorTrail::FADE_MS {
                self.points.pop_back();
            } else {
                break;
            }
        }

        self.points
            .iter()
            .map(|p| {
                let t = ((now_ms - p.born_ms) / CursorTrail::FADE_MS).clamp(0.0, 1.0);
                // ease-out, fast at first
                let eased = 1.0 - (1.0 - t) * (1.0 - t);
                TrailSprite {
                    pos: p.pos,
                    opacity: CursorTrail::START_OPACITY * (1.0 - eased),
                    scale: 1.0 - (1.0 - CursorTrail::END_SCALE) * eased,
                }
            })
            .collect()
    }
}
