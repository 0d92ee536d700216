// Connection lines between nearby particles

use crate::config::ConnectionPolicy;
use crate::particle::Particle;
use nalgebra_glm as glm;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    pub from_index: usize,
    pub to_index: usize,
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub distance: f64,
    pub opacity: f64,
}

/// Every unordered pair closer than `threshold`, cut down to `cap` by `policy`.
pub fn find_connections(
    particles: &[Particle],
    threshold: f64,
    cap: usize,
    policy: ConnectionPolicy,
) -> Vec<Connection> {
    let mut found = Vec::with_capacity(cap.min(particles.len()));

    for (i, a) in particles.iter().enumerate() {
        let a_pos = glm::vec2(a.pos[0], a.pos[1]);
        for (j, b) in particles.iter().enumerate().skip(i + 1) {
            let distance = glm::distance(&a_pos, &glm::vec2(b.pos[0], b.pos[1]));
            if distance >= threshold {
                continue;
            }
            found.push(Connection {
                from_index: i,
                to_index: j,
                from: a.pos,
                to: b.pos,
                distance,
                opacity: (threshold - distance) / threshold,
            });
            if policy == ConnectionPolicy::IndexOrder && found.len() == cap {
                return found;
            }
        }
    }

    if policy == ConnectionPolicy::Nearest {
        found.sort_by(|x, y| {
            x.distance
                .partial_cmp(&y.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        found.truncate(cap);
    }
    found
}
