use crate::error::{FieldError, Result};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Result<Viewport> {
        if !(width.is_finite() && width > 0.0) {
            return Err(FieldError::invalid("width", format!("{} is not a positive size", width)));
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(FieldError::invalid("height", format!("{} is not a positive size", height)));
        }
        Ok(Viewport { width, height })
    }

    /// Toroidal wrap: leaving through one edge re-enters through the opposite one,
    /// keeping the overshoot. The result always lies inside the viewport.
    pub fn wrap(&self, pos: [f64; 2]) -> [f64; 2] {
        [wrap_axis(pos[0], self.width), wrap_axis(pos[1], self.height)]
    }

    pub fn contains(&self, pos: [f64; 2]) -> bool {
        (0.0..=self.width).contains(&pos[0]) && (0.0..=self.height).contains(&pos[1])
    }

    /// The copy of `anchor`, shifted by whole viewport sizes, closest to `to`.
    /// Anchors outside the viewport have no copies and are returned unchanged.
    pub fn nearest_image(&self, anchor: [f64; 2], to: [f64; 2]) -> [f64; 2] {
        if !self.contains(anchor) {
            return anchor;
        }
        [
            image_axis(anchor[0], to[0], self.width),
            image_axis(anchor[1], to[1], self.height),
        ]
    }

    /// Distance across the wrapped edges (minimum image).
    pub fn toroidal_distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
        let image = self.nearest_image(a, b);
        (image[0] - b[0]).hypot(image[1] - b[1])
    }
}

fn image_axis(anchor: f64, to: f64, extent: f64) -> f64 {
    anchor + extent * ((to - anchor) / extent).round()
}

fn wrap_axis(value: f64, extent: f64) -> f64 {
    if value < 0.0 || value > extent {
        value.rem_euclid(extent).clamp(0.0, extent)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_viewports() {
        assert!(Viewport::new(0.0, 10.0).is_err());
        assert!(Viewport::new(10.0, -1.0).is_err());
        assert!(Viewport::new(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn wraps_every_edge() {
        let v = Viewport::new(800.0, 600.0).unwrap();
        let [x, _] = v.wrap([800.25, 10.0]);
        assert!((x - 0.25).abs() < 1e-9);
        let [x, _] = v.wrap([-0.25, 10.0]);
        assert!((x - 799.75).abs() < 1e-9);
        let [_, y] = v.wrap([10.0, 600.5]);
        assert!((y - 0.5).abs() < 1e-9);
        let [_, y] = v.wrap([10.0, -1.0]);
        assert!((y - 599.0).abs() < 1e-9);
    }

    #[test]
    fn distance_wraps_around_edges() {
        let v = Viewport::new(800.0, 600.0).unwrap();
        assert_eq!(v.nearest_image([10.0, 300.0], [790.0, 300.0]), [810.0, 300.0]);
        assert!((v.toroidal_distance([10.0, 300.0], [790.0, 300.0]) - 20.0).abs() < 1e-9);
        assert!((v.toroidal_distance([400.0, 5.0], [400.0, 595.0]) - 10.0).abs() < 1e-9);
        assert!((v.toroidal_distance([100.0, 100.0], [200.0, 100.0]) - 100.0).abs() < 1e-9);
        // outside anchors are measured as they are
        assert_eq!(v.nearest_image([-50.0, 300.0], [790.0, 300.0]), [-50.0, 300.0]);
    }

    #[test]
    fn leaves_inside_points_alone() {
        let v = Viewport::new(800.0, 600.0).unwrap();
        assert_eq!(v.wrap([800.0, 0.0]), [800.0, 0.0]);
        assert!(v.contains([400.0, 300.0]));
    }
}
