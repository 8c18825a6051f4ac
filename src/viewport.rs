//! Viewport fitting
//!
//! Pure calculations that frame node positions inside a fixed-size viewport.
//! The result is a scale-then-translate transform for the renderer to apply:
//! `screen = world * scale + translate`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::geometry::Vec2;

/// Scale and translation handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl ViewTransform {
    /// Map a world point to viewport coordinates
    pub fn apply(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Create an empty bounding box
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.include_point(point);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include_point(&mut self, point: Vec2) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Frame `positions` inside a `viewport_width` x `viewport_height` viewport
///
/// `padding` is added to both spans so glyphs at the edge are not clipped. Spans
/// never drop below one unit, which keeps a single node from producing an
/// infinite scale when no padding is given.
pub fn compute_fit(
    positions: &[Vec2],
    viewport_width: f32,
    viewport_height: f32,
    padding: f32,
) -> GraphResult<ViewTransform> {
    let bounds = BoundingBox::from_points(positions.iter().copied());
    if bounds.is_empty() {
        return Err(GraphError::EmptyGraph);
    }

    let span_x = (bounds.width() + padding).max(1.0);
    let span_y = (bounds.height() + padding).max(1.0);
    let scale = (viewport_width / span_x).min(viewport_height / span_y);

    let center = bounds.center();
    let fit = ViewTransform {
        scale,
        translate_x: viewport_width / 2.0 - scale * center.x,
        translate_y: viewport_height / 2.0 - scale * center.y,
    };

    debug!(
        nodes = positions.len(),
        scale = fit.scale,
        dx = fit.translate_x,
        dy = fit.translate_y,
        "computed fit"
    );
    Ok(fit)
}

/// Rough zoom for a freshly loaded graph whose nodes have not spread yet
///
/// Scale shrinks as the graph grows; the viewport center stays fixed.
pub fn compute_initial_fit(
    node_count: usize,
    viewport_width: f32,
    viewport_height: f32,
) -> ViewTransform {
    let exponent = node_count as f64 - 50.0;
    let scale = (0.95_f64.powf(exponent) + 3.0) as f32;
    ViewTransform {
        scale,
        translate_x: -(viewport_width / 2.0) * (scale - 1.0),
        translate_y: -(viewport_height / 2.0) * (scale - 1.0),
    }
}

/// Viewport dimensions plus the padding used when fitting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFitter {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl ViewportFitter {
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn fit(&self, positions: &[Vec2]) -> GraphResult<ViewTransform> {
        compute_fit(positions, self.width, self.height, self.padding)
    }

    pub fn initial_fit(&self, node_count: usize) -> ViewTransform {
        compute_initial_fit(node_count, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn single_node_is_centered() {
        let fit = compute_fit(&[Vec2::new(10.0, 10.0)], 200.0, 200.0, 10.0).unwrap();

        // Span is just the padding: 200 / 10
        assert_eq!(fit.scale, 20.0);
        let mapped = fit.apply(Vec2::new(10.0, 10.0));
        assert!(close(mapped.x, 100.0));
        assert!(close(mapped.y, 100.0));
        assert!(fit.scale <= 200.0 / 10.0);
    }

    #[test]
    fn scale_uses_tighter_axis() {
        let positions = [Vec2::new(-100.0, -50.0), Vec2::new(100.0, 50.0)];
        let fit = compute_fit(&positions, 800.0, 600.0, 0.0).unwrap();

        // min(800 / 200, 600 / 100)
        assert_eq!(fit.scale, 4.0);
        assert!(close(fit.translate_x, 400.0));
        assert!(close(fit.translate_y, 300.0));
    }

    #[test]
    fn padding_shrinks_scale() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0)];
        let tight = compute_fit(&positions, 500.0, 500.0, 0.0).unwrap();
        let padded = compute_fit(&positions, 500.0, 500.0, 25.0).unwrap();

        assert_eq!(tight.scale, 5.0);
        assert_eq!(padded.scale, 4.0);
    }

    #[test]
    fn whole_box_lands_inside_viewport() {
        let positions = [
            Vec2::new(-40.0, 12.0),
            Vec2::new(310.0, -80.0),
            Vec2::new(55.0, 400.0),
        ];
        let fit = compute_fit(&positions, 640.0, 480.0, 10.0).unwrap();
        for p in positions {
            let mapped = fit.apply(p);
            assert!(mapped.x >= 0.0 && mapped.x <= 640.0);
            assert!(mapped.y >= 0.0 && mapped.y <= 480.0);
        }
    }

    #[test]
    fn empty_positions_fail() {
        let result = compute_fit(&[], 200.0, 200.0, 10.0);
        assert!(matches!(result, Err(GraphError::EmptyGraph)));
    }

    #[test]
    fn initial_fit_at_fifty_nodes() {
        let fit = compute_initial_fit(50, 800.0, 600.0);
        assert!(close(fit.scale, 4.0));
        assert!(close(fit.translate_x, -1200.0));
        assert!(close(fit.translate_y, -900.0));
    }

    #[test]
    fn initial_fit_shrinks_with_node_count() {
        let mut previous = f32::INFINITY;
        for count in [0, 10, 50, 100, 500] {
            let scale = compute_initial_fit(count, 800.0, 600.0).scale;
            assert!(scale < previous);
            assert!(scale > 3.0);
            previous = scale;
        }
    }

    #[test]
    fn initial_fit_keeps_viewport_center_fixed() {
        let fit = compute_initial_fit(120, 800.0, 600.0);
        let mapped = fit.apply(Vec2::new(400.0, 300.0));
        assert!(close(mapped.x, 400.0));
        assert!(close(mapped.y, 300.0));
    }

    #[test]
    fn bounding_box_tracks_extremes() {
        let bb = BoundingBox::from_points([Vec2::new(10.0, 20.0), Vec2::new(-5.0, 30.0)]);
        assert!(!bb.is_empty());
        assert_eq!(bb.min_x, -5.0);
        assert_eq!(bb.max_x, 10.0);
        assert_eq!(bb.width(), 15.0);
        assert_eq!(bb.height(), 10.0);
        assert_eq!(bb.center(), Vec2::new(2.5, 25.0));
    }

    #[test]
    fn bounding_box_empty() {
        assert!(BoundingBox::empty().is_empty());
    }
}
