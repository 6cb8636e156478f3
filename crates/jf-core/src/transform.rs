//! Screen ↔ canvas coordinate mapping.
//!
//! Steps are stored in canvas space. The view transform `(x, y, scale)`
//! maps canvas space onto the viewport's pixel space:
//!
//! ```text
//! screen = canvas * scale + offset
//! canvas = (screen - offset) / scale
//! ```
//!
//! Both directions are computed straight from one snapshot of the transform
//! with no intermediate rounding, so they are exact inverses up to
//! floating-point error.

use crate::model::Bounds;
use serde::{Deserialize, Serialize};

/// The canvas (viewport) dimensions in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Pan offset + scale of one editor session's view. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub x: f64,
    pub y: f64,
    scale: f64,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CanvasTransform {
    pub const IDENTITY: CanvasTransform = CanvasTransform {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
    };

    /// Build a transform. Returns `None` unless `scale` is finite and > 0.
    pub fn new(x: f64, y: f64, scale: f64) -> Option<Self> {
        (scale.is_finite() && scale > 0.0).then_some(Self { x, y, scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn screen_to_canvas(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.scale, (sy - self.y) / self.scale)
    }

    pub fn canvas_to_screen(&self, cx: f64, cy: f64) -> (f64, f64) {
        (cx * self.scale + self.x, cy * self.scale + self.y)
    }

    /// Map a canvas-space rectangle to its on-screen rectangle.
    pub fn bounds_to_screen(&self, b: &Bounds) -> Bounds {
        let (x, y) = self.canvas_to_screen(b.x, b.y);
        Bounds {
            x,
            y,
            width: b.width * self.scale,
            height: b.height * self.scale,
        }
    }

    /// Set the pan offset, leaving scale untouched.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Canvas-space point shown at the centre of `viewport`.
    pub fn view_center(&self, viewport: Viewport) -> (f64, f64) {
        (
            (-self.x + viewport.width / 2.0) / self.scale,
            (-self.y + viewport.height / 2.0) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    #[test]
    fn identity_is_noop() {
        let t = CanvasTransform::default();
        assert_eq!(t.screen_to_canvas(12.5, -3.0), (12.5, -3.0));
        assert_eq!(t.canvas_to_screen(12.5, -3.0), (12.5, -3.0));
        assert!(t.is_identity());
    }

    #[test]
    fn roundtrip_across_transforms() {
        let transforms = [
            CanvasTransform::new(0.0, 0.0, 1.0).unwrap(),
            CanvasTransform::new(-350.25, 88.0, 1.0).unwrap(),
            CanvasTransform::new(12.0, -40.0, 0.37).unwrap(),
            CanvasTransform::new(1e4, 1e4, 3.5).unwrap(),
        ];
        let points = [(0.0, 0.0), (123.4, -56.7), (-9999.0, 0.001)];
        for t in transforms {
            for p in points {
                let s = t.canvas_to_screen(p.0, p.1);
                assert!(close(t.screen_to_canvas(s.0, s.1), p), "{t:?} {p:?}");
                let c = t.screen_to_canvas(p.0, p.1);
                assert!(close(t.canvas_to_screen(c.0, c.1), p), "{t:?} {p:?}");
            }
        }
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(CanvasTransform::new(0.0, 0.0, 0.0).is_none());
        assert!(CanvasTransform::new(0.0, 0.0, -1.0).is_none());
        assert!(CanvasTransform::new(0.0, 0.0, f64::NAN).is_none());
    }

    #[test]
    fn view_center_accounts_for_pan_and_scale() {
        let t = CanvasTransform::new(-200.0, 100.0, 2.0).unwrap();
        let c = t.view_center(Viewport {
            width: 800.0,
            height: 600.0,
        });
        assert!(close(c, (300.0, 100.0)));
    }

    #[test]
    fn reset_restores_identity() {
        let mut t = CanvasTransform::new(5.0, 6.0, 2.0).unwrap();
        t.reset();
        assert!(t.is_identity());
    }
}
