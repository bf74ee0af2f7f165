use serde::{Deserialize, Serialize};

/// Valid-pixel rectangle of an undistorted image, `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Roi {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_array(a: [i32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersect with a `width x height` frame anchored at the origin.
    pub fn clamp_to(&self, width: i32, height: i32) -> Roi {
        let x0 = self.x.clamp(0, width.max(0));
        let y0 = self.y.clamp(0, height.max(0));
        let x1 = self.x.saturating_add(self.width).clamp(x0, width.max(0));
        let y1 = self.y.saturating_add(self.height).clamp(y0, height.max(0));
        Roi::new(x0, y0, x1 - x0, y1 - y0)
    }
}
