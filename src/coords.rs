use winit::dpi::PhysicalPosition;

/// Surface bounding box in logical (CSS-style) pixels.
///
/// Always rebuilt from the live window geometry at event time; resizes can
/// land between pointer events, so a cached box would go stale.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn from_origin(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// Maps pointer positions to grid cell indices.
///
/// Holds only the grid dimension; all geometry is passed in per call so the
/// mapping always reflects the current surface size.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    n: usize,
}

/// Device-pixel pointer position to logical pixels.
pub fn to_logical(position: PhysicalPosition<f64>, scale_factor: f64) -> (f64, f64) {
    (position.x / scale_factor, position.y / scale_factor)
}

impl CoordinateMapper {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Resolves a logical pointer position to `(row, col)`.
    ///
    /// Positions on or beyond a surface edge clamp to the nearest edge cell;
    /// that is the deliberate edge policy, not an error, so the grid never
    /// sees an out-of-range index from pointer input.
    pub fn pointer_to_cell(&self, x: f64, y: f64, surface: &BoundingBox) -> (usize, usize) {
        let cell_w = surface.width / self.n as f64;
        let cell_h = surface.height / self.n as f64;

        let col = ((x - surface.x) / cell_w).floor();
        let row = ((y - surface.y) / cell_h).floor();

        let max = (self.n - 1) as f64;
        let col = col.clamp(0.0, max) as usize;
        let row = row.clamp(0.0, max) as usize;
        (row, col)
    }
}
