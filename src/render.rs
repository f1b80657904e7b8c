use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

use crate::error::PlanError;
use crate::grid::{GridState, Occupancy};
use crate::icons::{IconImage, IconSet};

const BACKGROUND: [u8; 4] = [24, 24, 24, 255];
const BORDER: [u8; 4] = [96, 96, 96, 255];
// Flat fills used while the icon set has not arrived yet.
const FREE_FILL: [u8; 4] = [52, 52, 52, 255];
const OCCUPIED_FILL: [u8; 4] = [148, 74, 74, 255];

/// The backing pixel store behind the render engine. Production code wraps
/// `pixels::Pixels`; tests use an in-memory buffer.
pub trait PixelSurface {
    /// Reallocates the backing store to the given device-pixel size.
    /// Prior pixel content does not survive a resize.
    fn resize(&mut self, device_width: u32, device_height: u32) -> Result<(), PlanError>;
    fn frame_mut(&mut self) -> &mut [u8];
    fn present(&mut self) -> Result<(), PlanError>;
}

pub struct WindowSurface {
    pixels: Pixels,
}

impl WindowSurface {
    /// Fatal if the GPU surface cannot be created; the shell aborts mount.
    pub fn new(window: &Window) -> Result<Self, PlanError> {
        let size = window.inner_size();
        let texture = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let pixels = Pixels::new(size.width.max(1), size.height.max(1), texture)
            .map_err(PlanError::SurfaceUnavailable)?;
        Ok(Self { pixels })
    }
}

impl PixelSurface for WindowSurface {
    fn resize(&mut self, device_width: u32, device_height: u32) -> Result<(), PlanError> {
        self.pixels
            .resize_surface(device_width, device_height)
            .map_err(|source| PlanError::SurfaceResize {
                width: device_width,
                height: device_height,
                source,
            })?;
        self.pixels
            .resize_buffer(device_width, device_height)
            .map_err(|source| PlanError::SurfaceResize {
                width: device_width,
                height: device_height,
                source,
            })
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        self.pixels.frame_mut()
    }

    fn present(&mut self) -> Result<(), PlanError> {
        self.pixels.render().map_err(PlanError::Present)
    }
}

/// One cell's rectangle in logical pixels; derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Draws the seating grid into a device-pixel backing store.
///
/// All public drawing entry points take logical units; the engine applies the
/// logical-to-device scale itself, which is what keeps strokes and icon edges
/// crisp at any pixel density. Hairline strokes are one device pixel wide
/// (1/scale logical units).
pub struct RenderEngine<S: PixelSurface> {
    surface: S,
    n: usize,
    logical_width: f64,
    logical_height: f64,
    scale_factor: f64,
    device_width: u32,
    device_height: u32,
    icons: IconSet,
    generation: u64,
    full_renders: u64,
}

impl<S: PixelSurface> RenderEngine<S> {
    pub fn new(surface: S, n: usize) -> Self {
        Self {
            surface,
            n,
            logical_width: 0.0,
            logical_height: 0.0,
            scale_factor: 1.0,
            device_width: 0,
            device_height: 0,
            icons: IconSet::default(),
            generation: 0,
            full_renders: 0,
        }
    }

    /// Adopts new surface geometry. The backing store is reallocated only
    /// when the rounded device-pixel size actually changed; reallocation
    /// wipes prior content, so a no-op resize must not reach the store.
    pub fn configure_surface(
        &mut self,
        logical_width: f64,
        logical_height: f64,
        scale_factor: f64,
    ) -> Result<(), PlanError> {
        let device_width = (logical_width * scale_factor).round() as u32;
        let device_height = (logical_height * scale_factor).round() as u32;

        if device_width != self.device_width || device_height != self.device_height {
            self.surface.resize(device_width, device_height)?;
            self.device_width = device_width;
            self.device_height = device_height;
            self.generation += 1;
            log::debug!(
                "backing store reallocated: {}x{} device px (generation {})",
                device_width,
                device_height,
                self.generation
            );
        }

        self.logical_width = logical_width;
        self.logical_height = logical_height;
        self.scale_factor = scale_factor;
        Ok(())
    }

    /// Redraws every cell. O(n^2) draw work, so callers reserve this for
    /// structural changes: resize, scale change, initial paint, icon arrival.
    pub fn full_render(&mut self, grid: &GridState) -> Result<(), PlanError> {
        self.full_renders += 1;
        let n = self.n;
        let (dw, dh) = (self.device_width, self.device_height);
        let (lw, lh) = (self.logical_width, self.logical_height);
        let scale = self.scale_factor;

        let icons = &self.icons;
        let frame = self.surface.frame_mut();
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&BACKGROUND);
        }

        for row in 0..n {
            for col in 0..n {
                let value = grid.get(row, col)?;
                let rect = Self::rect_for(n, lw, lh, row, col);
                Self::paint_cell(frame, dw, dh, &rect, scale, value, icons.for_state(value));
            }
        }
        self.surface.present()
    }

    /// Redraws a single cell after a toggle. Clears the cell rectangle plus a
    /// one-logical-pixel margin so stale border pixels from neighbours are
    /// erased, then repaints just that cell.
    pub fn render_cell(
        &mut self,
        row: usize,
        col: usize,
        value: Occupancy,
    ) -> Result<(), PlanError> {
        let rect = self.cell_rect(row, col);
        let (dw, dh) = (self.device_width, self.device_height);
        let scale = self.scale_factor;

        let icons = &self.icons;
        let frame = self.surface.frame_mut();

        let cleared = CellRect {
            x: rect.x - 1.0,
            y: rect.y - 1.0,
            width: rect.width + 2.0,
            height: rect.height + 2.0,
        };
        let (x0, y0, x1, y1) = Self::device_bounds(&cleared, scale);
        Self::fill_rect(frame, dw, dh, x0, y0, x1, y1, BACKGROUND);

        Self::paint_cell(frame, dw, dh, &rect, scale, value, icons.for_state(value));
        self.surface.present()
    }

    /// Installs the icon set and performs the one corrective full render,
    /// but only if the surface geometry is already established.
    pub fn install_icons(&mut self, icons: IconSet, grid: &GridState) -> Result<(), PlanError> {
        self.icons = icons;
        if self.has_geometry() {
            self.full_render(grid)?;
        }
        Ok(())
    }

    pub fn cell_rect(&self, row: usize, col: usize) -> CellRect {
        Self::rect_for(self.n, self.logical_width, self.logical_height, row, col)
    }

    pub fn has_geometry(&self) -> bool {
        self.device_width > 0 && self.device_height > 0
    }

    pub fn device_size(&self) -> (u32, u32) {
        (self.device_width, self.device_height)
    }

    /// Bumped on every backing-store reallocation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn full_render_count(&self) -> u64 {
        self.full_renders
    }

    #[cfg(test)]
    pub fn surface(&mut self) -> &mut S {
        &mut self.surface
    }

    fn rect_for(n: usize, logical_width: f64, logical_height: f64, row: usize, col: usize) -> CellRect {
        let width = logical_width / n as f64;
        let height = logical_height / n as f64;
        CellRect {
            x: col as f64 * width,
            y: row as f64 * height,
            width,
            height,
        }
    }

    fn device_bounds(rect: &CellRect, scale: f64) -> (i64, i64, i64, i64) {
        (
            (rect.x * scale).round() as i64,
            (rect.y * scale).round() as i64,
            ((rect.x + rect.width) * scale).round() as i64,
            ((rect.y + rect.height) * scale).round() as i64,
        )
    }

    fn paint_cell(
        frame: &mut [u8],
        device_width: u32,
        device_height: u32,
        rect: &CellRect,
        scale: f64,
        value: Occupancy,
        icon: Option<&IconImage>,
    ) {
        let (x0, y0, x1, y1) = Self::device_bounds(rect, scale);
        match icon {
            Some(img) => Self::blit_scaled(frame, device_width, device_height, img, x0, y0, x1, y1),
            None => {
                // Icons not decoded yet; a flat fill keeps the plan readable.
                let fill = match value {
                    Occupancy::Free => FREE_FILL,
                    Occupancy::Occupied => OCCUPIED_FILL,
                };
                Self::fill_rect(frame, device_width, device_height, x0, y0, x1, y1, fill);
            }
        }
        // Hairline: one device pixel regardless of scale factor.
        Self::stroke_rect(frame, device_width, device_height, x0, y0, x1, y1, BORDER);
    }

    fn fill_rect(
        frame: &mut [u8],
        device_width: u32,
        device_height: u32,
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
        color: [u8; 4],
    ) {
        for py in y0.max(0)..y1.min(device_height as i64) {
            for px in x0.max(0)..x1.min(device_width as i64) {
                let index = ((py as u32 * device_width + px as u32) * 4) as usize;
                if index + 3 < frame.len() {
                    frame[index..index + 4].copy_from_slice(&color);
                }
            }
        }
    }

    fn stroke_rect(
        frame: &mut [u8],
        device_width: u32,
        device_height: u32,
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
        color: [u8; 4],
    ) {
        for px in x0.max(0)..x1.min(device_width as i64) {
            Self::put_pixel(frame, device_width, device_height, px, y0, color);
            Self::put_pixel(frame, device_width, device_height, px, y1 - 1, color);
        }
        for py in y0.max(0)..y1.min(device_height as i64) {
            Self::put_pixel(frame, device_width, device_height, x0, py, color);
            Self::put_pixel(frame, device_width, device_height, x1 - 1, py, color);
        }
    }

    fn put_pixel(
        frame: &mut [u8],
        device_width: u32,
        device_height: u32,
        px: i64,
        py: i64,
        color: [u8; 4],
    ) {
        if px < 0 || py < 0 || px >= device_width as i64 || py >= device_height as i64 {
            return;
        }
        let index = ((py as u32 * device_width + px as u32) * 4) as usize;
        if index + 3 < frame.len() {
            frame[index..index + 4].copy_from_slice(&color);
        }
    }

    // Nearest-neighbour blit of the icon into the cell's device rectangle,
    // source-over blended so transparent icon corners keep the background.
    fn blit_scaled(
        frame: &mut [u8],
        device_width: u32,
        device_height: u32,
        icon: &IconImage,
        x0: i64,
        y0: i64,
        x1: i64,
        y1: i64,
    ) {
        let span_x = (x1 - x0).max(1) as f64;
        let span_y = (y1 - y0).max(1) as f64;

        for py in y0.max(0)..y1.min(device_height as i64) {
            let v = ((py - y0) as f64 + 0.5) / span_y;
            let sy = ((v * icon.height as f64) as u32).min(icon.height - 1);
            for px in x0.max(0)..x1.min(device_width as i64) {
                let u = ((px - x0) as f64 + 0.5) / span_x;
                let sx = ((u * icon.width as f64) as u32).min(icon.width - 1);

                let src = ((sy * icon.width + sx) * 4) as usize;
                let alpha = icon.rgba[src + 3] as u32;
                if alpha == 0 {
                    continue;
                }
                let dst = ((py as u32 * device_width + px as u32) * 4) as usize;
                if dst + 3 >= frame.len() {
                    continue;
                }
                if alpha == 255 {
                    frame[dst..dst + 4].copy_from_slice(&icon.rgba[src..src + 4]);
                } else {
                    for c in 0..3 {
                        let s = icon.rgba[src + c] as u32;
                        let d = frame[dst + c] as u32;
                        frame[dst + c] = ((s * alpha + d * (255 - alpha)) / 255) as u8;
                    }
                    frame[dst + 3] = 255;
                }
            }
        }
    }
}
