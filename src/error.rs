use thiserror::Error;

/// Errors surfaced by the seat-plan component.
///
/// `SurfaceUnavailable` is fatal to mount; `InvalidIndex` is a programmer
/// error that the coordinate mapper's clamping makes unreachable in normal
/// operation. Icon-load failures are not represented here because they are
/// non-fatal by design (rendering degrades until the icons arrive).
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("2D drawing surface unavailable")]
    SurfaceUnavailable(#[source] pixels::Error),

    #[error("failed to resize backing store to {width}x{height} device pixels")]
    SurfaceResize {
        width: u32,
        height: u32,
        #[source]
        source: pixels::TextureError,
    },

    #[error("failed to present frame")]
    Present(#[source] pixels::Error),

    #[error("seat index ({row}, {col}) out of range for a {n}x{n} grid")]
    InvalidIndex { row: usize, col: usize, n: usize },

    #[error("failed to read config file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file")]
    Config(#[from] serde_json::Error),
}
