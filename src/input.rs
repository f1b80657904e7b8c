use crate::coords::{BoundingBox, CoordinateMapper};
use crate::error::PlanError;
use crate::grid::GridState;
use crate::icons::IconSet;
use crate::render::{PixelSurface, RenderEngine};

/// Full-render scheduling state. Resize notifications move Idle to Scheduled;
/// duplicates while Scheduled are dropped, and the redraw callback moves back
/// to Idle. At most one full render per frame falls out of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderSchedule {
    Idle,
    Scheduled,
}

/// One-way lifecycle flag. Destroyed suppresses every later event, including
/// renders that were already scheduled when teardown happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Liveness {
    Active,
    Destroyed,
}

/// A pointer-down event, already translated out of the host's event type.
/// Non-primary pointers (extra touches during multi-touch) carry
/// `is_primary = false` and are ignored deterministically.
#[derive(Debug, Clone, Copy)]
pub struct PointerSample {
    /// Logical pixels, window-relative.
    pub x: f64,
    pub y: f64,
    pub is_primary: bool,
}

/// Latest surface geometry reported by a resize or scale-factor event.
#[derive(Debug, Clone, Copy)]
struct SurfaceGeometry {
    logical_width: f64,
    logical_height: f64,
    scale_factor: f64,
}

/// Wires the three event sources (pointer-down, resize, teardown) to the
/// grid state and the render engine. Runs entirely on the event-loop thread;
/// nothing here is shared or locked.
pub struct InputController<S: PixelSurface> {
    grid: GridState,
    mapper: CoordinateMapper,
    engine: RenderEngine<S>,
    schedule: RenderSchedule,
    liveness: Liveness,
    geometry: Option<SurfaceGeometry>,
}

impl<S: PixelSurface> InputController<S> {
    pub fn new(grid: GridState, engine: RenderEngine<S>) -> Self {
        let mapper = CoordinateMapper::new(grid.dimension());
        Self {
            grid,
            mapper,
            engine,
            schedule: RenderSchedule::Idle,
            liveness: Liveness::Active,
            geometry: None,
        }
    }

    /// Primary pointer-down: resolve the cell against the live bounding box,
    /// toggle it, repaint just that cell. `InvalidIndex` cannot occur here
    /// because the mapper clamps; if it surfaces anyway it propagates as the
    /// fatal assertion it is.
    pub fn pointer_down(
        &mut self,
        sample: PointerSample,
        surface: &BoundingBox,
    ) -> Result<(), PlanError> {
        if self.liveness == Liveness::Destroyed || !sample.is_primary {
            return Ok(());
        }
        let (row, col) = self.mapper.pointer_to_cell(sample.x, sample.y, surface);
        let value = self.grid.toggle(row, col)?;
        log::debug!("seat ({row}, {col}) -> {value:?}");
        self.engine.render_cell(row, col, value)
    }

    /// Resize/scale notification. Records the geometry and reports whether a
    /// redraw should be requested: `true` only on the Idle -> Scheduled
    /// transition, so a burst of notifications asks for exactly one frame.
    pub fn surface_resized(
        &mut self,
        logical_width: f64,
        logical_height: f64,
        scale_factor: f64,
    ) -> bool {
        if self.liveness == Liveness::Destroyed {
            return false;
        }
        // A minimized window reports zero extent; there is nothing to render
        // and a zero-sized backing store cannot be allocated.
        if logical_width <= 0.0 || logical_height <= 0.0 {
            return false;
        }
        self.geometry = Some(SurfaceGeometry {
            logical_width,
            logical_height,
            scale_factor,
        });
        if self.schedule == RenderSchedule::Scheduled {
            return false;
        }
        self.schedule = RenderSchedule::Scheduled;
        true
    }

    /// The deferred render pass, run from the redraw callback. Uses the most
    /// recent geometry recorded by `surface_resized`; every intermediate
    /// state of a resize burst has been coalesced away by then. Also serves
    /// plain expose redraws, which repaint without reallocating.
    pub fn run_scheduled_render(&mut self) -> Result<(), PlanError> {
        if self.liveness == Liveness::Destroyed {
            return Ok(());
        }
        self.schedule = RenderSchedule::Idle;
        let Some(geometry) = self.geometry else {
            return Ok(());
        };
        self.engine.configure_surface(
            geometry.logical_width,
            geometry.logical_height,
            geometry.scale_factor,
        )?;
        self.engine.full_render(&self.grid)
    }

    /// Icon-set arrival; the engine runs its one corrective full render if
    /// geometry is already established.
    pub fn icons_loaded(&mut self, icons: IconSet) -> Result<(), PlanError> {
        if self.liveness == Liveness::Destroyed {
            return Ok(());
        }
        self.engine.install_icons(icons, &self.grid)
    }

    /// One-way transition; pending scheduled work will be skipped.
    pub fn destroy(&mut self) {
        if self.liveness == Liveness::Active {
            log::debug!("seat plan torn down");
            self.liveness = Liveness::Destroyed;
        }
    }

    #[cfg(test)]
    fn engine(&mut self) -> &mut RenderEngine<S> {
        &mut self.engine
    }

    #[cfg(test)]
    fn grid(&self) -> &GridState {
        &self.grid
    }
}

impl<S: PixelSurface> Drop for InputController<S> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Occupancy;
    use crate::render::testing::MemorySurface;

    fn controller(n: usize) -> InputController<MemorySurface> {
        let engine = RenderEngine::new(MemorySurface::new(), n);
        InputController::new(GridState::new(n), engine)
    }

    fn primary(x: f64, y: f64) -> PointerSample {
        PointerSample {
            x,
            y,
            is_primary: true,
        }
    }

    #[test]
    fn resize_burst_coalesces_to_one_render_with_final_geometry() {
        let mut ctl = controller(15);
        assert!(ctl.surface_resized(100.0, 100.0, 1.0));
        for i in 0..50 {
            assert!(!ctl.surface_resized(100.0 + i as f64, 100.0, 1.0));
        }
        assert!(!ctl.surface_resized(600.0, 600.0, 2.0));

        ctl.run_scheduled_render().unwrap();
        assert_eq!(ctl.engine().full_render_count(), 1);
        assert_eq!(ctl.engine().device_size(), (1200, 1200));

        // Next burst schedules again.
        assert!(ctl.surface_resized(600.0, 600.0, 2.0));
    }

    #[test]
    fn non_primary_pointers_are_ignored() {
        let mut ctl = controller(15);
        ctl.surface_resized(300.0, 300.0, 1.0);
        ctl.run_scheduled_render().unwrap();

        let surface = BoundingBox::from_origin(300.0, 300.0);
        ctl.pointer_down(
            PointerSample {
                x: 150.0,
                y: 150.0,
                is_primary: false,
            },
            &surface,
        )
        .unwrap();
        assert_eq!(ctl.grid().get(7, 7).unwrap(), Occupancy::Free);
    }

    #[test]
    fn destroyed_controller_skips_scheduled_render() {
        let mut ctl = controller(15);
        assert!(ctl.surface_resized(300.0, 300.0, 1.0));
        ctl.destroy();
        ctl.run_scheduled_render().unwrap();
        assert_eq!(ctl.engine().full_render_count(), 0);
        assert_eq!(ctl.engine().surface().presents, 0);
        assert!(!ctl.surface_resized(300.0, 300.0, 1.0));
    }

    #[test]
    fn pointer_toggle_repaints_one_cell_end_to_end() {
        let n = 15;
        let mut ctl = controller(n);
        ctl.surface_resized(300.0, 300.0, 1.0);
        ctl.run_scheduled_render().unwrap();

        // Exact center of cell (7,7) on a 300x300 logical surface.
        let surface = BoundingBox::from_origin(300.0, 300.0);
        ctl.pointer_down(primary(150.0, 150.0), &surface).unwrap();

        for row in 0..n {
            for col in 0..n {
                let expected = if (row, col) == (7, 7) {
                    Occupancy::Occupied
                } else {
                    Occupancy::Free
                };
                assert_eq!(ctl.grid().get(row, col).unwrap(), expected);
            }
        }
        // The toggle repainted one cell, not the grid.
        assert_eq!(ctl.engine().full_render_count(), 1);

        // Follow-up resize to 600x600 at dpr 2: one full render, 1200x1200
        // device backing store.
        assert!(ctl.surface_resized(600.0, 600.0, 2.0));
        ctl.run_scheduled_render().unwrap();
        assert_eq!(ctl.engine().full_render_count(), 2);
        assert_eq!(ctl.engine().device_size(), (1200, 1200));
        assert_eq!(ctl.engine().generation(), 2);
    }

    #[test]
    fn icons_after_destroy_do_nothing() {
        let mut ctl = controller(15);
        ctl.surface_resized(150.0, 150.0, 1.0);
        ctl.run_scheduled_render().unwrap();
        ctl.destroy();
        ctl.icons_loaded(IconSet::default()).unwrap();
        assert_eq!(ctl.engine().full_render_count(), 1);
    }

    #[test]
    fn render_before_any_geometry_is_a_no_op() {
        let mut ctl = controller(15);
        ctl.run_scheduled_render().unwrap();
        assert_eq!(ctl.engine().full_render_count(), 0);
    }
}
