mod config;
mod coords;
mod error;
mod grid;
mod icons;
mod input;
mod render;
mod seatmap;

use std::path::Path;

use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use crate::config::PlanConfig;
use crate::coords::{to_logical, BoundingBox};
use crate::error::PlanError;
use crate::grid::GridState;
use crate::icons::PlanEvent;
use crate::input::{InputController, PointerSample};
use crate::render::{RenderEngine, WindowSurface};

const CONFIG_PATH: &str = "seatplan.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // The hosting shell mounts one plan per venue id (first argument).
    let venue = std::env::args().nth(1).unwrap_or_else(|| "default".into());
    let config = PlanConfig::load(Path::new(CONFIG_PATH))?;
    let n = config.grid_size;

    let rows = seatmap::fetch(&venue, n, config.occupied_ratio);
    let grid = GridState::from_rows(n, &rows);

    let event_loop = EventLoopBuilder::<PlanEvent>::with_user_event().build();
    let window = WindowBuilder::new()
        .with_title(format!("Seat plan - {venue}"))
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .with_resizable(true)
        .build(&event_loop)?;

    // No drawing surface means no mount; this is the one fatal setup error.
    let surface = WindowSurface::new(&window)?;
    let engine = RenderEngine::new(surface, n);
    let mut controller = InputController::new(grid, engine);

    icons::spawn_load(
        event_loop.create_proxy(),
        config.free_icon.clone(),
        config.occupied_icon.clone(),
    );

    // Initial paint takes the same scheduled path as resizes.
    let size = window.inner_size();
    let dpr = window.scale_factor();
    if controller.surface_resized(size.width as f64 / dpr, size.height as f64 / dpr, dpr) {
        window.request_redraw();
    }

    let mut cursor: Option<PhysicalPosition<f64>> = None;
    let mut active_touch: Option<u64> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    controller.destroy();
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let dpr = window.scale_factor();
                    if controller.surface_resized(
                        size.width as f64 / dpr,
                        size.height as f64 / dpr,
                        dpr,
                    ) {
                        window.request_redraw();
                    }
                }
                WindowEvent::ScaleFactorChanged {
                    scale_factor,
                    new_inner_size,
                } => {
                    if controller.surface_resized(
                        new_inner_size.width as f64 / scale_factor,
                        new_inner_size.height as f64 / scale_factor,
                        scale_factor,
                    ) {
                        window.request_redraw();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Some(position);
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    // The mouse is always the primary pointer.
                    if let Some(position) = cursor {
                        pointer_down(&mut controller, &window, position, true, control_flow);
                    }
                }
                WindowEvent::Touch(touch) => match touch.phase {
                    TouchPhase::Started => {
                        // First active touch is primary; concurrent extras
                        // are ignored until it lifts.
                        let is_primary = active_touch.is_none();
                        if is_primary {
                            active_touch = Some(touch.id);
                        }
                        pointer_down(
                            &mut controller,
                            &window,
                            touch.location,
                            is_primary,
                            control_flow,
                        );
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        if active_touch == Some(touch.id) {
                            active_touch = None;
                        }
                    }
                    TouchPhase::Moved => {}
                },
                _ => {}
            },
            Event::RedrawRequested(_) => {
                if let Err(err) = controller.run_scheduled_render() {
                    fail(&mut controller, err, control_flow);
                }
            }
            Event::UserEvent(PlanEvent::IconsLoaded(set)) => {
                if let Err(err) = controller.icons_loaded(set) {
                    fail(&mut controller, err, control_flow);
                }
            }
            _ => {}
        }
    });
}

fn pointer_down(
    controller: &mut InputController<WindowSurface>,
    window: &Window,
    position: PhysicalPosition<f64>,
    is_primary: bool,
    control_flow: &mut ControlFlow,
) {
    // Bounding box is rebuilt from live window geometry at event time.
    let dpr = window.scale_factor();
    let size = window.inner_size();
    let surface = BoundingBox::from_origin(size.width as f64 / dpr, size.height as f64 / dpr);
    let (x, y) = to_logical(position, dpr);
    let sample = PointerSample { x, y, is_primary };
    if let Err(err) = controller.pointer_down(sample, &surface) {
        fail(controller, err, control_flow);
    }
}

fn fail(
    controller: &mut InputController<WindowSurface>,
    err: PlanError,
    control_flow: &mut ControlFlow,
) {
    log::error!("render pipeline failure: {err}");
    controller.destroy();
    *control_flow = ControlFlow::Exit;
}
