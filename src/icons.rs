use std::path::{Path, PathBuf};
use std::thread;

use winit::event_loop::EventLoopProxy;

use crate::grid::Occupancy;

/// Events posted back to the winit loop from outside it.
#[derive(Debug)]
pub enum PlanEvent {
    IconsLoaded(IconSet),
}

/// A decoded RGBA icon.
#[derive(Debug, Clone)]
pub struct IconImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// The free-seat and occupied-seat icons. Either may be missing if its file
/// failed to load; rendering degrades for that state instead of failing.
#[derive(Debug, Default, Clone)]
pub struct IconSet {
    pub free: Option<IconImage>,
    pub occupied: Option<IconImage>,
}

impl IconSet {
    pub fn for_state(&self, value: Occupancy) -> Option<&IconImage> {
        match value {
            Occupancy::Free => self.free.as_ref(),
            Occupancy::Occupied => self.occupied.as_ref(),
        }
    }
}

fn decode(path: &Path) -> Option<IconImage> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = (rgba.width(), rgba.height());
            log::debug!("loaded icon {} ({}x{})", path.display(), width, height);
            Some(IconImage {
                width,
                height,
                rgba: rgba.into_raw(),
            })
        }
        Err(err) => {
            // Non-fatal: seats render without an icon for this state.
            log::warn!("failed to load icon {}: {}", path.display(), err);
            None
        }
    }
}

/// Decodes both icons on a background thread and posts the result to the
/// event loop. Fires exactly once; the controller performs the corrective
/// full render when the set arrives.
pub fn spawn_load(proxy: EventLoopProxy<PlanEvent>, free: PathBuf, occupied: PathBuf) {
    thread::spawn(move || {
        let set = IconSet {
            free: decode(&free),
            occupied: decode(&occupied),
        };
        // Send fails only if the loop is already gone; nothing left to do then.
        if proxy.send_event(PlanEvent::IconsLoaded(set)).is_err() {
            log::debug!("event loop closed before icons finished loading");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_set_selects_by_occupancy() {
        let icon = IconImage {
            width: 2,
            height: 2,
            rgba: vec![255; 16],
        };
        let set = IconSet {
            free: Some(icon),
            occupied: None,
        };
        assert!(set.for_state(Occupancy::Free).is_some());
        assert!(set.for_state(Occupancy::Occupied).is_none());
    }

    #[test]
    fn missing_file_decodes_to_none() {
        assert!(decode(Path::new("does/not/exist.png")).is_none());
    }
}
