//! Drag-and-drop hover tracking.
//!
//! Front ends receive nested enter/leave notifications while the pointer
//! moves across child elements, so window hover is tracked with a depth
//! counter rather than a flag.

use tracing::trace;

use crate::source::LocalFile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DragOverWindow,
    DragOverDropzone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    WindowEnter,
    WindowLeave,
    ZoneEnter,
    ZoneLeave,
    Drop,
}

/// Drop-zone state machine.
#[derive(Debug, Default)]
pub struct DropZone {
    state: DragState,
    depth: u32,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether the drop overlay should be shown.
    pub fn is_visible(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Applies `event` and returns the new state.
    pub fn handle(&mut self, event: DragEvent) -> DragState {
        match event {
            DragEvent::WindowEnter => {
                self.depth += 1;
                if self.state == DragState::Idle {
                    self.state = DragState::DragOverWindow;
                }
            }
            DragEvent::WindowLeave => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 {
                    self.state = DragState::Idle;
                }
            }
            DragEvent::ZoneEnter => {
                if self.depth == 0 {
                    self.depth = 1;
                }
                self.state = DragState::DragOverDropzone;
            }
            DragEvent::ZoneLeave => {
                if self.state == DragState::DragOverDropzone {
                    self.state = DragState::DragOverWindow;
                }
            }
            DragEvent::Drop => self.reset(),
        }
        trace!(?event, state = ?self.state, depth = self.depth, "drag event");
        self.state
    }

    /// Handles a drop. The files are returned only when they were released
    /// over the drop zone; the state returns to idle either way.
    pub fn drop_files(&mut self, files: Vec<LocalFile>) -> Option<Vec<LocalFile>> {
        let accepted = self.state == DragState::DragOverDropzone;
        self.handle(DragEvent::Drop);
        accepted.then_some(files)
    }

    fn reset(&mut self) {
        self.state = DragState::Idle;
        self.depth = 0;
    }
}
