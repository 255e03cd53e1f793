//! Pointer and host-viewport event types plus the highlight arm state machine.
//!
//! The minimap does not subscribe to anything itself. The glue layer that
//! embeds it forwards two event streams as plain method calls:
//!
//! * `MouseEvent`s delivered to the minimap control (press / move / release
//!   in control-local pixel coordinates).
//! * `ViewportEvent`s observed on the host editor's interactive surface. Only
//!   the kind matters; the minimap uses them to decide whether the next host
//!   selection change should trigger a highlight-all-occurrences action.
//!
//! Arm state machine (pure transitions, no side effects):
//!
//! ```text
//!            host double-click
//! Disarmed ─────────────────────▶ Armed
//!    ▲                              │
//!    │  selection changed (fires)   │
//!    │  host mouse press            │
//!    └──────────────────────────────┘
//! ```
//!
//! Moves and releases on the host surface keep the current state so a
//! double-click followed by a drag still highlights the final selection.

use std::fmt;

bitflags::bitflags! {
    /// Buttons currently held on the control.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ButtonMask: u8 {
        const LEFT   = 0b0000_0001;
        const MIDDLE = 0b0000_0010;
        const RIGHT  = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub fn mask(self) -> ButtonMask {
        match self {
            MouseButton::Left => ButtonMask::LEFT,
            MouseButton::Middle => ButtonMask::MIDDLE,
            MouseButton::Right => ButtonMask::RIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Moved,
    DoubleClick(MouseButton),
}

/// Pointer event in control-local pixel coordinates. Coordinates may lie
/// outside the control while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: f32,
    pub y: f32,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }
}

/// Event observed on the host editor's interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEvent {
    Press,
    DoubleClick,
    Move,
    Release,
    /// Anything that is not a pointer event (paint, focus, ...).
    Other,
}

impl From<MouseEventKind> for ViewportEvent {
    fn from(kind: MouseEventKind) -> Self {
        match kind {
            MouseEventKind::Down(_) => ViewportEvent::Press,
            MouseEventKind::Up(_) => ViewportEvent::Release,
            MouseEventKind::Moved => ViewportEvent::Move,
            MouseEventKind::DoubleClick(_) => ViewportEvent::DoubleClick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArmState {
    #[default]
    Disarmed,
    Armed,
}

impl ArmState {
    pub fn is_armed(self) -> bool {
        matches!(self, ArmState::Armed)
    }

    /// Transition on a host-surface event.
    #[must_use]
    pub fn on_viewport_event(self, event: ViewportEvent) -> ArmState {
        match event {
            ViewportEvent::DoubleClick => ArmState::Armed,
            ViewportEvent::Press => ArmState::Disarmed,
            ViewportEvent::Move | ViewportEvent::Release | ViewportEvent::Other => self,
        }
    }

    /// Transition on a host selection change. Returns the next state and
    /// whether the change should be captured as the highlight target.
    #[must_use]
    pub fn on_selection_changed(self) -> (ArmState, bool) {
        (ArmState::Disarmed, self.is_armed())
    }
}

impl fmt::Display for ArmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmState::Disarmed => f.write_str("disarmed"),
            ArmState::Armed => f.write_str("armed"),
        }
    }
}
