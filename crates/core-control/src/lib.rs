//! The minimap scrollbar control.
//!
//! `ScrollMap` owns the shadow document, the scale state, the last rendered
//! preview and the highlight state for one host editor. The embedding glue
//! forwards host notifications and pointer input as method calls; every call
//! completes synchronously (resync, rescale, rerender) before returning.
//!
//! Refresh order inside one call is fixed: resync the shadow, recompute the
//! auto-shrink factor, rasterize. Pointer mapping and painting always read
//! the scale computed by the most recent refresh.
//!
//! Input handling:
//! * Left press jumps so the viewport is centred on the pointer; moves keep
//!   scrolling while the left button is held, wherever the pointer is.
//! * Right press clears the highlight and rerenders.
//! * A double-click on the host surface arms the highlight; the next host
//!   selection change captures the selected text as the new target.

use std::sync::Arc;

pub mod highlight;

pub use highlight::HighlightEngine;

use core_config::Settings;
use core_events::{ArmState, ButtonMask, MouseButton, MouseEvent, MouseEventKind, ViewportEvent};
use core_model::{Geometry, HostView, RectF, ScaleState, Size, visible_line_count};
use core_render::{PixelBuffer, PreviewImage, Rasterizer, RenderError};
use core_text::{ResyncReport, ShadowDocument};
use tracing::{debug, info, trace};

#[derive(Debug)]
pub struct ScrollMap {
    settings: Arc<Settings>,
    shadow: ShadowDocument,
    scale: ScaleState,
    size: Size,
    rasterizer: Rasterizer,
    preview: PreviewImage,
    highlight: HighlightEngine,
    arm: ArmState,
    buttons: ButtonMask,
}

impl ScrollMap {
    /// Snapshot `host` and render the first preview. Fails only when the
    /// configured font file cannot be loaded.
    pub fn new<H: HostView + ?Sized>(host: &H, settings: Arc<Settings>) -> Result<Self, RenderError> {
        let rasterizer = Rasterizer::from_settings(&settings)?;
        let shadow = ShadowDocument::snapshot(host, settings.text_option);
        let size = Size::new(settings.scroll_bar_width, 0);
        let mut map = Self {
            scale: ScaleState::new(settings.x_scale, settings.y_scale),
            highlight: HighlightEngine::new(&settings),
            preview: PreviewImage {
                image: PixelBuffer::new(0, 0, settings.background_color),
                logical: Size::default(),
                content_height_px: 0.0,
            },
            settings,
            shadow,
            size,
            rasterizer,
            arm: ArmState::default(),
            buttons: ButtonMask::empty(),
        };
        map.refresh();
        info!(
            target: "control",
            blocks = map.shadow.block_count(),
            lines = map.shadow.line_count(),
            width = map.size.width,
            "scrollmap_created"
        );
        Ok(map)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn shadow(&self) -> &ShadowDocument {
        &self.shadow
    }

    pub fn scale(&self) -> &ScaleState {
        &self.scale
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn preview(&self) -> &PreviewImage {
        &self.preview
    }

    pub fn arm_state(&self) -> ArmState {
        self.arm
    }

    pub fn highlight_target(&self) -> &str {
        self.highlight.target()
    }

    pub fn held_buttons(&self) -> ButtonMask {
        self.buttons
    }

    /// Preferred size: configured width, no height preference.
    pub fn size_hint(&self) -> Size {
        Size::new(self.settings.scroll_bar_width, 0)
    }

    pub fn minimum_size_hint(&self) -> Size {
        self.size_hint()
    }

    /// Whether the host's default context menu may be shown.
    pub fn context_menu_requested(&self) -> bool {
        !self.settings.disable_context_menu
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            line_height: f64::from(self.settings.line_height_px()),
            scale: self.scale,
            document_lines: self.shadow.line_count(),
            scroll_bar_width: self.settings.scroll_bar_width,
            control: self.size,
        }
    }

    pub fn visible_lines<H: HostView + ?Sized>(&self, host: &H) -> i32 {
        visible_line_count(host, self.settings.viewport_lines)
    }

    pub fn viewport_rect<H: HostView + ?Sized>(&self, host: &H) -> RectF {
        self.geometry()
            .viewport_rect(host.scroll().value, self.visible_lines(host))
    }

    pub fn pointer_to_value<H: HostView + ?Sized>(&self, host: &H, y: f32) -> i32 {
        self.geometry()
            .pointer_to_scroll_value(f64::from(y), host.scroll(), self.visible_lines(host))
    }

    /// Mirror the host document after an edit and rerender.
    pub fn on_host_text_changed<H: HostView + ?Sized>(&mut self, host: &H) -> ResyncReport {
        let report = self.shadow.resync(host);
        self.refresh();
        report
    }

    /// Returns `true` when the change was captured as the highlight target.
    pub fn on_host_selection_changed<H: HostView + ?Sized>(&mut self, host: &H) -> bool {
        let (next, fire) = self.arm.on_selection_changed();
        self.arm = next;
        if fire {
            let text = host.selected_text();
            self.highlight.retarget(&mut self.shadow, text);
            self.render();
        }
        fire
    }

    pub fn on_host_viewport_event(&mut self, event: ViewportEvent) {
        let next = self.arm.on_viewport_event(event);
        if next != self.arm {
            trace!(target: "control", from = %self.arm, to = %next, "arm_state_changed");
        }
        self.arm = next;
    }

    pub fn resize(&mut self, size: Size) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.refresh();
    }

    pub fn mouse_press<H: HostView + ?Sized>(&mut self, host: &mut H, button: MouseButton, y: f32) {
        self.buttons.insert(button.mask());
        match button {
            MouseButton::Left => self.scroll_to_pointer(host, y),
            MouseButton::Right => {
                self.highlight.clear(&mut self.shadow);
                self.render();
            }
            MouseButton::Middle => {}
        }
    }

    pub fn mouse_move<H: HostView + ?Sized>(&mut self, host: &mut H, y: f32) {
        if self.buttons.contains(ButtonMask::LEFT) {
            self.scroll_to_pointer(host, y);
        }
    }

    pub fn mouse_release(&mut self, button: MouseButton) {
        self.buttons.remove(button.mask());
    }

    /// Dispatch a pointer event delivered to the control. A double-click
    /// acts as a press.
    pub fn handle_mouse<H: HostView + ?Sized>(&mut self, host: &mut H, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(button) | MouseEventKind::DoubleClick(button) => {
                self.mouse_press(host, button, event.y)
            }
            MouseEventKind::Moved => self.mouse_move(host, event.y),
            MouseEventKind::Up(button) => self.mouse_release(button),
        }
    }

    /// Preview with the viewport indicator composited on top.
    pub fn paint<H: HostView + ?Sized>(&self, host: &H) -> PixelBuffer {
        let mut frame = self.preview.image.clone();
        if frame.is_empty() {
            return frame;
        }
        frame.fill_rect(self.viewport_rect(host), self.settings.viewport_color);
        frame
    }

    fn scroll_to_pointer<H: HostView + ?Sized>(&mut self, host: &mut H, y: f32) {
        let value = self.pointer_to_value(host, y);
        host.set_scroll_value(value);
        trace!(target: "control", y, value, "scroll_to_pointer");
    }

    fn refresh(&mut self) {
        let shrink = self.scale.recompute(
            f64::from(self.settings.line_height_px()),
            self.shadow.line_count(),
            f64::from(self.size.height),
        );
        debug!(target: "control", auto_shrink = shrink, height = self.size.height, "scale_recomputed");
        self.render();
    }

    fn render(&mut self) {
        self.preview = self
            .rasterizer
            .render(&self.shadow, &self.settings, &self.scale, self.size);
    }
}
