//! Narrow render/window abstraction
//!
//! The simulation core treats the window purely as a thread-safe event
//! source and draw-command sink. A real graphics backend implements
//! [`RenderTarget`]; [`SharedWindow`] serializes every call across threads,
//! because the tick thread queries window size while the render thread is
//! polling events and presenting frames.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::Vec2;
use parking_lot::Mutex;

use crate::input::KeyCode;

/// RGBA color, 0-255 channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Window events the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    Closed,
}

/// One shape to draw this frame. Backends rasterize these however they like;
/// the core only ever emits them.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled convex polygon, points in world space
    Polygon { points: Vec<Vec2>, color: Color },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        position: Vec2,
        content: String,
        size: f32,
        color: Color,
    },
}

/// The window/render collaborator.
///
/// Implementations need not be thread-safe themselves; wrap them in a
/// [`SharedWindow`] before handing them to the runtime.
pub trait RenderTarget: Send {
    fn poll_event(&mut self) -> Option<Event>;
    fn clear(&mut self, color: Color);
    fn draw(&mut self, command: &DrawCommand);
    fn display(&mut self);
    fn size(&self) -> (u32, u32);
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Mutex wrapper making any [`RenderTarget`] callable from every thread.
///
/// One lock guards the whole window; draw/clear/display/poll/size/close are
/// serialized across threads.
pub struct SharedWindow {
    inner: Mutex<Box<dyn RenderTarget>>,
}

impl SharedWindow {
    pub fn new(target: Box<dyn RenderTarget>) -> Self {
        Self {
            inner: Mutex::new(target),
        }
    }

    pub fn poll_event(&self) -> Option<Event> {
        self.inner.lock().poll_event()
    }

    pub fn clear(&self, color: Color) {
        self.inner.lock().clear(color);
    }

    pub fn draw(&self, command: &DrawCommand) {
        self.inner.lock().draw(command);
    }

    pub fn display(&self) {
        self.inner.lock().display();
    }

    pub fn size(&self) -> (u32, u32) {
        self.inner.lock().size()
    }

    /// Window size as a vector, for bounds math.
    pub fn bounds(&self) -> Vec2 {
        let (w, h) = self.size();
        Vec2::new(w as f32, h as f32)
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().is_open()
    }

    pub fn close(&self) {
        self.inner.lock().close();
    }
}

/// Windowless [`RenderTarget`] used by the native binary and the tests.
///
/// Events are whatever was injected with [`HeadlessWindow::push_event`];
/// draw commands from the most recent frame are retained for inspection.
/// With `close_after` set, a `Closed` event is synthesized once the deadline
/// passes, so a demo run terminates on its own.
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    open: bool,
    events: VecDeque<Event>,
    frame: Vec<DrawCommand>,
    frames_presented: u64,
    opened_at: Instant,
    close_after: Option<Duration>,
    close_sent: bool,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            open: true,
            events: VecDeque::new(),
            frame: Vec::new(),
            frames_presented: 0,
            opened_at: Instant::now(),
            close_after: None,
            close_sent: false,
        }
    }

    /// Synthesize a `Closed` event after `lifetime` has elapsed.
    pub fn close_after(mut self, lifetime: Duration) -> Self {
        self.close_after = Some(lifetime);
        self
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Draw commands issued since the last `clear`.
    pub fn frame(&self) -> &[DrawCommand] {
        &self.frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl RenderTarget for HeadlessWindow {
    fn poll_event(&mut self) -> Option<Event> {
        if let Some(deadline) = self.close_after {
            if !self.close_sent && self.opened_at.elapsed() >= deadline {
                self.close_sent = true;
                return Some(Event::Closed);
            }
        }
        self.events.pop_front()
    }

    fn clear(&mut self, _color: Color) {
        self.frame.clear();
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.frame.push(command.clone());
    }

    fn display(&mut self) {
        self.frames_presented += 1;
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_headless_event_order() {
        let mut w = HeadlessWindow::new(100, 100);
        w.push_event(Event::KeyPressed(KeyCode::W));
        w.push_event(Event::Closed);
        assert_eq!(w.poll_event(), Some(Event::KeyPressed(KeyCode::W)));
        assert_eq!(w.poll_event(), Some(Event::Closed));
        assert_eq!(w.poll_event(), None);
    }

    #[test]
    fn test_headless_close_after_deadline() {
        let mut w = HeadlessWindow::new(10, 10).close_after(Duration::ZERO);
        assert_eq!(w.poll_event(), Some(Event::Closed));
        // Sentinel is only synthesized once
        assert_eq!(w.poll_event(), None);
    }

    #[test]
    fn test_shared_window_cross_thread() {
        let shared = Arc::new(SharedWindow::new(Box::new(HeadlessWindow::new(640, 480))));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let shared = shared.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    shared.draw(&DrawCommand::Circle {
                        center: Vec2::ZERO,
                        radius: 1.0,
                        color: Color::WHITE,
                    });
                    assert_eq!(shared.size(), (640, 480));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(shared.is_open());
        shared.close();
        assert!(!shared.is_open());
    }
}
