//! Common state shared by every test program
//!
//! Owns the window table (one renderer slot per window, `None` once closed),
//! the queue of translated events, and the resolved options.

use std::collections::VecDeque;

use super::args::{CommonOptions, VerboseFlags};
use super::events::{Keycode, TestEvent};
use crate::graphics::Renderer;

pub struct CommonState<R> {
    renderers: Vec<Option<R>>,
    events: VecDeque<TestEvent>,
    options: CommonOptions,
}

impl<R: Renderer> CommonState<R> {
    /// Empty state; windows are added as they are created.
    pub fn new(options: CommonOptions) -> Self {
        Self {
            renderers: Vec::with_capacity(options.windows),
            events: VecDeque::new(),
            options,
        }
    }

    pub fn with_renderers(options: CommonOptions, renderers: Vec<R>) -> Self {
        let mut state = Self::new(options);
        for renderer in renderers {
            state.add_window(renderer);
        }
        state
    }

    /// Register a window's renderer and return its index.
    pub fn add_window(&mut self, renderer: R) -> usize {
        self.renderers.push(Some(renderer));
        self.renderers.len() - 1
    }

    pub fn options(&self) -> &CommonOptions {
        &self.options
    }

    /// Number of windows created, closed ones included
    pub fn num_windows(&self) -> usize {
        self.renderers.len()
    }

    /// Number of windows still open
    pub fn open_windows(&self) -> usize {
        self.renderers.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn renderer(&self, window: usize) -> Option<&R> {
        self.renderers.get(window).and_then(Option::as_ref)
    }

    pub fn renderer_mut(&mut self, window: usize) -> Option<&mut R> {
        self.renderers.get_mut(window).and_then(Option::as_mut)
    }

    /// Close a window, returning its renderer.
    pub fn close_window(&mut self, window: usize) -> Option<R> {
        let renderer = self.renderers.get_mut(window).and_then(Option::take);
        if renderer.is_some() && self.options.is_verbose(VerboseFlags::VIDEO) {
            tracing::info!("Closed window {}", window);
        }
        renderer
    }

    pub fn push_event(&mut self, event: TestEvent) {
        self.events.push_back(event);
    }

    /// Pop the next pending event without blocking.
    pub fn poll_event(&mut self) -> Option<TestEvent> {
        let event = self.events.pop_front()?;
        if self.options.is_verbose(VerboseFlags::EVENT) {
            tracing::info!("Event: {:?}", event);
        }
        Some(event)
    }

    /// Default handling for events a program doesn't consume.
    pub fn common_event(&mut self, event: &TestEvent, done: &mut bool) {
        match *event {
            TestEvent::Quit => *done = true,
            TestEvent::KeyDown {
                key: Keycode::Escape,
                ..
            } => *done = true,
            TestEvent::WindowCloseRequested { window } => {
                self.close_window(window);
                if self.open_windows() == 0 {
                    *done = true;
                }
            }
            TestEvent::WindowResized {
                window,
                width,
                height,
            } => {
                if let Some(renderer) = self.renderer_mut(window) {
                    renderer.resize(width, height);
                }
            }
            TestEvent::KeyDown { .. } | TestEvent::KeyUp { .. } => {}
        }
    }
}
