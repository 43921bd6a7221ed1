//! Platform-neutral events
//!
//! winit window events are translated into [`TestEvent`]s tagged with the
//! window's index in the common state, then queued until the next tick.

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Logical key of a keyboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keycode {
    /// Printable key, lowercased
    Char(char),
    Escape,
    Other,
}

impl Keycode {
    pub fn from_key(key: &Key) -> Self {
        match key {
            Key::Character(text) => text
                .chars()
                .next()
                .and_then(|c| c.to_lowercase().next())
                .map_or(Keycode::Other, Keycode::Char),
            Key::Named(NamedKey::Escape) => Keycode::Escape,
            _ => Keycode::Other,
        }
    }

    /// Case-insensitive match against a letter
    pub fn is_char(self, letter: char) -> bool {
        matches!(self, Keycode::Char(c) if c.eq_ignore_ascii_case(&letter))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestEvent {
    KeyDown {
        window: usize,
        key: Keycode,
        repeat: bool,
    },
    KeyUp {
        window: usize,
        key: Keycode,
    },
    WindowCloseRequested {
        window: usize,
    },
    WindowResized {
        window: usize,
        width: u32,
        height: u32,
    },
    Quit,
}

/// Translate a winit event for the window at `window`.
///
/// Returns `None` for events the test programs don't observe.
pub fn translate_window_event(window: usize, event: &WindowEvent) -> Option<TestEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let key = Keycode::from_key(&event.logical_key);
            Some(match event.state {
                ElementState::Pressed => TestEvent::KeyDown {
                    window,
                    key,
                    repeat: event.repeat,
                },
                ElementState::Released => TestEvent::KeyUp { window, key },
            })
        }
        WindowEvent::CloseRequested => Some(TestEvent::WindowCloseRequested { window }),
        WindowEvent::Resized(size) => Some(TestEvent::WindowResized {
            window,
            width: size.width,
            height: size.height,
        }),
        _ => None,
    }
}
