//! Common test framework
//!
//! Everything a test program needs besides its own drawing: command-line and
//! config handling, window creation, event translation and common event
//! handling, the loop drivers and frame counting.

pub mod args;
pub mod common;
pub mod config;
pub mod event_loop;
pub mod events;
pub mod fps;
pub mod quit;
pub mod types;

pub use args::{
    CommonArgs, CommonDefaults, CommonOptions, DriveMode, Geometry, VerboseCategory, VerboseFlags,
};
pub use common::CommonState;
pub use config::{Config, ConfigError};
pub use event_loop::{LoopTick, run, run_blocking};
pub use events::{Keycode, TestEvent, translate_window_event};
pub use fps::{FrameCounter, RunSummary};
pub use quit::QuitFlag;
pub use types::SetupError;
