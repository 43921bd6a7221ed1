//! Rendertest Core - Shared framework for renderer test programs
//!
//! This crate provides the common test framework (arguments, config, windows,
//! events, loop drivers) and the 2D geometry renderer the test programs draw
//! through.
//!
//! # Architecture
//!
//! - [`Renderer`] - Immediate-mode renderer trait, one instance per window
//! - [`WgpuRenderer`] - wgpu implementation of [`Renderer`]
//! - [`CommonState`] - Window table and event queue shared with the program
//! - [`LoopTick`] - One step of a program's main loop, run by either driver

pub mod app;
pub mod assets;
pub mod graphics;
#[cfg(test)]
pub mod test_utils;

// Re-export the framework types programs use directly
pub use app::{
    CommonArgs, CommonDefaults, CommonOptions, CommonState, Config, DriveMode, Keycode, LoopTick,
    RunSummary, SetupError, TestEvent, VerboseFlags,
};
pub use assets::{ImageData, TextureError, load_image, resource_path};
pub use graphics::{
    AddressMode, BlendMode, BorderColor, FColor, FPoint, Rect, RenderError, Renderer, Vertex,
    WgpuRenderer,
};
