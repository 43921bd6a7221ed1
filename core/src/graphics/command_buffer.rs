//! Per-frame command recording
//!
//! Draw calls made between two presents are recorded here and replayed in
//! order when the frame is presented. Each clear opens a new render pass so a
//! clear issued after draws still wipes them, like an immediate-mode target.

use std::ops::Range;

use super::render_state::{BlendMode, SamplerKey};
use super::renderer::RenderError;
use super::vertex::{FColor, Vertex};

/// A recorded geometry draw
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryDraw {
    /// Texture slot in the owning renderer, `None` draws untextured
    pub texture: Option<u32>,
    pub blend_mode: BlendMode,
    pub sampler: SamplerKey,
    pub border_color: FColor,
    /// Range into the frame's vertex array
    pub vertices: Range<u32>,
    /// Range into the frame's index array (indices are relative to `vertices.start`)
    pub indices: Range<u32>,
}

/// A recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear(FColor),
    Geometry(GeometryDraw),
}

/// Commands grouped into one render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Pass<'a> {
    /// Clear color at pass start, `None` loads the existing contents
    pub clear: Option<FColor>,
    pub draws: Vec<&'a GeometryDraw>,
}

/// Immediate-mode command buffer for one frame
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

/// Check that an indexed triangle list is drawable.
pub fn validate_geometry(vertex_count: usize, indices: &[u32]) -> Result<(), RenderError> {
    if vertex_count == 0 {
        return Err(RenderError::InvalidGeometry("no vertices".to_string()));
    }
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(RenderError::InvalidGeometry(format!(
            "index count {} is not a non-zero multiple of 3",
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(RenderError::InvalidGeometry(format!(
            "index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }
    Ok(())
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self, color: FColor) {
        self.commands.push(Command::Clear(color));
    }

    /// Record an indexed triangle list.
    pub fn push_geometry(
        &mut self,
        texture: Option<u32>,
        blend_mode: BlendMode,
        sampler: SamplerKey,
        border_color: FColor,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), RenderError> {
        validate_geometry(vertices.len(), indices)?;

        let vertex_start = self.vertices.len() as u32;
        let index_start = self.indices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);

        self.commands.push(Command::Geometry(GeometryDraw {
            texture,
            blend_mode,
            sampler,
            border_color,
            vertices: vertex_start..self.vertices.len() as u32,
            indices: index_start..self.indices.len() as u32,
        }));
        Ok(())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Group commands into render passes.
    ///
    /// Draws recorded before the first clear land in a pass that loads the
    /// previous contents.
    pub fn passes(&self) -> Vec<Pass<'_>> {
        let mut passes: Vec<Pass<'_>> = Vec::new();
        for command in &self.commands {
            match command {
                Command::Clear(color) => passes.push(Pass {
                    clear: Some(*color),
                    draws: Vec::new(),
                }),
                Command::Geometry(draw) => match passes.last_mut() {
                    Some(pass) => pass.draws.push(draw),
                    None => passes.push(Pass {
                        clear: None,
                        draws: vec![draw],
                    }),
                },
            }
        }
        passes
    }

    /// Drop all recorded commands (called after present).
    pub fn reset(&mut self) {
        self.commands.clear();
        self.vertices.clear();
        self.indices.clear();
    }
}
