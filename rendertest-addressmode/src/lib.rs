//! Texture address mode test
//!
//! Draws a textured quad whose texture coordinates extend past [0, 1] on
//! every open window, so the current addressing is visible at the edges.
//!
//! # Keyboard
//!
//! - U: next address mode for the u axis
//! - V: next address mode for the v axis
//! - B: next border color
//! - ESC: Quit

use std::path::{Path, PathBuf};

use rendertest_core::app::{CommonDefaults, CommonState, LoopTick, SetupError, TestEvent};
use rendertest_core::graphics::RendererBackend;
use rendertest_core::{
    AddressMode, BlendMode, BorderColor, FColor, FPoint, Rect, RenderError, Renderer,
    VerboseFlags, Vertex, load_image, resource_path,
};


/// Texture drawn on every window
pub const SAMPLE_IMAGE: &str = "sample.bmp";

/// Background, light green so transparent border colors stand out
pub const CLEAR_COLOR: FColor = FColor::new(0.5, 1.0, 0.5, 1.0);

/// Two triangles over the quad from [`quad_vertices`]
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 1, 2, 3];

const UV_MIN: f32 = -0.1;
const UV_MAX: f32 = 1.1;

/// Startup defaults for this program; explicit flags override them.
pub fn defaults() -> CommonDefaults {
    CommonDefaults {
        title: "testtextureaddressmode".to_string(),
        renderer: RendererBackend::Vulkan,
        verbose: VerboseFlags::RENDER,
        asset_dirs: vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")],
    }
}

/// Quad over the middle half of `viewport`, texture coordinates in [-0.1, 1.1].
///
/// Vertex order: top-left, top-right, bottom-left, bottom-right.
pub fn quad_vertices(viewport: Rect) -> [Vertex; 4] {
    let w = viewport.w as f32;
    let h = viewport.h as f32;
    let (left, right) = (w * 0.25, w * 0.75);
    let (top, bottom) = (h * 0.25, h * 0.75);

    let vertex = |x, y, u, v| Vertex::new(FPoint::new(x, y), FColor::WHITE, FPoint::new(u, v));
    [
        vertex(left, top, UV_MIN, UV_MIN),
        vertex(right, top, UV_MAX, UV_MIN),
        vertex(left, bottom, UV_MIN, UV_MAX),
        vertex(right, bottom, UV_MAX, UV_MAX),
    ]
}

/// Per-window drawing state
#[derive(Debug)]
pub struct DrawState<T> {
    /// Index into the common state's window table
    pub window: usize,
    pub texture: T,
}

/// Application state: current selections plus one [`DrawState`] per window
pub struct AddressModeTest<R: Renderer> {
    pub u_mode: AddressMode,
    pub v_mode: AddressMode,
    pub border_color: BorderColor,
    done: bool,
    drawstates: Vec<DrawState<R::Texture>>,
}

impl<R: Renderer> AddressModeTest<R> {
    pub fn new(drawstates: Vec<DrawState<R::Texture>>) -> Self {
        Self {
            u_mode: AddressMode::Auto,
            v_mode: AddressMode::Border,
            border_color: BorderColor::OpaqueWhite,
            done: false,
            drawstates,
        }
    }

    /// Load [`SAMPLE_IMAGE`] from the asset search path into every window.
    pub fn initialize(common: &mut CommonState<R>) -> Result<Self, SetupError> {
        let path = resource_path(SAMPLE_IMAGE, &common.options().asset_dirs);
        Self::initialize_from(common, &path)
    }

    /// Create one draw state per window, each with its own copy of the
    /// image at `image_path`.
    pub fn initialize_from(
        common: &mut CommonState<R>,
        image_path: &Path,
    ) -> Result<Self, SetupError> {
        let image =
            load_image(image_path, false).map_err(|e| SetupError::Texture(e.to_string()))?;

        let mut drawstates = Vec::with_capacity(common.num_windows());
        for window in 0..common.num_windows() {
            let Some(renderer) = common.renderer_mut(window) else {
                continue;
            };
            match renderer.create_texture(&image) {
                Ok(texture) => drawstates.push(DrawState { window, texture }),
                Err(e) => {
                    let mut partial = Self::new(drawstates);
                    partial.release_textures(common);
                    return Err(SetupError::Texture(format!(
                        "{}: {}",
                        image_path.display(),
                        e
                    )));
                }
            }
        }

        tracing::debug!(
            "Loaded {} into {} window(s)",
            image_path.display(),
            drawstates.len()
        );
        Ok(Self::new(drawstates))
    }

    pub fn drawstates(&self) -> &[DrawState<R::Texture>] {
        &self.drawstates
    }

    /// B/U/V cycle the selections; everything else goes to common handling.
    pub fn handle_event(&mut self, common: &mut CommonState<R>, event: &TestEvent) {
        match event {
            TestEvent::KeyDown { key, .. } if key.is_char('b') => {
                self.border_color = self.border_color.next();
                tracing::info!("Border color: {:?}", self.border_color);
            }
            TestEvent::KeyDown { key, .. } if key.is_char('u') => {
                self.u_mode = self.u_mode.next();
                tracing::info!("U address mode: {:?}", self.u_mode);
            }
            TestEvent::KeyDown { key, .. } if key.is_char('v') => {
                self.v_mode = self.v_mode.next();
                tracing::info!("V address mode: {:?}", self.v_mode);
            }
            _ => common.common_event(event, &mut self.done),
        }
    }

    /// Draw one frame into `renderer`.
    ///
    /// The frame is presented even when the geometry draw fails; only that
    /// failure is returned, a failed present is logged.
    pub fn draw_frame(&self, renderer: &mut R, texture: &R::Texture) -> Result<(), RenderError> {
        let viewport = renderer.viewport();

        renderer.set_draw_color(CLEAR_COLOR);
        renderer.clear();

        renderer.set_blend_mode(BlendMode::Blend);
        renderer.set_texture_address_mode(self.u_mode, self.v_mode);
        renderer.set_texture_border_color(self.border_color);

        let vertices = quad_vertices(viewport);
        let drawn = renderer.render_geometry(Some(texture), &vertices, &QUAD_INDICES);

        if let Err(e) = renderer.present() {
            tracing::warn!("Present failed: {}", e);
        }
        drawn
    }

    fn release_textures(&mut self, common: &mut CommonState<R>) {
        for drawstate in self.drawstates.drain(..) {
            if let Some(renderer) = common.renderer_mut(drawstate.window) {
                renderer.destroy_texture(drawstate.texture);
            }
        }
    }
}

impl<R: Renderer> LoopTick<R> for AddressModeTest<R> {
    fn tick(&mut self, common: &mut CommonState<R>) {
        while let Some(event) = common.poll_event() {
            self.handle_event(common, &event);
        }

        for drawstate in &self.drawstates {
            let Some(renderer) = common.renderer_mut(drawstate.window) else {
                continue;
            };
            if let Err(e) = self.draw_frame(renderer, &drawstate.texture) {
                tracing::error!("Drawing window {} failed: {}", drawstate.window, e);
                self.done = true;
            }
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn teardown(&mut self, common: &mut CommonState<R>) {
        self.release_textures(common);
    }
}
