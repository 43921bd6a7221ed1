//! Render state management
//!
//! Defines the per-renderer sampling and blending state: texture address
//! modes, border colors and blend modes, plus their wgpu mappings.

use super::vertex::{FColor, Vertex};

/// Texture address mode, selected independently for the u and v axes.
///
/// Discriminants follow the order the modes are cycled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum AddressMode {
    /// Wrap when the draw's texture coordinates leave [0, 1], clamp otherwise
    #[default]
    Auto = 0,
    /// Clamp to the edge texel
    Clamp = 1,
    /// Repeat the texture
    Wrap = 2,
    /// Repeat the texture, flipping every other copy
    Mirror = 3,
    /// Substitute the renderer's border color outside [0, 1]
    Border = 4,
}

impl AddressMode {
    /// Number of valid address modes
    pub const COUNT: u32 = 5;

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(AddressMode::Auto),
            1 => Some(AddressMode::Clamp),
            2 => Some(AddressMode::Wrap),
            3 => Some(AddressMode::Mirror),
            4 => Some(AddressMode::Border),
            _ => None,
        }
    }

    /// The next mode in cycle order, wrapping back to `Auto`.
    pub fn next(self) -> Self {
        Self::from_u32((self as u32 + 1) % Self::COUNT).unwrap_or_default()
    }

    /// Resolve `Auto` against the texture coordinates of a draw.
    pub fn resolve(self, coords_out_of_range: bool) -> ResolvedAddressMode {
        match self {
            AddressMode::Auto if coords_out_of_range => ResolvedAddressMode::Wrap,
            AddressMode::Auto | AddressMode::Clamp => ResolvedAddressMode::Clamp,
            AddressMode::Wrap => ResolvedAddressMode::Wrap,
            AddressMode::Mirror => ResolvedAddressMode::Mirror,
            AddressMode::Border => ResolvedAddressMode::Border,
        }
    }
}

/// Address mode after `Auto` has been resolved for a specific draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedAddressMode {
    Clamp,
    Wrap,
    Mirror,
    Border,
}

impl ResolvedAddressMode {
    /// Sampler address mode for this axis.
    ///
    /// Border samples clamped; the fragment shader swaps in the border color.
    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            ResolvedAddressMode::Clamp | ResolvedAddressMode::Border => {
                wgpu::AddressMode::ClampToEdge
            }
            ResolvedAddressMode::Wrap => wgpu::AddressMode::Repeat,
            ResolvedAddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        }
    }

    pub fn is_border(self) -> bool {
        self == ResolvedAddressMode::Border
    }
}

/// Color used for out-of-range samples under [`AddressMode::Border`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum BorderColor {
    #[default]
    OpaqueWhite = 0,
    OpaqueBlack = 1,
    TransparentWhite = 2,
    TransparentBlack = 3,
}

impl BorderColor {
    /// Number of valid border colors
    pub const COUNT: u32 = 4;

    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(BorderColor::OpaqueWhite),
            1 => Some(BorderColor::OpaqueBlack),
            2 => Some(BorderColor::TransparentWhite),
            3 => Some(BorderColor::TransparentBlack),
            _ => None,
        }
    }

    /// The next color in cycle order, wrapping back to `OpaqueWhite`.
    pub fn next(self) -> Self {
        Self::from_u32((self as u32 + 1) % Self::COUNT).unwrap_or_default()
    }

    pub fn to_color(self) -> FColor {
        match self {
            BorderColor::OpaqueWhite => FColor::new(1.0, 1.0, 1.0, 1.0),
            BorderColor::OpaqueBlack => FColor::new(0.0, 0.0, 0.0, 1.0),
            BorderColor::TransparentWhite => FColor::new(1.0, 1.0, 1.0, 0.0),
            BorderColor::TransparentBlack => FColor::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

/// Blend mode for geometry draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// dst = src
    #[default]
    None,
    /// dstRGB = srcRGB * srcA + dstRGB * (1 - srcA), dstA = srcA + dstA * (1 - srcA)
    Blend,
    /// dstRGB = srcRGB * srcA + dstRGB, dstA = dstA
    Add,
    /// dstRGB = srcRGB * dstRGB, dstA = dstA
    Mod,
    /// dstRGB = srcRGB * dstRGB + dstRGB * (1 - srcA), dstA = dstA
    Mul,
}

impl BlendMode {
    pub fn to_wgpu(self) -> Option<wgpu::BlendState> {
        let keep_alpha = wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::Zero,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        };
        let color = |src_factor, dst_factor| wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };

        match self {
            BlendMode::None => None,
            BlendMode::Blend => Some(wgpu::BlendState::ALPHA_BLENDING),
            BlendMode::Add => Some(wgpu::BlendState {
                color: color(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::One),
                alpha: keep_alpha,
            }),
            BlendMode::Mod => Some(wgpu::BlendState {
                color: color(wgpu::BlendFactor::Dst, wgpu::BlendFactor::Zero),
                alpha: keep_alpha,
            }),
            BlendMode::Mul => Some(wgpu::BlendState {
                color: color(wgpu::BlendFactor::Dst, wgpu::BlendFactor::OneMinusSrcAlpha),
                alpha: keep_alpha,
            }),
        }
    }
}

/// Current renderer state applied to subsequent geometry draws
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderState {
    pub draw_color: FColor,
    pub blend_mode: BlendMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub border_color: BorderColor,
}

/// Sampling state for one draw, with `Auto` already resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerKey {
    pub u: ResolvedAddressMode,
    pub v: ResolvedAddressMode,
}

impl RenderState {
    /// Resolve the address modes for a draw over `vertices`.
    pub fn sampler_key(&self, vertices: &[Vertex]) -> SamplerKey {
        let out_of_range = vertices.iter().any(|v| {
            let uv = v.tex_coord;
            !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y)
        });
        SamplerKey {
            u: self.address_u.resolve(out_of_range),
            v: self.address_v.resolve(out_of_range),
        }
    }
}
