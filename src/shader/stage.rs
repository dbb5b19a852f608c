//! Pipeline stages and host event payloads.
//!
//! The host reports every shader stage it knows about; only the
//! [`ShaderStage`]s (vertex and pixel) are tracked for gating. Everything else
//! is hashed at creation time and then ignored.

use std::ops::{Index, IndexMut};

/// A shader stage the toggler tracks bindings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub const COUNT: usize = 2;
    pub const ALL: [ShaderStage; Self::COUNT] = [ShaderStage::Vertex, ShaderStage::Pixel];

    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Pixel => 1,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Pixel => "pixel",
        }
    }
}

/// Stage mask passed by the host on a bind-pipeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Every stage at once (D3D12 / Vulkan monolithic pipelines).
    All,
    AllGraphics,
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
    /// Fixed-function state (blend, rasterizer, depth-stencil, input assembly…).
    Other,
}

impl PipelineStage {
    /// The tracked stage this bind targets, if any.
    #[inline]
    #[must_use]
    pub fn watched(self) -> Option<ShaderStage> {
        match self {
            PipelineStage::Vertex => Some(ShaderStage::Vertex),
            PipelineStage::Pixel => Some(ShaderStage::Pixel),
            _ => None,
        }
    }
}

/// Kind of a pipeline sub-object supplied on create/init events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubobjectType {
    VertexShader,
    HullShader,
    DomainShader,
    GeometryShader,
    PixelShader,
    ComputeShader,
    BlendState,
    RasterizerState,
    DepthStencilState,
    InputLayout,
    Other,
}

impl SubobjectType {
    /// Whether this sub-object carries shader byte code.
    #[must_use]
    pub fn is_shader(self) -> bool {
        matches!(
            self,
            SubobjectType::VertexShader
                | SubobjectType::HullShader
                | SubobjectType::DomainShader
                | SubobjectType::GeometryShader
                | SubobjectType::PixelShader
                | SubobjectType::ComputeShader
        )
    }

    #[must_use]
    pub fn watched(self) -> Option<ShaderStage> {
        match self {
            SubobjectType::VertexShader => Some(ShaderStage::Vertex),
            SubobjectType::PixelShader => Some(ShaderStage::Pixel),
            _ => None,
        }
    }
}

/// One sub-object of a pipeline description.
///
/// `code` borrows the host's shader byte code for the duration of the
/// callback. Its address doubles as the key linking create and init events.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSubobject<'a> {
    pub kind: SubobjectType,
    pub code: &'a [u8],
}

impl<'a> PipelineSubobject<'a> {
    #[must_use]
    pub fn shader(kind: SubobjectType, code: &'a [u8]) -> Self {
        Self { kind, code }
    }

    /// A sub-object without byte code (fixed-function state).
    #[must_use]
    pub fn state(kind: SubobjectType) -> Self {
        Self { kind, code: &[] }
    }
}

/// Command type of an indirect draw/dispatch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndirectCommand {
    Unknown,
    Draw,
    DrawIndexed,
    Dispatch,
    DispatchMesh,
    DispatchRays,
}

impl IndirectCommand {
    /// Whether this command is gated like a regular draw. Compute work is
    /// never blocked.
    #[inline]
    #[must_use]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            IndirectCommand::Unknown | IndirectCommand::Draw | IndirectCommand::DrawIndexed
        )
    }
}

/// One value per [`ShaderStage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerStage<T>([T; ShaderStage::COUNT]);

impl<T> PerStage<T> {
    pub fn from_fn(mut f: impl FnMut(ShaderStage) -> T) -> Self {
        Self([f(ShaderStage::Vertex), f(ShaderStage::Pixel)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &T)> {
        ShaderStage::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<ShaderStage> for PerStage<T> {
    type Output = T;

    #[inline]
    fn index(&self, stage: ShaderStage) -> &T {
        &self.0[stage.index()]
    }
}

impl<T> IndexMut<ShaderStage> for PerStage<T> {
    #[inline]
    fn index_mut(&mut self, stage: ShaderStage) -> &mut T {
        &mut self.0[stage.index()]
    }
}
