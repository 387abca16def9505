//! Per-frame render state passed down the call chain.

/// Global render state shared by every mirror surface during a frame.
///
/// Passed explicitly through the host callback instead of living in a
/// process-wide static, so re-entrancy is visible in the call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Frame number, advanced by [`begin_frame`](Self::begin_frame).
    pub frame: u64,
    /// Set while a reflection pass is being rendered.
    pub inside_reflection: bool,
    /// Whether the host must flip its backface culling.
    pub invert_culling: bool,
    /// Budget of dynamic per-pixel lights.
    pub pixel_light_count: u32,
}

impl RenderContext {
    /// Creates a context with the given pixel light budget.
    pub fn new(pixel_light_count: u32) -> Self {
        Self {
            frame: 0,
            inside_reflection: false,
            invert_culling: false,
            pixel_light_count,
        }
    }

    /// Advances to the next frame.
    pub fn begin_frame(&mut self) {
        self.frame += 1;
    }

    /// Returns whether a reflection pass is in progress.
    pub fn is_inside_reflection(&self) -> bool {
        self.inside_reflection
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(4)
    }
}

/// State overwritten for the duration of one reflection pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedState {
    inside_reflection: bool,
    invert_culling: bool,
    pixel_light_count: u32,
}

impl SavedState {
    pub(crate) fn capture(ctx: &RenderContext) -> Self {
        Self {
            inside_reflection: ctx.inside_reflection,
            invert_culling: ctx.invert_culling,
            pixel_light_count: ctx.pixel_light_count,
        }
    }

    pub(crate) fn restore(self, ctx: &mut RenderContext) {
        ctx.inside_reflection = self.inside_reflection;
        ctx.invert_culling = self.invert_culling;
        ctx.pixel_light_count = self.pixel_light_count;
    }
}
