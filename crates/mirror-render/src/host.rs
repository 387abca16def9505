//! Interface to the host renderer.
//!
//! The host owns the GPU and the draw submission. Mirror surfaces only ask it
//! to allocate targets and to render fully configured secondary cameras.

use mirror_core::{Camera, TextureHandle};

use crate::context::RenderContext;
use crate::error::RenderResult;
use crate::target::RenderTargetDesc;

/// The rendering pipeline a mirror surface renders through.
pub trait RenderHost {
    /// Allocates a render target matching `desc`.
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderResult<TextureHandle>;

    /// Releases a render target previously returned by
    /// [`create_render_target`](Self::create_render_target).
    fn destroy_render_target(&mut self, texture: TextureHandle);

    /// Rasterizes `camera` into its target texture.
    ///
    /// The camera carries explicit view and projection matrices, its culling
    /// mask and target. `ctx` carries the global render state (inverted
    /// culling, pixel light budget, re-entrancy marker) to honor during the
    /// draw, and may be handed to nested mirror callbacks.
    fn submit_camera(&mut self, ctx: &mut RenderContext, camera: &Camera) -> RenderResult<()>;

    /// Called when a secondary camera is discarded.
    fn destroy_camera(&mut self, _camera: &Camera) {
        // Default no-op; hosts that mirror cameras into engine objects override this
    }
}
