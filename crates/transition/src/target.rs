use foundation::AssetId;

/// The surface whose texture is being swapped (typically the globe material).
///
/// These two calls are the only way the transition core touches rendering.
pub trait RenderTarget {
    type Handle;

    /// Swap the displayed asset.
    fn set_displayed_asset(&mut self, asset: &AssetId, handle: Self::Handle);

    /// Drive the material's opacity or mix amount, in `[0, 1]`.
    fn set_blend_factor(&mut self, t: f32);
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    type Handle = T::Handle;

    fn set_displayed_asset(&mut self, asset: &AssetId, handle: Self::Handle) {
        (**self).set_displayed_asset(asset, handle);
    }

    fn set_blend_factor(&mut self, t: f32) {
        (**self).set_blend_factor(t);
    }
}
