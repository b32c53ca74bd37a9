use std::rc::Rc;

use foundation::AssetId;
use tracing::{debug, info};
use transition::RenderTarget;

use crate::loader::Texture;

/// Stand-in for the globe material: remembers what would be on screen.
#[derive(Debug, Default)]
pub struct GlobeMaterial {
    texture: Option<Rc<Texture>>,
    blend: f32,
    swaps: u64,
    blend_updates: u64,
}

impl GlobeMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Option<&AssetId> {
        self.texture.as_ref().map(|t| &t.asset)
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub fn blend_updates(&self) -> u64 {
        self.blend_updates
    }
}

impl RenderTarget for GlobeMaterial {
    type Handle = Rc<Texture>;

    fn set_displayed_asset(&mut self, asset: &AssetId, handle: Rc<Texture>) {
        self.swaps += 1;
        info!(%asset, bytes = handle.bytes, format = ?handle.format, "texture swapped");
        self.texture = Some(handle);
    }

    fn set_blend_factor(&mut self, t: f32) {
        self.blend_updates += 1;
        self.blend = t.clamp(0.0, 1.0);
        debug!(blend = self.blend, "material opacity");
    }
}

#[cfg(test)]
mod tests {
    use super::GlobeMaterial;
    use crate::loader::{ImageFormat, Texture};
    use foundation::AssetId;
    use std::rc::Rc;
    use transition::RenderTarget;

    #[test]
    fn tracks_swaps_and_clamps_blend() {
        let mut m = GlobeMaterial::new();
        let asset = AssetId::new("66_cretaceous.jpg");
        m.set_displayed_asset(
            &asset,
            Rc::new(Texture {
                asset: asset.clone(),
                bytes: 10,
                format: ImageFormat::Jpeg,
            }),
        );
        m.set_blend_factor(1.5);
        assert_eq!(m.displayed(), Some(&asset));
        assert_eq!(m.blend(), 1.0);
        assert_eq!(m.swaps(), 1);
        assert_eq!(m.blend_updates(), 1);
    }
}
