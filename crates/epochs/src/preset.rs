use crate::manifest::{EpochManifest, ManifestEpoch};
use crate::resolver::ResolutionPolicy;
use crate::slider::SliderRange;

/// Directory the paleomap textures are served from by default.
pub const DEFAULT_TEXTURE_DIR: &str = "textures";

/// `(age, file stem, display name)` for the bundled paleomaps.
pub const PALEOMAP_EPOCHS: [(i32, &str, &str); 8] = [
    (0, "present", "Present"),
    (66, "cretaceous", "Late Cretaceous"),
    (100, "ma", "Mid-Cretaceous"),
    (150, "jurassic", "Jurassic"),
    (200, "triassic", "Triassic"),
    (250, "pangaea", "Pangaea"),
    (340, "devonian", "Devonian"),
    (540, "cambrian", "Cambrian"),
];

/// The stock paleomap timeline: `0..=540` Ma, step policy, textures named
/// `{age}_{stem}.jpg` under `base_url`.
pub fn paleomaps(base_url: Option<&str>) -> EpochManifest {
    let epochs = PALEOMAP_EPOCHS
        .iter()
        .map(|(age, stem, name)| ManifestEpoch {
            age: *age,
            asset: format!("{age}_{stem}.jpg"),
            name: Some((*name).to_string()),
        })
        .collect();

    let mut manifest = EpochManifest::new(epochs);
    manifest.name = Some("paleomaps".to_string());
    manifest.base_url = Some(base_url.unwrap_or(DEFAULT_TEXTURE_DIR).to_string());
    manifest.policy = ResolutionPolicy::NearestBelow;
    manifest.slider = SliderRange::phanerozoic();
    manifest
}
