use anyhow::{Context, Result};
use std::path::Path;

use crate::effect::source::SourceImages;

/// Load and validate the effect's source images.
///
/// Fails fast: any decode error or dimension mismatch aborts startup before
/// the render loop exists.
pub fn load_source_images(
    color_path: &Path,
    depth_path: &Path,
    alpha_path: Option<&Path>,
) -> Result<SourceImages> {
    let color = image::open(color_path)
        .context(format!("Failed to load color image: {:?}", color_path))?
        .to_rgba8();
    log::info!(
        "Loaded color image {:?} ({}x{})",
        color_path,
        color.width(),
        color.height()
    );

    let depth = image::open(depth_path)
        .context(format!("Failed to load depth map: {:?}", depth_path))?
        .to_luma8();
    log::info!("Loaded depth map {:?}", depth_path);

    let alpha = match alpha_path {
        Some(path) => {
            let alpha = image::open(path)
                .context(format!("Failed to load alpha map: {:?}", path))?
                .to_luma8();
            log::info!("Loaded alpha map {:?}", path);
            Some(alpha)
        }
        None => {
            log::info!("No alpha map given; using the color image's alpha channel");
            None
        }
    };

    SourceImages::new(color, depth, alpha)
        .context("Source images failed validation")
}
