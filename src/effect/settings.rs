use anyhow::{bail, Context, Result};
use glam::Vec2;
use serde::Deserialize;
use std::path::Path;

/// Effect constants, fixed at startup.
///
/// All fields have working defaults; a JSON settings file may override any
/// subset of them.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectSettings {
    /// Maximum displacement per axis, in UV units
    pub threshold: [f32; 2],
    /// Overscan zoom; shrinks the sampling window toward the image center
    pub zoom: f32,
    /// UV margin the displacement is expected to stay inside
    pub uv_padding: f32,
    /// Scale applied to the raw pointer before smoothing
    pub pointer_scale: f32,
    /// Per-frame blend factor of the pointer smoother
    pub smoothing: f32,
    /// Cutout alpha below which a pixel is discarded
    pub alpha_cutoff: f32,
    /// Window clear color behind the cutout, sRGB in [0,1]
    pub background: [f32; 3],
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            threshold: [0.1, 0.1],
            zoom: 1.1,
            uv_padding: 0.06,
            pointer_scale: 0.25,
            smoothing: 0.1,
            alpha_cutoff: 0.1,
            background: [1.0, 1.0, 1.0],
        }
    }
}

impl EffectSettings {
    /// Load settings from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read settings file: {:?}", path))?;
        let settings: EffectSettings = serde_json::from_str(&text)
            .context(format!("Failed to parse settings file: {:?}", path))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn threshold(&self) -> Vec2 {
        Vec2::from(self.threshold)
    }

    /// UV margin reserved on each side by the overscan zoom
    pub fn overscan_margin(&self) -> f32 {
        0.5 - 0.5 / self.zoom
    }

    /// Worst-case displacement per axis at full pointer deflection
    pub fn max_displacement(&self) -> Vec2 {
        self.threshold() * self.pointer_scale
    }

    /// Reject settings the compositor has no defined behavior for
    pub fn validate(&self) -> Result<()> {
        if self.zoom < 1.0 {
            bail!("zoom must be >= 1.0, got {}", self.zoom);
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            bail!("smoothing must be in (0, 1], got {}", self.smoothing);
        }
        if !(0.0..=1.0).contains(&self.alpha_cutoff) {
            bail!("alpha_cutoff must be in [0, 1], got {}", self.alpha_cutoff);
        }
        if self.threshold[0] < 0.0 || self.threshold[1] < 0.0 {
            bail!("threshold must be non-negative, got {:?}", self.threshold);
        }
        Ok(())
    }

    /// Non-fatal configuration oddities worth surfacing at startup.
    ///
    /// A displacement that can exceed the overscan margin is legal; the
    /// clamp-to-edge sampling policy resolves it, but the clamped band is
    /// visible as smeared edge pixels.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let margin = self.overscan_margin();
        let max = self.max_displacement();

        if max.x > margin || max.y > margin {
            warnings.push(format!(
                "max displacement ({:.4}, {:.4}) exceeds overscan margin {:.4}; \
                 edge sampling will clamp",
                max.x, max.y, margin
            ));
        }
        if margin < self.uv_padding {
            warnings.push(format!(
                "zoom {} reserves a {:.4} margin, less than the requested uv_padding {}",
                self.zoom, margin, self.uv_padding
            ));
        }

        warnings
    }
}
