use glam::Vec2;
use rayon::prelude::*;

use crate::core::display_context::DisplayContext;

use super::settings::EffectSettings;
use super::source::SourceImages;

/// Pixel written for every discarded (cutout) location
const DISCARDED: [u8; 4] = [0, 0, 0, 0];

/// Immutable per-frame parameter snapshot handed to the pixel map.
///
/// The pointer is sampled and smoothed once per frame; every pixel of that
/// frame sees the same value.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    /// Smoothed pointer, already scaled by pointer_scale
    pub mouse: Vec2,
}

impl FrameParams {
    pub fn new(mouse: Vec2) -> Self {
        Self { mouse }
    }
}

/// Overscan correction: shrink the sampling window toward the image center
/// by 1/zoom, reserving an edge margin for later displacement.
pub fn panned_uv(uv: Vec2, zoom: f32) -> Vec2 {
    (uv - 0.5) / zoom + 0.5
}

/// Pointer deflection amplified by local depth and the per-axis threshold
pub fn displacement(mouse: Vec2, depth: f32, threshold: Vec2) -> Vec2 {
    mouse * depth * threshold
}

/// The parallax compositor: one output pixel per screen-space coordinate,
/// a pure function of (uv, mouse, source images, settings).
pub struct Compositor {
    sources: SourceImages,
    settings: EffectSettings,
}

impl Compositor {
    pub fn new(sources: SourceImages, settings: EffectSettings) -> Self {
        Self { sources, settings }
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    pub fn sources(&self) -> &SourceImages {
        &self.sources
    }

    /// Shade a single output pixel.
    ///
    /// The cutout test runs on the base (undisplaced) sample: a discarded
    /// pixel stays discarded no matter where the pointer is.
    pub fn shade(&self, uv: Vec2, mouse: Vec2) -> [u8; 4] {
        let panned = panned_uv(uv, self.settings.zoom);

        if self.sources.cutout_alpha(panned) < self.settings.alpha_cutoff {
            return DISCARDED;
        }

        let depth = self.sources.sample_depth(panned);
        let final_uv = panned + displacement(mouse, depth, self.settings.threshold());
        let color = self.sources.sample_color(final_uv);

        [
            (color[0] * 255.0).round().clamp(0.0, 255.0) as u8,
            (color[1] * 255.0).round().clamp(0.0, 255.0) as u8,
            (color[2] * 255.0).round().clamp(0.0, 255.0) as u8,
            (color[3] * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Recompute the whole output surface for one frame.
    ///
    /// Rows are mapped in parallel; pixels are independent and only read
    /// the shared immutable sources and the frame snapshot.
    pub fn render(&self, params: FrameParams, ctx: &DisplayContext) -> Vec<u8> {
        let width = ctx.width as usize;
        let mut pixels = vec![0u8; ctx.buffer_size()];

        pixels
            .par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width {
                    let uv = ctx.uv(x as u32, y as u32);
                    let rgba = self.shade(uv, params.mouse);
                    row[x * 4..x * 4 + 4].copy_from_slice(&rgba);
                }
            });

        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    fn flat_sources(depth: u8) -> SourceImages {
        let color = RgbaImage::from_pixel(8, 8, Rgba([64, 128, 192, 255]));
        let depth = GrayImage::from_pixel(8, 8, Luma([depth]));
        SourceImages::new(color, depth, None).unwrap()
    }

    #[test]
    fn panned_uv_corners_at_default_zoom() {
        let lo = panned_uv(Vec2::ZERO, 1.1);
        let hi = panned_uv(Vec2::ONE, 1.1);
        let expected = 0.5 - 0.5 / 1.1;
        assert!((lo.x - expected).abs() < 1e-6);
        assert!((lo.y - expected).abs() < 1e-6);
        assert!((hi.x - (1.0 - expected)).abs() < 1e-6);
        assert!((hi.y - (1.0 - expected)).abs() < 1e-6);
    }

    #[test]
    fn panned_uv_fixed_at_center() {
        let center = panned_uv(Vec2::splat(0.5), 1.1);
        assert!((center - Vec2::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn displacement_matches_reference_values() {
        let d = displacement(Vec2::new(0.2, -0.1), 0.5, Vec2::new(0.1, 0.1));
        assert!((d.x - 0.01).abs() < 1e-6);
        assert!((d.y + 0.005).abs() < 1e-6);
    }

    #[test]
    fn zero_mouse_means_zero_displacement() {
        let d = displacement(Vec2::ZERO, 1.0, Vec2::new(0.1, 0.1));
        assert_eq!(d, Vec2::ZERO);
    }

    #[test]
    fn centered_pointer_reduces_to_panned_sample() {
        let compositor = Compositor::new(flat_sources(255), EffectSettings::default());
        // Uniform color: any sample is the flat color, but the invariant we
        // want is that a zero mouse shades exactly like the zoom-only path.
        let uv = Vec2::new(0.3, 0.7);
        let shaded = compositor.shade(uv, Vec2::ZERO);
        let panned = panned_uv(uv, compositor.settings().zoom);
        let expected = compositor.sources().sample_color(panned);
        assert_eq!(shaded[0], (expected[0] * 255.0).round() as u8);
        assert_eq!(shaded[3], 255);
    }

    #[test]
    fn pathological_settings_never_sample_out_of_bounds() {
        let settings = EffectSettings {
            threshold: [10.0, 10.0],
            zoom: 1.0,
            ..Default::default()
        };
        let compositor = Compositor::new(flat_sources(255), settings);
        // Full deflection with no overscan margin: clamp-to-edge must hold
        let rgba = compositor.shade(Vec2::new(0.99, 0.99), Vec2::new(1.0, 1.0));
        assert_eq!(rgba, [64, 128, 192, 255]);
    }

    #[test]
    fn render_fills_whole_buffer() {
        let compositor = Compositor::new(flat_sources(0), EffectSettings::default());
        let ctx = DisplayContext::new(16, 9);
        let pixels = compositor.render(FrameParams::new(Vec2::ZERO), &ctx);
        assert_eq!(pixels.len(), ctx.buffer_size());
        assert!(pixels.chunks_exact(4).all(|p| p == [64, 128, 192, 255]));
    }
}
