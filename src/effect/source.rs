use anyhow::{bail, Result};
use glam::Vec2;
use image::{GrayImage, RgbaImage};

/// The three source rasters of the effect: color, depth, and an optional
/// dedicated alpha mask. Loaded once at startup, immutable afterwards.
///
/// All sampling is bilinear with clamp-to-edge addressing, so any UV is a
/// defined lookup even outside [0,1]².
#[derive(Debug)]
pub struct SourceImages {
    color: RgbaImage,
    depth: GrayImage,
    alpha: Option<GrayImage>,
}

impl SourceImages {
    /// Build the source set, rejecting mismatched or empty rasters.
    pub fn new(color: RgbaImage, depth: GrayImage, alpha: Option<GrayImage>) -> Result<Self> {
        let dims = color.dimensions();
        if dims.0 == 0 || dims.1 == 0 {
            bail!("color image has zero extent");
        }
        if depth.dimensions() != dims {
            bail!(
                "depth map dimensions {:?} don't match color image {:?}",
                depth.dimensions(),
                dims
            );
        }
        if let Some(alpha) = &alpha {
            if alpha.dimensions() != dims {
                bail!(
                    "alpha map dimensions {:?} don't match color image {:?}",
                    alpha.dimensions(),
                    dims
                );
            }
        }

        Ok(Self { color, depth, alpha })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.color.dimensions()
    }

    /// Bilinear RGBA sample, channels in [0,1]
    pub fn sample_color(&self, uv: Vec2) -> [f32; 4] {
        let (w, h) = self.color.dimensions();
        let (x0, y0, x1, y1, fx, fy) = texel_footprint(uv, w, h);

        let mut out = [0.0f32; 4];
        let p00 = self.color.get_pixel(x0, y0).0;
        let p10 = self.color.get_pixel(x1, y0).0;
        let p01 = self.color.get_pixel(x0, y1).0;
        let p11 = self.color.get_pixel(x1, y1).0;
        for c in 0..4 {
            out[c] = bilerp(
                p00[c] as f32, p10[c] as f32, p01[c] as f32, p11[c] as f32, fx, fy,
            ) / 255.0;
        }
        out
    }

    /// Bilinear depth sample in [0,1]
    pub fn sample_depth(&self, uv: Vec2) -> f32 {
        Self::sample_gray(&self.depth, uv)
    }

    /// Alpha used for the early-rejection test: the dedicated alpha map when
    /// present, otherwise the color image's own alpha channel.
    pub fn cutout_alpha(&self, uv: Vec2) -> f32 {
        match &self.alpha {
            Some(alpha) => Self::sample_gray(alpha, uv),
            None => self.sample_color(uv)[3],
        }
    }

    fn sample_gray(img: &GrayImage, uv: Vec2) -> f32 {
        let (w, h) = img.dimensions();
        let (x0, y0, x1, y1, fx, fy) = texel_footprint(uv, w, h);

        let v00 = img.get_pixel(x0, y0).0[0] as f32;
        let v10 = img.get_pixel(x1, y0).0[0] as f32;
        let v01 = img.get_pixel(x0, y1).0[0] as f32;
        let v11 = img.get_pixel(x1, y1).0[0] as f32;
        bilerp(v00, v10, v01, v11, fx, fy) / 255.0
    }
}

/// Resolve a UV to the four texels of its bilinear footprint plus the
/// fractional weights, clamped to image extent on both ends.
fn texel_footprint(uv: Vec2, w: u32, h: u32) -> (u32, u32, u32, u32, f32, f32) {
    let x = (uv.x * w as f32 - 0.5).clamp(0.0, (w - 1) as f32);
    let y = (uv.y * h as f32 - 0.5).clamp(0.0, (h - 1) as f32);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    (x0, y0, x1, y1, x - x0 as f32, y - y0 as f32)
}

fn bilerp(v00: f32, v10: f32, v01: f32, v11: f32, fx: f32, fy: f32) -> f32 {
    let top = v00 * (1.0 - fx) + v10 * fx;
    let bottom = v01 * (1.0 - fx) + v11 * fx;
    top * (1.0 - fy) + bottom * fy
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn checker_color() -> RgbaImage {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        img.put_pixel(0, 1, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 1, Rgba([200, 200, 200, 255]));
        img
    }

    fn flat_gray(w: u32, h: u32, v: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([v]))
    }

    #[test]
    fn rejects_mismatched_depth() {
        let result = SourceImages::new(checker_color(), flat_gray(3, 2, 0), None);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_mismatched_alpha() {
        let result =
            SourceImages::new(checker_color(), flat_gray(2, 2, 0), Some(flat_gray(2, 3, 255)));
        assert!(result.is_err());
    }

    #[test]
    fn bilinear_center_averages_neighbors() {
        let sources = SourceImages::new(checker_color(), flat_gray(2, 2, 128), None).unwrap();
        // UV (0.5, 0.5) sits exactly between all four texels
        let c = sources.sample_color(Vec2::splat(0.5));
        assert!((c[0] - 150.0 / 255.0).abs() < 0.01);
        assert!((c[3] - 1.0).abs() < 0.01);
    }

    #[test]
    fn out_of_range_uv_clamps_to_edge() {
        let sources = SourceImages::new(checker_color(), flat_gray(2, 2, 255), None).unwrap();
        let far = sources.sample_color(Vec2::new(10.0, 10.0));
        let corner = sources.sample_color(Vec2::new(1.0, 1.0));
        assert_eq!(far, corner);

        let neg = sources.sample_color(Vec2::new(-10.0, -10.0));
        assert!((neg[0] - 100.0 / 255.0).abs() < 0.01);
    }

    #[test]
    fn cutout_alpha_prefers_dedicated_map() {
        let sources = SourceImages::new(
            checker_color(),
            flat_gray(2, 2, 128),
            Some(flat_gray(2, 2, 0)),
        )
        .unwrap();
        // Color alpha is opaque but the mask says transparent
        assert!(sources.cutout_alpha(Vec2::splat(0.5)) < 0.01);
    }

    #[test]
    fn cutout_alpha_falls_back_to_color_alpha() {
        let mut color = checker_color();
        color.put_pixel(0, 0, Rgba([100, 100, 100, 0]));
        let sources = SourceImages::new(color, flat_gray(2, 2, 128), None).unwrap();
        assert!(sources.cutout_alpha(Vec2::new(0.25, 0.25)) < 0.01);
    }

    #[test]
    fn depth_normalizes_to_unit_range() {
        let sources = SourceImages::new(checker_color(), flat_gray(2, 2, 255), None).unwrap();
        assert!((sources.sample_depth(Vec2::splat(0.5)) - 1.0).abs() < 1e-6);
    }
}
