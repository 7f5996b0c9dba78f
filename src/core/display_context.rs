use glam::Vec2;

/// Display context - output surface dimensions and coordinate mapping
#[derive(Debug, Clone, Copy)]
pub struct DisplayContext {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl DisplayContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Total size in bytes for an RGBA buffer
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * 4
    }

    /// Normalized [0,1]² coordinate of a pixel center, top-left origin
    pub fn uv(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_is_rgba() {
        let ctx = DisplayContext::new(100, 100);
        assert_eq!(ctx.pixel_count(), 10000);
        assert_eq!(ctx.buffer_size(), 40000);
    }

    #[test]
    fn uv_uses_pixel_centers() {
        let ctx = DisplayContext::new(2, 2);
        assert_eq!(ctx.uv(0, 0), Vec2::new(0.25, 0.25));
        assert_eq!(ctx.uv(1, 1), Vec2::new(0.75, 0.75));
    }

    #[test]
    fn uv_spans_unit_square() {
        let ctx = DisplayContext::new(640, 480);
        let first = ctx.uv(0, 0);
        let last = ctx.uv(639, 479);
        assert!(first.x > 0.0 && first.y > 0.0);
        assert!(last.x < 1.0 && last.y < 1.0);
    }
}
