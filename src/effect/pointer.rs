use glam::Vec2;

/// First-order exponential smoother driving the compositor's mouse value.
///
/// Each frame the raw pointer is scaled down to its target influence and the
/// smoothed value moves a fixed fraction of the remaining distance toward it.
/// The blend factor is per-frame, not per-second: convergence speed follows
/// the display refresh rate.
#[derive(Debug, Clone, Copy)]
pub struct PointerFilter {
    value: Vec2,
    scale: f32,
    blend: f32,
}

impl PointerFilter {
    pub fn new(scale: f32, blend: f32) -> Self {
        Self {
            value: Vec2::ZERO,
            scale,
            blend,
        }
    }

    /// Advance one frame toward `raw * scale` and return the smoothed value
    pub fn tick(&mut self, raw: Vec2) -> Vec2 {
        let target = raw * self.scale;
        self.value = self.value.lerp(target, self.blend);
        self.value
    }

    /// Current smoothed value without advancing
    pub fn value(&self) -> Vec2 {
        self.value
    }
}
