use glam::Vec2;
use winit::event::WindowEvent;

/// Adapter that bridges winit cursor events to normalized pointer state.
///
/// Positions are mapped to [-1,1]² over the current viewport, with the
/// vertical axis pointing the same way as the output surface's v axis
/// (down). Until the cursor first enters the window the pointer reads as
/// centered; after it leaves, the last known position is kept.
#[derive(Debug, Clone)]
pub struct PointerAdapter {
    viewport: (u32, u32),
    position: Option<(f32, f32)>,
}

impl PointerAdapter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: (width.max(1), height.max(1)),
            position: None,
        }
    }

    /// Process a winit WindowEvent and update pointer state
    pub fn process_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::CursorMoved { position, .. } = event {
            self.position = Some((position.x as f32, position.y as f32));
        }
    }

    /// Track viewport changes so normalization stays in sync with the window
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width, height);
        }
    }

    /// Latest pointer position in normalized device coordinates
    pub fn ndc(&self) -> Vec2 {
        match self.position {
            Some((px, py)) => {
                let (w, h) = self.viewport;
                Vec2::new(
                    (2.0 * px / w as f32 - 1.0).clamp(-1.0, 1.0),
                    (2.0 * py / h as f32 - 1.0).clamp(-1.0, 1.0),
                )
            }
            None => Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_centered_before_first_event() {
        let adapter = PointerAdapter::new(800, 600);
        assert_eq!(adapter.ndc(), Vec2::ZERO);
    }

    #[test]
    fn maps_viewport_corners_to_unit_extents() {
        let mut adapter = PointerAdapter::new(800, 600);
        adapter.position = Some((0.0, 0.0));
        assert_eq!(adapter.ndc(), Vec2::new(-1.0, -1.0));

        adapter.position = Some((800.0, 600.0));
        assert_eq!(adapter.ndc(), Vec2::new(1.0, 1.0));

        adapter.position = Some((400.0, 300.0));
        assert_eq!(adapter.ndc(), Vec2::ZERO);
    }

    #[test]
    fn clamps_positions_outside_viewport() {
        let mut adapter = PointerAdapter::new(800, 600);
        adapter.position = Some((-50.0, 700.0));
        assert_eq!(adapter.ndc(), Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn resize_renormalizes_last_position() {
        let mut adapter = PointerAdapter::new(800, 600);
        adapter.position = Some((400.0, 300.0));
        assert_eq!(adapter.ndc(), Vec2::ZERO);

        adapter.set_viewport(400, 300);
        assert_eq!(adapter.ndc(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn zero_viewport_is_ignored() {
        let mut adapter = PointerAdapter::new(800, 600);
        adapter.set_viewport(0, 0);
        adapter.position = Some((800.0, 600.0));
        assert_eq!(adapter.ndc(), Vec2::new(1.0, 1.0));
    }
}
