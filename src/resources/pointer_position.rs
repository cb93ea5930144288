use bevy::prelude::{Resource, Vec2};

/// Last pointer sample anywhere on screen, normalised to [-1, 1] with y up.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPosition {
    pub normalized: Vec2,
}

impl PointerPosition {
    /// Map a window position (origin top left, y down) into normalised space.
    pub fn from_window_position(position: Vec2, width: f32, height: f32) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::default();
        }

        let normalized = Vec2::new(
            position.x / width * 2.0 - 1.0,
            -(position.y / height * 2.0 - 1.0),
        );
        Self {
            normalized: normalized.clamp(Vec2::NEG_ONE, Vec2::ONE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_corners() {
        assert_eq!(
            PointerPosition::from_window_position(Vec2::new(0.0, 0.0), 800.0, 600.0).normalized,
            Vec2::new(-1.0, 1.0)
        );
        assert_eq!(
            PointerPosition::from_window_position(Vec2::new(400.0, 300.0), 800.0, 600.0)
                .normalized,
            Vec2::ZERO
        );
        assert_eq!(
            PointerPosition::from_window_position(Vec2::new(2000.0, 900.0), 800.0, 600.0)
                .normalized,
            Vec2::new(1.0, -1.0)
        );
        assert_eq!(
            PointerPosition::from_window_position(Vec2::new(10.0, 10.0), 0.0, 600.0),
            PointerPosition::default()
        );
    }
}
