use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Pointer to look-at scale, keeps the rotation within a natural range
    pub horizontal_range: f32,
    pub vertical_range: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Rate the spring is stepped at, independent of the frame rate
    pub step_hz: f32,
    pub max_steps_per_frame: u32,
    pub model_yaw: f32,
    pub model_pitch: f32,
    pub neck_yaw: f32,
    pub neck_pitch: f32,
    pub head_yaw: f32,
    pub head_pitch: f32,
    /// Gaze weight multiplier while thinking
    pub thinking_scale: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            horizontal_range: 0.15,
            vertical_range: 0.08,
            stiffness: 0.035,
            damping: 0.70,
            step_hz: 60.0,
            max_steps_per_frame: 8,
            model_yaw: 0.32,
            model_pitch: 0.10,
            neck_yaw: 0.38,
            neck_pitch: 0.14,
            head_yaw: 0.45,
            head_pitch: 0.18,
            thinking_scale: 0.625,
        }
    }
}

impl GazeConfig {
    /// Look-at target for a normalised pointer position.
    pub fn target(&self, pointer: Vec2) -> Vec2 {
        let pointer = pointer.clamp(Vec2::NEG_ONE, Vec2::ONE);
        Vec2::new(
            pointer.x * self.horizontal_range,
            pointer.y * self.vertical_range,
        )
    }
}

/// Discrete damped spring tracking a 2D look-at target.
#[derive(Clone, Debug)]
pub struct GazeSpring {
    position: Vec2,
    velocity: Vec2,
    stiffness: f32,
    damping: f32,
    step: f32,
    max_steps: u32,
    accumulator: f32,
}

impl GazeSpring {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            stiffness,
            damping,
            step: 1.0 / 60.0,
            max_steps: 8,
            accumulator: 0.0,
        }
    }

    pub fn from_config(config: &GazeConfig) -> Self {
        Self::new(config.stiffness, config.damping)
            .with_step_rate(config.step_hz, config.max_steps_per_frame)
    }

    pub fn with_step_rate(mut self, step_hz: f32, max_steps: u32) -> Self {
        self.step = 1.0 / step_hz.max(1.0);
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn with_state(mut self, position: Vec2, velocity: Vec2) -> Self {
        self.position = position;
        self.velocity = velocity;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Run a single spring step towards `target`.
    pub fn step(&mut self, target: Vec2) {
        let force = (target - self.position) * self.stiffness;
        self.velocity = (self.velocity + force) * self.damping;
        self.position += self.velocity;
    }

    /// Advance by `delta` seconds worth of fixed steps and return the new position.
    pub fn advance(&mut self, target: Vec2, delta: f32) -> Vec2 {
        self.accumulator += delta.max(0.0);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.step(target);
            self.accumulator -= self.step;
            steps += 1;
        }

        // Time that could not be simulated this frame is dropped
        self.accumulator = self.accumulator.min(self.step);
        self.position
    }

    pub fn reset(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn spring() -> GazeSpring {
        GazeSpring::from_config(&GazeConfig::default())
    }

    #[test]
    fn converges_monotonically_from_rest() {
        let target = Vec2::new(0.15, -0.08);
        let mut spring = spring();
        let mut previous_error = (spring.position() - target).length();

        for _ in 0..60 {
            spring.step(target);
            let error = (spring.position() - target).length();
            assert!(error <= previous_error + 1e-6);
            previous_error = error;
        }

        // Settled within a second
        assert!(previous_error < 0.05 * target.length());
    }

    #[test]
    fn no_significant_overshoot() {
        let target = Vec2::new(0.15, 0.0);
        let mut spring = spring();
        let mut max_x: f32 = 0.0;
        for _ in 0..600 {
            spring.step(target);
            max_x = max_x.max(spring.position().x);
        }
        assert!(max_x <= target.x * 1.1);
    }

    #[test]
    fn settles_from_arbitrary_start() {
        let target = Vec2::new(0.1, 0.05);
        for (position, velocity) in [
            (Vec2::new(0.5, -0.3), Vec2::new(0.05, 0.02)),
            (Vec2::new(-1.0, 1.0), Vec2::new(-0.2, 0.2)),
            (Vec2::ZERO, Vec2::new(0.3, -0.3)),
        ] {
            let mut spring = spring().with_state(position, velocity);
            for _ in 0..180 {
                spring.advance(target, FRAME);
            }
            assert!((spring.position() - target).length() < 1e-3);
        }
    }

    #[test]
    fn frame_rate_does_not_change_the_response() {
        let target = Vec2::new(0.15, 0.08);
        let mut fast = spring();
        let mut slow = spring();
        for _ in 0..120 {
            fast.advance(target, FRAME);
        }
        for _ in 0..60 {
            slow.advance(target, FRAME * 2.0);
        }
        assert!((fast.position() - slow.position()).length() < 1e-3);
    }

    #[test]
    fn long_gap_is_bounded() {
        let target = Vec2::new(0.15, 0.08);
        let mut spring = spring();
        spring.advance(target, 5.0);
        let position = spring.position();
        assert!(position.is_finite());
        assert!(position.length() <= target.length());

        // Zero delta does nothing
        let velocity = spring.velocity();
        spring.advance(target, 0.0);
        assert_eq!(spring.velocity(), velocity);
    }

    #[test]
    fn pointer_target_is_clamped() {
        let config = GazeConfig::default();
        assert_eq!(config.target(Vec2::new(4.0, -9.0)), Vec2::new(0.15, -0.08));
    }
}
