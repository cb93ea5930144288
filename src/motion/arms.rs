use std::f32::consts::PI;

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::motion::{
    oscillator::{speaking_arm_noise, MicroMovement},
    smoothing::ExpSmoothed,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ArmConfig {
    pub gesture_speed: f32,
    /// Roll of the upper arms while talking, mirrored for the left arm
    pub raised_roll: f32,
    pub gesture_roll: f32,
    pub gesture_pitch: f32,
    pub forearm_flex: f32,
    pub forearm_gesture: f32,
    /// Roll of the upper arms when hanging at the sides
    pub relaxed_roll: f32,
    pub idle_pitch: f32,
    pub speaking_smoothness: f32,
    pub relaxed_smoothness: f32,
    pub wave_duration: f32,
    pub wave_cycles: f32,
    pub wave_amplitude: f32,
    pub wave_lift: f32,
    pub wave_pitch: f32,
    pub wave_cooldown: f32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            gesture_speed: 3.0,
            raised_roll: 0.5,
            gesture_roll: 0.2,
            gesture_pitch: 0.3,
            forearm_flex: -0.25,
            forearm_gesture: 0.1,
            relaxed_roll: 1.2,
            idle_pitch: 0.05,
            speaking_smoothness: 0.25,
            relaxed_smoothness: 1.0,
            wave_duration: 1.5,
            wave_cycles: 3.0,
            wave_amplitude: 0.3,
            wave_lift: 1.2,
            wave_pitch: -0.5,
            wave_cooldown: 5.0,
        }
    }
}

/// Arm rotations for one frame as (pitch, yaw, roll), relative to rest.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArmPose {
    pub right_arm: Vec3,
    pub left_arm: Vec3,
    pub right_forearm: Vec3,
    pub left_forearm: Vec3,
}

#[derive(Default)]
pub struct ArmDriver {
    config: ArmConfig,
    right_arm: ExpSmoothed<Vec3>,
    left_arm: ExpSmoothed<Vec3>,
    right_forearm: ExpSmoothed<Vec3>,
    left_forearm: ExpSmoothed<Vec3>,
    wave_requested: bool,
    wave_start: Option<f32>,
    wave_ready_time: f32,
}

impl ArmDriver {
    pub fn new(config: ArmConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Queue a greeting wave, ignored while a wave is playing or cooling down.
    pub fn request_wave(&mut self) {
        self.wave_requested = true;
    }

    pub fn is_waving(&self) -> bool {
        self.wave_start.is_some()
    }

    pub fn update(
        &mut self,
        time: f32,
        delta: f32,
        speaking: bool,
        micro: &MicroMovement,
    ) -> ArmPose {
        let config = &self.config;

        if std::mem::take(&mut self.wave_requested) {
            if self.wave_start.is_none() && time >= self.wave_ready_time {
                self.wave_start = Some(time);
            } else {
                log::debug!("Ignoring wave request, previous wave still cooling down");
            }
        }

        let (mut right_arm, left_arm, right_forearm, left_forearm, smoothness) = if speaking {
            let noise = speaking_arm_noise(time, config.gesture_speed);
            (
                Vec3::new(
                    noise.right * config.gesture_pitch,
                    0.0,
                    -config.raised_roll + noise.right * config.gesture_roll,
                ),
                Vec3::new(
                    noise.left * config.gesture_pitch,
                    0.0,
                    config.raised_roll - noise.left * config.gesture_roll,
                ),
                Vec3::new(
                    config.forearm_flex + config.forearm_gesture * noise.right,
                    0.0,
                    0.0,
                ),
                Vec3::new(
                    config.forearm_flex + config.forearm_gesture * noise.left,
                    0.0,
                    0.0,
                ),
                config.speaking_smoothness,
            )
        } else {
            (
                Vec3::new(
                    time.sin() * config.idle_pitch,
                    0.0,
                    -config.relaxed_roll - micro.shoulder_roll,
                ),
                Vec3::new(
                    (time * 1.1).sin() * config.idle_pitch,
                    0.0,
                    config.relaxed_roll + micro.shoulder_roll,
                ),
                Vec3::ZERO,
                Vec3::ZERO,
                config.relaxed_smoothness,
            )
        };

        if let Some(wave_start) = self.wave_start {
            let t = (time - wave_start) / config.wave_duration.max(1e-3);
            if t >= 1.0 {
                self.wave_start = None;
                self.wave_ready_time = time + config.wave_cooldown;
            } else {
                let wave = (t * config.wave_cycles * 2.0 * PI).sin() * config.wave_amplitude;
                right_arm = Vec3::new(
                    config.wave_pitch,
                    0.0,
                    -config.relaxed_roll - config.wave_lift + wave,
                );
            }
        }

        let waving = self.wave_start.is_some();
        ArmPose {
            right_arm: self.right_arm.exp_smooth_towards(
                &right_arm,
                if waving {
                    config.speaking_smoothness
                } else {
                    smoothness
                },
                delta,
            ),
            left_arm: self.left_arm.exp_smooth_towards(&left_arm, smoothness, delta),
            right_forearm: self
                .right_forearm
                .exp_smooth_towards(&right_forearm, smoothness, delta),
            left_forearm: self
                .left_forearm
                .exp_smooth_towards(&left_forearm, smoothness, delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::oscillator::micro_movement;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(driver: &mut ArmDriver, from: f32, frames: usize, speaking: bool) -> (f32, Vec<ArmPose>) {
        let mut poses = Vec::with_capacity(frames);
        let mut time = from;
        for _ in 0..frames {
            poses.push(driver.update(time, FRAME, speaking, &micro_movement(time)));
            time += FRAME;
        }
        (time, poses)
    }

    #[test]
    fn relaxed_arms_hang_mirrored() {
        let mut driver = ArmDriver::new(ArmConfig::default());
        let (_, poses) = run(&mut driver, 0.0, 60, false);
        let pose = poses.last().unwrap();
        assert!((pose.right_arm.z + 1.2).abs() < 0.03);
        assert!((pose.left_arm.z - 1.2).abs() < 0.03);
        assert_eq!(pose.right_forearm, Vec3::ZERO);
    }

    #[test]
    fn speech_start_does_not_pop() {
        let mut driver = ArmDriver::new(ArmConfig::default());
        let (time, poses) = run(&mut driver, 0.0, 120, false);
        let before = *poses.last().unwrap();
        let (_, poses) = run(&mut driver, time, 120, true);

        let first = poses[0];
        assert!((first.right_arm - before.right_arm).length() < 0.45);
        assert!((first.left_arm - before.left_arm).length() < 0.45);

        // Eventually raised
        assert!(poses.last().unwrap().right_arm.z > -0.8);
        assert!(poses.last().unwrap().right_forearm.x < 0.0);
    }

    #[test]
    fn wave_plays_once_then_cools_down() {
        let mut driver = ArmDriver::new(ArmConfig::default());
        let (time, _) = run(&mut driver, 0.0, 60, false);

        driver.request_wave();
        let (time, poses) = run(&mut driver, time, 30, false);
        assert!(driver.is_waving());
        assert!(poses.last().unwrap().right_arm.x < -0.3);

        let (time, _) = run(&mut driver, time, 90, false);
        assert!(!driver.is_waving());

        // Still cooling down
        driver.request_wave();
        let (time, _) = run(&mut driver, time, 1, false);
        assert!(!driver.is_waving());

        let (time, _) = run(&mut driver, time, 60 * 5, false);
        driver.request_wave();
        run(&mut driver, time, 1, false);
        assert!(driver.is_waving());
    }
}
