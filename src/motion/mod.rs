//! Render independent motion core. [`AvatarMotion::sample`] turns one frame of
//! input into a [`FramePose`] without touching the scene.

mod activity;
mod arms;
mod blink;
mod clock;
mod gesture;
mod oscillator;
mod pose;
mod smoothing;
mod spring;

pub use activity::{
    default_activity_profiles, ActivityProfile, ActivityProfiles, ActivityState, RimLight,
};
pub use arms::{ArmConfig, ArmDriver, ArmPose};
pub use blink::{blink_curve, BlinkConfig, BlinkPhase, BlinkScheduler};
pub use clock::AvatarClock;
pub use gesture::{
    gesture_envelope, ActiveGesture, GestureConfig, GestureKind, GestureOffset,
    IdleGestureScheduler,
};
pub use oscillator::{
    breathing, hip_sway, idle_sway, micro_movement, mouth_open, speaking_arm_noise, ArmNoise,
    Breathing, BreathingParams, HipSway, MicroMovement, Sway, MICRO_MOVEMENT_LIMIT,
};
pub use pose::{compose, BasePose, PoseOffset};
pub use smoothing::{ExpSmoothed, Interpolate};
pub use spring::{GazeConfig, GazeSpring};

use bevy::math::{Vec2, Vec3};
use enum_map::EnumMap;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::skeleton::BoneRole;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MouthConfig {
    pub speed: f32,
    pub max_open: f32,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            speed: 9.0,
            max_open: 0.75,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    pub profiles: ActivityProfiles,
    pub hip_sway_speed: f32,
    pub spine_counter_rotation: f32,
    pub spine_breath_pitch: f32,
    pub mouth: MouthConfig,
    pub arms: ArmConfig,
    pub blink: BlinkConfig,
    pub gesture: GestureConfig,
    pub gaze: GazeConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            profiles: default_activity_profiles(),
            hip_sway_speed: 0.8,
            spine_counter_rotation: 0.6,
            spine_breath_pitch: 0.04,
            mouth: MouthConfig::default(),
            arms: ArmConfig::default(),
            blink: BlinkConfig::default(),
            gesture: GestureConfig::default(),
            gaze: GazeConfig::default(),
        }
    }
}

/// Everything the motion core needs to know about the current frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    /// Avatar local time in seconds
    pub time: f32,
    pub delta: f32,
    pub activity: ActivityState,
    /// Whether speech audio is currently playing, drives the mouth
    pub speaking: bool,
    /// Pointer position normalised to [-1, 1], y up
    pub pointer: Vec2,
}

/// Fully computed pose for one frame, applied to the scene in one go.
#[derive(Clone, Debug)]
pub struct FramePose {
    pub root: PoseOffset,
    pub bones: EnumMap<BoneRole, PoseOffset>,
    /// Eyelid closure, 0 open and 1 closed
    pub blink: f32,
    pub mouth_open: f32,
}

impl Default for FramePose {
    fn default() -> Self {
        Self {
            root: PoseOffset::IDENTITY,
            bones: EnumMap::from_fn(|_| PoseOffset::IDENTITY),
            blink: 0.0,
            mouth_open: 0.0,
        }
    }
}

pub struct AvatarMotion {
    config: MotionConfig,
    blink: BlinkScheduler,
    gestures: IdleGestureScheduler,
    gaze: GazeSpring,
    arms: ArmDriver,
    rng: Box<dyn RngCore + Send + Sync>,
}

impl Default for AvatarMotion {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl AvatarMotion {
    pub fn new(config: MotionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: MotionConfig, rng: impl RngCore + Send + Sync + 'static) -> Self {
        Self {
            blink: BlinkScheduler::new(config.blink.clone()),
            gestures: IdleGestureScheduler::new(config.gesture.clone()),
            gaze: GazeSpring::from_config(&config.gaze),
            arms: ArmDriver::new(config.arms.clone()),
            rng: Box::new(rng),
            config,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn profile(&self, activity: ActivityState) -> &ActivityProfile {
        &self.config.profiles[activity]
    }

    pub fn blink(&self) -> &BlinkScheduler {
        &self.blink
    }

    pub fn gestures(&self) -> &IdleGestureScheduler {
        &self.gestures
    }

    pub fn gaze(&self) -> &GazeSpring {
        &self.gaze
    }

    pub fn request_wave(&mut self) {
        self.arms.request_wave();
    }

    pub fn sample(&mut self, input: &FrameInput) -> FramePose {
        let config = &self.config;
        let profile = &config.profiles[input.activity];
        let time = input.time;
        let delta = input.delta.max(0.0);

        let gesture = self.gestures.update(time, &mut *self.rng);
        let breath = breathing(time, &profile.breathing);
        let sway = idle_sway(time, profile.sway_amplitude);
        let micro = micro_movement(time);

        let look = self.gaze.advance(config.gaze.target(input.pointer), delta);
        let gaze_scale = if input.activity == ActivityState::Thinking {
            config.gaze.thinking_scale
        } else {
            1.0
        };
        let gaze_rotation = |yaw_weight: f32, pitch_weight: f32, roll: f32| {
            Vec3::new(
                -look.y * pitch_weight * gaze_scale,
                look.x * yaw_weight * gaze_scale,
                roll,
            )
        };

        let root = PoseOffset {
            translation: Vec3::new(
                sway.lateral + gesture.translation.x,
                breath.offset + gesture.translation.y,
                gesture.translation.z,
            ),
            rotation: gaze_rotation(config.gaze.model_yaw, config.gaze.model_pitch, 0.0)
                + Vec3::new(0.0, sway.yaw, sway.roll)
                + gesture.rotation,
            scale: breath.scale,
        };

        let hips = hip_sway(time, profile.hip_sway_amplitude, config.hip_sway_speed);
        let arms = self.arms.update(
            time,
            delta,
            input.activity == ActivityState::Speaking,
            &micro,
        );

        let mut bones = EnumMap::from_fn(|_| PoseOffset::IDENTITY);
        bones[BoneRole::Head] = PoseOffset::from_rotation(gaze_rotation(
            config.gaze.head_yaw,
            config.gaze.head_pitch,
            micro.head_roll,
        ));
        bones[BoneRole::Neck] = PoseOffset::from_rotation(gaze_rotation(
            config.gaze.neck_yaw,
            config.gaze.neck_pitch,
            micro.neck_roll,
        ));
        bones[BoneRole::Hips] = PoseOffset::from_rotation(Vec3::new(hips.pitch, 0.0, hips.roll));
        bones[BoneRole::Spine] = PoseOffset::from_rotation(Vec3::new(
            -hips.pitch * config.spine_counter_rotation + breath.phase * config.spine_breath_pitch,
            0.0,
            -hips.roll * config.spine_counter_rotation,
        ));
        bones[BoneRole::RightArm] = PoseOffset::from_rotation(arms.right_arm);
        bones[BoneRole::LeftArm] = PoseOffset::from_rotation(arms.left_arm);
        bones[BoneRole::RightForearm] = PoseOffset::from_rotation(arms.right_forearm);
        bones[BoneRole::LeftForearm] = PoseOffset::from_rotation(arms.left_forearm);

        let mouth_open = if input.speaking {
            mouth_open(time, config.mouth.speed, config.mouth.max_open)
        } else {
            0.0
        };

        let blink = self
            .blink
            .update(time, delta, input.activity, &mut *self.rng);

        FramePose {
            root,
            bones,
            blink,
            mouth_open,
        }
    }
}
