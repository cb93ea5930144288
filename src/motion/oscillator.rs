//! Stateless signal generators. Every function here depends only on absolute
//! avatar time, so a pause or a long frame only jumps the phase.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreathingParams {
    /// Angular speed in radians per second
    pub speed: f32,
    /// Vertical offset amplitude
    pub depth: f32,
    /// Uniform scale pulse amplitude
    pub scale_depth: f32,
}

impl Default for BreathingParams {
    fn default() -> Self {
        Self {
            speed: 1.25,
            depth: 0.020,
            scale_depth: 0.010,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breathing {
    /// sin(t * speed), shared by every breathing driven channel
    pub phase: f32,
    pub offset: f32,
    pub scale: f32,
}

pub fn breathing(time: f32, params: &BreathingParams) -> Breathing {
    let phase = (time * params.speed).sin();
    Breathing {
        phase,
        offset: phase * params.depth,
        scale: 1.0 + phase * params.scale_depth,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sway {
    pub yaw: f32,
    pub roll: f32,
    pub lateral: f32,
}

/// Whole body sway. Each channel sums two sines with incommensurate
/// frequencies so the motion does not visibly repeat.
pub fn idle_sway(time: f32, amplitude: f32) -> Sway {
    Sway {
        yaw: ((time * 0.65).sin() * 0.030 + (time * 1.37).sin() * 0.008) * amplitude,
        roll: ((time * 0.90).sin() * 0.020 + (time * 1.91).sin() * 0.006) * amplitude,
        lateral: ((time * 0.55).sin() * 0.020 + (time * 1.23).sin() * 0.005) * amplitude,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MicroMovement {
    pub head_roll: f32,
    pub neck_roll: f32,
    pub shoulder_roll: f32,
}

pub const MICRO_MOVEMENT_LIMIT: f32 = 0.02;

pub fn micro_movement(time: f32) -> MicroMovement {
    MicroMovement {
        head_roll: (time * 0.7).sin() * (time * 1.3).cos() * 0.02,
        neck_roll: (time * 0.5).sin() * (time * 0.9 + 1.0).cos() * 0.01,
        shoulder_roll: (time * 0.3).sin() * 0.02,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HipSway {
    pub roll: f32,
    pub pitch: f32,
}

/// Figure-eight hip motion: roll runs at twice the frequency of pitch.
pub fn hip_sway(time: f32, amplitude: f32, speed: f32) -> HipSway {
    let angle = time * speed * 0.5;
    HipSway {
        roll: (angle * 2.0).sin() * amplitude,
        pitch: angle.sin() * amplitude * 0.5,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArmNoise {
    pub right: f32,
    pub left: f32,
}

/// Layered sines used as conversational hand motion, roughly in [-0.8, 0.8].
pub fn speaking_arm_noise(time: f32, speed: f32) -> ArmNoise {
    ArmNoise {
        right: (time * speed).sin() * 0.5 + (time * speed * 2.3).sin() * 0.3,
        left: (time * speed * 1.1 + 1.0).sin() * 0.5 + (time * speed * 2.7 + 2.0).sin() * 0.3,
    }
}

/// Synthetic jaw motion, not tied to the actual speech audio.
pub fn mouth_open(time: f32, speed: f32, max_open: f32) -> f32 {
    ((time * speed).sin() * 0.5 + 0.5) * max_open
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_times() -> impl Iterator<Item = f32> {
        (0..20_000).map(|i| i as f32 * 0.037)
    }

    #[test]
    fn breathing_scale_stays_within_depth() {
        let params = BreathingParams {
            speed: 1.8,
            depth: 0.025,
            scale_depth: 0.01,
        };

        for time in sample_times() {
            let breath = breathing(time, &params);
            assert!(breath.scale >= 1.0 - params.scale_depth);
            assert!(breath.scale <= 1.0 + params.scale_depth);
            assert!(breath.offset.abs() <= params.depth);
        }
    }

    #[test]
    fn signals_rest_at_time_zero() {
        let breath = breathing(0.0, &BreathingParams::default());
        assert_eq!(breath.offset, 0.0);
        assert_eq!(breath.scale, 1.0);
        assert_eq!(idle_sway(0.0, 1.0), Sway::default());
        assert_eq!(micro_movement(0.0), MicroMovement::default());
        assert_eq!(hip_sway(0.0, 0.05, 0.8), HipSway::default());
    }

    #[test]
    fn micro_movement_stays_small() {
        for time in sample_times() {
            let micro = micro_movement(time);
            assert!(micro.head_roll.abs() <= MICRO_MOVEMENT_LIMIT);
            assert!(micro.neck_roll.abs() <= MICRO_MOVEMENT_LIMIT);
            assert!(micro.shoulder_roll.abs() <= MICRO_MOVEMENT_LIMIT);
        }
    }

    #[test]
    fn sway_does_not_repeat_at_its_base_period() {
        // A single 0.65 rad/s sine would repeat after 2π/0.65 seconds
        let period = std::f32::consts::TAU / 0.65;
        let a = idle_sway(3.0, 1.0);
        let b = idle_sway(3.0 + period, 1.0);
        assert!((a.yaw - b.yaw).abs() > 1e-4);
    }

    #[test]
    fn mouth_open_range() {
        for time in sample_times() {
            let open = mouth_open(time, 9.0, 0.75);
            assert!((0.0..=0.75).contains(&open));
        }
    }
}
