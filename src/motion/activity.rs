use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::{error::AvatarMotionError, morph::Expression, motion::oscillator::BreathingParams};

/// High level mode of the avatar, set only by the conversation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Enum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    #[default]
    Idle,
    Thinking,
    Listening,
    Speaking,
}

impl ActivityState {
    pub const ALL: [ActivityState; 4] = [
        ActivityState::Idle,
        ActivityState::Thinking,
        ActivityState::Listening,
        ActivityState::Speaking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::Thinking => "thinking",
            ActivityState::Listening => "listening",
            ActivityState::Speaking => "speaking",
        }
    }

    /// The facial expression shown while in this state, unless overridden.
    pub fn expression(self) -> Expression {
        match self {
            ActivityState::Idle => Expression::Idle,
            ActivityState::Thinking => Expression::Thinking,
            ActivityState::Listening => Expression::Listening,
            ActivityState::Speaking => Expression::Happy,
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivityState {
    type Err = AvatarMotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityState::ALL
            .into_iter()
            .find(|state| s.eq_ignore_ascii_case(state.name()))
            .ok_or_else(|| AvatarMotionError::InvalidActivityState(s.to_string()))
    }
}

/// Colour and intensity of the rim light that the host may use to reflect the
/// current state.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct RimLight {
    pub intensity: f32,
    /// 0xRRGGBB
    pub color: u32,
}

impl RimLight {
    pub fn rgb(&self) -> [f32; 3] {
        [
            ((self.color >> 16) & 0xff) as f32 / 255.0,
            ((self.color >> 8) & 0xff) as f32 / 255.0,
            (self.color & 0xff) as f32 / 255.0,
        ]
    }
}

/// Motion parameters selected by the current [`ActivityState`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityProfile {
    pub breathing: BreathingParams,
    pub sway_amplitude: f32,
    pub hip_sway_amplitude: f32,
    pub rim_light: RimLight,
}

impl Default for ActivityProfile {
    fn default() -> Self {
        Self {
            breathing: BreathingParams::default(),
            sway_amplitude: 1.0,
            hip_sway_amplitude: 0.05,
            rim_light: RimLight {
                intensity: 1.0,
                color: 0x64d8ff,
            },
        }
    }
}

/// One [`ActivityProfile`] per [`ActivityState`].
///
/// Deserializing merges the given values over the defaults of each state, so a
/// config may override a single field of a single state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "ActivityProfilesPatch")]
pub struct ActivityProfiles {
    pub idle: ActivityProfile,
    pub thinking: ActivityProfile,
    pub listening: ActivityProfile,
    pub speaking: ActivityProfile,
}

impl Default for ActivityProfiles {
    fn default() -> Self {
        default_activity_profiles()
    }
}

impl Index<ActivityState> for ActivityProfiles {
    type Output = ActivityProfile;

    fn index(&self, state: ActivityState) -> &ActivityProfile {
        match state {
            ActivityState::Idle => &self.idle,
            ActivityState::Thinking => &self.thinking,
            ActivityState::Listening => &self.listening,
            ActivityState::Speaking => &self.speaking,
        }
    }
}

impl IndexMut<ActivityState> for ActivityProfiles {
    fn index_mut(&mut self, state: ActivityState) -> &mut ActivityProfile {
        match state {
            ActivityState::Idle => &mut self.idle,
            ActivityState::Thinking => &mut self.thinking,
            ActivityState::Listening => &mut self.listening,
            ActivityState::Speaking => &mut self.speaking,
        }
    }
}

pub fn default_activity_profiles() -> ActivityProfiles {
    ActivityProfiles {
        idle: ActivityProfile::default(),
        thinking: ActivityProfile {
            breathing: BreathingParams {
                speed: 1.0,
                depth: 0.018,
                scale_depth: 0.008,
            },
            sway_amplitude: 0.8,
            hip_sway_amplitude: 0.02,
            rim_light: RimLight {
                intensity: 1.2,
                color: 0x64d8ff,
            },
        },
        listening: ActivityProfile {
            breathing: BreathingParams {
                speed: 1.15,
                depth: 0.020,
                scale_depth: 0.010,
            },
            sway_amplitude: 0.9,
            hip_sway_amplitude: 0.02,
            rim_light: RimLight {
                intensity: 1.0,
                color: 0x9b6dff,
            },
        },
        speaking: ActivityProfile {
            breathing: BreathingParams {
                speed: 1.8,
                depth: 0.015,
                scale_depth: 0.007,
            },
            sway_amplitude: 1.0,
            hip_sway_amplitude: 0.02,
            rim_light: RimLight {
                intensity: 1.5,
                color: 0xff6b9d,
            },
        },
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct BreathingPatch {
    speed: Option<f32>,
    depth: Option<f32>,
    scale_depth: Option<f32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RimLightPatch {
    intensity: Option<f32>,
    color: Option<u32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ActivityProfilePatch {
    breathing: BreathingPatch,
    sway_amplitude: Option<f32>,
    hip_sway_amplitude: Option<f32>,
    rim_light: RimLightPatch,
}

impl ActivityProfilePatch {
    fn apply(self, profile: &mut ActivityProfile) {
        let breathing = &mut profile.breathing;
        breathing.speed = self.breathing.speed.unwrap_or(breathing.speed);
        breathing.depth = self.breathing.depth.unwrap_or(breathing.depth);
        breathing.scale_depth = self.breathing.scale_depth.unwrap_or(breathing.scale_depth);

        profile.sway_amplitude = self.sway_amplitude.unwrap_or(profile.sway_amplitude);
        profile.hip_sway_amplitude = self
            .hip_sway_amplitude
            .unwrap_or(profile.hip_sway_amplitude);

        let rim_light = &mut profile.rim_light;
        rim_light.intensity = self.rim_light.intensity.unwrap_or(rim_light.intensity);
        rim_light.color = self.rim_light.color.unwrap_or(rim_light.color);
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct ActivityProfilesPatch {
    idle: ActivityProfilePatch,
    thinking: ActivityProfilePatch,
    listening: ActivityProfilePatch,
    speaking: ActivityProfilePatch,
}

impl From<ActivityProfilesPatch> for ActivityProfiles {
    fn from(patch: ActivityProfilesPatch) -> Self {
        let mut profiles = default_activity_profiles();
        patch.idle.apply(&mut profiles.idle);
        patch.thinking.apply(&mut profiles.thinking);
        patch.listening.apply(&mut profiles.listening);
        patch.speaking.apply(&mut profiles.speaking);
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_state_names() {
        assert_eq!("idle".parse::<ActivityState>().unwrap(), ActivityState::Idle);
        assert_eq!(
            "Speaking".parse::<ActivityState>().unwrap(),
            ActivityState::Speaking
        );
        assert!(matches!(
            "dancing".parse::<ActivityState>(),
            Err(AvatarMotionError::InvalidActivityState(name)) if name == "dancing"
        ));
        assert!("".parse::<ActivityState>().is_err());
    }

    #[test]
    fn speaking_breathes_faster_and_shallower_than_idle() {
        let profiles = default_activity_profiles();
        let idle = profiles[ActivityState::Idle].breathing;
        let speaking = profiles[ActivityState::Speaking].breathing;
        let thinking = profiles[ActivityState::Thinking].breathing;

        assert!(speaking.speed > idle.speed);
        assert!(speaking.depth < idle.depth);
        for state in ActivityState::ALL {
            assert!(thinking.speed <= profiles[state].breathing.speed);
        }
    }

    #[test]
    fn rim_light_rgb() {
        let rim = RimLight {
            intensity: 1.0,
            color: 0xff0080,
        };
        let [r, g, b] = rim.rgb();
        assert_eq!(r, 1.0);
        assert_eq!(g, 0.0);
        assert!((b - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn profile_overrides_merge_over_state_defaults() {
        let profiles: ActivityProfiles = toml::from_str(
            r#"
            [speaking]
            sway_amplitude = 0.5

            [speaking.breathing]
            depth = 0.03

            [idle.rim_light]
            color = 0x112233
            "#,
        )
        .unwrap();

        let defaults = default_activity_profiles();
        let speaking = profiles[ActivityState::Speaking];
        assert_eq!(speaking.sway_amplitude, 0.5);
        assert_eq!(speaking.breathing.depth, 0.03);
        assert_eq!(speaking.breathing.speed, 1.8);
        assert_eq!(speaking.rim_light, defaults.speaking.rim_light);

        assert_eq!(profiles.idle.rim_light.color, 0x112233);
        assert_eq!(profiles.idle.rim_light.intensity, 1.0);
        assert_eq!(
            profiles[ActivityState::Thinking].breathing.speed,
            defaults.thinking.breathing.speed
        );
        assert_eq!(profiles.listening.rim_light.color, 0x9b6dff);
    }
}
