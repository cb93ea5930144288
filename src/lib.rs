#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

use bevy::{
    input::touch::TouchInput,
    prelude::{App, IntoSystemConfigs, IntoSystemSetConfig, Plugin, PostUpdate, PreUpdate, SystemSet},
    transform::TransformSystem,
    window::CursorMoved,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod components;
pub mod error;
pub mod events;
pub mod morph;
pub mod motion;
pub mod resources;
pub mod skeleton;
pub mod systems;

use events::AvatarStateChangedEvent;
use morph::MorphConfig;
use motion::MotionConfig;
use resources::PointerPosition;
use skeleton::SkeletonConfig;
use systems::{avatar_animation_system, avatar_pointer_system};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub motion: MotionConfig,
    pub skeleton: SkeletonConfig,
    pub morph: MorphConfig,
}

pub fn load_config(path: &Path) -> Config {
    let toml_str = match std::fs::read_to_string(path) {
        Ok(toml_str) => toml_str,
        Err(error) => {
            log::warn!(
                "Failed to load configuration from {} with error: {}",
                path.to_string_lossy(),
                error
            );
            return Config::default();
        }
    };

    match toml::from_str(&toml_str) {
        Ok(config) => {
            log::info!("Read configuration from {}", path.to_string_lossy());
            config
        }
        Err(error) => {
            log::warn!(
                "Failed to load configuration from {} with error: {}",
                path.to_string_lossy(),
                error
            );
            Config::default()
        }
    }
}

#[derive(Default)]
pub struct AvatarMotionPlugin;

/// Runs in `PostUpdate`, after it every avatar transform and morph target
/// influence is final for the frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct AvatarMotionSystem;

impl Plugin for AvatarMotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AvatarStateChangedEvent>()
            .add_event::<CursorMoved>()
            .add_event::<TouchInput>()
            .init_resource::<PointerPosition>();

        app.add_systems(PreUpdate, avatar_pointer_system);

        app.configure_set(
            PostUpdate,
            AvatarMotionSystem.before(TransformSystem::TransformPropagate),
        )
        .add_systems(PostUpdate, avatar_animation_system.in_set(AvatarMotionSystem));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        motion::ActivityState,
        skeleton::{BoneRole, SkeletonDiscovery},
    };

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [motion]
            hip_sway_speed = 1.5

            [motion.blink]
            double_blink_chance = 0.0

            [morph]
            eye_squash = 0.5

            [skeleton.overrides]
            head = "J_Bip_C_Head"
            "#,
        )
        .unwrap();

        assert_eq!(config.motion.hip_sway_speed, 1.5);
        assert_eq!(config.motion.blink.double_blink_chance, 0.0);
        assert_eq!(config.motion.blink.interval, 3.0);
        assert_eq!(
            config.motion.profiles[ActivityState::Speaking]
                .breathing
                .speed,
            1.8
        );
        assert_eq!(config.morph.eye_squash, 0.5);
        assert_eq!(config.morph.mouth_candidates.len(), 12);
        assert_eq!(
            config.skeleton.overrides.get(&BoneRole::Head).map(String::as_str),
            Some("J_Bip_C_Head")
        );
        assert_eq!(config.skeleton.rules.len(), 8);
    }

    #[test]
    fn single_profile_override_keeps_the_rest_of_the_config() {
        let path = std::env::temp_dir().join(format!(
            "avatar-motion-profile-override-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
            [motion]
            hip_sway_speed = 1.5

            [motion.profiles.speaking]
            sway_amplitude = 0.5

            [morph]
            eye_squash = 0.5
            "#,
        )
        .unwrap();
        let config = load_config(&path);
        let _ = std::fs::remove_file(&path);

        let defaults = motion::default_activity_profiles();
        let speaking = config.motion.profiles[ActivityState::Speaking];
        assert_eq!(speaking.sway_amplitude, 0.5);
        assert_eq!(speaking.breathing.speed, 1.8);
        assert_eq!(speaking.rim_light, defaults.speaking.rim_light);
        for state in [
            ActivityState::Idle,
            ActivityState::Thinking,
            ActivityState::Listening,
        ] {
            let profile = config.motion.profiles[state];
            assert_eq!(profile.sway_amplitude, defaults[state].sway_amplitude);
            assert_eq!(profile.breathing, defaults[state].breathing);
            assert_eq!(profile.rim_light, defaults[state].rim_light);
        }
        assert_eq!(config.motion.hip_sway_speed, 1.5);
        assert_eq!(config.morph.eye_squash, 0.5);
    }

    #[test]
    fn custom_rules_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [[skeleton.rules]]
            role = "leftArm"
            regex = "^J_Bip_L_UpperArm$"

            [[skeleton.rules]]
            role = "hips"
            any_of = ["pelvis"]
            replace = true
            "#,
        )
        .unwrap();

        let discovery = SkeletonDiscovery::new(&config.skeleton).unwrap();
        let bones = discovery.discover([
            (1, "Pelvis"),
            (2, "J_Bip_L_UpperArm"),
            (3, "PelvisTwist"),
        ]);
        assert_eq!(bones.get(BoneRole::LeftArm), Some(2));
        assert_eq!(bones.get(BoneRole::Hips), Some(3));
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/avatar-motion.toml"));
        assert_eq!(config.motion.mouth.speed, 9.0);
    }
}
