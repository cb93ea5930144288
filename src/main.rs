use std::{path::Path, time::Duration};

use anyhow::Context;
use bevy::{
    core::Name,
    hierarchy::BuildWorldChildren,
    log::LogPlugin,
    prelude::{App, Entity, MinimalPlugins, Transform, Vec2, Vec3, World},
    time::TimeUpdateStrategy,
};

use avatar_motion::{
    components::{AvatarAnimator, SceneNodeKind},
    load_config,
    morph::MorphTargets,
    motion::ActivityState,
    resources::PointerPosition,
    AvatarMotionPlugin, Config,
};

const DEMO_SKELETON: &[(&str, Option<&str>, [f32; 3])] = &[
    ("Armature", None, [0.0, 0.0, 0.0]),
    ("Hips", Some("Armature"), [0.0, 1.0, 0.0]),
    ("Spine", Some("Hips"), [0.0, 0.1, 0.0]),
    ("Spine1", Some("Spine"), [0.0, 0.15, 0.0]),
    ("Neck", Some("Spine1"), [0.0, 0.25, 0.0]),
    ("Head", Some("Neck"), [0.0, 0.1, 0.0]),
    ("LeftShoulder", Some("Spine1"), [0.05, 0.2, 0.0]),
    ("LeftArm", Some("LeftShoulder"), [0.12, 0.0, 0.0]),
    ("LeftForeArm", Some("LeftArm"), [0.28, 0.0, 0.0]),
    ("RightShoulder", Some("Spine1"), [-0.05, 0.2, 0.0]),
    ("RightArm", Some("RightShoulder"), [-0.12, 0.0, 0.0]),
    ("RightForeArm", Some("RightArm"), [-0.28, 0.0, 0.0]),
];

fn spawn_demo_avatar(world: &mut World, animator: AvatarAnimator, no_bones: bool) -> Entity {
    let avatar = world
        .spawn((Name::new("Avatar"), Transform::from_xyz(0.0, -1.0, 0.0), animator))
        .id();

    let mut spawned: Vec<(&str, Entity)> = Vec::new();
    for (index, (name, parent, translation)) in DEMO_SKELETON.iter().enumerate() {
        let node_name = if no_bones {
            format!("Bone.{:03}", index)
        } else {
            name.to_string()
        };
        let node = world
            .spawn((
                Name::new(node_name),
                Transform::from_translation(Vec3::from_array(*translation)),
            ))
            .id();

        let parent = parent
            .and_then(|parent| {
                spawned
                    .iter()
                    .find(|(name, _)| *name == parent)
                    .map(|(_, entity)| *entity)
            })
            .unwrap_or(avatar);
        world.entity_mut(parent).push_children(&[node]);
        spawned.push((*name, node));
    }

    let head = spawned
        .iter()
        .find(|(name, _)| *name == "Head")
        .map_or(avatar, |(_, entity)| *entity);
    let face = world
        .spawn((
            Name::new("Face"),
            Transform::default(),
            SceneNodeKind::Mesh,
            MorphTargets::new([
                "eyeBlinkLeft",
                "eyeBlinkRight",
                "jawOpen",
                "smile",
                "frown",
                "browRaise",
            ]),
        ))
        .id();
    world.entity_mut(head).push_children(&[face]);

    avatar
}

fn main() -> anyhow::Result<()> {
    let command = clap::Command::new("avatar-motion-sim")
        .about("Runs the avatar motion controller on a demo rig without rendering")
        .arg(
            clap::Arg::new("config")
                .long("config")
                .help("Path to a TOML configuration file")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("frames")
                .long("frames")
                .help("Number of frames to simulate")
                .takes_value(true)
                .default_value("600"),
        )
        .arg(
            clap::Arg::new("fps")
                .long("fps")
                .help("Simulated frame rate")
                .takes_value(true)
                .default_value("60"),
        )
        .arg(
            clap::Arg::new("state")
                .long("state")
                .help("Activity state: idle, thinking, listening or speaking")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("speaking")
                .long("speaking")
                .help("Animate the mouth as if speech audio is playing"),
        )
        .arg(
            clap::Arg::new("wave")
                .long("wave")
                .help("Play the greeting wave on the first frame"),
        )
        .arg(
            clap::Arg::new("no-bones")
                .long("no-bones")
                .help("Give the demo skeleton unrecognisable bone names"),
        );
    let matches = command.get_matches();

    let frames: u32 = matches
        .value_of("frames")
        .unwrap_or("600")
        .parse()
        .context("Invalid value for --frames")?;
    let fps: f32 = matches
        .value_of("fps")
        .unwrap_or("60")
        .parse()
        .context("Invalid value for --fps")?;
    anyhow::ensure!(fps > 0.0, "--fps must be greater than zero");
    let state = matches
        .value_of("state")
        .map(str::parse::<ActivityState>)
        .transpose()?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LogPlugin::default())
        .add_plugins(AvatarMotionPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            1.0 / fps,
        )));

    let config = matches
        .value_of("config")
        .map(|path| load_config(Path::new(path)))
        .unwrap_or_else(Config::default);

    let mut animator = AvatarAnimator::new(&config)?;
    if let Some(state) = state {
        animator.set_activity_state(state);
    }
    animator.set_speaking(matches.is_present("speaking"));
    if matches.is_present("wave") {
        animator.wave();
    }
    let avatar = spawn_demo_avatar(&mut app.world, animator, matches.is_present("no-bones"));

    let frames_per_second = fps.round().max(1.0) as u32;
    for frame in 0..frames {
        // Sweep the pointer slowly across the screen
        let t = frame as f32 / fps;
        app.world.resource_mut::<PointerPosition>().normalized =
            Vec2::new((t * 0.4).sin(), (t * 0.25).cos() * 0.5);

        app.update();

        if frame % frames_per_second != 0 {
            continue;
        }

        let Some(animator) = app.world.get::<AvatarAnimator>(avatar) else {
            break;
        };
        if frame == 0 {
            let roles: Vec<String> = animator
                .bones()
                .map(|bones| bones.iter().map(|(role, _)| role.to_string()).collect())
                .unwrap_or_default();
            log::info!("Bone roles found: [{}]", roles.join(", "));
        }

        if let Some(pose) = animator.last_frame() {
            let root = app
                .world
                .get::<Transform>(avatar)
                .copied()
                .unwrap_or_default();
            log::info!(
                "t={:>5.1}s state={} expression={} root=({:.3}, {:.3}, {:.3}) scale={:.4} blink={:.2} mouth={:.2}",
                t,
                animator.activity_state(),
                animator.expression(),
                root.translation.x,
                root.translation.y,
                root.translation.z,
                root.scale.y,
                pose.blink,
                pose.mouth_open
            );
        }
    }

    Ok(())
}
