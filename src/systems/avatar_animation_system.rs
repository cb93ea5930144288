use bevy::{
    core::Name,
    hierarchy::Children,
    prelude::{Entity, EventWriter, Query, Res, Time, Transform},
};

use crate::{
    components::{AvatarAnimator, AvatarRig, SceneNodeKind},
    events::AvatarStateChangedEvent,
    morph::MorphTargets,
    motion::{compose, BasePose},
    resources::PointerPosition,
};

type NodeQuery<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static Name>,
        Option<&'static Children>,
        Option<&'static SceneNodeKind>,
    ),
>;

pub fn avatar_animation_system(
    mut query_animators: Query<(Entity, &mut AvatarAnimator)>,
    query_nodes: NodeQuery,
    mut query_transform: Query<&mut Transform>,
    mut query_morph_targets: Query<&mut MorphTargets>,
    mut state_changed_events: EventWriter<AvatarStateChangedEvent>,
    pointer_position: Res<PointerPosition>,
    time: Res<Time>,
) {
    for (entity, mut animator) in query_animators.iter_mut() {
        if animator.is_disposed() {
            continue;
        }

        if animator.needs_rig() {
            match capture_avatar_rig(
                entity,
                &mut animator,
                &query_nodes,
                &query_transform,
                &query_morph_targets,
            ) {
                Some(rig) => animator.attach_rig(rig),
                None => continue,
            }
        }

        let updated = animator.update(
            time.elapsed_seconds(),
            time.delta_seconds(),
            pointer_position.normalized,
        );

        if animator.take_state_change() {
            state_changed_events.send(AvatarStateChangedEvent {
                entity,
                state: animator.activity_state(),
                expression: animator.expression(),
                rim_light: animator.rim_light(),
            });
        }

        if !updated {
            continue;
        }

        let animator = &*animator;
        let (Some(rig), Some(frame)) = (animator.rig(), animator.last_frame()) else {
            continue;
        };

        // The whole frame was computed up front, only writes from here on
        if let Ok(mut transform) = query_transform.get_mut(entity) {
            *transform = compose(&rig.base_pose, &frame.root);
        }

        for (role, bone_entity) in rig.bones.iter() {
            if let Some(rest) = rig.bone_rest[role] {
                if let Ok(mut transform) = query_transform.get_mut(bone_entity) {
                    *transform = compose(&rest, &frame.bones[role]);
                }
            }
        }

        let morph = animator.morph_config();
        for mesh_entity in rig.morph_meshes.iter() {
            if let Ok(mut morph_targets) = query_morph_targets.get_mut(*mesh_entity) {
                morph.apply(
                    &mut morph_targets,
                    animator.expression_driver(),
                    frame.mouth_open,
                    frame.blink,
                );
            }
        }

        if !rig.has_blink_morph {
            let eye_scale = morph.eye_scale(frame.blink);
            for (eye_entity, rest_scale) in rig.eye_meshes.iter() {
                if let Ok(mut transform) = query_transform.get_mut(*eye_entity) {
                    transform.scale.y = rest_scale.y * eye_scale;
                }
            }
        }
    }
}

fn capture_avatar_rig(
    root: Entity,
    animator: &mut AvatarAnimator,
    query_nodes: &NodeQuery,
    query_transform: &Query<&mut Transform>,
    query_morph_targets: &Query<&mut MorphTargets>,
) -> Option<AvatarRig> {
    let base_pose = match animator.take_pending_base_pose() {
        Some(base_pose) => base_pose,
        None => BasePose::from(query_transform.get(root).ok()?),
    };
    let mut rig = AvatarRig::new(base_pose);
    let morph = animator.morph_config();

    // Pre-order traversal of the descendants, the root is animated as a whole
    let mut stack: Vec<Entity> = Vec::new();
    if let Ok((_, Some(children), _)) = query_nodes.get(root) {
        stack.extend(children.iter().rev().copied());
    }

    let mut bone_nodes = Vec::new();
    while let Some(node) = stack.pop() {
        let Ok((name, children, kind)) = query_nodes.get(node) else {
            continue;
        };
        if let Some(children) = children {
            stack.extend(children.iter().rev().copied());
        }
        let name = name.map_or("", |name| name.as_str());

        if let Ok(morph_targets) = query_morph_targets.get(node) {
            if morph_targets.any_matching(|target| morph.is_blink_target(target)) {
                rig.has_blink_morph = true;
            }
            log::debug!(
                "Found morph targets on {:?}: {:?}",
                name,
                morph_targets.names().collect::<Vec<_>>()
            );
            rig.morph_meshes.push(node);
        }

        match kind {
            Some(SceneNodeKind::Mesh) => {
                if morph.is_eye_mesh(name) {
                    if let Ok(transform) = query_transform.get(node) {
                        rig.eye_meshes.push((node, transform.scale));
                    }
                }
            }
            Some(SceneNodeKind::Light) | Some(SceneNodeKind::Camera) => {}
            None => bone_nodes.push((node, name)),
        }
    }

    let bones = animator.discovery().discover(bone_nodes.iter().copied());
    for (role, bone_entity) in bones.iter() {
        if let Ok(transform) = query_transform.get(bone_entity) {
            rig.set_bone(role, bone_entity, BasePose::from(transform));
        }
    }

    if rig.bones.is_empty() {
        log::info!(
            "No bones recognised on avatar {:?}, animating the model as a whole",
            root
        );
    } else {
        log::info!(
            "Avatar {:?} bones: {}",
            root,
            rig.bones
                .iter()
                .map(|(role, bone_entity)| {
                    let name = query_nodes
                        .get(bone_entity)
                        .ok()
                        .and_then(|(name, _, _)| name)
                        .map_or("", |name| name.as_str());
                    format!("{}={}", role, name)
                })
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    log::info!(
        "Avatar {:?} has {} morph target meshes, blink morph: {}, eye meshes: {}",
        root,
        rig.morph_meshes.len(),
        rig.has_blink_morph,
        rig.eye_meshes.len()
    );

    Some(rig)
}
