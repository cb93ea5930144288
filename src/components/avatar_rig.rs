use bevy::prelude::{Entity, Vec3};
use enum_map::EnumMap;

use crate::{
    motion::BasePose,
    skeleton::{BoneRole, BoneRoleMap},
};

/// Everything captured from the avatar scene on its first animated frame.
pub struct AvatarRig {
    pub base_pose: BasePose,
    pub bones: BoneRoleMap<Entity>,
    pub bone_rest: EnumMap<BoneRole, Option<BasePose>>,
    pub morph_meshes: Vec<Entity>,
    /// Eye meshes with their rest scale, squashed when there is no blink morph
    pub eye_meshes: Vec<(Entity, Vec3)>,
    pub has_blink_morph: bool,
}

impl AvatarRig {
    pub fn new(base_pose: BasePose) -> Self {
        Self {
            base_pose,
            bones: BoneRoleMap::default(),
            bone_rest: EnumMap::default(),
            morph_meshes: Vec::new(),
            eye_meshes: Vec::new(),
            has_blink_morph: false,
        }
    }

    pub fn bone(&self, role: BoneRole) -> Option<(Entity, BasePose)> {
        Some((self.bones.get(role)?, self.bone_rest[role]?))
    }

    pub fn set_bone(&mut self, role: BoneRole, entity: Entity, rest: BasePose) {
        self.bones.set(role, entity);
        self.bone_rest[role] = Some(rest);
    }
}
