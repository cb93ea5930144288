mod discovery;

pub use discovery::{
    default_bone_rules, BoneNameMatcher, BoneRule, CompiledBoneRule, HeuristicMatcher,
    NamePattern, SkeletonConfig, SkeletonDiscovery,
};

use std::fmt;

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoneRole {
    Hips,
    Spine,
    Head,
    Neck,
    LeftArm,
    RightArm,
    LeftForearm,
    RightForearm,
}

impl BoneRole {
    pub fn name(self) -> &'static str {
        match self {
            BoneRole::Hips => "hips",
            BoneRole::Spine => "spine",
            BoneRole::Head => "head",
            BoneRole::Neck => "neck",
            BoneRole::LeftArm => "leftArm",
            BoneRole::RightArm => "rightArm",
            BoneRole::LeftForearm => "leftForearm",
            BoneRole::RightForearm => "rightForearm",
        }
    }
}

impl fmt::Display for BoneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Left,
    Right,
}

/// Guess which side of the body a node name refers to.
///
/// Recognises whole words (`LeftArm`, `mixamorig:RightHand`), standalone
/// `l`/`r` tokens (`L_UpperArm`, `upper_arm.L`, `Bip01 L UpperArm`) and a
/// capital `L`/`R` prefix in camel case names (`LUpperArm`).
pub fn detect_side(name: &str) -> Option<BodySide> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("left") {
        return Some(BodySide::Left);
    }
    if lower.contains("right") {
        return Some(BodySide::Right);
    }

    for token in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        match token {
            "l" | "L" => return Some(BodySide::Left),
            "r" | "R" => return Some(BodySide::Right),
            _ => {}
        }
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some('L'), Some(next)) if next.is_ascii_uppercase() => Some(BodySide::Left),
        (Some('R'), Some(next)) if next.is_ascii_uppercase() => Some(BodySide::Right),
        _ => None,
    }
}

/// Non-owning mapping from bone role to scene node, absent roles are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct BoneRoleMap<N> {
    bones: EnumMap<BoneRole, Option<N>>,
}

impl<N> Default for BoneRoleMap<N> {
    fn default() -> Self {
        Self {
            bones: EnumMap::from_fn(|_| None),
        }
    }
}

impl<N: Copy> BoneRoleMap<N> {
    pub fn get(&self, role: BoneRole) -> Option<N> {
        self.bones[role]
    }

    pub fn set(&mut self, role: BoneRole, node: N) {
        self.bones[role] = Some(node);
    }

    pub fn contains(&self, role: BoneRole) -> bool {
        self.bones[role].is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneRole, N)> + '_ {
        self.bones
            .iter()
            .filter_map(|(role, node)| node.map(|node| (role, node)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.bones = EnumMap::from_fn(|_| None);
    }
}
