use bevy::prelude::Component;

/// Marks non-bone scene nodes, added by whoever spawns the avatar scene.
/// Nodes without it are treated as plain groups or bones.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneNodeKind {
    Mesh,
    Light,
    Camera,
}
