mod avatar_animator;
mod avatar_rig;
mod scene_node_kind;

pub use avatar_animator::{AnimatorLifecycle, AvatarAnimator};
pub use avatar_rig::AvatarRig;
pub use scene_node_kind::SceneNodeKind;
