use thiserror::Error;

use crate::skeleton::BoneRole;

#[derive(Debug, Clone, Error)]
pub enum AvatarMotionError {
    #[error("Invalid activity state {0:?}, expected one of idle, thinking, listening, speaking")]
    InvalidActivityState(String),

    #[error("Invalid expression {0:?}, expected one of idle, happy, sad, thinking, listening")]
    InvalidExpression(String),

    #[error("Invalid name pattern {pattern:?} for bone role {role:?}: {source}")]
    InvalidBonePattern {
        role: BoneRole,
        pattern: String,
        source: regex::Error,
    },
}
