use bevy::{
    math::{EulerRot, Quat, Vec3},
    transform::components::Transform,
};

/// Snapshot of a node's local transform, all motion is composed onto it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BasePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BasePose {
    fn default() -> Self {
        Self::from(&Transform::IDENTITY)
    }
}

impl From<&Transform> for BasePose {
    fn from(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }
}

impl From<BasePose> for Transform {
    fn from(base: BasePose) -> Self {
        Transform {
            translation: base.translation,
            rotation: base.rotation,
            scale: base.scale,
        }
    }
}

/// Additive motion for one frame. `rotation` holds (pitch, yaw, roll) in
/// radians around the x, y and z axes, `scale` is a uniform multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseOffset {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl PoseOffset {
    pub const IDENTITY: PoseOffset = PoseOffset {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: 1.0,
    };

    pub fn from_rotation(rotation: Vec3) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }
}

impl Default for PoseOffset {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Apply `offset` on top of `base`. Never reads the current transform, so the
/// result only depends on the captured pose and this frame's offset.
pub fn compose(base: &BasePose, offset: &PoseOffset) -> Transform {
    if offset.is_identity() {
        return Transform::from(*base);
    }

    Transform {
        translation: base.translation + offset.translation,
        rotation: base.rotation * offset.quat(),
        scale: base.scale * offset.scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BasePose {
        BasePose::from(
            &Transform::from_xyz(1.0, 2.0, 3.0)
                .with_rotation(Quat::from_rotation_y(0.7))
                .with_scale(Vec3::new(1.0, 2.0, 0.5)),
        )
    }

    #[test]
    fn identity_offset_reproduces_base() {
        let base = base();
        assert_eq!(compose(&base, &PoseOffset::IDENTITY), Transform::from(base));
        assert_eq!(compose(&base, &PoseOffset::default()), Transform::from(base));
    }

    #[test]
    fn composition_does_not_accumulate() {
        let base = base();
        let offset = PoseOffset {
            translation: Vec3::new(0.0, 0.02, 0.0),
            rotation: Vec3::new(0.1, 0.2, 0.05),
            scale: 1.01,
        };
        let first = compose(&base, &offset);
        let second = compose(&base, &offset);
        assert_eq!(first, second);

        let back = compose(&base, &PoseOffset::IDENTITY);
        assert_eq!(back, Transform::from(base));
    }

    #[test]
    fn offset_is_applied_in_local_space() {
        let base = BasePose::default();
        let transform = compose(&base, &PoseOffset::from_rotation(Vec3::new(0.0, 0.5, 0.0)));
        assert!(transform
            .rotation
            .abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));
        assert_eq!(transform.translation, Vec3::ZERO);
        assert_eq!(transform.scale, Vec3::ONE);
    }
}
