use bevy::math::{Vec2, Vec3};

pub trait Interpolate {
    fn interpolate(self, other: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(self, other: Self, t: f32) -> Self {
        self + ((other - self) * t)
    }
}

impl Interpolate for Vec2 {
    fn interpolate(self, other: Self, t: f32) -> Self {
        Vec2::lerp(self, other, t)
    }
}

impl Interpolate for Vec3 {
    fn interpolate(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }
}

/// Frame rate independent exponential approach towards a moving target.
///
/// The first sample snaps to the target. A `delta_time_seconds` of zero
/// holds the previous value, an arbitrarily large one lands exactly on the
/// target without overshooting.
#[derive(Clone, Copy, Default, Debug)]
pub struct ExpSmoothed<T: Interpolate + Copy + std::fmt::Debug>(pub Option<T>);

impl<T: Interpolate + Copy + std::fmt::Debug> ExpSmoothed<T> {
    // An ad-hoc multiplier to make a smoothness of 1.0 settle in about half a second
    const SMOOTHNESS_MULT: f32 = 8.0;

    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub fn value(&self) -> Option<T> {
        self.0
    }

    pub fn exp_smooth_towards(&mut self, other: &T, smoothness: f32, delta_time_seconds: f32) -> T {
        let interp_t = 1.0
            - (-Self::SMOOTHNESS_MULT * delta_time_seconds.max(0.0) / smoothness.max(1e-5)).exp();

        let prev = self.0.unwrap_or(*other);
        let smooth = prev.interpolate(*other, interp_t);

        self.0 = Some(smooth);
        smooth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_snaps_to_target() {
        let mut smoothed = ExpSmoothed::<f32>::default();
        assert_eq!(smoothed.exp_smooth_towards(&2.0, 1.0, 0.016), 2.0);
    }

    #[test]
    fn approaches_target_without_overshoot() {
        let mut smoothed = ExpSmoothed::new(0.0f32);
        let mut previous = 0.0;
        for _ in 0..120 {
            let value = smoothed.exp_smooth_towards(&1.0, 1.0, 1.0 / 60.0);
            assert!(value >= previous);
            assert!(value <= 1.0);
            previous = value;
        }
        assert!(previous > 0.99);
    }

    #[test]
    fn zero_delta_holds_and_huge_delta_lands() {
        let mut smoothed = ExpSmoothed::new(Vec3::ZERO);
        assert_eq!(smoothed.exp_smooth_towards(&Vec3::ONE, 1.0, 0.0), Vec3::ZERO);
        assert_eq!(
            smoothed.exp_smooth_towards(&Vec3::ONE, 1.0, 5000.0),
            Vec3::ONE
        );
    }
}
