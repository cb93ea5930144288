use bevy::prelude::{Component, Entity, Transform, Vec2};
use rand::RngCore;

use crate::{
    components::AvatarRig,
    error::AvatarMotionError,
    morph::{Expression, ExpressionDriver, MorphConfig},
    motion::{
        ActivityState, AvatarClock, AvatarMotion, BasePose, FrameInput, FramePose, RimLight,
    },
    skeleton::{BoneRoleMap, SkeletonDiscovery},
    Config,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorLifecycle {
    Running,
    Paused,
    Disposed,
}

struct ExpressionOverride {
    expression: Expression,
    remaining: Option<f32>,
}

/// Per avatar animation controller, attach it to the avatar's root entity.
///
/// All setters only record the request, it takes effect on the next frame of
/// `avatar_animation_system`.
#[derive(Component)]
pub struct AvatarAnimator {
    motion: AvatarMotion,
    discovery: SkeletonDiscovery,
    morph: MorphConfig,
    expression: ExpressionDriver,
    expression_override: Option<ExpressionOverride>,
    clock: AvatarClock,
    rig: Option<AvatarRig>,
    pending_base_pose: Option<BasePose>,
    lifecycle: AnimatorLifecycle,
    activity: ActivityState,
    speaking: bool,
    state_changed: bool,
    frame: Option<FramePose>,
}

impl Default for AvatarAnimator {
    fn default() -> Self {
        Self::from_parts(
            AvatarMotion::default(),
            SkeletonDiscovery::default(),
            MorphConfig::default(),
        )
    }
}

impl AvatarAnimator {
    pub fn new(config: &Config) -> Result<Self, AvatarMotionError> {
        Ok(Self::from_parts(
            AvatarMotion::new(config.motion.clone()),
            SkeletonDiscovery::new(&config.skeleton)?,
            config.morph.clone(),
        ))
    }

    fn from_parts(motion: AvatarMotion, discovery: SkeletonDiscovery, morph: MorphConfig) -> Self {
        Self {
            motion,
            discovery,
            expression: ExpressionDriver::new(&morph),
            morph,
            expression_override: None,
            clock: AvatarClock::new(),
            rig: None,
            pending_base_pose: None,
            lifecycle: AnimatorLifecycle::Running,
            activity: ActivityState::Idle,
            speaking: false,
            // Announce the initial state on the first frame
            state_changed: true,
            frame: None,
        }
    }

    /// Use the given random number generator for blinks and gestures.
    pub fn with_rng(mut self, rng: impl RngCore + Send + Sync + 'static) -> Self {
        self.motion = AvatarMotion::with_rng(self.motion.config().clone(), rng);
        self
    }

    pub fn with_discovery(mut self, discovery: SkeletonDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn activity_state(&self) -> ActivityState {
        self.activity
    }

    pub fn set_activity_state(&mut self, state: ActivityState) {
        if self.activity != state {
            log::debug!("Avatar state {} -> {}", self.activity, state);
            self.activity = state;
            self.state_changed = true;
        }
    }

    /// Leaves the current state untouched when `name` is not a known state.
    pub fn set_activity_state_by_name(&mut self, name: &str) -> Result<(), AvatarMotionError> {
        let state = name.parse::<ActivityState>()?;
        self.set_activity_state(state);
        Ok(())
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Whether speech audio is playing, drives the mouth.
    pub fn set_speaking(&mut self, speaking: bool) {
        self.speaking = speaking;
    }

    /// Override the expression derived from the activity state.
    pub fn set_expression(&mut self, expression: Expression) {
        self.expression_override = Some(ExpressionOverride {
            expression,
            remaining: None,
        });
        self.state_changed = true;
    }

    /// Show `expression` for `seconds` of avatar time, then return to the
    /// expression of the current state.
    pub fn flash_expression(&mut self, expression: Expression, seconds: f32) {
        self.expression_override = Some(ExpressionOverride {
            expression,
            remaining: Some(seconds.max(0.0)),
        });
        self.state_changed = true;
    }

    pub fn clear_expression(&mut self) {
        if self.expression_override.take().is_some() {
            self.state_changed = true;
        }
    }

    pub fn expression(&self) -> Expression {
        self.expression_override
            .as_ref()
            .map_or_else(|| self.activity.expression(), |o| o.expression)
    }

    pub fn rim_light(&self) -> RimLight {
        self.motion.profile(self.activity).rim_light
    }

    /// Play the greeting wave, ignored while a previous wave is cooling down.
    pub fn wave(&mut self) {
        if self.lifecycle != AnimatorLifecycle::Disposed {
            self.motion.request_wave();
        }
    }

    pub fn lifecycle(&self) -> AnimatorLifecycle {
        self.lifecycle
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == AnimatorLifecycle::Paused
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == AnimatorLifecycle::Disposed
    }

    pub fn pause(&mut self) {
        if self.lifecycle == AnimatorLifecycle::Running {
            self.lifecycle = AnimatorLifecycle::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.lifecycle == AnimatorLifecycle::Paused {
            self.lifecycle = AnimatorLifecycle::Running;
            self.clock.mark_resumed();
        }
    }

    /// Release every scene reference. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.lifecycle != AnimatorLifecycle::Disposed {
            log::debug!("Disposing avatar animator");
        }
        self.lifecycle = AnimatorLifecycle::Disposed;
        self.rig = None;
        self.pending_base_pose = None;
        self.frame = None;
        self.state_changed = false;
    }

    /// Replace the base pose all root motion is composed onto.
    pub fn reposition(&mut self, transform: Transform) {
        let base_pose = BasePose::from(&transform);
        match self.rig.as_mut() {
            Some(rig) => rig.base_pose = base_pose,
            None => self.pending_base_pose = Some(base_pose),
        }
    }

    pub fn bones(&self) -> Option<&BoneRoleMap<Entity>> {
        self.rig.as_ref().map(|rig| &rig.bones)
    }

    pub fn rig(&self) -> Option<&AvatarRig> {
        self.rig.as_ref()
    }

    pub fn needs_rig(&self) -> bool {
        self.rig.is_none() && self.lifecycle != AnimatorLifecycle::Disposed
    }

    pub fn attach_rig(&mut self, rig: AvatarRig) {
        if self.lifecycle != AnimatorLifecycle::Disposed {
            self.rig = Some(rig);
        }
    }

    pub(crate) fn take_pending_base_pose(&mut self) -> Option<BasePose> {
        self.pending_base_pose.take()
    }

    pub fn discovery(&self) -> &SkeletonDiscovery {
        &self.discovery
    }

    pub fn morph_config(&self) -> &MorphConfig {
        &self.morph
    }

    pub fn expression_driver(&self) -> &ExpressionDriver {
        &self.expression
    }

    pub fn motion(&self) -> &AvatarMotion {
        &self.motion
    }

    /// The pose computed by the most recent update.
    pub fn last_frame(&self) -> Option<&FramePose> {
        self.frame.as_ref()
    }

    pub(crate) fn take_state_change(&mut self) -> bool {
        std::mem::take(&mut self.state_changed)
    }

    /// Advance the simulation by one frame of driver time. Returns `false`
    /// without touching any state while paused or disposed.
    pub fn update(&mut self, driver_time: f32, driver_delta: f32, pointer: Vec2) -> bool {
        if self.lifecycle != AnimatorLifecycle::Running {
            return false;
        }

        let (time, delta) = self.clock.tick(driver_time, driver_delta);

        if let Some(expression_override) = self.expression_override.as_mut() {
            if let Some(remaining) = expression_override.remaining.as_mut() {
                *remaining -= delta;
                if *remaining <= 0.0 {
                    self.expression_override = None;
                    self.state_changed = true;
                }
            }
        }

        let expression = self.expression();
        self.expression.set_expression(expression);
        self.expression.update(delta);

        self.frame = Some(self.motion.sample(&FrameInput {
            time,
            delta,
            activity: self.activity,
            speaking: self.speaking,
            pointer,
        }));
        true
    }
}
