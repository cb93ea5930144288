use std::f32::consts::PI;

use bevy::math::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct GestureConfig {
    pub min_interval: f32,
    pub max_interval: f32,
    pub min_duration: f32,
    pub max_duration: f32,
    /// Fraction of the gesture spent ramping in, and again ramping out
    pub ramp: f32,
    pub nod_pitch: f32,
    pub tilt_roll: f32,
    pub look_away_yaw: f32,
    pub lean_pitch: f32,
    pub lean_dip: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_interval: 3.0,
            max_interval: 8.0,
            min_duration: 0.9,
            max_duration: 1.7,
            ramp: 0.2,
            nod_pitch: 0.10,
            tilt_roll: 0.10,
            look_away_yaw: 0.25,
            lean_pitch: 0.06,
            lean_dip: 0.015,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Nod,
    Tilt,
    LookAway,
    Lean,
}

impl GestureKind {
    pub const ALL: [GestureKind; 4] = [
        GestureKind::Nod,
        GestureKind::Tilt,
        GestureKind::LookAway,
        GestureKind::Lean,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveGesture {
    pub kind: GestureKind,
    pub start_time: f32,
    pub duration: f32,
    /// -1 or 1, only used by look away
    pub side: f32,
}

/// Model level offset produced by a gesture. Rotation is (pitch, yaw, roll).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureOffset {
    pub translation: Vec3,
    pub rotation: Vec3,
}

impl GestureOffset {
    pub const ZERO: GestureOffset = GestureOffset {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };
}

/// Trapezoid envelope over normalised gesture time.
pub fn gesture_envelope(t: f32, ramp: f32) -> f32 {
    let ramp = ramp.clamp(1e-3, 0.5);
    if t <= 0.0 || t >= 1.0 {
        0.0
    } else if t < ramp {
        t / ramp
    } else if t > 1.0 - ramp {
        (1.0 - t) / ramp
    } else {
        1.0
    }
}

pub struct IdleGestureScheduler {
    config: GestureConfig,
    active: Option<ActiveGesture>,
    next_gesture_time: Option<f32>,
}

impl IdleGestureScheduler {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
            next_gesture_time: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        self.active.as_ref()
    }

    pub fn next_gesture_time(&self) -> Option<f32> {
        self.next_gesture_time
    }

    /// Start a gesture if one is due, advance the active one and return its
    /// offset for this frame.
    pub fn update<R: Rng + ?Sized>(&mut self, time: f32, rng: &mut R) -> GestureOffset {
        let next_gesture_time = match self.next_gesture_time {
            Some(next_gesture_time) => next_gesture_time,
            None => {
                let next_gesture_time = time + self.interval(rng);
                self.next_gesture_time = Some(next_gesture_time);
                next_gesture_time
            }
        };

        if self.active.is_none() && time >= next_gesture_time {
            self.active = Some(self.start(time, rng));
        }

        let gesture = match self.active {
            Some(gesture) => gesture,
            None => return GestureOffset::ZERO,
        };

        let t = (time - gesture.start_time) / gesture.duration;
        if t >= 1.0 {
            self.active = None;
            self.next_gesture_time = Some(time + self.interval(rng));
            return GestureOffset::ZERO;
        }

        self.offset(&gesture, t.max(0.0))
    }

    fn start<R: Rng + ?Sized>(&self, time: f32, rng: &mut R) -> ActiveGesture {
        let kind = GestureKind::ALL[rng.gen_range(0..GestureKind::ALL.len())];
        let duration = if self.config.max_duration > self.config.min_duration {
            rng.gen_range(self.config.min_duration..self.config.max_duration)
        } else {
            self.config.min_duration
        }
        .max(1e-3);
        let side = if rng.gen::<bool>() { 1.0 } else { -1.0 };

        log::trace!("Starting idle gesture {:?} for {:.2}s", kind, duration);
        ActiveGesture {
            kind,
            start_time: time,
            duration,
            side,
        }
    }

    fn offset(&self, gesture: &ActiveGesture, t: f32) -> GestureOffset {
        let envelope = gesture_envelope(t, self.config.ramp);
        let mut offset = GestureOffset::ZERO;

        match gesture.kind {
            GestureKind::Nod => {
                offset.rotation.x = (t * 4.0 * PI).sin() * self.config.nod_pitch * envelope;
            }
            GestureKind::Tilt => {
                offset.rotation.z = (t * 2.0 * PI).sin() * self.config.tilt_roll * envelope;
            }
            GestureKind::LookAway => {
                offset.rotation.y = gesture.side * self.config.look_away_yaw * envelope;
            }
            GestureKind::Lean => {
                offset.rotation.x = -self.config.lean_pitch * envelope;
                offset.translation.y = -self.config.lean_dip * envelope;
            }
        }

        offset
    }

    fn interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.config.max_interval > self.config.min_interval {
            rng.gen_range(self.config.min_interval..self.config.max_interval)
        } else {
            self.config.min_interval
        }
    }
}
