use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::motion::ActivityState;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub min_duration: f32,
    pub max_duration: f32,
    /// Fraction of the blink spent closing, the rest is spent opening
    pub close_fraction: f32,
    pub interval: f32,
    pub interval_jitter: f32,
    pub thinking_interval: f32,
    pub thinking_interval_jitter: f32,
    pub double_blink_chance: f32,
    pub double_blink_min_delay: f32,
    pub double_blink_max_delay: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            min_duration: 0.12,
            max_duration: 0.21,
            close_fraction: 0.4,
            interval: 3.0,
            interval_jitter: 3.0,
            thinking_interval: 1.5,
            thinking_interval_jitter: 2.0,
            double_blink_chance: 0.2,
            double_blink_min_delay: 0.2,
            double_blink_max_delay: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkPhase {
    Waiting,
    Closing,
    Opening,
}

/// Asymmetric eyelid curve: linear close up to `close_fraction`, then a slower
/// linear reopen. Returns 0 for open eyes and 1 for closed.
pub fn blink_curve(progress: f32, close_fraction: f32) -> f32 {
    let progress = progress.clamp(0.0, 1.0);
    let close_fraction = close_fraction.clamp(0.01, 0.99);
    let closure = if progress < close_fraction {
        progress / close_fraction
    } else {
        1.0 - (progress - close_fraction) / (1.0 - close_fraction)
    };
    closure.clamp(0.0, 1.0)
}

pub struct BlinkScheduler {
    config: BlinkConfig,
    phase: BlinkPhase,
    progress: f32,
    next_blink_time: Option<f32>,
    blink_duration: f32,
    double_blink_queued: bool,
}

impl BlinkScheduler {
    pub fn new(config: BlinkConfig) -> Self {
        let blink_duration = config.min_duration;
        Self {
            config,
            phase: BlinkPhase::Waiting,
            progress: 0.0,
            next_blink_time: None,
            blink_duration,
            double_blink_queued: false,
        }
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    pub fn is_blinking(&self) -> bool {
        self.phase != BlinkPhase::Waiting
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn next_blink_time(&self) -> Option<f32> {
        self.next_blink_time
    }

    pub fn blink_duration(&self) -> f32 {
        self.blink_duration
    }

    /// Current eyelid closure in [0, 1].
    pub fn closure(&self) -> f32 {
        match self.phase {
            BlinkPhase::Waiting => 0.0,
            BlinkPhase::Closing | BlinkPhase::Opening => {
                blink_curve(self.progress, self.config.close_fraction)
            }
        }
    }

    /// Advance the blink, returns the eyelid closure for this frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        time: f32,
        delta: f32,
        activity: ActivityState,
        rng: &mut R,
    ) -> f32 {
        let next_blink_time = match self.next_blink_time {
            Some(next_blink_time) => next_blink_time,
            None => {
                let next_blink_time = time + self.interval(activity, rng);
                self.next_blink_time = Some(next_blink_time);
                next_blink_time
            }
        };

        if self.phase == BlinkPhase::Waiting {
            if time < next_blink_time {
                return 0.0;
            }

            // Progress starts at zero on the frame the blink begins
            self.phase = BlinkPhase::Closing;
            self.progress = 0.0;
            self.blink_duration = if self.config.max_duration > self.config.min_duration {
                rng.gen_range(self.config.min_duration..self.config.max_duration)
            } else {
                self.config.min_duration
            }
            .max(1e-3);
            return self.closure();
        }

        self.progress = (self.progress + delta.max(0.0) / self.blink_duration).min(1.0);

        if self.progress >= 1.0 {
            self.phase = BlinkPhase::Waiting;
            self.schedule_next(time, activity, rng);
            return 0.0;
        }

        if self.phase == BlinkPhase::Closing && self.progress >= self.config.close_fraction {
            self.phase = BlinkPhase::Opening;
        }

        self.closure()
    }

    fn schedule_next<R: Rng + ?Sized>(&mut self, time: f32, activity: ActivityState, rng: &mut R) {
        if !self.double_blink_queued && rng.gen::<f32>() < self.config.double_blink_chance {
            let delay = if self.config.double_blink_max_delay > self.config.double_blink_min_delay
            {
                rng.gen_range(self.config.double_blink_min_delay..self.config.double_blink_max_delay)
            } else {
                self.config.double_blink_min_delay
            };
            self.next_blink_time = Some(time + delay);
            self.double_blink_queued = true;
        } else {
            self.next_blink_time = Some(time + self.interval(activity, rng));
            self.double_blink_queued = false;
        }
    }

    fn interval<R: Rng + ?Sized>(&self, activity: ActivityState, rng: &mut R) -> f32 {
        let (base, jitter) = if activity == ActivityState::Thinking {
            (
                self.config.thinking_interval,
                self.config.thinking_interval_jitter,
            )
        } else {
            (self.config.interval, self.config.interval_jitter)
        };
        base + rng.gen::<f32>() * jitter.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn curve_closes_fast_and_opens_slowly() {
        assert_eq!(blink_curve(0.0, 0.4), 0.0);
        assert_eq!(blink_curve(0.2, 0.4), 0.5);
        assert_eq!(blink_curve(0.4, 0.4), 1.0);
        assert!((blink_curve(0.7, 0.4) - 0.5).abs() < 1e-6);
        assert_eq!(blink_curve(1.0, 0.4), 0.0);
        assert_eq!(blink_curve(7.0, 0.4), 0.0);
    }

    #[test]
    fn progress_is_monotonic_within_a_blink() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut blink = BlinkScheduler::new(BlinkConfig::default());
        let mut previous_progress = 0.0;
        let mut was_blinking = false;
        let mut blinks = 0;

        for frame in 0..60 * 120 {
            let time = frame as f32 * FRAME;
            let closure = blink.update(time, FRAME, ActivityState::Idle, &mut rng);
            assert!((0.0..=1.0).contains(&closure));

            if blink.is_blinking() {
                if was_blinking {
                    assert!(blink.progress() >= previous_progress);
                } else {
                    assert_eq!(blink.progress(), 0.0);
                    blinks += 1;
                }
                previous_progress = blink.progress();
            }
            was_blinking = blink.is_blinking();
        }

        // Between 3 and 6 seconds apart, sometimes doubled
        assert!(blinks >= 15);
        assert!(blinks <= 2 * 120 / 3 + 1);
    }

    #[test]
    fn phases_follow_close_then_open() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut blink = BlinkScheduler::new(BlinkConfig::default());
        blink.update(0.0, 0.0, ActivityState::Idle, &mut rng);
        let start = blink.next_blink_time().unwrap();

        let mut time = start;
        blink.update(time, FRAME, ActivityState::Idle, &mut rng);
        assert_eq!(blink.phase(), BlinkPhase::Closing);

        let mut seen = vec![BlinkPhase::Closing];
        while blink.is_blinking() {
            time += 0.005;
            blink.update(time, 0.005, ActivityState::Idle, &mut rng);
            if seen.last() != Some(&blink.phase()) {
                seen.push(blink.phase());
            }
        }
        assert_eq!(
            seen,
            vec![BlinkPhase::Closing, BlinkPhase::Opening, BlinkPhase::Waiting]
        );
        assert!(time - start <= 0.21 + 0.01);
    }

    #[test]
    fn huge_delta_completes_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut blink = BlinkScheduler::new(BlinkConfig::default());
        blink.update(0.0, 0.0, ActivityState::Idle, &mut rng);
        let start = blink.next_blink_time().unwrap();
        blink.update(start, FRAME, ActivityState::Idle, &mut rng);
        assert!(blink.is_blinking());

        let closure = blink.update(start + 5.0, 5.0, ActivityState::Idle, &mut rng);
        assert_eq!(closure, 0.0);
        assert!(!blink.is_blinking());
        assert!(blink.progress() <= 1.0);
        assert!(blink.next_blink_time().unwrap() > start + 5.0);
    }

    #[test]
    fn thinking_blinks_more_often() {
        fn count_blinks(activity: ActivityState) -> usize {
            let mut rng = StdRng::seed_from_u64(11);
            let mut blink = BlinkScheduler::new(BlinkConfig {
                double_blink_chance: 0.0,
                ..Default::default()
            });
            let mut count = 0;
            let mut was_blinking = false;
            for frame in 0..60 * 300 {
                blink.update(frame as f32 * FRAME, FRAME, activity, &mut rng);
                if blink.is_blinking() && !was_blinking {
                    count += 1;
                }
                was_blinking = blink.is_blinking();
            }
            count
        }

        assert!(count_blinks(ActivityState::Thinking) > count_blinks(ActivityState::Idle));
    }

    #[test]
    fn double_blink_follows_quickly_but_never_chains() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut blink = BlinkScheduler::new(BlinkConfig {
            double_blink_chance: 1.0,
            ..Default::default()
        });

        let mut time = 0.0;
        let mut completions = Vec::new();
        let mut was_blinking = false;
        while completions.len() < 4 {
            blink.update(time, FRAME, ActivityState::Idle, &mut rng);
            if was_blinking && !blink.is_blinking() {
                completions.push((time, blink.next_blink_time().unwrap() - time));
            }
            was_blinking = blink.is_blinking();
            time += FRAME;
        }

        let delays: Vec<f32> = completions.iter().map(|(_, delay)| *delay).collect();
        assert!((0.19..=0.31).contains(&delays[0]));
        assert!(delays[1] >= 2.99);
        assert!((0.19..=0.31).contains(&delays[2]));
        assert!(delays[3] >= 2.99);
    }
}
