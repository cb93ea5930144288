/// Avatar local time derived from the render driver's clock.
///
/// Local time starts at zero on the first tick. After a resume, or when the
/// driver time jumps backwards, the clock is rebased so that local time carries
/// on from the last simulated value and the rebasing frame has a zero delta.
#[derive(Clone, Debug, Default)]
pub struct AvatarClock {
    offset: f32,
    last_driver_time: Option<f32>,
    last_local_time: f32,
    rebase_pending: bool,
}

impl AvatarClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f32 {
        self.last_local_time
    }

    /// Rebase on the next tick instead of catching up on the time spent paused.
    pub fn mark_resumed(&mut self) {
        self.rebase_pending = true;
    }

    /// Returns (local time, local delta) for this frame.
    pub fn tick(&mut self, driver_time: f32, driver_delta: f32) -> (f32, f32) {
        let last_driver_time = match self.last_driver_time {
            None => {
                self.offset = -driver_time;
                self.last_driver_time = Some(driver_time);
                self.last_local_time = 0.0;
                self.rebase_pending = false;
                return (0.0, 0.0);
            }
            Some(last_driver_time) => last_driver_time,
        };
        self.last_driver_time = Some(driver_time);

        if self.rebase_pending || driver_time < last_driver_time {
            if !self.rebase_pending {
                log::debug!(
                    "Driver time went backwards from {} to {}, rebasing avatar clock",
                    last_driver_time,
                    driver_time
                );
            }
            self.offset = self.last_local_time - driver_time;
            self.rebase_pending = false;
            return (self.last_local_time, 0.0);
        }

        let local_time = driver_time + self.offset;
        let delta = driver_delta.clamp(0.0, (local_time - self.last_local_time).max(0.0));
        self.last_local_time = local_time;
        (local_time, delta)
    }
}
