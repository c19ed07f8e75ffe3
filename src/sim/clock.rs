/// Lifecycle of a run as seen by its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// No tick has been requested yet.
    Uninitialized,
    /// Ticks remain.
    Running,
    /// Every tick has been handed out.
    Complete,
}

/// Tick counter for a fixed-length run.
///
/// Hands out tick indices `0..total` in order and tracks which
/// [`RunPhase`] the run is in. There is no early exit.
///
/// # Examples
///
/// ```
/// use airseal_sim::sim::clock::{Clock, RunPhase};
///
/// let mut clock = Clock::new(3);
/// let mut ticks = Vec::new();
///
/// while let Some(tick) = clock.tick() {
///     ticks.push(tick);
/// }
/// assert_eq!(ticks, vec![0, 1, 2]);
/// assert_eq!(clock.phase(), RunPhase::Complete);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    current: usize,
    total: usize,
    started: bool,
}

impl Clock {
    /// Creates a clock that will hand out `total` ticks.
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            started: false,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The zero-based tick index before advancing
    /// * `None` - Once all ticks have been handed out
    pub fn tick(&mut self) -> Option<usize> {
        self.started = true;
        if self.current < self.total {
            let tick = self.current;
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    pub fn phase(&self) -> RunPhase {
        if !self.started {
            RunPhase::Uninitialized
        } else if self.current < self.total {
            RunPhase::Running
        } else {
            RunPhase::Complete
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Ticks handed out so far.
    pub fn elapsed(&self) -> usize {
        self.current
    }
}
