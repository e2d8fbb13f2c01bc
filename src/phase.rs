use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Animation phases, entered strictly in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AnimationPhase {
    #[default]
    Forming,
    Glowing,
    Dispersing,
    Complete,
}

impl AnimationPhase {
    pub fn name(&self) -> &str {
        match self {
            AnimationPhase::Forming => "Forming",
            AnimationPhase::Glowing => "Glowing",
            AnimationPhase::Dispersing => "Dispersing",
            AnimationPhase::Complete => "Complete",
        }
    }

    /// The only phase this one may transition to
    pub fn next(&self) -> Option<AnimationPhase> {
        match self {
            AnimationPhase::Forming => Some(AnimationPhase::Glowing),
            AnimationPhase::Glowing => Some(AnimationPhase::Dispersing),
            AnimationPhase::Dispersing => Some(AnimationPhase::Complete),
            AnimationPhase::Complete => None,
        }
    }
}

/// Wall-clock offsets (from mount) at which each later phase begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    pub glow_at_ms: u64,
    pub disperse_at_ms: u64,
    pub complete_at_ms: u64,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self::BRISK
    }
}

impl PhaseSchedule {
    /// 1s forming, 2s glowing, 2.5s dispersing
    pub const BRISK: PhaseSchedule = PhaseSchedule {
        glow_at_ms: 1000,
        disperse_at_ms: 3000,
        complete_at_ms: 5500,
    };

    /// The slower pacing: 1.5s forming, 2s glowing, 3s dispersing
    pub const CLASSIC: PhaseSchedule = PhaseSchedule {
        glow_at_ms: 1500,
        disperse_at_ms: 3500,
        complete_at_ms: 6500,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.glow_at_ms == 0 {
            return Err(ConfigError::InvalidSchedule(
                "glow_at_ms must be greater than zero".to_string(),
            ));
        }
        if self.disperse_at_ms <= self.glow_at_ms {
            return Err(ConfigError::InvalidSchedule(format!(
                "disperse_at_ms ({}) must be after glow_at_ms ({})",
                self.disperse_at_ms, self.glow_at_ms
            )));
        }
        if self.complete_at_ms <= self.disperse_at_ms {
            return Err(ConfigError::InvalidSchedule(format!(
                "complete_at_ms ({}) must be after disperse_at_ms ({})",
                self.complete_at_ms, self.disperse_at_ms
            )));
        }
        Ok(())
    }

    pub fn total(&self) -> Duration {
        Duration::from_millis(self.complete_at_ms)
    }
}

/// Single start instant; elapsed time is always derived from it
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    start: Instant,
}

impl AnimationClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

/// One scheduled phase transition
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    deadline: Duration,
    phase: AnimationPhase,
    state: TimerState,
}

impl PhaseTimer {
    fn new(deadline_ms: u64, phase: AnimationPhase) -> Self {
        Self {
            deadline: Duration::from_millis(deadline_ms),
            phase,
            state: TimerState::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimerState::Pending
    }
}

/// The three transition timers armed once at mount
#[derive(Debug, Clone)]
pub struct PhaseTimers {
    timers: [PhaseTimer; 3],
}

impl PhaseTimers {
    pub fn arm(schedule: &PhaseSchedule) -> Self {
        Self {
            timers: [
                PhaseTimer::new(schedule.glow_at_ms, AnimationPhase::Glowing),
                PhaseTimer::new(schedule.disperse_at_ms, AnimationPhase::Dispersing),
                PhaseTimer::new(schedule.complete_at_ms, AnimationPhase::Complete),
            ],
        }
    }

    /// Fire every pending timer whose deadline has passed, returning their phases in order.
    /// Several can fire at once after a stalled frame.
    pub fn poll(&mut self, elapsed: Duration) -> Vec<AnimationPhase> {
        let mut fired = Vec::new();
        for timer in self.timers.iter_mut() {
            if timer.is_pending() && elapsed >= timer.deadline {
                timer.state = TimerState::Fired;
                fired.push(timer.phase);
            }
        }
        fired
    }

    pub fn cancel_all(&mut self) {
        for timer in self.timers.iter_mut() {
            if timer.is_pending() {
                timer.state = TimerState::Cancelled;
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| t.is_pending()).count()
    }
}

/// Tracks the current phase and refuses anything but the immediate successor
#[derive(Debug, Clone, Default)]
pub struct PhaseMachine {
    phase: AnimationPhase,
}

impl PhaseMachine {
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Enter `phase` if it directly follows the current one
    pub fn enter(&mut self, phase: AnimationPhase) -> bool {
        if self.phase.next() == Some(phase) {
            self.phase = phase;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let mut phase = AnimationPhase::Forming;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            assert!(next > phase);
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                AnimationPhase::Forming,
                AnimationPhase::Glowing,
                AnimationPhase::Dispersing,
                AnimationPhase::Complete
            ]
        );
    }

    #[test]
    fn test_machine_rejects_skips_and_backsteps() {
        let mut machine = PhaseMachine::default();
        assert!(!machine.enter(AnimationPhase::Dispersing));
        assert!(!machine.enter(AnimationPhase::Forming));
        assert!(machine.enter(AnimationPhase::Glowing));
        assert!(!machine.enter(AnimationPhase::Glowing));
        assert!(machine.enter(AnimationPhase::Dispersing));
        assert!(machine.enter(AnimationPhase::Complete));
        assert!(!machine.enter(AnimationPhase::Forming));
        assert_eq!(machine.phase(), AnimationPhase::Complete);
    }

    #[test]
    fn test_timers_fire_once_in_order() {
        let mut timers = PhaseTimers::arm(&PhaseSchedule::BRISK);
        assert!(timers.poll(Duration::from_millis(999)).is_empty());
        assert_eq!(timers.poll(Duration::from_millis(1000)), vec![AnimationPhase::Glowing]);
        assert!(timers.poll(Duration::from_millis(1500)).is_empty());

        // A stalled frame past both remaining deadlines fires both, in order
        assert_eq!(
            timers.poll(Duration::from_millis(9000)),
            vec![AnimationPhase::Dispersing, AnimationPhase::Complete]
        );
        assert!(timers.poll(Duration::from_millis(20000)).is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_cancelled_timers_never_fire() {
        let mut timers = PhaseTimers::arm(&PhaseSchedule::BRISK);
        timers.poll(Duration::from_millis(1200));
        timers.cancel_all();
        assert_eq!(timers.pending(), 0);
        assert!(timers.poll(Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn test_schedule_validation() {
        assert!(PhaseSchedule::BRISK.validate().is_ok());
        assert!(PhaseSchedule::CLASSIC.validate().is_ok());

        let bad = PhaseSchedule {
            glow_at_ms: 3000,
            disperse_at_ms: 3000,
            complete_at_ms: 5500,
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidSchedule(_))));

        let zero = PhaseSchedule {
            glow_at_ms: 0,
            ..PhaseSchedule::BRISK
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_clock_is_derived() {
        let clock = AnimationClock::start();
        let first = clock.elapsed();
        let second = clock.elapsed();
        assert!(second >= first);
    }
}
