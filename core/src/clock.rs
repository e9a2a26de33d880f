//! Tick clock, the in-memory mirror of the persisted tick counter.

use crate::{
    error::{SimError, SimResult},
    types::Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickClock {
    current_tick: Tick,
}

impl TickClock {
    /// Resume from the tick persisted in the root partition.
    pub fn resume_at(tick: Tick) -> Self {
        Self { current_tick: tick }
    }

    /// The tick that actions recorded before the next commit belong to.
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// The value the next commit must persist.
    pub fn next_tick(&self) -> Tick {
        self.current_tick + 1
    }

    /// Adopt the value the root partition just committed.
    /// The persisted counter only ever moves forward by one.
    pub fn advance_to(&mut self, tick: Tick) -> SimResult<Tick> {
        let expected = self.next_tick();
        if tick != expected {
            return Err(SimError::TickMismatch { expected, actual: tick });
        }
        self.current_tick = tick;
        Ok(self.current_tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_step_at_a_time() {
        let mut clock = TickClock::resume_at(0);
        assert_eq!(clock.advance_to(1).unwrap(), 1);
        assert_eq!(clock.advance_to(2).unwrap(), 2);
        assert_eq!(clock.current_tick(), 2);
    }

    #[test]
    fn skipping_a_tick_is_refused() {
        let mut clock = TickClock::resume_at(1);
        assert!(matches!(
            clock.advance_to(3),
            Err(SimError::TickMismatch { expected: 2, actual: 3 })
        ));
        assert_eq!(clock.current_tick(), 1);
    }

    #[test]
    fn resumes_from_persisted_value() {
        assert_eq!(TickClock::resume_at(41).current_tick(), 41);
    }
}
