//! Tap-vs-hold gesture classifier for processing stations: a per-attempt
//! ephemeral state machine that resolves a press against an occupied,
//! processable station to exactly one of retrieve (tap) or process (hold)
//! using a single hold-duration threshold. One instance exists per active
//! attempt and is destroyed on release or commit failure.

/// Phase of an active gesture attempt. `Idle` is represented by the absence
/// of a `GestureState`; every terminal transition destroys the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Pressed, threshold not yet reached; a release now is a tap.
    AwaitingHoldDecision,
    /// Held past the threshold and a process started; a release now stops
    /// the process.
    Committed,
}

impl GesturePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingHoldDecision => "awaiting_hold_decision",
            Self::Committed => "committed",
        }
    }
}

/// What the per-tick threshold check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldDecision {
    /// Still under the threshold; keep waiting.
    Waiting,
    /// Threshold reached this tick; the caller must attempt to start the
    /// process, then `commit` on success or destroy the gesture on failure.
    ThresholdReached,
}

/// What a release resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Released under the threshold: a tap, attempt immediate retrieval.
    TapRetrieve,
    /// Released while committed: stop the running process, progress lost.
    StopProcess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureState {
    pub agent_id: String,
    pub station_id: String,
    pub press_tick: u64,
    pub phase: GesturePhase,
}

impl GestureState {
    /// Created on interact-press against an occupied, processable station
    /// with hold-gating enabled.
    pub fn press(
        agent_id: impl Into<String>,
        station_id: impl Into<String>,
        press_tick: u64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            station_id: station_id.into(),
            press_tick,
            phase: GesturePhase::AwaitingHoldDecision,
        }
    }

    /// Per-tick check while the press is held.
    pub fn evaluate(&self, now_tick: u64, hold_threshold_ticks: u64) -> HoldDecision {
        match self.phase {
            GesturePhase::Committed => HoldDecision::Waiting,
            GesturePhase::AwaitingHoldDecision => {
                if now_tick.saturating_sub(self.press_tick) >= hold_threshold_ticks {
                    HoldDecision::ThresholdReached
                } else {
                    HoldDecision::Waiting
                }
            }
        }
    }

    /// Process start succeeded; the gesture is now committed to the hold.
    pub fn commit(&mut self) {
        self.phase = GesturePhase::Committed;
    }

    /// Resolve a release. Consumes the gesture: every release is a terminal
    /// transition.
    pub fn release(self) -> ReleaseAction {
        match self.phase {
            GesturePhase::AwaitingHoldDecision => ReleaseAction::TapRetrieve,
            GesturePhase::Committed => ReleaseAction::StopProcess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u64 = 30;

    fn pressed_at(tick: u64) -> GestureState {
        GestureState::press("chef_001", "station:board_1", tick)
    }

    #[test]
    fn release_under_threshold_is_a_tap() {
        let gesture = pressed_at(100);
        assert_eq!(gesture.evaluate(100 + THRESHOLD - 1, THRESHOLD), HoldDecision::Waiting);
        assert_eq!(gesture.release(), ReleaseAction::TapRetrieve);
    }

    #[test]
    fn threshold_reached_at_exact_boundary() {
        let gesture = pressed_at(100);
        assert_eq!(
            gesture.evaluate(100 + THRESHOLD, THRESHOLD),
            HoldDecision::ThresholdReached
        );
    }

    #[test]
    fn committed_gesture_stops_the_process_on_release() {
        let mut gesture = pressed_at(100);
        gesture.commit();
        assert_eq!(gesture.phase, GesturePhase::Committed);
        assert_eq!(gesture.release(), ReleaseAction::StopProcess);
    }

    #[test]
    fn committed_gesture_never_fires_the_threshold_again() {
        let mut gesture = pressed_at(100);
        gesture.commit();
        assert_eq!(gesture.evaluate(100 + 10 * THRESHOLD, THRESHOLD), HoldDecision::Waiting);
    }

    #[test]
    fn zero_threshold_fires_immediately() {
        let gesture = pressed_at(100);
        assert_eq!(gesture.evaluate(100, 0), HoldDecision::ThresholdReached);
    }
}
