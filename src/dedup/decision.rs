//! Decision and state types for the deduplicator

use std::fmt;
use std::time::Duration;

/// Minimum time before the same payload may be accepted again
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3000);

/// How long an accepted scan holds the processing flag before it is released automatically
pub const DEFAULT_PROCESSING_TIMEOUT: Duration = Duration::from_millis(1000);

/// Outcome of offering a decode event to the deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The event is new; the caller owns the processing slot until release
    Accept,
    /// A previously accepted scan is still settling
    RejectBusy,
    /// Same payload as the last accepted scan, inside the cooldown window
    RejectDuplicate,
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::RejectBusy => "reject-busy",
            Decision::RejectDuplicate => "reject-duplicate",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing configuration, fixed for the lifetime of a deduplicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupConfig {
    pub cooldown: Duration,
    pub processing_timeout: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            processing_timeout: DEFAULT_PROCESSING_TIMEOUT,
        }
    }
}

/// Deduplication state owned by a single deduplicator
///
/// Starts empty and is never persisted; a restart forgets the last payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeduplicationState {
    pub last_payload: Option<String>,
    pub last_accepted_at: Option<i64>,
    pub processing: bool,
}

impl DeduplicationState {
    /// Pure decision step; mutates state only on `Accept`
    pub(crate) fn apply(&mut self, payload: &str, decoded_at: i64, cooldown: Duration) -> Decision {
        if self.processing {
            return Decision::RejectBusy;
        }

        if let (Some(last_payload), Some(last_at)) = (&self.last_payload, self.last_accepted_at) {
            let cooldown_ms = i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX);
            // An earlier timestamp than the last acceptance counts as inside the window
            if last_payload == payload && decoded_at.saturating_sub(last_at) < cooldown_ms {
                return Decision::RejectDuplicate;
            }
        }

        self.processing = true;
        self.last_payload = Some(payload.to_string());
        self.last_accepted_at = Some(decoded_at);
        Decision::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(3000);

    #[test]
    fn test_empty_state_accepts() {
        let mut state = DeduplicationState::default();
        assert_eq!(state.apply("ABC123", 10_000, COOLDOWN), Decision::Accept);
        assert!(state.processing);
        assert_eq!(state.last_payload.as_deref(), Some("ABC123"));
        assert_eq!(state.last_accepted_at, Some(10_000));
    }

    #[test]
    fn test_processing_rejects_any_payload() {
        let mut state = DeduplicationState::default();
        state.apply("A", 0, COOLDOWN);

        assert_eq!(state.apply("A", 10_000, COOLDOWN), Decision::RejectBusy);
        assert_eq!(state.apply("B", 10_000, COOLDOWN), Decision::RejectBusy);
        assert_eq!(state.last_payload.as_deref(), Some("A"));
    }

    #[test]
    fn test_cooldown_window_boundaries() {
        let mut state = DeduplicationState::default();
        state.apply("A", 1_000, COOLDOWN);
        state.processing = false;

        assert_eq!(state.apply("A", 3_999, COOLDOWN), Decision::RejectDuplicate);
        assert_eq!(state.apply("A", 500, COOLDOWN), Decision::RejectDuplicate);
        // exactly one cooldown later is outside the window
        assert_eq!(state.apply("A", 4_000, COOLDOWN), Decision::Accept);
    }

    #[test]
    fn test_different_payload_ignores_cooldown() {
        let mut state = DeduplicationState::default();
        state.apply("A", 1_000, COOLDOWN);
        state.processing = false;

        assert_eq!(state.apply("B", 1_001, COOLDOWN), Decision::Accept);
        state.processing = false;
        // A is no longer the last payload, so it is accepted again
        assert_eq!(state.apply("A", 1_002, COOLDOWN), Decision::Accept);
    }

    #[test]
    fn test_rejections_do_not_touch_state() {
        let mut state = DeduplicationState::default();
        state.apply("A", 1_000, COOLDOWN);
        state.processing = false;
        let before = state.clone();

        assert_eq!(state.apply("A", 2_000, COOLDOWN), Decision::RejectDuplicate);
        assert_eq!(state, before);
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Accept.to_string(), "accept");
        assert_eq!(Decision::RejectBusy.to_string(), "reject-busy");
        assert!(!Decision::RejectDuplicate.is_accept());
    }
}
