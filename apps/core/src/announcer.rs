use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::page::{LiveRegion, TextNode};
use crate::search::MatchResult;
use crate::timer::{OneShotTimer, TimerHandle};

pub const DEFAULT_ANNOUNCE_DELAY: Duration = Duration::from_millis(1000);
pub const NO_MATCHES_MESSAGE: &str = "No namespaces match filter";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Polite,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn describe(query_is_blank: bool, result: MatchResult) -> Self {
        if query_is_blank {
            return Self {
                text: format!("{} namespaces found", result.total_count),
                severity: Severity::Polite,
            };
        }

        if result.matched_count == 0 {
            return Self {
                text: NO_MATCHES_MESSAGE.to_string(),
                severity: Severity::Alert,
            };
        }

        Self {
            text: format!(
                "Showing {} out of {} namespaces",
                result.matched_count, result.total_count
            ),
            severity: Severity::Polite,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusOutputs {
    pub status: TextNode,
    pub polite: LiveRegion,
    pub alert: LiveRegion,
}

impl StatusOutputs {
    fn region_mut(&mut self, severity: Severity) -> &mut LiveRegion {
        match severity {
            Severity::Polite => &mut self.polite,
            Severity::Alert => &mut self.alert,
        }
    }

    fn clear_regions(&mut self) {
        self.polite.clear();
        self.alert.clear();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementState {
    pub pending_message: Option<String>,
    pub severity: Severity,
    pub timer: Option<TimerHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub handle: TimerHandle,
    pub message: StatusMessage,
}

#[derive(Debug)]
pub struct StatusAnnouncer {
    delay: Duration,
    state: AnnouncementState,
    timer: OneShotTimer,
}

impl StatusAnnouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: AnnouncementState::default(),
            timer: OneShotTimer::default(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> &AnnouncementState {
        &self.state
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Shows `message` right away and schedules its announcement, dropping any
    /// announcement still waiting.
    pub fn update(
        &mut self,
        message: StatusMessage,
        now: Instant,
        outputs: &mut StatusOutputs,
    ) -> TimerHandle {
        outputs.status.set_text(&message.text);

        if let Some(cancelled) = self.timer.cancel() {
            debug!(timer = cancelled.generation(), "superseded pending announcement");
        }
        outputs.clear_regions();

        let handle = self.timer.arm(now, self.delay);
        self.state = AnnouncementState {
            pending_message: Some(message.text),
            severity: message.severity,
            timer: Some(handle),
        };
        handle
    }

    pub fn poll(&mut self, now: Instant, outputs: &mut StatusOutputs) -> Option<Announcement> {
        let handle = self.timer.fire_if_due(now)?;
        self.state.timer = None;
        let text = self.state.pending_message.take()?;
        let severity = self.state.severity;

        outputs.clear_regions();
        outputs.region_mut(severity).set_text(&text);
        info!(timer = handle.generation(), ?severity, message = %text, "announced filter status");

        Some(Announcement {
            handle,
            message: StatusMessage { text, severity },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Severity, StatusAnnouncer, StatusMessage, StatusOutputs, NO_MATCHES_MESSAGE};
    use crate::search::MatchResult;
    use crate::timer::{Clock, ManualClock};

    fn result(matched_count: usize, total_count: usize) -> MatchResult {
        MatchResult {
            matched_count,
            total_count,
        }
    }

    #[test]
    fn describe_follows_channel_policy() {
        let all = StatusMessage::describe(true, result(4, 4));
        assert_eq!(all.text, "4 namespaces found");
        assert_eq!(all.severity, Severity::Polite);

        let none = StatusMessage::describe(false, result(0, 4));
        assert_eq!(none.text, NO_MATCHES_MESSAGE);
        assert_eq!(none.severity, Severity::Alert);

        let some = StatusMessage::describe(false, result(2, 4));
        assert_eq!(some.text, "Showing 2 out of 4 namespaces");
        assert_eq!(some.severity, Severity::Polite);
    }

    #[test]
    fn visual_status_is_immediate_and_regions_wait_for_delay() {
        let clock = ManualClock::new();
        let mut outputs = StatusOutputs::default();
        let mut announcer = StatusAnnouncer::new(Duration::from_millis(1000));

        announcer.update(StatusMessage::describe(false, result(1, 3)), clock.now(), &mut outputs);
        assert_eq!(outputs.status.text(), "Showing 1 out of 3 namespaces");
        assert_eq!(outputs.polite.text(), "");
        assert!(announcer.poll(clock.now(), &mut outputs).is_none());

        clock.advance(Duration::from_millis(999));
        assert!(announcer.poll(clock.now(), &mut outputs).is_none());

        clock.advance(Duration::from_millis(1));
        let delivered = announcer.poll(clock.now(), &mut outputs).unwrap();
        assert_eq!(delivered.message.severity, Severity::Polite);
        assert_eq!(outputs.polite.text(), "Showing 1 out of 3 namespaces");
        assert_eq!(outputs.alert.text(), "");
        assert_eq!(announcer.state().timer, None);
    }

    #[test]
    fn update_clears_both_regions_before_rearming() {
        let clock = ManualClock::new();
        let mut outputs = StatusOutputs::default();
        let mut announcer = StatusAnnouncer::new(Duration::from_millis(100));

        announcer.update(StatusMessage::describe(false, result(0, 3)), clock.now(), &mut outputs);
        clock.advance(Duration::from_millis(100));
        announcer.poll(clock.now(), &mut outputs);
        assert_eq!(outputs.alert.text(), NO_MATCHES_MESSAGE);

        announcer.update(StatusMessage::describe(false, result(0, 3)), clock.now(), &mut outputs);
        assert_eq!(outputs.alert.text(), "");
        assert_eq!(outputs.polite.text(), "");

        clock.advance(Duration::from_millis(100));
        announcer.poll(clock.now(), &mut outputs);
        assert_eq!(outputs.alert.spoken(), [NO_MATCHES_MESSAGE, NO_MATCHES_MESSAGE]);
    }

    #[test]
    fn switching_severity_empties_the_other_region() {
        let clock = ManualClock::new();
        let mut outputs = StatusOutputs::default();
        let mut announcer = StatusAnnouncer::new(Duration::from_millis(100));

        announcer.update(StatusMessage::describe(false, result(0, 2)), clock.now(), &mut outputs);
        clock.advance(Duration::from_millis(100));
        announcer.poll(clock.now(), &mut outputs);

        announcer.update(StatusMessage::describe(true, result(2, 2)), clock.now(), &mut outputs);
        clock.advance(Duration::from_millis(100));
        announcer.poll(clock.now(), &mut outputs);

        assert_eq!(outputs.polite.text(), "2 namespaces found");
        assert_eq!(outputs.alert.text(), "");
    }

    #[test]
    fn only_the_last_update_in_a_burst_is_announced() {
        let clock = ManualClock::new();
        let mut outputs = StatusOutputs::default();
        let mut announcer = StatusAnnouncer::new(Duration::from_millis(1000));

        let first = announcer.update(StatusMessage::describe(false, result(3, 5)), clock.now(), &mut outputs);
        clock.advance(Duration::from_millis(300));
        announcer.update(StatusMessage::describe(false, result(2, 5)), clock.now(), &mut outputs);
        clock.advance(Duration::from_millis(300));
        let last = announcer.update(StatusMessage::describe(false, result(1, 5)), clock.now(), &mut outputs);

        clock.advance(Duration::from_millis(5000));
        let delivered = announcer.poll(clock.now(), &mut outputs).unwrap();

        assert_ne!(first, last);
        assert_eq!(delivered.handle, last);
        assert_eq!(outputs.polite.spoken(), ["Showing 1 out of 5 namespaces"]);
        assert_eq!(outputs.status.writes(), 3);
        assert!(announcer.poll(clock.now(), &mut outputs).is_none());
    }
}
