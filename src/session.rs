//! Session state machine: `Idle` <-> `Showing`.
//!
//! One record arbitrates every event source. An event is accepted only while
//! idle and only once the cooldown since the previous accepted event has run
//! out; leaving `Showing` is purely time driven.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    Motion,
    Trigger,
    Button,
}

impl EventSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EventSource::Motion => "shake",
            EventSource::Trigger => "trigger",
            EventSource::Button => "button",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Showing { shown_at: u64 },
}

#[derive(Clone, Copy, Debug)]
pub struct Session {
    state: SessionState,
    last_event_at: Option<u64>,
    cooldown_ms: u64,
    display_hold_ms: u64,
}

impl Session {
    pub const fn new(cooldown_ms: u64, display_hold_ms: u64) -> Self {
        Self {
            state: SessionState::Idle,
            last_event_at: None,
            cooldown_ms,
            display_hold_ms,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, SessionState::Showing { .. })
    }

    pub fn shown_at(&self) -> Option<u64> {
        match self.state {
            SessionState::Showing { shown_at } => Some(shown_at),
            SessionState::Idle => None,
        }
    }

    pub fn last_event_at(&self) -> Option<u64> {
        self.last_event_at
    }

    /// Earliest tick that may observe the return to idle.
    pub fn idle_after(&self) -> Option<u64> {
        self.shown_at().map(|t| t.saturating_add(self.display_hold_ms))
    }

    pub fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        match self.last_event_at {
            Some(last) => now_ms.saturating_sub(last) >= self.cooldown_ms,
            None => true,
        }
    }

    pub fn can_accept(&self, now_ms: u64) -> bool {
        !self.is_showing() && self.cooldown_elapsed(now_ms)
    }

    /// `Idle -> Showing`. Returns false (and changes nothing) when the event
    /// is rejected.
    pub fn try_accept(&mut self, now_ms: u64, source: EventSource) -> bool {
        if !self.can_accept(now_ms) {
            log::debug!("{} ignored at {} ms", source.as_str(), now_ms);
            return false;
        }
        self.last_event_at = Some(now_ms);
        self.state = SessionState::Showing { shown_at: now_ms };
        true
    }

    /// `Showing -> Idle` once the hold has strictly elapsed.
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match self.state {
            SessionState::Showing { shown_at } if now_ms.saturating_sub(shown_at) > self.display_hold_ms => {
                self.state = SessionState::Idle;
                true
            }
            _ => false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(1000, 3000)
    }
}
