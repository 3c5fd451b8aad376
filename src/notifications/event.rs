//! Event types for the notification system

use crate::store::RecordId;
use std::time::SystemTime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanEventType {
    /// Accepted scan whose payload was not in the store before
    NewCode,
    /// Accepted scan whose payload was already stored
    AlreadyScanned,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEventType {
    Started,
    Completed,
    LocalOnly,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SystemEventType {
    Startup,
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct ScanEvent {
    pub event_type: ScanEventType,
    pub timestamp: SystemTime,
    pub record_id: Option<RecordId>,
    pub message: Option<String>,
}

impl ScanEvent {
    pub fn new(event_type: ScanEventType, record_id: Option<RecordId>) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            record_id,
            message: None,
        }
    }

    pub fn with_message(
        event_type: ScanEventType,
        record_id: Option<RecordId>,
        message: String,
    ) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type, record_id)
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyncEvent {
    pub event_type: SyncEventType,
    pub timestamp: SystemTime,
    /// Records involved (queued, sent or kept locally depending on the type)
    pub count: usize,
    pub message: Option<String>,
}

impl SyncEvent {
    pub fn new(event_type: SyncEventType, count: usize) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            count,
            message: None,
        }
    }

    pub fn with_message(event_type: SyncEventType, count: usize, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type, count)
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SystemEvent {
    pub fn new(event_type: SystemEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(event_type: SystemEventType, message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::new(event_type)
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Scan(ScanEvent),
    Sync(SyncEvent),
    System(SystemEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Scan(_) => "Scan",
            Event::Sync(_) => "Sync",
            Event::System(_) => "System",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Event::Scan(e) => e.message.as_deref(),
            Event::Sync(e) => e.message.as_deref(),
            Event::System(e) => e.message.as_deref(),
        }
    }

    pub fn timestamp(&self) -> SystemTime {
        match self {
            Event::Scan(e) => e.timestamp,
            Event::Sync(e) => e.timestamp,
            Event::System(e) => e.timestamp,
        }
    }

    /// Whether this event reports a failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Event::Scan(ScanEvent {
                event_type: ScanEventType::Error,
                ..
            }) | Event::Sync(SyncEvent {
                event_type: SyncEventType::Failed,
                ..
            })
        )
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventFilter {
    ScanOnly,
    SyncOnly,
    SystemOnly,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::ScanOnly, Event::Scan(_))
                | (EventFilter::SyncOnly, Event::Sync(_))
                | (EventFilter::SystemOnly, Event::System(_))
                | (EventFilter::All, _)
        )
    }
}
