//! Bounded log of dispatched frames.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use prolaser_protocol::{Direction, Dispatched};
use serde::Serialize;

/// Default number of entries kept.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 100;

/// One dispatched frame, as shown to a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// When the frame was dispatched.
    pub timestamp: DateTime<Utc>,
    /// Which way it travelled.
    pub direction: Direction,
    /// Command code byte.
    pub code: u8,
    /// Command name.
    pub command: String,
    /// One-line description of the outcome.
    pub summary: String,
}

impl EventRecord {
    /// Record `dispatched` as happening now.
    pub fn now(dispatched: &Dispatched) -> Self {
        Self::at(Utc::now(), dispatched)
    }

    /// Record `dispatched` as happening at `timestamp`.
    pub fn at(timestamp: DateTime<Utc>, dispatched: &Dispatched) -> Self {
        EventRecord {
            timestamp,
            direction: dispatched.direction,
            code: dispatched.command.code(),
            command: dispatched.command.name().to_string(),
            summary: dispatched.outcome.to_string(),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:02x} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%SZ"),
            self.direction,
            self.code,
            self.summary
        )
    }
}

/// Ring buffer of [`EventRecord`]s; the oldest entry goes first.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<EventRecord>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        EventLog::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Log holding at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EventLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry when full.
    pub fn push(&mut self, record: EventRecord) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the entries, oldest first.
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.entries.iter().cloned().collect()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<&EventRecord> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use prolaser_protocol::{CommandCode, Outcome};

    fn record(n: u8) -> EventRecord {
        let dispatched = Dispatched {
            direction: Direction::Inbound,
            command: CommandCode::ReadRegister,
            outcome: Outcome::RegisterValue {
                address: n,
                data: 0,
                update: None,
            },
        };
        EventRecord::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(), &dispatched)
    }

    #[test]
    fn test_oldest_dropped_first() {
        let mut log = EventLog::with_capacity(3);
        for n in 0..5 {
            log.push(record(n));
        }
        assert_eq!(log.len(), 3);
        let summaries: Vec<_> = log.snapshot().into_iter().map(|r| r.summary).collect();
        assert_eq!(
            summaries,
            vec![
                "register 0x02 = 0x00",
                "register 0x03 = 0x00",
                "register 0x04 = 0x00"
            ]
        );
    }

    #[test]
    fn test_record_display() {
        assert_eq!(
            record(1).to_string(),
            "2024-05-01 12:00:00Z rx 0b - register 0x01 = 0x00"
        );
    }

    #[test]
    fn test_record_serializes() {
        let json = serde_json::to_value(record(1)).unwrap();
        assert_eq!(json["direction"], "inbound");
        assert_eq!(json["command"], "read_register");
        assert_eq!(json["code"], 0x0b);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = EventLog::with_capacity(0);
        log.push(record(1));
        log.push(record(2));
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().summary, "register 0x02 = 0x00");
    }
}
