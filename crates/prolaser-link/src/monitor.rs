//! Per-port frame observation: dispatch, metrics and event log in one place.

use prolaser_metrics::{metric_defs, MetricLabels};
use prolaser_protocol::{CommandCode, Direction, Dispatched, Dispatcher, ProtocolError};
use tracing::{debug, trace};

use crate::event_log::EventRecord;
use crate::state::SharedState;

/// Dispatches raw frames seen on one port against a [`SharedState`].
#[derive(Debug, Clone)]
pub struct Monitor {
    labels: MetricLabels,
    dispatcher: Dispatcher,
    state: SharedState,
}

impl Monitor {
    /// Monitor for frames on `port`.
    pub fn new(port: impl Into<String>, dispatcher: Dispatcher, state: SharedState) -> Self {
        Monitor {
            labels: MetricLabels::new(port),
            dispatcher,
            state,
        }
    }

    pub fn port(&self) -> &str {
        &self.labels.port
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher
    }

    /// Decode and dispatch one raw frame.
    ///
    /// A rejected frame is counted and returned as an error; the shared state
    /// is left as it was.
    pub fn observe(&self, raw: &[u8], direction: Direction) -> Result<Dispatched, ProtocolError> {
        let labels = self.labels.clone().with_direction(direction.label());
        metrics::histogram!(metric_defs::FRAME_SIZE.name, labels.to_labels().as_slice())
            .record(raw.len() as f64);

        let result = self.state.with_device(|device| {
            let result = self.dispatcher.process_raw(device, raw, direction);
            (result, device.laser_active)
        });

        match result {
            (Ok(dispatched), laser_active) => {
                self.count(&labels, &dispatched, laser_active);
                self.state.record(EventRecord::now(&dispatched));
                trace!(
                    port = %self.labels.port,
                    direction = %direction,
                    command = %dispatched.command,
                    "{}",
                    dispatched.outcome
                );
                Ok(dispatched)
            }
            (Err(e), _) => {
                let reason = labels.with(&[("reason", e.reason().to_string())]);
                metrics::counter!(metric_defs::FRAMES_REJECTED.name, reason.as_slice()).increment(1);
                debug!(port = %self.labels.port, direction = %direction, reason = e.reason(), "frame rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Count a read cycle that produced no frame.
    pub fn record_timeout(&self, partial: usize) {
        metrics::counter!(metric_defs::READER_TIMEOUTS.name, self.labels.port_only().as_slice())
            .increment(1);
        debug!(port = %self.labels.port, partial, "read timed out");
    }

    fn count(&self, labels: &MetricLabels, dispatched: &Dispatched, laser_active: bool) {
        let decoded = labels.with(&[("command", dispatched.command.name().to_string())]);
        metrics::counter!(metric_defs::FRAMES_DECODED.name, decoded.as_slice()).increment(1);

        if let CommandCode::Unknown(_) = dispatched.command {
            metrics::counter!(metric_defs::COMMANDS_UNKNOWN.name, labels.to_labels().as_slice())
                .increment(1);
        }
        let port = self.labels.port_only();
        if dispatched.outcome.register_update().is_some() {
            metrics::counter!(metric_defs::REGISTERS_UPDATED.name, port.as_slice()).increment(1);
        }
        metrics::gauge!(metric_defs::LASER_ACTIVE.name, port.as_slice())
            .set(if laser_active { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prolaser_protocol::{encode, ConfigStore, DeviceState, REG_IDENTITY};

    fn monitor() -> Monitor {
        let state = SharedState::new(DeviceState::new(ConfigStore::unknown()), 10);
        Monitor::new("test", Dispatcher::default(), state)
    }

    #[test]
    fn test_observe_records_event() {
        let monitor = monitor();
        let raw = encode(&[0x0B, 0x00, REG_IDENTITY, 0x12]).unwrap();
        let d = monitor.observe(&raw, Direction::Inbound).unwrap();
        assert_eq!(d.command, CommandCode::ReadRegister);
        assert_eq!(monitor.state().device().store.value(REG_IDENTITY), Some(0x12));
        let events = monitor.state().events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "register 0x01 = 0x12");
    }

    #[test]
    fn test_rejected_frame_not_logged() {
        let monitor = monitor();
        let err = monitor.observe(&[0x02, 0x01, 0x06, 0x00, 0x03], Direction::Inbound);
        assert!(matches!(err, Err(ProtocolError::ChecksumMismatch { .. })));
        assert!(monitor.state().events().is_empty());
    }
}
