//! Metrics for the ProLaser serial link.
//!
//! Every metric the link layer records is declared here as a [`Metric`]
//! constant so names, units and label keys live in one place. With no
//! recorder installed the `metrics` macros are no-ops.
//!
//! # Example
//!
//! ```rust,ignore
//! use prolaser_metrics::{describe_metrics, metric_defs, MetricLabels};
//!
//! describe_metrics();
//!
//! let labels = MetricLabels::new("/dev/ttyUSB0").with_direction("rx");
//! let labels = labels.with(&[("command", "reading".into())]);
//! metrics::counter!(metric_defs::FRAMES_DECODED.name, labels.as_slice()).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// The kind of metric (counter, gauge, or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A gauge that can go up and down.
    Gauge,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// ```rust
/// use prolaser_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const FRAMES: Metric = Metric::counter("prolaser.frames")
///     .with_description("Frames seen")
///     .with_unit(Unit::Count)
///     .with_labels(&["port"]);
///
/// assert_eq!(FRAMES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "prolaser.frames.decoded").
    pub name: &'static str,
    /// The kind of metric.
    pub kind: MetricKind,
    /// Human-readable description.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a counter metric.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Creates a gauge metric.
    pub const fn gauge(name: &'static str) -> Self {
        Self::new(name, MetricKind::Gauge)
    }

    /// Creates a histogram metric.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Sets the description.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the installed recorder.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => describe_counter!(self.name, unit, self.description),
            (MetricKind::Counter, None) => describe_counter!(self.name, self.description),
            (MetricKind::Gauge, Some(unit)) => describe_gauge!(self.name, unit, self.description),
            (MetricKind::Gauge, None) => describe_gauge!(self.name, self.description),
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description)
            }
            (MetricKind::Histogram, None) => describe_histogram!(self.name, self.description),
        }
    }
}

/// All metric definitions for the serial link.
pub mod metric_defs {
    use super::{Metric, Unit};

    /// Labels present on every port-scoped metric.
    pub const PORT_LABELS: &[&str] = &["port"];

    // ========================================================================
    // Framing
    // ========================================================================

    /// Frames that decoded and dispatched.
    ///
    /// Labels: port, direction, command
    pub const FRAMES_DECODED: Metric = Metric::counter("prolaser.frames.decoded")
        .with_description("Frames that passed checksum validation and were dispatched")
        .with_unit(Unit::Count)
        .with_labels(&["port", "direction", "command"]);

    /// Frames rejected by the decoder or dispatcher.
    ///
    /// Labels: port, direction, reason
    pub const FRAMES_REJECTED: Metric = Metric::counter("prolaser.frames.rejected")
        .with_description("Frames discarded as malformed")
        .with_unit(Unit::Count)
        .with_labels(&["port", "direction", "reason"]);

    /// Raw frame size on the wire, escapes included.
    pub const FRAME_SIZE: Metric = Metric::histogram("prolaser.frames.size_bytes")
        .with_description("Raw frame size in bytes")
        .with_unit(Unit::Bytes)
        .with_labels(&["port", "direction"]);

    // ========================================================================
    // Reader
    // ========================================================================

    /// Read cycles that ended with no complete frame.
    pub const READER_TIMEOUTS: Metric = Metric::counter("prolaser.reader.timeouts")
        .with_description("Read cycles that exhausted their timeout budget")
        .with_unit(Unit::Count)
        .with_labels(PORT_LABELS);

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Mirrored register changes.
    pub const REGISTERS_UPDATED: Metric = Metric::counter("prolaser.registers.updated")
        .with_description("Configuration register values changed by observed traffic")
        .with_unit(Unit::Count)
        .with_labels(PORT_LABELS);

    /// Frames carrying a command code outside the known set.
    pub const COMMANDS_UNKNOWN: Metric = Metric::counter("prolaser.commands.unknown")
        .with_description("Frames with an unrecognized command code")
        .with_unit(Unit::Count)
        .with_labels(&["port", "direction"]);

    /// Whether the laser is believed to be firing (0 or 1).
    pub const LASER_ACTIVE: Metric = Metric::gauge("prolaser.laser.active")
        .with_description("Laser firing state as mirrored from traffic")
        .with_labels(PORT_LABELS);

    /// All metrics, for bulk description.
    pub const ALL: &[&Metric] = &[
        &FRAMES_DECODED,
        &FRAMES_REJECTED,
        &FRAME_SIZE,
        &READER_TIMEOUTS,
        &REGISTERS_UPDATED,
        &COMMANDS_UNKNOWN,
        &LASER_ACTIVE,
    ];
}

/// Label set for one serial port.
#[derive(Debug, Clone)]
pub struct MetricLabels {
    /// Port path or name.
    pub port: String,
    /// Traffic direction (`tx` / `rx`), when the metric is directional.
    pub direction: Option<&'static str>,
}

impl MetricLabels {
    /// Labels for `port`.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            direction: None,
        }
    }

    /// Add a direction label.
    pub fn with_direction(mut self, direction: &'static str) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Labels without the direction.
    pub fn port_only(&self) -> Vec<(&'static str, String)> {
        vec![("port", self.port.clone())]
    }

    /// Convert to label pairs for the `metrics` macros.
    pub fn to_labels(&self) -> Vec<(&'static str, String)> {
        let mut labels = self.port_only();
        if let Some(direction) = self.direction {
            labels.push(("direction", direction.to_string()));
        }
        labels
    }

    /// Labels plus extra pairs.
    pub fn with(&self, extra: &[(&'static str, String)]) -> Vec<(&'static str, String)> {
        let mut labels = self.to_labels();
        labels.extend_from_slice(extra);
        labels
    }
}

/// Describe every metric with the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

/// Install a Prometheus exporter serving `/metrics` on `addr`.
#[cfg(feature = "prometheus")]
pub fn install_prometheus(
    addr: std::net::SocketAddr,
) -> Result<(), metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    describe_metrics();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_port_only() {
        let labels = MetricLabels::new("/dev/ttyUSB0");
        assert_eq!(labels.to_labels(), vec![("port", "/dev/ttyUSB0".to_string())]);
    }

    #[test]
    fn test_labels_with_direction_and_extra() {
        let labels = MetricLabels::new("COM3").with_direction("rx");
        let extended = labels.with(&[("command", "reading".to_string())]);
        assert_eq!(extended.len(), 3);
        assert!(extended.contains(&("direction", "rx".to_string())));
        assert!(extended.contains(&("command", "reading".to_string())));
        assert_eq!(labels.port_only().len(), 1);
    }

    #[test]
    fn test_metric_definitions() {
        assert_eq!(metric_defs::FRAMES_DECODED.name, "prolaser.frames.decoded");
        assert_eq!(metric_defs::FRAMES_DECODED.labels, &["port", "direction", "command"]);
        assert_eq!(metric_defs::FRAME_SIZE.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::FRAME_SIZE.unit, Some(Unit::Bytes));
        assert_eq!(metric_defs::LASER_ACTIVE.kind, MetricKind::Gauge);
        assert_eq!(metric_defs::READER_TIMEOUTS.labels, &["port"]);
    }

    #[test]
    fn test_all_metric_names_unique() {
        let mut names: Vec<_> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
        assert!(names.iter().all(|n| n.starts_with("prolaser.")));
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
    }

    #[test]
    fn test_metric_kind_display() {
        assert_eq!(MetricKind::Counter.to_string(), "counter");
        assert_eq!(MetricKind::Histogram.as_str(), "histogram");
    }
}
