//! Transports: a real serial port and a scripted in-memory stand-in.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use prolaser_protocol::Transport;
use serialport::SerialPort;

use crate::error::LinkResult;

/// Default line speed of a ProLaser III.
pub const DEFAULT_BAUD_RATE: u32 = 19_200;

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(20);

/// How to open a serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path (`/dev/ttyUSB0`, `COM3`).
    pub path: String,
    /// Line speed.
    pub baud_rate: u32,
    /// Bound on a single read call.
    pub read_timeout: Duration,
}

impl SerialConfig {
    /// Config for `path` with default speed and timeout.
    pub fn new(path: impl Into<String>) -> Self {
        SerialConfig {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Names of serial ports present on this machine.
pub fn list_ports() -> LinkResult<Vec<String>> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect())
}

/// A serial port speaking 8N1 with a bounded read timeout.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open the port described by `config`.
    pub fn open(config: &SerialConfig) -> LinkResult<Self> {
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(config.read_timeout)
            .open()?;
        tracing::debug!(port = %config.path, baud = config.baud_rate, "opened serial port");
        Ok(SerialTransport {
            port,
            name: config.path.clone(),
        })
    }

    /// Port path.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Discard anything buffered in either direction.
    pub fn clear(&mut self) -> LinkResult<()> {
        self.port.clear(serialport::ClearBuffer::All)?;
        Ok(())
    }
}

impl fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialTransport")
            .field("name", &self.name)
            .finish()
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max_bytes.max(1)];
        match self.port.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }
}

type Responder = Box<dyn FnMut(&[u8]) -> Vec<Vec<u8>> + Send>;

/// In-memory transport for tests and offline demos.
///
/// Reads pop scripted chunks; an empty chunk, or an empty script, is a
/// timeout. Writes are captured and may queue replies through a responder.
#[derive(Default)]
pub struct ScriptedTransport {
    reads: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
    read_calls: usize,
    responder: Option<Responder>,
    idle_delay: Option<Duration>,
}

impl ScriptedTransport {
    /// Transport serving `chunks` in order.
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        ScriptedTransport {
            reads: chunks.into(),
            ..Default::default()
        }
    }

    /// Transport that never produces data.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Queue replies for each write. The responder sees the wire bytes.
    pub fn with_responder(
        mut self,
        responder: impl FnMut(&[u8]) -> Vec<Vec<u8>> + Send + 'static,
    ) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Sleep this long on every timed-out read, like a real port would.
    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = Some(delay);
        self
    }

    /// Append a chunk to the read script.
    pub fn push_read(&mut self, chunk: impl Into<Vec<u8>>) {
        self.reads.push_back(chunk.into());
    }

    /// Everything written so far, one entry per write call.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Number of read calls made.
    pub fn read_calls(&self) -> usize {
        self.read_calls
    }

    /// Whether every scripted chunk has been consumed.
    pub fn is_drained(&self) -> bool {
        self.reads.is_empty()
    }
}

impl fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("pending_reads", &self.reads.len())
            .field("written", &self.written.len())
            .field("read_calls", &self.read_calls)
            .finish()
    }
}

impl Transport for ScriptedTransport {
    fn read(&mut self, max_bytes: usize) -> io::Result<Vec<u8>> {
        self.read_calls += 1;
        let chunk = match self.reads.pop_front() {
            Some(mut chunk) if chunk.len() > max_bytes => {
                let rest = chunk.split_off(max_bytes);
                self.reads.push_front(rest);
                chunk
            }
            Some(chunk) => chunk,
            None => Vec::new(),
        };
        if chunk.is_empty() {
            if let Some(delay) = self.idle_delay {
                thread::sleep(delay);
            }
        }
        Ok(chunk)
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.push(bytes.to_vec());
        if let Some(responder) = self.responder.as_mut() {
            self.reads.extend(responder(bytes));
        }
        Ok(())
    }
}
