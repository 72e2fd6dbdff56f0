//! Subcommand implementations.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use prolaser_link::{
    list_ports, Driver, EventRecord, Monitor, SerialTransport, Session, SharedState, Tap,
    TapConfig, TapEvent,
};
use prolaser_protocol::hexdump::{hexdump, to_hex_string};
use prolaser_protocol::{
    encode, ConfigStore, DeviceState, Direction, Dispatcher, Frame, REGISTER_MAP,
};
use tracing::{info, warn};

use crate::cli::{Cli, Commands, ConfigAction};
use crate::config::AppConfig;
use crate::error::RunnerError;
use crate::image::RegisterImage;

/// Run the parsed command line.
pub fn run(cli: &Cli) -> Result<(), RunnerError> {
    let config = cli.effective_config()?;

    #[cfg(feature = "prometheus")]
    if let Some(addr) = cli.metrics_addr {
        prolaser_metrics::install_prometheus(addr)
            .map_err(|e| RunnerError::Metrics(e.to_string()))?;
        info!(%addr, "serving metrics");
    }

    match &cli.command {
        Commands::Listen { seconds, mode } => {
            let mut session = open_session(&config)?;
            if let Some(mode) = mode {
                let mut driver = Driver::new(session);
                driver.set_mode(*mode)?;
                session = driver.into_session();
            }
            let cancel = cancel_on_ctrlc()?;
            let deadline = Instant::now() + Duration::from_secs(*seconds);
            session.listen_until(deadline, &cancel, |event| {
                println!("{}", EventRecord::now(event));
            })?;
            println!("{}", serde_json::to_string_pretty(&session.state().status())?);
        }
        Commands::Tap { seconds, .. } => tap(&config, *seconds)?,
        Commands::Dump { json, output } => {
            let mut driver = Driver::new(open_session(&config)?);
            driver.enable_remote()?;
            let store = driver.dump_registers()?;
            driver.exit_remote()?;

            let image = RegisterImage::from_store(&store);
            if let Some(path) = output {
                image.save(path)?;
                info!(path = %path.display(), "wrote register image");
            }
            if *json {
                print!("{}", image.to_json()?);
            } else if output.is_none() {
                print!("{}", register_table(&store));
            }
        }
        Commands::Program { image } => {
            let store = RegisterImage::load(image)?.to_store()?;
            let mut driver = Driver::new(open_session(&config)?);
            let report = driver.program(&store)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Mode { mode } => {
            let mut driver = Driver::new(open_session(&config)?);
            println!("mode {}", driver.set_mode(*mode)?);
        }
        Commands::Fire => {
            let mut driver = Driver::new(open_session(&config)?);
            let firing = driver.toggle_laser()?;
            println!("laser {}", if firing { "on" } else { "off" });
        }
        Commands::Encode { bytes } => println!("{}", encode_hex(&bytes.join(" "))?),
        Commands::Decode { bytes, outbound } => {
            let direction = if *outbound {
                Direction::Outbound
            } else {
                Direction::Inbound
            };
            print!("{}", decode_hex(&bytes.join(" "), direction, config.verbosity)?);
        }
        Commands::Ports => {
            for port in list_ports()? {
                println!("{}", port);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => println!("{}", serde_json::to_string_pretty(&config)?),
            ConfigAction::Init { force } => {
                if cli.config.exists() && !force {
                    return Err(RunnerError::AlreadyExists(cli.config.clone()));
                }
                config.save(&cli.config)?;
                info!(path = %cli.config.display(), "wrote config");
            }
        },
    }
    Ok(())
}

fn shared_state(config: &AppConfig) -> SharedState {
    SharedState::new(
        DeviceState::new(ConfigStore::unknown()),
        config.event_log_capacity,
    )
}

fn open_session(config: &AppConfig) -> Result<Session<SerialTransport>, RunnerError> {
    let port = config.port.as_deref().ok_or(RunnerError::MissingPort("port"))?;
    let transport = SerialTransport::open(&config.serial(port))?;
    let monitor = Monitor::new(port, Dispatcher::new(config.verbosity), shared_state(config));
    Ok(Session::new(transport, monitor).with_response_timeouts(config.response_timeouts))
}

/// Flag set by Ctrl-C.
fn cancel_on_ctrlc() -> Result<Arc<AtomicBool>, RunnerError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
    Ok(cancel)
}

fn tap(config: &AppConfig, seconds: Option<u64>) -> Result<(), RunnerError> {
    let host_port = config
        .tap_host_port
        .as_deref()
        .ok_or(RunnerError::MissingPort("tap host port"))?;
    let device_port = config
        .tap_device_port
        .as_deref()
        .ok_or(RunnerError::MissingPort("tap device port"))?;

    let host = SerialTransport::open(&config.serial(host_port))?;
    let device = SerialTransport::open(&config.serial(device_port))?;
    let tap_config = TapConfig {
        host_port: host_port.to_string(),
        device_port: device_port.to_string(),
        dispatcher: Dispatcher::new(config.verbosity),
        ..TapConfig::default()
    };
    let tap = Tap::start(host, device, shared_state(config), &tap_config)?;

    let cancel = cancel_on_ctrlc()?;
    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    while !cancel.load(Ordering::Relaxed) && deadline.map_or(true, |d| Instant::now() < d) {
        match tap.recv_timeout(Duration::from_millis(200))? {
            Some(TapEvent::Frame(dispatched)) => println!("{}", EventRecord::now(&dispatched)),
            Some(TapEvent::Rejected { direction, error }) => {
                warn!(direction = %direction, "dropped frame: {}", error)
            }
            Some(TapEvent::Closed { direction, error }) => {
                warn!(direction = %direction, "line closed: {}", error);
                break;
            }
            None => {}
        }
    }

    let status = tap.state().status();
    tap.stop();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Parse hex bytes separated by spaces or commas, with or without `0x`:
/// `"02 01 06"`, `"0x02,0x01"`, `"020106"`.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, RunnerError> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|t| t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")).unwrap_or(t))
        .collect();
    hex::decode(digits).map_err(|source| RunnerError::InvalidHex {
        input: text.to_string(),
        source,
    })
}

/// Frame hex payload bytes, returning the wire bytes as hex.
pub fn encode_hex(text: &str) -> Result<String, RunnerError> {
    let payload = parse_hex(text)?;
    Ok(to_hex_string(&encode(&payload)?))
}

/// Decode one wire frame given as hex and describe what it does.
pub fn decode_hex(text: &str, direction: Direction, verbosity: u8) -> Result<String, RunnerError> {
    let raw = parse_hex(text)?;
    let frame = Frame::decode(&raw)?;
    let mut state = DeviceState::new(ConfigStore::unknown());
    let dispatched = Dispatcher::new(verbosity).dispatch(&mut state, frame.payload(), direction)?;

    let mut out = String::new();
    let _ = writeln!(out, "length   {}", frame.length());
    let _ = writeln!(out, "checksum 0x{:02x}", frame.checksum());
    let _ = writeln!(out, "payload  {}", to_hex_string(frame.payload()));
    let _ = writeln!(out, "command  {} (0x{:02x})", dispatched.command, frame.command());
    let _ = writeln!(out, "{}       {}", direction, dispatched.outcome);
    Ok(out)
}

/// Raw dump followed by every named register.
pub fn register_table(store: &ConfigStore) -> String {
    let mut out = hexdump(&store.image());
    out.push('\n');
    for info in REGISTER_MAP {
        let value = match info.read(store) {
            Some(v) if info.width == 2 => format!("0x{:04x} ({})", v, v),
            Some(v) => format!("0x{:02x} ({})", v, v),
            None => format!("[{} bytes]", info.width),
        };
        let _ = writeln!(
            out,
            "0x{:02x}  {:<22} {:<14} {}",
            info.address, info.name, value, info.description
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hex() {
        assert_eq!(encode_hex("06").unwrap(), "02 01 06 07 03");
        assert_eq!(encode_hex("0b 03").unwrap(), "02 02 0b 10 03 10 10 03");
        assert!(matches!(encode_hex("zz"), Err(RunnerError::InvalidHex { .. })));
    }

    #[test]
    fn test_parse_hex_formats() {
        assert_eq!(parse_hex("02 01 06").unwrap(), vec![0x02, 0x01, 0x06]);
        assert_eq!(parse_hex("0x02,0x0b").unwrap(), vec![0x02, 0x0b]);
        assert_eq!(parse_hex("020106").unwrap(), vec![0x02, 0x01, 0x06]);
    }

    #[test]
    fn test_parse_hex_rejects_bad_input() {
        assert!(matches!(
            parse_hex("\u{e9}00"),
            Err(RunnerError::InvalidHex { .. })
        ));
        assert!(matches!(
            parse_hex("0x020"),
            Err(RunnerError::InvalidHex {
                source: hex::FromHexError::OddLength,
                ..
            })
        ));
        assert!(matches!(
            decode_hex("02 01 06 07 0", Direction::Inbound, 4),
            Err(RunnerError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_decode_hex_describes_frame() {
        let out = decode_hex("02 04 0b 00 01 12 22 03", Direction::Inbound, 4).unwrap();
        assert!(out.contains("checksum 0x22"));
        assert!(out.contains("read_register"));
        assert!(out.contains("register 0x01 = 0x12"));
    }

    #[test]
    fn test_decode_hex_bad_checksum() {
        assert!(matches!(
            decode_hex("02 01 06 00 03", Direction::Inbound, 4),
            Err(RunnerError::Protocol(_))
        ));
    }

    #[test]
    fn test_register_table_names_registers() {
        let table = register_table(&ConfigStore::factory());
        assert!(table.contains("identity"));
        assert!(table.contains("0x12 (18)"));
        assert!(table.contains("checksum"));
    }
}
