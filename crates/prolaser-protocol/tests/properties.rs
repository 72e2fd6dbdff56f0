//! Codec, reader and dispatcher properties.
//!
//! Each test drives the public API the way a host session does: encode,
//! push bytes through a transport, read a frame, dispatch it.

use std::collections::VecDeque;
use std::io;

use prolaser_protocol::*;

// ============================================================================
// Test Transport
// ============================================================================

/// Serves scripted chunks, then times out forever. Counts every read.
struct Script {
    chunks: VecDeque<Vec<u8>>,
    reads: usize,
}

impl Script {
    fn new(chunks: Vec<Vec<u8>>) -> Self {
        Script {
            chunks: chunks.into(),
            reads: 0,
        }
    }

    fn silent() -> Self {
        Script::new(Vec::new())
    }
}

impl Transport for Script {
    fn read(&mut self, _max_bytes: usize) -> io::Result<Vec<u8>> {
        self.reads += 1;
        Ok(self.chunks.pop_front().unwrap_or_default())
    }

    fn write(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Codec
// ============================================================================

#[test]
fn test_round_trip_every_length_with_markers_at_every_position() {
    for len in 1..=MAX_PAYLOAD_LEN {
        let base: Vec<u8> = (0..len).map(|i| (i * 7 + len) as u8).collect();
        assert_eq!(decode(&encode(&base).unwrap()).unwrap(), base, "len {}", len);

        for special in [START_OF_MESSAGE, END_OF_MESSAGE, MESSAGE_ESCAPE] {
            for pos in 0..len {
                let mut payload = base.clone();
                payload[pos] = special;
                let wire = encode(&payload).unwrap();
                assert_eq!(wire[1] as usize, len);
                assert_eq!(
                    decode(&wire).unwrap(),
                    payload,
                    "len {} byte 0x{:02x} at {}",
                    len,
                    special,
                    pos
                );
            }
        }
    }
}

#[test]
fn test_round_trip_all_escape_bytes() {
    for len in 1..=MAX_PAYLOAD_LEN {
        let payload = vec![MESSAGE_ESCAPE; len];
        assert_eq!(decode(&encode(&payload).unwrap()).unwrap(), payload);
        let payload = vec![END_OF_MESSAGE; len];
        assert_eq!(decode(&encode(&payload).unwrap()).unwrap(), payload);
    }
}

#[test]
fn test_enable_remote_checksum() {
    let wire = encode(&[CMD_ENABLE_REMOTE]).unwrap();
    assert_eq!(wire[3], 0x01 + 0x06);
    assert_eq!(wire, vec![0x02, 0x01, 0x06, 0x07, 0x03]);
}

#[test]
fn test_read_register_at_end_marker_address_is_escaped() {
    let wire = Command::ReadRegister { address: 0x03 }.encode().unwrap();
    assert_eq!(&wire[2..5], &[0x0B, 0x10, 0x03]);
    assert_eq!(decode(&wire).unwrap(), vec![0x0B, 0x03]);
}

#[test]
fn test_double_escape_is_one_literal() {
    // 0x10 0x10 in the body carries one 0x10; the checksum counts it once.
    let raw = [0x02, 0x02, 0x0B, 0x10, 0x10, 0x1D, 0x03];
    assert_eq!(decode(&raw).unwrap(), vec![0x0B, 0x10]);
}

// ============================================================================
// Reader
// ============================================================================

#[test]
fn test_resync_discards_garbage_before_start() {
    let mut transport = Script::new(vec![vec![0xFF, 0xFF, 0x02, 0x02, 0x03]]);
    let mut reader = FrameReader::new();
    let outcome = reader.read_frame(&mut transport, 5, 3).unwrap();

    // The first start marker opens a frame whose length byte is the second
    // 0x02; the garbage before it is gone.
    let raw = outcome.frame().unwrap().to_vec();
    assert_eq!(raw, vec![0x02, 0x02, 0x03]);
    assert_eq!(
        decode(&raw),
        Err(ProtocolError::FrameTooShort {
            expected: 5,
            actual: 3
        })
    );
}

#[test]
fn test_resync_then_valid_frame() {
    let mut stream = vec![0xFF, 0x41, 0x00];
    stream.extend(encode(&[CMD_SET_MODE, MODE_RANGE]).unwrap());
    let mut transport = Script::new(vec![stream]);
    let mut reader = FrameReader::new();
    let raw = reader
        .read_frame(&mut transport, REPLY_LEN_MODE, 3)
        .unwrap()
        .into_result(3)
        .unwrap();
    assert_eq!(decode(&raw).unwrap(), vec![CMD_SET_MODE, MODE_RANGE]);
}

#[test]
fn test_timeout_after_exactly_n_attempts() {
    for n in [0u32, 1, 2, 5, 25] {
        let mut transport = Script::silent();
        let mut reader = FrameReader::new();
        let outcome = reader.read_frame(&mut transport, 16, n).unwrap();
        assert!(outcome.is_empty());
        assert_eq!(transport.reads, n as usize);
    }
}

#[test]
fn test_timeout_budget_not_refilled_by_data() {
    let mut transport = Script::new(vec![vec![], vec![0x02], vec![], vec![0x01]]);
    let mut reader = FrameReader::new();
    let outcome = reader.read_frame(&mut transport, 5, 3).unwrap();
    assert_eq!(
        outcome,
        ReadOutcome::TimedOut {
            partial: vec![0x02, 0x01]
        }
    );
    // Three empty reads plus two with data.
    assert_eq!(transport.reads, 5);
}

// ============================================================================
// Dispatcher and store
// ============================================================================

#[test]
fn test_corrupt_checksum_leaves_store_unmodified() {
    let good = encode(&[CMD_READ_REGISTER, 0x00, REG_IDENTITY, 0x12]).unwrap();
    assert_eq!(good, vec![0x02, 0x04, 0x0B, 0x00, 0x01, 0x12, 0x22, 0x03]);
    let mut bad = good.clone();
    bad[6] += 1;

    let dispatcher = Dispatcher::default();
    let mut state = DeviceState::new(ConfigStore::unknown());
    let before = state.clone();
    let err = dispatcher
        .process_raw(&mut state, &bad, Direction::Inbound)
        .unwrap_err();
    assert_eq!(
        err,
        ProtocolError::ChecksumMismatch {
            calculated: 0x22,
            received: 0x23
        }
    );
    assert_eq!(state, before);

    // The session carries on with the next good frame.
    dispatcher
        .process_raw(&mut state, &good, Direction::Inbound)
        .unwrap();
    assert_eq!(state.store.value(REG_IDENTITY), Some(0x12));
}

#[test]
fn test_register_mirroring_last_write_wins() {
    let dispatcher = Dispatcher::default();
    let mut state = DeviceState::new(ConfigStore::unknown());

    let first = encode(&[CMD_READ_REGISTER, 0x00, REG_IDENTITY, 0x12]).unwrap();
    dispatcher
        .process_raw(&mut state, &first, Direction::Inbound)
        .unwrap();
    assert_eq!(state.store.get(REG_IDENTITY), 0x12);

    let second = encode(&[CMD_READ_REGISTER, 0x00, REG_IDENTITY, 0x34]).unwrap();
    let d = dispatcher
        .process_raw(&mut state, &second, Direction::Inbound)
        .unwrap();
    assert_eq!(state.store.get(REG_IDENTITY), 0x34);
    assert_eq!(
        d.outcome.register_update(),
        Some(&RegisterUpdate {
            address: REG_IDENTITY,
            previous: Some(0x12),
            value: 0x34
        })
    );
}

#[test]
fn test_factory_store_checksum_register() {
    let store = ConfigStore::factory();
    assert_eq!(store.recompute_checksum(), store.get(REG_CHECKSUM));
}

#[test]
fn test_full_exchange_through_reader_and_dispatcher() {
    let dispatcher = Dispatcher::default();
    let mut state = DeviceState::new(ConfigStore::unknown());
    let request = Command::ReadRegister { address: REG_UNITS };

    let sent = request.encode().unwrap();
    let d = dispatcher
        .process_raw(&mut state, &sent, Direction::Outbound)
        .unwrap();
    assert_eq!(d.outcome, Outcome::RegisterRead { address: REG_UNITS });

    let reply = encode(&[CMD_READ_REGISTER, 0x00, REG_UNITS, 0x02]).unwrap();
    let mut transport = Script::new(vec![reply[..4].to_vec(), vec![], reply[4..].to_vec()]);
    let mut reader = FrameReader::new();
    let hint = request.expected_response_len().unwrap();
    let raw = reader
        .read_frame(&mut transport, hint, 5)
        .unwrap()
        .into_result(5)
        .unwrap();
    dispatcher
        .process_raw(&mut state, &raw, Direction::Inbound)
        .unwrap();
    assert_eq!(
        UnitSystem::from_code(state.store.get(REG_UNITS)),
        Some(UnitSystem::Metric)
    );
}
