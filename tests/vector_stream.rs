//! End-to-end tests for the Vector receive path.
//!
//! Drives the full driver — framing, checksum, classification, decode,
//! readiness — through the mock transport, the same way the acquisition
//! loop would on hardware.

use adv_daq::frame::{seal, START_MARKER, VSD_MARKER, VVD_MARKER};
use adv_daq::mock::MockTransport;
use adv_daq::vector::VectorDriver;
use adv_daq::{SystemRecord, VelocityRecord};

/// The worked 24-byte velocity packet: count 5, pressure 65636,
/// velocity x 50, amplitude [10, 20, 30], correlation [90, 91, 92].
fn reference_velocity_packet() -> Vec<u8> {
    let body = vec![
        START_MARKER,
        VVD_MARKER,
        0,
        5,
        1,
        0,
        100,
        0,
        0,
        0,
        50,
        0,
        0,
        0,
        0,
        0,
        10,
        20,
        30,
        90,
        91,
        92,
    ];
    seal(body)
}

fn velocity_packet_with_x(velocity_x: i16) -> Vec<u8> {
    let mut body = vec![0u8; VelocityRecord::WIRE_LEN - 2];
    body[0] = START_MARKER;
    body[1] = VVD_MARKER;
    let [lo, hi] = velocity_x.to_le_bytes();
    body[10] = lo;
    body[11] = hi;
    seal(body)
}

fn system_packet() -> Vec<u8> {
    let mut body = vec![0u8; SystemRecord::WIRE_LEN - 2];
    body[0] = START_MARKER;
    body[1] = VSD_MARKER;
    body[4] = 0x59; // minute 59
    body[5] = 0x00; // second 0
    body[6] = 0x23; // day 23
    body[7] = 0x9F; // hour: invalid BCD nibble, decodes out of range
    body[10] = 0x7B; // battery 123
    body[22] = 0x04; // error byte
    body[23] = 0x30; // status byte
    seal(body)
}

#[tokio::test]
async fn well_formed_velocity_packet_decodes_once() {
    let transport = MockTransport::with_bytes(&reference_velocity_packet());
    let mut adv = VectorDriver::new(transport);
    adv.poll().await.unwrap();

    assert!(adv.velocity_ready());
    let record = adv.take_velocity().unwrap();
    assert_eq!(record.count, 5);
    assert_eq!(record.pressure, 65_636);
    assert_eq!(record.velocity_x, 50);
    assert_eq!(record.amplitude, [10, 20, 30]);
    assert_eq!(record.correlation, [90, 91, 92]);

    // No new bytes: a second drain is a defined no-op.
    assert!(adv.take_velocity().is_none());
    adv.poll().await.unwrap();
    assert!(!adv.velocity_ready());
}

#[tokio::test]
async fn resynchronizes_after_arbitrary_noise() {
    // Noise includes a false start marker followed by a bogus kind marker,
    // and a second lone start marker that aborts the same way.
    let mut stream = vec![0x13, 0xFF, START_MARKER, 0x99, 0x00, START_MARKER, 0x77];
    stream.extend(reference_velocity_packet());

    let mut adv = VectorDriver::new(MockTransport::with_bytes(&stream));
    adv.poll().await.unwrap();

    let record = adv.take_velocity().unwrap();
    assert_eq!(record.velocity_x, 50);
    assert_eq!(adv.stats().frames_aborted, 2);
}

#[tokio::test]
async fn backpressure_drops_frames_while_a_packet_is_pending() {
    let first = velocity_packet_with_x(50);
    let second = velocity_packet_with_x(-75);

    let mut adv = VectorDriver::new(MockTransport::new());
    adv.transport_mut().feed(&first);
    adv.poll().await.unwrap();

    // The second packet arrives before the first is drained: its bytes are
    // read off the link but never assembled.
    adv.transport_mut().feed(&second);
    adv.poll().await.unwrap();
    assert_eq!(adv.transport_mut().unread(), 0);
    assert_eq!(adv.stats().bytes_dropped as usize, second.len());

    let record = adv.take_velocity().unwrap();
    assert_eq!(record.velocity_x, 50);

    // After the drain, capture resumes with fresh bytes.
    adv.transport_mut().feed(&second);
    adv.poll().await.unwrap();
    assert_eq!(adv.take_velocity().unwrap().velocity_x, -75);
}

#[tokio::test]
async fn partial_packet_survives_across_polls() {
    let packet = reference_velocity_packet();
    let (head, tail) = packet.split_at(9);

    let mut adv = VectorDriver::new(MockTransport::new());
    adv.transport_mut().feed(head);
    adv.poll().await.unwrap();
    assert!(!adv.velocity_ready());

    // An empty poll in between must not disturb the capture.
    adv.poll().await.unwrap();

    adv.transport_mut().feed(tail);
    adv.poll().await.unwrap();
    assert_eq!(adv.take_velocity().unwrap().velocity_x, 50);
}

#[tokio::test]
async fn corrupted_packet_is_lost_but_reception_continues() {
    let mut corrupted = reference_velocity_packet();
    corrupted[16] ^= 0x80;

    let mut stream = corrupted;
    stream.extend(velocity_packet_with_x(12));

    let mut adv = VectorDriver::new(MockTransport::with_bytes(&stream));
    adv.poll().await.unwrap();

    assert_eq!(adv.stats().checksum_failures, 1);
    assert_eq!(adv.take_velocity().unwrap().velocity_x, 12);
}

#[tokio::test]
async fn system_packet_decodes_with_bcd_clock() {
    let mut adv = VectorDriver::new(MockTransport::with_bytes(&system_packet()));
    adv.poll().await.unwrap();

    assert!(adv.system_ready());
    assert!(!adv.velocity_ready());

    let record = adv.take_system().unwrap();
    assert_eq!(record.minute, 59);
    assert_eq!(record.second, 0);
    assert_eq!(record.day, 23);
    // Invalid BCD nibble propagates as an out-of-range value, not a crash.
    assert_eq!(record.hour, 105);
    assert_eq!(record.battery, 123);
    assert!((record.battery_volts() - 12.3).abs() < 1e-9);
    assert_eq!(record.error, 0x04);
    assert_eq!(record.status, 0x30);

    assert!(adv.take_system().is_none());
}

#[tokio::test]
async fn interleaved_kinds_drain_independently() {
    let mut adv = VectorDriver::new(MockTransport::new());

    adv.transport_mut().feed(&velocity_packet_with_x(3));
    adv.poll().await.unwrap();
    assert_eq!(adv.take_velocity().unwrap().velocity_x, 3);

    adv.transport_mut().feed(&system_packet());
    adv.poll().await.unwrap();
    assert!(adv.system_ready());
    // Draining the wrong kind must not consume the pending packet.
    assert!(adv.take_velocity().is_none());
    assert_eq!(adv.take_system().unwrap().minute, 59);
}

#[tokio::test]
async fn bring_up_then_first_packet() {
    let mut adv = VectorDriver::new(MockTransport::new());
    adv.begin().await.unwrap();
    assert_eq!(adv.transport_mut().written(), b"@@@@@@K1W%!QSR");

    adv.transport_mut().feed(&reference_velocity_packet());
    adv.poll().await.unwrap();
    assert!(adv.velocity_ready());
}
