//! Performance benchmarks for packet framing

use rcon_protocol::{packet_type, read_packet, Packet, MAX_PAYLOAD_LENGTH};
use std::time::Instant;

/// Benchmarks encoding of typical command packets
#[test]
fn benchmark_encode() {
    let packet = Packet::new(42, packet_type::EXEC_COMMAND, "lp user Steve permission set * true");

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let _ = packet.encode().unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Encode: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks decoding of maximum-size reply bodies
#[test]
fn benchmark_decode_large_body() {
    let payload = "x".repeat(MAX_PAYLOAD_LENGTH);
    let frame = Packet::new(7, packet_type::RESPONSE_VALUE, payload)
        .encode()
        .unwrap();

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let packet = Packet::decode_body(&frame[4..]).unwrap();
        assert_eq!(packet.payload.len(), MAX_PAYLOAD_LENGTH);
    }

    let duration = start.elapsed();
    println!(
        "Decode 4 KiB body: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks reading a long run of back-to-back frames from one stream
#[tokio::test]
async fn benchmark_read_stream() {
    let count = 10_000;
    let mut bytes = Vec::new();
    for id in 1..=count {
        let packet = Packet::new(id, packet_type::RESPONSE_VALUE, "There are 0 of a max of 20 players online: ");
        bytes.extend_from_slice(&packet.encode().unwrap());
    }

    let mut reader = bytes.as_slice();
    let start = Instant::now();

    for id in 1..=count {
        let packet = read_packet(&mut reader).await.unwrap();
        assert_eq!(packet.request_id, id);
    }

    let duration = start.elapsed();
    println!(
        "Read stream: {} frames in {:?} ({:.2} μs/frame)",
        count,
        duration,
        duration.as_micros() as f64 / count as f64
    );

    assert!(reader.is_empty());
    assert!(duration.as_millis() < 2000);
}
