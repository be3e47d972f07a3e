use crate::{ByteRing, Ring};
use std::{sync::Arc, thread, vec::Vec};

/// Deterministic xorshift stream, so every thread can derive its schedule
/// without sharing state.
fn xorshift(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

#[test]
fn spsc_byte_stream_arrives_intact() {
    spsc_byte_stream(50_000);
}

#[test]
#[ignore]
fn spsc_byte_stream_long_haul() {
    spsc_byte_stream(1_000_000);
}

/// One producer writes a counting byte sequence in random 1..=17 byte runs;
/// one consumer drains it in independently random runs. The concatenated
/// stream must come out exactly as it went in.
fn spsc_byte_stream(chunks: usize) {
    let ring = Arc::new(ByteRing::new(64));

    let mut rng = 0x9e37_79b9u32;
    let lens: Vec<usize> = (0..chunks).map(|_| (xorshift(&mut rng) % 17 + 1) as usize).collect();
    let total: usize = lens.iter().sum();

    let writer = thread::spawn({
        let ring = Arc::clone(&ring);
        move || {
            let mut value = 0u8;
            for len in lens {
                let mut chunk = [0u8; 17];
                for b in &mut chunk[..len] {
                    *b = value;
                    value = value.wrapping_add(1);
                }
                ring.write(&chunk[..len]);
            }
        }
    });

    let reader = thread::spawn({
        let ring = Arc::clone(&ring);
        move || {
            let mut rng = 0x2545_f491u32;
            let mut expected = 0u8;
            let mut remaining = total;
            while remaining > 0 {
                let len = ((xorshift(&mut rng) % 17 + 1) as usize).min(remaining);
                let mut chunk = [0u8; 17];
                ring.read(&mut chunk[..len]);
                for &b in &chunk[..len] {
                    assert_eq!(b, expected);
                    expected = expected.wrapping_add(1);
                }
                remaining -= len;
            }
        }
    });

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn mpmc_records_are_neither_lost_nor_duplicated() {
    mpmc_records(2, 2, 100_000);
}

#[test]
#[ignore]
fn mpmc_records_long_haul() {
    mpmc_records(2, 2, 1_000_000);
}

fn mpmc_records(producers: u32, consumers: u32, per_producer: u32) {
    let ring = Arc::new(Ring::<u32>::new(64));

    let senders: Vec<_> = (0..producers)
        .map(|p| {
            thread::spawn({
                let ring = Arc::clone(&ring);
                move || {
                    for i in 0..per_producer {
                        ring.push(p * per_producer + i);
                    }
                }
            })
        })
        .collect();

    // Each consumer pops a fixed share, so the test terminates regardless of
    // how the scheduler interleaves them.
    let share = producers * per_producer / consumers;
    let receivers: Vec<_> = (0..consumers)
        .map(|_| {
            thread::spawn({
                let ring = Arc::clone(&ring);
                move || {
                    let mut got = Vec::new();
                    for _ in 0..share {
                        got.push(ring.pop());
                    }
                    got
                }
            })
        })
        .collect();

    for s in senders {
        s.join().unwrap();
    }

    let mut got: Vec<u32> = receivers.into_iter().flat_map(|r| r.join().unwrap()).collect();
    got.sort_unstable();
    let expected: Vec<u32> = (0..producers * per_producer).collect();
    assert_eq!(got, expected);
}

/// Several writers race whole 4-byte frames through the byte surface; frames
/// commit atomically, so two readers pulling fixed-size frames must between
/// them see every frame exactly once.
#[test]
fn mpmc_byte_frames() {
    const WRITERS: u32 = 4;
    const FRAMES: u32 = 25_000;
    let ring = Arc::new(ByteRing::new(32));

    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            thread::spawn({
                let ring = Arc::clone(&ring);
                move || {
                    for i in 0..FRAMES {
                        ring.write(&(w * FRAMES + i).to_le_bytes());
                    }
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            thread::spawn({
                let ring = Arc::clone(&ring);
                move || {
                    let mut got = Vec::new();
                    for _ in 0..WRITERS * FRAMES / 2 {
                        let mut frame = [0u8; 4];
                        ring.read(&mut frame);
                        got.push(u32::from_le_bytes(frame));
                    }
                    got
                }
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    let mut got: Vec<u32> = readers.into_iter().flat_map(|r| r.join().unwrap()).collect();
    got.sort_unstable();
    let expected: Vec<u32> = (0..WRITERS * FRAMES).collect();
    assert_eq!(got, expected);
}
