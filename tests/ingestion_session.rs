mod common;

use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    thread,
};

use common::{ENVELOPE, FrameSpec, single_sensor};
use keti_motes::{
    keti::{
        IngestionSession, Reading, SensorPayload, SequenceCache, SequenceKey, Sht11Calibration,
        Submission, TYPE_CO2,
    },
    tinyos::{HdlcDecoder, encode_frame},
};
use proptest::prelude::*;

#[test]
fn test_same_frame_twice_then_next_sequence() {
    let mut session = IngestionSession::new(Vec::new());
    let frame = FrameSpec::default().build();

    session.submit(&frame);
    session.submit(&frame);
    assert_eq!(session.sink().len(), 1);

    let next = FrameSpec {
        sequence: 2,
        ..FrameSpec::default()
    }
    .build();
    session.submit(&next);

    let readings = session.into_sink();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].sequence, 1);
    assert_eq!(readings[1].sequence, 2);
}

#[test]
fn test_retransmission_with_different_payload_is_dropped() {
    let mut session = IngestionSession::new(Vec::new());
    let first = FrameSpec {
        type_tag: TYPE_CO2,
        sensor: single_sensor(400),
        ..FrameSpec::default()
    };
    let second = FrameSpec {
        sensor: single_sensor(900),
        battery: 1,
        ..first
    };

    assert!(matches!(session.submit(&first.build()), Submission::Forwarded(_)));
    assert_eq!(
        session.submit(&second.build()),
        Submission::Duplicate(SequenceKey {
            node_id: 1,
            sequence: 1
        })
    );

    let readings = session.into_sink();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].payload, SensorPayload::Co2 { ppm: 400 });
}

#[test]
fn test_dedup_ignores_serial_id() {
    let mut session = IngestionSession::new(Vec::new());
    session.submit(&FrameSpec::default().build());
    session.submit(
        &FrameSpec {
            serial_id: [9; 6],
            ..FrameSpec::default()
        }
        .build(),
    );

    assert_eq!(session.sink().len(), 1);
}

#[test]
fn test_unknown_type_is_forwarded() {
    let mut session = IngestionSession::new(Vec::new());
    session.submit(
        &FrameSpec {
            type_tag: 0x70,
            ..FrameSpec::default()
        }
        .build(),
    );

    let readings: Vec<Reading> = session.into_sink();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].payload, SensorPayload::Unknown { type_tag: 0x70 });
}

#[test]
fn test_evicted_key_is_accepted_again() {
    let mut session = IngestionSession::with_parts(
        Vec::new(),
        SequenceCache::new(NonZeroUsize::new(2)),
        Sht11Calibration::default(),
    );
    let frame = |sequence| {
        FrameSpec {
            sequence,
            ..FrameSpec::default()
        }
        .build()
    };

    session.submit(&frame(1));
    session.submit(&frame(2));
    session.submit(&frame(3));
    session.submit(&frame(1));

    let sequences: Vec<u16> = session.sink().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3, 1]);
}

#[test]
fn test_serial_stream_to_sink() {
    let mut wire = Vec::new();
    for sequence in [1, 2, 2, 3] {
        let frame = FrameSpec {
            sequence,
            ..FrameSpec::default()
        }
        .build_with_envelope(&ENVELOPE);
        wire.extend(encode_frame(&frame));
    }
    // a short unrelated packet on the same link
    wire.extend(encode_frame(&[0x45, 0x00, 0x01]));

    let mut decoder = HdlcDecoder::new();
    let mut session = IngestionSession::new(Vec::new());
    for chunk in wire.chunks(7) {
        for frame in decoder.push(chunk) {
            session.submit(&frame);
        }
    }

    assert_eq!(decoder.stats().frames, 5);
    let stats = session.stats();
    assert_eq!(stats.forwarded, 3);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.rejected, 1);
}

#[test]
fn test_shared_session_across_sources() {
    let session = Arc::new(Mutex::new(IngestionSession::new(Vec::new())));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for sequence in 0..50 {
                    let frame = FrameSpec {
                        sequence,
                        ..FrameSpec::default()
                    }
                    .build();
                    session.lock().unwrap().submit(&frame);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let session = session.lock().unwrap();
    assert_eq!(session.sink().len(), 50);
    assert_eq!(session.stats().duplicates, 150);
}

proptest! {
    #[test]
    fn prop_wrong_length_never_reaches_sink(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        prop_assume!(bytes.len() != 29);
        let mut session = IngestionSession::new(Vec::new());

        prop_assert!(matches!(session.submit(&bytes), Submission::Rejected(_)));
        prop_assert!(session.cache().is_empty());
        prop_assert!(session.sink().is_empty());
    }

    #[test]
    fn prop_one_reading_per_key(keys in prop::collection::vec((0u16..4, 0u16..8), 0..100)) {
        let mut session = IngestionSession::with_parts(
            Vec::new(),
            SequenceCache::unbounded(),
            Sht11Calibration::default(),
        );
        for &(node_id, sequence) in &keys {
            session.submit(&FrameSpec { node_id, sequence, ..FrameSpec::default() }.build());
        }

        let mut distinct = keys.clone();
        distinct.sort_unstable();
        distinct.dedup();

        let readings = session.into_sink();
        prop_assert_eq!(readings.len(), distinct.len());

        let mut seen: Vec<(u16, u16)> = readings.iter().map(|r| (r.node_id, r.sequence)).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, distinct);
    }
}
