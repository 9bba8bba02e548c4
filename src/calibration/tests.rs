//! Unit tests for calibration storage and the corner routine.
//!
//! A scripted panel replays raw samples; running past the end of the
//! script fails the test instead of spinning forever.

use std::collections::VecDeque;

use super::*;
use crate::config::CALIBRATION_SAMPLES_PER_POINT;
use crate::storage::MemoryBlobStore;

const SCREEN: Size = Size::new(240, 320);

const RECORD_A: CalibrationRecord =
    CalibrationRecord::new([3756, 373, 3718, 3827, 314, 370, 248, 3848]);

/// Corner readings used by `scripted_calibration`, in prompt order.
const CORNERS: [(i32, i32); 4] = [(300, 310), (320, 3790), (3810, 290), (3780, 3800)];

fn record_b() -> CalibrationRecord {
    CalibrationRecord::new([300, 310, 320, 3790, 3810, 290, 3780, 3800])
}

struct ScriptedPanel {
    script: VecDeque<Option<Point>>,
    raw_reads: usize,
    applied: Option<CalibrationRecord>,
}

impl ScriptedPanel {
    fn new() -> Self {
        Self {
            script: VecDeque::new(),
            raw_reads: 0,
            applied: None,
        }
    }

    /// Finger down for `samples` polls at `p`, then lifted.
    fn press(&mut self, p: Point, samples: u32) -> &mut Self {
        for _ in 0..samples {
            self.script.push_back(Some(p));
        }
        self.script.push_back(None);
        self
    }

    fn idle_polls(&mut self, n: usize) -> &mut Self {
        for _ in 0..n {
            self.script.push_back(None);
        }
        self
    }
}

impl crate::touch::TouchSampler for ScriptedPanel {
    fn raw_sample(&mut self) -> Option<Point> {
        self.raw_reads += 1;
        self.script.pop_front().expect("touch script exhausted")
    }

    fn apply_calibration(&mut self, record: &CalibrationRecord) {
        self.applied = Some(*record);
    }

    fn touch_point(&mut self) -> Option<Point> {
        None
    }
}

/// A panel scripted to complete one full calibration run.
fn scripted_calibration() -> ScriptedPanel {
    let mut panel = ScriptedPanel::new();
    for (x, y) in CORNERS {
        panel
            .idle_polls(2)
            .press(Point::new(x, y), CALIBRATION_SAMPLES_PER_POINT + 3);
    }
    panel
}

fn store_with(blob: Option<&[u8]>, force: bool) -> CalibrationStore<MemoryBlobStore<2>> {
    let mut storage = MemoryBlobStore::new();
    if let Some(blob) = blob {
        storage.write(CALIBRATION_FILE, blob).unwrap();
    }
    CalibrationStore::with_force(storage, force).with_screen(SCREEN)
}

// ═══════════════════════════════════════════════════════════════════════════
// Record layout
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn record_bytes_are_little_endian() {
    let record = CalibrationRecord::new([0x1234, 1, 2, 3, 4, 5, 6, 0xABCD]);
    let bytes = record.to_bytes();
    assert_eq!(bytes.len(), RECORD_SIZE);
    assert_eq!(&bytes[..2], &[0x34, 0x12]);
    assert_eq!(&bytes[14..], &[0xCD, 0xAB]);
    assert_eq!(CalibrationRecord::from_bytes(&bytes), Some(record));
}

#[test]
fn record_rejects_wrong_length() {
    assert_eq!(CalibrationRecord::from_bytes(&[]), None);
    assert_eq!(CalibrationRecord::from_bytes(&[0u8; RECORD_SIZE - 1]), None);
    assert_eq!(CalibrationRecord::from_bytes(&[0u8; RECORD_SIZE + 1]), None);
}

#[test]
fn record_corner_lookup() {
    assert_eq!(RECORD_A.corner(Corner::TopLeft), Point::new(3756, 373));
    assert_eq!(RECORD_A.corner(Corner::BottomLeft), Point::new(3718, 3827));
    assert_eq!(RECORD_A.corner(Corner::TopRight), Point::new(314, 370));
    assert_eq!(RECORD_A.corner(Corner::BottomRight), Point::new(248, 3848));
}

// ═══════════════════════════════════════════════════════════════════════════
// Corner routine
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn routine_prompts_corners_in_order() {
    let mut panel = scripted_calibration();
    let mut prompts = Vec::new();
    let record = acquire(&mut panel, SCREEN, |t| prompts.push(t));

    assert_eq!(record, record_b());
    let corners: Vec<Corner> = prompts.iter().map(|t| t.corner).collect();
    assert_eq!(corners, Corner::ORDER.to_vec());
    assert_eq!(prompts[0].point, Point::new(0, 0));
    assert_eq!(prompts[1].point, Point::new(0, 319));
    assert_eq!(prompts[2].point, Point::new(239, 0));
    assert_eq!(prompts[3].point, Point::new(239, 319));
    assert!(panel.script.is_empty());
}

#[test]
fn routine_averages_samples_while_pressed() {
    let mut routine = CalibrationRoutine::new(SCREEN);
    let mut step = RoutineStep::Waiting;
    for i in 0..CALIBRATION_SAMPLES_PER_POINT as i32 {
        // Alternating 100 / 110 averages to 105.
        let v = if i % 2 == 0 { 100 } else { 110 };
        step = routine.feed(Some(Point::new(v, 2 * v)));
    }
    assert_eq!(step, RoutineStep::Waiting);

    // Samples after the quota are ignored until release.
    assert_eq!(routine.feed(Some(Point::new(4000, 4000))), RoutineStep::Waiting);
    match routine.feed(None) {
        RoutineStep::Prompt(t) => assert_eq!(t.corner, Corner::BottomLeft),
        other => panic!("unexpected step {:?}", other),
    }

    for _ in 0..3 {
        routine.feed(Some(Point::new(1, 1)));
        routine.feed(None);
    }
    let RoutineStep::Complete(record) = routine.feed(None) else {
        panic!("routine should be complete");
    };
    assert_eq!(record.corner(Corner::TopLeft), Point::new(105, 210));
    assert_eq!(record.corner(Corner::BottomRight), Point::new(1, 1));
}

#[test]
fn routine_early_release_uses_collected_samples() {
    let mut routine = CalibrationRoutine::new(SCREEN);
    routine.feed(Some(Point::new(200, 400)));
    routine.feed(Some(Point::new(300, 600)));
    assert!(matches!(routine.feed(None), RoutineStep::Prompt(_)));
    assert_eq!(
        routine.target().map(|t| t.corner),
        Some(Corner::BottomLeft)
    );

    for _ in 0..3 {
        routine.feed(Some(Point::new(7, 7)));
        routine.feed(None);
    }
    assert!(routine.is_complete());
    assert_eq!(routine.target(), None);
    let RoutineStep::Complete(record) = routine.feed(None) else {
        panic!("routine should be complete");
    };
    assert_eq!(record.corner(Corner::TopLeft), Point::new(250, 500));
}

#[test]
fn routine_waits_when_untouched() {
    let mut routine = CalibrationRoutine::new(SCREEN);
    for _ in 0..100 {
        assert_eq!(routine.feed(None), RoutineStep::Waiting);
    }
    assert_eq!(routine.target().map(|t| t.corner), Some(Corner::TopLeft));
}

#[test]
fn routine_clamps_out_of_range_samples() {
    let mut routine = CalibrationRoutine::new(SCREEN);
    routine.feed(Some(Point::new(-50, 70_000)));
    routine.feed(None);
    for _ in 0..3 {
        routine.feed(Some(Point::new(1, 1)));
        routine.feed(None);
    }
    let RoutineStep::Complete(record) = routine.feed(None) else {
        panic!("routine should be complete");
    };
    assert_eq!(record.coefficients[0], 0);
    assert_eq!(record.coefficients[1], u16::MAX);
}

// ═══════════════════════════════════════════════════════════════════════════
// ensure_calibration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn stored_record_skips_acquisition() {
    let mut store = store_with(Some(&RECORD_A.to_bytes()), false);
    let mut panel = ScriptedPanel::new();

    let cal = store.ensure_calibration(&mut panel, |_| panic!("no prompt expected"));

    assert_eq!(cal.record, RECORD_A);
    assert_eq!(cal.source, CalibrationSource::Stored);
    assert_eq!(panel.raw_reads, 0);
    assert_eq!(panel.applied, Some(RECORD_A));
    assert_eq!(store.storage().remove_count(), 0);
    assert_eq!(store.storage().write_count(), 1);
    assert_eq!(store.storage().blob_len(CALIBRATION_FILE), Some(RECORD_SIZE));
}

#[test]
fn missing_record_acquires_once_and_persists() {
    let mut store = store_with(None, false);
    let mut panel = scripted_calibration();
    let mut prompts = 0;

    let cal = store.ensure_calibration(&mut panel, |_| prompts += 1);

    assert_eq!(cal.record, record_b());
    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
    assert_eq!(prompts, 4);
    assert!(panel.script.is_empty());
    assert_eq!(panel.applied, Some(record_b()));
    assert_eq!(store.storage().write_count(), 1);
    assert_eq!(store.storage().blob_len(CALIBRATION_FILE), Some(RECORD_SIZE));
    assert_eq!(store.load(), Some(record_b()));
}

#[test]
fn truncated_record_is_treated_as_absent() {
    let bytes = RECORD_A.to_bytes();
    let mut store = store_with(Some(&bytes[..10]), false);
    let mut panel = scripted_calibration();

    let cal = store.ensure_calibration(&mut panel, |_| {});

    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
    assert_eq!(store.storage().blob_len(CALIBRATION_FILE), Some(RECORD_SIZE));
    assert_eq!(store.load(), Some(record_b()));
}

#[test]
fn oversized_record_is_treated_as_absent() {
    let mut blob = [0u8; RECORD_SIZE + 1];
    blob[..RECORD_SIZE].copy_from_slice(&RECORD_A.to_bytes());
    let mut store = store_with(Some(&blob), false);
    assert_eq!(store.load(), None);

    let mut panel = scripted_calibration();
    let cal = store.ensure_calibration(&mut panel, |_| {});
    assert_eq!(cal.record, record_b());
    assert_eq!(store.storage().blob_len(CALIBRATION_FILE), Some(RECORD_SIZE));
}

#[test]
fn read_fault_falls_back_to_acquisition() {
    let mut store = store_with(Some(&RECORD_A.to_bytes()), false);
    store.storage_mut().set_fail_reads(true);
    let mut panel = scripted_calibration();

    let cal = store.ensure_calibration(&mut panel, |_| {});

    assert_eq!(cal.record, record_b());
    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
}

#[test]
fn write_fault_keeps_calibration_in_memory() {
    let mut store = store_with(None, false);
    store.storage_mut().set_fail_writes(true);
    let mut panel = scripted_calibration();

    let cal = store.ensure_calibration(&mut panel, |_| {});

    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: false });
    assert_eq!(panel.applied, Some(record_b()));
    assert!(!store.storage_mut().exists(CALIBRATION_FILE));
}

#[test]
fn forced_recalibration_replaces_stored_record() {
    let mut store = store_with(Some(&RECORD_A.to_bytes()), true);
    let mut panel = scripted_calibration();

    assert!(store.is_forced());
    let cal = store.ensure_calibration(&mut panel, |_| {});

    assert_eq!(cal.record, record_b());
    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
    assert_eq!(store.storage().remove_count(), 1);
    assert_eq!(store.load(), Some(record_b()));
}

#[test]
fn forced_recalibration_without_stored_record() {
    let mut store = store_with(None, true);
    let mut panel = scripted_calibration();

    let cal = store.ensure_calibration(&mut panel, |_| {});

    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
    assert_eq!(store.storage().remove_count(), 0);
}

#[test]
fn forced_recalibration_survives_failed_removal() {
    let mut store = store_with(Some(&RECORD_A.to_bytes()), true);
    store.storage_mut().set_fail_removes(true);
    let mut panel = scripted_calibration();
    let mut prompts = 0;

    let cal = store.ensure_calibration(&mut panel, |_| prompts += 1);

    assert_eq!(prompts, 4);
    assert!(panel.script.is_empty());
    assert_eq!(cal.record, record_b());
    assert_eq!(cal.source, CalibrationSource::Acquired { persisted: true });
    assert_eq!(panel.applied, Some(record_b()));
    assert_eq!(store.storage().remove_count(), 0);
    assert_eq!(store.storage().blob_len(CALIBRATION_FILE), Some(RECORD_SIZE));
    assert_eq!(store.load(), Some(record_b()));
}

#[test]
fn next_session_reuses_persisted_record() {
    let mut store = store_with(None, false);
    let mut panel = scripted_calibration();
    store.ensure_calibration(&mut panel, |_| {});

    let mut next = CalibrationStore::with_force(store.into_inner(), false);
    let mut idle_panel = ScriptedPanel::new();
    let cal = next.ensure_calibration(&mut idle_panel, |_| panic!("no prompt expected"));

    assert_eq!(cal.source, CalibrationSource::Stored);
    assert_eq!(cal.record, record_b());
    assert_eq!(idle_panel.raw_reads, 0);
}
