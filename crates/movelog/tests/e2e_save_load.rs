#![forbid(unsafe_code)]

//! End-to-end tests for saving and loading move logs through real files.
//!
//! Validates:
//! - A recorded session survives a save/load cycle on disk
//! - Line wrapping and line endings from the configuration
//! - Only the applied prefix is saved
//! - Malformed files leave an empty log behind
//! - Macro brackets and scramble boundaries keep their meaning after loading

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::rc::Rc;

use movelog::{
    Direction, Entry, Identity, LineEnding, MARK_MACRO_CLOSE, MARK_MACRO_OPEN,
    MARK_SCRAMBLE_BOUNDARY, Move, MoveId, MoveLog, MoveLogConfig, ReadError, SliceMask,
};

fn mv(id: u32, direction: i32, slices: i32) -> Move {
    let direction = Direction::from_i32(direction).expect("direction must be ±1");
    Move::new(MoveId::new(id), direction, SliceMask(slices))
}

fn save(log: &MoveLog, path: &Path) {
    let file = File::create(path).expect("create log file");
    log.write(BufWriter::new(file)).expect("write log file");
}

fn load(layers: u32, path: &Path) -> Result<MoveLog, ReadError> {
    let file = File::open(path).expect("open log file");
    let mut log = MoveLog::with_config(MoveLogConfig::new(layers).with_line_ending(LineEnding::Lf));
    log.read(BufReader::new(file))?;
    Ok(log)
}

fn lf_log(layers: u32) -> MoveLog {
    MoveLog::with_config(MoveLogConfig::new(layers).with_line_ending(LineEnding::Lf))
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn three_move_session_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.log");

    let mut log = lf_log(3);
    log.append(mv(1, 1, -1));
    log.append(mv(30, -1, 2));
    log.append(mv(100, 1, 1));
    save(&log, &path);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "1,1,-1 30,-1,2 100,1,1.\n");
    assert_eq!(text.lines().count(), 1);

    let loaded = load(3, &path).unwrap();
    assert_eq!(
        loaded.moves().collect::<Vec<_>>(),
        vec![mv(1, 1, -1), mv(30, -1, 2), mv(100, 1, 1)]
    );
    assert!(loaded.at_end());
    assert!(loaded.check_sanity().is_ok());
}

#[test]
fn long_session_wraps_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.log");

    let mut log = lf_log(4);
    log.mark(MARK_SCRAMBLE_BOUNDARY);
    for i in 0..57 {
        log.append(mv(i % 12, if i % 3 == 0 { -1 } else { 1 }, 1 << (i % 4)));
    }
    save(&log, &path);

    let text = fs::read_to_string(&path).unwrap();
    // 58 tokens at ten per line.
    assert_eq!(text.lines().count(), 6);
    assert!(text.lines().take(5).all(|line| line.split(' ').count() == 10));
    assert!(text.ends_with(".\n"));

    let loaded = load(4, &path).unwrap();
    assert_eq!(
        loaded.entries().collect::<Vec<_>>(),
        log.entries().collect::<Vec<_>>()
    );
    assert_eq!(loaded.count_moves(false), 57);
}

#[test]
fn crlf_and_custom_wrapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crlf.log");

    let config = MoveLogConfig::new(3)
        .with_tokens_per_line(2)
        .with_line_ending(LineEnding::CrLf);
    let mut log = MoveLog::with_config(config);
    log.append(mv(1, 1, 1));
    log.append(mv(2, 1, 1));
    log.append(mv(3, 1, 1));
    save(&log, &path);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "1,1,1 2,1,1\r\n3,1,1.\r\n"
    );
    assert_eq!(load(3, &path).unwrap().moves().count(), 3);
}

#[test]
fn pending_moves_are_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.log");

    let mut log = lf_log(3);
    log.append(mv(1, 1, 1));
    log.append(mv(2, 1, 1));
    log.append(mv(3, 1, 1));
    log.undo();
    log.undo();
    save(&log, &path);

    assert_eq!(fs::read_to_string(&path).unwrap(), "1,1,1.\n");
    // Saving leaves the live log untouched.
    assert_eq!(log.len(), 3);
    assert_eq!(log.current(), Some(mv(2, 1, 1)));
}

// ============================================================================
// Marks after loading
// ============================================================================

#[test]
fn macro_brackets_survive_and_block_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("macro.log");

    let mut log = lf_log(3);
    log.mark(MARK_MACRO_OPEN);
    log.append(mv(5, 1, 1));
    log.append(mv(6, -1, 2));
    log.mark(MARK_MACRO_CLOSE);
    log.append(mv(6, 1, 2));
    save(&log, &path);

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "m[ 5,1,1 6,-1,2 m] 6,1,2.\n"
    );

    let mut loaded = load(3, &path).unwrap();
    assert_eq!(loaded.len(), 5);

    // Walk back to the start of the macro, one move per call.
    let mut steps = 0;
    while loaded.go_towards_mark(MARK_MACRO_OPEN, true).is_some() {
        steps += 1;
    }
    assert_eq!(steps, 3);
    assert!(loaded.at_macro_open());
    assert_eq!(loaded.go_towards_mark(MARK_MACRO_OPEN, true), None);
}

#[test]
fn scramble_boundary_counts_after_loading() {
    let mut log = lf_log(3);
    log.append(mv(1, 1, 1));
    log.append(mv(2, 1, 0b111));
    log.mark(MARK_SCRAMBLE_BOUNDARY);
    log.append(mv(3, 1, 1));
    log.append(mv(4, -1, 0b111));
    log.append(mv(5, 1, 2));

    let mut loaded = lf_log(3);
    loaded.read_str(&log.to_text()).unwrap();
    assert_eq!(loaded.count_moves(false), 3);
    assert_eq!(loaded.count_twists(), 2);
}

#[test]
fn cursor_token_restores_position() {
    let mut log = lf_log(3);
    log.read_str("1,1,1 m| 2,1,1 c 3,1,1 4,1,1.\n").unwrap();

    assert_eq!(log.len(), 5);
    assert_eq!(log.current(), Some(mv(3, 1, 1)));
    assert_eq!(log.count_moves(false), 1);
    assert_eq!(log.redo(), Some(mv(3, 1, 1)));
}

#[test]
fn loading_notifies_listeners_once() {
    let mut log = lf_log(3);
    let fired = Rc::new(Cell::new(0u32));
    let f = Rc::clone(&fired);
    log.add_listener(Rc::new(move || f.set(f.get() + 1)));

    log.read_str("1,1,1 2,1,1 3,1,1.\n").unwrap();
    assert_eq!(fired.get(), 1);
}

// ============================================================================
// Failure handling
// ============================================================================

#[test]
fn truncated_file_leaves_empty_log() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.log");
    fs::write(&path, "1,1,1 30,-1,2 100,1").unwrap();

    let mut log = lf_log(3);
    log.append(mv(9, 1, 1));
    let file = BufReader::new(File::open(&path).unwrap());
    let err = log.read(file).unwrap_err();

    assert!(matches!(err, ReadError::UnexpectedEof { .. }));
    assert!(log.is_empty());
    assert!(log.at_end());
    assert!(log.check_sanity().is_ok());
}

#[test]
fn bad_direction_is_rejected() {
    let mut log = lf_log(3);
    let err = log.read_str("1,1,1 2,2,1.\n").unwrap_err();
    assert!(matches!(err, ReadError::InvalidDirection { value: 2, .. }));
    assert!(log.is_empty());
}

#[test]
fn missing_file_contents_are_eof() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.log");
    fs::write(&path, "").unwrap();
    assert!(matches!(
        load(3, &path),
        Err(ReadError::UnexpectedEof { offset: 0 })
    ));
}

// ============================================================================
// Whole session
// ============================================================================

#[test]
fn solve_session_replays_after_compression() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solve.log");

    let mut log = lf_log(3);
    for id in [3, 7, 3, 9] {
        log.append(mv(id, 1, 1));
    }
    log.mark(MARK_SCRAMBLE_BOUNDARY);
    log.mark(MARK_MACRO_OPEN);
    log.append(mv(2, 1, 1));
    log.append(mv(4, 1, 1));
    log.mark(MARK_MACRO_CLOSE);
    log.append(mv(4, -1, 1));
    save(&log, &path);

    let mut loaded = load(3, &path).unwrap();
    assert_eq!(loaded.len(), 10);
    assert_eq!(loaded.count_moves(false), 3);

    // Without the marks the pair around the macro close cancels.
    loaded.compress(&mut Identity, false);
    assert!(loaded.entries().all(|entry| matches!(entry, Entry::Move(_))));
    assert_eq!(
        loaded.moves().collect::<Vec<_>>(),
        vec![mv(3, 1, 1), mv(7, 1, 1), mv(3, 1, 1), mv(9, 1, 1), mv(2, 1, 1)]
    );
}

#[test]
fn cancelling_across_marks_drops_them() {
    let mut log = lf_log(3);
    log.append(mv(9, 1, 1));
    log.mark(MARK_SCRAMBLE_BOUNDARY);
    log.mark(MARK_MACRO_OPEN);
    log.append(mv(9, -1, 1));

    assert!(log.is_empty());
    assert_eq!(log.to_text(), ".\n");
}
