//! Record a short session, save it, load it back and reverse it a few times.
//!
//! Run with: cargo run -p movelog --example replay
//!
//! Set `RUST_LOG=movelog=debug` to see the log's own events.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::rc::Rc;

use tracing_subscriber::EnvFilter;

use movelog::{
    Direction, MARK_MACRO_CLOSE, MARK_MACRO_OPEN, MARK_SCRAMBLE_BOUNDARY, Move, MoveId, MoveLog,
    SliceMask,
};

fn mv(id: u32, direction: Direction, slices: i32) -> Move {
    Move::new(MoveId::new(id), direction, SliceMask(slices))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut log = MoveLog::new(3);
    log.add_listener(Rc::new(|| eprintln!("  (cursor moved)")));

    println!("scramble:");
    log.append(mv(1, Direction::Ccw, -1));
    log.append(mv(30, Direction::Cw, 2));
    log.append(mv(100, Direction::Ccw, 1));
    log.mark(MARK_SCRAMBLE_BOUNDARY);

    println!("solve, with a macro:");
    log.mark(MARK_MACRO_OPEN);
    log.append(mv(7, Direction::Cw, 1));
    log.append(mv(4, Direction::Ccw, 1));
    log.mark(MARK_MACRO_CLOSE);
    println!(
        "moves since scramble: {} ({} twists)",
        log.count_moves(false),
        log.count_twists()
    );

    println!("\nsaved form:");
    log.write(io::stdout().lock())?;

    let dir = std::env::temp_dir().join("movelog-replay");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("session.log");
    log.write(BufWriter::new(File::create(&path)?))?;

    let mut loaded = MoveLog::new(3);
    loaded.read(BufReader::new(File::open(&path)?))?;
    println!("\nloaded {} entries from {}", loaded.len(), path.display());

    println!("\nundo back to the macro start:");
    while let Some(undone) = loaded.go_towards_mark(MARK_MACRO_OPEN, true) {
        println!("  play {undone}");
    }

    loaded.go_to_end();
    for round in 1..=3 {
        loaded.reverse();
        println!("\nreversed {round}x:");
        loaded.write(io::stdout().lock())?;
    }

    Ok(())
}
