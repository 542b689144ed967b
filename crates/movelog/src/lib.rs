#![forbid(unsafe_code)]

//! Reversible move log with marks, macros and a plain-text save format.
//!
//! A [`MoveLog`] records a linear sequence of reversible [`Move`]s plus
//! zero-width marks, and keeps a cursor between the applied moves and the
//! ones that can be redone. It was built for a twisty-puzzle history but
//! never interprets a move beyond comparing it.
//!
//! # Features
//!
//! - **Undo/redo**: a single cursor over one linear chain, no branches
//! - **Cancellation**: appending the exact inverse of the last move removes
//!   both instead of recording two
//! - **Marks**: single-character bookmarks, with `[`/`]` bracketing macros
//!   and `|` separating a scramble from the solve
//! - **Persistence**: a whitespace-separated text format, see [`codec`]
//! - **Compaction**: pluggable strategies, see [`compress`]
//!
//! # Quick Start
//!
//! ```
//! use movelog::{Direction, Move, MoveId, MoveLog, SliceMask};
//!
//! let mut log = MoveLog::new(3);
//! let twist = Move::new(MoveId::new(4), Direction::Cw, SliceMask::OUTER);
//! log.apply(twist);
//!
//! // Undo hands back the move that reverts the twist.
//! assert_eq!(log.undo(), Some(twist.inverse()));
//! assert_eq!(log.redo(), Some(twist));
//!
//! let mut saved = Vec::new();
//! log.write(&mut saved).unwrap();
//! let mut restored = MoveLog::new(3);
//! restored.read(saved.as_slice()).unwrap();
//! assert_eq!(restored.moves().collect::<Vec<_>>(), vec![twist]);
//! ```
//!
//! # Threading
//!
//! A log is single-threaded (`!Send`, since listeners are `Rc`). Every
//! operation completes synchronously.

mod arena;
pub mod codec;
pub mod compress;
pub mod config;
pub mod error;
pub mod log;
pub mod node;
pub mod notify;

pub use compress::{Compactor, Identity, RotationSweep, RotationTransform};
pub use config::{LineEnding, MoveLogConfig};
pub use error::{ConfigError, ReadError, SanityError};
pub use log::MoveLog;
pub use node::{
    Direction, Entry, MARK_MACRO_CLOSE, MARK_MACRO_OPEN, MARK_SCRAMBLE_BOUNDARY, Move, MoveId,
    SliceMask,
};
pub use notify::{ChangeNotifier, Listener};
