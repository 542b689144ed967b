#![forbid(unsafe_code)]

//! Log compaction.
//!
//! Compaction squeezes filler out of a log before it is handed to a solver:
//! the pending tail is truncated, marks are stripped, and the remaining moves
//! are rewritten by a pluggable [`Compactor`]. Rebuilding the chain goes
//! through the normal append path, so adjacent inverse pairs produced by the
//! compactor cancel.
//!
//! What a move *means* (which face it turns, how a rotation relabels the
//! others) belongs to the puzzle, not the log. Strategies that need it ask a
//! [`RotationTransform`].
//!
//! # Sweep direction
//!
//! Strategies sweep rotations towards the front. Passing
//! `sweep_rotates_forward = true` to [`MoveLog::compress`] reverses the log
//! around the strategy, so rotations end up at the tail instead.

use crate::log::MoveLog;
use crate::node::{Move, MoveId};

/// Rewrites a mark-free move list into an equivalent one.
pub trait Compactor {
    /// Return a move list with the same overall effect as `moves`.
    ///
    /// `layers` is the layer count of the log, for telling rotations from
    /// twists.
    fn compact(&mut self, moves: Vec<Move>, layers: u32) -> Vec<Move>;
}

/// Puzzle geometry needed to move a twist across a whole-puzzle rotation.
pub trait RotationTransform {
    /// The id of the twist that, played after `rotation`, has the same
    /// effect as twist `id` played before it.
    fn transform_through_rotation(&self, id: MoveId, rotation: &Move) -> MoveId;
}

impl<F> RotationTransform for F
where
    F: Fn(MoveId, &Move) -> MoveId,
{
    fn transform_through_rotation(&self, id: MoveId, rotation: &Move) -> MoveId {
        self(id, rotation)
    }
}

/// Leaves the moves as they are. Compressing with it only truncates, strips
/// marks and cancels adjacent inverses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Compactor for Identity {
    fn compact(&mut self, moves: Vec<Move>, _layers: u32) -> Vec<Move> {
        moves
    }
}

/// Moves every rotation ahead of all twists, rewriting each twist a rotation
/// passes over through the [`RotationTransform`].
///
/// Rotations keep their relative order, as do twists.
#[derive(Debug, Clone)]
pub struct RotationSweep<R> {
    transform: R,
}

impl<R: RotationTransform> RotationSweep<R> {
    /// Create a sweep using `transform` for the geometry.
    #[must_use]
    pub fn new(transform: R) -> Self {
        Self { transform }
    }
}

impl<R: RotationTransform> Compactor for RotationSweep<R> {
    fn compact(&mut self, moves: Vec<Move>, layers: u32) -> Vec<Move> {
        // Walk backwards so each twist sees the rotations that follow it,
        // farthest first in `rotations`.
        let mut rotations = Vec::new();
        let mut twists = Vec::new();
        for mv in moves.into_iter().rev() {
            if mv.is_rotation(layers) {
                rotations.push(mv);
                continue;
            }
            let id = rotations.iter().rev().fold(mv.id, |id, rotation| {
                self.transform.transform_through_rotation(id, rotation)
            });
            twists.push(Move { id, ..mv });
        }
        rotations.reverse();
        twists.reverse();
        rotations.extend(twists);
        rotations
    }
}

impl MoveLog {
    /// Compact the log in place with `compactor`.
    ///
    /// Truncates the pending tail, strips every mark, rewrites the moves and
    /// rebuilds the chain through append, so inverse neighbours cancel. With
    /// `sweep_rotates_forward` the log is reversed before and after the
    /// compactor runs. The cursor ends at the end of the log.
    pub fn compress(&mut self, compactor: &mut impl Compactor, sweep_rotates_forward: bool) {
        let before = self.chain.len();
        self.truncate_step();
        self.strip_marks();
        if sweep_rotates_forward {
            self.reverse_step();
        }

        let moves: Vec<Move> = self.moves().collect();
        let layers = self.config.layers;
        self.clear_step(layers);
        for mv in compactor.compact(moves, layers) {
            self.append_step(mv);
        }

        if sweep_rotates_forward {
            self.reverse_step();
        }
        tracing::debug!(
            target: "movelog",
            before,
            after = self.chain.len(),
            sweep_rotates_forward,
            "compress"
        );
        self.mark_cursor_moved();
        self.settle();
    }

    /// Compact a standalone move list for a puzzle with `layers` layers.
    #[must_use]
    pub fn compress_moves(
        moves: impl IntoIterator<Item = Move>,
        layers: u32,
        compactor: &mut impl Compactor,
        sweep_rotates_forward: bool,
    ) -> Vec<Move> {
        let mut log = MoveLog::new(layers);
        for mv in moves {
            log.append_step(mv);
        }
        log.compress(compactor, sweep_rotates_forward);
        log.moves().collect()
    }

    fn strip_marks(&mut self) {
        let marks: Vec<_> = self
            .chain
            .ids_from(self.chain.head())
            .filter(|&id| self.chain.entry(id).is_some_and(|entry| entry.is_mark()))
            .collect();
        for id in marks {
            self.chain.unlink(id);
        }
    }
}
