#![forbid(unsafe_code)]

//! The move log: a linear undo/redo history of moves and marks.
//!
//! [`MoveLog`] keeps an ordered chain of [`Entry`] values and a cursor. The
//! cursor splits the chain into an *applied* prefix and a *pending* suffix
//! that [`redo`](MoveLog::redo) walks back through:
//!
//! ```text
//!   applied                 pending (redo)
//! ┌─────┬─────┬─────┬─────┐┌─────┬─────┐
//! │ A   │ m[  │ B   │ m]  ││ C   │ D   │
//! └─────┴─────┴─────┴─────┘└─────┴─────┘
//!                           ▲
//!                        current
//! ```
//!
//! A `None` cursor means "at the end": everything is applied.
//!
//! # Cancellation
//!
//! Appending the exact inverse of the nearest applied move does not grow
//! the log. The earlier move is undone and everything from it onward is
//! truncated, so the pair vanishes. Cancellation never reaches back across a
//! macro-close mark sitting at the cursor.
//!
//! # Invariants
//!
//! 1. `first` and `last` are either both set or both unset.
//! 2. Neighbour links are mutually consistent; `first` has no predecessor
//!    and `last` no successor.
//! 3. A set cursor points at a move inside the chain, never at a mark.
//!    Operations that would land it on a mark slide it forward to the next
//!    move or the end.
//! 4. Every move has a valid direction (guaranteed by [`Direction`](crate::Direction)).
//!
//! [`check_sanity`](MoveLog::check_sanity) verifies 1–3.
//!
//! # Notification
//!
//! Listeners registered with [`add_listener`](MoveLog::add_listener) run
//! once at the end of every public operation that moved the cursor, and
//! after every [`append`](MoveLog::append). Internal steps only raise a
//! flag; `settle` is the single place that fires.

use std::fmt;

use crate::arena::{Arena, NodeId};
use crate::config::MoveLogConfig;
use crate::error::SanityError;
use crate::node::{Entry, MARK_MACRO_CLOSE, MARK_MACRO_OPEN, MARK_SCRAMBLE_BOUNDARY, Move};
use crate::notify::{ChangeNotifier, Listener};

/// Linear, mark-aware undo/redo log of moves.
pub struct MoveLog {
    pub(crate) chain: Arena,
    /// First pending node, or `None` when positioned at the end.
    pub(crate) current: Option<NodeId>,
    pub(crate) config: MoveLogConfig,
    notifier: ChangeNotifier,
    /// Set when the cursor moved during the operation in flight.
    cursor_moved: bool,
}

impl fmt::Debug for MoveLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveLog")
            .field("len", &self.chain.len())
            .field("slots", &self.chain.capacity())
            .field("position", &self.position())
            .field("at_end", &self.current.is_none())
            .field("config", &self.config)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl Default for MoveLog {
    fn default() -> Self {
        Self::with_config(MoveLogConfig::default())
    }
}

impl MoveLog {
    /// Create an empty log for a puzzle with `layers` parallel layers.
    #[must_use]
    pub fn new(layers: u32) -> Self {
        Self::with_config(MoveLogConfig::new(layers))
    }

    /// Create an empty log with the given configuration.
    #[must_use]
    pub fn with_config(config: MoveLogConfig) -> Self {
        Self {
            chain: Arena::default(),
            current: None,
            config,
            notifier: ChangeNotifier::new(),
            cursor_moved: false,
        }
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of parallel layers, used to classify rotations.
    #[must_use]
    pub fn layers(&self) -> u32 {
        self.config.layers
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &MoveLogConfig {
        &self.config
    }

    /// Number of entries in the chain, applied and pending, marks included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.len() == 0
    }

    /// Number of applied entries (the cursor's index in the chain).
    #[must_use]
    pub fn position(&self) -> usize {
        self.applied_ids().count()
    }

    /// Whether everything in the chain is applied.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    /// The move the cursor rests on, i.e. the next one [`redo`](Self::redo)
    /// would return.
    #[must_use]
    pub fn current(&self) -> Option<Move> {
        self.current
            .and_then(|id| self.chain.entry(id))
            .and_then(Entry::as_move)
            .copied()
    }

    /// Applied moves in order, marks skipped.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.applied_ids()
            .filter_map(|id| self.chain.entry(id).and_then(Entry::as_move).copied())
    }

    /// Every entry in the chain, applied and pending.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.chain
            .ids_from(self.chain.head())
            .filter_map(|id| self.chain.entry(id))
    }

    /// Applied entries in order, marks included.
    pub fn applied(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.applied_ids().filter_map(|id| self.chain.entry(id))
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a cursor-change listener. Returns `false` if `listener` was
    /// already registered.
    ///
    /// Listeners must not mutate this log; see [`crate::notify`].
    pub fn add_listener(&mut self, listener: Listener) -> bool {
        self.notifier.add(listener)
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, listener: &Listener) -> bool {
        self.notifier.remove(listener)
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record `mv` at the cursor, or cancel it against the nearest applied
    /// move if that is its exact inverse.
    ///
    /// A zero slice mask is stored as `1`. Pending entries after the cursor
    /// are kept. Listeners fire exactly once.
    pub fn append(&mut self, mv: Move) {
        self.append_step(mv);
        self.settle();
    }

    /// Discard everything pending, then [`append`](Self::append) `mv`.
    ///
    /// This is the entry point for "do this move now".
    pub fn apply(&mut self, mv: Move) {
        self.truncate_step();
        self.append_step(mv);
        self.settle();
    }

    /// Delete the cursor and everything after it; the cursor moves to the end.
    ///
    /// An open macro bracket left right before the new end is kept, so a
    /// half-recorded macro can remain in the chain.
    pub fn truncate(&mut self) {
        self.truncate_step();
        self.settle();
    }

    /// Insert the mark `id` at the cursor without moving it.
    pub fn mark(&mut self, id: char) {
        self.chain.insert_before(self.current, Entry::Mark(id));
        tracing::debug!(target: "movelog", mark = ?id, "mark inserted");
    }

    /// Delete the last entry of the chain.
    pub fn delete_last(&mut self) {
        self.delete_last_step();
        self.settle();
    }

    /// Delete every entry, keeping the layer count.
    pub fn clear(&mut self) {
        self.clear_with_layers(self.config.layers);
    }

    /// Delete every entry and switch to a puzzle with `layers` layers.
    pub fn clear_with_layers(&mut self, layers: u32) {
        self.clear_step(layers);
        self.settle();
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Step back over the nearest applied move.
    ///
    /// Returns the move that reverts it (direction negated), or `None` if
    /// nothing is applied.
    pub fn undo(&mut self) -> Option<Move> {
        let undone = self.undo_step();
        self.settle();
        undone
    }

    /// Step forward over the next pending move.
    ///
    /// Returns that move unchanged, or `None` if nothing is pending.
    pub fn redo(&mut self) -> Option<Move> {
        let redone = self.redo_step();
        self.settle();
        redone
    }

    /// Whether any move is applied.
    #[must_use]
    pub fn has_previous_move(&self) -> bool {
        self.previous_move_id().is_some()
    }

    /// Whether any move is pending.
    #[must_use]
    pub fn has_next_move(&self) -> bool {
        self.chain
            .ids_from(self.current)
            .any(|id| !self.is_mark(id))
    }

    /// The nearest applied move, skipping marks.
    #[must_use]
    pub fn previous_move(&self) -> Option<Move> {
        self.previous_move_id()
            .and_then(|id| self.chain.entry(id))
            .and_then(Entry::as_move)
            .copied()
    }

    /// Move the cursor before the first entry.
    pub fn go_to_beginning(&mut self) {
        self.seat(self.chain.head());
        self.settle();
    }

    /// Move the cursor to the end, applying everything.
    pub fn go_to_end(&mut self) {
        self.seat(None);
        self.settle();
    }

    // ========================================================================
    // Marks
    // ========================================================================

    /// Whether the mark `id` is adjacent to the cursor, with no move between.
    #[must_use]
    pub fn at_mark(&self, id: char) -> bool {
        if self
            .current
            .and_then(|cur| self.chain.entry(cur))
            .is_some_and(|entry| entry.is_mark_of(id))
        {
            return true;
        }
        self.chain
            .ids_back_from(self.previous_node())
            .map_while(|node| self.chain.entry(node).filter(|entry| entry.is_mark()))
            .any(|entry| entry.is_mark_of(id))
    }

    /// Whether the cursor sits right after an open macro bracket.
    #[must_use]
    pub fn at_macro_open(&self) -> bool {
        self.at_mark(MARK_MACRO_OPEN)
    }

    /// Whether the cursor sits right after a macro close bracket.
    #[must_use]
    pub fn at_macro_close(&self) -> bool {
        self.at_mark(MARK_MACRO_CLOSE)
    }

    /// Whether the cursor sits right after a scramble boundary.
    #[must_use]
    pub fn at_scramble_boundary(&self) -> bool {
        self.at_mark(MARK_SCRAMBLE_BOUNDARY)
    }

    /// Take one undo or redo step towards the mark `id`.
    ///
    /// With `forward_first` the pending side is searched first and the
    /// applied side only if the mark is not ahead; otherwise the other way
    /// round. This lets two marks sharing an id (a region's start and end)
    /// resolve deterministically.
    ///
    /// Returns the move that was undone or redone, or `None` if already at
    /// the mark or no such mark exists.
    pub fn go_towards_mark(&mut self, id: char, forward_first: bool) -> Option<Move> {
        if self.at_mark(id) {
            tracing::debug!(target: "movelog", mark = ?id, "already at mark");
            return None;
        }
        let stepped = if forward_first {
            self.step_forward_towards(id)
                .or_else(|| self.step_backward_towards(id))
        } else {
            self.step_backward_towards(id)
                .or_else(|| self.step_forward_towards(id))
        };
        tracing::debug!(
            target: "movelog",
            mark = ?id,
            forward_first,
            moved = stepped.is_some(),
            "step towards mark"
        );
        self.settle();
        stepped
    }

    // ========================================================================
    // Counting
    // ========================================================================

    /// Count applied moves since the scramble boundary.
    ///
    /// With `exclude_rotates`, moves covering every layer are not counted.
    /// The first scramble boundary resets the count to zero; later ones do
    /// not.
    #[must_use]
    pub fn count_moves(&self, exclude_rotates: bool) -> usize {
        let layers = self.config.layers;
        let mut count = 0;
        let mut hit_scramble_boundary = false;
        for entry in self.applied() {
            match entry {
                Entry::Move(mv) => {
                    if !(exclude_rotates && mv.is_rotation(layers)) {
                        count += 1;
                    }
                }
                Entry::Mark(MARK_SCRAMBLE_BOUNDARY) if !hit_scramble_boundary => {
                    hit_scramble_boundary = true;
                    count = 0;
                }
                Entry::Mark(_) => {}
            }
        }
        count
    }

    /// Count applied twists: moves that are not whole-puzzle rotations.
    #[must_use]
    pub fn count_twists(&self) -> usize {
        self.count_moves(true)
    }

    // ========================================================================
    // Reversal
    // ========================================================================

    /// Reverse the chain and negate every move, so that playing the result
    /// undoes the original sequence. Marks keep their ids.
    ///
    /// The cursor is reset to the end; callers that need it must save and
    /// restore it themselves. Listeners fire unless the log is empty.
    pub fn reverse(&mut self) {
        self.reverse_step();
        self.settle();
    }

    // ========================================================================
    // Sanity
    // ========================================================================

    /// Verify the structural invariants of the chain and cursor.
    pub fn check_sanity(&self) -> Result<(), SanityError> {
        let head = self.chain.head();
        let tail = self.chain.tail();
        if head.is_none() != tail.is_none() {
            return Err(SanityError::EndsMismatch);
        }
        if head.and_then(|id| self.chain.prev(id)).is_some() {
            return Err(SanityError::FirstHasPrev);
        }
        if tail.and_then(|id| self.chain.next(id)).is_some() {
            return Err(SanityError::LastHasNext);
        }

        let expected = self.chain.len();
        let mut walked = 0;
        let mut previous = None;
        let mut found_current = false;
        let mut cursor = head;
        while let Some(id) = cursor {
            if walked > expected {
                return Err(SanityError::Cycle);
            }
            let Some(node) = self.chain.get(id) else {
                return Err(SanityError::DanglingLink { position: walked });
            };
            if node.prev != previous {
                return Err(SanityError::BrokenForwardLink {
                    position: walked.saturating_sub(1),
                });
            }
            if node.next.is_none() && Some(id) != tail {
                return Err(SanityError::LastNotReached { position: walked });
            }
            if Some(id) == self.current {
                if node.entry.is_mark() {
                    return Err(SanityError::CursorOnMark { position: walked });
                }
                found_current = true;
            }
            previous = Some(id);
            cursor = node.next;
            walked += 1;
        }

        if walked != expected {
            return Err(SanityError::LengthMismatch { expected, walked });
        }
        if self.current.is_some() && !found_current {
            return Err(SanityError::CursorUnreachable);
        }
        Ok(())
    }

    /// Panic if the chain is corrupt. A failure here is a bug in this module.
    pub(crate) fn assert_sane(&self) {
        if let Err(e) = self.check_sanity() {
            panic!("move log invariant violated: {e}");
        }
    }

    // ========================================================================
    // Internal steps (never notify)
    // ========================================================================

    pub(crate) fn append_step(&mut self, mv: Move) {
        let mv = mv.normalized();
        let cancels = !self.at_macro_close()
            && self
                .previous_move()
                .is_some_and(|previous| previous.cancels(&mv));

        if cancels {
            self.undo_step();
            self.truncate_step();
        } else {
            self.chain.insert_before(self.current, Entry::Move(mv));
        }
        tracing::debug!(target: "movelog", mv = %mv, cancelled = cancels, "append");
        self.mark_cursor_moved();
    }

    pub(crate) fn truncate_step(&mut self) {
        let mut removed = 0usize;
        while self.current.is_some() {
            self.delete_last_step();
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!(target: "movelog", removed, "truncate");
        }
        if self.at_macro_open() {
            tracing::trace!(target: "movelog", "open macro bracket kept at end of log");
        }
    }

    fn undo_step(&mut self) -> Option<Move> {
        let id = self.previous_move_id()?;
        let undone = self.chain.entry(id).and_then(Entry::as_move).copied()?;
        self.seat(Some(id));
        tracing::debug!(target: "movelog", mv = %undone, "undo");
        Some(undone.inverse())
    }

    fn redo_step(&mut self) -> Option<Move> {
        self.current?;
        let next_move = self.chain.ids_from(self.current).find(|&id| !self.is_mark(id));
        let Some(id) = next_move else {
            self.seat(None);
            return None;
        };
        let redone = self.chain.entry(id).and_then(Entry::as_move).copied()?;
        self.seat(self.chain.next(id));
        tracing::debug!(target: "movelog", mv = %redone, "redo");
        Some(redone)
    }

    fn step_backward_towards(&mut self, id: char) -> Option<Move> {
        let behind = self
            .chain
            .ids_back_from(self.previous_node())
            .any(|node| self.is_mark_of(node, id));
        if behind { self.undo_step() } else { None }
    }

    fn step_forward_towards(&mut self, id: char) -> Option<Move> {
        let ahead = self
            .chain
            .ids_from(self.current)
            .any(|node| self.is_mark_of(node, id));
        if ahead { self.redo_step() } else { None }
    }

    pub(crate) fn delete_last_step(&mut self) {
        if let Some(tail) = self.chain.tail() {
            self.delete_node(tail);
        }
    }

    pub(crate) fn clear_step(&mut self, layers: u32) {
        self.config.layers = layers;
        while self.chain.tail().is_some() {
            self.delete_last_step();
        }
        self.chain.clear();
    }

    pub(crate) fn reverse_step(&mut self) {
        let Some(original_first) = self.chain.head() else {
            return;
        };
        self.seat(None);
        self.mark_cursor_moved();
        if let Some(node) = self.chain.get_mut(original_first) {
            node.entry = reversed(node.entry);
        }
        for _ in 1..self.chain.len() {
            let Some(tail) = self.chain.tail() else {
                break;
            };
            let Some(node) = self.chain.unlink(tail) else {
                break;
            };
            self.chain
                .insert_before(Some(original_first), reversed(node.entry));
        }
        tracing::debug!(target: "movelog", len = self.chain.len(), "reverse");
    }

    /// Splice `id` out, reseating the cursor first if it pointed there.
    fn delete_node(&mut self, id: NodeId) {
        if self.current == Some(id) {
            let next = self.chain.next(id);
            self.seat(next);
        }
        self.chain.unlink(id);
        tracing::trace!(target: "movelog", len = self.chain.len(), "node deleted");
    }

    /// Point the cursor at `at`, sliding forward past marks.
    pub(crate) fn seat(&mut self, at: Option<NodeId>) {
        let at = self.chain.ids_from(at).find(|&id| !self.is_mark(id));
        if at != self.current {
            self.current = at;
            self.cursor_moved = true;
            tracing::trace!(target: "movelog", at_end = at.is_none(), "cursor reseated");
        }
    }

    /// Make the operation in flight notify even if the cursor handle is
    /// unchanged (the chain around it was rebuilt).
    pub(crate) fn mark_cursor_moved(&mut self) {
        self.cursor_moved = true;
    }

    /// Fire listeners if the operation in flight moved the cursor.
    pub(crate) fn settle(&mut self) {
        if std::mem::take(&mut self.cursor_moved) {
            self.notifier.fire();
        }
    }

    // ========================================================================
    // Navigation helpers
    // ========================================================================

    pub(crate) fn applied_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let current = self.current;
        self.chain
            .ids_from(self.chain.head())
            .take_while(move |&id| Some(id) != current)
    }

    /// The last applied node, move or mark.
    fn previous_node(&self) -> Option<NodeId> {
        match self.current {
            Some(id) => self.chain.prev(id),
            None => self.chain.tail(),
        }
    }

    fn previous_move_id(&self) -> Option<NodeId> {
        self.chain
            .ids_back_from(self.previous_node())
            .find(|&id| !self.is_mark(id))
    }

    fn is_mark(&self, id: NodeId) -> bool {
        self.chain.entry(id).is_some_and(Entry::is_mark)
    }

    fn is_mark_of(&self, id: NodeId, mark: char) -> bool {
        self.chain.entry(id).is_some_and(|entry| entry.is_mark_of(mark))
    }
}

fn reversed(entry: Entry) -> Entry {
    match entry {
        Entry::Move(mv) => Entry::Move(mv.inverse()),
        mark @ Entry::Mark(_) => mark,
    }
}

// ============================================================================
// Tests
// ============================================================================
