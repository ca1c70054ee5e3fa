//! Shared pieces for two-player turn-based board games.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// One of the two players. `First` moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// 0 for `First`, 1 for `Second`; handy for per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// A piece of game-specific `kind` belonging to `owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece<K> {
    pub kind: K,
    pub owner: Side,
}

impl<K> Piece<K> {
    pub const fn new(kind: K, owner: Side) -> Self {
        Self { kind, owner }
    }
}

/// A board of optional pieces.
pub type Board<K> = Grid<Option<Piece<K>>>;

/// Result of submitting a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Accepted,
    Rejected,
}

impl MoveOutcome {
    pub fn is_accepted(self) -> bool {
        self == MoveOutcome::Accepted
    }
}

/// Whose turn it is. Changes only through [`TurnState::commit_move`] or [`TurnState::pass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    current: Side,
    moves: u32,
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new(Side::First)
    }
}

impl TurnState {
    pub const fn new(first: Side) -> Self {
        Self {
            current: first,
            moves: 0,
        }
    }

    pub fn current(&self) -> Side {
        self.current
    }

    /// Accepted moves so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Record an accepted move and hand the turn over.
    pub fn commit_move(&mut self) -> Side {
        self.moves += 1;
        self.current = self.current.opponent();
        self.current
    }

    /// Skip the current side without counting a move.
    pub fn pass(&mut self) -> Side {
        self.current = self.current.opponent();
        self.current
    }

    /// Apply `attempt` and commit the turn only when it is accepted.
    pub fn try_move(&mut self, attempt: impl FnOnce(Side) -> MoveOutcome) -> MoveOutcome {
        let outcome = attempt(self.current);
        if outcome.is_accepted() {
            self.commit_move();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_alternates() {
        let mut turn = TurnState::default();
        assert_eq!(turn.current(), Side::First);
        assert_eq!(turn.commit_move(), Side::Second);
        assert_eq!(turn.commit_move(), Side::First);
        assert_eq!(turn.moves(), 2);
    }

    #[test]
    fn rejected_move_keeps_turn() {
        let mut turn = TurnState::default();
        let outcome = turn.try_move(|_| MoveOutcome::Rejected);
        assert_eq!(outcome, MoveOutcome::Rejected);
        assert_eq!(turn.current(), Side::First);
        assert_eq!(turn.moves(), 0);

        let outcome = turn.try_move(|side| {
            assert_eq!(side, Side::First);
            MoveOutcome::Accepted
        });
        assert!(outcome.is_accepted());
        assert_eq!(turn.current(), Side::Second);
    }

    #[test]
    fn pass_does_not_count_as_move() {
        let mut turn = TurnState::new(Side::Second);
        turn.pass();
        assert_eq!(turn.current(), Side::First);
        assert_eq!(turn.moves(), 0);
    }

    #[test]
    fn side_helpers() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::Second.index(), 1);
    }
}
