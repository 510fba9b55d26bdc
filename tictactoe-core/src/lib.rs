//! Tic-tac-toe game logic with running line tallies.
//!
//! The engine never stores the grid. Each move bumps the mover's counter for
//! every line that passes through the target cell, and a line is complete as
//! soon as one of those counters reaches 3.
//!
//! # Tally Layout
//!
//! ```text
//! rows[r][p]   r = 0..3, p = player index (0 = One, 1 = Two)
//! cols[c][p]   c = 0..3
//! diags[d][p]  d = 0 (main: (0,0) (1,1) (2,2)), 1 (anti: (0,2) (1,1) (2,0))
//!
//! Cell indices (row-major order):
//!   (0,0)=0  (0,1)=1  (0,2)=2
//!   (1,0)=3  (1,1)=4  (1,2)=5
//!   (2,0)=6  (2,1)=7  (2,2)=8
//! ```
//!
//! The tallies are only meaningful while no cell is played twice in the same
//! game. Gating repeated clicks is the job of [`OccupiedCells`], which
//! [`Game`] consults before it forwards a move to the engine.

pub mod error;
mod game;
mod occupied;

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::{GameError, Result};
pub use game::{turn_label, Game, GameObserver, GameOver, MoveReport};
pub use occupied::OccupiedCells;

/// Number of cells in a line.
pub const LINE_LEN: u8 = 3;

/// Number of cells on the board.
pub const CELL_COUNT: u8 = 9;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Convert from u8 (1 or 2) to Player.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Player> {
        match bits {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    /// Column of this player in a tally row.
    #[inline]
    fn index(self) -> usize {
        self as usize - 1
    }

    /// Mark drawn into a cell for this player.
    #[inline]
    pub fn mark(self) -> char {
        match self {
            Player::One => 'O',
            Player::Two => 'X',
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// Position on the 3x3 board (0-8).
///
/// Layout:
/// ```text
///   0 1 2
///   3 4 5
///   6 7 8
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Pos(pub u8);

impl Pos {
    /// Create a position from row and column (0-2 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Pos {
        debug_assert!(row < 3 && col < 3);
        Pos(row * 3 + col)
    }

    /// Create a position from row and column, rejecting anything off the board.
    pub fn try_from_row_col(row: u8, col: u8) -> Result<Pos> {
        if row < 3 && col < 3 {
            Ok(Pos::from_row_col(row, col))
        } else {
            Err(GameError::InvalidPosition { row, col })
        }
    }

    /// Get the row (0-2).
    #[inline]
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    #[inline]
    pub fn col(self) -> u8 {
        self.0 % 3
    }

    /// Check if this is a valid position (0-8).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < CELL_COUNT
    }

    /// Diagonals passing through this position.
    #[inline]
    pub fn diagonals(self) -> impl Iterator<Item = Diagonal> {
        let main = (self.row() == self.col()).then_some(Diagonal::Main);
        let anti = (self.row() + self.col() == 2).then_some(Diagonal::Anti);
        main.into_iter().chain(anti)
    }

    /// Iterate over all 9 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..CELL_COUNT).map(Pos)
    }
}

/// One of the two diagonal lines.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Diagonal {
    /// (0,0) (1,1) (2,2)
    Main = 0,
    /// (0,2) (1,1) (2,0)
    Anti = 1,
}

/// Classification of a single move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The game goes on with the other player.
    Continue,
    /// The mover completed a line.
    Win,
    /// The board filled up without a completed line.
    Draw,
}

impl Outcome {
    /// Whether this outcome ended (and reset) the game.
    #[inline]
    pub fn is_game_over(self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

/// Result of [`TallyEngine::apply_move`]: the outcome and who caused it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MoveResult {
    /// The player who was current when the move was applied.
    pub player: Player,
    pub outcome: Outcome,
}

// ============================================================================
// TALLY ENGINE
// ============================================================================

/// Win/draw detector for one game at a time.
///
/// After a win or a draw the tallies and the move counter go back to zero
/// immediately, so the engine is always ready for the next move. The current
/// player only changes on [`Outcome::Continue`].
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(try_from = "TallySnapshot")]
pub struct TallyEngine {
    rows: [[u8; 2]; 3],
    cols: [[u8; 2]; 3],
    diags: [[u8; 2]; 2],
    moves: u8,
    turn: Player,
}

impl TallyEngine {
    /// Create an engine with empty tallies and Player One to move.
    pub fn new() -> TallyEngine {
        TallyEngine {
            rows: [[0; 2]; 3],
            cols: [[0; 2]; 3],
            diags: [[0; 2]; 2],
            moves: 0,
            turn: Player::One,
        }
    }

    /// The player whose move is expected next.
    #[inline]
    pub fn current_player(&self) -> Player {
        self.turn
    }

    /// Moves applied since the last reset.
    #[inline]
    pub fn move_count(&self) -> u8 {
        self.moves
    }

    /// Marks `player` has on row `row`; `None` off the board.
    pub fn row_tally(&self, row: u8, player: Player) -> Option<u8> {
        self.rows.get(row as usize).map(|tally| tally[player.index()])
    }

    /// Marks `player` has on column `col`; `None` off the board.
    pub fn col_tally(&self, col: u8, player: Player) -> Option<u8> {
        self.cols.get(col as usize).map(|tally| tally[player.index()])
    }

    /// Marks `player` has on a diagonal.
    pub fn diag_tally(&self, diagonal: Diagonal, player: Player) -> u8 {
        self.diags[diagonal as usize][player.index()]
    }

    /// True when every tally and the move counter are zero.
    pub fn is_fresh(&self) -> bool {
        self.moves == 0
            && self
                .rows
                .iter()
                .chain(&self.cols)
                .chain(&self.diags)
                .all(|tally| *tally == [0, 0])
    }

    /// Apply a move for the current player at (row, col).
    ///
    /// The cell must not have been played since the last reset; this is not
    /// checked here.
    pub fn apply_move(&mut self, row: u8, col: u8) -> Result<MoveResult> {
        let pos = Pos::try_from_row_col(row, col)?;
        Ok(self.apply(pos))
    }

    /// Apply a move for the current player at a position built by
    /// [`Pos::try_from_row_col`].
    pub(crate) fn apply(&mut self, pos: Pos) -> MoveResult {
        debug_assert!(pos.is_valid());
        let player = self.turn;
        let p = player.index();

        self.moves += 1;
        self.rows[pos.row() as usize][p] += 1;
        self.cols[pos.col() as usize][p] += 1;
        for diagonal in pos.diagonals() {
            self.diags[diagonal as usize][p] += 1;
        }

        let won = self.rows[pos.row() as usize][p] == LINE_LEN
            || self.cols[pos.col() as usize][p] == LINE_LEN
            || pos
                .diagonals()
                .any(|diagonal| self.diags[diagonal as usize][p] == LINE_LEN);

        let outcome = if won {
            Outcome::Win
        } else if self.moves >= CELL_COUNT {
            Outcome::Draw
        } else {
            Outcome::Continue
        };

        debug!(
            player = %player,
            row = pos.row(),
            col = pos.col(),
            moves = self.moves,
            ?outcome,
            "applied move"
        );

        if outcome.is_game_over() {
            self.reset();
        } else {
            self.turn = player.opponent();
        }

        MoveResult { player, outcome }
    }

    /// Clear all tallies and the move counter. The current player is kept.
    pub fn reset(&mut self) {
        self.rows = [[0; 2]; 3];
        self.cols = [[0; 2]; 3];
        self.diags = [[0; 2]; 2];
        self.moves = 0;
    }
}

impl Default for TallyEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Unchecked serialized form of [`TallyEngine`].
#[derive(Deserialize)]
struct TallySnapshot {
    rows: [[u8; 2]; 3],
    cols: [[u8; 2]; 3],
    diags: [[u8; 2]; 2],
    moves: u8,
    turn: Player,
}

impl TryFrom<TallySnapshot> for TallyEngine {
    type Error = GameError;

    /// Accept only states a sequence of moves could have produced.
    fn try_from(s: TallySnapshot) -> Result<TallyEngine> {
        fn corrupt(reason: &'static str) -> Result<TallyEngine> {
            Err(GameError::CorruptState { reason })
        }
        fn placed_by(lines: &[[u8; 2]], p: usize) -> u32 {
            lines.iter().map(|tally| u32::from(tally[p])).sum()
        }

        let placed = [placed_by(&s.rows, 0), placed_by(&s.rows, 1)];
        for p in 0..2 {
            if placed_by(&s.cols, p) != placed[p] {
                return corrupt("row and column tallies disagree");
            }
            if s.diags.iter().any(|tally| u32::from(tally[p]) > placed[p]) {
                return corrupt("diagonal tally exceeds marks placed");
            }
        }
        // A tally of 3 would already have ended the game
        let line_out_of_range = s.rows.iter().chain(&s.cols).chain(&s.diags).any(|tally| {
            tally[0] >= LINE_LEN || tally[1] >= LINE_LEN || tally[0] + tally[1] > LINE_LEN
        });
        if line_out_of_range {
            return corrupt("line tally out of range");
        }
        if s.moves >= CELL_COUNT || u32::from(s.moves) != placed[0] + placed[1] {
            return corrupt("move counter does not match tallies");
        }
        let turn_ok = match placed[0].cmp(&placed[1]) {
            std::cmp::Ordering::Greater => s.turn == Player::Two,
            std::cmp::Ordering::Less => s.turn == Player::One,
            std::cmp::Ordering::Equal => true,
        };
        if !turn_ok || placed[0].abs_diff(placed[1]) > 1 {
            return corrupt("turn does not match marks placed");
        }

        Ok(TallyEngine {
            rows: s.rows,
            cols: s.cols,
            diags: s.diags,
            moves: s.moves,
            turn: s.turn,
        })
    }
}
