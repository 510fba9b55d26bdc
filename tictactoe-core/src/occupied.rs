//! Visual board state owned by the UI side.

use crate::{Player, Pos, CELL_COUNT};

/// Which cell currently shows which mark.
///
/// This is the gate in front of [`TallyEngine`](crate::TallyEngine): a cell
/// that is already marked refuses a second mark, so the engine never sees the
/// same cell twice in one game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct OccupiedCells {
    cells: [Option<Player>; CELL_COUNT as usize],
}

impl OccupiedCells {
    /// Create an empty board.
    pub fn new() -> OccupiedCells {
        OccupiedCells::default()
    }

    /// Put `player`'s mark on `pos`. Returns false if the cell was taken
    /// or `pos` is off the board.
    pub fn mark(&mut self, pos: Pos, player: Player) -> bool {
        match self.cells.get_mut(pos.0 as usize) {
            Some(cell) if cell.is_none() => {
                *cell = Some(player);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_occupied(&self, pos: Pos) -> bool {
        self.mark_at(pos).is_some()
    }

    /// The mark shown at `pos`, if any.
    #[inline]
    pub fn mark_at(&self, pos: Pos) -> Option<Player> {
        self.cells.get(pos.0 as usize).copied().flatten()
    }

    /// Number of marked cells.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Wipe every mark.
    pub fn clear(&mut self) {
        self.cells = [None; CELL_COUNT as usize];
    }

    /// Marks as a 3x3 grid, row-major.
    pub fn rows(&self) -> [[Option<Player>; 3]; 3] {
        let mut grid = [[None; 3]; 3];
        for pos in Pos::all() {
            grid[pos.row() as usize][pos.col() as usize] = self.mark_at(pos);
        }
        grid
    }
}
