use rand::Rng;
use std::fmt;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in the fixed evaluation order used throughout.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Compact encoding used by the trace format (0=Up, 1=Down, 2=Left, 3=Right).
    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }

    /// Inverse of [`Move::to_u8`]. Returns `None` for values above 3.
    #[inline]
    pub fn from_u8(v: u8) -> Option<Move> {
        match v {
            0 => Some(Move::Up),
            1 => Some(Move::Down),
            2 => Some(Move::Left),
            3 => Some(Move::Right),
            _ => None,
        }
    }
}

/// Rejected construction input.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions must be at least 2x2, got {height}x{width}")]
    Dimensions { height: usize, width: usize },
    #[error("win target must be a power of two of at least 4, got {0}")]
    WinTarget(u32),
}

/// A `height x width` tile matrix in row-major order.
///
/// Cells hold the tile value itself (2, 4, 8, ...), with 0 for empty.
/// Every positive cell is a power of two: construction starts from zeros
/// and the only mutations are spawning a 2/4 and doubling on merge.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<u32>,
}

impl Grid {
    fn new(height: usize, width: usize) -> Self {
        Grid {
            height,
            width,
            cells: vec![0; height * width],
        }
    }

    #[cfg(test)]
    pub(crate) fn from_rows(rows: &[&[u32]]) -> Self {
        let height = rows.len();
        let width = rows[0].len();
        let mut cells = Vec::with_capacity(height * width);
        for row in rows {
            assert_eq!(row.len(), width);
            cells.extend_from_slice(row);
        }
        Grid { height, width, cells }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row * self.width + col]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, val: u32) {
        self.cells[row * self.width + col] = val;
    }

    /// Row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks_exact(self.width)
    }

    /// Count the number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// The highest tile value present, 0 on an empty grid.
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    fn transposed(&self) -> Grid {
        let mut out = Grid::new(self.width, self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.set(col, row, self.get(row, col));
            }
        }
        out
    }

    fn mirrored(&self) -> Grid {
        let mut out = self.clone();
        for row in out.cells.chunks_exact_mut(self.width) {
            row.reverse();
        }
        out
    }

    /// Reorient so that sliding `dir` becomes sliding left on rows.
    fn oriented(&self, dir: Move) -> Grid {
        match dir {
            Move::Left => self.clone(),
            Move::Right => self.mirrored(),
            Move::Up => self.transposed(),
            Move::Down => self.transposed().mirrored(),
        }
    }

    /// Inverse of [`Grid::oriented`].
    fn restored(self, dir: Move) -> Grid {
        match dir {
            Move::Left => self,
            Move::Right => self.mirrored(),
            Move::Up => self.transposed(),
            Move::Down => self.mirrored().transposed(),
        }
    }

    fn slid_left(mut self) -> Grid {
        for row in self.cells.chunks_exact_mut(self.width) {
            slide_row_left(row);
        }
        self
    }

    fn any_row_left_movable(&self) -> bool {
        self.rows().any(|row| row_left_movable(row))
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid({}x{} {:?})", self.height, self.width, self.cells)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule: String = std::iter::repeat("+------")
            .take(self.width)
            .chain(std::iter::once("+"))
            .collect();
        writeln!(f, "{}", rule)?;
        for row in self.rows() {
            for &val in row {
                if val == 0 {
                    write!(f, "|      ")?;
                } else {
                    write!(f, "|{:^6}", val)?;
                }
            }
            writeln!(f, "|")?;
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Move all non-zero values to the front, preserving order.
fn compress(row: &mut [u32]) {
    let mut write = 0;
    for read in 0..row.len() {
        if row[read] != 0 {
            if write != read {
                row[write] = row[read];
                row[read] = 0;
            }
            write += 1;
        }
    }
}

/// Compact leftward, merge each adjacent equal pair at most once, compact again.
///
/// The merge pass walks left to right; a merged cell is zeroed on the right
/// side, so the doubled value can never combine again within the same move.
fn slide_row_left(row: &mut [u32]) {
    compress(row);
    for i in 0..row.len().saturating_sub(1) {
        if row[i] != 0 && row[i] == row[i + 1] {
            row[i] *= 2;
            row[i + 1] = 0;
        }
    }
    compress(row);
}

/// True if sliding this row left would shift or merge anything.
fn row_left_movable(row: &[u32]) -> bool {
    row.windows(2).any(|pair| {
        (pair[0] == 0 && pair[1] != 0) || (pair[0] != 0 && pair[0] == pair[1])
    })
}

/// The live game state: a [`Grid`], a win target, and an undo history.
///
/// All randomized operations take an explicit `&mut impl Rng`, so a seeded
/// RNG reproduces a game exactly. `Clone` deep-copies the grid and the full
/// history; the advisor relies on that to roll out games on private copies.
///
/// ```
/// use mc_2048::board::Board;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut board = Board::new(4, 4, 2048).unwrap();
/// board.spawn(&mut rng);
/// board.spawn(&mut rng);
/// assert_eq!(board.grid().count_empty(), 14);
/// assert!(!board.legal_moves().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Board {
    win: u32,
    grid: Grid,
    history: Vec<Grid>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Rejects dimensions below 2x2 and win targets that are not a power of
    /// two of at least 4. The grid starts with no tiles; callers place the
    /// two opening tiles with explicit [`Board::spawn`] calls.
    pub fn new(height: usize, width: usize, win: u32) -> Result<Board, BoardError> {
        if height < 2 || width < 2 {
            return Err(BoardError::Dimensions { height, width });
        }
        if win < 4 || !win.is_power_of_two() {
            return Err(BoardError::WinTarget(win));
        }
        Ok(Board {
            win,
            grid: Grid::new(height, width),
            history: Vec::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_grid(grid: Grid, win: u32) -> Board {
        Board {
            win,
            grid,
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// The tile value that counts as a win.
    #[inline]
    pub fn win(&self) -> u32 {
        self.win
    }

    /// Read access to the live grid.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of undoable moves currently recorded.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Clear all tiles and the undo history, keeping dimensions and win target.
    pub fn reset(&mut self) {
        self.grid = Grid::new(self.grid.height(), self.grid.width());
        self.history.clear();
    }

    /// True if sliding `dir` would shift or merge at least one tile.
    pub fn can_move(&self, dir: Move) -> bool {
        self.grid.oriented(dir).any_row_left_movable()
    }

    /// The directions for which [`Board::can_move`] holds, in [`Move::ALL`] order.
    pub fn legal_moves(&self) -> Vec<Move> {
        Move::ALL
            .iter()
            .copied()
            .filter(|&dir| self.can_move(dir))
            .collect()
    }

    /// Slide and merge tiles in `dir`. No tile is spawned.
    ///
    /// On a change, the pre-move grid is pushed onto the undo history and
    /// `true` is returned. A direction that moves nothing is a silent no-op:
    /// the grid and the history are left untouched and `false` is returned.
    pub fn shift(&mut self, dir: Move) -> bool {
        let next = self.grid.oriented(dir).slid_left().restored(dir);
        if next == self.grid {
            return false;
        }
        self.history.push(self.grid.clone());
        self.grid = next;
        true
    }

    /// Perform a move then spawn a tile if the move changed the board.
    ///
    /// Returns whether the board changed.
    pub fn make_move<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> bool {
        if self.shift(dir) {
            self.spawn(rng);
            true
        } else {
            false
        }
    }

    /// Place a 2 (or a 4, one draw in ten) on a uniformly random empty cell.
    ///
    /// Does nothing on a full grid.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let empties: Vec<usize> = self
            .grid
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect();
        if empties.is_empty() {
            return;
        }
        let idx = empties[rng.gen_range(0..empties.len())];
        let val = if rng.gen_range(0..100) > 89 { 4 } else { 2 };
        let (row, col) = (idx / self.grid.width(), idx % self.grid.width());
        self.grid.set(row, col, val);
    }

    /// Restore the most recent pre-move snapshot.
    ///
    /// Returns `false` when there is nothing to undo. Spawns are not undone
    /// separately: the snapshot predates both the move and the spawn that
    /// followed it.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.grid = prev;
                true
            }
            None => false,
        }
    }

    /// True once any tile has reached the win target.
    pub fn is_win(&self) -> bool {
        self.grid.cells().iter().any(|&v| v >= self.win)
    }

    /// True when the grid is full and no direction can shift or merge.
    ///
    /// A full grid with a remaining merge is not game over.
    pub fn is_game_over(&self) -> bool {
        self.grid.count_empty() == 0 && Move::ALL.iter().all(|&dir| !self.can_move(dir))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.grid, f)
    }
}
