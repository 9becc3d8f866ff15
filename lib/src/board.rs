use crate::geometry::{Position, BOARD_SIZE};
use crate::results::GameError;
use crate::tiles::{PlayerId, Tile};
use tracing::debug;

/// A tile that gravity moved from one cell to another in the same column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityMove {
    pub from: Position,
    pub to: Position,
}

/// Updates each of `positions` to where gravity moved its tile. Positions whose tile did not move
/// are left as they are.
pub fn follow_moves(positions: &mut [Position], moves: &[GravityMove]) {
    for position in positions.iter_mut() {
        if let Some(moved) = moves.iter().find(|moved| moved.from == *position) {
            *position = moved.to;
        }
    }
}

/// The 7x7 playing grid.
///
/// Tiles in a column are normally packed: every occupied cell sits directly on the bottom row or on
/// another occupied cell. Dropping and removing tiles restore this by resolving gravity, while
/// [`Board::place_tile_at_position`] may leave a tile floating until the next of those. Ownership
/// is tracked separately from the tiles themselves and moves with them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Option<Tile>; BOARD_SIZE]; BOARD_SIZE],
    owners: [[Option<PlayerId>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Board {
        Board::default()
    }

    /// Returns the tile at the given position, if any.
    pub fn get(&self, position: Position) -> Option<&Tile> {
        if !position.is_on_board() {
            return None;
        }
        self.cells[position.y][position.x].as_ref()
    }

    /// Returns the player who placed the tile at the given position.
    pub fn owner(&self, position: Position) -> Option<PlayerId> {
        if !position.is_on_board() {
            return None;
        }
        self.owners[position.y][position.x]
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.get(position).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    pub fn tile_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    /// Iterates over every occupied cell in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.as_ref().map(|tile| (Position::new(x, y), tile)))
        })
    }

    /// The row a tile dropped into `column` would come to rest on, or `None` if the column is
    /// full or does not exist.
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= BOARD_SIZE {
            return None;
        }
        (0..BOARD_SIZE)
            .rev()
            .find(|&y| self.cells[y][column].is_none())
    }

    /// The number of empty cells in a column.
    pub fn free_cells(&self, column: usize) -> usize {
        if column >= BOARD_SIZE {
            return 0;
        }
        (0..BOARD_SIZE)
            .filter(|&y| self.cells[y][column].is_none())
            .count()
    }

    /// Drops each tile into its column, in order, and returns the position each one landed on.
    ///
    /// Several tiles dropped into one column stack up in the order given. All placements are
    /// checked before any cell changes, so on error the board is untouched.
    pub fn place_tiles(
        &mut self,
        placements: &[(usize, Tile)],
        player: PlayerId,
    ) -> Result<Vec<Position>, GameError> {
        self.drop_tiles(placements, player).map(|(landed, _)| landed)
    }

    /// Like [`Board::place_tiles`], but also returns every tile that gravity moved afterwards,
    /// including tiles that were already on the board.
    pub(crate) fn drop_tiles(
        &mut self,
        placements: &[(usize, Tile)],
        player: PlayerId,
    ) -> Result<(Vec<Position>, Vec<GravityMove>), GameError> {
        let mut needed = [0; BOARD_SIZE];
        for (column, _) in placements {
            if *column >= BOARD_SIZE {
                return Err(GameError::InvalidColumn(*column));
            }
            needed[*column] += 1;
            if needed[*column] > self.free_cells(*column) {
                return Err(GameError::ColumnFull(*column));
            }
        }
        let mut landed = Vec::with_capacity(placements.len());
        for (column, tile) in placements {
            let row = self
                .landing_row(*column)
                .ok_or(GameError::ColumnFull(*column))?;
            self.cells[row][*column] = Some(*tile);
            self.owners[row][*column] = Some(player);
            landed.push(Position::new(*column, row));
        }
        let moves = self.resolve_gravity();
        follow_moves(&mut landed, &moves);
        debug!(player, ?landed, "placed tiles");
        Ok((landed, moves))
    }

    /// Puts a tile on a specific cell without applying gravity.
    pub fn place_tile_at_position(
        &mut self,
        x: usize,
        y: usize,
        tile: Tile,
        player: PlayerId,
    ) -> Result<(), GameError> {
        let position = Position::new(x, y);
        if !position.is_on_board() {
            return Err(GameError::OutOfBounds { x, y });
        }
        if self.is_occupied(position) {
            return Err(GameError::CellOccupied { x, y });
        }
        self.cells[y][x] = Some(tile);
        self.owners[y][x] = Some(player);
        Ok(())
    }

    /// Clears a cell and lets the tiles above it fall. Returns the removed tile, or `None` if the
    /// cell was already empty.
    pub fn remove_tile(&mut self, x: usize, y: usize) -> Result<Option<Tile>, GameError> {
        self.take_tile(x, y).map(|(removed, _)| removed)
    }

    /// Like [`Board::remove_tile`], but also returns every tile that gravity moved afterwards.
    pub(crate) fn take_tile(
        &mut self,
        x: usize,
        y: usize,
    ) -> Result<(Option<Tile>, Vec<GravityMove>), GameError> {
        if !Position::new(x, y).is_on_board() {
            return Err(GameError::OutOfBounds { x, y });
        }
        let removed = self.cells[y][x].take();
        self.owners[y][x] = None;
        let moves = match removed {
            Some(_) => self.resolve_gravity(),
            None => Vec::new(),
        };
        Ok((removed, moves))
    }

    /// Packs every column toward the bottom row, keeping the tiles' relative order.
    ///
    /// This is a no-op on a board that is already packed. Returns the tiles that moved.
    pub fn resolve_gravity(&mut self) -> Vec<GravityMove> {
        let mut moves = Vec::new();
        for x in 0..BOARD_SIZE {
            let mut column: Vec<(usize, Tile, Option<PlayerId>)> = Vec::with_capacity(BOARD_SIZE);
            for y in 0..BOARD_SIZE {
                if let Some(tile) = self.cells[y][x].take() {
                    column.push((y, tile, self.owners[y][x].take()));
                }
                self.owners[y][x] = None;
            }
            let top = BOARD_SIZE - column.len();
            for (offset, (from_y, tile, owner)) in column.into_iter().enumerate() {
                let to_y = top + offset;
                self.cells[to_y][x] = Some(tile);
                self.owners[to_y][x] = owner;
                if from_y != to_y {
                    moves.push(GravityMove {
                        from: Position::new(x, from_y),
                        to: Position::new(x, to_y),
                    });
                }
            }
        }
        if !moves.is_empty() {
            debug!(moved = moves.len(), "resolved gravity");
        }
        moves
    }

    /// Returns `true` iff no column has an empty cell below an occupied one.
    pub fn is_packed(&self) -> bool {
        (0..BOARD_SIZE).all(|x| {
            let mut seen_tile = false;
            (0..BOARD_SIZE).all(|y| {
                let occupied = self.cells[y][x].is_some();
                let packed = !seen_tile || occupied;
                seen_tile |= occupied;
                packed
            })
        })
    }

    pub(crate) fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        if !position.is_on_board() {
            return None;
        }
        self.cells[position.y][position.x].as_mut()
    }

    pub(crate) fn set_cell(&mut self, position: Position, tile: Option<Tile>, owner: Option<PlayerId>) {
        self.cells[position.y][position.x] = tile;
        self.owners[position.y][position.x] = tile.and(owner);
    }
}
