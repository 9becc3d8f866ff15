//! A flat, serializable record of a game, for saving and restoring it or sending it elsewhere.
//!
//! Converting a [`GameState`] to a [`GameSnapshot`] and back reproduces the same state. Converting
//! a snapshot that came from outside checks it first, so a malformed snapshot is reported as
//! [`GameError::InvalidSnapshot`] instead of producing a broken game.

use crate::board::Board;
use crate::game::{validate_state, GameState, Player};
use crate::geometry::{Position, BOARD_SIZE};
use crate::results::*;
use crate::tiles::{BlankTile, PlayerId, Tile, BLANK_MARKER};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tile in a rack, the bag, or on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileSnapshot {
    /// The tile's letter, or [`BLANK_MARKER`] for a blank.
    pub letter: char,
    pub points: u32,
    /// Blanks only.
    pub assigned_letter: Option<char>,
    /// Blanks only.
    pub locked: Option<bool>,
}

/// An occupied board cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellSnapshot {
    pub tile: TileSnapshot,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub rack: Vec<TileSnapshot>,
    pub turn_order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClaimedWordSnapshot {
    pub word: String,
    pub positions: Vec<Position>,
    pub player: PlayerId,
    pub score: u32,
    /// Bonus names, as given by [`Bonus::name`].
    pub bonuses: Vec<String>,
}

/// The whole game as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameSnapshot {
    /// Rows from top to bottom, each holding one entry per column.
    pub board: Vec<Vec<Option<CellSnapshot>>>,
    pub players: Vec<PlayerSnapshot>,
    pub current_player: PlayerId,
    /// In draw order reversed: the last tile is drawn first.
    pub bag: Vec<TileSnapshot>,
    pub claimed_words: Vec<ClaimedWordSnapshot>,
    pub target_score: u32,
    pub status: GameStatus,
    pub winner: Option<PlayerId>,
}

impl From<&Tile> for TileSnapshot {
    fn from(tile: &Tile) -> Self {
        match tile {
            Tile::Regular { letter, points } => TileSnapshot {
                letter: *letter,
                points: *points,
                assigned_letter: None,
                locked: None,
            },
            Tile::Blank(blank) => TileSnapshot {
                letter: BLANK_MARKER,
                points: 0,
                assigned_letter: blank.assigned(),
                locked: Some(blank.is_locked()),
            },
        }
    }
}

impl TryFrom<&TileSnapshot> for Tile {
    type Error = GameError;

    fn try_from(snapshot: &TileSnapshot) -> Result<Tile, GameError> {
        if snapshot.letter == BLANK_MARKER {
            if snapshot.points != 0 {
                return Err(invalid("a blank tile is worth no points"));
            }
            let blank =
                BlankTile::with_state(snapshot.assigned_letter, snapshot.locked.unwrap_or(false))
                    .map_err(|error| invalid_tile(snapshot.letter, error))?;
            return Ok(Tile::Blank(blank));
        }
        if snapshot.assigned_letter.is_some() || snapshot.locked.is_some() {
            return Err(invalid(format!(
                "regular tile {} has blank tile state",
                snapshot.letter
            )));
        }
        let tile = Tile::from_letter(snapshot.letter)
            .map_err(|error| invalid_tile(snapshot.letter, error))?;
        if snapshot.points != tile.points() {
            return Err(invalid(format!(
                "tile {} is worth {} points, not {}",
                snapshot.letter,
                tile.points(),
                snapshot.points
            )));
        }
        Ok(tile)
    }
}

impl From<&ClaimedWord> for ClaimedWordSnapshot {
    fn from(claimed: &ClaimedWord) -> Self {
        ClaimedWordSnapshot {
            word: claimed.word.clone(),
            positions: claimed.positions.clone(),
            player: claimed.player,
            score: claimed.score,
            bonuses: claimed
                .bonuses
                .iter()
                .map(|bonus| bonus.name().to_string())
                .collect(),
        }
    }
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        PlayerSnapshot {
            id: player.id(),
            name: player.name().to_string(),
            color: player.color().to_string(),
            score: player.score(),
            rack: player.rack().iter().map(TileSnapshot::from).collect(),
            turn_order: player.turn_order(),
        }
    }
}

impl From<&GameState> for GameSnapshot {
    fn from(state: &GameState) -> Self {
        let board = (0..BOARD_SIZE)
            .map(|y| {
                (0..BOARD_SIZE)
                    .map(|x| {
                        let position = Position::new(x, y);
                        let tile = state.board().get(position)?;
                        let owner = state.board().owner(position)?;
                        Some(CellSnapshot {
                            tile: TileSnapshot::from(tile),
                            owner,
                        })
                    })
                    .collect()
            })
            .collect();
        GameSnapshot {
            board,
            players: state.players().iter().map(PlayerSnapshot::from).collect(),
            current_player: state.current_player(),
            bag: state.bag().iter().map(TileSnapshot::from).collect(),
            claimed_words: state
                .claimed_words()
                .iter()
                .map(ClaimedWordSnapshot::from)
                .collect(),
            target_score: state.target_score(),
            status: state.status(),
            winner: state.winner(),
        }
    }
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = GameError;

    fn try_from(snapshot: GameSnapshot) -> Result<GameState, GameError> {
        let players = snapshot
            .players
            .into_iter()
            .map(player_from_snapshot)
            .collect::<Result<Vec<Player>, GameError>>()?;
        let board = board_from_snapshot(&snapshot.board, &players)?;
        let bag = snapshot
            .bag
            .iter()
            .map(Tile::try_from)
            .collect::<Result<Vec<Tile>, GameError>>()?;
        let claimed_words = snapshot
            .claimed_words
            .into_iter()
            .map(claimed_word_from_snapshot)
            .collect::<Result<Vec<ClaimedWord>, GameError>>()?;

        let state = GameState {
            board,
            players,
            current_player: snapshot.current_player,
            bag,
            claimed_words,
            target_score: snapshot.target_score,
            status: snapshot.status,
            winner: snapshot.winner,
        };
        validate_state(&state).map_err(GameError::InvalidSnapshot)?;
        Ok(state)
    }
}

fn invalid(message: impl Into<String>) -> GameError {
    GameError::InvalidSnapshot(message.into())
}

fn invalid_tile(letter: char, error: GameError) -> GameError {
    match error {
        GameError::InvalidSnapshot(_) => error,
        other => invalid(format!("tile {letter}: {other}")),
    }
}

fn player_from_snapshot(snapshot: PlayerSnapshot) -> Result<Player, GameError> {
    let rack = snapshot
        .rack
        .iter()
        .map(Tile::try_from)
        .collect::<Result<Vec<Tile>, GameError>>()?;
    let mut player = Player::new(snapshot.id, snapshot.name, snapshot.turn_order);
    player.color = snapshot.color;
    player.score = snapshot.score;
    player.rack = rack;
    Ok(player)
}

fn board_from_snapshot(
    rows: &[Vec<Option<CellSnapshot>>],
    players: &[Player],
) -> Result<Board, GameError> {
    if rows.len() != BOARD_SIZE || rows.iter().any(|row| row.len() != BOARD_SIZE) {
        return Err(invalid(format!("the board must be {BOARD_SIZE}x{BOARD_SIZE}")));
    }
    let mut board = Board::new();
    for (y, row) in rows.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let cell = match cell {
                Some(cell) => cell,
                None => continue,
            };
            if !players.iter().any(|player| player.id() == cell.owner) {
                return Err(invalid(format!(
                    "the tile at ({x}, {y}) belongs to unknown player {}",
                    cell.owner
                )));
            }
            let tile = Tile::try_from(&cell.tile)?;
            board.set_cell(Position::new(x, y), Some(tile), Some(cell.owner));
        }
    }
    Ok(board)
}

fn claimed_word_from_snapshot(snapshot: ClaimedWordSnapshot) -> Result<ClaimedWord, GameError> {
    let bonuses = snapshot
        .bonuses
        .iter()
        .map(|name| match name.as_str() {
            "diagonal" => Ok(Bonus::Diagonal),
            "palindrome" => Ok(Bonus::Palindrome),
            "emordnilap" => Ok(Bonus::Emordnilap),
            other => Err(invalid(format!("unknown bonus {other}"))),
        })
        .collect::<Result<Vec<Bonus>, GameError>>()?;
    if let Some(position) = snapshot.positions.iter().find(|position| !position.is_on_board()) {
        return Err(invalid(format!(
            "claimed word {} is off the board at ({}, {})",
            snapshot.word, position.x, position.y
        )));
    }
    Ok(ClaimedWord {
        word: snapshot.word,
        positions: snapshot.positions,
        player: snapshot.player,
        score: snapshot.score,
        bonuses,
    })
}
