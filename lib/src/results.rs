use crate::geometry::Position;
use crate::tiles::PlayerId;
use std::fmt;
use thiserror::Error;

/// Indicates that a caller broke a precondition of an engine operation.
///
/// These errors abort the attempted call without changing any state. They signal a bug in the
/// calling layer rather than a move a player is allowed to make.
#[derive(Error, Debug)]
pub enum GameError {
    /// The column index was not in `0..BOARD_SIZE`.
    #[error("column {0} is outside the board")]
    InvalidColumn(usize),
    /// The column has no empty cell left.
    #[error("column {0} is full")]
    ColumnFull(usize),
    #[error("position ({x}, {y}) is outside the board")]
    OutOfBounds { x: usize, y: usize },
    #[error("position ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },
    #[error("position ({x}, {y}) has no tile")]
    CellEmpty { x: usize, y: usize },
    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),
    #[error("it is not player {0}'s turn")]
    NotPlayersTurn(PlayerId),
    #[error("the game is not in progress")]
    GameNotInProgress,
    /// Games support 2 to 4 players.
    #[error("a game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),
    #[error("rack index {0} is invalid")]
    InvalidRackIndex(usize),
    #[error("player {0}'s rack is full")]
    RackFull(PlayerId),
    #[error("rack tile {0} is not a blank")]
    NotBlankRackTile(usize),
    #[error("the tile at ({x}, {y}) is not a blank")]
    NotBlankTile { x: usize, y: usize },
    #[error("the tile at ({x}, {y}) does not belong to player {player}")]
    NotTileOwner { x: usize, y: usize, player: PlayerId },
    /// Only tiles placed during the current turn can be taken back.
    #[error("the tile at ({x}, {y}) was not placed this turn")]
    NotPlacedThisTurn { x: usize, y: usize },
    #[error("the tile at ({x}, {y}) is part of a claimed word")]
    TileInClaimedWord { x: usize, y: usize },
    #[error("the blank tile at ({x}, {y}) is already locked")]
    BlankTileLocked { x: usize, y: usize },
    /// Blank tiles may only represent the letters A to Z.
    #[error("'{0}' is not a letter from A to Z")]
    InvalidLetter(char),
    #[error("hint level {0} is invalid, expected 0 to 4")]
    InvalidHintLevel(u8),
    /// A serialized game could not be turned back into a valid game state.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a word claim was refused.
///
/// These are ordinary game outcomes, so they are reported to the caller instead of being raised
/// as errors.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ClaimRejection {
    /// The positions do not form one straight, gap-free line.
    NotStraightLine,
    /// Fewer than three positions were claimed.
    TooShort,
    NotInDictionary(String),
    /// The same word at the same positions is already in the ledger, or was claimed twice in one
    /// submission.
    AlreadyClaimed(String),
    /// The claim lies inside a longer run in the same direction that is not a word.
    CreatesInvalidSuperstring { word: String, superstring: String },
    NoTilesPlacedThisTurn,
}

impl fmt::Display for ClaimRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimRejection::NotStraightLine => write!(f, "the tiles are not in a straight line"),
            ClaimRejection::TooShort => write!(f, "words need at least three letters"),
            ClaimRejection::NotInDictionary(word) => write!(f, "{word} is not in the dictionary"),
            ClaimRejection::AlreadyClaimed(word) => write!(f, "{word} was already claimed there"),
            ClaimRejection::CreatesInvalidSuperstring { word, superstring } => write!(
                f,
                "{word} is part of {superstring}, which is not a word"
            ),
            ClaimRejection::NoTilesPlacedThisTurn => {
                write!(f, "place at least one tile before claiming words")
            }
        }
    }
}

/// The bonuses a claimed word can earn. Each one doubles the word's score.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    /// The word runs at 45 degrees.
    Diagonal,
    /// The word reads the same in both directions.
    Palindrome,
    /// The word read backwards is a different dictionary word.
    Emordnilap,
}

impl Bonus {
    pub fn name(&self) -> &'static str {
        match self {
            Bonus::Diagonal => "diagonal",
            Bonus::Palindrome => "palindrome",
            Bonus::Emordnilap => "emordnilap",
        }
    }
}

impl fmt::Display for Bonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The score of a single word, with the bonuses that were applied to it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WordScore {
    pub word: String,
    /// Sum of the point values of the tiles in the word.
    pub base: u32,
    pub bonuses: Vec<Bonus>,
    /// `base * 2^bonuses.len()`.
    pub total: u32,
}

impl WordScore {
    pub fn multiplier(&self) -> u32 {
        1 << self.bonuses.len()
    }
}

/// The validation result of one claim within a submission.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClaimCheck {
    pub positions: Vec<Position>,
    pub result: Result<WordScore, ClaimRejection>,
}

impl ClaimCheck {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

/// A word that has been scored, as recorded in the game's ledger.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ClaimedWord {
    pub word: String,
    /// The positions of the word at the time it was claimed, in reading order.
    pub positions: Vec<Position>,
    pub player: PlayerId,
    pub score: u32,
    pub bonuses: Vec<Bonus>,
}

/// The outcome of submitting a set of word claims.
///
/// Submissions are all-or-nothing: either every claim was scored, or none were.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SubmissionOutcome {
    /// Every claim was valid. Contains the ledger entries that were added, in claim order.
    Accepted(Vec<ClaimedWord>),
    /// Nothing was scored. `reason` is the first problem found and `checks` holds one entry per
    /// claim, so callers can report exactly which claims failed.
    Rejected {
        reason: ClaimRejection,
        checks: Vec<ClaimCheck>,
    },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted(_))
    }

    /// The total number of points awarded by this submission.
    pub fn points(&self) -> u32 {
        match self {
            SubmissionOutcome::Accepted(words) => words.iter().map(|word| word.score).sum(),
            SubmissionOutcome::Rejected { .. } => 0,
        }
    }
}

/// Whether the game is still being played.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}
