use crate::results::GameError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Identifies a player within a game. Players are numbered from 0.
pub type PlayerId = u8;

/// The maximum number of tiles a player may hold.
pub const RACK_SIZE: usize = 7;

/// The letter used to mark a blank tile in serialized form.
pub const BLANK_MARKER: char = '*';

/// The letter an unassigned blank contributes to a word. It never matches a dictionary word.
pub const BLANK_PLACEHOLDER: char = '?';

/// The number of copies and point value of each letter in a new tile bag.
///
/// Together with [`BLANK_COUNT`] blanks this makes up 100 tiles.
pub const LETTER_DISTRIBUTION: [(char, u8, u32); 26] = [
    ('A', 9, 1),
    ('B', 2, 3),
    ('C', 2, 3),
    ('D', 4, 2),
    ('E', 12, 1),
    ('F', 2, 4),
    ('G', 3, 2),
    ('H', 2, 4),
    ('I', 9, 1),
    ('J', 1, 8),
    ('K', 1, 5),
    ('L', 4, 1),
    ('M', 2, 3),
    ('N', 6, 1),
    ('O', 8, 1),
    ('P', 2, 3),
    ('Q', 1, 10),
    ('R', 6, 1),
    ('S', 4, 1),
    ('T', 6, 1),
    ('U', 4, 1),
    ('V', 2, 4),
    ('W', 2, 4),
    ('X', 1, 8),
    ('Y', 2, 4),
    ('Z', 1, 10),
];

/// The number of blank tiles in a new tile bag.
pub const BLANK_COUNT: u8 = 2;

/// A blank tile. It is worth no points and can stand in for any letter once one is assigned.
///
/// A locked blank always has an assigned letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlankTile {
    assigned: Option<char>,
    locked: bool,
}

impl BlankTile {
    pub fn new() -> BlankTile {
        BlankTile::default()
    }

    /// Constructs a blank with the given state, checking that the assignment is a valid letter and
    /// that a locked blank has one.
    pub fn with_state(assigned: Option<char>, locked: bool) -> Result<BlankTile, GameError> {
        let assigned = assigned.map(normalize_letter).transpose()?;
        if locked && assigned.is_none() {
            return Err(GameError::InvalidSnapshot(
                "a locked blank must have an assigned letter".to_string(),
            ));
        }
        Ok(BlankTile { assigned, locked })
    }

    pub fn assigned(&self) -> Option<char> {
        self.assigned
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Locks the blank. Blanks without an assigned letter stay unlocked.
    pub(crate) fn lock(&mut self) {
        if self.assigned.is_some() {
            self.locked = true;
        }
    }

    pub(crate) fn assign(&mut self, letter: char) -> Result<(), GameError> {
        self.assigned = Some(normalize_letter(letter)?);
        Ok(())
    }
}

/// A single game tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Regular { letter: char, points: u32 },
    Blank(BlankTile),
}

impl Tile {
    /// Creates a regular tile with the standard point value for `letter`.
    pub fn from_letter(letter: char) -> Result<Tile, GameError> {
        let letter = normalize_letter(letter)?;
        Ok(Tile::Regular {
            letter,
            points: letter_points(letter),
        })
    }

    pub fn blank() -> Tile {
        Tile::Blank(BlankTile::new())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Tile::Blank(_))
    }

    /// The letter this tile represents on the board, if it has one.
    pub fn letter(&self) -> Option<char> {
        match self {
            Tile::Regular { letter, .. } => Some(*letter),
            Tile::Blank(blank) => blank.assigned,
        }
    }

    /// The letter this tile contributes to a word, using [`BLANK_PLACEHOLDER`] for unassigned
    /// blanks.
    pub fn word_char(&self) -> char {
        self.letter().unwrap_or(BLANK_PLACEHOLDER)
    }

    pub fn points(&self) -> u32 {
        match self {
            Tile::Regular { points, .. } => *points,
            Tile::Blank(_) => 0,
        }
    }

    /// Returns a copy of this tile as it should sit in a rack or bag, with any blank assignment
    /// cleared.
    pub(crate) fn reset(self) -> Tile {
        match self {
            Tile::Blank(_) => Tile::blank(),
            regular => regular,
        }
    }
}

/// Uppercases `letter` and checks that it is in A to Z.
pub(crate) fn normalize_letter(letter: char) -> Result<char, GameError> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Ok(upper)
    } else {
        Err(GameError::InvalidLetter(letter))
    }
}

/// The standard point value of a letter, or 0 for anything outside A to Z.
pub fn letter_points(letter: char) -> u32 {
    LETTER_DISTRIBUTION
        .iter()
        .find(|(other, _, _)| *other == letter.to_ascii_uppercase())
        .map_or(0, |(_, _, points)| *points)
}

/// Builds the full, unshuffled tile bag.
pub fn full_tile_set() -> Vec<Tile> {
    let mut tiles: Vec<Tile> = LETTER_DISTRIBUTION
        .iter()
        .flat_map(|(letter, count, points)| {
            (0..*count).map(move |_| Tile::Regular {
                letter: *letter,
                points: *points,
            })
        })
        .collect();
    tiles.extend((0..BLANK_COUNT).map(|_| Tile::blank()));
    tiles
}

/// Builds and shuffles a new tile bag. The back of the bag is drawn first.
pub fn new_tile_bag<R: Rng + ?Sized>(rng: &mut R) -> Vec<Tile> {
    let mut bag = full_tile_set();
    // `shuffle` is an unbiased Fisher-Yates pass.
    bag.shuffle(rng);
    bag
}

/// How easily a tile can be used in a word. Higher is easier; blanks are the most playable.
pub fn playability(tile: &Tile) -> u32 {
    let letter = match tile {
        Tile::Blank(_) => return 100,
        Tile::Regular { letter, .. } => *letter,
    };
    match letter {
        'E' => 95,
        'A' => 90,
        'S' => 88,
        'R' | 'T' => 85,
        'I' | 'O' | 'N' => 82,
        'L' => 78,
        'D' => 72,
        'U' => 68,
        'C' | 'G' | 'M' | 'P' | 'H' => 60,
        'B' | 'Y' => 52,
        'F' | 'W' => 48,
        'K' => 40,
        'V' => 32,
        'X' => 24,
        'Z' => 18,
        'J' => 14,
        'Q' => 8,
        _ => 0,
    }
}
