use crate::board::Board;
use crate::detector::{extract_word_from_positions, line_through, walk_run};
use crate::engine::WordClaim;
use crate::game::ColumnPlacement;
use crate::geometry::{Direction, Position, BOARD_SIZE, MIN_WORD_LENGTH};
use crate::results::GameError;
use crate::tiles::{playability, PlayerId, Tile};
use crate::trie::WordLookup;
use rayon::prelude::*;
use std::fmt;
use tracing::debug;

/// The most rack tiles a swap suggestion names.
pub const MAX_SWAP_SUGGESTIONS: usize = 3;

/// How much of a move a hint gives away. Each level reveals everything the lower levels do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HintLevel {
    /// Only whether a move exists.
    MoveExists = 0,
    /// Which rack tiles to use.
    Tiles = 1,
    /// The word's length and first letter.
    Pattern = 2,
    /// Which columns to drop the tiles into.
    Columns = 3,
    /// The complete move.
    Solution = 4,
}

impl TryFrom<u8> for HintLevel {
    type Error = GameError;

    fn try_from(level: u8) -> Result<HintLevel, GameError> {
        match level {
            0 => Ok(HintLevel::MoveExists),
            1 => Ok(HintLevel::Tiles),
            2 => Ok(HintLevel::Pattern),
            3 => Ok(HintLevel::Columns),
            4 => Ok(HintLevel::Solution),
            other => Err(GameError::InvalidHintLevel(other)),
        }
    }
}

/// One tile of a suggested move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintPlacement {
    pub column: usize,
    pub rack_index: usize,
    /// The letter the tile shows once placed.
    pub letter: char,
    /// The letter to assign, if the tile is a blank.
    pub blank_letter: Option<char>,
}

/// A move the solver found: the tiles to drop and the word they complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintSolution {
    pub word: String,
    /// The cells of the word, in reading order.
    pub positions: Vec<Position>,
    pub direction: Direction,
    /// The drops to make, in order.
    pub placements: Vec<HintPlacement>,
}

impl HintSolution {
    pub fn columns(&self) -> Vec<usize> {
        self.placements.iter().map(|placement| placement.column).collect()
    }

    pub fn rack_indices(&self) -> Vec<usize> {
        self.placements
            .iter()
            .map(|placement| placement.rack_index)
            .collect()
    }

    /// The drops of this move, ready for [`crate::Game::play_turn`].
    pub fn to_column_placements(&self) -> Vec<ColumnPlacement> {
        self.placements
            .iter()
            .map(|placement| ColumnPlacement {
                column: placement.column,
                rack_index: placement.rack_index,
                blank_letter: placement.blank_letter,
            })
            .collect()
    }

    /// The claim for the word this move completes.
    pub fn to_claim(&self, player: PlayerId) -> WordClaim {
        WordClaim::new(self.positions.clone(), player)
    }
}

/// The cells on either side of an empty cell along a direction.
struct LineAround {
    before: Vec<Position>,
    cell: Position,
    after: Vec<Position>,
    prefix: String,
    suffix: String,
}

impl LineAround {
    fn new(board: &Board, cell: Position, direction: Direction) -> LineAround {
        let mut before = cell
            .step(direction.opposite())
            .map(|start| walk_run(board, start, direction.opposite()))
            .unwrap_or_default();
        before.reverse();
        let after = cell
            .step(direction)
            .map(|start| walk_run(board, start, direction))
            .unwrap_or_default();
        LineAround {
            prefix: extract_word_from_positions(board, &before, true),
            suffix: extract_word_from_positions(board, &after, true),
            before,
            cell,
            after,
        }
    }

    fn len(&self) -> usize {
        self.before.len() + 1 + self.after.len()
    }

    fn positions(&self) -> Vec<Position> {
        let mut positions = self.before.clone();
        positions.push(self.cell);
        positions.extend(&self.after);
        positions
    }
}

/// Looks for a move that completes a dictionary word.
///
/// The search is greedy and stops at the first word it finds. It tries, in order:
///
/// 1. Dropping one regular rack tile into any column.
/// 2. Dropping one blank, as each letter from A to Z.
/// 3. Dropping two different regular tiles, into the same column or two columns.
///
/// For each drop it reads the whole run through the new tile in all eight directions.
pub fn find_first_valid_word<D>(board: &Board, rack: &[Tile], dictionary: &D) -> Option<HintSolution>
where
    D: WordLookup + Sync + ?Sized,
{
    let solution = find_single_tile_word(board, rack, dictionary, false)
        .or_else(|| find_single_tile_word(board, rack, dictionary, true))
        .or_else(|| find_two_tile_word(board, rack, dictionary));
    debug!(found = ?solution.as_ref().map(|solution| &solution.word), "hint search finished");
    solution
}

fn find_single_tile_word<D>(
    board: &Board,
    rack: &[Tile],
    dictionary: &D,
    blanks: bool,
) -> Option<HintSolution>
where
    D: WordLookup + ?Sized,
{
    if !rack.iter().any(|tile| tile.is_blank() == blanks) {
        return None;
    }
    for column in 0..BOARD_SIZE {
        let row = match board.landing_row(column) {
            Some(row) => row,
            None => continue,
        };
        for direction in Direction::ALL {
            let line = LineAround::new(board, Position::new(column, row), direction);
            if line.len() < MIN_WORD_LENGTH {
                continue;
            }
            for (rack_index, tile) in rack.iter().enumerate() {
                let letters: Vec<char> = match tile {
                    Tile::Regular { letter, .. } if !blanks => vec![*letter],
                    Tile::Blank(_) if blanks => ('A'..='Z').collect(),
                    _ => continue,
                };
                for letter in letters {
                    let mut word = line.prefix.clone();
                    word.push(letter);
                    if !dictionary.contains_prefix(&word) {
                        continue;
                    }
                    word.push_str(&line.suffix);
                    if dictionary.contains_word(&word) {
                        return Some(HintSolution {
                            word,
                            positions: line.positions(),
                            direction,
                            placements: vec![HintPlacement {
                                column,
                                rack_index,
                                letter,
                                blank_letter: blanks.then_some(letter),
                            }],
                        });
                    }
                }
            }
        }
    }
    None
}

fn find_two_tile_word<D>(board: &Board, rack: &[Tile], dictionary: &D) -> Option<HintSolution>
where
    D: WordLookup + Sync + ?Sized,
{
    let regular: Vec<(usize, Tile)> = rack
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, tile)| !tile.is_blank())
        .collect();
    if regular.len() < 2 {
        return None;
    }
    (0..BOARD_SIZE)
        .into_par_iter()
        .filter(|&first_column| board.landing_row(first_column).is_some())
        .find_map_first(|first_column| {
            for second_column in 0..BOARD_SIZE {
                for &(first_index, first_tile) in &regular {
                    for &(second_index, second_tile) in &regular {
                        if first_index == second_index {
                            continue;
                        }
                        let mut trial = board.clone();
                        let landed = match trial.place_tiles(
                            &[(first_column, first_tile), (second_column, second_tile)],
                            0,
                        ) {
                            Ok(landed) => landed,
                            Err(_) => continue,
                        };
                        for cell in &landed {
                            for direction in Direction::ALL {
                                let line = line_through(&trial, *cell, direction);
                                if line.len() < MIN_WORD_LENGTH {
                                    continue;
                                }
                                let word = extract_word_from_positions(&trial, &line, true);
                                if dictionary.contains_word(&word) {
                                    return Some(HintSolution {
                                        word,
                                        positions: line,
                                        direction,
                                        placements: vec![
                                            HintPlacement {
                                                column: first_column,
                                                rack_index: first_index,
                                                letter: first_tile.word_char(),
                                                blank_letter: None,
                                            },
                                            HintPlacement {
                                                column: second_column,
                                                rack_index: second_index,
                                                letter: second_tile.word_char(),
                                                blank_letter: None,
                                            },
                                        ],
                                    });
                                }
                            }
                        }
                    }
                }
            }
            None
        })
}

/// Returns the indices of up to three rack tiles that are least likely to be useful, least
/// playable first.
pub fn get_swap_suggestion(rack: &[Tile]) -> Vec<usize> {
    let mut ranked: Vec<(u32, usize)> = rack
        .iter()
        .enumerate()
        .map(|(index, tile)| (playability(tile), index))
        .collect();
    ranked.sort_unstable();
    ranked
        .into_iter()
        .take(MAX_SWAP_SUGGESTIONS)
        .map(|(_, index)| index)
        .collect()
}

/// What a player is told when they ask for help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub level: HintLevel,
    pub has_moves: bool,
    pub suggest_swap: bool,
    /// Rack tiles worth swapping when there is no move.
    pub swap_indices: Vec<usize>,
    /// From [`HintLevel::Tiles`] up.
    pub rack_indices: Option<Vec<usize>>,
    /// From [`HintLevel::Tiles`] up.
    pub letters: Option<Vec<char>>,
    /// The first letter followed by one `_` per remaining letter. From [`HintLevel::Pattern`] up.
    pub pattern: Option<String>,
    /// From [`HintLevel::Columns`] up.
    pub columns: Option<Vec<usize>>,
    /// Only at [`HintLevel::Solution`].
    pub solution: Option<HintSolution>,
}

/// Reveals as much of `solution` as `level` allows, or suggests tiles to swap if there is no
/// solution.
pub fn get_hint_at_level(solution: Option<&HintSolution>, rack: &[Tile], level: HintLevel) -> Hint {
    let solution = match solution {
        Some(solution) => solution,
        None => {
            let swap_indices = get_swap_suggestion(rack);
            return Hint {
                level,
                has_moves: false,
                suggest_swap: !swap_indices.is_empty(),
                swap_indices,
                rack_indices: None,
                letters: None,
                pattern: None,
                columns: None,
                solution: None,
            };
        }
    };

    let reveal = |from: HintLevel| level >= from;
    Hint {
        level,
        has_moves: true,
        suggest_swap: false,
        swap_indices: Vec::new(),
        rack_indices: reveal(HintLevel::Tiles).then(|| solution.rack_indices()),
        letters: reveal(HintLevel::Tiles).then(|| {
            solution
                .placements
                .iter()
                .map(|placement| placement.letter)
                .collect()
        }),
        pattern: reveal(HintLevel::Pattern).then(|| mask_word(&solution.word)),
        columns: reveal(HintLevel::Columns).then(|| solution.columns()),
        solution: reveal(HintLevel::Solution).then(|| solution.clone()),
    }
}

fn mask_word(word: &str) -> String {
    word.chars()
        .enumerate()
        .map(|(index, letter)| if index == 0 { letter } else { '_' })
        .collect()
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_moves {
            if self.suggest_swap {
                return write!(
                    f,
                    "No word can be made. Consider swapping the tiles at {}.",
                    join(&self.swap_indices)
                );
            }
            return write!(f, "No word can be made.");
        }
        if let Some(solution) = &self.solution {
            let drops: Vec<String> = solution
                .placements
                .iter()
                .map(|placement| format!("{} into column {}", placement.letter, placement.column))
                .collect();
            return write!(
                f,
                "Drop {} to make {} ({:?}).",
                drops.join(", then "),
                solution.word,
                solution.direction
            );
        }
        write!(f, "A word can be made")?;
        if let Some(letters) = &self.letters {
            write!(f, " using {}", join(letters))?;
        }
        if let Some(pattern) = &self.pattern {
            write!(f, ", shaped like {pattern}")?;
        }
        if let Some(columns) = &self.columns {
            write!(f, ", in columns {}", join(columns))?;
        }
        write!(f, ".")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trie::Trie;

    fn tile(letter: char) -> Tile {
        Tile::from_letter(letter).unwrap()
    }

    fn rack(letters: &str) -> Vec<Tile> {
        letters.chars().map(tile).collect()
    }

    fn board_with_bottom_row(word: &str) -> Board {
        let mut board = Board::new();
        let drops: Vec<(usize, Tile)> = word.chars().map(tile).enumerate().collect();
        board.place_tiles(&drops, 1).unwrap();
        board
    }

    #[test]
    fn hint_levels_from_integers() {
        assert_eq!(HintLevel::try_from(0).unwrap(), HintLevel::MoveExists);
        assert_eq!(HintLevel::try_from(4).unwrap(), HintLevel::Solution);
        assert!(matches!(
            HintLevel::try_from(5),
            Err(GameError::InvalidHintLevel(5))
        ));
    }

    #[test]
    fn finds_single_tile_word() {
        let board = board_with_bottom_row("CA");
        let dictionary = Trie::from_iterator(["cat"]);

        let solution = find_first_valid_word(&board, &rack("XT"), &dictionary);

        assert_eq!(
            solution,
            Some(HintSolution {
                word: "CAT".to_string(),
                positions: vec![Position::new(0, 6), Position::new(1, 6), Position::new(2, 6)],
                direction: Direction::Right,
                placements: vec![HintPlacement {
                    column: 2,
                    rack_index: 1,
                    letter: 'T',
                    blank_letter: None,
                }],
            })
        );
    }

    #[test]
    fn regular_tiles_are_tried_before_blanks() {
        let board = board_with_bottom_row("CA");
        let dictionary = Trie::from_iterator(["cab", "cat"]);
        let mut tiles = vec![Tile::blank()];
        tiles.extend(rack("T"));

        let solution = find_first_valid_word(&board, &tiles, &dictionary).unwrap();

        assert_eq!(solution.word, "CAT");
        assert_eq!(solution.rack_indices(), vec![1]);
    }

    #[test]
    fn blank_tries_every_letter() {
        let board = board_with_bottom_row("CA");
        let dictionary = Trie::from_iterator(["cat"]);

        let solution = find_first_valid_word(&board, &[Tile::blank()], &dictionary).unwrap();

        assert_eq!(solution.word, "CAT");
        assert_eq!(solution.placements[0].blank_letter, Some('T'));
        assert_eq!(
            solution.to_column_placements(),
            vec![ColumnPlacement::new(2, 0).with_blank_letter('T')]
        );
    }

    #[test]
    fn falls_back_to_two_tiles() {
        let board = board_with_bottom_row("C");
        let dictionary = Trie::from_iterator(["cat"]);

        let solution = find_first_valid_word(&board, &rack("TA"), &dictionary).unwrap();

        assert_eq!(solution.word, "CAT");
        assert_eq!(solution.direction, Direction::Up);
        assert_eq!(
            solution.positions,
            vec![Position::new(0, 6), Position::new(0, 5), Position::new(0, 4)]
        );
        assert_eq!(solution.columns(), vec![0, 0]);
        assert_eq!(solution.rack_indices(), vec![1, 0]);
    }

    #[test]
    fn nothing_fits_on_an_empty_board() {
        let dictionary = Trie::from_iterator(["cat", "dog"]);
        let tiles = rack("QZVXJKW");

        let solution = find_first_valid_word(&Board::new(), &tiles, &dictionary);
        assert_eq!(solution, None);

        let hint = get_hint_at_level(None, &tiles, HintLevel::Solution);
        assert!(!hint.has_moves);
        assert!(hint.suggest_swap);
        assert_eq!(hint.swap_indices, vec![0, 4, 1]);
        assert_eq!(hint.solution, None);
    }

    #[test]
    fn swap_suggestion_keeps_blanks() {
        let mut tiles = rack("EQ");
        tiles.push(Tile::blank());
        tiles.extend(rack("AS"));

        assert_eq!(get_swap_suggestion(&tiles), vec![1, 4, 3]);
        assert_eq!(get_swap_suggestion(&rack("Q")), vec![0]);
        assert!(get_swap_suggestion(&[]).is_empty());
    }

    #[test]
    fn levels_reveal_progressively() {
        let board = board_with_bottom_row("CA");
        let dictionary = Trie::from_iterator(["cat"]);
        let tiles = rack("XT");
        let solution = find_first_valid_word(&board, &tiles, &dictionary);

        let hint = get_hint_at_level(solution.as_ref(), &tiles, HintLevel::MoveExists);
        assert!(hint.has_moves);
        assert_eq!(hint.rack_indices, None);
        assert_eq!(hint.to_string(), "A word can be made.");

        let hint = get_hint_at_level(solution.as_ref(), &tiles, HintLevel::Pattern);
        assert_eq!(hint.letters, Some(vec!['T']));
        assert_eq!(hint.pattern.as_deref(), Some("C__"));
        assert_eq!(hint.columns, None);

        let hint = get_hint_at_level(solution.as_ref(), &tiles, HintLevel::Columns);
        assert_eq!(hint.columns, Some(vec![2]));
        assert_eq!(hint.solution, None);
        assert_eq!(
            hint.to_string(),
            "A word can be made using T, shaped like C__, in columns 2."
        );

        let hint = get_hint_at_level(solution.as_ref(), &tiles, HintLevel::Solution);
        assert_eq!(hint.solution, solution);
    }
}
