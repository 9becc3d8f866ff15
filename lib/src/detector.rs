use crate::board::Board;
use crate::geometry::{line_direction, sort_row_major, Direction, Position, MIN_WORD_LENGTH};
use std::collections::HashSet;

/// A straight run of tiles found on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordSegment {
    /// The positions of the run, in the order of `direction`.
    pub positions: Vec<Position>,
    pub direction: Direction,
    /// The letters of the run, read in the order of `direction`.
    pub word: String,
}

/// Returns the maximal run of occupied cells through `origin` along `direction`, in the order of
/// `direction`. Returns an empty run if `origin` is empty.
///
/// `origin` need not be the start of the run: the run is extended backwards first.
pub fn line_through(board: &Board, origin: Position, direction: Direction) -> Vec<Position> {
    if !board.is_occupied(origin) {
        return Vec::new();
    }
    let mut start = origin;
    while let Some(previous) = start.step(direction.opposite()) {
        if !board.is_occupied(previous) {
            break;
        }
        start = previous;
    }
    walk_run(board, start, direction)
}

/// Collects occupied cells from `start` along `direction` until the first empty cell.
pub(crate) fn walk_run(board: &Board, start: Position, direction: Direction) -> Vec<Position> {
    let mut run = Vec::new();
    let mut current = Some(start);
    while let Some(position) = current {
        if !board.is_occupied(position) {
            break;
        }
        run.push(position);
        current = position.step(direction);
    }
    run
}

/// Finds every run of at least three tiles on the board.
///
/// Each run is reported once, in the canonical direction of its line, and only as a whole: a run
/// of five tiles is not also reported as its shorter sub-runs.
pub fn find_all_words(board: &Board) -> Vec<WordSegment> {
    let mut seen: HashSet<Vec<Position>> = HashSet::new();
    let mut segments = Vec::new();
    for (position, _) in board.tiles() {
        for direction in Direction::CANONICAL {
            let starts_run = position
                .step(direction.opposite())
                .map_or(true, |previous| !board.is_occupied(previous));
            if !starts_run {
                continue;
            }
            let run = walk_run(board, position, direction);
            if run.len() < MIN_WORD_LENGTH {
                continue;
            }
            let mut key = run.clone();
            sort_row_major(&mut key);
            if !seen.insert(key) {
                continue;
            }
            let word = extract_word_from_positions(board, &run, true);
            segments.push(WordSegment {
                positions: run,
                direction,
                word,
            });
        }
    }
    segments
}

/// Reads the letters at `positions`.
///
/// Blanks contribute their assigned letter, or a placeholder if they have none. Empty cells are
/// skipped. If `preserve_order` is false the positions are read in row-major order; otherwise they
/// are read in the order given, which keeps the direction a player traced the word in.
pub fn extract_word_from_positions(
    board: &Board,
    positions: &[Position],
    preserve_order: bool,
) -> String {
    let mut ordered = positions.to_vec();
    if !preserve_order {
        sort_row_major(&mut ordered);
    }
    ordered
        .iter()
        .filter_map(|position| board.get(*position).map(|tile| tile.word_char()))
        .collect()
}

/// Returns `true` iff `positions` are at least three cells forming a straight, gap-free
/// horizontal, vertical or diagonal line.
pub fn is_valid_word_line(positions: &[Position]) -> bool {
    positions.len() >= MIN_WORD_LENGTH && line_direction(positions).is_some()
}

/// Reads the letters at `positions` in the opposite order.
pub fn get_reverse_word(board: &Board, positions: &[Position]) -> String {
    let reversed: Vec<Position> = positions.iter().rev().copied().collect();
    extract_word_from_positions(board, &reversed, true)
}

/// Returns `true` iff any of `positions` is in `new_tiles`.
pub fn contains_new_tile(positions: &[Position], new_tiles: &[Position]) -> bool {
    positions.iter().any(|position| new_tiles.contains(position))
}

/// Returns `true` iff both lines run along the same orientation. A line and its reverse count as
/// the same direction.
pub fn are_words_same_direction(first: &[Position], second: &[Position]) -> bool {
    match (line_direction(first), line_direction(second)) {
        (Some(first), Some(second)) => first.canonical() == second.canonical(),
        _ => false,
    }
}

/// Returns `true` iff every cell of `inner` is also a cell of `outer` and `outer` is strictly
/// longer, i.e. `inner` is a proper sub-run of `outer` when both lie on the same line.
pub fn is_substring_word(inner: &[Position], outer: &[Position]) -> bool {
    inner.len() < outer.len() && inner.iter().all(|position| outer.contains(position))
}
