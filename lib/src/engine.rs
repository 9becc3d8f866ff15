use crate::board::Board;
use crate::detector::*;
use crate::game::GameState;
use crate::geometry::{line_direction, sort_row_major, Position, MIN_WORD_LENGTH};
use crate::results::*;
use crate::tiles::{PlayerId, Tile};
use crate::trie::WordLookup;
use std::collections::HashSet;
use tracing::{info, warn};

/// A player's declaration that a straight run of tiles is a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordClaim {
    /// The claimed cells, in the order the player read the word.
    pub positions: Vec<Position>,
    pub player: PlayerId,
}

impl WordClaim {
    pub fn new(positions: Vec<Position>, player: PlayerId) -> WordClaim {
        WordClaim { positions, player }
    }
}

/// Scores the word at `positions`, read in the order given.
///
/// The base score is the sum of the tiles' points. It is doubled once for each bonus that applies:
///
/// * [`Bonus::Diagonal`] if the first and last cells differ in both row and column.
/// * [`Bonus::Palindrome`] if the word equals its reverse.
/// * [`Bonus::Emordnilap`] if the reverse is a different dictionary word.
///
/// A palindrome can never also be an emordnilap, so the largest multiplier is 8.
pub fn calculate_word_score<D>(board: &Board, positions: &[Position], dictionary: &D) -> WordScore
where
    D: WordLookup + ?Sized,
{
    let word = extract_word_from_positions(board, positions, true).to_uppercase();
    let reverse = get_reverse_word(board, positions).to_uppercase();
    let base: u32 = positions
        .iter()
        .filter_map(|position| board.get(*position))
        .map(Tile::points)
        .sum();

    let mut bonuses = Vec::new();
    if let (Some(start), Some(end)) = (positions.first(), positions.last()) {
        if start.x != end.x && start.y != end.y {
            bonuses.push(Bonus::Diagonal);
        }
    }
    if is_palindrome(&word) {
        bonuses.push(Bonus::Palindrome);
    } else if reverse != word && dictionary.contains_word(&reverse) {
        bonuses.push(Bonus::Emordnilap);
    }

    let total = base << bonuses.len();
    WordScore {
        word,
        base,
        bonuses,
        total,
    }
}

/// Returns `true` iff `word` reads the same forwards and backwards.
pub fn is_palindrome(word: &str) -> bool {
    word.chars().eq(word.chars().rev())
}

fn position_set(positions: &[Position]) -> Vec<Position> {
    let mut sorted = positions.to_vec();
    sort_row_major(&mut sorted);
    sorted
}

/// Checks a single claim against the board, the ledger of claimed words and the dictionary, and
/// scores it if it is valid.
///
/// `newly_placed` holds the cells placed this turn. A claim is refused if it sits inside a longer
/// run in the same direction that includes a new tile and is not itself a word.
pub fn validate_word_claim<D>(
    board: &Board,
    ledger: &[ClaimedWord],
    claim: &WordClaim,
    newly_placed: &[Position],
    dictionary: &D,
) -> Result<WordScore, ClaimRejection>
where
    D: WordLookup + ?Sized,
{
    if claim.positions.len() < MIN_WORD_LENGTH {
        return Err(ClaimRejection::TooShort);
    }
    let direction = line_direction(&claim.positions).ok_or(ClaimRejection::NotStraightLine)?;
    if !is_valid_word_line(&claim.positions)
        || claim.positions.iter().any(|position| !board.is_occupied(*position))
    {
        return Err(ClaimRejection::NotStraightLine);
    }

    let word = extract_word_from_positions(board, &claim.positions, true).to_uppercase();
    if !dictionary.contains_word(&word) {
        return Err(ClaimRejection::NotInDictionary(word));
    }

    let claimed_set = position_set(&claim.positions);
    if ledger
        .iter()
        .any(|entry| entry.word == word && position_set(&entry.positions) == claimed_set)
    {
        return Err(ClaimRejection::AlreadyClaimed(word));
    }

    for segment in find_all_words(board) {
        if !contains_new_tile(&segment.positions, newly_placed)
            || !are_words_same_direction(&segment.positions, &claim.positions)
            || !is_substring_word(&claim.positions, &segment.positions)
        {
            continue;
        }
        // Read the longer run the same way the claim was read.
        let superstring = if segment.direction == direction {
            segment.word
        } else {
            segment.word.chars().rev().collect()
        };
        if !dictionary.contains_word(&superstring) {
            return Err(ClaimRejection::CreatesInvalidSuperstring { word, superstring });
        }
    }

    Ok(calculate_word_score(board, &claim.positions, dictionary))
}

/// Validates and scores a submission of claims as a unit.
///
/// If no tile was placed this turn, or any claim is invalid, nothing is recorded. Otherwise every
/// claim is added to the ledger in order, its player's score is increased, and any blank tiles in
/// the claimed words are locked.
pub fn process_word_claims<D>(
    state: &mut GameState,
    claims: &[WordClaim],
    newly_placed: &[Position],
    dictionary: &D,
) -> Result<SubmissionOutcome, GameError>
where
    D: WordLookup + ?Sized,
{
    for claim in claims {
        state.player(claim.player)?;
    }
    if newly_placed.is_empty() {
        warn!("rejected claims: no tiles placed this turn");
        return Ok(SubmissionOutcome::Rejected {
            reason: ClaimRejection::NoTilesPlacedThisTurn,
            checks: Vec::new(),
        });
    }

    let mut seen: HashSet<(String, Vec<Position>)> = HashSet::new();
    let checks: Vec<ClaimCheck> = claims
        .iter()
        .map(|claim| {
            let result =
                validate_word_claim(&state.board, &state.claimed_words, claim, newly_placed, dictionary)
                    .and_then(|score| {
                        if seen.insert((score.word.clone(), position_set(&claim.positions))) {
                            Ok(score)
                        } else {
                            Err(ClaimRejection::AlreadyClaimed(score.word))
                        }
                    });
            ClaimCheck {
                positions: claim.positions.clone(),
                result,
            }
        })
        .collect();

    if let Some(reason) = checks
        .iter()
        .find_map(|check| check.result.as_ref().err().cloned())
    {
        warn!(%reason, "rejected claim submission");
        return Ok(SubmissionOutcome::Rejected { reason, checks });
    }

    let mut scored = Vec::with_capacity(claims.len());
    for (claim, check) in claims.iter().zip(checks) {
        let score = match check.result {
            Ok(score) => score,
            Err(_) => continue,
        };
        for position in &claim.positions {
            if let Some(Tile::Blank(blank)) = state.board.tile_mut(*position) {
                blank.lock();
            }
        }
        state.player_mut(claim.player)?.score += score.total;
        let entry = ClaimedWord {
            word: score.word,
            positions: claim.positions.clone(),
            player: claim.player,
            score: score.total,
            bonuses: score.bonuses,
        };
        info!(
            player = entry.player,
            word = %entry.word,
            score = entry.score,
            "scored word"
        );
        state.claimed_words.push(entry.clone());
        scored.push(entry);
    }
    Ok(SubmissionOutcome::Accepted(scored))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::{GameState, Player};
    use crate::trie::Trie;

    fn tile(letter: char) -> Tile {
        Tile::from_letter(letter).unwrap()
    }

    fn row(y: usize, xs: std::ops::Range<usize>) -> Vec<Position> {
        xs.map(|x| Position::new(x, y)).collect()
    }

    /// Writes `word` along the bottom row starting at column 0.
    fn bottom_row_board(word: &str) -> Board {
        let mut board = Board::new();
        for (x, letter) in word.chars().enumerate() {
            board.place_tile_at_position(x, 6, tile(letter), 0).unwrap();
        }
        board
    }

    fn two_player_state(board: Board) -> GameState {
        GameState {
            board,
            players: vec![
                Player::new(0, "Ada".to_string(), 0),
                Player::new(1, "Grace".to_string(), 1),
            ],
            current_player: 0,
            bag: Vec::new(),
            claimed_words: Vec::new(),
            target_score: 100,
            status: GameStatus::Playing,
            winner: None,
        }
    }

    #[test]
    fn vertical_cat_scores_base_only() -> Result<(), GameError> {
        let mut board = Board::new();
        let mut placed = Vec::new();
        for letter in ['C', 'A', 'T'] {
            placed.extend(board.place_tiles(&[(0, tile(letter))], 0)?);
        }
        let dictionary = Trie::from_iterator(["cat"]);
        // Read from the bottom up, in the order the tiles were dropped.
        let claim = WordClaim::new(
            vec![Position::new(0, 6), Position::new(0, 5), Position::new(0, 4)],
            0,
        );

        let score = validate_word_claim(&board, &[], &claim, &placed, &dictionary);

        assert_eq!(
            score,
            Ok(WordScore {
                word: "CAT".to_string(),
                base: 5,
                bonuses: vec![],
                total: 5,
            })
        );
        Ok(())
    }

    #[test]
    fn horizontal_palindrome_doubles() {
        let board = bottom_row_board("RACECAR");
        let dictionary = Trie::from_iterator(["racecar"]);

        let score = calculate_word_score(&board, &row(6, 0..7), &dictionary);

        assert_eq!(score.base, 11);
        assert_eq!(score.bonuses, vec![Bonus::Palindrome]);
        assert_eq!(score.total, 22);
    }

    #[test]
    fn emordnilap_needs_a_different_dictionary_reverse() {
        let board = bottom_row_board("STOP");
        let with_reverse = Trie::from_iterator(["stop", "pots"]);
        let without_reverse = Trie::from_iterator(["stop"]);

        let score = calculate_word_score(&board, &row(6, 0..4), &with_reverse);
        assert_eq!(score.bonuses, vec![Bonus::Emordnilap]);
        assert_eq!(score.total, 2 * score.base);

        let score = calculate_word_score(&board, &row(6, 0..4), &without_reverse);
        assert!(score.bonuses.is_empty());
    }

    #[test]
    fn palindromes_are_never_emordnilaps() {
        for word in ["LEVEL", "NOON", "RADAR", "STOP", "WORD"] {
            let reverse: String = word.chars().rev().collect();
            assert_eq!(is_palindrome(word), is_palindrome(&reverse));
        }
        let board = bottom_row_board("NOON");
        let dictionary = Trie::from_iterator(["noon"]);

        let score = calculate_word_score(&board, &row(6, 0..4), &dictionary);

        assert_eq!(score.bonuses, vec![Bonus::Palindrome]);
    }

    #[test]
    fn diagonal_emordnilap_reaches_times_eight() -> Result<(), GameError> {
        let mut board = Board::new();
        let diagonal = [
            Position::new(0, 3),
            Position::new(1, 4),
            Position::new(2, 5),
            Position::new(3, 6),
        ];
        for (position, letter) in diagonal.iter().zip(['D', 'R', 'A', 'W']) {
            for y in position.y + 1..7 {
                board.place_tile_at_position(position.x, y, tile('E'), 0)?;
            }
            board.place_tile_at_position(position.x, position.y, tile(letter), 0)?;
        }
        assert!(board.is_packed());
        let dictionary = Trie::from_iterator(["draw", "ward"]);

        let score = calculate_word_score(&board, &diagonal, &dictionary);

        assert_eq!(score.base, 2 + 1 + 1 + 4);
        assert_eq!(score.bonuses, vec![Bonus::Diagonal, Bonus::Emordnilap]);
        assert_eq!(score.multiplier(), 8);
        assert_eq!(score.total, 64);
        Ok(())
    }

    #[test]
    fn rejects_malformed_claims() {
        let board = bottom_row_board("CATS");
        let dictionary = Trie::from_iterator(["cat", "cats"]);
        let placed = [Position::new(3, 6)];

        let too_short = WordClaim::new(row(6, 0..2), 0);
        assert_eq!(
            validate_word_claim(&board, &[], &too_short, &placed, &dictionary),
            Err(ClaimRejection::TooShort)
        );

        let bent = WordClaim::new(
            vec![Position::new(0, 6), Position::new(1, 6), Position::new(1, 5)],
            0,
        );
        assert_eq!(
            validate_word_claim(&board, &[], &bent, &placed, &dictionary),
            Err(ClaimRejection::NotStraightLine)
        );

        let over_empty = WordClaim::new(row(6, 2..5), 0);
        assert_eq!(
            validate_word_claim(&board, &[], &over_empty, &placed, &dictionary),
            Err(ClaimRejection::NotStraightLine)
        );

        let unknown = WordClaim::new(row(6, 1..4), 0);
        assert_eq!(
            validate_word_claim(&board, &[], &unknown, &placed, &dictionary),
            Err(ClaimRejection::NotInDictionary("ATS".to_string()))
        );
    }

    #[test]
    fn rejects_sub_word_of_invalid_run_in_same_direction() {
        let board = bottom_row_board("CATE");
        let dictionary = Trie::from_iterator(["cat"]);
        let claim = WordClaim::new(row(6, 0..3), 0);

        assert_eq!(
            validate_word_claim(&board, &[], &claim, &[Position::new(3, 6)], &dictionary),
            Err(ClaimRejection::CreatesInvalidSuperstring {
                word: "CAT".to_string(),
                superstring: "CATE".to_string(),
            })
        );
        // Runs without a new tile are not checked.
        assert!(validate_word_claim(&board, &[], &claim, &[Position::new(0, 5)], &dictionary).is_ok());
    }

    #[test]
    fn allows_sub_word_of_valid_run() {
        let board = bottom_row_board("CATS");
        let dictionary = Trie::from_iterator(["cat", "cats"]);
        let claim = WordClaim::new(row(6, 0..3), 0);

        assert!(validate_word_claim(&board, &[], &claim, &[Position::new(3, 6)], &dictionary).is_ok());
    }

    #[test]
    fn ignores_invalid_perpendicular_runs() -> Result<(), GameError> {
        // CAT along the bottom, with the new T also starting the column T-X-Q.
        let mut board = bottom_row_board("CAT");
        board.place_tiles(&[(2, tile('X')), (2, tile('Q'))], 0)?;
        let dictionary = Trie::from_iterator(["cat"]);
        let claim = WordClaim::new(row(6, 0..3), 0);
        let placed = [Position::new(2, 6), Position::new(2, 5), Position::new(2, 4)];

        assert!(validate_word_claim(&board, &[], &claim, &placed, &dictionary).is_ok());
        Ok(())
    }

    #[test]
    fn process_word_claims_records_scores() -> Result<(), GameError> {
        let mut state = two_player_state(bottom_row_board("DOG"));
        let dictionary = Trie::from_iterator(["dog", "god"]);
        let claims = [WordClaim::new(row(6, 0..3), 1)];

        let outcome = process_word_claims(&mut state, &claims, &[Position::new(2, 6)], &dictionary)?;

        assert!(outcome.is_accepted());
        assert_eq!(outcome.points(), 10);
        assert_eq!(state.player(1)?.score(), 10);
        assert_eq!(state.claimed_words.len(), 1);
        assert_eq!(state.claimed_words[0].bonuses, vec![Bonus::Emordnilap]);
        Ok(())
    }

    #[test]
    fn process_word_claims_is_all_or_nothing() -> Result<(), GameError> {
        let mut board = bottom_row_board("CAT");
        for (y, letter) in [(5, 'X'), (4, 'Y'), (3, 'Z')] {
            board.place_tile_at_position(0, y, tile(letter), 0)?;
        }
        let mut state = two_player_state(board);
        let dictionary = Trie::from_iterator(["cat"]);
        let claims = [
            WordClaim::new(row(6, 0..3), 0),
            WordClaim::new(
                vec![Position::new(0, 3), Position::new(0, 4), Position::new(0, 5)],
                0,
            ),
        ];

        let outcome = process_word_claims(&mut state, &claims, &[Position::new(2, 6)], &dictionary)?;

        match outcome {
            SubmissionOutcome::Rejected { reason, checks } => {
                assert_eq!(reason, ClaimRejection::NotInDictionary("ZYX".to_string()));
                assert!(checks[0].is_valid());
                assert!(!checks[1].is_valid());
            }
            SubmissionOutcome::Accepted(_) => panic!("submission should be rejected"),
        }
        assert_eq!(state.player(0)?.score(), 0);
        assert!(state.claimed_words.is_empty());
        Ok(())
    }

    #[test]
    fn process_word_claims_rejects_repeats() -> Result<(), GameError> {
        let mut state = two_player_state(bottom_row_board("CAT"));
        let dictionary = Trie::from_iterator(["cat"]);
        let claims = [WordClaim::new(row(6, 0..3), 0)];
        let placed = [Position::new(2, 6)];

        assert!(process_word_claims(&mut state, &claims, &placed, &dictionary)?.is_accepted());
        let second = process_word_claims(&mut state, &claims, &placed, &dictionary)?;

        assert_eq!(
            second,
            SubmissionOutcome::Rejected {
                reason: ClaimRejection::AlreadyClaimed("CAT".to_string()),
                checks: vec![ClaimCheck {
                    positions: row(6, 0..3),
                    result: Err(ClaimRejection::AlreadyClaimed("CAT".to_string())),
                }],
            }
        );
        assert_eq!(state.player(0)?.score(), 5);

        let mut fresh = two_player_state(bottom_row_board("CAT"));
        let doubled = [claims[0].clone(), claims[0].clone()];
        let outcome = process_word_claims(&mut fresh, &doubled, &placed, &dictionary)?;
        assert!(!outcome.is_accepted());
        assert_eq!(fresh.player(0)?.score(), 0);
        Ok(())
    }

    #[test]
    fn process_word_claims_needs_a_new_tile() -> Result<(), GameError> {
        let mut state = two_player_state(bottom_row_board("CAT"));
        let dictionary = Trie::from_iterator(["cat"]);

        let outcome =
            process_word_claims(&mut state, &[WordClaim::new(row(6, 0..3), 0)], &[], &dictionary)?;

        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                reason: ClaimRejection::NoTilesPlacedThisTurn,
                checks: vec![],
            }
        );
        Ok(())
    }

    #[test]
    fn process_word_claims_checks_players_exist() {
        let mut state = two_player_state(bottom_row_board("CAT"));
        let dictionary = Trie::from_iterator(["cat"]);

        let result = process_word_claims(
            &mut state,
            &[WordClaim::new(row(6, 0..3), 3)],
            &[Position::new(0, 6)],
            &dictionary,
        );

        assert!(matches!(result, Err(GameError::PlayerNotFound(3))));
    }

    #[test]
    fn accepted_claims_lock_blanks() -> Result<(), GameError> {
        let mut board = bottom_row_board("C");
        let mut blank = crate::tiles::BlankTile::new();
        blank.assign('A')?;
        board.place_tile_at_position(1, 6, Tile::Blank(blank), 0)?;
        board.place_tile_at_position(2, 6, tile('T'), 0)?;
        let mut state = two_player_state(board);
        let dictionary = Trie::from_iterator(["cat"]);

        let outcome = process_word_claims(
            &mut state,
            &[WordClaim::new(row(6, 0..3), 0)],
            &[Position::new(1, 6)],
            &dictionary,
        )?;

        assert_eq!(outcome.points(), 4);
        assert_matches::assert_matches!(
            state.board.get(Position::new(1, 6)),
            Some(Tile::Blank(blank)) if blank.is_locked()
        );
        Ok(())
    }
}
