use rs_wordfall::*;

fn tile(letter: char) -> Tile {
    Tile::from_letter(letter).unwrap()
}

fn board_from_rows(rows: &[&str]) -> Result<Board, GameError> {
    let mut board = Board::new();
    let offset = BOARD_SIZE - rows.len();
    for (row_index, row) in rows.iter().enumerate() {
        for (x, letter) in row.chars().enumerate() {
            if letter != '.' {
                board.place_tile_at_position(x, row_index + offset, tile(letter), 1)?;
            }
        }
    }
    Ok(board)
}

/// Plays `solution` on a copy of `board` and checks that its word claim is valid there.
fn check_solution(
    board: &Board,
    rack: &[Tile],
    solution: &HintSolution,
    dictionary: &Trie,
) -> Result<WordScore, GameError> {
    let mut board = board.clone();
    let drops: Vec<(usize, Tile)> = solution
        .placements
        .iter()
        .map(|placement| -> Result<(usize, Tile), GameError> {
            let mut placed = rack[placement.rack_index];
            if let (true, Some(letter)) = (placed.is_blank(), placement.blank_letter) {
                placed = Tile::Blank(BlankTile::with_state(Some(letter), false)?);
            }
            Ok((placement.column, placed))
        })
        .collect::<Result<Vec<(usize, Tile)>, GameError>>()?;
    let landed = board.place_tiles(&drops, 0)?;
    let claim = solution.to_claim(0);
    Ok(validate_word_claim(&board, &[], &claim, &landed, dictionary)
        .expect("the hinted claim to be valid"))
}

#[test]
fn single_tile_solution_extends_a_diagonal() -> Result<(), GameError> {
    let board = board_from_rows(&[
        ".OX", //
        "DXX", //
    ])?;
    let dictionary = Trie::from_iterator(["dog"]);
    let rack = vec![tile('G'), tile('Q')];

    let solution = find_first_valid_word(&board, &rack, &dictionary).expect("a solution");

    assert_eq!(solution.word, "DOG");
    assert_eq!(solution.direction, Direction::UpRight);
    assert_eq!(solution.columns(), vec![2]);
    let score = check_solution(&board, &rack, &solution, &dictionary)?;
    assert_eq!(score.bonuses, vec![Bonus::Diagonal]);
    assert_eq!(score.total, 2 * (2 + 1 + 2));
    Ok(())
}

#[test]
fn solution_reads_the_whole_run() -> Result<(), GameError> {
    let board = board_from_rows(&["CA.S"])?;
    let dictionary = Trie::from_iterator(["cat", "cats"]);
    let rack = vec![tile('T')];

    let solution = find_first_valid_word(&board, &rack, &dictionary).expect("a solution");

    assert_eq!(solution.word, "CATS");
    assert_eq!(solution.positions.len(), 4);
    check_solution(&board, &rack, &solution, &dictionary)?;
    Ok(())
}

#[test]
fn blank_solution_is_playable() -> Result<(), GameError> {
    let board = board_from_rows(&["DO"])?;
    let dictionary = Trie::from_iterator(["dog"]);
    let rack = vec![tile('Q'), Tile::blank()];

    let solution = find_first_valid_word(&board, &rack, &dictionary).expect("a solution");

    assert_eq!(solution.placements[0].blank_letter, Some('G'));
    let score = check_solution(&board, &rack, &solution, &dictionary)?;
    assert_eq!(score.base, 2 + 1);
    Ok(())
}

#[test]
fn two_tile_solution_is_playable() -> Result<(), GameError> {
    let board = board_from_rows(&["D"])?;
    let dictionary = Trie::from_iterator(["dog"]);
    let rack = vec![tile('G'), tile('O')];

    let solution = find_first_valid_word(&board, &rack, &dictionary).expect("a solution");

    assert_eq!(solution.placements.len(), 2);
    assert_eq!(solution.word, "DOG");
    check_solution(&board, &rack, &solution, &dictionary)?;
    Ok(())
}

#[test]
fn no_solution_leads_to_swap_hint() {
    let dictionary = Trie::from_iterator(["dog"]);
    let rack = vec![tile('E'), tile('Z'), tile('Q'), tile('S'), Tile::blank()];

    let solution = find_first_valid_word(&Board::new(), &rack, &dictionary);
    let hint = get_hint_at_level(solution.as_ref(), &rack, HintLevel::Tiles);

    assert!(!hint.has_moves);
    assert_eq!(hint.swap_indices, vec![2, 1, 3]);
    assert_eq!(
        hint.to_string(),
        "No word can be made. Consider swapping the tiles at 2, 1, 3."
    );
}
