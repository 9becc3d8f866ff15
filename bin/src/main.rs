use clap::{Parser, Subcommand};
use rs_wordfall::*;
use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Plays the wordfall tile game between computer players, or suggests a move for a rack.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to a file that contains the dictionary, with one word on each line.
    #[clap(short = 'f', long)]
    words_file: String,

    /// Number of players, from 2 to 4.
    #[clap(short, long, default_value_t = 2)]
    players: usize,

    /// Score needed to win.
    #[clap(short, long, default_value_t = DEFAULT_TARGET_SCORE)]
    target_score: u32,

    /// Seed for the tile bag. Picked at random if not given.
    #[clap(short, long)]
    seed: Option<u64>,

    /// Stop a game after this many turns.
    #[clap(short, long, default_value_t = 200)]
    max_turns: u32,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one game where every player follows the solver's hints.
    Autoplay,
    /// Play several games and summarize the results.
    Benchmark {
        #[clap(short, long, default_value_t = 20)]
        games: u32,
    },
    /// Suggest a move for a rack.
    Hint {
        /// The rack's letters. Use '*' for a blank.
        rack: String,
        /// How much to reveal, from 0 to 4.
        #[clap(short, long, default_value_t = 4)]
        level: u8,
        /// Board rows from top to bottom, using '.' for empty cells. Tiles fall to the bottom.
        #[clap(short, long)]
        board: Vec<String>,
    },
}

/// How a self-played game ended.
struct GameSummary {
    turns: u32,
    scores: Vec<(String, u32)>,
    winner: Option<String>,
    words: Vec<ClaimedWord>,
}

fn main() -> Result<(), GameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Instant::now();
    let args = Args::parse();
    println!("File: {}", args.words_file);

    let words_reader = io::BufReader::new(File::open(&args.words_file)?);
    let dictionary = Arc::new(Trie::from_reader(words_reader)?);
    println!("There are {} dictionary words.", dictionary.len());

    let seed = args.seed.unwrap_or_else(rand::random);
    let options = GameOptions::new(args.players)
        .with_target_score(args.target_score)
        .with_seed(seed);

    match args.command {
        Command::Autoplay => {
            println!("Seed: {seed}");
            let summary = play_game(dictionary, options, args.max_turns)?;
            print_summary(&summary);
        }
        Command::Benchmark { games } => run_benchmark(dictionary, options, args.max_turns, games)?,
        Command::Hint { rack, level, board } => print_hint(&dictionary, &rack, level, &board)?,
    }

    println!(
        "Command executed in {:.3}s.",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn play_game(
    dictionary: Arc<Trie>,
    options: GameOptions,
    max_turns: u32,
) -> Result<GameSummary, GameError> {
    let player_count = options.player_count;
    let mut game = Game::new(options, dictionary)?;
    let mut turns = 0;
    let mut idle_turns = 0;

    while game.status() == GameStatus::Playing && turns < max_turns {
        turns += 1;
        let player = game.current_player();
        let hint = game.get_hint(player, HintLevel::Solution as u8)?;

        if let Some(solution) = hint.solution {
            let outcome = game.play_turn(
                player,
                &solution.to_column_placements(),
                &[solution.to_claim(player)],
            )?;
            if outcome.is_accepted() {
                idle_turns = 0;
                continue;
            }
            warn!(player, word = %solution.word, ?outcome, "hinted move was rejected");
        }

        // Without a word to claim, build up the board so later turns have something to extend.
        let state = game.get_state();
        if let Some(drop) = choose_drop(&state, player)? {
            debug!(player, column = drop.column, "dropping a tile");
            game.play_turn(player, &[drop], &[])?;
        } else {
            if !hint.swap_indices.is_empty() {
                game.swap_tiles(player, &hint.swap_indices)?;
            }
            game.advance_turn()?;
        }

        idle_turns += 1;
        if idle_turns >= 4 * player_count as u32 && state.bag().is_empty() {
            break;
        }
    }

    let state = game.get_state();
    Ok(GameSummary {
        turns,
        scores: state
            .players()
            .iter()
            .map(|player| (player.name().to_string(), player.score()))
            .collect(),
        winner: state
            .winner()
            .and_then(|id| state.player(id).ok())
            .map(|player| player.name().to_string()),
        words: state.claimed_words().to_vec(),
    })
}

/// Picks the player's most playable regular tile and the emptiest column.
fn choose_drop(state: &GameState, player: PlayerId) -> Result<Option<ColumnPlacement>, GameError> {
    let rack = state.player(player)?.rack();
    let rack_index = rack
        .iter()
        .enumerate()
        .filter(|(_, tile)| !tile.is_blank())
        .max_by_key(|(index, tile)| (playability(tile), std::cmp::Reverse(*index)))
        .map(|(index, _)| index);
    let column = (0..BOARD_SIZE)
        .filter(|&column| state.board().landing_row(column).is_some())
        .max_by_key(|&column| (state.board().free_cells(column), std::cmp::Reverse(column)));
    Ok(match (rack_index, column) {
        (Some(rack_index), Some(column)) => Some(ColumnPlacement::new(column, rack_index)),
        _ => None,
    })
}

fn print_summary(summary: &GameSummary) {
    println!("Played {} turns.", summary.turns);
    for word in summary.words.iter() {
        let bonuses: Vec<&str> = word.bonuses.iter().map(Bonus::name).collect();
        println!(
            "\tPlayer {}: {} for {} {:?}",
            word.player, word.word, word.score, bonuses
        );
    }

    println!("|Player|Score|");
    println!("|------|-----|");
    for (name, score) in summary.scores.iter() {
        println!("|{}|{}|", name, score);
    }
    match &summary.winner {
        Some(winner) => println!("\n**Winner:** {}", winner),
        None => println!("\n**No winner.**"),
    }
}

fn run_benchmark(
    dictionary: Arc<Trie>,
    options: GameOptions,
    max_turns: u32,
    games: u32,
) -> Result<(), GameError> {
    let base_seed = options.seed.unwrap_or(0);
    let mut top_scores: Vec<u32> = Vec::new();
    let mut finished = 0;

    println!("|Game|Turns|Words|Top score|Winner|");
    println!("|----|-----|-----|---------|------|");
    for index in 0..games {
        let options = options.clone().with_seed(base_seed.wrapping_add(index as u64));
        let summary = play_game(Arc::clone(&dictionary), options, max_turns)?;
        let top_score = summary
            .scores
            .iter()
            .map(|(_, score)| *score)
            .max()
            .unwrap_or(0);
        println!(
            "|{}|{}|{}|{}|{}|",
            index,
            summary.turns,
            summary.words.len(),
            top_score,
            summary.winner.as_deref().unwrap_or("-")
        );
        if summary.winner.is_some() {
            finished += 1;
        }
        top_scores.push(top_score);
    }
    if top_scores.is_empty() {
        return Ok(());
    }

    let average: f64 =
        top_scores.iter().map(|score| *score as f64).sum::<f64>() / top_scores.len() as f64;
    let std_dev: f64 = (top_scores
        .iter()
        .map(|score| (*score as f64 - average).powi(2))
        .sum::<f64>()
        / top_scores.len() as f64)
        .sqrt();

    println!("\n**Games won:** {} of {}", finished, games);
    println!("**Average top score:** {:.2} +/- {:.2}", average, std_dev);
    Ok(())
}

fn parse_tile(letter: char) -> Result<Tile, GameError> {
    if letter == BLANK_MARKER {
        Ok(Tile::blank())
    } else {
        Tile::from_letter(letter)
    }
}

fn print_hint(dictionary: &Trie, rack: &str, level: u8, rows: &[String]) -> Result<(), GameError> {
    let level = HintLevel::try_from(level)?;
    let rack = rack
        .chars()
        .map(parse_tile)
        .collect::<Result<Vec<Tile>, GameError>>()?;

    let mut board = Board::new();
    let offset = BOARD_SIZE.saturating_sub(rows.len());
    for (row_index, row) in rows.iter().take(BOARD_SIZE).enumerate() {
        for (x, letter) in row.chars().enumerate().filter(|(_, letter)| *letter != '.') {
            board.place_tile_at_position(x, row_index + offset, Tile::from_letter(letter)?, 0)?;
        }
    }
    board.resolve_gravity();

    let solution = find_first_valid_word(&board, &rack, dictionary);
    let hint = get_hint_at_level(solution.as_ref(), &rack, level);
    println!("{}", hint);
    Ok(())
}
