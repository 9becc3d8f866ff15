use crate::board::{follow_moves, Board};
use crate::engine::{self, WordClaim};
use crate::geometry::Position;
use crate::hints::{self, Hint, HintLevel};
use crate::results::*;
use crate::snapshot::GameSnapshot;
use crate::tiles::{new_tile_bag, PlayerId, Tile, RACK_SIZE};
use crate::trie::{Trie, WordLookup};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

/// The score a player needs to win, unless configured otherwise.
pub const DEFAULT_TARGET_SCORE: u32 = 100;

/// The display colour of each player, by id.
pub const PLAYER_COLORS: [&str; 4] = ["#e63946", "#457b9d", "#2a9d8f", "#e9c46a"];

/// A participant in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) color: String,
    pub(crate) score: u32,
    pub(crate) rack: Vec<Tile>,
    pub(crate) turn_order: usize,
}

impl Player {
    pub(crate) fn new(id: PlayerId, name: String, turn_order: usize) -> Player {
        Player {
            id,
            name,
            color: PLAYER_COLORS[id as usize % PLAYER_COLORS.len()].to_string(),
            score: 0,
            rack: Vec::with_capacity(RACK_SIZE),
            turn_order,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn rack(&self) -> &[Tile] {
        &self.rack
    }

    /// This player's fixed position in the turn cycle.
    pub fn turn_order(&self) -> usize {
        self.turn_order
    }
}

/// Everything about a game in progress.
///
/// Only [`Game`] mutates a `GameState`. Callers get copies from [`Game::get_state`], so they never
/// see a half-applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) players: Vec<Player>,
    pub(crate) current_player: PlayerId,
    /// Tiles left to draw. The back of the bag is drawn first.
    pub(crate) bag: Vec<Tile>,
    pub(crate) claimed_words: Vec<ClaimedWord>,
    pub(crate) target_score: u32,
    pub(crate) status: GameStatus,
    pub(crate) winner: Option<PlayerId>,
}

impl GameState {
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The players, in roster order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .iter()
            .find(|player| player.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(GameError::PlayerNotFound(id))
    }

    /// The id of the player whose turn it is.
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn bag(&self) -> &[Tile] {
        &self.bag
    }

    /// Every word scored so far, in the order they were scored.
    pub fn claimed_words(&self) -> &[ClaimedWord] {
        &self.claimed_words
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }
}

/// Settings for a new game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    /// Between 2 and 4.
    pub player_count: usize,
    /// Names in turn order. Missing names default to `Player N`.
    pub player_names: Vec<String>,
    pub target_score: u32,
    /// Seeds the tile bag shuffle. A random seed is used if this is `None`.
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            player_count: 2,
            player_names: Vec::new(),
            target_score: DEFAULT_TARGET_SCORE,
            seed: None,
        }
    }
}

impl GameOptions {
    pub fn new(player_count: usize) -> GameOptions {
        GameOptions {
            player_count,
            ..GameOptions::default()
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> GameOptions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.player_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target_score(mut self, target_score: u32) -> GameOptions {
        self.target_score = target_score;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> GameOptions {
        self.seed = Some(seed);
        self
    }
}

/// A request to drop a tile from the player's rack into a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPlacement {
    pub column: usize,
    /// Index into the rack as it was before this move.
    pub rack_index: usize,
    /// The letter to assign if the tile is a blank.
    pub blank_letter: Option<char>,
}

impl ColumnPlacement {
    pub fn new(column: usize, rack_index: usize) -> ColumnPlacement {
        ColumnPlacement {
            column,
            rack_index,
            blank_letter: None,
        }
    }

    pub fn with_blank_letter(mut self, letter: char) -> ColumnPlacement {
        self.blank_letter = Some(letter);
        self
    }
}

/// Runs a game: owns its state and is the entry point for every move.
///
/// ```
/// use rs_wordfall::{Game, GameOptions, GameStatus, Trie};
/// use std::sync::Arc;
///
/// let dictionary = Arc::new(Trie::from_iterator(["cat", "act"]));
/// let game = Game::new(GameOptions::new(2).with_seed(3), dictionary).unwrap();
///
/// let state = game.get_state();
/// assert_eq!(state.status(), GameStatus::Playing);
/// assert_eq!(state.current_player(), 0);
/// assert_eq!(state.bag().len(), 100 - 2 * 7);
/// ```
pub struct Game<D = Trie> {
    state: GameState,
    dictionary: Arc<D>,
    rng: StdRng,
    /// Cells placed during the current turn.
    placed_this_turn: Vec<Position>,
}

impl<D: WordLookup> Game<D> {
    /// Creates a game: shuffles a full tile bag, seats the players in the given order and deals
    /// each of them a full rack. Player 0 moves first.
    pub fn new(options: GameOptions, dictionary: Arc<D>) -> Result<Game<D>, GameError> {
        if !(2..=4).contains(&options.player_count) {
            return Err(GameError::InvalidPlayerCount(options.player_count));
        }
        if options.player_names.len() > options.player_count {
            return Err(GameError::InvalidPlayerCount(options.player_names.len()));
        }
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bag = new_tile_bag(&mut rng);
        let players = (0..options.player_count)
            .map(|index| {
                let name = options
                    .player_names
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("Player {}", index + 1));
                Player::new(index as PlayerId, name, index)
            })
            .collect();
        let mut game = Game {
            state: GameState {
                board: Board::new(),
                players,
                current_player: 0,
                bag,
                claimed_words: Vec::new(),
                target_score: options.target_score,
                status: GameStatus::Playing,
                winner: None,
            },
            dictionary,
            rng,
            placed_this_turn: Vec::new(),
        };
        for id in 0..options.player_count {
            game.refill_player_rack(id as PlayerId)?;
        }
        info!(
            players = options.player_count,
            target_score = options.target_score,
            "created game"
        );
        Ok(game)
    }

    /// Resumes a game from a previously saved state.
    pub fn from_state(state: GameState, dictionary: Arc<D>) -> Game<D> {
        Game {
            state,
            dictionary,
            rng: StdRng::from_entropy(),
            placed_this_turn: Vec::new(),
        }
    }

    /// Resumes a game from a serialized snapshot.
    pub fn from_snapshot(snapshot: GameSnapshot, dictionary: Arc<D>) -> Result<Game<D>, GameError> {
        Ok(Game::from_state(GameState::try_from(snapshot)?, dictionary))
    }

    /// Returns an independent copy of the current state.
    pub fn get_state(&self) -> GameState {
        self.state.clone()
    }

    pub fn to_snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&self.state)
    }

    pub fn current_player(&self) -> PlayerId {
        self.state.current_player
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// The cells placed so far this turn.
    pub fn placed_this_turn(&self) -> &[Position] {
        &self.placed_this_turn
    }

    pub fn dictionary(&self) -> &D {
        &self.dictionary
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.state.status != GameStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }
        Ok(())
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_playing()?;
        self.state.player(player)?;
        if self.state.current_player != player {
            return Err(GameError::NotPlayersTurn(player));
        }
        Ok(())
    }

    /// Drops tiles from the player's rack into columns, in order. The tiles leave the rack and
    /// their landing cells are recorded as placed this turn.
    pub fn place_tiles(
        &mut self,
        placements: &[ColumnPlacement],
        player: PlayerId,
    ) -> Result<Vec<Position>, GameError> {
        self.ensure_turn(player)?;
        let rack = &self.state.player(player)?.rack;
        let mut used = Vec::with_capacity(placements.len());
        let mut drops = Vec::with_capacity(placements.len());
        for placement in placements {
            let index = placement.rack_index;
            if index >= rack.len() || used.contains(&index) {
                return Err(GameError::InvalidRackIndex(index));
            }
            used.push(index);
            let mut tile = rack[index];
            if let Some(letter) = placement.blank_letter {
                match &mut tile {
                    Tile::Blank(blank) => blank.assign(letter)?,
                    Tile::Regular { .. } => return Err(GameError::NotBlankRackTile(index)),
                }
            }
            drops.push((placement.column, tile));
        }

        let (landed, moves) = self.state.board.drop_tiles(&drops, player)?;
        remove_rack_tiles(&mut self.state.player_mut(player)?.rack, used);
        follow_moves(&mut self.placed_this_turn, &moves);
        self.placed_this_turn.extend(&landed);
        Ok(landed)
    }

    /// Puts a rack tile on a specific cell without applying gravity.
    pub fn place_tile_at_position(
        &mut self,
        x: usize,
        y: usize,
        rack_index: usize,
        player: PlayerId,
    ) -> Result<Position, GameError> {
        self.ensure_turn(player)?;
        let tile = *self
            .state
            .player(player)?
            .rack
            .get(rack_index)
            .ok_or(GameError::InvalidRackIndex(rack_index))?;
        self.state.board.place_tile_at_position(x, y, tile, player)?;
        self.state.player_mut(player)?.rack.remove(rack_index);
        let position = Position::new(x, y);
        self.placed_this_turn.push(position);
        Ok(position)
    }

    /// Takes back a tile the player placed this turn and returns it to their rack, then lets the
    /// tiles above it fall. Returns the tile as it stood on the board, or `None` if the cell was
    /// empty.
    ///
    /// Only tiles placed this turn can be taken back, and not once they are part of a claimed
    /// word.
    pub fn remove_tile(
        &mut self,
        x: usize,
        y: usize,
        player: PlayerId,
    ) -> Result<Option<Tile>, GameError> {
        self.ensure_turn(player)?;
        let position = Position::new(x, y);
        if !position.is_on_board() {
            return Err(GameError::OutOfBounds { x, y });
        }
        if !self.state.board.is_occupied(position) {
            return Ok(None);
        }
        if !self.placed_this_turn.contains(&position) {
            return Err(GameError::NotPlacedThisTurn { x, y });
        }
        if self
            .state
            .claimed_words
            .iter()
            .any(|claimed| claimed.positions.contains(&position))
        {
            return Err(GameError::TileInClaimedWord { x, y });
        }
        if self.state.player(player)?.rack.len() >= RACK_SIZE {
            return Err(GameError::RackFull(player));
        }

        let (removed, moves) = self.state.board.take_tile(x, y)?;
        self.placed_this_turn.retain(|placed| *placed != position);
        follow_moves(&mut self.placed_this_turn, &moves);
        if let Some(tile) = removed {
            self.state.player_mut(player)?.rack.push(tile.reset());
            debug!(player, x, y, "took back tile");
        }
        Ok(removed)
    }

    /// Returns the rack tiles at `indices` to the bag, reshuffles it and refills the rack. This
    /// uses up the player's turn; call [`Game::advance_turn`] afterwards.
    pub fn swap_tiles(&mut self, player: PlayerId, indices: &[usize]) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        let rack = &mut self.state.player_mut(player)?.rack;
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        if let Some(&index) = sorted.iter().find(|&&index| index >= rack.len()) {
            return Err(GameError::InvalidRackIndex(index));
        }
        // Highest index first so earlier removals don't shift later ones.
        let returned: Vec<Tile> = sorted
            .into_iter()
            .map(|index| rack.remove(index).reset())
            .collect();
        debug!(player, count = returned.len(), "swapping tiles");
        self.state.bag.extend(returned);
        self.state.bag.shuffle(&mut self.rng);
        self.refill_player_rack(player)?;
        Ok(())
    }

    /// Draws from the bag until the player's rack is full or the bag is empty. Returns the number
    /// of tiles drawn.
    pub fn refill_player_rack(&mut self, player: PlayerId) -> Result<usize, GameError> {
        let GameState { players, bag, .. } = &mut self.state;
        let rack = &mut players
            .iter_mut()
            .find(|candidate| candidate.id == player)
            .ok_or(GameError::PlayerNotFound(player))?
            .rack;
        let mut drawn = 0;
        while rack.len() < RACK_SIZE {
            match bag.pop() {
                Some(tile) => {
                    rack.push(tile);
                    drawn += 1;
                }
                None => break,
            }
        }
        Ok(drawn)
    }

    /// Passes the turn to the next player in turn order and returns their id.
    pub fn advance_turn(&mut self) -> Result<PlayerId, GameError> {
        let current = self.state.player(self.state.current_player)?.turn_order;
        let next_order = (current + 1) % self.state.players.len();
        let next = self
            .state
            .players
            .iter()
            .find(|player| player.turn_order == next_order)
            .map(Player::id)
            .ok_or(GameError::PlayerNotFound(self.state.current_player))?;
        self.state.current_player = next;
        self.placed_this_turn.clear();
        info!(player = next, "advanced turn");
        Ok(next)
    }

    /// Returns the first player, in roster order, who has reached the target score. Finding one
    /// ends the game.
    pub fn check_win_condition(&mut self) -> Option<PlayerId> {
        let winner = self
            .state
            .players
            .iter()
            .find(|player| player.score >= self.state.target_score)
            .map(Player::id)?;
        if self.state.status != GameStatus::Finished {
            info!(winner, "game finished");
        }
        self.state.status = GameStatus::Finished;
        self.state.winner = Some(winner);
        Some(winner)
    }

    /// Returns `false` once the bag and every rack are empty.
    pub fn can_continue_game(&self) -> bool {
        !(self.state.bag.is_empty()
            && self.state.players.iter().all(|player| player.rack.is_empty()))
    }

    /// Assigns a letter to a blank tile the current player owns on the board. Locked blanks cannot
    /// be changed.
    pub fn set_blank_tile_letter(
        &mut self,
        x: usize,
        y: usize,
        letter: char,
        player: PlayerId,
    ) -> Result<(), GameError> {
        self.ensure_turn(player)?;
        let position = Position::new(x, y);
        if !position.is_on_board() {
            return Err(GameError::OutOfBounds { x, y });
        }
        let owner = self.state.board.owner(position);
        let blank = match self.state.board.tile_mut(position) {
            None => return Err(GameError::CellEmpty { x, y }),
            Some(Tile::Regular { .. }) => return Err(GameError::NotBlankTile { x, y }),
            Some(Tile::Blank(blank)) => blank,
        };
        if owner != Some(player) {
            return Err(GameError::NotTileOwner { x, y, player });
        }
        if blank.is_locked() {
            return Err(GameError::BlankTileLocked { x, y });
        }
        blank.assign(letter)
    }

    /// Validates and scores the current player's claims against the tiles placed this turn.
    ///
    /// Nothing is recorded unless every claim is valid. Placements are not undone when the
    /// submission is rejected; use [`Game::play_turn`] for that.
    pub fn process_word_claims(
        &mut self,
        claims: &[WordClaim],
    ) -> Result<SubmissionOutcome, GameError> {
        self.ensure_playing()?;
        for claim in claims {
            self.ensure_turn(claim.player)?;
        }
        engine::process_word_claims(
            &mut self.state,
            claims,
            &self.placed_this_turn,
            &*self.dictionary,
        )
    }

    /// Places tiles and submits claims as one move.
    ///
    /// The move is played on a private copy of the game, which replaces this one only if the
    /// claims are accepted. If a placement fails or the claims are rejected, the game is left
    /// exactly as it was. When the claims are accepted the player's
    /// rack is refilled, the win condition is checked, and the turn passes to the next player
    /// unless the game has ended.
    pub fn play_turn(
        &mut self,
        player: PlayerId,
        placements: &[ColumnPlacement],
        claims: &[WordClaim],
    ) -> Result<SubmissionOutcome, GameError> {
        self.ensure_turn(player)?;
        let mut trial = Game {
            state: self.state.clone(),
            dictionary: Arc::clone(&self.dictionary),
            rng: self.rng.clone(),
            placed_this_turn: self.placed_this_turn.clone(),
        };
        trial.place_tiles(placements, player)?;
        let outcome = trial.process_word_claims(claims)?;
        if !outcome.is_accepted() {
            return Ok(outcome);
        }

        *self = trial;
        self.refill_player_rack(player)?;
        if self.check_win_condition().is_none() {
            if self.can_continue_game() {
                self.advance_turn()?;
            } else {
                info!("no tiles left, game finished");
                self.state.status = GameStatus::Finished;
            }
        }
        info!(player, points = outcome.points(), "played turn");
        Ok(outcome)
    }
}

impl<D: WordLookup + Sync> Game<D> {
    /// Suggests a move for the player at the given level of detail (0 to 4). The game is not
    /// changed.
    pub fn get_hint(&self, player: PlayerId, level: u8) -> Result<Hint, GameError> {
        let level = HintLevel::try_from(level)?;
        let rack = &self.state.player(player)?.rack;
        let solution = hints::find_first_valid_word(&self.state.board, rack, &*self.dictionary);
        Ok(hints::get_hint_at_level(solution.as_ref(), rack, level))
    }
}

/// Removes the tiles at the given indices, highest first.
fn remove_rack_tiles(rack: &mut Vec<Tile>, mut indices: Vec<usize>) {
    indices.sort_unstable_by(|a, b| b.cmp(a));
    for index in indices {
        if index < rack.len() {
            rack.remove(index);
        }
    }
}

/// Checks the structural rules a state restored from outside must follow.
pub(crate) fn validate_state(state: &GameState) -> Result<(), String> {
    if !(2..=4).contains(&state.players.len()) {
        return Err(format!("{} players", state.players.len()));
    }
    let mut ids: Vec<PlayerId> = state.players.iter().map(Player::id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != state.players.len() {
        return Err("player ids must be unique".to_string());
    }
    let mut orders: Vec<usize> = state.players.iter().map(Player::turn_order).collect();
    orders.sort_unstable();
    if orders != (0..state.players.len()).collect::<Vec<usize>>() {
        return Err("turn orders must be 0 to n-1".to_string());
    }
    if state.player(state.current_player).is_err() {
        return Err(format!("current player {} does not exist", state.current_player));
    }
    if let Some(winner) = state.winner {
        if state.player(winner).is_err() {
            return Err(format!("winner {winner} does not exist"));
        }
    }
    if let Some(player) = state.players.iter().find(|player| player.rack.len() > RACK_SIZE) {
        return Err(format!("player {} holds too many tiles", player.id));
    }
    Ok(())
}
