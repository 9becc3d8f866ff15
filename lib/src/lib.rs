//! Rules engine for a word game played on a 7x7 grid. Tiles are dropped into columns and fall to
//! the bottom, and players score by claiming straight lines of tiles that spell dictionary words.
//!
//! ```
//! use rs_wordfall::*;
//! use std::sync::Arc;
//!
//! let dictionary = Arc::new(Trie::from_iterator(["cat", "act", "tac"]));
//! let mut game = Game::new(GameOptions::new(2).with_seed(1), dictionary)?;
//!
//! let player = game.current_player();
//! if let Some(solution) = game.get_hint(player, 4)?.solution {
//!     let outcome = game.play_turn(
//!         player,
//!         &solution.to_column_placements(),
//!         &[solution.to_claim(player)],
//!     )?;
//!     assert!(outcome.is_accepted());
//! }
//! # Ok::<(), GameError>(())
//! ```

mod board;
mod detector;
mod engine;
mod game;
mod geometry;
mod hints;
mod results;
mod snapshot;
mod tiles;
mod trie;

pub use board::Board;
pub use detector::*;
pub use engine::*;
pub use game::*;
pub use geometry::*;
pub use hints::*;
pub use results::*;
pub use snapshot::*;
pub use tiles::*;
pub use trie::*;
