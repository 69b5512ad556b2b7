//! Information-set Monte Carlo tree search over any [`GameView`].
//!
//! [`GameView`]: wizard_core::game::GameView

mod budget;
mod ismcts;
pub mod rollout;
mod tree;

pub use budget::Budget;
pub use ismcts::{ChildStats, DEFAULT_EXPLORATION, Ismcts, SearchReport};
pub use rollout::{ROLLOUT_ACTION_CAP, is_win, normalized_reward, random_playout};
pub use tree::{Node, NodeId, SearchTree};
