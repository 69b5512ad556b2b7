pub mod match_state;
pub mod serialization;
pub mod view;

pub use view::{ApplyError, GameView};
