use crate::model::action::Action;
use crate::model::player::PlayerId;
use crate::model::round::{BidError, PlayError, RoundPhase, RoundState};
use std::fmt;

/// Rules contract the search drives.
///
/// `apply` must leave the state untouched when it returns an error, and
/// `clone` must produce a copy with no shared mutable parts.
pub trait GameView: Clone {
    type Action: Clone + PartialEq + fmt::Debug;
    type Error: fmt::Debug + fmt::Display;

    fn current_player(&self) -> Option<PlayerId>;

    /// Empty when the state is a dead end.
    fn legal_actions(&self) -> Vec<Self::Action>;

    fn apply(&mut self, action: &Self::Action) -> Result<(), Self::Error>;

    fn is_terminal(&self) -> bool;

    /// Score per seat, indexed by `PlayerId::index`. Only final once terminal.
    fn final_scores(&self) -> Vec<i32>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    Bid(BidError),
    Play(PlayError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::Bid(err) => write!(f, "bid rejected: {err}"),
            ApplyError::Play(err) => write!(f, "play rejected: {err}"),
        }
    }
}

impl std::error::Error for ApplyError {}

impl GameView for RoundState {
    type Action = Action;
    type Error = ApplyError;

    fn current_player(&self) -> Option<PlayerId> {
        RoundState::current_player(self)
    }

    fn legal_actions(&self) -> Vec<Action> {
        let Some(player) = RoundState::current_player(self) else {
            return Vec::new();
        };
        match self.phase() {
            RoundPhase::Bidding => (0..=self.round_number())
                .map(|value| Action::Bid { value })
                .collect(),
            RoundPhase::Playing => self
                .legal_cards(player)
                .into_iter()
                .map(|card| Action::Play { card, player })
                .collect(),
            RoundPhase::Complete => Vec::new(),
        }
    }

    fn apply(&mut self, action: &Action) -> Result<(), ApplyError> {
        match *action {
            Action::Bid { value } => self.process_bid(value).map_err(ApplyError::Bid),
            Action::Play { card, player } => self
                .play_card(player, card)
                .map(|_| ())
                .map_err(ApplyError::Play),
        }
    }

    fn is_terminal(&self) -> bool {
        self.is_complete()
    }

    fn final_scores(&self) -> Vec<i32> {
        self.round_points()
    }
}
