//! Determinization: completing one seat's information set into a concrete round.

use super::InformationSet;
use crate::model::hand::Hand;
use crate::model::player::PlayerId;
use crate::model::round::RoundState;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Deals the unseen cards to the other seats at random.
#[derive(Debug, Default)]
pub struct Determinizer;

impl Determinizer {
    /// Samples a concrete round consistent with what `perspective` can see.
    ///
    /// The perspective seat keeps its true hand, played cards and the trump
    /// card stay where they are, and every other seat is dealt as many unseen
    /// cards as it publicly holds. Leftover cards become the stock. A seat
    /// that cannot be filled keeps its hand; an inconsistent round is
    /// returned as an unmodified copy.
    pub fn determinize<R: Rng + ?Sized>(
        round: &RoundState,
        perspective: PlayerId,
        rng: &mut R,
    ) -> Determinization {
        if perspective.index() >= round.player_count() {
            return Determinization::unmodified(
                round,
                DeterminizeError::UnknownSeat(perspective),
            );
        }

        let info = InformationSet::from_state(round, perspective);
        let Some(mut unseen) = info.unseen_cards() else {
            return Determinization::unmodified(round, DeterminizeError::InconsistentVisibleCards);
        };
        unseen.shuffle(rng);

        let mut state = round.clone();
        let mut cursor = 0usize;
        let mut untouched = Vec::new();

        for seat in PlayerId::seats(round.player_count()) {
            if seat == perspective {
                continue;
            }
            let needed = info.hand_size(seat);
            if cursor + needed > unseen.len() {
                untouched.push(seat);
                continue;
            }
            state.set_hand(seat, Hand::with_cards(unseen[cursor..cursor + needed].to_vec()));
            cursor += needed;
        }

        state.set_stock(unseen.split_off(cursor));

        Determinization {
            state,
            outcome: DeterminizationOutcome::Sampled { untouched },
        }
    }
}

/// A sampled round plus how it was produced.
#[derive(Debug, Clone)]
pub struct Determinization {
    state: RoundState,
    outcome: DeterminizationOutcome,
}

impl Determinization {
    fn unmodified(round: &RoundState, reason: DeterminizeError) -> Self {
        Self {
            state: round.clone(),
            outcome: DeterminizationOutcome::Unmodified(reason),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn outcome(&self) -> &DeterminizationOutcome {
        &self.outcome
    }

    pub fn is_sampled(&self) -> bool {
        matches!(self.outcome, DeterminizationOutcome::Sampled { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeterminizationOutcome {
    /// Unseen cards were redealt; `untouched` seats kept their true hands
    /// because too few unseen cards were left for them.
    Sampled { untouched: Vec<PlayerId> },
    /// Hidden information could not be resampled; the state is a plain copy.
    Unmodified(DeterminizeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeterminizeError {
    UnknownSeat(PlayerId),
    InconsistentVisibleCards,
}

impl fmt::Display for DeterminizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeterminizeError::UnknownSeat(seat) => write!(f, "{seat} is not seated at this table"),
            DeterminizeError::InconsistentVisibleCards => {
                write!(f, "visible cards are not consistent with a single deck")
            }
        }
    }
}

impl std::error::Error for DeterminizeError {}
