use crate::model::card::Card;
use crate::model::deck::{Deck, subtract_multiset};
use crate::model::hand::Hand;
use crate::model::player::PlayerId;
use crate::model::round::RoundState;

/// Everything one seat can see: its own hand, the cards played this round,
/// the turned-up trump card and how many cards each seat still holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationSet {
    perspective: PlayerId,
    hand: Hand,
    played: Vec<Card>,
    trump_card: Option<Card>,
    hand_sizes: Vec<usize>,
}

impl InformationSet {
    pub fn from_state(round: &RoundState, perspective: PlayerId) -> Self {
        Self {
            perspective,
            hand: round.hand(perspective).clone(),
            played: round.played_cards(),
            trump_card: round.trump_card(),
            hand_sizes: PlayerId::seats(round.player_count())
                .map(|seat| round.public_hand_size(seat))
                .collect(),
        }
    }

    pub fn perspective(&self) -> PlayerId {
        self.perspective
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    pub fn hand_size(&self, seat: PlayerId) -> usize {
        self.hand_sizes.get(seat.index()).copied().unwrap_or(0)
    }

    /// Own hand, played cards and the trump card.
    pub fn visible_cards(&self) -> Vec<Card> {
        let mut visible: Vec<Card> = self.hand.iter().copied().collect();
        visible.extend(self.played.iter().copied());
        visible.extend(self.trump_card);
        visible
    }

    /// The deck minus every visible card, or `None` if the visible cards
    /// could not all have come from one deck.
    pub fn unseen_cards(&self) -> Option<Vec<Card>> {
        let mut pool = Deck::standard().into_cards();
        subtract_multiset(&mut pool, &self.visible_cards()).then_some(pool)
    }
}

impl RoundState {
    /// The masked view of this round for `seat`.
    pub fn information_set(&self, seat: PlayerId) -> InformationSet {
        InformationSet::from_state(self, seat)
    }
}

#[cfg(test)]
mod tests {
    use crate::game::view::GameView;
    use crate::model::deck::Deck;
    use crate::model::player::PlayerId;
    use crate::model::round::RoundState;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn unseen_cards_exclude_everything_visible() {
        let mut rng = StdRng::seed_from_u64(17);
        let deck = Deck::shuffled(&mut rng);
        let mut round = RoundState::deal(deck, 4, 4, PlayerId::new(2), &mut rng).unwrap();
        for _ in 0..6 {
            let action = round.legal_actions()[0];
            round.apply(&action).unwrap();
        }

        let info = round.information_set(PlayerId::new(1));
        let visible = info.visible_cards();
        let unseen = info.unseen_cards().expect("consistent round");
        assert_eq!(visible.len() + unseen.len(), 60);
        assert_eq!(info.played().len(), 2);
        assert_eq!(info.hand_size(PlayerId::new(1)), round.hand(PlayerId::new(1)).len());
    }
}
