use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 60;
pub const SPECIAL_COPIES: usize = 4;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// 52 suited cards followed by four Wizards and four Fools.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ordered() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.extend(std::iter::repeat(Card::Wizard).take(SPECIAL_COPIES));
        cards.extend(std::iter::repeat(Card::Fool).take(SPECIAL_COPIES));
        Self { cards }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle_in_place(rng);
        deck
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(&mut rng)
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Removes and returns the top card (end of the vector).
    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

/// Removes one instance of every card in `seen` from `pool`.
///
/// Returns `false` when `seen` holds a card the pool no longer contains, which
/// means the two collections are not consistent with a single deck.
pub fn subtract_multiset(pool: &mut Vec<Card>, seen: &[Card]) -> bool {
    let mut consistent = true;
    for card in seen {
        match pool.iter().position(|c| c == card) {
            Some(index) => {
                pool.swap_remove(index);
            }
            None => consistent = false,
        }
    }
    consistent
}

/// Sorts cards into a canonical order so multisets can be compared with `==`.
pub fn canonical(mut cards: Vec<Card>) -> Vec<Card> {
    cards.sort_by_key(|card| card.sort_key());
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_has_sixty_cards() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        let wizards = deck.cards().iter().filter(|c| c.is_wizard()).count();
        let fools = deck.cards().iter().filter(|c| c.is_fool()).count();
        assert_eq!(wizards, 4);
        assert_eq!(fools, 4);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let deck_a = Deck::shuffled_with_seed(42);
        let deck_b = Deck::shuffled_with_seed(42);
        assert_eq!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn shuffle_with_different_seeds_differs() {
        let deck_a = Deck::shuffled_with_seed(1);
        let deck_b = Deck::shuffled_with_seed(2);
        assert_ne!(deck_a.cards(), deck_b.cards());
    }

    #[test]
    fn subtract_multiset_removes_single_copies() {
        let mut pool = Deck::standard().into_cards();
        assert!(subtract_multiset(&mut pool, &[Card::Wizard, Card::Wizard]));
        assert_eq!(pool.iter().filter(|c| c.is_wizard()).count(), 2);
        assert_eq!(pool.len(), DECK_SIZE - 2);
    }

    #[test]
    fn subtract_multiset_flags_missing_cards() {
        let mut pool = vec![Card::Fool];
        assert!(!subtract_multiset(&mut pool, &[Card::Wizard]));
        assert_eq!(pool, vec![Card::Fool]);
    }
}
