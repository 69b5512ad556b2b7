use super::{Policy, PolicyContext};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{Level, event};
use wizard_core::model::card::Card;
use wizard_core::model::hand::Hand;
use wizard_core::model::round::RoundPhase;
use wizard_core::model::trick::Trick;

const WIZARD_STRENGTH: f64 = 1.0;
const HIGH_CARD_STRENGTH: f64 = 0.7;
const MEDIUM_CARD_STRENGTH: f64 = 0.3;
const HIGH_RANK: u8 = 10;
const MEDIUM_RANK: u8 = 7;

/// Counts strong cards, rounds half up and nudges the result by -1, 0 or +1.
pub fn heuristic_bid<R: Rng + ?Sized>(hand: &Hand, round_number: u8, rng: &mut R) -> u8 {
    let strength: f64 = hand
        .iter()
        .map(|card| match card {
            Card::Wizard => WIZARD_STRENGTH,
            Card::Fool => 0.0,
            Card::Suited { rank, .. } if rank.value() >= HIGH_RANK => HIGH_CARD_STRENGTH,
            Card::Suited { rank, .. } if rank.value() >= MEDIUM_RANK => MEDIUM_CARD_STRENGTH,
            Card::Suited { .. } => 0.0,
        })
        .sum();

    let round = i32::from(round_number);
    let base = ((strength + 0.5).floor() as i32).clamp(0, round);
    let nudge = rng.gen_range(-1..=1);
    (base + nudge).clamp(0, round) as u8
}

/// Fixed-priority card choice used when search is unavailable.
pub fn heuristic_card(legal: &[Card], trick: &Trick) -> Option<Card> {
    let first = *legal.first()?;

    if legal.contains(&Card::Wizard) {
        return Some(Card::Wizard);
    }

    let suited = || legal.iter().copied().filter(|card| !card.is_special());
    let rank_of = |card: &Card| card.rank().map(|rank| rank.value()).unwrap_or(0);

    if trick.is_empty() {
        return Some(suited().max_by_key(rank_of).unwrap_or(first));
    }

    if let Some(lead) = trick.lead_suit() {
        if let Some(card) = suited()
            .filter(|card| card.suit() == Some(lead))
            .min_by_key(rank_of)
        {
            return Some(card);
        }
    }

    if legal.contains(&Card::Fool) {
        return Some(Card::Fool);
    }

    Some(suited().min_by_key(rank_of).unwrap_or(first))
}

/// Plays the fallback heuristics for every decision.
pub struct HeuristicPolicy {
    rng: SmallRng,
}

impl HeuristicPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn choose_bid(&mut self, ctx: &PolicyContext) -> Option<u8> {
        if ctx.round.phase() != RoundPhase::Bidding || ctx.round.current_player() != Some(ctx.seat)
        {
            return None;
        }
        let bid = heuristic_bid(
            ctx.round.hand(ctx.seat),
            ctx.round.round_number(),
            &mut self.rng,
        );
        event!(
            target: "wizard_bot::bid",
            Level::DEBUG,
            seat = %ctx.seat,
            round = ctx.round.round_number(),
            hand_size = ctx.round.hand(ctx.seat).len(),
            bid,
            reason = "heuristic",
        );
        Some(bid)
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card> {
        if ctx.round.current_player() != Some(ctx.seat) {
            return None;
        }
        let legal = ctx.round.legal_cards(ctx.seat);
        let card = heuristic_card(&legal, ctx.round.current_trick())?;
        event!(
            target: "wizard_bot::play",
            Level::DEBUG,
            seat = %ctx.seat,
            legal_count = legal.len(),
            chosen = %card,
            reason = "heuristic",
        );
        Some(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use wizard_core::model::player::PlayerId;
    use wizard_core::model::suit::Suit;

    fn suited(value: u8, suit: Suit) -> Card {
        Card::suited(value, suit).unwrap()
    }

    fn trick_with(plays: &[Card]) -> Trick {
        let mut trick = Trick::new(PlayerId::new(0), 4);
        for (offset, &card) in plays.iter().enumerate() {
            trick.play(PlayerId::new(offset as u8), card).unwrap();
        }
        trick
    }

    #[test]
    fn bid_stays_within_round_bounds() {
        let hand = Hand::with_cards(vec![Card::Wizard, Card::Wizard, suited(13, Suit::Red)]);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let bid = heuristic_bid(&hand, 3, &mut rng);
            assert!((2..=3).contains(&bid), "bid {bid} out of expected window");
        }
    }

    #[test]
    fn weak_hand_bids_near_zero() {
        let hand = Hand::with_cards(vec![Card::Fool, suited(2, Suit::Blue)]);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            assert!(heuristic_bid(&hand, 2, &mut rng) <= 1);
        }
    }

    #[test]
    fn wizard_comes_first() {
        let legal = [suited(13, Suit::Red), Card::Wizard, Card::Fool];
        assert_eq!(heuristic_card(&legal, &trick_with(&[])), Some(Card::Wizard));
    }

    #[test]
    fn leading_plays_highest_suited() {
        let legal = [Card::Fool, suited(4, Suit::Red), suited(11, Suit::Blue)];
        assert_eq!(
            heuristic_card(&legal, &trick_with(&[])),
            Some(suited(11, Suit::Blue))
        );
        assert_eq!(
            heuristic_card(&[Card::Fool], &trick_with(&[])),
            Some(Card::Fool)
        );
    }

    #[test]
    fn following_plays_lowest_of_led_suit() {
        let legal = [suited(9, Suit::Green), suited(3, Suit::Green), Card::Fool];
        let trick = trick_with(&[suited(12, Suit::Green)]);
        assert_eq!(heuristic_card(&legal, &trick), Some(suited(3, Suit::Green)));
    }

    #[test]
    fn void_in_led_suit_prefers_fool_then_lowest() {
        let trick = trick_with(&[suited(12, Suit::Green)]);
        let with_fool = [suited(9, Suit::Red), Card::Fool];
        assert_eq!(heuristic_card(&with_fool, &trick), Some(Card::Fool));

        let without_fool = [suited(9, Suit::Red), suited(2, Suit::Yellow)];
        assert_eq!(
            heuristic_card(&without_fool, &trick),
            Some(suited(2, Suit::Yellow))
        );
    }

    #[test]
    fn no_legal_cards_yields_none() {
        assert_eq!(heuristic_card(&[], &trick_with(&[])), None);
    }
}
