use crate::model::card::Card;
use crate::model::deck::{DECK_SIZE, Deck};
use crate::model::hand::Hand;
use crate::model::player::{MAX_PLAYERS, MIN_PLAYERS, PlayerId};
use crate::model::score::round_points;
use crate::model::suit::Suit;
use crate::model::trick::{Trick, TrickError};
use rand::Rng;
use std::fmt;

/// Number of rounds in a match for the given table size.
pub const fn max_rounds(player_count: usize) -> u8 {
    (DECK_SIZE / player_count) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Bidding,
    Playing,
    Complete,
}

#[derive(Debug, Clone)]
pub struct RoundState {
    player_count: usize,
    round_number: u8,
    dealer: PlayerId,
    hands: Vec<Hand>,
    stock: Vec<Card>,
    trump_card: Option<Card>,
    trump_suit: Option<Suit>,
    bids: Vec<Option<u8>>,
    tricks_won: Vec<u8>,
    next_bidder: PlayerId,
    current_trick: Trick,
    trick_history: Vec<Trick>,
    phase: RoundPhase,
}

impl RoundState {
    /// Deals `round_number` cards to every seat and turns up the trump card.
    ///
    /// Dealing starts left of the dealer. No trump card is turned in the last
    /// round of a match or when the deck runs out; a turned-up Wizard lets the
    /// dealer name a suit, drawn from `rng`.
    pub fn deal<R: Rng + ?Sized>(
        mut deck: Deck,
        player_count: usize,
        round_number: u8,
        dealer: PlayerId,
        rng: &mut R,
    ) -> Result<Self, DealError> {
        validate_table(player_count, round_number)?;
        if deck.len() < player_count * usize::from(round_number) {
            return Err(DealError::NotEnoughCards {
                needed: player_count * usize::from(round_number),
                available: deck.len(),
            });
        }

        let mut hands = vec![Hand::new(); player_count];
        for _ in 0..round_number {
            for offset in 1..=player_count {
                let seat = dealer.offset(offset, player_count);
                if let Some(card) = deck.draw() {
                    hands[seat.index()].add(card);
                }
            }
        }

        let trump_card = if round_number == max_rounds(player_count) {
            None
        } else {
            deck.draw()
        };
        let trump_suit = match trump_card {
            Some(Card::Suited { suit, .. }) => Some(suit),
            Some(Card::Wizard) => Suit::from_index(rng.gen_range(0..Suit::ALL.len())),
            Some(Card::Fool) | None => None,
        };

        Ok(Self::from_parts(
            hands,
            deck.into_cards(),
            round_number,
            dealer,
            trump_card,
            trump_suit,
        ))
    }

    /// Builds a round in the bidding phase from explicit hands.
    pub fn from_parts(
        hands: Vec<Hand>,
        stock: Vec<Card>,
        round_number: u8,
        dealer: PlayerId,
        trump_card: Option<Card>,
        trump_suit: Option<Suit>,
    ) -> Self {
        let player_count = hands.len();
        let first = dealer.next(player_count);
        Self {
            player_count,
            round_number,
            dealer,
            hands,
            stock,
            trump_card,
            trump_suit,
            bids: vec![None; player_count],
            tricks_won: vec![0; player_count],
            next_bidder: first,
            current_trick: Trick::new(first, player_count),
            trick_history: Vec::new(),
            phase: RoundPhase::Bidding,
        }
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn round_number(&self) -> u8 {
        self.round_number
    }

    pub fn dealer(&self) -> PlayerId {
        self.dealer
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, RoundPhase::Complete)
    }

    pub fn hand(&self, seat: PlayerId) -> &Hand {
        &self.hands[seat.index()]
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub(crate) fn set_hand(&mut self, seat: PlayerId, hand: Hand) {
        self.hands[seat.index()] = hand;
    }

    /// Undealt cards; never played during the round.
    pub fn stock(&self) -> &[Card] {
        &self.stock
    }

    pub(crate) fn set_stock(&mut self, stock: Vec<Card>) {
        self.stock = stock;
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.trump_suit
    }

    pub fn bids(&self) -> &[Option<u8>] {
        &self.bids
    }

    pub fn bid(&self, seat: PlayerId) -> Option<u8> {
        self.bids.get(seat.index()).copied().flatten()
    }

    pub fn tricks_won(&self) -> &[u8] {
        &self.tricks_won
    }

    pub fn current_trick(&self) -> &Trick {
        &self.current_trick
    }

    pub fn trick_history(&self) -> &[Trick] {
        &self.trick_history
    }

    /// Seat expected to act next, `None` once the round is complete.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            RoundPhase::Bidding => Some(self.next_bidder),
            RoundPhase::Playing => Some(self.current_trick.expected_position()),
            RoundPhase::Complete => None,
        }
    }

    /// Every card played this round, completed tricks first.
    pub fn played_cards(&self) -> Vec<Card> {
        self.trick_history
            .iter()
            .chain(std::iter::once(&self.current_trick))
            .flat_map(|trick| trick.plays().iter().map(|play| play.card))
            .collect()
    }

    pub fn cards_played_by(&self, seat: PlayerId) -> usize {
        self.trick_history
            .iter()
            .chain(std::iter::once(&self.current_trick))
            .flat_map(|trick| trick.plays().iter())
            .filter(|play| play.position == seat)
            .count()
    }

    /// Hand size every player can deduce for `seat`.
    pub fn public_hand_size(&self, seat: PlayerId) -> usize {
        usize::from(self.round_number).saturating_sub(self.cards_played_by(seat))
    }

    /// Hands, played cards, stock and the trump card together.
    pub fn card_multiset(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self
            .hands
            .iter()
            .flat_map(|hand| hand.iter().copied())
            .collect();
        cards.extend(self.played_cards());
        cards.extend(self.stock.iter().copied());
        cards.extend(self.trump_card);
        cards
    }

    pub fn process_bid(&mut self, value: u8) -> Result<(), BidError> {
        if !matches!(self.phase, RoundPhase::Bidding) {
            return Err(BidError::NotInBiddingPhase);
        }
        if value > self.round_number {
            return Err(BidError::OutOfRange {
                value,
                max: self.round_number,
            });
        }

        self.bids[self.next_bidder.index()] = Some(value);
        self.next_bidder = self.next_bidder.next(self.player_count);

        if self.bids.iter().all(Option::is_some) {
            self.phase = RoundPhase::Playing;
            self.current_trick = Trick::new(self.dealer.next(self.player_count), self.player_count);
        }
        Ok(())
    }

    pub fn can_play_card(&self, seat: PlayerId, card: Card) -> bool {
        if card.is_special() {
            return true;
        }
        match self.current_trick.lead_suit() {
            Some(lead) => card.suit() == Some(lead) || !self.hands[seat.index()].has_suit(lead),
            None => true,
        }
    }

    /// Legal cards for `seat`, one entry per distinct card, in hand order.
    pub fn legal_cards(&self, seat: PlayerId) -> Vec<Card> {
        let mut legal: Vec<Card> = Vec::new();
        for &card in self.hands[seat.index()].iter() {
            if !legal.contains(&card) && self.can_play_card(seat, card) {
                legal.push(card);
            }
        }
        legal
    }

    pub fn play_card(&mut self, seat: PlayerId, card: Card) -> Result<PlayOutcome, PlayError> {
        if !matches!(self.phase, RoundPhase::Playing) {
            return Err(PlayError::NotInPlayPhase);
        }

        if !self.hands[seat.index()].contains(card) {
            return Err(PlayError::CardNotInHand(card));
        }

        let expected = self.current_trick.expected_position();
        if expected != seat {
            return Err(PlayError::OutOfTurn {
                expected,
                actual: seat,
            });
        }

        if !self.can_play_card(seat, card) {
            if let Some(suit) = self.current_trick.lead_suit() {
                return Err(PlayError::MustFollowSuit(suit));
            }
        }

        self.current_trick.play(seat, card).map_err(PlayError::Trick)?;
        let _ = self.hands[seat.index()].remove(card);

        if !self.current_trick.is_complete() {
            return Ok(PlayOutcome::Played);
        }

        let winner = self
            .current_trick
            .winner(self.trump_suit)
            .unwrap_or(self.current_trick.leader());
        self.tricks_won[winner.index()] += 1;
        let finished = std::mem::replace(
            &mut self.current_trick,
            Trick::new(winner, self.player_count),
        );
        self.trick_history.push(finished);

        if self.trick_history.len() >= usize::from(self.round_number) {
            self.phase = RoundPhase::Complete;
            return Ok(PlayOutcome::RoundCompleted { winner });
        }
        Ok(PlayOutcome::TrickCompleted { winner })
    }

    /// Round points per seat; all zero until the round is complete.
    pub fn round_points(&self) -> Vec<i32> {
        if !self.is_complete() {
            return vec![0; self.player_count];
        }
        self.bids
            .iter()
            .zip(&self.tricks_won)
            .map(|(bid, &won)| round_points(bid.unwrap_or(0), won))
            .collect()
    }
}

fn validate_table(player_count: usize, round_number: u8) -> Result<(), DealError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(DealError::PlayerCount(player_count));
    }
    if round_number == 0 || round_number > max_rounds(player_count) {
        return Err(DealError::RoundOutOfRange {
            round: round_number,
            max: max_rounds(player_count),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Played,
    TrickCompleted { winner: PlayerId },
    RoundCompleted { winner: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    NotInPlayPhase,
    CardNotInHand(Card),
    OutOfTurn { expected: PlayerId, actual: PlayerId },
    MustFollowSuit(Suit),
    Trick(TrickError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::NotInPlayPhase => write!(f, "round is not in the playing phase"),
            PlayError::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            PlayError::OutOfTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            PlayError::MustFollowSuit(suit) => write!(f, "must follow led suit {suit}"),
            PlayError::Trick(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PlayError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidError {
    NotInBiddingPhase,
    OutOfRange { value: u8, max: u8 },
}

impl fmt::Display for BidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidError::NotInBiddingPhase => write!(f, "round is not in the bidding phase"),
            BidError::OutOfRange { value, max } => {
                write!(f, "bid {value} exceeds the {max} cards dealt")
            }
        }
    }
}

impl std::error::Error for BidError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealError {
    PlayerCount(usize),
    RoundOutOfRange { round: u8, max: u8 },
    NotEnoughCards { needed: usize, available: usize },
}

impl fmt::Display for DealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealError::PlayerCount(count) => write!(
                f,
                "{count} players is outside the supported {MIN_PLAYERS}..={MAX_PLAYERS}"
            ),
            DealError::RoundOutOfRange { round, max } => {
                write!(f, "round {round} is outside 1..={max}")
            }
            DealError::NotEnoughCards { needed, available } => {
                write!(f, "dealing needs {needed} cards but only {available} remain")
            }
        }
    }
}

impl std::error::Error for DealError {}
