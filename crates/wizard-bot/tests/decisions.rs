use rand::SeedableRng;
use rand::rngs::{SmallRng, StdRng};
use std::time::Duration;
use wizard_bot::policy::heuristic::{heuristic_bid, heuristic_card};
use wizard_bot::search::random_playout;
use wizard_bot::{DecisionConfig, DecisionSource, FallbackReason, choose_bid, choose_card};
use wizard_core::game::GameView;
use wizard_core::model::action::Action;
use wizard_core::model::card::Card;
use wizard_core::model::deck::Deck;
use wizard_core::model::hand::Hand;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::RoundState;
use wizard_core::model::suit::Suit;

fn suited(value: u8, suit: Suit) -> Card {
    Card::suited(value, suit).unwrap()
}

fn dealt_round(seed: u64, players: usize, round_number: u8, dealer: u8) -> RoundState {
    let mut rng = StdRng::seed_from_u64(seed);
    let deck = Deck::shuffled(&mut rng);
    RoundState::deal(deck, players, round_number, PlayerId::new(dealer), &mut rng).unwrap()
}

fn bid_everyone(round: &mut RoundState, value: u8) {
    for _ in 0..round.player_count() {
        round.apply(&Action::Bid { value }).unwrap();
    }
}

/// Small, iteration-bound search that the clock never interrupts.
fn bounded_config() -> DecisionConfig {
    DecisionConfig::new(1000, Duration::from_secs(60))
        .with_max_determinizations(4)
        .with_iterations_per_determinization(40)
}

#[test]
fn one_card_rounds_always_bid_zero_or_one() {
    let config = DecisionConfig::new(1000, Duration::from_millis(200));
    for seed in 0..40 {
        let round = dealt_round(seed, 4, 1, 3);
        let mut rng = SmallRng::seed_from_u64(seed);
        let decision = choose_bid(&round, PlayerId::new(0), &config, &mut rng).unwrap();
        assert!(decision.choice <= 1);
        assert_eq!(
            decision.source,
            DecisionSource::Fallback(FallbackReason::TrivialBidRange)
        );
    }
}

#[test]
fn searched_bids_stay_in_range() {
    for seed in 0..5 {
        let round = dealt_round(seed, 4, 3, 3);
        let mut rng = SmallRng::seed_from_u64(seed);
        let decision = choose_bid(&round, PlayerId::new(0), &bounded_config(), &mut rng).unwrap();
        assert!(decision.choice <= 3);
        match decision.source {
            DecisionSource::Search {
                determinizations,
                trials,
            } => {
                assert_eq!(determinizations, 4);
                assert_eq!(trials, 4 * 4 * 10);
            }
            other => panic!("expected search, got {other:?}"),
        }
    }
}

#[test]
fn small_iteration_budget_uses_heuristic_bid() {
    let round = dealt_round(2, 3, 5, 2);
    let config = DecisionConfig::new(99, Duration::from_secs(5));
    let mut rng = SmallRng::seed_from_u64(1);
    let mut replay = SmallRng::seed_from_u64(1);
    let decision = choose_bid(&round, PlayerId::new(0), &config, &mut rng).unwrap();
    assert_eq!(
        decision.source,
        DecisionSource::Fallback(FallbackReason::BudgetTooSmall)
    );
    assert_eq!(
        decision.choice,
        heuristic_bid(round.hand(PlayerId::new(0)), 5, &mut replay)
    );
}

#[test]
fn bid_is_none_when_not_on_turn() {
    let round = dealt_round(4, 4, 3, 0);
    let mut rng = SmallRng::seed_from_u64(0);
    assert!(choose_bid(&round, PlayerId::new(2), &bounded_config(), &mut rng).is_none());
    assert!(choose_card(&round, PlayerId::new(1), &bounded_config(), &mut rng).is_none());
}

#[test]
fn single_legal_card_is_forced() {
    let hands = vec![
        Hand::with_cards(vec![suited(12, Suit::Red), suited(3, Suit::Blue)]),
        Hand::with_cards(vec![suited(5, Suit::Red), suited(9, Suit::Green)]),
    ];
    let mut round = RoundState::from_parts(
        hands,
        Vec::new(),
        2,
        PlayerId::new(1),
        Some(suited(1, Suit::Yellow)),
        Some(Suit::Yellow),
    );
    bid_everyone(&mut round, 1);
    round
        .apply(&Action::Play {
            card: suited(12, Suit::Red),
            player: PlayerId::new(0),
        })
        .unwrap();

    let config = DecisionConfig::new(1000, Duration::from_secs(60));
    let mut rng = SmallRng::seed_from_u64(0);
    let decision = choose_card(&round, PlayerId::new(1), &config, &mut rng).unwrap();
    assert_eq!(decision.choice, suited(5, Suit::Red));
    assert_eq!(decision.source, DecisionSource::Forced);
}

#[test]
fn wizard_wins_the_trick_in_every_playout() {
    let hands = vec![
        Hand::with_cards(vec![suited(13, Suit::Red), suited(2, Suit::Blue)]),
        Hand::with_cards(vec![Card::Wizard, suited(4, Suit::Green)]),
        Hand::with_cards(vec![suited(12, Suit::Red), suited(11, Suit::Red)]),
    ];
    let mut start = RoundState::from_parts(
        hands,
        Vec::new(),
        2,
        PlayerId::new(2),
        Some(suited(1, Suit::Red)),
        Some(Suit::Red),
    );
    bid_everyone(&mut start, 1);
    start
        .apply(&Action::Play {
            card: suited(13, Suit::Red),
            player: PlayerId::new(0),
        })
        .unwrap();
    start
        .apply(&Action::Play {
            card: Card::Wizard,
            player: PlayerId::new(1),
        })
        .unwrap();

    let mut rng = SmallRng::seed_from_u64(12);
    for _ in 0..100 {
        let mut playout = start.clone();
        random_playout(&mut playout, &mut rng);
        assert!(playout.is_terminal());
        let first = &playout.trick_history()[0];
        assert_eq!(first.winner(playout.trump_suit()), Some(PlayerId::new(1)));
    }
}

#[test]
fn zero_time_limit_returns_the_heuristic_answer() {
    let config = DecisionConfig::new(1000, Duration::ZERO);

    let round = dealt_round(8, 4, 6, 3);
    let seat = PlayerId::new(0);
    let mut rng = SmallRng::seed_from_u64(3);
    let mut replay = SmallRng::seed_from_u64(3);
    let bid = choose_bid(&round, seat, &config, &mut rng).unwrap();
    assert_eq!(
        bid.source,
        DecisionSource::Fallback(FallbackReason::TimeExhausted)
    );
    assert_eq!(bid.choice, heuristic_bid(round.hand(seat), 6, &mut replay));

    let mut playing = round.clone();
    bid_everyone(&mut playing, 2);
    let legal = playing.legal_cards(seat);
    assert!(legal.len() > 1);
    let card = choose_card(&playing, seat, &config, &mut rng).unwrap();
    assert_eq!(
        card.source,
        DecisionSource::Fallback(FallbackReason::TimeExhausted)
    );
    assert_eq!(
        Some(card.choice),
        heuristic_card(&legal, playing.current_trick())
    );
}

#[test]
fn no_determinizations_falls_back_without_samples() {
    let config = bounded_config().with_max_determinizations(0);
    let round = dealt_round(8, 4, 6, 3);
    let mut rng = SmallRng::seed_from_u64(3);
    let bid = choose_bid(&round, PlayerId::new(0), &config, &mut rng).unwrap();
    assert_eq!(bid.source, DecisionSource::Fallback(FallbackReason::NoSamples));
}

#[test]
fn searched_card_is_legal_and_reproducible() {
    let mut round = dealt_round(13, 4, 5, 1);
    bid_everyone(&mut round, 1);
    let seat = round.current_player().unwrap();
    let legal = round.legal_cards(seat);
    assert!(legal.len() > 1);

    let mut first_rng = SmallRng::seed_from_u64(77);
    let mut second_rng = SmallRng::seed_from_u64(77);
    let first = choose_card(&round, seat, &bounded_config(), &mut first_rng).unwrap();
    let second = choose_card(&round, seat, &bounded_config(), &mut second_rng).unwrap();

    assert!(legal.contains(&first.choice));
    assert_eq!(first, second);
    assert!(matches!(
        first.source,
        DecisionSource::Search {
            determinizations: 4,
            ..
        }
    ));
}

#[test]
fn budgets_too_thin_for_a_single_trial_fall_back() {
    let config = bounded_config().with_iterations_per_determinization(5);
    let round = dealt_round(8, 4, 5, 3);
    let seat = PlayerId::new(0);
    let mut rng = SmallRng::seed_from_u64(3);
    let mut replay = SmallRng::seed_from_u64(3);
    let bid = choose_bid(&round, seat, &config, &mut rng).unwrap();
    assert_eq!(bid.source, DecisionSource::Fallback(FallbackReason::NoSamples));
    assert_eq!(bid.choice, heuristic_bid(round.hand(seat), 5, &mut replay));

    let mut playing = round.clone();
    bid_everyone(&mut playing, 1);
    let legal = playing.legal_cards(seat);
    assert!(legal.len() > 1);
    let config = config.with_iterations_per_determinization(1);
    let card = choose_card(&playing, seat, &config, &mut rng).unwrap();
    assert_eq!(
        card.source,
        DecisionSource::Fallback(FallbackReason::NoSamples)
    );
    assert_eq!(
        Some(card.choice),
        heuristic_card(&legal, playing.current_trick())
    );
}
