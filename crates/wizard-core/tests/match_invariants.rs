use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use wizard_core::belief::Determinizer;
use wizard_core::game::GameView;
use wizard_core::game::match_state::MatchState;
use wizard_core::model::deck::{Deck, canonical};
use wizard_core::model::player::PlayerId;

fn full_deck() -> Vec<wizard_core::model::card::Card> {
    canonical(Deck::standard().into_cards())
}

#[test]
fn random_matches_keep_the_deck_intact() {
    for player_count in 2..=6 {
        let mut rng = StdRng::seed_from_u64(player_count as u64 * 97);
        let mut match_state = MatchState::with_seed(player_count, 42).unwrap();
        let mut rounds_scored = 0;

        while !match_state.is_over() {
            let round = match_state.round_mut();
            while !round.is_terminal() {
                assert_eq!(canonical(round.card_multiset()), full_deck());
                let actions = round.legal_actions();
                assert!(!actions.is_empty());
                let action = *actions.choose(&mut rng).unwrap();
                round.apply(&action).unwrap();
            }

            let won: u32 = round.tricks_won().iter().map(|&t| u32::from(t)).sum();
            assert_eq!(won, u32::from(round.round_number()));
            assert!(round.hands().iter().all(|hand| hand.is_empty()));

            match_state.finish_round_and_start_next().unwrap();
            rounds_scored += 1;
        }

        assert_eq!(rounds_scored, 60 / player_count);
        let summed: i32 = match_state
            .history()
            .iter()
            .map(|record| record.scores.iter().sum::<i32>())
            .sum();
        assert_eq!(summed, match_state.scores().standings().iter().sum::<i32>());
    }
}

#[test]
fn determinizations_during_play_keep_the_deck_intact() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut match_state = MatchState::with_seed(5, 8).unwrap();
    for _ in 0..6 {
        match_state.finish_round_and_start_next().unwrap();
        let round = match_state.round_mut();
        while !round.is_terminal() {
            let seat = round.current_player().unwrap();
            let sample = Determinizer::determinize(round, seat, &mut rng);
            assert!(sample.is_sampled());
            assert_eq!(canonical(sample.state().card_multiset()), full_deck());
            assert_eq!(sample.state().hand(seat), round.hand(seat));
            for other in PlayerId::seats(5) {
                assert_eq!(
                    sample.state().hand(other).len(),
                    round.public_hand_size(other)
                );
            }

            let actions = round.legal_actions();
            let action = *actions.choose(&mut rng).unwrap();
            round.apply(&action).unwrap();
        }
    }
}
