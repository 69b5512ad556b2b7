use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::{SmallRng, StdRng};
use std::time::Duration;
use wizard_bot::{DecisionConfig, choose_bid, choose_card};
use wizard_core::game::GameView;
use wizard_core::model::action::Action;
use wizard_core::model::deck::Deck;
use wizard_core::model::player::PlayerId;
use wizard_core::model::round::RoundState;

fn dealt_round(seed: u64, round_number: u8) -> RoundState {
    let mut rng = StdRng::seed_from_u64(seed);
    let deck = Deck::shuffled(&mut rng);
    RoundState::deal(deck, 4, round_number, PlayerId::new(3), &mut rng)
        .expect("four players can be dealt this round")
}

fn config() -> DecisionConfig {
    DecisionConfig::new(1000, Duration::from_secs(10))
        .with_max_determinizations(8)
        .with_iterations_per_determinization(100)
}

fn bench_decisions(c: &mut Criterion) {
    let mut group = c.benchmark_group("decision");
    group.sample_size(10);

    for (seed, round_number) in [(42u64, 3u8), (8675309, 7), (12345, 12)] {
        group.bench_function(format!("bid_seed{seed}_round{round_number}"), |b| {
            b.iter_batched(
                || (dealt_round(seed, round_number), SmallRng::seed_from_u64(seed)),
                |(round, mut rng)| choose_bid(&round, PlayerId::new(0), &config(), &mut rng),
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("card_seed{seed}_round{round_number}"), |b| {
            b.iter_batched(
                || {
                    let mut round = dealt_round(seed, round_number);
                    while round.current_player() != Some(PlayerId::new(0))
                        || round.bids().iter().any(Option::is_none)
                    {
                        if round.apply(&Action::Bid { value: 1 }).is_err() {
                            break;
                        }
                    }
                    (round, SmallRng::seed_from_u64(seed))
                },
                |(round, mut rng)| choose_card(&round, PlayerId::new(0), &config(), &mut rng),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decisions);
criterion_main!(benches);
