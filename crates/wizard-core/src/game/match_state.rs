use crate::game::serialization::{MatchLog, RoundRecord};
use crate::model::deck::Deck;
use crate::model::player::PlayerId;
use crate::model::round::{DealError, RoundState, max_rounds};
use crate::model::score::ScoreBoard;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone)]
pub struct MatchState {
    player_count: usize,
    scores: ScoreBoard,
    round_number: u8,
    dealer: PlayerId,
    current_round: RoundState,
    history: Vec<RoundRecord>,
    finished: bool,
    rng: StdRng,
    seed: u64,
}

impl MatchState {
    pub fn new(player_count: usize) -> Result<Self, DealError> {
        let seed: u64 = rand::random();
        Self::with_seed(player_count, seed)
    }

    pub fn with_seed(player_count: usize, seed: u64) -> Result<Self, DealError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dealer = PlayerId::new(0);
        let deck = Deck::shuffled(&mut rng);
        let current_round = RoundState::deal(deck, player_count, 1, dealer, &mut rng)?;

        Ok(Self {
            player_count,
            scores: ScoreBoard::new(player_count),
            round_number: 1,
            dealer,
            current_round,
            history: Vec::new(),
            finished: false,
            rng,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn round_mut(&mut self) -> &mut RoundState {
        &mut self.current_round
    }

    pub fn round_number(&self) -> u8 {
        self.round_number
    }

    pub fn max_rounds(&self) -> u8 {
        max_rounds(self.player_count)
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn is_over(&self) -> bool {
        self.finished
    }

    pub fn is_round_ready_for_scoring(&self) -> bool {
        !self.finished && self.current_round.is_complete()
    }

    /// Scores the finished round and deals the next one, or ends the match
    /// after the last round. Returns the record of the scored round.
    pub fn finish_round_and_start_next(&mut self) -> Result<Option<RoundRecord>, DealError> {
        let Some(record) = RoundRecord::capture(&self.current_round) else {
            return Ok(None);
        };
        if self.finished {
            return Ok(None);
        }

        self.scores.apply_round(&record.scores);
        self.history.push(record.clone());

        if self.round_number >= self.max_rounds() {
            self.finished = true;
            return Ok(Some(record));
        }

        self.round_number += 1;
        self.dealer = self.dealer.next(self.player_count);
        let deck = Deck::shuffled(&mut self.rng);
        self.current_round = RoundState::deal(
            deck,
            self.player_count,
            self.round_number,
            self.dealer,
            &mut self.rng,
        )?;
        Ok(Some(record))
    }

    pub fn to_log(&self) -> MatchLog {
        MatchLog {
            seed: self.seed,
            player_count: self.player_count,
            rounds: self.history.clone(),
            final_scores: self.scores.standings().to_vec(),
        }
    }
}
