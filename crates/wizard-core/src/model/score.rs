use crate::model::player::PlayerId;

pub const EXACT_BID_BONUS: i32 = 20;
pub const POINTS_PER_TRICK: i32 = 10;
pub const POINTS_PER_MISS: i32 = 10;

/// Points for one round: a made bid earns the bonus plus ten per trick, a
/// missed bid loses ten per trick of difference.
pub fn round_points(bid: u8, won: u8) -> i32 {
    if bid == won {
        EXACT_BID_BONUS + POINTS_PER_TRICK * i32::from(won)
    } else {
        -POINTS_PER_MISS * (i32::from(bid) - i32::from(won)).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBoard {
    totals: Vec<i32>,
}

impl ScoreBoard {
    pub fn new(player_count: usize) -> Self {
        Self {
            totals: vec![0; player_count],
        }
    }

    pub fn add_points(&mut self, seat: PlayerId, points: i32) {
        if let Some(total) = self.totals.get_mut(seat.index()) {
            *total += points;
        }
    }

    pub fn set_totals(&mut self, totals: &[i32]) {
        self.totals.clear();
        self.totals.extend_from_slice(totals);
    }

    pub fn score(&self, seat: PlayerId) -> i32 {
        self.totals.get(seat.index()).copied().unwrap_or(0)
    }

    pub fn standings(&self) -> &[i32] {
        &self.totals
    }

    /// Highest total; ties go to the earliest seat.
    pub fn leading_player(&self) -> PlayerId {
        self.totals
            .iter()
            .enumerate()
            .fold(None::<(usize, i32)>, |best, (idx, &score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((idx, score)),
            })
            .and_then(|(idx, _)| PlayerId::from_index(idx))
            .unwrap_or(PlayerId::new(0))
    }

    pub fn apply_round(&mut self, points: &[i32]) {
        for (total, delta) in self.totals.iter_mut().zip(points) {
            *total += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreBoard, round_points};
    use crate::model::player::PlayerId;

    #[test]
    fn exact_bid_scores_bonus_and_tricks() {
        assert_eq!(round_points(0, 0), 20);
        assert_eq!(round_points(3, 3), 50);
    }

    #[test]
    fn missed_bid_loses_ten_per_trick() {
        assert_eq!(round_points(2, 0), -20);
        assert_eq!(round_points(1, 4), -30);
    }

    #[test]
    fn scoreboard_accumulates_rounds() {
        let mut board = ScoreBoard::new(3);
        board.apply_round(&[20, -10, 30]);
        board.apply_round(&[30, 20, -20]);
        assert_eq!(board.standings(), &[50, 10, 10]);
        assert_eq!(board.leading_player(), PlayerId::new(0));
    }

    #[test]
    fn leading_player_breaks_ties_by_seat() {
        let mut board = ScoreBoard::new(4);
        board.set_totals(&[10, 40, 40, 0]);
        assert_eq!(board.leading_player(), PlayerId::new(1));
        board.add_points(PlayerId::new(3), 100);
        assert_eq!(board.score(PlayerId::new(3)), 100);
        assert_eq!(board.leading_player(), PlayerId::new(3));
    }
}
