/// Deterministic seat orderings for a table of `seats` agents.
pub struct SeatPermutations {
    permutations: Vec<Vec<usize>>,
}

impl SeatPermutations {
    pub fn new(seats: usize, count: usize) -> Self {
        let limit = count.min(super::MAX_SEAT_PERMUTATIONS);
        let mut permutations = Vec::with_capacity(limit);
        let mut base: Vec<usize> = (0..seats).collect();
        if seats > 0 {
            generate(&mut base, 0, limit, &mut permutations);
        }
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.permutations
    }
}

fn generate(data: &mut [usize], start: usize, limit: usize, output: &mut Vec<Vec<usize>>) {
    if output.len() >= limit {
        return;
    }

    if start == data.len() - 1 {
        output.push(data.to_vec());
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, limit, output);
        data.swap(start, idx);
        if output.len() >= limit {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_identity_first() {
        let perms = SeatPermutations::new(3, 1);
        assert_eq!(perms.as_slice(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn caps_at_twenty_four() {
        let perms = SeatPermutations::new(5, 100);
        assert_eq!(perms.as_slice().len(), 24);
    }

    #[test]
    fn small_tables_stop_at_the_factorial() {
        let perms = SeatPermutations::new(2, 10);
        assert_eq!(perms.as_slice(), &[vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn orderings_are_unique() {
        let perms = SeatPermutations::new(4, 24);
        let mut seen = perms.as_slice().to_vec();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 24);
    }
}
