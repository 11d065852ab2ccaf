//! Fixed 2v2 roll seedings.
//!
//! A seeding is a list of rounds, each round a list of matches, each match
//! two teams of two seeds (1-indexed). The tables guarantee that over the
//! whole tournament every player is teamed with every other exactly once and
//! opposed to every other exactly twice; with 5 players everyone additionally
//! sits out exactly one round.

use rand::seq::SliceRandom;
use rand::Rng;

use super::score::{Team, TeamMatch};
use super::{Round, TournamentError};

/// One match worth of seeds: two teams of two.
pub type Seed = [[usize; 2]; 2];

pub const SIZES: [usize; 3] = [4, 5, 8];

const SEEDING_4: [[Seed; 1]; 3] = [
    [[[1, 2], [3, 4]]],
    [[[3, 2], [1, 4]]],
    [[[3, 1], [2, 4]]],
];

const SEEDING_5: [[Seed; 1]; 5] = [
    [[[1, 2], [3, 4]]],
    [[[5, 4], [3, 1]]],
    [[[5, 2], [4, 1]]],
    [[[3, 2], [5, 1]]],
    [[[5, 3], [4, 2]]],
];

const SEEDING_8: [[Seed; 2]; 7] = [
    [[[1, 2], [3, 4]], [[5, 6], [7, 8]]],
    [[[6, 4], [5, 3]], [[7, 1], [8, 2]]],
    [[[7, 2], [5, 4]], [[6, 3], [8, 1]]],
    [[[2, 4], [8, 6]], [[1, 3], [7, 5]]],
    [[[1, 4], [7, 6]], [[8, 5], [2, 3]]],
    [[[8, 4], [1, 5]], [[2, 6], [7, 3]]],
    [[[7, 4], [8, 3]], [[2, 5], [1, 6]]],
];

pub fn seeding(size: usize) -> Result<Vec<Vec<Seed>>, TournamentError> {
    match size {
        4 => Ok(SEEDING_4.iter().map(|r| r.to_vec()).collect()),
        5 => Ok(SEEDING_5.iter().map(|r| r.to_vec()).collect()),
        8 => Ok(SEEDING_8.iter().map(|r| r.to_vec()).collect()),
        n => Err(TournamentError::UnsupportedSize(n)),
    }
}

pub fn nb_rounds(size: usize) -> Result<usize, TournamentError> {
    seeding(size).map(|s| s.len())
}

pub fn matches_per_round(size: usize) -> Result<usize, TournamentError> {
    seeding(size).map(|s| s[0].len())
}

/// A uniformly random seat order for `n` players.
pub fn shuffled_order<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// Instantiates the rounds for `order.len()` players, `order[i]` being the
/// player index seated at seed `i + 1`.
pub fn build_rounds(order: &[usize]) -> Result<Vec<Round>, TournamentError> {
    let table = seeding(order.len())?;
    let rounds = table
        .iter()
        .map(|matches| Round {
            matches: matches
                .iter()
                .map(|seed| {
                    let team =
                        |pair: &[usize; 2]| Team::new(pair.iter().map(|&s| order[s - 1]).collect());
                    TeamMatch::new(team(&seed[0]), team(&seed[1]))
                })
                .collect(),
        })
        .collect();
    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn pair_counts(size: usize) -> (HashMap<(usize, usize), u32>, HashMap<(usize, usize), u32>) {
        let mut teammates: HashMap<(usize, usize), u32> = HashMap::new();
        let mut opponents: HashMap<(usize, usize), u32> = HashMap::new();
        let key = |a: usize, b: usize| (a.min(b), a.max(b));
        for round in seeding(size).unwrap() {
            for m in round {
                for team in m {
                    *teammates.entry(key(team[0], team[1])).or_default() += 1;
                }
                for &a in &m[0] {
                    for &b in &m[1] {
                        *opponents.entry(key(a, b)).or_default() += 1;
                    }
                }
            }
        }
        (teammates, opponents)
    }

    fn check_pairings(size: usize) {
        let (teammates, opponents) = pair_counts(size);
        let nb_pairs = size * (size - 1) / 2;
        assert_eq!(teammates.len(), nb_pairs, "size {size}: every pair teams up");
        assert!(
            teammates.values().all(|&c| c == 1),
            "size {size}: teammates exactly once"
        );
        assert_eq!(opponents.len(), nb_pairs, "size {size}: every pair opposed");
        assert!(
            opponents.values().all(|&c| c == 2),
            "size {size}: opponents exactly twice"
        );
    }

    #[test]
    fn pairings_4() {
        check_pairings(4);
    }

    #[test]
    fn pairings_5() {
        check_pairings(5);
    }

    #[test]
    fn pairings_8() {
        check_pairings(8);
    }

    #[test]
    fn nobody_plays_twice_in_a_round() {
        for size in SIZES {
            for round in seeding(size).unwrap() {
                let mut seen = vec![];
                for m in round {
                    for team in m {
                        for p in team {
                            assert!(!seen.contains(&p), "size {size}: seed {p} plays twice");
                            seen.push(p);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn five_player_rest_is_balanced() {
        let mut rests: HashMap<usize, u32> = HashMap::new();
        for round in seeding(5).unwrap() {
            let playing: Vec<usize> = round.iter().flatten().flatten().copied().collect();
            for p in 1..=5 {
                if !playing.contains(&p) {
                    *rests.entry(p).or_default() += 1;
                }
            }
        }
        assert_eq!(rests.len(), 5);
        assert!(rests.values().all(|&c| c == 1));
    }

    #[test]
    fn unsupported_sizes_are_refused() {
        assert!(matches!(
            seeding(6),
            Err(TournamentError::UnsupportedSize(6))
        ));
        assert!(matches!(build_rounds(&[0, 1, 2]), Err(_)));
    }

    #[test]
    fn build_rounds_applies_the_seat_order() {
        // identity order: round 1 of a 4-player bracket is (0,1) vs (2,3)
        let rounds = build_rounds(&[0, 1, 2, 3]).unwrap();
        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[0].matches[0].teams[0].players, vec![0, 1]);
        assert_eq!(rounds[0].matches[0].teams[1].players, vec![2, 3]);
        // reversed order swaps the seats accordingly
        let rounds = build_rounds(&[3, 2, 1, 0]).unwrap();
        assert_eq!(rounds[0].matches[0].teams[0].players, vec![3, 2]);
        assert_eq!(rounds[0].matches[0].teams[1].players, vec![1, 0]);
    }

    #[test]
    fn shuffled_order_is_a_permutation() {
        let mut rng = rand::thread_rng();
        for n in SIZES {
            let mut order = shuffled_order(n, &mut rng);
            order.sort_unstable();
            assert_eq!(order, (0..n).collect::<Vec<_>>());
        }
    }
}
