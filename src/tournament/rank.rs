//! Standings, rank evolution and finale computation.

use std::cmp::Ordering;

use super::score::{weighted_points, SCORE_KINDS};
use super::Tournament;

#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub player: usize,
    pub points: f64,
    /// Per-kind totals over the whole tournament, same order as
    /// [`SCORE_KINDS`].
    pub counters: Vec<u16>,
}

impl Standing {
    pub fn rounded_points(&self) -> i64 {
        self.points.round() as i64
    }
}

/// Players ordered by weighted points, considering only the first
/// `nb_rounds` rounds. Ties that survive the weighting (identical counters)
/// keep the seat order stable.
pub fn standings_upto(t: &Tournament, nb_rounds: usize) -> Vec<Standing> {
    let mut all: Vec<Standing> = (0..t.players.len())
        .map(|player| Standing {
            player,
            points: 0.0,
            counters: vec![0; SCORE_KINDS.len()],
        })
        .collect();
    for round in t.rounds.iter().take(nb_rounds) {
        for m in &round.matches {
            for team in &m.teams {
                for &p in &team.players {
                    let s = &mut all[p];
                    s.points += weighted_points(&team.counters);
                    for (total, &c) in s.counters.iter_mut().zip(team.counters.iter()) {
                        *total += u16::from(c);
                    }
                }
            }
        }
    }
    all.sort_by(|a, b| b.points.partial_cmp(&a.points).unwrap_or(Ordering::Equal));
    all
}

pub fn standings(t: &Tournament) -> Vec<Standing> {
    standings_upto(t, t.rounds.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evolution {
    Up,
    Down,
    Same,
}

impl Evolution {
    pub fn emote(self) -> &'static str {
        match self {
            Evolution::Up => "⬆️",
            Evolution::Down => "⬇️",
            Evolution::Same => "➖",
        }
    }
}

/// Movement of each ranked player against the ranking as it stood after the
/// previous completed round. Flat while the first round is still running.
pub fn evolutions(t: &Tournament, current: &[Standing]) -> Vec<Evolution> {
    let done = t.completed_rounds();
    let reference = match t.current_round() {
        Some(0) | None if done == 0 => return vec![Evolution::Same; current.len()],
        Some(r) => standings_upto(t, r),
        // tournament over: compare the final ranking to the one before the
        // last round
        None => standings_upto(t, done - 1),
    };
    current
        .iter()
        .enumerate()
        .map(|(pos, s)| {
            match reference
                .iter()
                .position(|r| r.player == s.player)
                .map(|prev| pos.cmp(&prev))
            {
                Some(Ordering::Less) => Evolution::Up,
                Some(Ordering::Greater) => Evolution::Down,
                _ => Evolution::Same,
            }
        })
        .collect()
}

/// Mean squared deviation of player points from the mean. Close to zero
/// means a tight tournament.
pub fn spread_mse(standings: &[Standing]) -> f64 {
    if standings.is_empty() {
        return 0.0;
    }
    let n = standings.len() as f64;
    let mean = standings.iter().map(|s| s.points).sum::<f64>() / n;
    standings
        .iter()
        .map(|s| (s.points - mean).powi(2))
        .sum::<f64>()
        / n
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finale {
    pub first: usize,
    pub second: usize,
    /// Wins the leader starts the BO5 with, at most 2.
    pub advance: u8,
    /// Points of gap buying one advance win.
    pub gap_per_advance: i64,
    /// Second and third place are perfectly tied: a 1-point BO1 must settle
    /// who enters the finale.
    pub tied_for_second: bool,
}

/// BO5 finale between the top two once every round is played.
pub fn finale(t: &Tournament) -> Option<Finale> {
    if t.rounds.is_empty() || !t.is_over() {
        return None;
    }
    let ranking = standings(t);
    let (first, second) = (&ranking[0], &ranking[1]);
    let gap_per_advance = ((t.rounds.len() as f64 * 2.0) / 5.0).round().max(1.0) as i64;
    let gap = first.rounded_points() - second.rounded_points();
    let advance = (gap / gap_per_advance).clamp(0, 2) as u8;
    let tied_for_second = ranking
        .get(2)
        .map(|third| third.counters == second.counters)
        .unwrap_or(false);
    Some(Finale {
        first: first.player,
        second: second.player,
        advance,
        gap_per_advance,
        tied_for_second,
    })
}

#[cfg(test)]
mod tests {
    use super::super::score::{CS, KILL, TURRET};
    use super::super::{Player, Tournament};
    use super::*;

    fn player(i: usize) -> Player {
        Player {
            user_id: 100 + i as u64,
            name: format!("P{i}"),
        }
    }

    fn tournament_of(n: usize) -> Tournament {
        let mut t = Tournament::new("Test".to_owned());
        t.set_players((0..n).map(player).collect()).unwrap();
        t.generate_rounds(&(0..n).collect::<Vec<_>>()).unwrap();
        t
    }

    /// Player 0 wins every round of a 4-player bracket with kills only.
    /// With the identity seat order, seat 0 sits on team one in rounds 1
    /// and 3 and on team two in round 2.
    fn player_zero_sweeps(t: &mut Tournament) {
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        t.set_score(1, 0, 1, KILL, 2).unwrap();
        t.set_score(2, 0, 0, KILL, 2).unwrap();
    }

    #[test]
    fn standings_accumulate_team_points_per_player() {
        let mut t = tournament_of(4);
        // round 1: (0,1) vs (2,3), team one takes a kill and the turret
        t.set_score(0, 0, 0, KILL, 1).unwrap();
        t.set_score(0, 0, 0, TURRET, 1).unwrap();
        let s = standings(&t);
        assert_eq!(s[0].rounded_points(), 2);
        assert_eq!(s[1].rounded_points(), 2);
        let mut top: Vec<usize> = vec![s[0].player, s[1].player];
        top.sort_unstable();
        assert_eq!(top, vec![0, 1]);
        assert_eq!(s[2].rounded_points(), 0);
    }

    #[test]
    fn kills_break_ties_over_turret_over_cs() {
        let mut t = tournament_of(4);
        // round 1: both teams score 2 raw points, team one via kills,
        // team two via turret + cs (possible when the match is reopened)
        t.set_score(0, 0, 1, TURRET, 1).unwrap();
        t.set_score(0, 0, 1, CS, 1).unwrap();
        t.set_score(0, 0, 0, KILL, -1).unwrap(); // reopen
        t.set_score(0, 0, 0, KILL, 1).unwrap();
        t.set_score(0, 0, 0, KILL, 1).unwrap();
        let s = standings(&t);
        // same rounded points, but the kill pair ranks first
        assert_eq!(s[0].rounded_points(), s[2].rounded_points());
        assert!(s[0].points > s[2].points);
        assert!(s[0].player == 0 || s[0].player == 1);
        assert!(s[2].player == 2 || s[2].player == 3);
    }

    #[test]
    fn evolutions_are_flat_during_the_first_round() {
        let mut t = tournament_of(4);
        t.set_score(0, 0, 0, KILL, 1).unwrap();
        let s = standings(&t);
        assert_eq!(evolutions(&t, &s), vec![Evolution::Same; 4]);
    }

    #[test]
    fn evolutions_track_movement_against_previous_round() {
        let mut t = tournament_of(4);
        // round 1 goes to (0,1)
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        // round 2 is (2,1) vs (0,3); (0,3) takes a first kill, match still
        // running
        t.set_score(1, 0, 1, KILL, 1).unwrap();
        let s = standings(&t);
        let evo = evolutions(&t, &s);
        // player 0 leads and was already first after round 1
        assert_eq!(s[0].player, 0);
        assert_eq!(evo[0], Evolution::Same);
        // player 3 climbed over player 2 with that kill
        let pos3 = s.iter().position(|x| x.player == 3).unwrap();
        assert_eq!(evo[pos3], Evolution::Up);
        let pos2 = s.iter().position(|x| x.player == 2).unwrap();
        assert_eq!(evo[pos2], Evolution::Down);
    }

    #[test]
    fn spread_of_even_points_is_zero() {
        let s = vec![
            Standing {
                player: 0,
                points: 3.0,
                counters: vec![],
            },
            Standing {
                player: 1,
                points: 3.0,
                counters: vec![],
            },
        ];
        assert_eq!(spread_mse(&s), 0.0);
        let s2 = vec![
            Standing {
                player: 0,
                points: 4.0,
                counters: vec![],
            },
            Standing {
                player: 1,
                points: 2.0,
                counters: vec![],
            },
        ];
        assert_eq!(spread_mse(&s2), 1.0);
    }

    #[test]
    fn no_finale_before_the_last_round_is_played() {
        let mut t = tournament_of(4);
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        assert_eq!(finale(&t), None);
    }

    #[test]
    fn finale_advance_follows_the_point_gap() {
        // 4 players, 3 rounds: one advance win per round(6 / 5) = 1 point
        // of gap, capped at 2
        let mut t = tournament_of(4);
        player_zero_sweeps(&mut t);
        let f = finale(&t).unwrap();
        assert_eq!(f.first, 0);
        assert_eq!(f.gap_per_advance, 1);
        // 6 points against 2: way past the cap
        assert_eq!(f.advance, 2);

        // balanced 8-player tournament: winning sides alternate, gaps stay
        // small
        let mut t = tournament_of(8);
        for r in 0..t.rounds.len() {
            for m in 0..t.rounds[r].matches.len() {
                t.set_score(r, m, (r + m) % 2, KILL, 2).unwrap();
            }
        }
        let f = finale(&t).unwrap();
        // 8 players, 7 rounds: round(14 / 5) = 3 points per advance win
        assert_eq!(f.gap_per_advance, 3);
        assert!(f.advance <= 2);
    }

    #[test]
    fn perfect_tie_for_second_is_flagged() {
        // kills only: the three non-winners all end on exactly 2 kills
        let mut t = tournament_of(4);
        player_zero_sweeps(&mut t);
        let f = finale(&t).unwrap();
        assert!(f.tied_for_second);

        // same sweep, but round 3 is won with kill + turret: second place
        // (2 kills) and third place (1 kill, 1 turret) now differ
        let mut t = tournament_of(4);
        t.set_score(0, 0, 1, KILL, 1).unwrap();
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        t.set_score(1, 0, 1, KILL, 2).unwrap();
        t.set_score(2, 0, 0, KILL, 1).unwrap();
        t.set_score(2, 0, 0, TURRET, 1).unwrap();
        let f = finale(&t).unwrap();
        assert!(!f.tied_for_second);
    }
}
