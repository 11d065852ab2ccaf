//! Score bookkeeping for 2v2 roll matches.
//!
//! A match is a BO1 that ends when a team reaches [`POINTS_TO_WIN`] raw
//! points. Raw points come in three kinds (kills, first turret, first player
//! to 100 cs), each with a per-team cap. Personal points use the kind
//! weights, which are chosen so that the rounded value equals the raw count
//! while exact comparisons order kills > turrets > cs.

use serde::{Deserialize, Serialize};

use super::TournamentError;

pub const POINTS_TO_WIN: u8 = 2;

pub struct ScoreKind {
    pub name: &'static str,
    pub emoji: &'static str,
    pub weight: f64,
    pub per_team: u8,
}

pub const KILL: usize = 0;
pub const TURRET: usize = 1;
pub const CS: usize = 2;

pub const SCORE_KINDS: [ScoreKind; 3] = [
    ScoreKind {
        name: "Kill",
        emoji: "⚔️",
        weight: 1.001,
        per_team: 2,
    },
    ScoreKind {
        name: "Tourelle",
        emoji: "🗼",
        weight: 1.0,
        per_team: 1,
    },
    ScoreKind {
        name: "100cs",
        emoji: "🌾",
        weight: 0.989,
        per_team: 1,
    },
];

/// Accepts the kind names admins actually type.
pub fn parse_kind(s: &str) -> Option<usize> {
    match s.to_lowercase().as_str() {
        "k" | "kill" | "kills" => Some(KILL),
        "t" | "tour" | "tourelle" | "turret" => Some(TURRET),
        "c" | "cs" | "100cs" => Some(CS),
        _ => None,
    }
}

pub fn raw_points(counters: &[u8]) -> u8 {
    counters.iter().sum()
}

pub fn weighted_points(counters: &[u8]) -> f64 {
    counters
        .iter()
        .zip(SCORE_KINDS.iter())
        .map(|(&c, k)| f64::from(c) * k.weight)
        .sum()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Indices into the tournament's player list.
    pub players: Vec<usize>,
    pub counters: Vec<u8>,
}

impl Team {
    pub fn new(players: Vec<usize>) -> Self {
        Self {
            players,
            counters: vec![0; SCORE_KINDS.len()],
        }
    }

    pub fn raw_points(&self) -> u8 {
        raw_points(&self.counters)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMatch {
    pub teams: [Team; 2],
    pub winner: Option<usize>,
}

impl TeamMatch {
    pub fn new(blue: Team, red: Team) -> Self {
        Self {
            teams: [blue, red],
            winner: None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// Adjusts one counter of one team by a signed delta.
    ///
    /// Positive deltas are refused once the match is over or when the kind's
    /// per-team cap would be exceeded. Negative deltas floor at zero; they
    /// reopen a finished match only when they take the winner back under
    /// the threshold. Returns `true` when the update just completed the
    /// match.
    pub fn set_score(
        &mut self,
        team: usize,
        kind: usize,
        delta: i8,
    ) -> Result<bool, TournamentError> {
        if team >= self.teams.len() {
            return Err(TournamentError::UnknownTeam(team));
        }
        if kind >= SCORE_KINDS.len() {
            return Err(TournamentError::UnknownScoreKind(kind));
        }
        if delta >= 0 && self.is_over() {
            return Err(TournamentError::MatchOver);
        }
        let counters = &mut self.teams[team].counters;
        if delta >= 0 {
            let cap = SCORE_KINDS[kind].per_team;
            let next = counters[kind] + delta as u8;
            if next > cap {
                return Err(TournamentError::OverCap {
                    kind: SCORE_KINDS[kind].name,
                    cap,
                });
            }
            counters[kind] = next;
        } else {
            counters[kind] = counters[kind].saturating_sub(delta.unsigned_abs());
        }
        let was_over = self.is_over();
        self.winner = self
            .teams
            .iter()
            .position(|t| t.raw_points() >= POINTS_TO_WIN);
        Ok(!was_over && self.is_over())
    }

    /// `"2 - 1"` style live score, raw points.
    pub fn score_line(&self) -> String {
        format!(
            "{} - {}",
            self.teams[0].raw_points(),
            self.teams[1].raw_points()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_of_four() -> TeamMatch {
        TeamMatch::new(Team::new(vec![0, 1]), Team::new(vec![2, 3]))
    }

    #[test]
    fn match_ends_at_two_points() {
        let mut m = match_of_four();
        assert_eq!(m.set_score(0, KILL, 1), Ok(false));
        assert!(!m.is_over());
        assert_eq!(m.set_score(0, TURRET, 1), Ok(true));
        assert_eq!(m.winner, Some(0));
        assert_eq!(m.set_score(1, KILL, 1), Err(TournamentError::MatchOver));
    }

    #[test]
    fn caps_are_enforced_per_kind() {
        let mut m = match_of_four();
        assert_eq!(m.set_score(1, TURRET, 1), Ok(false));
        assert_eq!(
            m.set_score(1, TURRET, 1),
            Err(TournamentError::OverCap {
                kind: "Tourelle",
                cap: 1
            })
        );
        // two kills on the other side is a win
        assert_eq!(m.set_score(0, KILL, 2), Ok(true));
    }

    #[test]
    fn negative_delta_reopens_a_match() {
        let mut m = match_of_four();
        m.set_score(0, KILL, 2).unwrap();
        assert!(m.is_over());
        assert_eq!(m.set_score(0, KILL, -1), Ok(false));
        assert_eq!(m.winner, None);
        assert_eq!(m.teams[0].counters[KILL], 1);
        // floors at zero
        assert_eq!(m.set_score(0, KILL, -5), Ok(false));
        assert_eq!(m.teams[0].counters[KILL], 0);
    }

    #[test]
    fn correcting_the_loser_keeps_the_match_closed() {
        let mut m = match_of_four();
        m.set_score(1, TURRET, 1).unwrap();
        m.set_score(0, KILL, 2).unwrap();
        assert_eq!(m.set_score(1, TURRET, -1), Ok(false));
        assert_eq!(m.winner, Some(0));
        assert_eq!(m.score_line(), "2 - 0");
    }

    #[test]
    fn floored_correction_does_not_resignal_completion() {
        let mut m = match_of_four();
        m.set_score(0, KILL, 2).unwrap();
        // team 0 has no turret to remove; the match must stay won, once
        assert_eq!(m.set_score(0, TURRET, -1), Ok(false));
        assert_eq!(m.winner, Some(0));
    }

    #[test]
    fn weights_order_kills_over_turrets_over_cs() {
        let kills = weighted_points(&[1, 0, 0]);
        let turret = weighted_points(&[0, 1, 0]);
        let cs = weighted_points(&[0, 0, 1]);
        assert!(kills > turret && turret > cs);
        // all three round to one displayed point
        assert_eq!(kills.round() as u8, 1);
        assert_eq!(turret.round() as u8, 1);
        assert_eq!(cs.round() as u8, 1);
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(parse_kind("K"), Some(KILL));
        assert_eq!(parse_kind("tourelle"), Some(TURRET));
        assert_eq!(parse_kind("100cs"), Some(CS));
        assert_eq!(parse_kind("dragon"), None);
    }
}
