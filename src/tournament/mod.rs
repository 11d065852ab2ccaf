//! 2v2 roll tournament engine.
//!
//! The pure state lives here and in the submodules; everything Discord
//! (channels, roles, messages, buttons) is in [`manager`].

pub mod draft;
pub mod embeds;
pub mod manager;
pub mod rank;
pub mod score;
pub mod seeding;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("{0} joueurs n'est pas une taille valide (4, 5 ou 8)")]
    UnsupportedSize(usize),
    #[error("les joueurs ne sont pas encore définis")]
    PlayersNotSet,
    #[error("le round {0} n'existe pas")]
    UnknownRound(usize),
    #[error("pas de match {0} dans ce round")]
    UnknownMatch(usize),
    #[error("équipe {0} inconnue")]
    UnknownTeam(usize),
    #[error("type de score {0} inconnu")]
    UnknownScoreKind(usize),
    #[error("ce match est déjà terminé")]
    MatchOver,
    #[error("{kind} est limité à {cap} par équipe")]
    OverCap { kind: &'static str, cap: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub user_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub matches: Vec<score::TeamMatch>,
}

impl Round {
    pub fn is_over(&self) -> bool {
        self.matches.iter().all(|m| m.is_over())
    }
}

/// What a score update changed, so the Discord side knows what to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub match_over: bool,
    pub round_over: bool,
    pub tournament_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub name: String,
    pub players: Vec<Player>,
    pub rounds: Vec<Round>,
    /// Riot tournament codes, one list per round.
    pub codes: Vec<Vec<String>>,
}

impl Tournament {
    pub fn new(name: String) -> Self {
        Self {
            name,
            players: Vec::new(),
            rounds: Vec::new(),
            codes: Vec::new(),
        }
    }

    pub fn set_players(&mut self, players: Vec<Player>) -> Result<(), TournamentError> {
        if !seeding::SIZES.contains(&players.len()) {
            return Err(TournamentError::UnsupportedSize(players.len()));
        }
        self.players = players;
        Ok(())
    }

    /// Builds the rounds for the registered players; `order[i]` is the
    /// player seated at seed `i + 1`.
    pub fn generate_rounds(&mut self, order: &[usize]) -> Result<(), TournamentError> {
        if self.players.is_empty() {
            return Err(TournamentError::PlayersNotSet);
        }
        if order.len() != self.players.len() {
            return Err(TournamentError::UnsupportedSize(order.len()));
        }
        self.rounds = seeding::build_rounds(order)?;
        self.codes = vec![Vec::new(); self.rounds.len()];
        Ok(())
    }

    pub fn nb_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// First round with an unfinished match; `None` once everything is
    /// played (or before rounds exist).
    pub fn current_round(&self) -> Option<usize> {
        self.rounds.iter().position(|r| !r.is_over())
    }

    /// Length of the fully played prefix of rounds.
    pub fn completed_rounds(&self) -> usize {
        self.rounds
            .iter()
            .take_while(|r| r.is_over())
            .count()
    }

    pub fn is_over(&self) -> bool {
        !self.rounds.is_empty() && self.rounds.iter().all(|r| r.is_over())
    }

    pub fn round(&self, round: usize) -> Result<&Round, TournamentError> {
        self.rounds
            .get(round)
            .ok_or(TournamentError::UnknownRound(round))
    }

    pub fn team_match(
        &self,
        round: usize,
        m: usize,
    ) -> Result<&score::TeamMatch, TournamentError> {
        self.round(round)?
            .matches
            .get(m)
            .ok_or(TournamentError::UnknownMatch(m))
    }

    pub fn set_score(
        &mut self,
        round: usize,
        m: usize,
        team: usize,
        kind: usize,
        delta: i8,
    ) -> Result<ScoreUpdate, TournamentError> {
        let r = self
            .rounds
            .get_mut(round)
            .ok_or(TournamentError::UnknownRound(round))?;
        let tm = r
            .matches
            .get_mut(m)
            .ok_or(TournamentError::UnknownMatch(m))?;
        let match_over = tm.set_score(team, kind, delta)?;
        let round_over = r.is_over();
        Ok(ScoreUpdate {
            match_over,
            round_over,
            tournament_over: self.is_over(),
        })
    }

    pub fn set_codes(&mut self, round: usize, codes: Vec<String>) -> Result<(), TournamentError> {
        if round >= self.rounds.len() {
            return Err(TournamentError::UnknownRound(round));
        }
        self.codes[round] = codes;
        Ok(())
    }

    pub fn code(&self, round: usize, m: usize) -> Option<&str> {
        self.codes.get(round)?.get(m).map(String::as_str)
    }

    pub fn player_name(&self, idx: usize) -> &str {
        self.players.get(idx).map(|p| p.name.as_str()).unwrap_or("?")
    }

    /// `"Alice & Bob"`
    pub fn team_names(&self, team: &score::Team) -> String {
        team.players
            .iter()
            .map(|&p| self.player_name(p))
            .collect::<Vec<_>>()
            .join(" & ")
    }
}

#[cfg(test)]
mod tests {
    use super::score::KILL;
    use super::*;

    fn players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player {
                user_id: i as u64,
                name: format!("P{i}"),
            })
            .collect()
    }

    #[test]
    fn rounds_require_players() {
        let mut t = Tournament::new("T".to_owned());
        assert_eq!(
            t.generate_rounds(&[0, 1, 2, 3]),
            Err(TournamentError::PlayersNotSet)
        );
        assert_eq!(
            t.set_players(players(6)),
            Err(TournamentError::UnsupportedSize(6))
        );
        t.set_players(players(4)).unwrap();
        t.generate_rounds(&[0, 1, 2, 3]).unwrap();
        assert_eq!(t.nb_rounds(), 3);
        assert_eq!(t.current_round(), Some(0));
        assert!(!t.is_over());
    }

    #[test]
    fn score_updates_report_round_and_tournament_completion() {
        let mut t = Tournament::new("T".to_owned());
        t.set_players(players(4)).unwrap();
        t.generate_rounds(&[0, 1, 2, 3]).unwrap();
        let up = t.set_score(0, 0, 0, KILL, 1).unwrap();
        assert!(!up.match_over && !up.round_over);
        let up = t.set_score(0, 0, 0, KILL, 1).unwrap();
        assert!(up.match_over && up.round_over && !up.tournament_over);
        assert_eq!(t.current_round(), Some(1));
        t.set_score(1, 0, 0, KILL, 2).unwrap();
        let up = t.set_score(2, 0, 1, KILL, 2).unwrap();
        assert!(up.tournament_over);
        assert_eq!(t.current_round(), None);
        assert_eq!(t.completed_rounds(), 3);
    }

    #[test]
    fn codes_are_stored_per_round() {
        let mut t = Tournament::new("T".to_owned());
        t.set_players(players(4)).unwrap();
        t.generate_rounds(&[0, 1, 2, 3]).unwrap();
        assert_eq!(t.code(0, 0), None);
        t.set_codes(0, vec!["EUW04b53-aaaa".to_owned()]).unwrap();
        assert_eq!(t.code(0, 0), Some("EUW04b53-aaaa"));
        assert_eq!(t.code(0, 1), None);
        assert_eq!(
            t.set_codes(7, vec![]),
            Err(TournamentError::UnknownRound(7))
        );
    }

    #[test]
    fn state_snapshots_survive_a_serde_round_trip() {
        let mut t = Tournament::new("Tournoi".to_owned());
        t.set_players(players(5)).unwrap();
        t.generate_rounds(&[4, 3, 2, 1, 0]).unwrap();
        t.set_score(0, 0, 0, KILL, 2).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Tournament = serde_json::from_str(&json).unwrap();
        assert_eq!(back.players.len(), 5);
        assert_eq!(back.rounds[0].matches[0].winner, Some(0));
        assert_eq!(back.rounds[0].matches[0].teams[0].players, t.rounds[0].matches[0].teams[0].players);
    }
}
