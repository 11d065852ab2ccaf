//! Blind pick/ban sequencing for one match.
//!
//! Both teams submit a champion per phase from their own voice channel chat,
//! so neither side sees the other's entry. A phase resolves once both sides
//! are in. The sequence is fixed: ban 1, ban 2, pick 1, ban 3, pick 2.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStep {
    Ban,
    Pick,
}

pub const DRAFT_SEQUENCE: [(DraftStep, &str); 5] = [
    (DraftStep::Ban, "⛔ Ban 1"),
    (DraftStep::Ban, "⛔ Ban 2"),
    (DraftStep::Pick, "✅ Pick 1"),
    (DraftStep::Ban, "⛔ Ban 3"),
    (DraftStep::Pick, "✅ Pick 2"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("la draft est déjà terminée")]
    Finished,
    #[error("{0} est déjà pris (ban ou pick)")]
    Taken(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftProgress {
    /// One side is in, waiting for the other.
    Waiting,
    /// Both sides submitted; the next phase (if any) is open.
    PhaseDone(usize),
    /// The last phase resolved, picks are final.
    Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Draft {
    phase: usize,
    pending: [Option<String>; 2],
    pub bans: [Vec<String>; 2],
    pub picks: [Vec<String>; 2],
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.phase >= DRAFT_SEQUENCE.len()
    }

    pub fn current_phase(&self) -> Option<(DraftStep, &'static str)> {
        DRAFT_SEQUENCE.get(self.phase).copied()
    }

    /// Has this side already submitted for the running phase?
    pub fn is_waiting_on(&self, team: usize) -> bool {
        !self.is_finished() && self.pending[team].is_none()
    }

    fn is_taken(&self, champion: &str) -> bool {
        self.bans
            .iter()
            .chain(self.picks.iter())
            .any(|list| list.iter().any(|c| c == champion))
    }

    /// Registers `champion` for `team` in the running phase. Resubmitting
    /// before the phase closes replaces the earlier choice.
    pub fn submit(&mut self, team: usize, champion: String) -> Result<DraftProgress, DraftError> {
        if self.is_finished() {
            return Err(DraftError::Finished);
        }
        if self.is_taken(&champion) {
            return Err(DraftError::Taken(champion));
        }
        self.pending[team] = Some(champion);
        if self.pending.iter().any(|p| p.is_none()) {
            return Ok(DraftProgress::Waiting);
        }
        let (step, _) = DRAFT_SEQUENCE[self.phase];
        for (i, slot) in self.pending.iter_mut().enumerate() {
            if let Some(champ) = slot.take() {
                match step {
                    DraftStep::Ban => self.bans[i].push(champ),
                    DraftStep::Pick => self.picks[i].push(champ),
                }
            }
        }
        self.phase += 1;
        if self.is_finished() {
            Ok(DraftProgress::Finished)
        } else {
            Ok(DraftProgress::PhaseDone(self.phase))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both(d: &mut Draft, blue: &str, red: &str) -> DraftProgress {
        assert_eq!(d.submit(0, blue.to_owned()), Ok(DraftProgress::Waiting));
        d.submit(1, red.to_owned()).unwrap()
    }

    #[test]
    fn full_sequence_lands_three_bans_and_two_picks_per_side() {
        let mut d = Draft::new();
        assert_eq!(d.current_phase(), Some((DraftStep::Ban, "⛔ Ban 1")));
        assert_eq!(both(&mut d, "Ahri", "Zed"), DraftProgress::PhaseDone(1));
        assert_eq!(both(&mut d, "Lux", "Jinx"), DraftProgress::PhaseDone(2));
        assert_eq!(d.current_phase(), Some((DraftStep::Pick, "✅ Pick 1")));
        assert_eq!(both(&mut d, "Garen", "Teemo"), DraftProgress::PhaseDone(3));
        assert_eq!(both(&mut d, "Sona", "Yasuo"), DraftProgress::PhaseDone(4));
        assert_eq!(d.current_phase(), Some((DraftStep::Pick, "✅ Pick 2")));
        assert_eq!(both(&mut d, "Braum", "Annie"), DraftProgress::Finished);
        assert!(d.is_finished());
        assert_eq!(d.bans[0], vec!["Ahri", "Lux", "Sona"]);
        assert_eq!(d.bans[1], vec!["Zed", "Jinx", "Yasuo"]);
        assert_eq!(d.picks[0], vec!["Garen", "Braum"]);
        assert_eq!(d.picks[1], vec!["Teemo", "Annie"]);
        assert_eq!(
            d.submit(0, "Amumu".to_owned()),
            Err(DraftError::Finished)
        );
    }

    #[test]
    fn taken_champions_are_refused() {
        let mut d = Draft::new();
        both(&mut d, "Ahri", "Zed");
        assert_eq!(
            d.submit(1, "Ahri".to_owned()),
            Err(DraftError::Taken("Ahri".to_owned()))
        );
        both(&mut d, "Lux", "Jinx");
        both(&mut d, "Garen", "Teemo");
        // a pick locks the champion for everyone too
        assert_eq!(
            d.submit(0, "Teemo".to_owned()),
            Err(DraftError::Taken("Teemo".to_owned()))
        );
    }

    #[test]
    fn resubmission_replaces_until_the_phase_closes() {
        let mut d = Draft::new();
        assert_eq!(d.submit(0, "Ahri".to_owned()), Ok(DraftProgress::Waiting));
        assert_eq!(d.submit(0, "Lux".to_owned()), Ok(DraftProgress::Waiting));
        assert!(!d.is_waiting_on(0));
        assert!(d.is_waiting_on(1));
        assert_eq!(
            d.submit(1, "Zed".to_owned()),
            Ok(DraftProgress::PhaseDone(1))
        );
        assert_eq!(d.bans[0], vec!["Lux"]);
    }

    #[test]
    fn both_sides_may_submit_the_same_champion_in_a_blind_phase() {
        // the duplicate collapses into both ban lists; neither side could
        // see the other's entry
        let mut d = Draft::new();
        assert_eq!(d.submit(0, "Ahri".to_owned()), Ok(DraftProgress::Waiting));
        assert_eq!(
            d.submit(1, "Ahri".to_owned()),
            Ok(DraftProgress::PhaseDone(1))
        );
        assert_eq!(d.bans[0], vec!["Ahri"]);
        assert_eq!(d.bans[1], vec!["Ahri"]);
    }
}
