//! Session report written by `pn-play -o`.
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

use crate::game::{FireError, FireOutcome, StepOutcome, TokenChange, TokenGame};
use crate::net::{Marking, TransitionId};

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub fired: Vec<TransitionId>,
    pub skipped: Vec<TransitionId>,
    pub changes: Vec<TokenChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub initial_marking: Marking,
    pub final_marking: Marking,
    pub steps: Vec<StepRecord>,
    pub enabled: Vec<TransitionId>,
    /// Nothing was enabled when the session ended.
    pub deadlocked: bool,
}

impl SessionReport {
    pub fn new(initial_marking: Marking) -> Self {
        Self {
            final_marking: initial_marking.clone(),
            initial_marking,
            steps: Vec::new(),
            enabled: Vec::new(),
            deadlocked: false,
        }
    }

    pub fn record_fire(&mut self, outcome: &FireOutcome) {
        self.steps.push(StepRecord {
            index: self.steps.len(),
            fired: vec![outcome.transition.clone()],
            skipped: Vec::new(),
            changes: outcome.changes.clone(),
        });
    }

    pub fn record_step(&mut self, outcome: &StepOutcome) {
        self.steps.push(StepRecord {
            index: self.steps.len(),
            fired: outcome.fired.clone(),
            skipped: outcome.skipped.clone(),
            changes: outcome.changes.clone(),
        });
    }

    /// Plays automatic steps until nothing is enabled or `max_steps` is hit.
    pub fn play(&mut self, game: &mut TokenGame, max_steps: usize) -> Result<(), FireError> {
        for _ in 0..max_steps {
            if game.enabled_transitions().is_empty() {
                break;
            }
            let outcome = game.play_step()?;
            self.record_step(&outcome);
        }
        Ok(())
    }

    pub fn finish(&mut self, game: &mut TokenGame, include_zero_tokens: bool) {
        self.final_marking = game.marking();
        self.enabled = game.enabled_transitions();
        self.deadlocked = self.enabled.is_empty();
        if !include_zero_tokens {
            self.initial_marking.0.retain(|_, tokens| *tokens > 0);
            self.final_marking.0.retain(|_, tokens| *tokens > 0);
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "steps played: {}", self.steps.len())?;
        for step in &self.steps {
            write!(f, "  #{} fired [{}]", step.index, join_ids(&step.fired))?;
            if !step.skipped.is_empty() {
                write!(f, " skipped [{}]", join_ids(&step.skipped))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "marking:")?;
        for (place, tokens) in self.final_marking.iter() {
            writeln!(f, "  {}: {}", place, tokens)?;
        }
        if self.deadlocked {
            writeln!(f, "no transition is enabled")
        } else {
            writeln!(f, "enabled: [{}]", join_ids(&self.enabled))
        }
    }
}

fn join_ids(ids: &[TransitionId]) -> String {
    ids.iter().map(TransitionId::as_str).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Net;

    fn cycle() -> TokenGame {
        let mut net = Net::empty();
        let p1 = net.add_place("p1", 1).unwrap();
        let p2 = net.add_place("p2", 0).unwrap();
        let t1 = net.add_transition("t1").unwrap();
        let t2 = net.add_transition("t2").unwrap();
        net.set_input_weight(&p1, &t1, 1).unwrap();
        net.set_output_weight(&t1, &p2, 1).unwrap();
        net.set_input_weight(&p2, &t2, 1).unwrap();
        net.set_output_weight(&t2, &p1, 1).unwrap();
        TokenGame::with_seed(net, 11)
    }

    #[test]
    fn play_stops_at_step_limit() {
        let mut game = cycle();
        let mut report = SessionReport::new(game.marking());
        report.play(&mut game, 4).unwrap();
        report.finish(&mut game, true);

        assert_eq!(report.steps.len(), 4);
        assert!(report.steps.iter().all(|step| step.fired.len() == 1));
        assert_eq!(report.final_marking.tokens("p1"), 1);
        assert!(!report.deadlocked);
    }

    #[test]
    fn play_stops_at_deadlock() {
        let mut net = Net::empty();
        let p = net.add_place("p", 2).unwrap();
        let t = net.add_transition("t").unwrap();
        net.set_input_weight(&p, &t, 1).unwrap();
        let mut game = TokenGame::with_seed(net, 0);

        let mut report = SessionReport::new(game.marking());
        report.play(&mut game, 10).unwrap();
        report.finish(&mut game, false);

        assert_eq!(report.steps.len(), 2);
        assert!(report.deadlocked);
        assert!(report.final_marking.is_empty());
        assert!(report.to_string().contains("no transition is enabled"));
    }
}
