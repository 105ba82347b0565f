//! # 标记游戏（token game）
//!
//! [`TokenGame`] 持有网与当前标识，提供单次发生、步（step）的自动/手动组合、
//! 自动并发与步提交。步在提交前只作用于虚拟标识 [`StepWorkingSet`]；
//! 提交时每个实例在真实标识上重新检查可激发性，失效者跳过。
//!
//! ```rust
//! use pn_play::game::TokenGame;
//! use pn_play::net::Net;
//!
//! let mut net = Net::empty();
//! let p1 = net.add_place("P1", 2).unwrap();
//! let p2 = net.add_place("P2", 0).unwrap();
//! let t1 = net.add_transition("T1").unwrap();
//! net.set_input_weight(&p1, &t1, 1).unwrap();
//! net.set_output_weight(&t1, &p2, 1).unwrap();
//!
//! let mut game = TokenGame::with_seed(net, 42);
//! game.fire(&t1).unwrap();
//! assert_eq!(game.marking().tokens("P1"), 1);
//! assert_eq!(game.marking().tokens("P2"), 1);
//! ```

pub mod concurrency;
pub mod event;
pub mod fire;
pub mod step;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

use crate::net::{EnablingRefresh, Marking, Net, NetError, PlaceId, TransitionId, Weight};

pub use event::{GameEvent, StepMark};
pub use fire::TokenChange;
pub use step::{StepEntry, StepWorkingSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FireError {
    #[error("transition {0} is not enabled under the current marking")]
    NotEnabled(TransitionId),
    #[error("transition {0} is not part of the current step")]
    NotInStep(TransitionId),
    #[error(transparent)]
    Net(#[from] NetError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireOutcome {
    pub transition: TransitionId,
    pub changes: Vec<TokenChange>,
    /// Enabled set after the firing.
    pub enabled: Vec<TransitionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Instances fired, in order.
    pub fired: Vec<TransitionId>,
    /// Instances dropped because they were no longer enabled.
    pub skipped: Vec<TransitionId>,
    /// Net token change per place over the whole step.
    pub changes: Vec<TokenChange>,
    pub enabled: Vec<TransitionId>,
}

pub struct TokenGame {
    net: Net,
    rng: StdRng,
    step: Option<StepWorkingSet>,
    auto_concurrency: bool,
    events: Vec<GameEvent>,
}

impl TokenGame {
    pub fn new(net: Net) -> Self {
        Self::with_rng(net, StdRng::from_os_rng())
    }

    /// Deterministic tie-breaking for the automatic step.
    pub fn with_seed(net: Net, seed: u64) -> Self {
        Self::with_rng(net, StdRng::seed_from_u64(seed))
    }

    fn with_rng(net: Net, rng: StdRng) -> Self {
        let mut game = Self {
            net,
            rng,
            step: None,
            auto_concurrency: false,
            events: Vec::new(),
        };
        game.refresh();
        game
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn into_net(self) -> Net {
        self.net
    }

    pub fn marking(&self) -> Marking {
        self.net.marking()
    }

    /// Structural edit. Any open step is abandoned and the enabled flags are
    /// refreshed afterwards.
    pub fn edit_net<F, T>(&mut self, edit: F) -> T
    where
        F: FnOnce(&mut Net) -> T,
    {
        self.abandon_step();
        let result = edit(&mut self.net);
        self.refresh();
        result
    }

    pub fn auto_concurrency(&self) -> bool {
        self.auto_concurrency
    }

    pub fn set_auto_concurrency(&mut self, enabled: bool) {
        self.auto_concurrency = enabled;
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn enabled_transitions(&mut self) -> Vec<TransitionId> {
        self.refresh()
    }

    pub fn fire(&mut self, transition: &TransitionId) -> Result<FireOutcome, FireError> {
        let changes = fire::fire_transition(&mut self.net, transition)?;
        self.abandon_step();
        self.events
            .extend(changes.iter().cloned().map(GameEvent::TokensChanged));
        let enabled = self.refresh();
        Ok(FireOutcome {
            transition: transition.clone(),
            changes,
            enabled,
        })
    }

    /// Starts a step session and fills it with the automatic pass.
    pub fn compose_step_automatic(&mut self) -> Result<Vec<TransitionId>, FireError> {
        self.abandon_step();
        self.refresh();
        let working = step::compose_automatic(&self.net, &mut self.rng)?;
        Ok(self.open_step(working))
    }

    /// Like [`Self::compose_step_automatic`], after ordering every
    /// predecessor list by ascending token count.
    pub fn begin_manual_step(&mut self) -> Result<Vec<TransitionId>, FireError> {
        self.net.sort_parents_by_tokens();
        self.compose_step_automatic()
    }

    pub fn has_open_step(&self) -> bool {
        self.step.is_some()
    }

    pub fn step(&self) -> Option<&StepWorkingSet> {
        self.step.as_ref()
    }

    pub fn chosen_sequence(&self) -> Vec<TransitionId> {
        self.step
            .as_ref()
            .map(StepWorkingSet::chosen_sequence)
            .unwrap_or_default()
    }

    /// Opens a session when none is open and the inclusion succeeds. A
    /// refused inclusion leaves the engine as it was.
    pub fn toggle_in_step(&mut self, transition: &TransitionId) -> Result<bool, FireError> {
        self.net.transition(transition)?;
        let auto_concurrency = self.auto_concurrency;
        let mut fresh = None;
        let working = match self.step.as_mut() {
            Some(working) => working,
            None => fresh.insert(StepWorkingSet::new()),
        };
        let included = working.toggle_in(&self.net, transition, auto_concurrency)?;
        if included.is_some() {
            if let Some(working) = fresh {
                self.step = Some(working);
            }
        }

        let mark = match included {
            Some(multiplicity) => {
                log::debug!("{} joins the step x{}", transition, multiplicity);
                StepMark::Chosen
            }
            None => StepMark::Unavailable,
        };
        self.events.push(GameEvent::StepMarked {
            transition: transition.clone(),
            mark,
        });
        Ok(included.is_some())
    }

    pub fn untoggle_from_step(&mut self, transition: &TransitionId) -> Result<StepMark, FireError> {
        self.net.transition(transition)?;
        let released = self
            .step
            .as_mut()
            .map_or(0, |working| working.release(transition));
        if released == 0 {
            return Err(FireError::NotInStep(transition.clone()));
        }

        let mark = if self.net.is_enabled(transition)? {
            StepMark::Enabled
        } else {
            StepMark::Disabled
        };
        self.events.push(GameEvent::StepMarked {
            transition: transition.clone(),
            mark,
        });
        Ok(mark)
    }

    /// Fires every chosen instance on the real marking and closes the session.
    pub fn commit_step(&mut self) -> Result<StepOutcome, FireError> {
        let Some(working) = self.step.take() else {
            return Ok(StepOutcome {
                enabled: self.refresh(),
                ..StepOutcome::default()
            });
        };
        let before = self.net.marking();
        let mut outcome = StepOutcome::default();

        for entry in working.entries() {
            let transition = &entry.transition;
            for fired in 0..entry.multiplicity {
                match fire::fire_transition(&mut self.net, transition) {
                    Ok(changes) => {
                        self.events
                            .extend(changes.into_iter().map(GameEvent::TokensChanged));
                        outcome.fired.push(transition.clone());
                    }
                    Err(FireError::NotEnabled(_)) => {
                        // A refused instance leaves the marking as it was, so
                        // the rest of this entry would be refused too.
                        let left = entry.multiplicity - fired;
                        log::debug!("skipping {} x{} in step: no longer enabled", transition, left);
                        outcome
                            .skipped
                            .extend(std::iter::repeat_n(transition.clone(), left as usize));
                        break;
                    }
                    Err(err) => {
                        self.events.push(GameEvent::StepCleared);
                        self.refresh();
                        return Err(err);
                    }
                }
            }
        }

        self.events.push(GameEvent::StepCleared);
        outcome.changes = fire::marking_changes(&before, &self.net.marking());
        outcome.enabled = self.refresh();
        log::debug!(
            "step committed: {} fired, {} skipped",
            outcome.fired.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    /// Drops the session; the real marking is untouched.
    pub fn abandon_step(&mut self) {
        if self.step.take().is_some() {
            log::debug!("step abandoned");
            self.events.push(GameEvent::StepCleared);
        }
    }

    /// Automatic step followed by commit. With auto-concurrency on, every
    /// chosen transition is offered the tokens left over by the pass.
    pub fn play_step(&mut self) -> Result<StepOutcome, FireError> {
        let chosen = self.compose_step_automatic()?;
        if self.auto_concurrency {
            for transition in &chosen {
                self.include_surplus(transition)?;
            }
        }
        self.commit_step()
    }

    /// Adds the extra instances of an already chosen transition that the
    /// unclaimed tokens still carry. Nothing is marked when there are none.
    fn include_surplus(&mut self, transition: &TransitionId) -> Result<(), FireError> {
        let Some(working) = self.step.as_mut() else {
            return Ok(());
        };
        if let Some(extra) = working.toggle_in(&self.net, transition, true)? {
            log::debug!("{} takes {} more instances from the surplus", transition, extra);
        }
        Ok(())
    }

    pub fn add_token(&mut self, place: &PlaceId) -> Result<Weight, FireError> {
        let before = self.net.tokens(place)?;
        let after = self.net.produce_tokens(place, 1)?;
        self.marking_edited(place, before, after);
        Ok(after)
    }

    /// Removing from an empty place is a no-op.
    pub fn remove_token(&mut self, place: &PlaceId) -> Result<Weight, FireError> {
        let before = self.net.tokens(place)?;
        if before == 0 {
            return Ok(0);
        }
        let after = self.net.consume_tokens(place, 1)?;
        self.marking_edited(place, before, after);
        Ok(after)
    }

    fn marking_edited(&mut self, place: &PlaceId, before: Weight, after: Weight) {
        self.abandon_step();
        self.events.push(GameEvent::TokensChanged(TokenChange {
            place: place.clone(),
            before,
            after,
        }));
        self.refresh();
    }

    fn open_step(&mut self, working: StepWorkingSet) -> Vec<TransitionId> {
        self.events
            .extend(working.entries().iter().map(|entry| GameEvent::StepMarked {
                transition: entry.transition.clone(),
                mark: StepMark::Chosen,
            }));
        let chosen = working.chosen_sequence();
        log::debug!("step opened with {} instances", chosen.len());
        self.step = Some(working);
        chosen
    }

    fn refresh(&mut self) -> Vec<TransitionId> {
        let EnablingRefresh { enabled, flipped } = self.net.refresh_enabled();
        self.events
            .extend(flipped.into_iter().map(|(transition, enabled)| {
                GameEvent::EnablingChanged {
                    transition,
                    enabled,
                }
            }));
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> TokenGame {
        let mut net = Net::empty();
        let p1 = net.add_place("P1", 2).unwrap();
        let p2 = net.add_place("P2", 0).unwrap();
        let t1 = net.add_transition("T1").unwrap();
        net.set_input_weight(&p1, &t1, 1).unwrap();
        net.set_output_weight(&t1, &p2, 1).unwrap();
        TokenGame::with_seed(net, 1)
    }

    fn competing(seed: u64) -> TokenGame {
        let mut net = Net::empty();
        let p1 = net.add_place("P1", 2).unwrap();
        let t1 = net.add_transition("T1").unwrap();
        let t2 = net.add_transition("T2").unwrap();
        net.set_input_weight(&p1, &t1, 2).unwrap();
        net.set_input_weight(&p1, &t2, 2).unwrap();
        TokenGame::with_seed(net, seed)
    }

    #[test]
    fn construction_reports_initial_enabling() {
        let mut game = scenario_a();
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::EnablingChanged {
                transition: "T1".into(),
                enabled: true
            }]
        );
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn fire_emits_token_changes() {
        let mut game = scenario_a();
        game.drain_events();

        let outcome = game.fire(&"T1".into()).unwrap();
        assert_eq!(outcome.enabled, vec![TransitionId::from("T1")]);
        let events = game.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], GameEvent::TokensChanged(c) if c.place.as_str() == "P1" && c.after == 1));
        assert!(matches!(&events[1], GameEvent::TokensChanged(c) if c.place.as_str() == "P2" && c.after == 1));
    }

    #[test]
    fn failed_fire_leaves_state_alone() {
        let mut game = competing(3);
        game.compose_step_automatic().unwrap();
        let before = game.marking();

        assert_eq!(
            game.fire(&"nope".into()),
            Err(FireError::Net(NetError::NoSuchTransition("nope".into())))
        );
        assert_eq!(game.marking(), before);
        assert!(game.has_open_step());
    }

    #[test]
    fn untoggle_unknown_inclusion_fails() {
        let mut game = competing(0);
        assert_eq!(
            game.untoggle_from_step(&"T1".into()),
            Err(FireError::NotInStep("T1".into()))
        );
    }

    #[test]
    fn untoggle_marks_by_real_enabling() {
        let mut game = competing(0);
        assert_eq!(game.toggle_in_step(&"T1".into()), Ok(true));
        assert_eq!(game.toggle_in_step(&"T2".into()), Ok(false));
        assert_eq!(game.untoggle_from_step(&"T1".into()), Ok(StepMark::Enabled));
        assert_eq!(game.toggle_in_step(&"T2".into()), Ok(true));
        assert_eq!(game.chosen_sequence(), vec![TransitionId::from("T2")]);
    }

    #[test]
    fn abandon_keeps_marking() {
        let mut game = competing(5);
        let before = game.marking();
        assert_eq!(game.compose_step_automatic().unwrap().len(), 1);
        game.abandon_step();
        assert!(!game.has_open_step());
        assert_eq!(game.marking(), before);
        assert_eq!(game.commit_step().unwrap().fired, Vec::<TransitionId>::new());
    }

    #[test]
    fn auto_concurrency_fires_surplus_instances() {
        let mut net = Net::empty();
        let a = net.add_place("a", 9).unwrap();
        let b = net.add_place("b", 6).unwrap();
        let out = net.add_place("out", 0).unwrap();
        let t = net.add_transition("t").unwrap();
        net.set_input_weight(&a, &t, 3).unwrap();
        net.set_input_weight(&b, &t, 2).unwrap();
        net.set_output_weight(&t, &out, 1).unwrap();

        let mut game = TokenGame::with_seed(net, 9);
        game.set_auto_concurrency(true);
        let outcome = game.play_step().unwrap();

        assert_eq!(outcome.fired.len(), 3);
        assert!(outcome.skipped.is_empty());
        assert_eq!(game.marking().tokens("a"), 0);
        assert_eq!(game.marking().tokens("b"), 0);
        assert_eq!(game.marking().tokens("out"), 3);
    }

    #[test]
    fn surplus_pass_marks_nothing_when_no_tokens_are_left() {
        let mut net = Net::empty();
        let p = net.add_place("P", 1).unwrap();
        let t = net.add_transition("T").unwrap();
        net.set_input_weight(&p, &t, 1).unwrap();
        let mut game = TokenGame::with_seed(net, 0);
        game.set_auto_concurrency(true);
        game.drain_events();

        let outcome = game.play_step().unwrap();
        assert_eq!(outcome.fired, vec![t.clone()]);
        let marks: Vec<_> = game
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::StepMarked { transition, mark } => Some((transition, mark)),
                _ => None,
            })
            .collect();
        assert_eq!(marks, vec![(t, StepMark::Chosen)]);
    }

    #[test]
    fn failed_toggle_leaves_engine_idle() {
        let mut game = competing(0);
        game.drain_events();
        assert_eq!(
            game.toggle_in_step(&"ghost".into()),
            Err(FireError::Net(NetError::NoSuchTransition("ghost".into())))
        );
        assert!(!game.has_open_step());
        assert!(game.drain_events().is_empty());

        game.remove_token(&"P1".into()).unwrap();
        game.drain_events();
        assert_eq!(game.toggle_in_step(&"T1".into()), Ok(false));
        assert!(!game.has_open_step());
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::StepMarked {
                transition: "T1".into(),
                mark: StepMark::Unavailable
            }]
        );
    }

    #[test]
    fn untoggle_unknown_id_is_a_lookup_error() {
        let mut game = competing(0);
        game.toggle_in_step(&"T1".into()).unwrap();
        assert_eq!(
            game.untoggle_from_step(&"ghost".into()),
            Err(FireError::Net(NetError::NoSuchTransition("ghost".into())))
        );
        assert_eq!(game.chosen_sequence(), vec![TransitionId::from("T1")]);
    }

    #[test]
    fn commit_skips_the_rest_of_a_refused_entry() {
        let mut net = Net::empty();
        let p = net.add_place("P", 3).unwrap();
        let t = net.add_transition("T").unwrap();
        net.set_input_weight(&p, &t, 1).unwrap();
        let mut game = TokenGame::with_seed(net, 0);
        game.set_auto_concurrency(true);
        assert_eq!(game.toggle_in_step(&t), Ok(true));
        assert_eq!(game.chosen_sequence().len(), 3);

        // Drain the place behind the session's back.
        game.net.consume_tokens(&p, 2).unwrap();
        game.drain_events();
        let outcome = game.commit_step().unwrap();

        assert_eq!(outcome.fired, vec![t.clone()]);
        assert_eq!(outcome.skipped, vec![t.clone(), t.clone()]);
        assert_eq!(game.marking().tokens("P"), 0);
        assert!(game.drain_events().contains(&GameEvent::StepCleared));
        assert!(!game.has_open_step());
    }

    #[test]
    fn editor_token_operations_clamp_at_zero() {
        let mut game = scenario_a();
        let p2 = PlaceId::from("P2");
        assert_eq!(game.remove_token(&p2), Ok(0));
        assert_eq!(game.add_token(&p2), Ok(1));
        assert_eq!(game.remove_token(&p2), Ok(0));
    }

    #[test]
    fn structural_edit_refreshes_enabling() {
        let mut game = scenario_a();
        game.drain_events();
        game.edit_net(|net| net.remove_arc("P1", "T1")).unwrap();

        assert!(game.enabled_transitions().is_empty());
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::EnablingChanged {
                transition: "T1".into(),
                enabled: false
            }]
        );
    }
}
