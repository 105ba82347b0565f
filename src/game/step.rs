//! Step composition against a virtual marking.
//!
//! A [`StepWorkingSet`] records, for one composition session, how many tokens
//! each place still has available after the claims of the transitions chosen
//! so far. Places never claimed fall back to their real token count, so an
//! empty working set mirrors the real marking. Nothing here touches the real
//! marking; dropping the working set is the rollback.
use std::collections::HashSet;

use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::game::concurrency;
use crate::net::{Net, NetError, PlaceId, TransitionId, Weight};

/// One inclusion of a transition into the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    pub transition: TransitionId,
    /// Instances of `transition` this inclusion fires.
    pub multiplicity: u64,
    /// Tokens actually taken from each predecessor's balance.
    claims: SmallVec<[(PlaceId, Weight); 4]>,
}

impl StepEntry {
    pub fn claims(&self) -> &[(PlaceId, Weight)] {
        &self.claims
    }
}

#[derive(Debug, Clone, Default)]
pub struct StepWorkingSet {
    balances: IndexMap<PlaceId, Weight>,
    entries: Vec<StepEntry>,
}

impl StepWorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens of `place` not yet claimed by this step.
    pub fn balance(&self, net: &Net, place: &PlaceId) -> Weight {
        self.balances
            .get(place)
            .copied()
            .unwrap_or_else(|| net.tokens(place).unwrap_or(0))
    }

    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, transition: &TransitionId) -> bool {
        self.entries.iter().any(|entry| &entry.transition == transition)
    }

    /// Chosen transitions in inclusion order, each repeated by its multiplicity.
    pub fn chosen_sequence(&self) -> Vec<TransitionId> {
        self.entries
            .iter()
            .flat_map(|entry| {
                std::iter::repeat_n(entry.transition.clone(), entry.multiplicity as usize)
            })
            .collect()
    }

    pub fn instance_count(&self) -> u64 {
        self.entries.iter().map(|entry| entry.multiplicity).sum()
    }

    /// Whether every predecessor's balance still covers its input weight.
    pub fn covers(&self, net: &Net, transition: &TransitionId) -> Result<bool, NetError> {
        net.covers_inputs(transition, |place| self.balance(net, place))
    }

    /// Manual inclusion. With `auto_concurrency` the transition is included
    /// as many times as the unclaimed tokens allow. Returns the multiplicity
    /// included, `None` when the balances cannot carry a single instance.
    pub fn toggle_in(
        &mut self,
        net: &Net,
        transition: &TransitionId,
        auto_concurrency: bool,
    ) -> Result<Option<u64>, NetError> {
        let multiplicity = if auto_concurrency {
            concurrency::multiplicity(net, self, transition)?
        } else {
            u64::from(self.covers(net, transition)?)
        };
        if multiplicity == 0 {
            return Ok(None);
        }
        self.claim(net, transition, multiplicity)?;
        Ok(Some(multiplicity))
    }

    /// Drops every inclusion of `transition` and hands back exactly what they
    /// claimed. Returns the number of instances removed.
    pub fn release(&mut self, transition: &TransitionId) -> u64 {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| &entry.transition == transition);
        self.entries = kept;

        let mut instances = 0;
        for entry in removed {
            instances += entry.multiplicity;
            for (place, taken) in entry.claims {
                let balance = self.balances.entry(place).or_insert(0);
                *balance = balance.saturating_add(taken);
            }
        }
        instances
    }

    /// Takes `multiplicity * weight` from every predecessor, never below zero.
    fn claim(
        &mut self,
        net: &Net,
        transition: &TransitionId,
        multiplicity: u64,
    ) -> Result<(), NetError> {
        let mut claims = SmallVec::new();
        for place in net.transition(transition)?.parents() {
            let wanted = net
                .input_weight(place, transition)?
                .saturating_mul(multiplicity);
            let balance = self.balance(net, place);
            let taken = wanted.min(balance);
            self.balances.insert(place.clone(), balance - taken);
            claims.push((place.clone(), taken));
        }
        self.entries.push(StepEntry {
            transition: transition.clone(),
            multiplicity,
            claims,
        });
        Ok(())
    }
}

/// Automatic step: enabled transitions in a random order, each taken unless
/// its first predecessor was already taken by an earlier one.
///
/// Only the first predecessor is used as the conflict key. Conflicts on other
/// shared predecessors are left to the re-validation done when the step is
/// committed.
pub fn compose_automatic<R>(net: &Net, rng: &mut R) -> Result<StepWorkingSet, NetError>
where
    R: Rng + ?Sized,
{
    let mut working = StepWorkingSet::new();
    let mut candidates = net.enabled_transitions();
    candidates.shuffle(rng);

    let mut used_sources = HashSet::new();
    for transition in candidates {
        let Some(first) = net.transition(&transition)?.representative_parent() else {
            continue;
        };
        if !used_sources.insert(first.clone()) {
            log::trace!("{} loses {} to an earlier transition", transition, first);
            continue;
        }
        working.claim(net, &transition, 1)?;
    }
    Ok(working)
}
