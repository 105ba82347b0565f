//! 单次发生: 先对全部前置库所消耗, 再向后置库所产生.
use itertools::Itertools;
use serde::Serialize;

use crate::game::FireError;
use crate::net::{Marking, Net, NetError, PlaceId, TransitionId, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenChange {
    pub place: PlaceId,
    pub before: Weight,
    pub after: Weight,
}

impl TokenChange {
    fn new(place: &PlaceId, before: Weight, after: Weight) -> Option<Self> {
        if before == after {
            return None;
        }
        Some(Self {
            place: place.clone(),
            before,
            after,
        })
    }

    pub fn delta(&self) -> i128 {
        i128::from(self.after) - i128::from(self.before)
    }
}

/// Fires `transition` once against the real marking of `net`.
///
/// Enabling is re-checked first; on `NotEnabled` nothing is touched. Returns
/// the places whose count actually changed (a balanced self-loop reports
/// nothing).
pub fn fire_transition(
    net: &mut Net,
    transition: &TransitionId,
) -> Result<Vec<TokenChange>, FireError> {
    if !net.is_enabled(transition)? {
        return Err(FireError::NotEnabled(transition.clone()));
    }

    let entry = net.transition(transition)?;
    let inputs = entry
        .parents()
        .iter()
        .map(|place| Ok::<_, NetError>((place.clone(), net.input_weight(place, transition)?)))
        .collect::<Result<Vec<_>, NetError>>()?;
    let outputs = entry
        .children()
        .iter()
        .map(|place| Ok::<_, NetError>((place.clone(), net.output_weight(transition, place)?)))
        .collect::<Result<Vec<_>, NetError>>()?;
    let before = inputs
        .iter()
        .chain(outputs.iter())
        .map(|(place, _)| place)
        .unique()
        .map(|place| Ok::<_, NetError>((place.clone(), net.tokens(place)?)))
        .collect::<Result<Vec<_>, NetError>>()?;

    for (place, weight) in &inputs {
        net.consume_tokens(place, *weight).inspect_err(|err| {
            log::error!("enabled transition {} could not consume: {}", transition, err)
        })?;
    }
    for (place, weight) in &outputs {
        net.produce_tokens(place, *weight)?;
    }

    let mut changes = Vec::with_capacity(before.len());
    for (place, tokens) in before {
        if let Some(change) = TokenChange::new(&place, tokens, net.tokens(&place)?) {
            changes.push(change);
        }
    }
    log::trace!("fired {}: {:?}", transition, changes);
    Ok(changes)
}

/// Per-place difference between two snapshots of the same net.
pub fn marking_changes(before: &Marking, after: &Marking) -> Vec<TokenChange> {
    after
        .iter()
        .filter_map(|(place, tokens)| TokenChange::new(place, before.tokens(place.as_str()), *tokens))
        .collect()
}
