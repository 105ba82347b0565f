//! Auto-concurrency: how many times a transition could fire at once on the
//! tokens the current step has not claimed yet.
use crate::game::step::StepWorkingSet;
use crate::net::{Net, NetError, TransitionId};

/// `min over predecessors p of balance(p) / weight(p, t)`, truncated.
/// Transitions without predecessors get zero.
pub fn multiplicity(
    net: &Net,
    working: &StepWorkingSet,
    transition: &TransitionId,
) -> Result<u64, NetError> {
    let entry = net.transition(transition)?;
    let bounds = entry.parents().iter().map(|place| {
        let weight = net.input_weight(place, transition)?;
        Ok::<_, NetError>(working.balance(net, place) / weight)
    });
    itertools::process_results(bounds, |times| times.min().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_inputs(left: u64, right: u64) -> Net {
        let mut net = Net::empty();
        let a = net.add_place("a", left).unwrap();
        let b = net.add_place("b", right).unwrap();
        let t = net.add_transition("t").unwrap();
        net.set_input_weight(&a, &t, 3).unwrap();
        net.set_input_weight(&b, &t, 2).unwrap();
        net
    }

    #[test]
    fn bounded_by_scarcest_input() {
        let net = two_inputs(9, 6);
        let working = StepWorkingSet::new();
        assert_eq!(multiplicity(&net, &working, &"t".into()), Ok(3));
    }

    #[test]
    fn fractions_truncate() {
        let net = two_inputs(11, 5);
        let working = StepWorkingSet::new();
        assert_eq!(multiplicity(&net, &working, &"t".into()), Ok(2));

        let starved = two_inputs(2, 9);
        assert_eq!(multiplicity(&starved, &working, &"t".into()), Ok(0));
    }

    #[test]
    fn source_transition_has_no_multiplicity() {
        let mut net = Net::empty();
        let t = net.add_transition("t").unwrap();
        assert_eq!(multiplicity(&net, &StepWorkingSet::new(), &t), Ok(0));
    }
}
