//! 运行时网模型: 结构编辑、标识变更 (消耗/产生) 与可激发判定.
use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::{
    Arc, ArcDirection, Marking, Place, PlaceList, Transition, Weight,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("place {0} does not exist")]
    NoSuchPlace(PlaceId),
    #[error("transition {0} does not exist")]
    NoSuchTransition(TransitionId),
    #[error("node {0} does not exist")]
    NoSuchNode(String),
    #[error("no arc from {from} to {to}")]
    NoSuchArc { from: String, to: String },
    #[error("place {place} holds {available} tokens, {requested} requested")]
    InsufficientTokens {
        place: PlaceId,
        requested: Weight,
        available: Weight,
    },
    #[error("id {0} is already used in this net")]
    DuplicateId(String),
    #[error("arc {from} -> {to} must connect a place and a transition")]
    InvalidArc { from: String, to: String },
    #[error("arc {from} -> {to} must have a positive weight")]
    ZeroWeight { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Place,
    Transition,
}

/// Result of refreshing the cached enabled flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnablingRefresh {
    /// Enabled transitions, in transition insertion order.
    pub enabled: Vec<TransitionId>,
    /// Transitions whose cached flag flipped, with the new value.
    pub flipped: Vec<(TransitionId, bool)>,
}

/// Petri 网连通性诊断报告
#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    /// 孤立库所（无任何连接的弧）
    pub isolated_places: Vec<PlaceId>,
    /// 孤立变迁（无任何连接的弧）
    pub isolated_transitions: Vec<TransitionId>,
    pub warnings: Vec<String>,
    pub total_places: usize,
    pub total_transitions: usize,
}

impl DiagnosticReport {
    pub fn has_issues(&self) -> bool {
        !self.isolated_places.is_empty()
            || !self.isolated_transitions.is_empty()
            || !self.warnings.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct Net {
    places: IndexMap<PlaceId, Place>,
    transitions: IndexMap<TransitionId, Transition>,
    pre: IndexMap<(PlaceId, TransitionId), Weight>,
    post: IndexMap<(TransitionId, PlaceId), Weight>,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places.values().collect::<Vec<_>>())
            .field("transitions", &self.transitions.keys().collect::<Vec<_>>())
            .field("arcs", &self.arcs().collect::<Vec<_>>())
            .finish()
    }
}

impl Net {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add_place(
        &mut self,
        id: impl Into<PlaceId>,
        tokens: Weight,
    ) -> Result<PlaceId, NetError> {
        let id = id.into();
        self.ensure_fresh_id(id.as_str())?;
        self.places.insert(id.clone(), Place::new(id.clone(), tokens));
        Ok(id)
    }

    pub fn add_transition(&mut self, id: impl Into<TransitionId>) -> Result<TransitionId, NetError> {
        let id = id.into();
        self.ensure_fresh_id(id.as_str())?;
        self.transitions
            .insert(id.clone(), Transition::new(id.clone()));
        Ok(id)
    }

    /// An empty label clears it.
    pub fn set_label(
        &mut self,
        transition: &TransitionId,
        label: impl Into<String>,
    ) -> Result<(), NetError> {
        let label = label.into();
        let entry = self.transition_mut(transition)?;
        entry.label = (!label.is_empty()).then_some(label);
        Ok(())
    }

    /// 输入弧: place -> transition, 已存在时覆盖权重.
    pub fn set_input_weight(
        &mut self,
        place: &PlaceId,
        transition: &TransitionId,
        weight: Weight,
    ) -> Result<(), NetError> {
        self.place(place)?;
        self.transition(transition)?;
        if weight == 0 {
            return Err(NetError::ZeroWeight {
                from: place.to_string(),
                to: transition.to_string(),
            });
        }
        let previous = self
            .pre
            .insert((place.clone(), transition.clone()), weight);
        if previous.is_none() {
            self.reindex_transition(transition);
        }
        Ok(())
    }

    /// 输出弧: transition -> place, 已存在时覆盖权重.
    pub fn set_output_weight(
        &mut self,
        transition: &TransitionId,
        place: &PlaceId,
        weight: Weight,
    ) -> Result<(), NetError> {
        self.place(place)?;
        self.transition(transition)?;
        if weight == 0 {
            return Err(NetError::ZeroWeight {
                from: transition.to_string(),
                to: place.to_string(),
            });
        }
        let previous = self
            .post
            .insert((transition.clone(), place.clone()), weight);
        if previous.is_none() {
            self.reindex_transition(transition);
        }
        Ok(())
    }

    /// Creates or overwrites the arc `source -> target`; the direction follows
    /// from which endpoint is the place.
    pub fn add_arc(
        &mut self,
        source: &str,
        target: &str,
        weight: Weight,
    ) -> Result<ArcDirection, NetError> {
        match (self.node_kind(source)?, self.node_kind(target)?) {
            (NodeKind::Place, NodeKind::Transition) => {
                self.set_input_weight(&source.into(), &target.into(), weight)?;
                Ok(ArcDirection::PlaceToTransition)
            }
            (NodeKind::Transition, NodeKind::Place) => {
                self.set_output_weight(&source.into(), &target.into(), weight)?;
                Ok(ArcDirection::TransitionToPlace)
            }
            _ => Err(NetError::InvalidArc {
                from: source.to_string(),
                to: target.to_string(),
            }),
        }
    }

    pub fn remove_arc(&mut self, source: &str, target: &str) -> Result<Weight, NetError> {
        let (direction, weight) = self.arc_entry(source, target)?;
        let transition = match direction {
            ArcDirection::PlaceToTransition => {
                self.pre
                    .shift_remove(&(PlaceId::from(source), TransitionId::from(target)));
                TransitionId::from(target)
            }
            ArcDirection::TransitionToPlace => {
                self.post
                    .shift_remove(&(TransitionId::from(source), PlaceId::from(target)));
                TransitionId::from(source)
            }
        };
        self.reindex_transition(&transition);
        Ok(weight)
    }

    pub fn increment_arc_weight(&mut self, source: &str, target: &str) -> Result<Weight, NetError> {
        let weight = self.arc_weight_mut(source, target)?;
        *weight = weight.saturating_add(1);
        Ok(*weight)
    }

    /// Weights never drop below one.
    pub fn decrement_arc_weight(&mut self, source: &str, target: &str) -> Result<Weight, NetError> {
        let weight = self.arc_weight_mut(source, target)?;
        *weight = weight.saturating_sub(1).max(1);
        Ok(*weight)
    }

    /// Removes the place together with every arc touching it.
    pub fn remove_place(&mut self, place: &PlaceId) -> Result<Place, NetError> {
        let removed = self
            .places
            .shift_remove(place)
            .ok_or_else(|| NetError::NoSuchPlace(place.clone()))?;
        let touched = self
            .pre
            .keys()
            .filter(|(p, _)| p == place)
            .map(|(_, t)| t.clone())
            .chain(
                self.post
                    .keys()
                    .filter(|(_, p)| p == place)
                    .map(|(t, _)| t.clone()),
            )
            .unique()
            .collect::<Vec<_>>();
        self.pre.retain(|(p, _), _| p != place);
        self.post.retain(|(_, p), _| p != place);
        for transition in &touched {
            self.reindex_transition(transition);
        }
        log::debug!("removed place {} and arcs of {} transitions", place, touched.len());
        Ok(removed)
    }

    /// Removes the transition together with every arc touching it.
    pub fn remove_transition(&mut self, transition: &TransitionId) -> Result<Transition, NetError> {
        let removed = self
            .transitions
            .shift_remove(transition)
            .ok_or_else(|| NetError::NoSuchTransition(transition.clone()))?;
        self.pre.retain(|(_, t), _| t != transition);
        self.post.retain(|(t, _), _| t != transition);
        Ok(removed)
    }

    pub fn place(&self, place: &PlaceId) -> Result<&Place, NetError> {
        self.places
            .get(place)
            .ok_or_else(|| NetError::NoSuchPlace(place.clone()))
    }

    pub fn transition(&self, transition: &TransitionId) -> Result<&Transition, NetError> {
        self.transitions
            .get(transition)
            .ok_or_else(|| NetError::NoSuchTransition(transition.clone()))
    }

    fn transition_mut(&mut self, transition: &TransitionId) -> Result<&mut Transition, NetError> {
        self.transitions
            .get_mut(transition)
            .ok_or_else(|| NetError::NoSuchTransition(transition.clone()))
    }

    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    /// Input arcs in insertion order, followed by output arcs.
    pub fn arcs(&self) -> impl Iterator<Item = Arc> + '_ {
        let inputs = self.pre.iter().map(|((place, transition), weight)| {
            Arc::new(
                place.clone(),
                transition.clone(),
                *weight,
                ArcDirection::PlaceToTransition,
            )
        });
        let outputs = self.post.iter().map(|((transition, place), weight)| {
            Arc::new(
                place.clone(),
                transition.clone(),
                *weight,
                ArcDirection::TransitionToPlace,
            )
        });
        inputs.chain(outputs)
    }

    pub fn contains_place(&self, id: &str) -> bool {
        self.places.contains_key(id)
    }

    pub fn contains_transition(&self, id: &str) -> bool {
        self.transitions.contains_key(id)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn arcs_len(&self) -> usize {
        self.pre.len() + self.post.len()
    }

    pub fn tokens(&self, place: &PlaceId) -> Result<Weight, NetError> {
        self.place(place).map(Place::tokens)
    }

    pub fn marking(&self) -> Marking {
        Marking::new(
            self.places
                .iter()
                .map(|(id, place)| (id.clone(), place.tokens))
                .collect(),
        )
    }

    /// Transitions this place feeds, in arc insertion order.
    pub fn consumers(&self, place: &PlaceId) -> Result<Vec<TransitionId>, NetError> {
        self.place(place)?;
        Ok(self
            .pre
            .keys()
            .filter(|(p, _)| p == place)
            .map(|(_, t)| t.clone())
            .collect())
    }

    pub fn input_weight(&self, place: &PlaceId, transition: &TransitionId) -> Result<Weight, NetError> {
        self.pre
            .get(&(place.clone(), transition.clone()))
            .copied()
            .ok_or_else(|| NetError::NoSuchArc {
                from: place.to_string(),
                to: transition.to_string(),
            })
    }

    pub fn output_weight(&self, transition: &TransitionId, place: &PlaceId) -> Result<Weight, NetError> {
        self.post
            .get(&(transition.clone(), place.clone()))
            .copied()
            .ok_or_else(|| NetError::NoSuchArc {
                from: transition.to_string(),
                to: place.to_string(),
            })
    }

    pub fn arc_weight(&self, source: &str, target: &str) -> Result<Weight, NetError> {
        self.arc_entry(source, target).map(|(_, weight)| weight)
    }

    /// Fails with `InsufficientTokens` instead of going below zero.
    pub fn consume_tokens(&mut self, place: &PlaceId, amount: Weight) -> Result<Weight, NetError> {
        let entry = self
            .places
            .get_mut(place)
            .ok_or_else(|| NetError::NoSuchPlace(place.clone()))?;
        let remaining =
            entry
                .tokens
                .checked_sub(amount)
                .ok_or_else(|| NetError::InsufficientTokens {
                    place: place.clone(),
                    requested: amount,
                    available: entry.tokens,
                })?;
        entry.tokens = remaining;
        Ok(remaining)
    }

    pub fn produce_tokens(&mut self, place: &PlaceId, amount: Weight) -> Result<Weight, NetError> {
        let entry = self
            .places
            .get_mut(place)
            .ok_or_else(|| NetError::NoSuchPlace(place.clone()))?;
        entry.tokens = entry.tokens.saturating_add(amount);
        Ok(entry.tokens)
    }

    /// Checks every input arc of `transition` against `available`. Transitions
    /// without input arcs are never enabled.
    pub(crate) fn covers_inputs<F>(
        &self,
        transition: &TransitionId,
        mut available: F,
    ) -> Result<bool, NetError>
    where
        F: FnMut(&PlaceId) -> Weight,
    {
        let entry = self.transition(transition)?;
        if entry.parents.is_empty() {
            return Ok(false);
        }
        for place in &entry.parents {
            let weight = self.input_weight(place, transition)?;
            if available(place) < weight {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_enabled(&self, transition: &TransitionId) -> Result<bool, NetError> {
        self.covers_inputs(transition, |place| {
            self.places.get(place).map_or(0, Place::tokens)
        })
    }

    pub fn is_enabled_under(
        &self,
        transition: &TransitionId,
        marking: &Marking,
    ) -> Result<bool, NetError> {
        self.covers_inputs(transition, |place| marking.tokens(place.as_str()))
    }

    pub fn enabled_transitions(&self) -> Vec<TransitionId> {
        self.transitions
            .keys()
            .filter(|id| matches!(self.is_enabled(id), Ok(true)))
            .cloned()
            .collect()
    }

    pub fn enabled_transitions_under(&self, marking: &Marking) -> Vec<TransitionId> {
        self.transitions
            .keys()
            .filter(|id| matches!(self.is_enabled_under(id, marking), Ok(true)))
            .cloned()
            .collect()
    }

    /// Recomputes the enabled set and rewrites every cached flag from it.
    pub fn refresh_enabled(&mut self) -> EnablingRefresh {
        let enabled = self.enabled_transitions();
        let mut flipped = Vec::new();
        for (id, transition) in self.transitions.iter_mut() {
            let now = enabled.contains(id);
            if transition.enabled != now {
                transition.enabled = now;
                flipped.push((id.clone(), now));
            }
        }
        EnablingRefresh { enabled, flipped }
    }

    /// Orders every predecessor list ascending by current tokens (stable).
    pub fn sort_parents_by_tokens(&mut self) {
        let places = &self.places;
        for transition in self.transitions.values_mut() {
            transition
                .parents
                .sort_by_key(|place| places.get(place).map_or(0, Place::tokens));
        }
    }

    /// 诊断信息：检测 Petri 网中的孤立节点和无法触发的变迁
    pub fn diagnose_connectivity(&self) -> DiagnosticReport {
        let mut isolated_places = Vec::new();
        let mut isolated_transitions = Vec::new();
        let mut warnings = Vec::new();

        for (place_id, place) in &self.places {
            let has_input = self.post.keys().any(|(_, p)| p == place_id);
            let has_output = self.pre.keys().any(|(p, _)| p == place_id);

            if !has_input && !has_output {
                isolated_places.push(place_id.clone());
            } else if !has_input && place.tokens == 0 {
                warnings.push(format!(
                    "place '{}' has no incoming arc and no tokens, it never enables anything",
                    place_id
                ));
            }
        }

        for (transition_id, transition) in &self.transitions {
            if transition.parents.is_empty() && transition.children.is_empty() {
                isolated_transitions.push(transition_id.clone());
            } else if transition.parents.is_empty() {
                warnings.push(format!(
                    "transition '{}' has no input arcs and can never fire",
                    transition_id
                ));
            }
        }

        DiagnosticReport {
            isolated_places,
            isolated_transitions,
            warnings,
            total_places: self.places_len(),
            total_transitions: self.transitions_len(),
        }
    }

    pub fn log_diagnostics(&self) {
        let report = self.diagnose_connectivity();

        if !report.has_issues() {
            log::info!("net connectivity check passed, no isolated nodes");
            return;
        }
        log::warn!(
            "net diagnostics: {} places, {} transitions",
            report.total_places,
            report.total_transitions
        );
        for id in &report.isolated_places {
            log::warn!("  isolated place {}", id);
        }
        for id in &report.isolated_transitions {
            log::warn!("  isolated transition {}", id);
        }
        for warning in &report.warnings {
            log::warn!("  {}", warning);
        }
    }

    fn ensure_fresh_id(&self, id: &str) -> Result<(), NetError> {
        if self.places.contains_key(id) || self.transitions.contains_key(id) {
            return Err(NetError::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    fn node_kind(&self, id: &str) -> Result<NodeKind, NetError> {
        if self.places.contains_key(id) {
            Ok(NodeKind::Place)
        } else if self.transitions.contains_key(id) {
            Ok(NodeKind::Transition)
        } else {
            Err(NetError::NoSuchNode(id.to_string()))
        }
    }

    fn arc_entry(&self, source: &str, target: &str) -> Result<(ArcDirection, Weight), NetError> {
        if let Some(weight) = self
            .pre
            .get(&(PlaceId::from(source), TransitionId::from(target)))
        {
            return Ok((ArcDirection::PlaceToTransition, *weight));
        }
        if let Some(weight) = self
            .post
            .get(&(TransitionId::from(source), PlaceId::from(target)))
        {
            return Ok((ArcDirection::TransitionToPlace, *weight));
        }
        Err(NetError::NoSuchArc {
            from: source.to_string(),
            to: target.to_string(),
        })
    }

    fn arc_weight_mut(&mut self, source: &str, target: &str) -> Result<&mut Weight, NetError> {
        let input = (PlaceId::from(source), TransitionId::from(target));
        if self.pre.contains_key(&input) {
            return Ok(&mut self.pre[&input]);
        }
        self.post
            .get_mut(&(TransitionId::from(source), PlaceId::from(target)))
            .ok_or_else(|| NetError::NoSuchArc {
                from: source.to_string(),
                to: target.to_string(),
            })
    }

    /// Rebuilds parents/children of `transition` from the arc sets.
    fn reindex_transition(&mut self, transition: &TransitionId) {
        let parents = self
            .pre
            .keys()
            .filter(|(_, t)| t == transition)
            .map(|(p, _)| p.clone())
            .collect::<PlaceList>();
        let children = self
            .post
            .keys()
            .filter(|(t, _)| t == transition)
            .map(|(_, p)| p.clone())
            .collect::<PlaceList>();
        if let Some(entry) = self.transitions.get_mut(transition) {
            entry.parents = parents;
            entry.children = children;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Net {
        let mut net = Net::empty();
        let p1 = net.add_place("P1", 2).unwrap();
        let p2 = net.add_place("P2", 0).unwrap();
        let t1 = net.add_transition("T1").unwrap();
        net.set_input_weight(&p1, &t1, 1).unwrap();
        net.set_output_weight(&t1, &p2, 1).unwrap();
        net
    }

    #[test]
    fn arcs_derive_parents_and_children() {
        let net = chain();
        let t1 = net.transition(&"T1".into()).unwrap();

        assert_eq!(t1.parents(), &[PlaceId::from("P1")]);
        assert_eq!(t1.children(), &[PlaceId::from("P2")]);
        assert_eq!(net.consumers(&"P1".into()).unwrap(), vec![TransitionId::from("T1")]);
        assert_eq!(net.arcs_len(), 2);
    }

    #[test]
    fn ids_are_unique_across_node_kinds() {
        let mut net = chain();
        assert_eq!(
            net.add_transition("P1"),
            Err(NetError::DuplicateId("P1".to_string()))
        );
        assert_eq!(net.add_place("T1", 0), Err(NetError::DuplicateId("T1".to_string())));
    }

    #[test]
    fn consume_never_goes_negative() {
        let mut net = chain();
        let p1 = PlaceId::from("P1");

        assert_eq!(net.consume_tokens(&p1, 2), Ok(0));
        assert_eq!(
            net.consume_tokens(&p1, 1),
            Err(NetError::InsufficientTokens {
                place: p1.clone(),
                requested: 1,
                available: 0,
            })
        );
        assert_eq!(net.tokens(&p1), Ok(0));
        assert_eq!(net.produce_tokens(&p1, 5), Ok(5));
    }

    #[test]
    fn arc_weight_lookup_by_ordered_pair() {
        let net = chain();
        assert_eq!(net.arc_weight("P1", "T1"), Ok(1));
        assert_eq!(net.arc_weight("T1", "P2"), Ok(1));
        assert_eq!(
            net.arc_weight("T1", "P1"),
            Err(NetError::NoSuchArc {
                from: "T1".to_string(),
                to: "P1".to_string()
            })
        );
    }

    #[test]
    fn add_arc_resolves_direction_and_rejects_bad_edges() {
        let mut net = chain();
        net.add_place("P3", 0).unwrap();

        assert_eq!(net.add_arc("T1", "P3", 2), Ok(ArcDirection::TransitionToPlace));
        assert_eq!(
            net.add_arc("P1", "P3", 1),
            Err(NetError::InvalidArc {
                from: "P1".to_string(),
                to: "P3".to_string()
            })
        );
        assert_eq!(
            net.add_arc("P1", "T1", 0),
            Err(NetError::ZeroWeight {
                from: "P1".to_string(),
                to: "T1".to_string()
            })
        );
        assert_eq!(net.add_arc("P1", "ghost", 1), Err(NetError::NoSuchNode("ghost".to_string())));

        // Overwriting keeps a single arc per pair.
        net.add_arc("P1", "T1", 3).unwrap();
        assert_eq!(net.arc_weight("P1", "T1"), Ok(3));
        assert_eq!(net.transition(&"T1".into()).unwrap().parents().len(), 1);
    }

    #[test]
    fn arc_weight_edits_clamp_at_one() {
        let mut net = chain();
        assert_eq!(net.increment_arc_weight("P1", "T1"), Ok(2));
        assert_eq!(net.decrement_arc_weight("P1", "T1"), Ok(1));
        assert_eq!(net.decrement_arc_weight("P1", "T1"), Ok(1));
    }

    #[test]
    fn removing_nodes_drops_incident_arcs() {
        let mut net = chain();
        net.remove_place(&"P1".into()).unwrap();

        assert!(net.transition(&"T1".into()).unwrap().parents().is_empty());
        assert_eq!(net.arcs_len(), 1);

        net.remove_transition(&"T1".into()).unwrap();
        assert_eq!(net.arcs_len(), 0);
        assert!(matches!(
            net.remove_arc("T1", "P2"),
            Err(NetError::NoSuchArc { .. })
        ));
    }

    #[test]
    fn transition_without_inputs_is_never_enabled() {
        let mut net = Net::empty();
        let t = net.add_transition("source").unwrap();
        let p = net.add_place("out", 0).unwrap();
        net.set_output_weight(&t, &p, 1).unwrap();

        assert_eq!(net.is_enabled(&t), Ok(false));
        assert!(net.enabled_transitions().is_empty());
    }

    #[test]
    fn enabling_checks_every_input_weight() {
        let mut net = chain();
        let p0 = net.add_place("P0", 1).unwrap();
        net.set_input_weight(&p0, &"T1".into(), 2).unwrap();

        assert_eq!(net.is_enabled(&"T1".into()), Ok(false));

        let mut marking = net.marking();
        marking.0.insert(p0, 2);
        assert_eq!(net.is_enabled_under(&"T1".into(), &marking), Ok(true));
        assert_eq!(
            net.is_enabled(&"nope".into()),
            Err(NetError::NoSuchTransition("nope".into()))
        );
    }

    #[test]
    fn refresh_reports_flipped_flags() {
        let mut net = chain();
        let first = net.refresh_enabled();
        assert_eq!(first.enabled, vec![TransitionId::from("T1")]);
        assert_eq!(first.flipped, vec![(TransitionId::from("T1"), true)]);

        let second = net.refresh_enabled();
        assert!(second.flipped.is_empty());

        net.consume_tokens(&"P1".into(), 2).unwrap();
        let third = net.refresh_enabled();
        assert!(third.enabled.is_empty());
        assert_eq!(third.flipped, vec![(TransitionId::from("T1"), false)]);
        assert!(!net.transition(&"T1".into()).unwrap().is_marked_enabled());
    }

    #[test]
    fn parents_sort_by_current_tokens() {
        let mut net = Net::empty();
        let rich = net.add_place("rich", 5).unwrap();
        let poor = net.add_place("poor", 1).unwrap();
        let t = net.add_transition("t").unwrap();
        net.set_input_weight(&rich, &t, 1).unwrap();
        net.set_input_weight(&poor, &t, 1).unwrap();

        assert_eq!(net.transition(&t).unwrap().representative_parent(), Some(&rich));
        net.sort_parents_by_tokens();
        assert_eq!(net.transition(&t).unwrap().representative_parent(), Some(&poor));
    }

    #[test]
    fn diagnostics_flag_dead_structure() {
        let mut net = chain();
        net.add_place("lonely", 0).unwrap();
        let t = net.add_transition("spring").unwrap();
        net.set_output_weight(&t, &"P2".into(), 1).unwrap();

        let report = net.diagnose_connectivity();
        assert!(report.has_issues());
        assert_eq!(report.isolated_places, vec![PlaceId::from("lonely")]);
        assert!(report.isolated_transitions.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("spring"));
    }
}
