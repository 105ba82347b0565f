//! P/T 网静态结构元素：库所、迁移、弧与标识。
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};

pub type Weight = u64;

/// Predecessor or successor list of a transition.
pub type PlaceList = SmallVec<[PlaceId; 4]>;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Place {
    pub id: PlaceId,
    /// Only changed through `Net::consume_tokens` / `Net::produce_tokens`.
    pub(crate) tokens: Weight,
}

impl Place {
    pub fn new(id: impl Into<PlaceId>, tokens: Weight) -> Self {
        Self {
            id: id.into(),
            tokens,
        }
    }

    pub fn tokens(&self) -> Weight {
        self.tokens
    }
}

impl fmt::Debug for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Place")
            .field(&self.id.as_str())
            .field(&self.tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub id: TransitionId,
    pub label: Option<String>,
    /// Presentation cache, refreshed by every enabling query.
    pub(crate) enabled: bool,
    pub(crate) parents: PlaceList,
    pub(crate) children: PlaceList,
}

impl Transition {
    pub fn new(id: impl Into<TransitionId>) -> Self {
        Self {
            id: id.into(),
            label: None,
            enabled: false,
            parents: PlaceList::new(),
            children: PlaceList::new(),
        }
    }

    /// Label shown to the user, the id when no label was set.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn parents(&self) -> &[PlaceId] {
        &self.parents
    }

    pub fn children(&self) -> &[PlaceId] {
        &self.children
    }

    /// First predecessor, used as the conflict key of the automatic step pass.
    pub fn representative_parent(&self) -> Option<&PlaceId> {
        self.parents.first()
    }

    pub fn is_marked_enabled(&self) -> bool {
        self.enabled
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transition").field(&self.id.as_str()).finish()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Arc {
    pub place: PlaceId,
    pub transition: TransitionId,
    pub weight: Weight,
    pub direction: ArcDirection,
}

impl Arc {
    pub fn new(
        place: PlaceId,
        transition: TransitionId,
        weight: Weight,
        direction: ArcDirection,
    ) -> Self {
        Self {
            place,
            transition,
            weight,
            direction,
        }
    }

    pub fn source(&self) -> &str {
        match self.direction {
            ArcDirection::PlaceToTransition => self.place.as_str(),
            ArcDirection::TransitionToPlace => self.transition.as_str(),
        }
    }

    pub fn target(&self) -> &str {
        match self.direction {
            ArcDirection::PlaceToTransition => self.transition.as_str(),
            ArcDirection::TransitionToPlace => self.place.as_str(),
        }
    }

    /// `"source,target"`, the key used by the net description.
    pub fn key(&self) -> String {
        arc_key(self.source(), self.target())
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arc({} -> {}, {})", self.source(), self.target(), self.weight)
    }
}

pub fn arc_key(source: &str, target: &str) -> String {
    format!("{source},{target}")
}

/// Token count of every place, in place insertion order.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Marking(pub IndexMap<PlaceId, Weight>);

impl Marking {
    pub fn new(initial: IndexMap<PlaceId, Weight>) -> Self {
        Self(initial)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlaceId, &Weight)> {
        self.0.iter()
    }

    pub fn get(&self, place: &str) -> Option<Weight> {
        self.0.get(place).copied()
    }

    /// Tokens on `place`; places missing from the snapshot hold none.
    pub fn tokens(&self, place: &str) -> Weight {
        self.get(place).unwrap_or(0)
    }

    pub fn total(&self) -> Weight {
        self.0.values().sum()
    }

    pub fn into_inner(self) -> IndexMap<PlaceId, Weight> {
        self.0
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place.as_str(), tokens);
        }
        map.finish()
    }
}
