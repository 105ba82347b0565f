//! I/O 支持：网描述文档（JSON / RON）与 [`Net`] 之间的转换。
//!
//! 文档形状：`places`、`transitions` 为 id 列表，`arcs` 以 `"源,目标"` 为键
//! 记录权重，`marking`、`labels`、`actions`、`layout` 可选。布局对引擎不透明，
//! 只在读写之间原样保留。
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::{Net, NetError};
use crate::net::structure::Weight;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::de::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("arc key {0:?} is not of the form \"source,target\"")]
    MalformedArcKey(String),
    #[error(transparent)]
    Net(#[from] NetError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

/// A node position, or the intermediate waypoints of an arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutEntry {
    Point(Coords),
    Waypoints(Vec<Coords>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetDescription {
    pub places: Vec<String>,
    pub transitions: Vec<String>,
    #[serde(default)]
    pub arcs: IndexMap<String, Weight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub labels: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub marking: IndexMap<String, Weight>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub layout: IndexMap<String, LayoutEntry>,
}

impl NetDescription {
    /// Builds the net. Arc direction is taken from the declared node sets.
    pub fn build(&self) -> Result<Net, IoError> {
        let mut net = Net::empty();
        for place in &self.places {
            let tokens = self.marking.get(place).copied().unwrap_or(0);
            net.add_place(place.as_str(), tokens)?;
        }
        if let Some(unknown) = self.marking.keys().find(|id| !net.contains_place(id)) {
            return Err(NetError::NoSuchPlace(unknown.as_str().into()).into());
        }
        for transition in &self.transitions {
            net.add_transition(transition.as_str())?;
        }
        for (transition, label) in &self.labels {
            net.set_label(&transition.as_str().into(), label.as_str())?;
        }
        for (key, weight) in &self.arcs {
            let (source, target) = split_arc_key(key)?;
            net.add_arc(source, target, *weight)?;
        }
        log::debug!(
            "built net with {} places, {} transitions, {} arcs",
            net.places_len(),
            net.transitions_len(),
            net.arcs_len()
        );
        Ok(net)
    }

    /// Describes the current structure and marking. Layout and actions are
    /// left empty; callers carry them over from the document they loaded.
    pub fn from_net(net: &Net) -> Self {
        Self {
            places: net.places().map(|p| p.id.to_string()).collect(),
            transitions: net.transitions().map(|t| t.id.to_string()).collect(),
            arcs: net.arcs().map(|arc| (arc.key(), arc.weight)).collect(),
            actions: Vec::new(),
            labels: net
                .transitions()
                .filter_map(|t| Some((t.id.to_string(), t.label.clone()?)))
                .collect(),
            marking: net
                .places()
                .filter(|p| p.tokens() > 0)
                .map(|p| (p.id.to_string(), p.tokens()))
                .collect(),
            layout: IndexMap::new(),
        }
    }
}

pub fn split_arc_key(key: &str) -> Result<(&str, &str), IoError> {
    match key.split_once(',') {
        Some((source, target)) if !source.is_empty() && !target.is_empty() => {
            Ok((source.trim(), target.trim()))
        }
        _ => Err(IoError::MalformedArcKey(key.to_string())),
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    fs::write(path, to_json_string(value)?)?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_json_str(&fs::read_to_string(path)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_ron<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    fs::write(path, to_ron_string(value)?)?;
    Ok(())
}

pub fn read_ron<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    from_ron_str(&fs::read_to_string(path)?)
}

/// Reads a net description, RON for `.ron` files and JSON otherwise.
pub fn read_description<P: AsRef<Path>>(path: P) -> Result<NetDescription, IoError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => read_ron(path),
        _ => read_json(path),
    }
}

pub fn write_description<P: AsRef<Path>>(path: P, description: &NetDescription) -> Result<(), IoError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ron") => write_ron(path, description),
        _ => write_json(path, description),
    }
}
