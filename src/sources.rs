use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// One entry of `sources.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RssSource {
    pub name: String,
    pub feed_url: String,
    /// Free-text category hint; may or may not be a bucket name.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub rss: bool,
}

// `rss: yes`, `rss: 1` and `rss: true` all switch a source on
fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "no" | "n" | "off" | "false"),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(_) => true,
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelSource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelSource {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Deserialize)]
struct ChannelFile {
    #[serde(default)]
    channels: Vec<ChannelSource>,
}

pub fn load_rss_sources(path: &Path) -> Result<Vec<RssSource>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_rss_sources(&raw).with_context(|| format!("parse {}", path.display()))
}

pub fn load_channels(path: &Path) -> Result<Vec<ChannelSource>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_channels(&raw).with_context(|| format!("parse {}", path.display()))
}

// feed_url is checked per source at harvest time, so one bad entry only fails itself
fn parse_rss_sources(raw: &str) -> Result<Vec<RssSource>> {
    Ok(serde_yaml::from_str(raw)?)
}

fn parse_channels(raw: &str) -> Result<Vec<ChannelSource>> {
    if raw.trim().is_empty() { return Ok(Vec::new()); }
    let file: ChannelFile = serde_yaml::from_str(raw)?;
    Ok(file.channels)
}

/// Keep only the sources flagged for RSS harvesting, in file order.
pub fn rss_enabled(sources: Vec<RssSource>) -> Vec<RssSource> {
    sources.into_iter().filter(|s| s.rss).collect()
}
