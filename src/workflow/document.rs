//! Permissive model of a workflow JSON document.
//!
//! Only nodes carrying an object-valued `inputs` are surfaced; every other
//! key and value round-trips untouched, in its original order.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Node inputs the normalization passes know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    UnetName,
    VaeName,
    ClipName1,
    ClipName2,
}

impl InputKey {
    pub fn as_str(self) -> &'static str {
        match self {
            InputKey::UnetName => "unet_name",
            InputKey::VaeName => "vae_name",
            InputKey::ClipName1 => "clip_name1",
            InputKey::ClipName2 => "clip_name2",
        }
    }
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowDocument {
    entries: Map<String, Value>,
}

impl WorkflowDocument {
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("parse workflow JSON")?;
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(anyhow!(
                "workflow root must be a JSON object, found {}",
                value_kind(&other)
            )),
        }
    }

    /// Serialize with two-space indentation.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize workflow JSON")
    }

    /// Mutable `inputs` of every node, paired with the node id.
    pub fn node_inputs_mut(&mut self) -> impl Iterator<Item = (&str, &mut Map<String, Value>)> {
        self.entries.iter_mut().filter_map(|(id, node)| {
            let inputs = node.as_object_mut()?.get_mut("inputs")?.as_object_mut()?;
            Some((id.as_str(), inputs))
        })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
