//! Normalization passes over node inputs.
//!
//! The two passes solve different problems against the same files and are
//! never composed; callers pick one.
use super::document::{InputKey, WorkflowDocument};
use clap::ValueEnum;
use serde_json::Value;
use std::fmt;

pub const TEXT_ENCODERS_PREFIX: &str = "text_encoders/";

/// Text encoder files that ComfyUI expects under `text_encoders/`.
pub const KNOWN_TEXT_ENCODERS: &[&str] = &[
    "clip_l.safetensors",
    "clip_g.safetensors",
    "t5xxl_fp16.safetensors",
    "t5xxl_fp8_e4m3fn.safetensors",
    "ViT-L-14-TEXT-detail-improved-hiT-GmP-TE-only-HF.safetensors",
];

const LEGACY_FLUX_VAE: &str = "ae.safetensors";
const FLUX_VAE: &str = "flux_vae.safetensors";

/// A rewrite returns `Some(new)` only when the value must change.
type Rule = fn(&str) -> Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizationPass {
    /// Replace `\` with `/` in every recognised model input
    Backslashes,
    /// Strip `FLUX\`, prefix text encoders, rename the FLUX VAE
    ModelPaths,
}

const BACKSLASH_RULES: &[(InputKey, Rule)] = &[
    (InputKey::UnetName, unify_separators),
    (InputKey::VaeName, unify_separators),
    (InputKey::ClipName1, unify_separators),
    (InputKey::ClipName2, unify_separators),
];

const MODEL_PATH_RULES: &[(InputKey, Rule)] = &[
    (InputKey::UnetName, strip_flux_prefix),
    (InputKey::ClipName1, prefix_text_encoder),
    (InputKey::ClipName2, prefix_text_encoder),
    (InputKey::VaeName, remap_flux_vae),
];

impl NormalizationPass {
    fn rules(self) -> &'static [(InputKey, Rule)] {
        match self {
            NormalizationPass::Backslashes => BACKSLASH_RULES,
            NormalizationPass::ModelPaths => MODEL_PATH_RULES,
        }
    }

    /// Cheap check on the raw file text; `false` means the pass cannot fire.
    pub fn may_apply(self, raw: &str) -> bool {
        match self {
            NormalizationPass::Backslashes => raw.contains('\\'),
            NormalizationPass::ModelPaths => true,
        }
    }

    /// Message printed for a file the pass left alone.
    pub fn unchanged_label(self) -> &'static str {
        match self {
            NormalizationPass::Backslashes => "No backslashes found",
            NormalizationPass::ModelPaths => "No changes needed",
        }
    }

    /// Apply every rule once per node and return what changed.
    pub fn apply(self, doc: &mut WorkflowDocument) -> Vec<Change> {
        let rules = self.rules();
        let mut changes = Vec::new();
        for (node_id, inputs) in doc.node_inputs_mut() {
            for (key, rule) in rules {
                let Some(Value::String(value)) = inputs.get_mut(key.as_str()) else {
                    continue;
                };
                let Some(new) = rule(value.as_str()) else {
                    continue;
                };
                if new == *value {
                    continue;
                }
                let old = std::mem::replace(value, new.clone());
                changes.push(Change {
                    node_id: node_id.to_string(),
                    key: *key,
                    old,
                    new,
                });
            }
        }
        changes
    }
}

/// One rewritten input value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub node_id: String,
    pub key: InputKey,
    pub old: String,
    pub new: String,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.key, self.old, self.new)
    }
}

pub fn unify_separators(value: &str) -> Option<String> {
    value.contains('\\').then(|| value.replace('\\', "/"))
}

/// Strip leading `FLUX\` / `FLUX/` segments.
pub fn strip_flux_prefix(value: &str) -> Option<String> {
    let mut rest = value;
    while let Some(stripped) = rest
        .strip_prefix("FLUX\\")
        .or_else(|| rest.strip_prefix("FLUX/"))
    {
        rest = stripped;
    }
    (rest.len() != value.len()).then(|| rest.to_string())
}

pub fn prefix_text_encoder(value: &str) -> Option<String> {
    if value.starts_with(TEXT_ENCODERS_PREFIX) || !KNOWN_TEXT_ENCODERS.contains(&value) {
        return None;
    }
    Some(format!("{TEXT_ENCODERS_PREFIX}{value}"))
}

pub fn remap_flux_vae(value: &str) -> Option<String> {
    (value == LEGACY_FLUX_VAE).then(|| FLUX_VAE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(pass: NormalizationPass, text: &str) -> (WorkflowDocument, Vec<Change>) {
        let mut doc = WorkflowDocument::parse(text).expect("parse");
        let changes = pass.apply(&mut doc);
        (doc, changes)
    }

    #[test]
    fn strip_flux_prefix_cases() {
        assert_eq!(
            strip_flux_prefix("FLUX\\flux1-dev.safetensors").as_deref(),
            Some("flux1-dev.safetensors")
        );
        assert_eq!(
            strip_flux_prefix("FLUX/flux1-dev.safetensors").as_deref(),
            Some("flux1-dev.safetensors")
        );
        assert_eq!(strip_flux_prefix("flux1-dev.safetensors"), None);
        assert_eq!(strip_flux_prefix("models/FLUX/x.safetensors"), None);
    }

    #[test]
    fn prefix_text_encoder_cases() {
        assert_eq!(
            prefix_text_encoder("clip_l.safetensors").as_deref(),
            Some("text_encoders/clip_l.safetensors")
        );
        assert_eq!(prefix_text_encoder("text_encoders/clip_l.safetensors"), None);
        assert_eq!(prefix_text_encoder("unknown_file.safetensors"), None);
    }

    #[test]
    fn remap_flux_vae_cases() {
        assert_eq!(
            remap_flux_vae("ae.safetensors").as_deref(),
            Some("flux_vae.safetensors")
        );
        assert_eq!(remap_flux_vae("sdxl_vae.safetensors"), None);
        assert_eq!(remap_flux_vae("vae/ae.safetensors"), None);
    }

    #[test]
    fn unify_separators_replaces_in_place() {
        assert_eq!(
            unify_separators("FLUX\\sub\\model.safetensors").as_deref(),
            Some("FLUX/sub/model.safetensors")
        );
        assert_eq!(unify_separators("plain.safetensors"), None);
    }

    #[test]
    fn model_paths_pass_rewrites_recognised_inputs() {
        let (doc, changes) = rewrite(
            NormalizationPass::ModelPaths,
            r#"{
                "10": {"class_type": "UNETLoader", "inputs": {"unet_name": "FLUX\\flux1-dev.safetensors", "weight_dtype": "default"}},
                "11": {"class_type": "DualCLIPLoader", "inputs": {"clip_name1": "clip_l.safetensors", "clip_name2": "t5xxl_fp16.safetensors", "type": "flux"}},
                "12": {"class_type": "VAELoader", "inputs": {"vae_name": "ae.safetensors"}}
            }"#,
        );
        let lines: Vec<String> = changes.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "unet_name: FLUX\\flux1-dev.safetensors -> flux1-dev.safetensors",
                "clip_name1: clip_l.safetensors -> text_encoders/clip_l.safetensors",
                "clip_name2: t5xxl_fp16.safetensors -> text_encoders/t5xxl_fp16.safetensors",
                "vae_name: ae.safetensors -> flux_vae.safetensors",
            ]
        );
        let expected = WorkflowDocument::parse(
            r#"{
                "10": {"class_type": "UNETLoader", "inputs": {"unet_name": "flux1-dev.safetensors", "weight_dtype": "default"}},
                "11": {"class_type": "DualCLIPLoader", "inputs": {"clip_name1": "text_encoders/clip_l.safetensors", "clip_name2": "text_encoders/t5xxl_fp16.safetensors", "type": "flux"}},
                "12": {"class_type": "VAELoader", "inputs": {"vae_name": "flux_vae.safetensors"}}
            }"#,
        )
        .expect("parse expected");
        assert_eq!(doc, expected);
    }

    #[test]
    fn backslash_pass_only_touches_recognised_keys() {
        let (doc, changes) = rewrite(
            NormalizationPass::Backslashes,
            r#"{"1": {"inputs": {"vae_name": "FLUX\\ae.safetensors", "lora_name": "a\\b", "clip_name1": 7}}}"#,
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].key, InputKey::VaeName);
        assert_eq!(changes[0].node_id, "1");
        let expected = WorkflowDocument::parse(
            r#"{"1": {"inputs": {"vae_name": "FLUX/ae.safetensors", "lora_name": "a\\b", "clip_name1": 7}}}"#,
        )
        .expect("parse expected");
        assert_eq!(doc, expected);
    }

    #[test]
    fn passes_are_idempotent() {
        let text = r#"{
            "1": {"inputs": {"unet_name": "FLUX\\FLUX/sub\\x.safetensors", "vae_name": "ae.safetensors",
                             "clip_name1": "clip_g.safetensors", "clip_name2": "a\\b"}}
        }"#;
        for pass in NormalizationPass::value_variants() {
            let mut doc = WorkflowDocument::parse(text).expect("parse");
            let first = pass.apply(&mut doc);
            assert!(!first.is_empty());
            let snapshot = doc.clone();
            let second = pass.apply(&mut doc);
            assert!(second.is_empty(), "{pass:?} fired twice: {second:?}");
            assert_eq!(doc, snapshot);
        }
    }

    #[test]
    fn backslash_prefilter_skips_clean_text() {
        assert!(!NormalizationPass::Backslashes.may_apply(r#"{"1": {"inputs": {}}}"#));
        assert!(NormalizationPass::Backslashes.may_apply(r#"{"a": "x\\y"}"#));
        assert!(NormalizationPass::ModelPaths.may_apply("{}"));
    }
}
