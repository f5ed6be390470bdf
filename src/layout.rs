//! Typed paths into the ComfyUI work tree.
//!
//! Every command resolves its directories through [`Layout`] so the fixed
//! on-disk conventions live in one place.
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Overrides the work-tree root (defaults to `~/comfyui-work`).
pub const WORK_DIR_ENV: &str = "COMFYUI_WORK_DIR";
/// HuggingFace Hub access token.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";
/// CivitAI API token.
pub const CIVITAI_TOKEN_ENV: &str = "CIVITAI_TOKEN";
/// Overrides the external program used for plain HTTP fetches.
pub const FETCH_COMMAND_ENV: &str = "COMFY_PREP_FETCH_COMMAND";

const DEFAULT_WORK_DIR_NAME: &str = "comfyui-work";
const WORKFLOW_PACK_REL: &str = "default/workflows/UmeAiRT - FLUX MEGAPACK 3.1";

/// Model subdirectory a fetched file lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelDir {
    Unet,
    Clip,
    Vae,
    Checkpoints,
}

impl ModelDir {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelDir::Unet => "unet",
            ModelDir::Clip => "clip",
            ModelDir::Vae => "vae",
            ModelDir::Checkpoints => "checkpoints",
        }
    }
}

/// Convenience wrapper for locating directories under the work-tree root.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the root from `COMFYUI_WORK_DIR`, falling back to the home
    /// directory.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env_value(WORK_DIR_ENV) {
            return Ok(Self::new(PathBuf::from(root)));
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;
        Ok(Self::new(home.join(DEFAULT_WORK_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `models/` directory path.
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    /// Return the directory for one model kind, e.g. `models/unet`.
    pub fn model_dir(&self, dir: ModelDir) -> PathBuf {
        self.models_dir().join(dir.as_str())
    }

    /// Return the cache directory handed to the hub client.
    ///
    /// Kept under `models/` so cached blobs can be renamed into place
    /// without crossing filesystems.
    pub fn hub_cache_dir(&self) -> PathBuf {
        self.models_dir().join(".cache").join("huggingface")
    }

    /// Return the workflow pack directory searched by `fix-workflows`.
    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join(WORKFLOW_PACK_REL)
    }
}

/// Read a non-empty environment variable.
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_dirs_live_under_models() {
        let layout = Layout::new(PathBuf::from("/work"));
        assert_eq!(layout.model_dir(ModelDir::Unet), PathBuf::from("/work/models/unet"));
        assert_eq!(
            layout.model_dir(ModelDir::Checkpoints),
            PathBuf::from("/work/models/checkpoints")
        );
        assert!(layout.hub_cache_dir().starts_with(layout.models_dir()));
    }

    #[test]
    fn workflows_dir_uses_pack_name() {
        let layout = Layout::new(PathBuf::from("/work"));
        assert_eq!(
            layout.workflows_dir(),
            PathBuf::from("/work/default/workflows/UmeAiRT - FLUX MEGAPACK 3.1")
        );
    }
}
