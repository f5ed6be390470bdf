//! Static fetch tables for each supported model family.
//!
//! Remote paths are a compatibility contract with the upstream hosts and must
//! stay verbatim. Everything family-specific lives in [`FAMILIES`]; the
//! fetcher and reporter only see the resulting [`FetchPlan`].
use crate::layout::{Layout, ModelDir};
use clap::ValueEnum;
use std::path::PathBuf;

/// Where a family's files are hosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A HuggingFace Hub model repository.
    Hub { repo_id: &'static str },
    /// A direct download URL (CivitAI).
    Http { url: &'static str },
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Source::Hub { repo_id } => format!("Model: {repo_id}"),
            Source::Http { url } => format!("Source: {url}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelFamily {
    /// FLUX.1-dev UNET, VAE and text encoders
    Flux,
    /// Stable Diffusion 1.5 checkpoint
    Sd15,
    /// Stable Diffusion 3.5 Large checkpoint and text encoders
    Sd35,
    /// Stable Diffusion XL 1.0 base checkpoint
    Sdxl,
    /// RealVisXL V4 Lightning checkpoint from CivitAI
    SdxlLightning,
}

impl ModelFamily {
    pub fn spec(self) -> &'static FamilySpec {
        // Rows are kept in variant declaration order.
        &FAMILIES[self as usize]
    }

    pub fn key(self) -> &'static str {
        match self {
            ModelFamily::Flux => "flux",
            ModelFamily::Sd15 => "sd15",
            ModelFamily::Sd35 => "sd35",
            ModelFamily::Sdxl => "sdxl",
            ModelFamily::SdxlLightning => "sdxl-lightning",
        }
    }
}

/// One row of a family's fetch table.
#[derive(Debug)]
pub struct EntrySpec {
    pub remote: &'static str,
    pub dir: ModelDir,
    /// Local filename when it differs from the remote basename.
    pub rename: Option<&'static str>,
    pub label: &'static str,
}

#[derive(Debug)]
pub struct FamilySpec {
    pub family: ModelFamily,
    pub title: &'static str,
    pub source: Source,
    pub size_hint: Option<&'static str>,
    pub entries: &'static [EntrySpec],
    pub notes: &'static [&'static str],
    pub next_steps: &'static [&'static str],
}

const START_COMFYUI: &str = "Start ComfyUI: flox services start comfyui";
const OPEN_BROWSER: &str = "Open http://0.0.0.0:8188 in your browser";

pub static FAMILIES: &[FamilySpec] = &[
    FamilySpec {
        family: ModelFamily::Flux,
        title: "FLUX.1-dev",
        source: Source::Hub {
            repo_id: "black-forest-labs/FLUX.1-dev",
        },
        size_hint: None,
        entries: &[
            EntrySpec {
                remote: "flux1-dev.safetensors",
                dir: ModelDir::Unet,
                rename: None,
                label: "UNET",
            },
            EntrySpec {
                remote: "ae.safetensors",
                dir: ModelDir::Vae,
                rename: None,
                label: "VAE",
            },
            EntrySpec {
                remote: "text_encoder/model.safetensors",
                dir: ModelDir::Clip,
                rename: Some("clip_l.safetensors"),
                label: "CLIP-L",
            },
            EntrySpec {
                remote: "text_encoder_2/model.safetensors",
                dir: ModelDir::Clip,
                rename: Some("t5xxl_fp16.safetensors"),
                label: "T5XXL",
            },
        ],
        notes: &[],
        next_steps: &[
            START_COMFYUI,
            OPEN_BROWSER,
            "In ComfyUI, use UNETLoader for FLUX models",
        ],
    },
    FamilySpec {
        family: ModelFamily::Sd15,
        title: "Stable Diffusion 1.5",
        source: Source::Hub {
            repo_id: "runwayml/stable-diffusion-v1-5",
        },
        size_hint: Some("~4.3GB"),
        entries: &[EntrySpec {
            remote: "v1-5-pruned-emaonly.safetensors",
            dir: ModelDir::Checkpoints,
            rename: None,
            label: "Checkpoint",
        }],
        notes: &[],
        next_steps: &[
            "In ComfyUI, load the checkpoint: v1-5-pruned-emaonly.safetensors",
            "SD 1.5 works with regular CheckpointLoaderSimple",
            "Use 512x512 resolution for best results",
            "Higher CFG scale (7-11) works well with SD 1.5",
        ],
    },
    FamilySpec {
        family: ModelFamily::Sd35,
        title: "Stable Diffusion 3.5 Large",
        source: Source::Hub {
            repo_id: "stabilityai/stable-diffusion-3.5-large",
        },
        size_hint: None,
        entries: &[
            EntrySpec {
                remote: "sd3.5_large.safetensors",
                dir: ModelDir::Checkpoints,
                rename: None,
                label: "Checkpoint",
            },
            EntrySpec {
                remote: "text_encoders/clip_l.safetensors",
                dir: ModelDir::Clip,
                rename: None,
                label: "CLIP-L",
            },
            EntrySpec {
                remote: "text_encoders/clip_g.safetensors",
                dir: ModelDir::Clip,
                rename: None,
                label: "CLIP-G",
            },
            EntrySpec {
                remote: "text_encoders/t5xxl_fp16.safetensors",
                dir: ModelDir::Clip,
                rename: None,
                label: "T5XXL",
            },
        ],
        notes: &[],
        next_steps: &[
            START_COMFYUI,
            OPEN_BROWSER,
            "In ComfyUI, load the SD 3.5 checkpoint",
        ],
    },
    FamilySpec {
        family: ModelFamily::Sdxl,
        title: "Stable Diffusion XL 1.0",
        source: Source::Hub {
            repo_id: "stabilityai/stable-diffusion-xl-base-1.0",
        },
        size_hint: Some("~6.9GB"),
        entries: &[EntrySpec {
            remote: "sd_xl_base_1.0.safetensors",
            dir: ModelDir::Checkpoints,
            rename: None,
            label: "Checkpoint",
        }],
        notes: &[],
        next_steps: &[
            "In ComfyUI, load the checkpoint: sd_xl_base_1.0.safetensors",
            "SDXL works with regular CheckpointLoaderSimple",
            "Use 1024x1024 resolution for best results",
        ],
    },
    FamilySpec {
        family: ModelFamily::SdxlLightning,
        title: "RealVisXL V4 Lightning",
        source: Source::Http {
            url: "https://civitai.com/api/download/models/361593",
        },
        size_hint: Some("~6.5GB"),
        entries: &[EntrySpec {
            remote: "https://civitai.com/api/download/models/361593",
            dir: ModelDir::Checkpoints,
            rename: Some("realvisxl_v40_lightning.safetensors"),
            label: "Checkpoint",
        }],
        notes: &[
            "Optimized for 4-8 steps",
            "Use CFG 2.0",
            "Sampler: DPM++ SDE or DPM++ 2M SDE",
            "Scheduler: SGM Uniform",
        ],
        next_steps: &[
            START_COMFYUI,
            OPEN_BROWSER,
            "Load realvisxl_v40_lightning.safetensors",
            "Use Lightning settings (4-8 steps, CFG 2)",
        ],
    },
];

/// One planned remote-to-local transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchEntry {
    pub remote: String,
    pub destination_dir: PathBuf,
    pub local_filename: String,
    pub label: String,
}

impl FetchEntry {
    pub fn new(remote: &str, destination_dir: PathBuf, local_filename: Option<&str>) -> Self {
        let local_filename = local_filename
            .map(str::to_string)
            .unwrap_or_else(|| remote_basename(remote).to_string());
        Self {
            remote: remote.to_string(),
            destination_dir,
            local_filename,
            label: String::new(),
        }
    }

    /// Final path the entry must occupy after a successful fetch.
    pub fn target_path(&self) -> PathBuf {
        self.destination_dir.join(&self.local_filename)
    }
}

fn remote_basename(remote: &str) -> &str {
    remote.rsplit('/').next().unwrap_or(remote)
}

/// Ordered fetch entries for one family, resolved against a layout.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub source: Source,
    pub entries: Vec<FetchEntry>,
}

impl FetchPlan {
    pub fn for_family(family: ModelFamily, layout: &Layout) -> Self {
        let spec = family.spec();
        let entries = spec
            .entries
            .iter()
            .map(|row| FetchEntry {
                label: row.label.to_string(),
                ..FetchEntry::new(row.remote, layout.model_dir(row.dir), row.rename)
            })
            .collect();
        Self {
            source: spec.source,
            entries,
        }
    }

    /// Distinct destination directories, in plan order.
    pub fn destination_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in &self.entries {
            if !dirs.contains(&entry.destination_dir) {
                dirs.push(entry.destination_dir.clone());
            }
        }
        dirs
    }
}
