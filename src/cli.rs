//! CLI argument parsing.
//!
//! The CLI stays thin: directories and hosts are fixed by the ComfyUI layout,
//! so arguments only select what to run.
use crate::plan::ModelFamily;
use crate::workflow::NormalizationPass;
use clap::{Parser, Subcommand};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "comfy-prep",
    version,
    about = "Fetch ComfyUI model weights and repair workflow model paths",
    after_help = "Environment:\n  COMFYUI_WORK_DIR          Work tree root (default: ~/comfyui-work)\n  HF_TOKEN                  HuggingFace token for gated repositories\n  CIVITAI_TOKEN             CivitAI API token\n  COMFY_PREP_FETCH_COMMAND  HTTP client for CivitAI downloads (default: curl)\n\nExamples:\n  comfy-prep download flux\n  comfy-prep download sdxl-lightning\n  comfy-prep fix-workflows --pass backslashes\n  comfy-prep fix-workflows --pass model-paths\n  comfy-prep families",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Download(DownloadArgs),
    FixWorkflows(FixWorkflowsArgs),
    Families,
}

/// Download command inputs.
#[derive(Parser, Debug)]
#[command(about = "Download one model family into the models directory")]
pub struct DownloadArgs {
    /// Model family to fetch
    #[arg(value_enum)]
    pub family: ModelFamily,

    /// Print the plan and create directories without fetching
    #[arg(long)]
    pub dry_run: bool,
}

/// Workflow repair inputs.
#[derive(Parser, Debug)]
#[command(about = "Rewrite model paths in workflow JSON files")]
pub struct FixWorkflowsArgs {
    /// Normalization pass to apply
    #[arg(long, value_enum)]
    pub pass: NormalizationPass,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_download_family() {
        let args = RootArgs::try_parse_from(["comfy-prep", "download", "sdxl-lightning"])
            .expect("parse");
        match args.command {
            Command::Download(download) => {
                assert_eq!(download.family, ModelFamily::SdxlLightning);
                assert!(!download.dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fix_workflows_requires_pass() {
        assert!(RootArgs::try_parse_from(["comfy-prep", "fix-workflows"]).is_err());
        let args =
            RootArgs::try_parse_from(["comfy-prep", "fix-workflows", "--pass", "model-paths"])
                .expect("parse");
        assert!(matches!(
            args.command,
            Command::FixWorkflows(FixWorkflowsArgs {
                pass: NormalizationPass::ModelPaths
            })
        ));
    }
}
