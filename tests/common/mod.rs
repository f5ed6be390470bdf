//! Shared helpers for driving the `comfy-prep` binary against a scratch work tree.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

pub const WORKFLOW_PACK_REL: &str = "default/workflows/UmeAiRT - FLUX MEGAPACK 3.1";

/// Scratch `COMFYUI_WORK_DIR` removed on drop.
pub struct WorkTree {
    dir: TempDir,
}

impl WorkTree {
    pub fn create() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp work tree"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn workflows_dir(&self) -> PathBuf {
        self.root().join(WORKFLOW_PACK_REL)
    }

    #[allow(dead_code)]
    pub fn checkpoints_dir(&self) -> PathBuf {
        self.root().join("models").join("checkpoints")
    }

    pub fn write(&self, path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(path, contents.as_bytes()).expect("write file");
    }

    /// Command with a clean token environment pointed at this tree.
    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_comfy-prep"));
        command
            .env("COMFYUI_WORK_DIR", self.root())
            .env_remove("HF_TOKEN")
            .env_remove("CIVITAI_TOKEN")
            .env_remove("COMFY_PREP_FETCH_COMMAND")
            .env_remove("RUST_LOG");
        command
    }

    /// Run with `stdin` piped in and collect the output.
    pub fn run(&self, mut command: Command, stdin: &str) -> Output {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn comfy-prep");
        if let Some(mut input) = child.stdin.take() {
            input.write_all(stdin.as_bytes()).expect("write stdin");
        }
        child.wait_with_output().expect("wait for comfy-prep")
    }
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
