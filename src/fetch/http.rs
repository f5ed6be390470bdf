//! Plain HTTP fetches through an external program (`curl` by default).
//!
//! The program streams straight to the target path. While it runs SIGINT is
//! caught here and only recorded; the child gets the default disposition
//! back on exec and dies, so an interrupted transfer can be cleaned up.
use super::{verify_download, FetchError, Fetcher};
use crate::layout::{env_value, FETCH_COMMAND_ENV};
use crate::plan::FetchEntry;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

const DEFAULT_FETCH_COMMAND: &str = "curl";

#[derive(Debug)]
pub struct HttpFetcher {
    program: PathBuf,
    base_args: Vec<String>,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(program: PathBuf, base_args: Vec<String>, token: Option<String>) -> Self {
        Self {
            program,
            base_args,
            token,
        }
    }

    /// Resolve the fetch program from `COMFY_PREP_FETCH_COMMAND` or `curl`.
    pub fn from_env(token: Option<String>) -> Result<Self, FetchError> {
        let command =
            env_value(FETCH_COMMAND_ENV).unwrap_or_else(|| DEFAULT_FETCH_COMMAND.to_string());
        let words = shell_words::split(&command)
            .map_err(|err| FetchError::Setup(format!("parse fetch command {command:?}: {err}")))?;
        let (program, base_args) = words
            .split_first()
            .ok_or_else(|| FetchError::Setup("fetch command is empty".to_string()))?;
        let program = which::which(program)
            .map_err(|err| FetchError::Setup(format!("locate {program}: {err}")))?;
        Ok(Self::new(program, base_args.to_vec(), token))
    }

    /// Arguments appended after the configured base arguments.
    pub fn transfer_args(&self, url: &str, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-L".to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "--progress-bar".to_string(),
        ];
        if let Some(token) = &self.token {
            args.push("-H".to_string());
            args.push(format!("Authorization: Bearer {token}"));
        }
        args.push(url.to_string());
        args
    }

    /// Run the program to completion. The flag reports whether SIGINT
    /// arrived while it ran.
    fn spawn_and_wait(
        &self,
        url: &str,
        output: &Path,
    ) -> Result<(ExitStatus, bool), FetchError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(self.transfer_args(url, output));
        tracing::debug!(
            program = %self.program.display(),
            authorized = self.token.is_some(),
            output = %output.display(),
            "spawn http fetch"
        );
        let guard = interrupt::defer_to_child();
        let status = command
            .status()
            .map_err(|err| FetchError::io(format!("spawn {}", self.program.display()), err))?;
        Ok((status, guard.interrupted()))
    }
}

impl Fetcher for HttpFetcher {
    fn confirms_overwrite(&self) -> bool {
        true
    }

    fn retrieve(&self, entry: &FetchEntry) -> Result<PathBuf, FetchError> {
        let output = entry.target_path();
        let (status, caught) = self.spawn_and_wait(&entry.remote, &output)?;
        if caught || interrupt::killed_by_interrupt(&status) {
            remove_partial(&output);
            return Err(FetchError::Cancelled {
                remote: entry.remote.clone(),
            });
        }
        if !status.success() {
            remove_partial(&output);
            return Err(FetchError::Transfer {
                remote: entry.remote.clone(),
                message: format!("{} exited with {status}", self.program.display()),
            });
        }
        let size = verify_download(&output)?;
        tracing::info!(bytes = size, output = %output.display(), "http fetch verified");
        Ok(output)
    }
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), %err, "failed to remove partial download");
        }
    }
}

#[cfg(unix)]
mod interrupt {
    use signal_hook::consts::SIGINT;
    use signal_hook::flag;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, OnceLock};

    struct Flags {
        /// Set by the handler whenever SIGINT arrives.
        caught: Arc<AtomicBool>,
        /// While set, SIGINT terminates this process as usual.
        terminate: Arc<AtomicBool>,
    }

    static FLAGS: OnceLock<Option<Flags>> = OnceLock::new();

    fn install() -> Option<Flags> {
        let flags = Flags {
            caught: Arc::new(AtomicBool::new(false)),
            terminate: Arc::new(AtomicBool::new(true)),
        };
        let registered = flag::register_conditional_default(SIGINT, Arc::clone(&flags.terminate))
            .and_then(|_| flag::register(SIGINT, Arc::clone(&flags.caught)));
        match registered {
            Ok(_) => Some(flags),
            Err(err) => {
                tracing::warn!(%err, "failed to install SIGINT handler");
                None
            }
        }
    }

    /// Puts SIGINT back to terminating this process on drop.
    pub(super) struct Guard {
        flags: Option<&'static Flags>,
    }

    impl Guard {
        pub(super) fn interrupted(&self) -> bool {
            self.flags
                .is_some_and(|flags| flags.caught.load(Ordering::SeqCst))
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            if let Some(flags) = self.flags {
                flags.terminate.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Record SIGINT instead of dying from it until the guard drops.
    pub(super) fn defer_to_child() -> Guard {
        let flags = FLAGS.get_or_init(install).as_ref();
        if let Some(flags) = flags {
            flags.caught.store(false, Ordering::SeqCst);
            flags.terminate.store(false, Ordering::SeqCst);
        }
        Guard { flags }
    }

    pub(super) fn killed_by_interrupt(status: &ExitStatus) -> bool {
        status.signal() == Some(SIGINT) || status.code() == Some(130)
    }
}

#[cfg(not(unix))]
mod interrupt {
    use std::process::ExitStatus;

    pub(super) struct Guard;

    impl Guard {
        pub(super) fn interrupted(&self) -> bool {
            false
        }
    }

    pub(super) fn defer_to_child() -> Guard {
        Guard
    }

    pub(super) fn killed_by_interrupt(status: &ExitStatus) -> bool {
        status.code() == Some(130)
    }
}
