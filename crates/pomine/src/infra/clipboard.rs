//! Clipboard integration utilities.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Cross-platform clipboard with a shell-utility fallback for headless
/// environments.
pub struct Clipboard {
    backend: Backend,
}

enum Backend {
    System(Box<arboard::Clipboard>),
    Shell,
}

impl Clipboard {
    /// Probe for a system clipboard; otherwise rely on shell utilities.
    pub fn new() -> Self {
        let backend = match arboard::Clipboard::new() {
            Ok(clipboard) => Backend::System(Box::new(clipboard)),
            Err(error) => {
                debug!(%error, "system clipboard unavailable, using shell fallback");
                Backend::Shell
            }
        };
        Self { backend }
    }

    /// Copy text, degrading from the system clipboard to shell utilities.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        if let Backend::System(clipboard) = &mut self.backend {
            if clipboard.set_text(text.to_owned()).is_ok() {
                return Ok(());
            }
            self.backend = Backend::Shell;
        }
        shell_copy(text)
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

fn shell_copy(text: &str) -> Result<()> {
    for command in SHELL_COMMANDS {
        if pipe_into(command, text).is_ok() {
            return Ok(());
        }
    }
    Err(anyhow!("no clipboard backend accepted the text"))
}

fn pipe_into(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if !status.success() {
        return Err(anyhow!("clipboard command exited with status {status}"));
    }
    Ok(())
}

#[cfg(target_os = "macos")]
const SHELL_COMMANDS: &[&[&str]] = &[&["pbcopy"]];

#[cfg(all(unix, not(target_os = "macos")))]
const SHELL_COMMANDS: &[&[&str]] = &[&["wl-copy"], &["xclip", "-selection", "clipboard"]];

#[cfg(target_os = "windows")]
const SHELL_COMMANDS: &[&[&str]] =
    &[&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]];

#[cfg(not(any(unix, target_os = "windows")))]
const SHELL_COMMANDS: &[&[&str]] = &[];
