//! Guards against rewriting the store while the browser has it open.

use std::io::Write;

use bookmarkup_shared::BookmarkUpError;
use color_eyre::eyre::{Result, eyre};
use sysinfo::System;
use tracing::{info, warn};

/// Whether any running process name contains `name`.
pub(crate) fn is_running(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let mut system = System::new();
    system.refresh_processes();
    system.processes().values().any(|p| p.name().contains(name))
}

/// Make sure the browser is closed before the store is touched.
///
/// When it is running, the user is asked to close it and press Enter, and
/// the check runs once more. With `assume_yes` there is nobody to ask, so a
/// running browser aborts immediately.
pub(crate) fn ensure_closed(name: &str, assume_yes: bool) -> Result<()> {
    if !is_running(name) {
        return Ok(());
    }

    warn!(browser = name, "browser is running");
    println!("WARNING: {name} is running! Close all instances of {name} before continuing.");

    if assume_yes {
        return Err(BookmarkUpError::BrowserRunning {
            name: name.to_string(),
        }
        .into());
    }

    prompt("Press Enter to continue once it is closed, or Ctrl+C to abort: ")?;

    if is_running(name) {
        return Err(BookmarkUpError::BrowserRunning {
            name: name.to_string(),
        }
        .into());
    }
    info!(browser = name, "browser closed, continuing");
    Ok(())
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    std::io::stdout()
        .flush()
        .map_err(|e| eyre!("failed to write prompt: {e}"))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| eyre!("failed to read answer: {e}"))?;
    Ok(line)
}
