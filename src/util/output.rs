use std::io::{self, Write};
use std::path::Path;

use console::style;
use dialoguer::Confirm;

use crate::error::{DepgraphError, Result};

pub fn info(message: &str) {
    let _ = writeln!(io::stderr(), "{}", message);
}

pub fn warn(message: &str) {
    let _ = writeln!(io::stderr(), "{}", style(message).yellow());
}

pub fn error(message: &str) {
    let _ = writeln!(io::stderr(), "{} {}", style("error:").red().bold(), message);
}

/// Section title for stdout reports.
pub fn heading(title: &str) -> String {
    style(title).bold().to_string()
}

/// Asks before replacing `path`. Files that do not exist yet, and
/// `assume_yes`, skip the prompt.
pub fn confirm_overwrite(path: &Path, assume_yes: bool) -> Result<bool> {
    if assume_yes || !path.exists() {
        return Ok(true);
    }

    Confirm::new()
        .with_prompt(format!("{} exists, overwrite?", path.display()))
        .default(false)
        .interact()
        .map_err(|err| DepgraphError::Other(anyhow::Error::new(err)))
}
