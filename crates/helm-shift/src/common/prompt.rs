//! Interactive confirmation gate for destructive operations.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Only `y`/`yes` (any case) confirms; anything else, including an empty
/// line, declines.
pub fn ask_confirmation(operation: &str, message: &str) -> Result<bool> {
    print!("[{operation}/confirm] Are you sure you want to {message}? [y/N]: ");
    io::stdout().flush().context("flushing confirmation prompt")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("couldn't read from standard input")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
