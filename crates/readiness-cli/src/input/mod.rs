pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read `--input <file>` if given, else piped stdin.
pub fn file_or_stdin<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match piped_stdin()? {
        Some(text) => Ok(serde_json::from_str(&text)?),
        None => Err(format!("--input <file.json> or stdin required for {}", what).into()),
    }
}

/// Piped stdin contents, or None on an interactive terminal or empty pipe.
fn piped_stdin() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
