//! TOML parser with helpful error messages

use std::path::Path;

use super::{Manifest, ManifestError};

/// Parse a manifest file from disk.
pub fn parse_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_manifest_str(&content).map_err(|err| match err {
        ManifestError::Parse { message, .. } => ManifestError::Parse {
            origin: path.display().to_string(),
            message,
        },
        other => other,
    })
}

/// Parse manifest content from a string
pub fn parse_manifest_str(content: &str) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = toml::from_str(content).map_err(|e| ManifestError::Parse {
        origin: "<string>".to_string(),
        message: enhance_toml_error(&e, content),
    })?;

    manifest.validate()?;

    Ok(manifest)
}

/// Serialize a manifest to a TOML string
pub fn to_toml(manifest: &Manifest) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(manifest)
}

/// Attach the offending lines to a TOML error when a location is known.
fn enhance_toml_error(error: &toml::de::Error, content: &str) -> String {
    let message = error.message().to_string();

    let Some(span) = error.span() else {
        return message;
    };

    let line_num = content[..span.start.min(content.len())]
        .chars()
        .filter(|&c| c == '\n')
        .count()
        + 1;

    format!(
        "line {}:\n{}\n\n{}",
        line_num,
        get_line_context(content, line_num),
        message
    )
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
