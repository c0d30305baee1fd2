use crate::error::{AppError, Result};
use std::path::Path;

/// Bytes inspected when sniffing for binary content.
pub const BINARY_SNIFF_LEN: usize = 8192;

/// A NUL byte in the leading chunk marks content as binary.
pub fn is_binary_bytes(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_LEN).any(|&b| b == 0)
}

/// What was found when reading a file for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileText {
    Text(String),
    Binary,
}

/// Reads a file, decoding invalid UTF-8 with replacement characters.
pub fn read_text_lossy(path: &Path) -> Result<FileText> {
    let bytes = std::fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    if is_binary_bytes(&bytes) {
        return Ok(FileText::Binary);
    }
    Ok(FileText::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Prefixes each line with `<n>: `, numbers right-aligned to the widest.
pub fn number_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.len().to_string().len();
    let mut numbered = String::with_capacity(text.len() + lines.len() * (width + 2));
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            numbered.push('\n');
        }
        numbered.push_str(&format!("{:>width$}: {}", idx + 1, line, width = width));
    }
    numbered
}
