use crate::content;
use crate::error::{AppError, Result};
use std::fmt;
use std::path::Path;
use tiktoken_rs::CoreBPE;

pub const DEFAULT_ENCODING: &str = "o200k_base";
pub const FALLBACK_ENCODING: &str = "cl100k_base";

/// Counts tokens with a tiktoken encoding. Every count is at least 1, so
/// an empty file still shows up in rankings.
pub struct TokenCounter {
    bpe: Option<CoreBPE>,
    encoding: &'static str,
}

impl fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &self.encoding)
            .field("loaded", &self.bpe.is_some())
            .finish()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter {
    /// Loads the default encoding, then the fallback; if neither loads the
    /// counter estimates from character counts.
    pub fn new() -> Self {
        for encoding in [DEFAULT_ENCODING, FALLBACK_ENCODING] {
            match Self::load(encoding) {
                Ok(counter) => return counter,
                Err(e) => log::warn!("{}", e),
            }
        }
        log::warn!("No tokenizer available; token counts are estimates");
        Self {
            bpe: None,
            encoding: "estimate",
        }
    }

    pub fn load(encoding: &str) -> Result<Self> {
        let (bpe, name) = match encoding {
            "o200k_base" => (tiktoken_rs::o200k_base(), DEFAULT_ENCODING),
            "cl100k_base" => (tiktoken_rs::cl100k_base(), FALLBACK_ENCODING),
            other => {
                return Err(AppError::TikToken(format!("Unknown encoding '{}'", other)));
            }
        };
        let bpe = bpe.map_err(|e| {
            AppError::TikToken(format!("Failed to load tokenizer {}: {}", name, e))
        })?;
        log::debug!("Loaded tokenizer {}", name);
        Ok(Self {
            bpe: Some(bpe),
            encoding: name,
        })
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn count(&self, text: &str) -> usize {
        let count = match &self.bpe {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => text.chars().count().div_ceil(4),
        };
        count.max(1)
    }

    /// `None` for binary or unreadable files.
    pub fn count_file(&self, path: &Path) -> Option<usize> {
        match std::fs::read(path) {
            Ok(bytes) if content::is_binary_bytes(&bytes) => None,
            Ok(bytes) => Some(self.count(&String::from_utf8_lossy(&bytes))),
            Err(e) => {
                log::warn!("Could not read {} for token counting: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_counts_as_one_token() {
        let counter = TokenCounter::new();
        assert_eq!(counter.count(""), 1);
    }

    #[test]
    fn longer_text_has_more_tokens() {
        let counter = TokenCounter::new();
        let short = counter.count("def f(): pass");
        let long = counter.count(&"def f(): pass\n".repeat(50));
        assert!(long > short);
    }

    #[test]
    fn counter_reports_its_encoding() {
        let counter = TokenCounter::new();
        assert!(["o200k_base", "cl100k_base", "estimate"].contains(&counter.encoding()));
        if let Ok(loaded) = TokenCounter::load(FALLBACK_ENCODING) {
            assert_eq!(loaded.encoding(), FALLBACK_ENCODING);
        }
    }

    #[test]
    fn unknown_encoding_is_an_error() {
        let err = TokenCounter::load("p50k_nonsense").unwrap_err();
        assert!(matches!(err, AppError::TikToken(_)));
    }
}
