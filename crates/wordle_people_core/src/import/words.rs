//! Word-list sources used to draw person names.

use std::path::{Path, PathBuf};
use thiserror::Error;

const BUNDLED_WORDLIST: &str = include_str!("../../assets/wordlist.txt");

/// Failure to read a word list.
#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("failed to read word list `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supplies the ordered word list for one import run.
pub trait WordSource {
    /// Loads the full list into memory. Called once per import.
    fn load_words(&self) -> Result<Vec<String>, WordSourceError>;
}

impl<W: WordSource + ?Sized> WordSource for &W {
    fn load_words(&self) -> Result<Vec<String>, WordSourceError> {
        (**self).load_words()
    }
}

impl WordSource for Vec<String> {
    fn load_words(&self) -> Result<Vec<String>, WordSourceError> {
        Ok(self.clone())
    }
}

impl WordSource for [&str] {
    fn load_words(&self) -> Result<Vec<String>, WordSourceError> {
        Ok(self.iter().map(|word| (*word).to_string()).collect())
    }
}

/// Newline-delimited word list on disk.
#[derive(Debug, Clone)]
pub struct FileWordSource {
    path: PathBuf,
}

impl FileWordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordSource for FileWordSource {
    fn load_words(&self) -> Result<Vec<String>, WordSourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| WordSourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(parse_word_list(&text))
    }
}

/// The `wordlist.txt` compiled into this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledWordSource;

impl WordSource for BundledWordSource {
    fn load_words(&self) -> Result<Vec<String>, WordSourceError> {
        Ok(parse_word_list(BUNDLED_WORDLIST))
    }
}

/// Splits text into one word per line, dropping blank lines and
/// surrounding whitespace (including `\r` from CRLF files).
pub fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
