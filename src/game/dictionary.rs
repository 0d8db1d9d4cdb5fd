use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::letters::fold_word;

/// Membership predicate over the game's lexicon.
pub trait Dictionary: Send + Sync {
    fn is_valid_word(&self, word: &str) -> bool;
}

/// Accepts every word. Used when no lexicon is available so play is never blocked.
pub struct PermissiveDictionary;

impl Dictionary for PermissiveDictionary {
    fn is_valid_word(&self, _word: &str) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("Failed to read word list: {0}")]
    Io(#[from] std::io::Error),
    #[error("Word list is empty")]
    Empty,
}

/// In-memory lexicon. Words are stored folded to upper case.
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| fold_word(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Loads a newline-separated word list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let contents = std::fs::read_to_string(path)?;
        let list = Self::from_words(contents.lines());
        if list.is_empty() {
            return Err(DictionaryError::Empty);
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordList {
    fn is_valid_word(&self, word: &str) -> bool {
        self.words.contains(&fold_word(word))
    }
}

/// Loads the lexicon at `path`, falling back to [`PermissiveDictionary`]
/// when no path is configured or the list cannot be read.
pub fn load_dictionary(path: Option<&Path>) -> Arc<dyn Dictionary> {
    let Some(path) = path else {
        warn!("No word list configured, accepting every word");
        return Arc::new(PermissiveDictionary);
    };

    match WordList::load(path) {
        Ok(list) => {
            info!(path = %path.display(), words = list.len(), "Word list loaded");
            Arc::new(list)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Word list unavailable, accepting every word");
            Arc::new(PermissiveDictionary)
        }
    }
}
