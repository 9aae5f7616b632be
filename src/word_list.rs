//! The dictionary the solver draws from. Words are normalized to uppercase, deduplicated, and
//! addressed by a dense `WordId` so that domains can be stored as bit sets.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::MAX_SLOT_LENGTH;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[derive(Debug)]
pub enum WordListError {
    /// The word list file couldn't be read.
    Io(std::io::Error),
    /// A line contained more than one word.
    InvalidWord { line: usize, content: String },
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordListError::Io(err) => write!(f, "Failed to read word list: {err}"),
            WordListError::InvalidWord { line, content } => {
                write!(f, "Invalid word on line {line}: '{content}'")
            }
        }
    }
}

impl std::error::Error for WordListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WordListError::Io(err) => Some(err),
            WordListError::InvalidWord { .. } => None,
        }
    }
}

impl From<std::io::Error> for WordListError {
    fn from(value: std::io::Error) -> Self {
        WordListError::Io(value)
    }
}

/// An immutable, ordered set of candidate words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Build a word list, trimming and uppercasing each entry. Blank entries are dropped and
    /// repeated entries keep the position of their first occurrence.
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();

        for word in words {
            let normalized = word.as_ref().trim().to_uppercase();
            if normalized.is_empty() || word_list.ids_by_string.contains_key(&normalized) {
                continue;
            }
            word_list.ids_by_string.insert(normalized.clone(), word_list.words.len());
            word_list.words.push(Word::new(normalized));
        }

        word_list
    }

    /// Load a newline-separated word list from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<WordList, WordListError> {
        let contents = fs::read_to_string(path)?;
        let word_list: WordList = contents.parse()?;
        log::debug!("Loaded {} distinct words", word_list.len());
        Ok(word_list)
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn id_of(&self, word: &str) -> Option<WordId> {
        self.ids_by_string.get(&word.trim().to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}

impl FromStr for WordList {
    type Err = WordListError;

    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().contains(char::is_whitespace) {
                return Err(WordListError::InvalidWord {
                    line: idx + 1,
                    content: line.trim().to_string(),
                });
            }
        }
        Ok(WordList::new(contents.lines()))
    }
}

#[cfg(test)]
mod tests {
    use super::{WordList, WordListError};

    #[test]
    fn test_new_normalizes_and_dedupes() {
        let word_list = WordList::new(["cat", " Dog ", "CAT", "", "dove"]);

        assert_eq!(word_list.len(), 3);
        assert_eq!(word_list.word(0).string, "CAT");
        assert_eq!(word_list.word(1).string, "DOG");
        assert_eq!(word_list.word(2).string, "DOVE");
        assert_eq!(word_list.id_of("dove"), Some(2));
        assert_eq!(word_list.id_of("bird"), None);
    }

    #[test]
    fn test_word_length_counts_chars() {
        let word_list = WordList::new(["café"]);

        assert_eq!(word_list.word(0).len(), 4);
        assert_eq!(word_list.word(0).chars[3], 'É');
    }

    #[test]
    fn test_parse_rejects_multiple_words_per_line() {
        let result = "one\ntwo words\nthree".parse::<WordList>();

        match result {
            Err(WordListError::InvalidWord { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "two words");
            }
            other => panic!("Expected invalid word error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = WordList::load("/nonexistent/crossfill/words.txt");

        assert!(matches!(result, Err(WordListError::Io(_))));
    }
}
