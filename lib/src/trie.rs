use crate::geometry::MIN_WORD_LENGTH;
use crate::results::GameError;
use std::collections::HashMap;
use std::io::BufRead;
use tracing::debug;

/// Answers dictionary queries for the engine and the hint solver.
///
/// Words are expected in uppercase. Implement this to back the engine with something other than
/// an in-memory [`Trie`].
pub trait WordLookup {
    /// Returns `true` iff `word` is exactly a dictionary word.
    fn contains_word(&self, word: &str) -> bool;

    /// Returns `true` iff some dictionary word starts with `prefix`.
    fn contains_prefix(&self, prefix: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    /// The full word ending at this node, if this node is terminal.
    word: Option<Box<str>>,
}

impl TrieNode {
    fn is_terminal(&self) -> bool {
        self.word.is_some()
    }
}

/// A prefix tree of uppercase dictionary words.
///
/// ```
/// use rs_wordfall::Trie;
///
/// let trie = Trie::from_iterator(["cat", "Cart", "at"]);
///
/// assert!(trie.contains("CAT"));
/// assert!(trie.has_prefix("CA"));
/// // Words shorter than three letters are never stored.
/// assert!(!trie.contains("AT"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct Trie {
    root: TrieNode,
    len: usize,
}

impl Trie {
    pub fn new() -> Trie {
        Trie::default()
    }

    /// Builds a trie from the given words. Each word is trimmed and converted to uppercase. Words
    /// shorter than three letters, or with characters outside A to Z, are skipped.
    pub fn from_iterator<I, S>(words: I) -> Trie
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Trie::new();
        let mut skipped = 0;
        for word in words {
            if !trie.insert(word.as_ref()) {
                skipped += 1;
            }
        }
        debug!(words = trie.len, skipped, "built dictionary trie");
        trie
    }

    /// Builds a trie by reading one word per line from the given reader.
    ///
    /// See [`Trie::from_iterator`] for how each word is normalized.
    pub fn from_reader<R: BufRead>(word_reader: R) -> Result<Trie, GameError> {
        let words = word_reader
            .lines()
            .collect::<Result<Vec<String>, std::io::Error>>()?;
        Ok(Trie::from_iterator(words))
    }

    /// Inserts a word. Returns `false` if the word was not stored because it is too short or has
    /// unsupported characters.
    pub fn insert(&mut self, word: &str) -> bool {
        let word = word.trim().to_ascii_uppercase();
        if word.chars().count() < MIN_WORD_LENGTH || !word.chars().all(|c| c.is_ascii_uppercase())
        {
            return false;
        }
        let mut node = &mut self.root;
        for letter in word.chars() {
            node = node.children.entry(letter).or_default();
        }
        if !node.is_terminal() {
            node.word = Some(Box::from(word.as_str()));
            self.len += 1;
        }
        true
    }

    fn find_node(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for letter in prefix.chars() {
            node = node.children.get(&letter)?;
        }
        Some(node)
    }

    /// Returns `true` iff `word` was inserted into this trie.
    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    /// Returns the stored word matching `word`, if any.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.find_node(word).and_then(|node| node.word.as_deref())
    }

    /// Returns `true` iff any stored word starts with `prefix`. The empty prefix matches any
    /// non-empty trie.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        match self.find_node(prefix) {
            Some(node) => node.is_terminal() || !node.children.is_empty(),
            None => false,
        }
    }

    /// The number of words in the trie.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl WordLookup for Trie {
    fn contains_word(&self, word: &str) -> bool {
        self.contains(word)
    }

    fn contains_prefix(&self, prefix: &str) -> bool {
        self.has_prefix(prefix)
    }
}

/// Builds the hint solver's trie from a dictionary, keeping every word of three or more letters.
pub fn build_trie_from_dictionary<I, S>(words: I) -> Trie
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Trie::from_iterator(words)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn retrieve_empty() {
        let trie = Trie::new();

        assert!(!trie.contains("CAT"));
        assert!(!trie.has_prefix(""));
        assert!(trie.is_empty());
    }

    #[test]
    fn insert_and_retrieve() {
        let mut trie = Trie::new();

        assert!(trie.insert("cat"));

        assert!(trie.contains("CAT"));
        assert_eq!(trie.get("CAT"), Some("CAT"));
        assert!(!trie.contains("CA"));
        assert!(!trie.contains("CATS"));
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn prefixes_match_inner_and_terminal_nodes() {
        let trie = Trie::from_iterator(["cat", "cattle"]);

        assert!(trie.has_prefix("C"));
        assert!(trie.has_prefix("CAT"));
        assert!(trie.has_prefix("CATT"));
        assert!(trie.has_prefix("CATTLE"));
        assert!(!trie.has_prefix("CATTLES"));
        assert!(!trie.has_prefix("D"));
    }

    #[test]
    fn skips_short_and_unsupported_words() {
        let mut trie = Trie::new();

        assert!(!trie.insert("at"));
        assert!(!trie.insert("don't"));
        assert!(!trie.insert("café"));
        assert!(trie.is_empty());
    }

    #[test]
    fn duplicates_are_counted_once() {
        let trie = Trie::from_iterator(["dog", "DOG", " dog "]);

        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn from_reader_reads_lines() -> Result<(), GameError> {
        let cursor = Cursor::new(String::from("\nworda\n wordb\nab\n"));

        let trie = Trie::from_reader(cursor)?;

        assert_eq!(trie.len(), 2);
        assert!(trie.contains("WORDA"));
        assert!(trie.contains("WORDB"));
        Ok(())
    }

    #[test]
    fn word_lookup_delegates_to_trie() {
        let trie = build_trie_from_dictionary(["level"]);
        let lookup: &dyn WordLookup = &trie;

        assert!(lookup.contains_word("LEVEL"));
        assert!(lookup.contains_prefix("LEV"));
        assert!(!lookup.contains_word("LEV"));
    }
}
