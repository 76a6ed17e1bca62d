//! Tokenized search index over player names and dates of birth.
//!
//! Name tokens are folded (lowercase, diacritics stripped) and matched by
//! prefix; date-of-birth tokens must match exactly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase `s` and strip diacritics, so "Ibrahimović" folds to "ibrahimovic".
pub fn fold(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        // Letters with no canonical decomposition.
        match c {
            'ø' | 'Ø' => out.push('o'),
            'ł' | 'Ł' => out.push('l'),
            'đ' | 'Đ' => out.push('d'),
            'ı' => out.push('i'),
            'ß' => out.push_str("ss"),
            'æ' | 'Æ' => out.push_str("ae"),
            'œ' | 'Œ' => out.push_str("oe"),
            _ => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Folded name tokens, split on anything that is not a letter or digit.
pub fn name_tokens(name: &str) -> Vec<String> {
    fold(name)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
pub struct NameIndex {
    names: BTreeMap<String, BTreeSet<usize>>,
    dobs: HashMap<String, BTreeSet<usize>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a player under its insertion ordinal.
    pub fn insert(&mut self, ordinal: usize, name: &str, dob: &str) {
        for token in name_tokens(name) {
            self.names.entry(token).or_default().insert(ordinal);
        }
        let dob = dob.trim();
        if !dob.is_empty() {
            self.dobs.entry(dob.to_string()).or_default().insert(ordinal);
        }
    }

    fn prefix_matches(&self, prefix: &str) -> BTreeSet<usize> {
        self.names
            .range(prefix.to_string()..)
            .take_while(|(token, _)| token.starts_with(prefix))
            .flat_map(|(_, ordinals)| ordinals.iter().copied())
            .collect()
    }

    fn term_matches(&self, term: &str) -> BTreeSet<usize> {
        if let Some(ordinals) = self.dobs.get(term) {
            return ordinals.clone();
        }
        let mut matches: Option<BTreeSet<usize>> = None;
        for token in name_tokens(term) {
            let found = self.prefix_matches(&token);
            matches = Some(match matches {
                None => found,
                Some(acc) => acc.intersection(&found).copied().collect(),
            });
        }
        matches.unwrap_or_default()
    }

    /// Ordinals matching every whitespace-separated term of `query`, ascending.
    pub fn search(&self, query: &str) -> Vec<usize> {
        let mut result: Option<BTreeSet<usize>> = None;
        for term in query.split_whitespace() {
            let found = self.term_matches(term);
            result = Some(match result {
                None => found,
                Some(acc) => acc.intersection(&found).copied().collect(),
            });
            if result.as_ref().is_some_and(|r| r.is_empty()) {
                break;
            }
        }
        result.map(|r| r.into_iter().collect()).unwrap_or_default()
    }
}
