use std::collections::{HashMap, HashSet};

/// A document class identifier.
pub type Label = String;

/// A whitespace-delimited word.
pub type Token = String;

/// Splits document text on whitespace. No stemming or case folding.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Raw training counts: documents per label, token frequencies per label and
/// the vocabulary of every token seen.
///
/// Stores built over disjoint document sets can be combined with
/// [`merge`](CountStore::merge); merging is additive, so partitions may be
/// folded together in any order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CountStore {
    label_counts: HashMap<Label, u64>,
    feature_counts: HashMap<Label, HashMap<Token, u64>>,
    vocabulary: HashSet<Token>,
}

impl CountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more training document for `label`.
    pub fn record_document_label(&mut self, label: &str) {
        *self.label_counts.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Adds every token of a document to the `label` frequency table and to
    /// the vocabulary. The label gets a (possibly empty) table even when the
    /// document has no tokens.
    pub fn record_tokens<I, S>(&mut self, tokens: I, label: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = self.feature_counts.entry(label.to_string()).or_default();

        for token in tokens {
            let token = token.as_ref();
            match table.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    table.insert(token.to_string(), 1);
                }
            }
            if !self.vocabulary.contains(token) {
                self.vocabulary.insert(token.to_string());
            }
        }
    }

    /// Adds `constant` to the count of every vocabulary token under every
    /// label, inserting zero-based entries for tokens the label never saw.
    ///
    /// Applying this twice smooths twice; callers own the ordering.
    pub fn smooth(&mut self, constant: u64) {
        for table in self.feature_counts.values_mut() {
            for token in &self.vocabulary {
                *table.entry(token.clone()).or_insert(0) += constant;
            }
        }
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: CountStore) {
        for (label, count) in other.label_counts {
            *self.label_counts.entry(label).or_insert(0) += count;
        }

        for (label, table) in other.feature_counts {
            let ours = self.feature_counts.entry(label).or_default();
            for (token, count) in table {
                *ours.entry(token).or_insert(0) += count;
            }
        }

        self.vocabulary.extend(other.vocabulary);
    }

    /// Number of tokens (with repetition) counted under `label`.
    pub fn total_tokens(&self, label: &str) -> u64 {
        self.feature_counts
            .get(label)
            .map_or(0, |table| table.values().sum())
    }

    pub fn is_empty(&self) -> bool {
        self.label_counts.is_empty() && self.feature_counts.is_empty()
    }

    pub fn label_counts(&self) -> &HashMap<Label, u64> {
        &self.label_counts
    }

    pub fn feature_counts(&self) -> &HashMap<Label, HashMap<Token, u64>> {
        &self.feature_counts
    }

    pub fn vocabulary(&self) -> &HashSet<Token> {
        &self.vocabulary
    }
}
