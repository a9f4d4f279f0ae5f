use log::{debug, info};
use std::collections::HashMap;

use crate::counts::{tokenize, CountStore, Label, Token};
use crate::error::{BayesError, Result};

/// Training lifecycle of a [`NaiveBayesClassifier`].
///
/// Each operation only runs from its predecessor state, so a model can't be
/// normalized before it is smoothed or queried before it is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Empty,
    Trained,
    Smoothed,
    Normalized,
}

/// Multinomial Naive Bayes over bag-of-words documents.
///
/// Typical use:
///
/// ```
/// use textbayes::bayes::NaiveBayesClassifier;
///
/// let mut model = NaiveBayesClassifier::new();
/// model.record_document_label("pos")?;
/// model.record_tokens(["good", "great"], "pos")?;
/// model.record_document_label("neg")?;
/// model.record_tokens(["bad", "terrible"], "neg")?;
/// model.finish_training(1)?;
///
/// assert_eq!(model.predict(["good"])?, "pos");
/// # Ok::<(), textbayes::error::BayesError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    state: ModelState,
    counts: CountStore,
    label_probs: HashMap<Label, f64>,
    feature_probs: HashMap<Label, HashMap<Token, f64>>,
    labels_normalized: bool,
    features_normalized: bool,
}

impl Default for NaiveBayesClassifier {
    fn default() -> Self {
        Self {
            state: ModelState::Empty,
            counts: CountStore::new(),
            label_probs: HashMap::new(),
            feature_probs: HashMap::new(),
            labels_normalized: false,
            features_normalized: false,
        }
    }
}

impl NaiveBayesClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from counts accumulated elsewhere, e.g. merged training
    /// partitions.
    pub fn from_counts(counts: CountStore) -> Self {
        let state = if counts.is_empty() {
            ModelState::Empty
        } else {
            ModelState::Trained
        };

        Self {
            state,
            counts,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn record_document_label(&mut self, label: &str) -> Result<()> {
        self.require_training("record a document label")?;
        self.counts.record_document_label(label);
        self.state = ModelState::Trained;
        Ok(())
    }

    pub fn record_tokens<I, S>(&mut self, tokens: I, label: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require_training("record tokens")?;
        self.counts.record_tokens(tokens, label);
        self.state = ModelState::Trained;
        Ok(())
    }

    /// Additive smoothing with `constant` over the whole vocabulary.
    pub fn smooth(&mut self, constant: u64) -> Result<()> {
        self.require(ModelState::Trained, "smooth", "Trained")?;
        if constant == 0 {
            return Err(BayesError::InvalidSmoothing(constant));
        }

        self.counts.smooth(constant);
        self.state = ModelState::Smoothed;

        info!(
            "Smoothed {} labels over {} vocabulary tokens (k = {})",
            self.counts.feature_counts().len(),
            self.counts.vocabulary().len(),
            constant
        );
        Ok(())
    }

    /// Derives log priors `ln(count / total)` from the document counts.
    pub fn normalize_label_probabilities(&mut self) -> Result<()> {
        self.require(ModelState::Smoothed, "normalize label probabilities", "Smoothed")?;

        let total = self.counts.label_counts().values().sum::<u64>() as f64;
        self.label_probs = self
            .counts
            .label_counts()
            .iter()
            .map(|(label, &count)| (label.clone(), (count as f64 / total).ln()))
            .collect();
        self.labels_normalized = true;

        self.mark_normalized();
        Ok(())
    }

    /// Derives per-label token log likelihoods from the smoothed counts.
    pub fn normalize_feature_probabilities(&mut self) -> Result<()> {
        self.require(
            ModelState::Smoothed,
            "normalize feature probabilities",
            "Smoothed",
        )?;

        let mut feature_probs = HashMap::with_capacity(self.counts.feature_counts().len());
        for (label, table) in self.counts.feature_counts() {
            let total = table.values().sum::<u64>() as f64;
            let probs = table
                .iter()
                .map(|(token, &count)| (token.clone(), (count as f64 / total).ln()))
                .collect();

            debug!("Label {} has {} tokens after smoothing", label, total);
            feature_probs.insert(label.clone(), probs);
        }
        self.feature_probs = feature_probs;
        self.features_normalized = true;

        self.mark_normalized();
        Ok(())
    }

    pub fn normalize(&mut self) -> Result<()> {
        self.normalize_label_probabilities()?;
        self.normalize_feature_probabilities()
    }

    /// Smooths with `constant` then normalizes both probability tables.
    pub fn finish_training(&mut self, constant: u64) -> Result<()> {
        self.smooth(constant)?;
        self.normalize()?;

        info!(
            "Model ready: {} labels, {} vocabulary tokens",
            self.label_probs.len(),
            self.counts.vocabulary().len()
        );
        Ok(())
    }

    /// Returns the label with the highest posterior score for `document`.
    ///
    /// Tokens outside the vocabulary are dropped. Repeated tokens count once
    /// per occurrence. Equal scores resolve to the lexicographically smallest
    /// label.
    pub fn predict<I, S>(&self, document: I) -> Result<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.state {
            ModelState::Normalized => {}
            ModelState::Empty => return Err(BayesError::ModelNotTrained),
            found => {
                return Err(BayesError::InvalidState {
                    operation: "predict",
                    expected: "Normalized",
                    found,
                })
            }
        }

        let vocabulary = self.counts.vocabulary();
        let kept: Vec<S> = document
            .into_iter()
            .filter(|token| vocabulary.contains(token.as_ref()))
            .collect();

        let (best_label, _) = self.feature_probs.iter().fold(
            (None::<&str>, f64::NEG_INFINITY),
            |(best_label, best_score), (label, probs)| {
                let prior = self
                    .label_probs
                    .get(label)
                    .copied()
                    .unwrap_or(f64::NEG_INFINITY);
                let score = kept.iter().fold(prior, |acc, token| {
                    acc + probs
                        .get(token.as_ref())
                        .copied()
                        .unwrap_or(f64::NEG_INFINITY)
                });

                let better = match best_label {
                    None => true,
                    Some(best) => {
                        score > best_score || (score == best_score && label.as_str() < best)
                    }
                };

                if better {
                    (Some(label.as_str()), score)
                } else {
                    (best_label, best_score)
                }
            },
        );

        best_label.ok_or(BayesError::ModelNotTrained)
    }

    /// Tokenizes `text` on whitespace and predicts it.
    pub fn predict_text(&self, text: &str) -> Result<&str> {
        self.predict(tokenize(text))
    }

    pub fn counts(&self) -> &CountStore {
        &self.counts
    }

    pub fn label_probabilities(&self) -> &HashMap<Label, f64> {
        &self.label_probs
    }

    pub fn feature_probabilities(&self) -> &HashMap<Label, HashMap<Token, f64>> {
        &self.feature_probs
    }

    fn require(
        &self,
        wanted: ModelState,
        operation: &'static str,
        expected: &'static str,
    ) -> Result<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(BayesError::InvalidState {
                operation,
                expected,
                found: self.state,
            })
        }
    }

    fn require_training(&self, operation: &'static str) -> Result<()> {
        match self.state {
            ModelState::Empty | ModelState::Trained => Ok(()),
            found => Err(BayesError::InvalidState {
                operation,
                expected: "Empty or Trained",
                found,
            }),
        }
    }

    fn mark_normalized(&mut self) {
        if self.labels_normalized && self.features_normalized {
            self.state = ModelState::Normalized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn trained(docs: &[(&str, &str)]) -> NaiveBayesClassifier {
        let mut model = NaiveBayesClassifier::new();
        for (label, text) in docs {
            model.record_document_label(label).unwrap();
            model.record_tokens(tokenize(text), label).unwrap();
        }
        model
    }

    fn pos_neg() -> NaiveBayesClassifier {
        let mut model = trained(&[("pos", "good great"), ("neg", "bad terrible")]);
        model.finish_training(1).unwrap();
        model
    }

    #[test]
    fn state_advances_through_lifecycle() {
        let mut model = NaiveBayesClassifier::new();
        assert_eq!(model.state(), ModelState::Empty);

        model.record_document_label("a").unwrap();
        model.record_tokens(["x"], "a").unwrap();
        assert_eq!(model.state(), ModelState::Trained);

        model.smooth(1).unwrap();
        assert_eq!(model.state(), ModelState::Smoothed);

        model.normalize_label_probabilities().unwrap();
        assert_eq!(model.state(), ModelState::Smoothed);
        model.normalize_feature_probabilities().unwrap();
        assert_eq!(model.state(), ModelState::Normalized);
    }

    #[test]
    fn normalizing_before_smoothing_is_rejected() {
        let mut model = trained(&[("a", "x y")]);
        let err = model.normalize_feature_probabilities().unwrap_err();
        assert_eq!(
            err,
            BayesError::InvalidState {
                operation: "normalize feature probabilities",
                expected: "Smoothed",
                found: ModelState::Trained,
            }
        );
    }

    #[test]
    fn double_smoothing_is_rejected() {
        let mut model = trained(&[("a", "x y")]);
        model.smooth(1).unwrap();
        assert!(matches!(
            model.smooth(1),
            Err(BayesError::InvalidState { .. })
        ));
        assert_eq!(model.counts().feature_counts()["a"]["x"], 2);
    }

    #[test]
    fn zero_smoothing_is_rejected() {
        let mut model = trained(&[("a", "x")]);
        assert_eq!(model.smooth(0), Err(BayesError::InvalidSmoothing(0)));
        assert_eq!(model.state(), ModelState::Trained);
    }

    #[test]
    fn training_after_smoothing_is_rejected() {
        let mut model = trained(&[("a", "x")]);
        model.smooth(1).unwrap();
        assert!(model.record_document_label("b").is_err());
        assert!(model.record_tokens(["y"], "b").is_err());
    }

    #[test]
    fn predicting_untrained_model_fails() {
        let model = NaiveBayesClassifier::new();
        assert_eq!(model.predict_text("anything"), Err(BayesError::ModelNotTrained));
    }

    #[test]
    fn predicting_unnormalized_model_fails() {
        let mut model = trained(&[("a", "x")]);
        model.smooth(1).unwrap();
        assert!(matches!(
            model.predict_text("x"),
            Err(BayesError::InvalidState {
                found: ModelState::Smoothed,
                ..
            })
        ));
    }

    #[test]
    fn probabilities_sum_to_one() {
        let mut model = trained(&[
            ("sport", "ball goal goal team"),
            ("sport", "team win"),
            ("tech", "code rust compile"),
            ("food", "bread"),
        ]);
        model.finish_training(2).unwrap();

        let prior_sum: f64 = model.label_probabilities().values().map(|p| p.exp()).sum();
        assert!((prior_sum - 1.0).abs() < TOLERANCE);

        for probs in model.feature_probabilities().values() {
            let sum: f64 = probs.values().map(|p| p.exp()).sum();
            assert!((sum - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn label_priors_follow_document_counts() {
        let mut model = trained(&[("a", "x"), ("a", "y"), ("a", "z"), ("b", "x")]);
        model.finish_training(1).unwrap();

        assert!((model.label_probabilities()["a"] - 0.75f64.ln()).abs() < TOLERANCE);
        assert!((model.label_probabilities()["b"] - 0.25f64.ln()).abs() < TOLERANCE);
    }

    #[test]
    fn feature_probabilities_use_smoothed_counts() {
        let model = pos_neg();
        // pos: good=2 great=2 bad=1 terrible=1
        let pos = &model.feature_probabilities()["pos"];
        assert!((pos["good"] - (2.0f64 / 6.0).ln()).abs() < TOLERANCE);
        assert!((pos["bad"] - (1.0f64 / 6.0).ln()).abs() < TOLERANCE);
    }

    #[test]
    fn predicts_matching_class() {
        let model = pos_neg();
        assert_eq!(model.predict_text("good").unwrap(), "pos");
        assert_eq!(model.predict_text("terrible bad").unwrap(), "neg");
    }

    #[test]
    fn tie_goes_to_smallest_label() {
        let model = pos_neg();
        assert_eq!(model.predict_text("unseenword").unwrap(), "neg");
        assert_eq!(model.predict_text("").unwrap(), "neg");
    }

    #[test]
    fn unknown_tokens_fall_back_to_prior() {
        let mut model = trained(&[("rare", "x"), ("zcommon", "y"), ("zcommon", "z")]);
        model.finish_training(1).unwrap();
        assert_eq!(model.predict_text("never seen before").unwrap(), "zcommon");
    }

    #[test]
    fn unknown_tokens_do_not_change_the_winner() {
        let model = pos_neg();
        assert_eq!(model.predict_text("good mystery words").unwrap(), "pos");
    }

    #[test]
    fn repeated_tokens_weigh_per_occurrence() {
        let mut model = trained(&[("a", "x x x y"), ("b", "y y y x")]);
        model.finish_training(1).unwrap();

        assert_eq!(model.predict_text("x y x").unwrap(), "a");
        assert_eq!(model.predict_text("y x y").unwrap(), "b");
    }

    #[test]
    fn prediction_is_deterministic() {
        let docs = [
            ("a", "alpha beta gamma"),
            ("b", "beta delta"),
            ("c", "gamma epsilon"),
        ];
        let mut first = trained(&docs);
        first.finish_training(1).unwrap();
        let mut second = trained(&docs);
        second.finish_training(1).unwrap();

        for text in ["beta", "gamma beta", "delta epsilon", "nothing"] {
            assert_eq!(
                first.predict_text(text).unwrap(),
                second.predict_text(text).unwrap()
            );
        }
    }

    #[test]
    fn from_counts_resumes_in_trained_state() {
        let mut counts = CountStore::new();
        counts.record_document_label("a");
        counts.record_tokens(["x"], "a");

        let mut model = NaiveBayesClassifier::from_counts(counts);
        assert_eq!(model.state(), ModelState::Trained);
        model.finish_training(1).unwrap();
        assert_eq!(model.predict_text("x").unwrap(), "a");

        let empty = NaiveBayesClassifier::from_counts(CountStore::new());
        assert_eq!(empty.state(), ModelState::Empty);
    }
}
