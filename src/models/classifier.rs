//! Pre-trained classifiers over vectorized review text

use crate::vectorizer::FeatureVector;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// A pre-trained model mapping features to a discrete label.
pub trait Classifier: Send + Sync {
    /// Predict a single label for one feature vector.
    fn predict(&self, features: &FeatureVector) -> Result<String>;

    /// Probability distribution over [`Classifier::classes`], in the same order.
    ///
    /// Models without probability estimates keep the default, which fails.
    fn predict_proba(&self, _features: &FeatureVector) -> Result<Vec<f64>> {
        bail!("{} does not support probability estimates", self.name())
    }

    /// Label space in model order
    fn classes(&self) -> &[String];

    /// Short name for logging
    fn name(&self) -> &str;
}

/// How multi-row linear scores become probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all rows
    #[default]
    Multinomial,
    /// Independent sigmoid per row, renormalized
    Ovr,
}

/// Weights of a fitted linear model.
///
/// A binary model stores a single row whose positive side is `classes[1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

impl LinearModel {
    fn is_binary(&self) -> bool {
        self.classes.len() == 2 && self.coef.len() == 1
    }

    /// Raw decision scores, one per coefficient row.
    fn decision_function(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if self.coef.len() != self.intercept.len() {
            bail!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            );
        }
        if !self.is_binary() && self.coef.len() != self.classes.len() {
            bail!(
                "{} coefficient rows for {} classes",
                self.coef.len(),
                self.classes.len()
            );
        }
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| Ok(features.dot(row)? + b))
            .collect()
    }

    fn predict_index(&self, features: &FeatureVector) -> Result<usize> {
        let scores = self.decision_function(features)?;
        if self.is_binary() {
            return Ok(usize::from(scores[0] > 0.0));
        }
        argmax(&scores).context("model has no classes")
    }

    fn probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let scores = self.decision_function(features)?;
        if self.is_binary() {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }
        match self.multi_class {
            MultiClass::Multinomial => Ok(softmax(&scores)),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
                let total: f64 = raw.iter().sum();
                if total <= 0.0 {
                    bail!("degenerate one-vs-rest scores");
                }
                Ok(raw.into_iter().map(|p| p / total).collect())
            }
        }
    }
}

/// Linear classifier: logistic regression (with probabilities) or a linear SVM (without).
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    model: LinearModel,
    probabilistic: bool,
    name: &'static str,
}

impl LinearClassifier {
    pub fn logistic_regression(model: LinearModel) -> Self {
        Self {
            model,
            probabilistic: true,
            name: "logistic_regression",
        }
    }

    pub fn linear_svc(model: LinearModel) -> Self {
        Self {
            model,
            probabilistic: false,
            name: "linear_svc",
        }
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let idx = self.model.predict_index(features)?;
        label_at(&self.model.classes, idx)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if !self.probabilistic {
            bail!("{} does not support probability estimates", self.name);
        }
        self.model.probabilities(features)
    }

    fn classes(&self) -> &[String] {
        &self.model.classes
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Fitted multinomial naive Bayes, stored in log space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesClassifier {
    pub classes: Vec<String>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
}

impl NaiveBayesClassifier {
    /// Joint log likelihood per class
    fn joint_log_likelihood(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            bail!(
                "naive bayes tables do not match {} classes",
                self.classes.len()
            );
        }
        self.feature_log_prob
            .iter()
            .zip(&self.class_log_prior)
            .map(|(row, prior)| Ok(features.dot(row)? + prior))
            .collect()
    }
}

impl Classifier for NaiveBayesClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let jll = self.joint_log_likelihood(features)?;
        let idx = argmax(&jll).context("model has no classes")?;
        label_at(&self.classes, idx)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        Ok(softmax(&self.joint_log_likelihood(features)?))
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn name(&self) -> &str {
        "multinomial_nb"
    }
}

fn label_at(classes: &[String], idx: usize) -> Result<String> {
    classes
        .get(idx)
        .cloned()
        .with_context(|| format!("predicted class index {} has no label", idx))
}

/// Index of the first maximum.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn binary_model() -> LinearModel {
        LinearModel {
            classes: labels(&["negative", "positive"]),
            coef: vec![vec![2.0, -3.0]],
            intercept: vec![0.0],
            multi_class: MultiClass::default(),
        }
    }

    #[test]
    fn test_binary_logistic_regression() {
        let clf = LinearClassifier::logistic_regression(binary_model());

        let positive = FeatureVector::from_dense(&[1.0, 0.0]);
        assert_eq!(clf.predict(&positive).unwrap(), "positive");

        let proba = clf.predict_proba(&positive).unwrap();
        assert!((proba[1] - sigmoid(2.0)).abs() < 1e-12);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let negative = FeatureVector::from_dense(&[0.0, 1.0]);
        assert_eq!(clf.predict(&negative).unwrap(), "negative");
    }

    #[test]
    fn test_multinomial_three_classes() {
        let model = LinearModel {
            classes: labels(&["negative", "neutral", "positive"]),
            coef: vec![vec![-1.0], vec![0.0], vec![1.0]],
            intercept: vec![0.0, 0.5, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        let clf = LinearClassifier::logistic_regression(model);

        let features = FeatureVector::from_dense(&[0.1]);
        assert_eq!(clf.predict(&features).unwrap(), "neutral");

        let proba = clf.predict_proba(&features).unwrap();
        assert_eq!(proba.len(), 3);
        assert_eq!(argmax(&proba), Some(1));
    }

    #[test]
    fn test_linear_svc_has_no_probabilities() {
        let clf = LinearClassifier::linear_svc(binary_model());
        let features = FeatureVector::from_dense(&[1.0, 0.0]);

        assert_eq!(clf.predict(&features).unwrap(), "positive");
        let err = clf.predict_proba(&features).unwrap_err();
        assert!(err.to_string().contains("probability"));
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let clf = LinearClassifier::logistic_regression(binary_model());
        let features = FeatureVector::from_dense(&[1.0, 0.0, 1.0]);
        assert!(clf.predict(&features).is_err());
    }

    #[test]
    fn test_naive_bayes() {
        let clf = NaiveBayesClassifier {
            classes: labels(&["negative", "positive"]),
            class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: vec![
                vec![0.8f64.ln(), 0.2f64.ln()],
                vec![0.2f64.ln(), 0.8f64.ln()],
            ],
        };
        let features = FeatureVector::from_dense(&[0.0, 2.0]);

        assert_eq!(clf.predict(&features).unwrap(), "positive");
        let proba = clf.predict_proba(&features).unwrap();
        // 0.8^2 / (0.8^2 + 0.2^2)
        assert!((proba[1] - 0.64 / 0.68).abs() < 1e-9);
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&[0.2, 0.7, 0.7]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
