/// Online Logistic Regression
///
/// Small batch-gradient-descent learner, trained fresh every ranking pass.
/// Weights are never persisted or warm-started.
///
/// Per epoch:
///   p_j      = sigmoid(clamp(w · x_j, -20, 20))
///   g_i      = Σ_j (p_j - y_j) * x_j[i]
///   w_i     -= lr * (g_i / n + l2 * w_i)     (no L2 on the bias, i = 0)
use super::{ModelError, Result};
use tracing::debug;

/// Logit clamp keeping predictions strictly inside (0, 1)
const LOGIT_CLAMP: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LearnerConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 160,
            l2: 0.002,
        }
    }
}

/// Labeled feature vector
#[derive(Debug, Clone)]
pub struct Sample {
    pub item_id: String,
    pub label: f64,
    pub features: Vec<f64>,
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// One weight per feature, bias at index 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogisticModel {
    weights: Vec<f64>,
}

impl LogisticModel {
    pub fn zeros(feature_len: usize) -> Self {
        Self {
            weights: vec![0.0; feature_len],
        }
    }

    pub fn from_weights(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// A model without weights cannot score anything
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Train from scratch; no samples or zero length yields a zero model
    pub fn train(samples: &[Sample], feature_len: usize, config: &LearnerConfig) -> Self {
        let mut model = Self::zeros(feature_len);
        if samples.is_empty() || feature_len == 0 {
            return model;
        }

        let n = samples.len() as f64;
        for _ in 0..config.epochs {
            let mut gradient = vec![0.0; feature_len];
            for sample in samples {
                let error = model.predict(&sample.features) - sample.label;
                for (g, x) in gradient.iter_mut().zip(&sample.features) {
                    *g += error * x;
                }
            }
            for (i, (w, g)) in model.weights.iter_mut().zip(&gradient).enumerate() {
                let reg = if i == 0 { 0.0 } else { config.l2 * *w };
                *w -= config.learning_rate * (g / n + reg);
            }
        }

        debug!(
            samples = samples.len(),
            feature_len = feature_len,
            epochs = config.epochs,
            "Logistic model trained"
        );

        model
    }

    /// Probability in (0, 1); dot product over the common prefix
    pub fn predict(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        let z = if z.is_finite() { z } else { 0.0 };
        sigmoid(z.clamp(-LOGIT_CLAMP, LOGIT_CLAMP))
    }

    /// Strict variant rejecting vectors of the wrong length
    pub fn try_predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        Ok(self.predict(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, label: f64, features: Vec<f64>) -> Sample {
        Sample {
            item_id: id.to_string(),
            label,
            features,
        }
    }

    #[test]
    fn test_zero_samples_gives_zero_model() {
        let model = LogisticModel::train(&[], 8, &LearnerConfig::default());
        assert_eq!(model.weights(), &[0.0; 8]);
        assert!((model.predict(&[1.0; 8]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_feature_len() {
        let samples = vec![sample("a", 1.0, vec![1.0])];
        let model = LogisticModel::train(&samples, 0, &LearnerConfig::default());
        assert!(model.is_empty());
    }

    #[test]
    fn test_learns_separable_signal() {
        let samples = vec![
            sample("a", 1.0, vec![1.0, 1.0]),
            sample("b", 1.0, vec![1.0, 1.0]),
            sample("c", 0.0, vec![1.0, 0.0]),
            sample("d", 0.0, vec![1.0, 0.0]),
        ];
        let model = LogisticModel::train(&samples, 2, &LearnerConfig::default());

        let pos = model.predict(&[1.0, 1.0]);
        let neg = model.predict(&[1.0, 0.0]);
        assert!(pos > 0.5, "positive probability {pos}");
        assert!(neg < 0.5, "negative probability {neg}");
        assert!(model.weights()[1] > 0.0);
    }

    #[test]
    fn test_bias_only_tracks_base_rate() {
        // Three positives, one negative: bias drifts positive
        let samples = vec![
            sample("a", 1.0, vec![1.0]),
            sample("b", 1.0, vec![1.0]),
            sample("c", 1.0, vec![1.0]),
            sample("d", 0.0, vec![1.0]),
        ];
        let model = LogisticModel::train(&samples, 1, &LearnerConfig::default());
        let p = model.predict(&[1.0]);
        assert!(p > 0.5 && p < 0.75 + 1e-9);
    }

    #[test]
    fn test_probability_strictly_inside_unit_interval() {
        let model = LogisticModel::from_weights(vec![1e6, -1e6]);
        let high = model.predict(&[1.0, 0.0]);
        let low = model.predict(&[0.0, 1.0]);
        assert!(high < 1.0 && high > 0.99);
        assert!(low > 0.0 && low < 0.01);
        assert!((model.predict(&[f64::INFINITY, f64::INFINITY]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_try_predict_dimension_mismatch() {
        let model = LogisticModel::zeros(3);
        assert!(matches!(
            model.try_predict(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
        assert!(model.try_predict(&[1.0, 2.0, 3.0]).is_ok());
    }

    #[test]
    fn test_training_is_deterministic() {
        let samples = vec![
            sample("a", 1.0, vec![1.0, 0.3, 0.9]),
            sample("b", 0.0, vec![1.0, 0.8, 0.1]),
        ];
        let config = LearnerConfig::default();
        assert_eq!(
            LogisticModel::train(&samples, 3, &config),
            LogisticModel::train(&samples, 3, &config)
        );
    }
}
