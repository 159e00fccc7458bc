use crate::services::evaluation::EvaluatorConfig;
use crate::services::ranking::{BlendWeights, LearnerConfig};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "FEED_RANKING_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Tunables for one ranking engine instance
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    /// Stage-1 cut; None keeps the whole pool
    #[serde(default)]
    pub max_candidates: Option<usize>,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_l2")]
    pub l2: f64,
    #[serde(default = "default_hybrid_blend")]
    pub hybrid_blend: f64,
    #[serde(default = "default_learned_blend")]
    pub learned_blend: f64,
    #[serde(default = "default_eval_top_k")]
    pub eval_top_k: usize,
    #[serde(default = "default_min_eval_rows")]
    pub min_eval_rows: usize,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_epochs() -> usize {
    160
}

fn default_l2() -> f64 {
    0.002
}

fn default_hybrid_blend() -> f64 {
    0.85
}

fn default_learned_blend() -> f64 {
    0.15
}

fn default_eval_top_k() -> usize {
    5
}

fn default_min_eval_rows() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_candidates: None,
            learning_rate: default_learning_rate(),
            epochs: default_epochs(),
            l2: default_l2(),
            hybrid_blend: default_hybrid_blend(),
            learned_blend: default_learned_blend(),
            eval_top_k: default_eval_top_k(),
            min_eval_rows: default_min_eval_rows(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load `FEED_RANKING_*` variables (after `.env`), falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config: Config = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.epochs == 0 {
            return Err(ConfigError::Invalid("epochs must be at least 1".to_string()));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "l2 must be non-negative, got {}",
                self.l2
            )));
        }
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.hybrid_blend) || !in_unit(self.learned_blend) {
            return Err(ConfigError::Invalid(
                "blend weights must lie in [0, 1]".to_string(),
            ));
        }
        if ((self.hybrid_blend + self.learned_blend) - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "blend weights must sum to 1, got {}",
                self.hybrid_blend + self.learned_blend
            )));
        }
        if self.eval_top_k == 0 {
            return Err(ConfigError::Invalid("eval_top_k must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn learner(&self) -> LearnerConfig {
        LearnerConfig {
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            l2: self.l2,
        }
    }

    pub fn blend(&self) -> BlendWeights {
        BlendWeights {
            hybrid: self.hybrid_blend,
            learned: self.learned_blend,
        }
    }

    pub fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            top_k: self.eval_top_k,
            min_rows: self.min_eval_rows,
        }
    }
}
