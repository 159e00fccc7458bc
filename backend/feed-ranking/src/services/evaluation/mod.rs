// ============================================
// Held-out Evaluation
// ============================================
//
// Compares three scoring schemes on the test split:
// - keyword: Stage-1 score
// - learned: model without the keyword feature
// - hybrid:  model with the keyword feature
//
// Metrics: pairwise AUC and like-rate@K, plus the relative like-rate
// improvement of hybrid over keyword. Output is for telemetry only and
// never feeds back into the ordering of the same pass.

use crate::services::ranking::{ModelVariant, TrainedModels};
use crate::services::training::{TrainTestSplit, TrainingRow};
use crate::utils::desc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Upper bound on K for like-rate@K
    pub top_k: usize,
    /// Fewer labeled rows than this skips evaluation
    pub min_rows: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_rows: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub k: usize,
    pub keyword_like_rate: Option<f64>,
    pub learned_like_rate: Option<f64>,
    pub hybrid_like_rate: Option<f64>,
    pub keyword_auc: Option<f64>,
    pub learned_auc: Option<f64>,
    pub hybrid_auc: Option<f64>,
    pub improvement_pct: Option<f64>,
}

impl EvaluationReport {
    /// Bit-exact identity of the seven metrics
    pub fn signature(&self) -> [Option<u64>; 7] {
        [
            self.keyword_like_rate,
            self.learned_like_rate,
            self.hybrid_like_rate,
            self.keyword_auc,
            self.learned_auc,
            self.hybrid_auc,
            self.improvement_pct,
        ]
        .map(|v| v.map(f64::to_bits))
    }

    pub fn log(&self) {
        let pct = |v: Option<f64>| format!("{:.1}%", v.unwrap_or(0.0) * 100.0);
        let auc = |v: Option<f64>| format!("{:.3}", v.unwrap_or(0.0));
        let improvement = self
            .improvement_pct
            .map(|v| format!("{v:.1}%"))
            .unwrap_or_else(|| "n/a".to_string());

        info!(
            k = self.k,
            keyword_like_rate = %pct(self.keyword_like_rate),
            learned_like_rate = %pct(self.learned_like_rate),
            hybrid_like_rate = %pct(self.hybrid_like_rate),
            keyword_auc = %auc(self.keyword_auc),
            learned_auc = %auc(self.learned_auc),
            hybrid_auc = %auc(self.hybrid_auc),
            improvement = %improvement,
            "Recommender evaluation"
        );
    }
}

/// Caller-owned memory of the last logged report
#[derive(Debug, Default)]
pub struct EvaluationJournal {
    last_signature: Option<[Option<u64>; 7]>,
}

impl EvaluationJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `report` unless it matches the previous one; returns whether it was logged
    pub fn record(&mut self, report: Option<&EvaluationReport>) -> bool {
        let Some(report) = report else {
            return false;
        };
        let signature = report.signature();
        if self.last_signature == Some(signature) {
            return false;
        }
        self.last_signature = Some(signature);
        report.log();
        true
    }
}

/// Pairwise AUC; ties count half. None without both classes
pub fn compute_auc(rows: &[TrainingRow], scores: &HashMap<String, f64>) -> Option<f64> {
    let score = |row: &TrainingRow| scores.get(&row.item_id).copied().unwrap_or(0.0);
    let positives: Vec<f64> = rows.iter().filter(|r| r.is_positive()).map(score).collect();
    let negatives: Vec<f64> = rows.iter().filter(|r| !r.is_positive()).map(score).collect();
    if positives.is_empty() || negatives.is_empty() {
        return None;
    }

    let mut wins = 0.0;
    for p in &positives {
        for n in &negatives {
            if p > n {
                wins += 1.0;
            } else if p == n {
                wins += 0.5;
            }
        }
    }
    let pairs = (positives.len() * negatives.len()) as f64;
    Some(wins / pairs)
}

/// Fraction of liked rows among the first `k` ordered ids that are test rows
pub fn like_rate_at_k(rows: &[TrainingRow], ordered_ids: &[String], k: usize) -> Option<f64> {
    if rows.is_empty() || ordered_ids.is_empty() {
        return None;
    }
    let labels: HashMap<&str, bool> = rows
        .iter()
        .map(|r| (r.item_id.as_str(), r.is_positive()))
        .collect();

    let top: Vec<bool> = ordered_ids
        .iter()
        .take(k.max(1))
        .filter_map(|id| labels.get(id.as_str()).copied())
        .collect();
    if top.is_empty() {
        return None;
    }
    let likes = top.iter().filter(|liked| **liked).count();
    Some(likes as f64 / top.len() as f64)
}

/// Row ids ordered by score descending; ties keep row order
pub fn order_by_score(rows: &[TrainingRow], scores: &HashMap<String, f64>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids: Vec<(&str, f64)> = rows
        .iter()
        .filter(|r| seen.insert(r.item_id.as_str()))
        .map(|r| {
            let s = scores.get(&r.item_id).copied().unwrap_or(0.0);
            (r.item_id.as_str(), s)
        })
        .collect();
    ids.sort_by(|a, b| desc(a.1, b.1));
    ids.into_iter().map(|(id, _)| id.to_string()).collect()
}

pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Report on the test split; None when too few labeled rows exist
    pub fn evaluate(&self, split: &TrainTestSplit, models: &TrainedModels) -> Option<EvaluationReport> {
        if split.total() < self.config.min_rows || split.test.is_empty() {
            return None;
        }
        let test = &split.test;

        let keyword: HashMap<String, f64> = test
            .iter()
            .map(|r| (r.item_id.clone(), r.keyword_score))
            .collect();
        let learned = models.predict_rows(test, ModelVariant::Learned);
        let hybrid = models.predict_rows(test, ModelVariant::Hybrid);

        let k = self.config.top_k.min(test.len());
        let like_rate = |scores: &HashMap<String, f64>| {
            like_rate_at_k(test, &order_by_score(test, scores), k)
        };

        let keyword_like_rate = like_rate(&keyword);
        let learned_like_rate = like_rate(&learned);
        let hybrid_like_rate = like_rate(&hybrid);

        let improvement_pct = match (keyword_like_rate, hybrid_like_rate) {
            (Some(base), Some(h)) if base > 0.0 => Some((h - base) / base * 100.0),
            _ => None,
        };

        Some(EvaluationReport {
            k,
            keyword_like_rate,
            learned_like_rate,
            hybrid_like_rate,
            keyword_auc: compute_auc(test, &keyword),
            learned_auc: compute_auc(test, &learned),
            hybrid_auc: compute_auc(test, &hybrid),
            improvement_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ranking::{FeatureInputs, LearnerConfig, LogisticModel};

    fn row(id: &str, label: u8, keyword_score: f64) -> TrainingRow {
        TrainingRow {
            item_id: id.to_string(),
            label,
            stage1_rank_index: 0,
            keyword_score,
            inputs: FeatureInputs {
                unseen: false,
                followed: false,
                liked: label == 1,
                view_count: 1,
                comment_count: 0,
                similarity: 0.0,
                keyword_score,
                stage1_rank_index: 0,
            },
        }
    }

    fn scores(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_auc_separable() {
        let rows = vec![row("p", 1, 0.0), row("n", 0, 0.0)];
        let auc = compute_auc(&rows, &scores(&[("p", 0.9), ("n", 0.1)]));
        assert_eq!(auc, Some(1.0));
    }

    #[test]
    fn test_auc_ties_and_inversions() {
        let rows = vec![row("p1", 1, 0.0), row("p2", 1, 0.0), row("n", 0, 0.0)];
        let auc = compute_auc(&rows, &scores(&[("p1", 0.5), ("p2", 0.1), ("n", 0.5)]));
        // p1 vs n tie 0.5, p2 vs n loss 0
        assert_eq!(auc, Some(0.25));
    }

    #[test]
    fn test_auc_single_class_is_none() {
        let rows = vec![row("p1", 1, 0.0), row("p2", 1, 0.0)];
        assert_eq!(compute_auc(&rows, &scores(&[])), None);
    }

    #[test]
    fn test_like_rate_single_class_defined() {
        let rows = vec![row("p1", 1, 0.0), row("p2", 1, 0.0)];
        assert_eq!(like_rate_at_k(&rows, &ids(&["p2", "p1"]), 2), Some(1.0));
    }

    #[test]
    fn test_like_rate_top_k() {
        let rows = vec![row("a", 1, 0.0), row("b", 0, 0.0), row("c", 1, 0.0)];
        assert_eq!(like_rate_at_k(&rows, &ids(&["b", "a", "c"]), 2), Some(0.5));
        assert_eq!(like_rate_at_k(&rows, &ids(&["zz"]), 2), None);
        assert_eq!(like_rate_at_k(&rows, &[], 2), None);
    }

    #[test]
    fn test_order_by_score_stable() {
        let rows = vec![row("a", 1, 0.0), row("b", 0, 0.0), row("c", 1, 0.0)];
        let ordered = order_by_score(&rows, &scores(&[("a", 0.2), ("b", 0.7), ("c", 0.2)]));
        assert_eq!(ordered, ids(&["b", "a", "c"]));
    }

    #[test]
    fn test_evaluate_skips_small_sets() {
        let split = TrainTestSplit {
            train: vec![row("a", 1, 0.0), row("b", 0, 0.0)],
            test: vec![row("c", 1, 0.0)],
        };
        let models = TrainedModels::train(&split.train, &LearnerConfig::default());
        assert!(Evaluator::default().evaluate(&split, &models).is_none());
    }

    #[test]
    fn test_evaluate_reports_all_schemes() {
        let split = TrainTestSplit {
            train: vec![row("t1", 1, 300.0), row("t2", 0, 100.0)],
            test: vec![row("p", 1, 200.0), row("n", 0, 250.0)],
        };
        let models = TrainedModels {
            learned: LogisticModel::from_weights(vec![0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0]),
            hybrid: LogisticModel::from_weights(vec![0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        };

        let report = Evaluator::default().evaluate(&split, &models).unwrap();

        assert_eq!(report.k, 2);
        // Keyword score ranks the negative above the positive
        assert_eq!(report.keyword_auc, Some(0.0));
        assert_eq!(report.hybrid_auc, Some(1.0));
        assert_eq!(report.learned_auc, Some(1.0));
        // Both items fit in top-K, so every scheme sees the same rate
        assert_eq!(report.keyword_like_rate, Some(0.5));
        assert_eq!(report.improvement_pct, Some(0.0));
    }

    #[test]
    fn test_improvement_requires_positive_keyword_rate() {
        let split = TrainTestSplit {
            train: vec![row("t1", 1, 0.0), row("t2", 0, 0.0), row("t3", 0, 0.0)],
            test: vec![row("n1", 0, 10.0), row("p", 1, 1.0), row("n2", 0, 5.0)],
        };
        let models = TrainedModels {
            learned: LogisticModel::zeros(8),
            hybrid: LogisticModel::from_weights(vec![0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
        };
        let evaluator = Evaluator::new(EvaluatorConfig {
            top_k: 1,
            min_rows: 4,
        });

        let report = evaluator.evaluate(&split, &models).unwrap();

        assert_eq!(report.k, 1);
        assert_eq!(report.keyword_like_rate, Some(0.0));
        assert_eq!(report.hybrid_like_rate, Some(1.0));
        assert_eq!(report.improvement_pct, None);
    }

    #[test]
    fn test_journal_dedups_identical_reports() {
        let report = EvaluationReport {
            k: 2,
            keyword_like_rate: Some(0.5),
            learned_like_rate: Some(0.5),
            hybrid_like_rate: Some(1.0),
            keyword_auc: None,
            learned_auc: Some(0.75),
            hybrid_auc: Some(1.0),
            improvement_pct: Some(100.0),
        };
        let mut journal = EvaluationJournal::new();

        assert!(journal.record(Some(&report)));
        assert!(!journal.record(Some(&report)));
        assert!(!journal.record(None));

        let changed = EvaluationReport {
            hybrid_auc: Some(0.5),
            ..report
        };
        assert!(journal.record(Some(&changed)));
    }
}
