//! Final mission score.
use crate::constants::{SCORE_DIVISOR, SCORE_RESOURCE_WEIGHT};
use crate::metrics::MetricSet;

/// Score a completed mission from its ending metrics and leftover resources.
///
/// `floor((sum of metric values + resources * 2) / 10)`
#[must_use]
pub fn compute_score(metrics: &MetricSet, resources: i32) -> i32 {
    let raw = metrics
        .total_value()
        .saturating_add(resources.saturating_mul(SCORE_RESOURCE_WEIGHT));
    raw.div_euclid(SCORE_DIVISOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricKind;

    #[test]
    fn score_uses_metric_sum_and_double_resources() {
        let metrics = MetricSet::default()
            .with_metric(MetricKind::ChildHealth, 80, 80)
            .with_metric(MetricKind::MaternalHealth, 85, 85)
            .with_metric(MetricKind::Nutrition, 75, 75)
            .with_metric(MetricKind::DiseaseControl, 70, 70);
        // (310 + 47 * 2) / 10 = 40.4
        assert_eq!(compute_score(&metrics, 47), 40);
        assert_eq!(compute_score(&metrics, 0), 31);
    }

    #[test]
    fn score_is_monotone_in_resources_and_metrics() {
        let base = MetricSet::default();
        let mut last = compute_score(&base, 0);
        for resources in 1..200 {
            let score = compute_score(&base, resources);
            assert!(score >= last);
            last = score;
        }

        let mut metrics = base;
        let mut last = compute_score(&metrics, 50);
        for _ in 0..60 {
            metrics.apply_delta(MetricKind::Nutrition, 1);
            let score = compute_score(&metrics, 50);
            assert!(score >= last);
            last = score;
        }
    }
}
