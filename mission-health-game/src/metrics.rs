//! Tracked health metrics and the impact maps that move them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::{METRIC_MAX, METRIC_MIN};

/// One of the four health indicators tracked during a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKind {
    ChildHealth,
    MaternalHealth,
    Nutrition,
    DiseaseControl,
}

impl MetricKind {
    pub const ALL: [Self; 4] = [
        Self::ChildHealth,
        Self::MaternalHealth,
        Self::Nutrition,
        Self::DiseaseControl,
    ];

    /// Stable key used in catalogs and persisted snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChildHealth => "childHealth",
            Self::MaternalHealth => "maternalHealth",
            Self::Nutrition => "nutrition",
            Self::DiseaseControl => "diseaseControl",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChildHealth => "Child Health",
            Self::MaternalHealth => "Maternal Health",
            Self::Nutrition => "Nutrition",
            Self::DiseaseControl => "Disease Control",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::ChildHealth => 0,
            Self::MaternalHealth => 1,
            Self::Nutrition => 2,
            Self::DiseaseControl => 3,
        }
    }

    const fn default_start(self) -> (i32, i32) {
        match self {
            Self::ChildHealth => (50, 80),
            Self::MaternalHealth => (45, 85),
            Self::Nutrition => (40, 75),
            Self::DiseaseControl => (35, 70),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MetricKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "childHealth" => Ok(Self::ChildHealth),
            "maternalHealth" => Ok(Self::MaternalHealth),
            "nutrition" => Ok(Self::Nutrition),
            "diseaseControl" => Ok(Self::DiseaseControl),
            _ => Err(()),
        }
    }
}

/// Signed per-metric deltas carried by challenges and interventions.
pub type Impact = BTreeMap<MetricKind, i32>;

/// Clamp a raw metric value into the playable range.
#[must_use]
pub fn clamp_metric(value: i32) -> i32 {
    value.clamp(METRIC_MIN, METRIC_MAX)
}

/// A single metric with its current value and mission target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub kind: MetricKind,
    pub value: i32,
    pub target: i32,
}

impl Metric {
    #[must_use]
    pub const fn target_met(&self) -> bool {
        self.value >= self.target
    }

    /// Shortfall against the target, zero once met.
    #[must_use]
    pub const fn gap(&self) -> i32 {
        if self.value >= self.target {
            0
        } else {
            self.target - self.value
        }
    }
}

/// The full set of four tracked metrics, indexed by [`MetricKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    metrics: [Metric; 4],
}

impl Default for MetricSet {
    fn default() -> Self {
        Self {
            metrics: MetricKind::ALL.map(|kind| {
                let (value, target) = kind.default_start();
                Metric {
                    kind,
                    value,
                    target,
                }
            }),
        }
    }
}

impl MetricSet {
    /// Replace one metric's value and target, clamping both.
    #[must_use]
    pub fn with_metric(mut self, kind: MetricKind, value: i32, target: i32) -> Self {
        let metric = &mut self.metrics[kind.index()];
        metric.value = clamp_metric(value);
        metric.target = clamp_metric(target);
        self
    }

    #[must_use]
    pub const fn get(&self, kind: MetricKind) -> &Metric {
        &self.metrics[kind.index()]
    }

    #[must_use]
    pub const fn value(&self, kind: MetricKind) -> i32 {
        self.metrics[kind.index()].value
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Add `delta` to one metric and clamp the result into range.
    pub fn apply_delta(&mut self, kind: MetricKind, delta: i32) {
        let metric = &mut self.metrics[kind.index()];
        metric.value = clamp_metric(metric.value.saturating_add(delta));
    }

    pub fn apply_impact(&mut self, impact: &Impact) {
        for (&kind, &delta) in impact {
            self.apply_delta(kind, delta);
        }
    }

    #[must_use]
    pub fn all_targets_met(&self) -> bool {
        self.metrics.iter().all(Metric::target_met)
    }

    #[must_use]
    pub fn total_value(&self) -> i32 {
        self.metrics.iter().map(|m| m.value).sum()
    }

    /// Summed shortfall across every metric.
    #[must_use]
    pub fn total_gap(&self) -> i32 {
        self.metrics.iter().map(Metric::gap).sum()
    }
}
