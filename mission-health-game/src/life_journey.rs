//! Life-journey tracker: a four-stage walk from pregnancy to school age.
use serde::{Deserialize, Serialize};

use crate::districts::{self, District};
use crate::numbers::{percent, round_f64_to_u32};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImpactFigure {
    pub label: &'static str,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JourneyStage {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub impact_title: &'static str,
    pub impact: [ImpactFigure; 3],
}

const fn figure(label: &'static str, value: u32) -> ImpactFigure {
    ImpactFigure { label, value }
}

pub static JOURNEY_STAGES: [JourneyStage; 4] = [
    JourneyStage {
        id: "pregnancy",
        title: "Pregnancy",
        description: "Supporting mothers through regular check-ups and nutrition",
        impact_title: "Maternal Care Impact",
        impact: [
            figure("Mothers Supported", 12_500),
            figure("Antenatal Check-ups", 45_000),
            figure("Nutrition Supplements", 32_000),
        ],
    },
    JourneyStage {
        id: "birth",
        title: "Birth",
        description: "Ensuring safe deliveries and immediate postnatal care",
        impact_title: "Birth Outcomes Impact",
        impact: [
            figure("Safe Deliveries", 9_800),
            figure("Postnatal Check-ups", 18_500),
            figure("Newborn Care Kits", 10_200),
        ],
    },
    JourneyStage {
        id: "early-childhood",
        title: "Early Childhood",
        description: "Monitoring growth and providing essential vaccinations",
        impact_title: "Early Childhood Impact",
        impact: [
            figure("Children Vaccinated", 22_300),
            figure("Growth Monitoring", 35_600),
            figure("Malnutrition Cases Prevented", 4_800),
        ],
    },
    JourneyStage {
        id: "school-age",
        title: "School Age",
        description: "Supporting educational development and continued health",
        impact_title: "School Age Impact",
        impact: [
            figure("School Enrollments", 15_200),
            figure("Health Check-ups", 28_900),
            figure("Educational Support Programs", 7_500),
        ],
    },
];

/// Where the player is on the journey and which stages they have opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyTracker {
    region: Option<String>,
    current: usize,
    unlocked: Vec<String>,
}

impl Default for JourneyTracker {
    fn default() -> Self {
        Self {
            region: None,
            current: 0,
            unlocked: vec![JOURNEY_STAGES[0].id.to_string()],
        }
    }
}

impl JourneyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the district whose figures are being followed.
    pub fn select_region(&mut self, id: &str) -> Option<&'static District> {
        let district = districts::district_by_id(id)?;
        self.region = Some(district.id.to_string());
        Some(district)
    }

    #[must_use]
    pub fn region(&self) -> Option<&'static District> {
        self.region.as_deref().and_then(districts::district_by_id)
    }

    #[must_use]
    pub fn current_stage(&self) -> &'static JourneyStage {
        &JOURNEY_STAGES[self.current]
    }

    #[must_use]
    pub const fn stage_index(&self) -> usize {
        self.current
    }

    /// Move to the next stage, unlocking it. Stays put on the last stage.
    pub fn advance(&mut self) -> &'static JourneyStage {
        if self.current + 1 < JOURNEY_STAGES.len() {
            self.current += 1;
            let id = JOURNEY_STAGES[self.current].id;
            if !self.is_unlocked(id) {
                self.unlocked.push(id.to_string());
            }
        }
        self.current_stage()
    }

    /// Step back one stage. Stays put on the first stage.
    pub fn previous(&mut self) -> &'static JourneyStage {
        self.current = self.current.saturating_sub(1);
        self.current_stage()
    }

    /// Jump straight to an unlocked stage. Locked or unknown ids are refused
    /// and leave the tracker where it was.
    pub fn go_to(&mut self, stage_id: &str) -> Option<&'static JourneyStage> {
        if !self.is_unlocked(stage_id) {
            return None;
        }
        let index = JOURNEY_STAGES.iter().position(|s| s.id == stage_id)?;
        self.current = index;
        Some(self.current_stage())
    }

    #[must_use]
    pub fn is_unlocked(&self, stage_id: &str) -> bool {
        self.unlocked.iter().any(|id| id == stage_id)
    }

    #[must_use]
    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    /// Overall journey progress, rounded to a whole percent.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        round_f64_to_u32(percent(self.current + 1, JOURNEY_STAGES.len()))
    }
}
