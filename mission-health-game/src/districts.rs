//! Madhya Pradesh district dataset and the map-layer queries built on it.
use serde::Serialize;

use crate::constants::{
    DENSITY_LOW_CEILING, DENSITY_MEDIUM_CEILING, MARKER_BASE_RADIUS, MARKER_RADIUS_SPAN,
    STATE_CENTER,
};

/// A district with its census population and `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct District {
    pub id: &'static str,
    pub name: &'static str,
    pub population: u32,
    pub coordinates: [f64; 2],
}

const fn district(
    id: &'static str,
    name: &'static str,
    population: u32,
    coordinates: [f64; 2],
) -> District {
    District {
        id,
        name,
        population,
        coordinates,
    }
}

pub static DISTRICTS: [District; 51] = [
    district("1", "Bhopal", 2_371_061, [77.4126, 23.2599]),
    district("2", "Indore", 3_276_697, [75.8577, 22.7196]),
    district("3", "Jabalpur", 2_463_289, [79.9864, 23.1815]),
    district("4", "Gwalior", 2_032_036, [78.1828, 26.2183]),
    district("5", "Ujjain", 1_986_864, [75.7885, 23.1765]),
    district("6", "Sagar", 2_378_458, [78.7378, 23.8388]),
    district("7", "Dewas", 1_563_715, [76.0534, 22.9676]),
    district("8", "Satna", 2_228_935, [80.8320, 24.6005]),
    district("9", "Ratlam", 1_455_069, [75.0367, 23.3315]),
    district("10", "Rewa", 2_365_106, [81.3037, 24.5362]),
    district("11", "Katni", 1_292_042, [80.4022, 23.8343]),
    district("12", "Khargone", 1_873_046, [75.6150, 21.8335]),
    district("13", "Neemuch", 826_067, [74.8722, 24.4736]),
    district("14", "Mandsaur", 1_340_411, [75.0680, 24.0734]),
    district("15", "Dhar", 2_185_793, [75.3025, 22.6013]),
    district("16", "Chhindwara", 2_090_922, [78.9381, 22.0574]),
    district("17", "Balaghat", 1_701_698, [80.1937, 21.8144]),
    district("18", "Hoshangabad", 1_241_350, [77.7344, 22.7469]),
    district("19", "Betul", 1_575_362, [77.9008, 21.9105]),
    district("20", "Vidisha", 1_458_875, [77.8095, 23.5235]),
    district("21", "Morena", 1_965_970, [77.9947, 26.4946]),
    district("22", "Shivpuri", 1_726_050, [77.6599, 25.4272]),
    district("23", "Damoh", 1_264_219, [79.4365, 23.8425]),
    district("24", "Tikamgarh", 1_445_166, [78.8319, 24.7425]),
    district("25", "Panna", 1_016_520, [80.1892, 24.7180]),
    district("26", "Sehore", 1_311_332, [77.0852, 23.2032]),
    district("27", "Raisen", 1_331_699, [77.7849, 23.3310]),
    district("28", "Rajgarh", 1_545_814, [76.7333, 23.8500]),
    district("29", "Shajapur", 1_512_681, [76.2599, 23.4359]),
    district("30", "Harda", 570_465, [77.0950, 22.3434]),
    district("31", "Barwani", 1_385_881, [74.9033, 22.0363]),
    district("32", "Khandwa", 1_310_061, [76.3498, 21.8262]),
    district("33", "Burhanpur", 757_847, [76.2170, 21.3099]),
    district("34", "Ashoknagar", 844_979, [77.7308, 24.5798]),
    district("35", "Datia", 786_754, [78.4642, 25.6646]),
    district("36", "Bhind", 1_703_005, [78.7888, 26.5633]),
    district("37", "Narsinghpur", 1_092_141, [79.1950, 22.9479]),
    district("38", "Seoni", 1_379_131, [79.5432, 22.0868]),
    district("39", "Mandla", 1_053_522, [80.3818, 22.5987]),
    district("40", "Dindori", 704_524, [81.0754, 22.9457]),
    district("41", "Shahdol", 1_066_063, [81.3545, 23.3022]),
    district("42", "Umaria", 644_758, [80.8371, 23.5249]),
    district("43", "Sidhi", 1_127_262, [81.8828, 24.3956]),
    district("44", "Singrauli", 1_178_273, [82.6741, 24.1992]),
    district("45", "Jhabua", 1_025_048, [74.5970, 22.7704]),
    district("46", "Alirajpur", 728_999, [74.3554, 22.3123]),
    district("47", "Anuppur", 749_521, [81.6964, 23.1167]),
    district("48", "Niwari", 320_968, [78.8023, 25.3820]),
    district("49", "Agar Malwa", 485_826, [76.0094, 23.7111]),
    district("50", "Sheopur", 687_861, [76.6983, 25.6731]),
    district("51", "Chhatarpur", 1_762_375, [79.5942, 24.9179]),
];

/// Population band used to shade a district on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityBand {
    Low,
    Medium,
    High,
}

#[must_use]
pub fn all() -> &'static [District] {
    &DISTRICTS
}

#[must_use]
pub fn district_by_id(id: &str) -> Option<&'static District> {
    DISTRICTS.iter().find(|d| d.id == id)
}

/// Case-insensitive lookup by display name.
#[must_use]
pub fn district_by_name(name: &str) -> Option<&'static District> {
    let name = name.trim();
    DISTRICTS.iter().find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Approximate geographic center of the state.
#[must_use]
pub const fn state_center() -> [f64; 2] {
    STATE_CENTER
}

#[must_use]
pub fn max_population() -> u32 {
    DISTRICTS.iter().map(|d| d.population).max().unwrap_or(0)
}

#[must_use]
pub fn min_population() -> u32 {
    DISTRICTS.iter().map(|d| d.population).min().unwrap_or(0)
}

/// Middle label of the population legend.
#[must_use]
pub fn legend_midpoint() -> u32 {
    let (min, max) = (min_population(), max_population());
    min + (max - min) / 2
}

/// Population scaled into 0..=1 across the dataset's range.
#[must_use]
pub fn normalized_population(population: u32) -> f64 {
    let (min, max) = (min_population(), max_population());
    if max <= min {
        return 0.0;
    }
    let offset = f64::from(population.saturating_sub(min));
    (offset / f64::from(max - min)).clamp(0.0, 1.0)
}

#[must_use]
pub fn density_band(population: u32) -> DensityBand {
    let normalized = normalized_population(population);
    if normalized < DENSITY_LOW_CEILING {
        DensityBand::Low
    } else if normalized < DENSITY_MEDIUM_CEILING {
        DensityBand::Medium
    } else {
        DensityBand::High
    }
}

/// Radius of the population marker drawn at a district's coordinates.
#[must_use]
pub fn marker_radius(population: u32) -> f64 {
    normalized_population(population)
        .mul_add(MARKER_RADIUS_SPAN, MARKER_BASE_RADIUS)
}

/// Format a count with Indian digit grouping, e.g. `23,71,061`.
#[must_use]
pub fn format_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
