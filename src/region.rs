// src/region.rs

use serde::{Serialize, Serializer};
use std::fmt;

/// Number of tracked administrative regions. Drought thresholds are always
/// computed against this, not against how many regions actually have data.
pub const TOTAL_REGIONS: u8 = 25;

/// Region id → display name, ordered by id.
static REGION_NAMES: [(u8, &str); TOTAL_REGIONS as usize] = [
    (1, "Вінницька"),
    (2, "Волинська"),
    (3, "Дніпропетровська"),
    (4, "Донецька"),
    (5, "Житомирська"),
    (6, "Закарпатська"),
    (7, "Запорізька"),
    (8, "Івано-Франківська"),
    (9, "Київська"),
    (10, "Кіровоградська"),
    (11, "Луганська"),
    (12, "Львівська"),
    (13, "Миколаївська"),
    (14, "Одеська"),
    (15, "Полтавська"),
    (16, "Рівенська"),
    (17, "Сумська"),
    (18, "Тернопільська"),
    (19, "Харківська"),
    (20, "Херсонська"),
    (21, "Хмельницька"),
    (22, "Черкаська"),
    (23, "Чернівецька"),
    (24, "Чернігівська"),
    (25, "Республіка Крим"),
];

/// Display name attached to every row. `Unknown` is the explicit sentinel for
/// ids the directory does not cover, so a report never shows an empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionName {
    Known(&'static str),
    Unknown,
}

impl RegionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionName::Known(name) => name,
            RegionName::Unknown => "unknown region",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, RegionName::Known(_))
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RegionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Static, read-only lookup over the 25 regions.
pub struct RegionDirectory;

impl RegionDirectory {
    /// `true` when `id` lies in `1..=TOTAL_REGIONS`.
    pub fn contains(id: i64) -> bool {
        (1..=TOTAL_REGIONS as i64).contains(&id)
    }

    pub fn name(id: u8) -> Option<&'static str> {
        REGION_NAMES
            .binary_search_by_key(&id, |(rid, _)| *rid)
            .ok()
            .map(|idx| REGION_NAMES[idx].1)
    }

    pub fn resolve(id: u8) -> RegionName {
        Self::name(id).map_or(RegionName::Unknown, RegionName::Known)
    }

    /// All `(id, name)` entries in ascending id order.
    pub fn entries() -> impl Iterator<Item = (u8, &'static str)> {
        REGION_NAMES.iter().copied()
    }

    pub fn ids() -> impl Iterator<Item = u8> {
        1..=TOTAL_REGIONS
    }
}
