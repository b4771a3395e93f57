use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::grid::{col_letter, GRID_COLS, GRID_ROWS, SUBGRID_DIVISIONS};

static KEY_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^([A-R])(1[0-6]|[1-9])-([1-5])-([1-5])$"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerrainError {
    #[error("terrain document must be a JSON object")]
    NotAnObject,
    #[error("invalid terrain key {0:?}")]
    InvalidKey(String),
    #[error("invalid terrain value for {key}: {value}")]
    InvalidClass { key: String, value: String },
    #[error("failed to serialize terrain: {0}")]
    Serialize(String),
}

/// Address of one sub-cell, e.g. "A1-3-2".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerrainKey {
    /// 0-based major column (A=0).
    pub col: u8,
    /// 0-based major row (row "1" is 0).
    pub row: u8,
    pub sub_col: u8,
    pub sub_row: u8,
}

impl TerrainKey {
    pub fn new(col: u8, row: u8, sub_col: u8, sub_row: u8) -> Option<Self> {
        let sub = 1..=SUBGRID_DIVISIONS as u8;
        if (col as usize) < GRID_COLS
            && (row as usize) < GRID_ROWS
            && sub.contains(&sub_col)
            && sub.contains(&sub_row)
        {
            Some(Self { col, row, sub_col, sub_row })
        } else {
            None
        }
    }

    /// Major cell label, e.g. "A1".
    pub fn major_label(&self) -> String {
        format!("{}{}", col_letter(self.col as usize), self.row + 1)
    }

    /// Rank of the row number when compared as text ("1" < "10" < "16" < "2").
    fn row_text_rank(&self) -> (u8, u8) {
        let n = self.row + 1;
        if n < 10 {
            (n, 0)
        } else {
            (n / 10, n % 10 + 1)
        }
    }
}

/// Orders exactly like the canonical text form.
impl Ord for TerrainKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.col
            .cmp(&other.col)
            .then_with(|| self.row_text_rank().cmp(&other.row_text_rank()))
            .then_with(|| self.sub_col.cmp(&other.sub_col))
            .then_with(|| self.sub_row.cmp(&other.sub_row))
    }
}

impl PartialOrd for TerrainKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TerrainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}-{}",
            col_letter(self.col as usize),
            self.row + 1,
            self.sub_col,
            self.sub_row
        )
    }
}

impl FromStr for TerrainKey {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TerrainError::InvalidKey(s.to_string());
        let pattern = KEY_PATTERN.as_ref().map_err(|_| invalid())?;
        let caps = pattern.captures(s).ok_or_else(invalid)?;

        let col = caps[1].as_bytes()[0] - b'A';
        let row: u8 = caps[2].parse().map_err(|_| invalid())?;
        let sub_col: u8 = caps[3].parse().map_err(|_| invalid())?;
        let sub_row: u8 = caps[4].parse().map_err(|_| invalid())?;
        TerrainKey::new(col, row - 1, sub_col, sub_row).ok_or_else(invalid)
    }
}

/// Terrain classification of a sub-cell. `Unknown` is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainClass {
    Land,
    Water,
    Both,
    #[default]
    Unknown,
}

impl TerrainClass {
    /// Classes an editor can assign.
    pub const EDITABLE: [TerrainClass; 4] = [
        TerrainClass::Land,
        TerrainClass::Water,
        TerrainClass::Both,
        TerrainClass::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TerrainClass::Land => "land",
            TerrainClass::Water => "water",
            TerrainClass::Both => "both",
            TerrainClass::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TerrainClass::Land => "Land",
            TerrainClass::Water => "Water",
            TerrainClass::Both => "Coastal",
            TerrainClass::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TerrainClass::Land => "🏝️",
            TerrainClass::Water => "🌊",
            TerrainClass::Both => "🏖️",
            TerrainClass::Unknown => "❓",
        }
    }

    /// Parse a stored value. Only persisted classes are accepted.
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "land" => Some(TerrainClass::Land),
            "water" => Some(TerrainClass::Water),
            "both" => Some(TerrainClass::Both),
            _ => None,
        }
    }
}

impl fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-class tallies for the editor status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerrainCounts {
    pub land: usize,
    pub water: usize,
    pub both: usize,
}

/// Sub-cell key to classification, iterated in serialized key order.
#[derive(Debug, Clone)]
pub struct TerrainStore {
    cells: BTreeMap<TerrainKey, TerrainClass>,
    serialized: String,
}

impl Default for TerrainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TerrainStore {
    pub fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
            serialized: "{}".to_string(),
        }
    }

    /// Replace the whole store from a JSON document. On error nothing changes.
    pub fn load(&mut self, document: &Value) -> Result<usize, TerrainError> {
        let object = document.as_object().ok_or(TerrainError::NotAnObject)?;

        let mut cells = BTreeMap::new();
        for (key, value) in object {
            let parsed: TerrainKey = key.parse()?;
            let class = value
                .as_str()
                .and_then(TerrainClass::from_stored)
                .ok_or_else(|| TerrainError::InvalidClass {
                    key: key.clone(),
                    value: value.to_string(),
                })?;
            cells.insert(parsed, class);
        }

        let serialized = Self::render(&cells)?;
        let count = cells.len();
        self.cells = cells;
        self.serialized = serialized;
        tracing::debug!(cells = count, "Loaded terrain");
        Ok(count)
    }

    pub fn get(&self, key: &TerrainKey) -> TerrainClass {
        self.cells.get(key).copied().unwrap_or_default()
    }

    /// Overwrite one key. `Unknown` clears it.
    pub fn set(&mut self, key: TerrainKey, class: TerrainClass) -> Result<(), TerrainError> {
        match class {
            TerrainClass::Unknown => {
                self.cells.remove(&key);
            }
            other => {
                self.cells.insert(key, other);
            }
        }
        self.serialized = Self::render(&self.cells)?;
        Ok(())
    }

    /// Current 2-space indented JSON, keys sorted.
    pub fn serialize(&self) -> &str {
        &self.serialized
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Populated cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (TerrainKey, TerrainClass)> + '_ {
        self.cells.iter().map(|(k, c)| (*k, *c))
    }

    pub fn counts(&self) -> TerrainCounts {
        let mut counts = TerrainCounts::default();
        for class in self.cells.values() {
            match class {
                TerrainClass::Land => counts.land += 1,
                TerrainClass::Water => counts.water += 1,
                TerrainClass::Both => counts.both += 1,
                TerrainClass::Unknown => {}
            }
        }
        counts
    }

    fn render(cells: &BTreeMap<TerrainKey, TerrainClass>) -> Result<String, TerrainError> {
        let text: BTreeMap<String, TerrainClass> =
            cells.iter().map(|(k, c)| (k.to_string(), *c)).collect();
        serde_json::to_string_pretty(&text).map_err(|e| TerrainError::Serialize(e.to_string()))
    }
}
