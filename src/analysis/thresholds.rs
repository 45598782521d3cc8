//! Threshold configuration for primer scoring
//!
//! Thresholds are a flat `name -> number` map. Nothing is checked when the
//! map is loaded; [`Thresholds::resolve`] demands the full key set when a
//! primer is actually scored.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::{PrimerError, Result};

/// The thresholds the scoring policy reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThresholdKey {
    LengthLow,
    LengthHigh,
    GcLow,
    GcHigh,
    TmLow,
    TmHigh,
    HomopolymerMax,
    HairpinMax,
    DimerMax,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 9] = [
        Self::LengthLow,
        Self::LengthHigh,
        Self::GcLow,
        Self::GcHigh,
        Self::TmLow,
        Self::TmHigh,
        Self::HomopolymerMax,
        Self::HairpinMax,
        Self::DimerMax,
    ];

    /// Normalized key name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LengthLow => "lengthLow",
            Self::LengthHigh => "lengthHigh",
            Self::GcLow => "gcLow",
            Self::GcHigh => "gcHigh",
            Self::TmLow => "tmLow",
            Self::TmHigh => "tmHigh",
            Self::HomopolymerMax => "homopolymerMax",
            Self::HairpinMax => "hairpinMax",
            Self::DimerMax => "dimerMax",
        }
    }

    /// Human-readable label for the UI
    pub fn label(&self) -> &'static str {
        match self {
            Self::LengthLow => "Length, lower bound (bp)",
            Self::LengthHigh => "Length, upper bound (bp, exclusive)",
            Self::GcLow => "GC content, lower bound (%)",
            Self::GcHigh => "GC content, upper bound (%, exclusive)",
            Self::TmLow => "Melting temperature, lower bound (°C)",
            Self::TmHigh => "Melting temperature, upper bound (°C, exclusive)",
            Self::HomopolymerMax => "Penalized homopolymer run (bp)",
            Self::HairpinMax => "Maximum hairpin (%)",
            Self::DimerMax => "Maximum self-dimer (%)",
        }
    }

    /// Look up a key by its normalized or legacy spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        KEY_NAMES.get(name).copied()
    }
}

impl fmt::Display for ThresholdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized names plus the spellings used by older `variables.json` files
static KEY_NAMES: Lazy<HashMap<&'static str, ThresholdKey>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, ThresholdKey> =
        ThresholdKey::ALL.iter().map(|&k| (k.as_str(), k)).collect();
    map.insert("primerLengthLow", ThresholdKey::LengthLow);
    map.insert("primerLengthHigh", ThresholdKey::LengthHigh);
    map.insert("gcPercentLow", ThresholdKey::GcLow);
    map.insert("gcPercentHigh", ThresholdKey::GcHigh);
    map.insert("meltingTempLow", ThresholdKey::TmLow);
    map.insert("meltingTempHigh", ThresholdKey::TmHigh);
    map.insert("homoPolymerLength", ThresholdKey::HomopolymerMax);
    map.insert("hairpinPercentage", ThresholdKey::HairpinMax);
    map.insert("primerDimerPercentage", ThresholdKey::DimerMax);
    map
});

/// A flat map of named numeric thresholds.
///
/// Known keys are stored under their normalized name; unknown keys are kept
/// as-is so a round trip through JSON does not lose them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, f64>"
)]
pub struct Thresholds {
    values: BTreeMap<String, f64>,
}

impl Thresholds {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sample threshold set from the stock `variables.json`.
    /// Used by the UI as an example; scoring never falls back to it.
    pub fn reference() -> Self {
        [
            (ThresholdKey::LengthLow, 16.0),
            (ThresholdKey::LengthHigh, 30.0),
            (ThresholdKey::GcLow, 40.0),
            (ThresholdKey::GcHigh, 60.0),
            (ThresholdKey::TmLow, 45.0),
            (ThresholdKey::TmHigh, 65.0),
            (ThresholdKey::HomopolymerMax, 6.0),
            (ThresholdKey::HairpinMax, 60.0),
            (ThresholdKey::DimerMax, 75.0),
        ]
        .into_iter()
        .collect()
    }

    /// Insert a value under any spelling of its key
    pub fn insert(&mut self, name: &str, value: f64) {
        match ThresholdKey::from_name(name) {
            Some(key) => self.set(key, value),
            None => {
                tracing::warn!("Unknown threshold key: {}", name);
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn set(&mut self, key: ThresholdKey, value: f64) {
        self.values.insert(key.as_str().to_string(), value);
    }

    pub fn get(&self, key: ThresholdKey) -> Option<f64> {
        self.values.get(key.as_str()).copied()
    }

    pub fn remove(&mut self, key: ThresholdKey) -> Option<f64> {
        self.values.remove(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Known keys that have no value yet
    pub fn missing_keys(&self) -> Vec<ThresholdKey> {
        ThresholdKey::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_none())
            .collect()
    }

    /// Parse a JSON object of thresholds
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| PrimerError::Configuration(e.to_string()))
    }

    /// Load thresholds from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let thresholds = Self::from_json_str(&text)?;
        tracing::info!(
            "Loaded {} thresholds from {}",
            thresholds.len(),
            path.display()
        );
        Ok(thresholds)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PrimerError::Configuration(e.to_string()))
    }

    /// Look up every threshold the scoring policy needs.
    ///
    /// All missing keys are reported together.
    pub fn resolve(&self) -> Result<ResolvedThresholds> {
        let mut values = [0.0_f64; 9];
        let mut missing = Vec::new();
        for (slot, key) in values.iter_mut().zip(ThresholdKey::ALL) {
            match self.get(key) {
                Some(value) => *slot = value,
                None => missing.push(key.as_str()),
            }
        }

        if !missing.is_empty() {
            return Err(PrimerError::Configuration(format!(
                "missing threshold key(s): {}",
                missing.join(", ")
            )));
        }

        // Same order as ThresholdKey::ALL
        let [length_low, length_high, gc_low, gc_high, tm_low, tm_high, homopolymer_max, hairpin_max, dimer_max] =
            values;
        Ok(ResolvedThresholds {
            length_low,
            length_high,
            gc_low,
            gc_high,
            tm_low,
            tm_high,
            homopolymer_max,
            hairpin_max,
            dimer_max,
        })
    }
}

impl FromIterator<(ThresholdKey, f64)> for Thresholds {
    fn from_iter<I: IntoIterator<Item = (ThresholdKey, f64)>>(iter: I) -> Self {
        let mut thresholds = Self::new();
        for (key, value) in iter {
            thresholds.set(key, value);
        }
        thresholds
    }
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for Thresholds {
    type Error = PrimerError;

    fn try_from(raw: BTreeMap<String, serde_json::Value>) -> Result<Self> {
        let mut thresholds = Self::new();
        for (name, value) in raw {
            let number = value.as_f64().ok_or_else(|| {
                PrimerError::Configuration(format!(
                    "threshold '{}' must be a number, got {}",
                    name, value
                ))
            })?;
            thresholds.insert(&name, number);
        }
        Ok(thresholds)
    }
}

impl From<Thresholds> for BTreeMap<String, f64> {
    fn from(thresholds: Thresholds) -> Self {
        thresholds.values
    }
}

/// A complete threshold set, checked at scoring time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedThresholds {
    pub length_low: f64,
    pub length_high: f64,
    pub gc_low: f64,
    pub gc_high: f64,
    pub tm_low: f64,
    pub tm_high: f64,
    pub homopolymer_max: f64,
    pub hairpin_max: f64,
    pub dimer_max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalized_keys() {
        let json = r#"{"lengthLow": 16, "lengthHigh": 30, "gcLow": 40, "gcHigh": 60,
            "tmLow": 45, "tmHigh": 65, "homopolymerMax": 6, "hairpinMax": 60, "dimerMax": 75}"#;
        let thresholds = Thresholds::from_json_str(json).unwrap();
        assert_eq!(thresholds, Thresholds::reference());
        assert!(thresholds.resolve().is_ok());
    }

    #[test]
    fn test_parse_legacy_keys() {
        let json = r#"{"primerLengthLow": 16, "primerLengthHigh": 30, "gcPercentLow": 40,
            "gcPercentHigh": 60, "meltingTempLow": 45, "meltingTempHigh": 65,
            "homoPolymerLength": 6, "hairpinPercentage": 60, "primerDimerPercentage": 75}"#;
        let thresholds = Thresholds::from_json_str(json).unwrap();
        assert_eq!(thresholds.get(ThresholdKey::DimerMax), Some(75.0));
        assert_eq!(thresholds, Thresholds::reference());
    }

    #[test]
    fn test_missing_keys_fail_at_resolve_not_load() {
        let thresholds = Thresholds::from_json_str(r#"{"lengthLow": 16}"#).unwrap();
        assert_eq!(thresholds.len(), 1);
        match thresholds.resolve() {
            Err(PrimerError::Configuration(msg)) => {
                assert!(msg.contains("lengthHigh"));
                assert!(msg.contains("dimerMax"));
                assert!(!msg.contains("lengthLow"));
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        let result = Thresholds::from_json_str(r#"{"gcLow": "forty"}"#);
        assert!(matches!(result, Err(PrimerError::Configuration(_))));
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let thresholds = Thresholds::from_json_str(r#"{"saltConcentration": 50}"#).unwrap();
        assert_eq!(thresholds.len(), 1);
        assert_eq!(thresholds.missing_keys().len(), ThresholdKey::ALL.len());
    }

    #[test]
    fn test_json_round_trip_uses_normalized_names() {
        let json = Thresholds::reference().to_json_string().unwrap();
        assert!(json.contains("\"homopolymerMax\""));
        assert_eq!(Thresholds::from_json_str(&json).unwrap(), Thresholds::reference());
    }
}
