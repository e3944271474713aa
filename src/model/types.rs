use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

/// One penguin observation plus the model that should classify it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PenguinFeatures {
    pub island: String,
    pub bill_length_mm: f64,
    pub bill_depth_mm: f64,
    pub flipper_length_mm: f64,
    pub body_mass_g: f64,
    pub sex: String,
    #[serde(deserialize_with = "whole_number")]
    pub year: i64,
    pub model: String,
}

/// Accepts `2007` and `2007.0`; rejects fractional values such as `2007.5`.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(value) => Ok(value),
        Raw::Float(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        Raw::Float(value) => Err(de::Error::custom(format!(
            "expected a whole number, got {value}"
        ))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResponse {
    pub model: String,
    pub species: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSelector {
    DecisionTree,
    RandomForest,
}

impl ModelSelector {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DT" => Some(ModelSelector::DecisionTree),
            "RF" => Some(ModelSelector::RandomForest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSelector::DecisionTree => "DT",
            ModelSelector::RandomForest => "RF",
        }
    }
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Categorical,
    Numeric,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Categorical => "categorical",
            ColumnKind::Numeric => "numeric",
        }
    }
}

pub const N_FEATURES: usize = 7;

/// Column names and kinds in the order the models were trained on.
pub static FEATURE_COLUMNS: [(&str, ColumnKind); N_FEATURES] = [
    ("island", ColumnKind::Categorical),
    ("bill_length_mm", ColumnKind::Numeric),
    ("bill_depth_mm", ColumnKind::Numeric),
    ("flipper_length_mm", ColumnKind::Numeric),
    ("body_mass_g", ColumnKind::Numeric),
    ("sex", ColumnKind::Categorical),
    ("year", ColumnKind::Numeric),
];

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Categorical(String),
    Numeric(f64),
}

/// Single-row table handed to a classifier. Never contains the selector.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: [FeatureValue; N_FEATURES],
}

impl FeatureRow {
    pub fn from_features(features: &PenguinFeatures) -> Self {
        Self {
            values: [
                FeatureValue::Categorical(features.island.clone()),
                FeatureValue::Numeric(features.bill_length_mm),
                FeatureValue::Numeric(features.bill_depth_mm),
                FeatureValue::Numeric(features.flipper_length_mm),
                FeatureValue::Numeric(features.body_mass_g),
                FeatureValue::Categorical(features.sex.clone()),
                FeatureValue::Numeric(features.year as f64),
            ],
        }
    }

    pub fn value(&self, index: usize) -> Option<&FeatureValue> {
        self.values.get(index)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        FEATURE_COLUMNS
            .iter()
            .map(|(name, _)| *name)
            .zip(self.values.iter())
    }
}
