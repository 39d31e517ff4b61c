//! JSON style documents.
//!
//! A document holds named styles, each with a colour function and an
//! optional opacity function:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "styles": {
//!     "temperature": {
//!       "name": "Temperature",
//!       "units": "K",
//!       "colour": {
//!         "type": "segment",
//!         "range": [233.0, 313.0],
//!         "num_segments": 40,
//!         "palette": "viridis",
//!         "below_min": "#000080"
//!       },
//!       "opacity": { "type": "interpolate", "points": [{"data": 233, "value": 0.5}, {"data": 313, "value": 1.0}] }
//!     }
//!   }
//! }
//! ```
//!
//! Every style is compiled while loading, so a document that loads is known
//! to be valid.

use crate::legend::LegendOptions;
use crate::style::{CategoryMap, Interpolate, Segment, Spacing, StyleFunction, StyleValue, Threshold};
use field_common::{Color, FieldError, FieldResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("Failed to read style document: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse style document: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid style '{style}': {message}")]
    ValidationError { style: String, message: String },

    #[error("Style '{0}' not found")]
    NotFound(String),
}

impl From<StyleError> for FieldError {
    fn from(err: StyleError) -> Self {
        FieldError::Config(err.to_string())
    }
}

/// Style document loaded from JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDocument {
    pub version: String,
    pub styles: HashMap<String, StyleEntry>,
}

/// One named style.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleEntry {
    pub name: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub colour: FunctionSpec<Color>,
    #[serde(default)]
    pub opacity: Option<FunctionSpec<f32>>,
    #[serde(default)]
    pub legend: Option<LegendOptions>,
}

/// Serialised form of a [`StyleFunction`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionSpec<T> {
    Threshold {
        thresholds: Vec<f32>,
        values: Vec<T>,
        #[serde(default)]
        fallback: Option<T>,
    },
    Interpolate {
        points: Vec<ControlPoint<T>>,
        #[serde(default)]
        fallback: Option<T>,
    },
    Segment {
        range: [f32; 2],
        #[serde(default)]
        spacing: Spacing,
        num_segments: u32,
        palette: PaletteRef<T>,
        #[serde(default)]
        below_min: Option<T>,
        #[serde(default)]
        above_max: Option<T>,
        #[serde(default)]
        fallback: Option<T>,
    },
    /// Keys are integer categories written as strings
    Map {
        table: HashMap<String, T>,
        #[serde(default)]
        fallback: Option<T>,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlPoint<T> {
    pub data: f32,
    pub value: T,
}

/// Band values of a segment style: a preset name or an explicit list.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PaletteRef<T> {
    Named(String),
    Values(Vec<T>),
}

impl<T: StyleValue> FunctionSpec<T> {
    /// Validate and build the evaluator, resolving named palettes.
    pub fn compile(&self) -> FieldResult<StyleFunction<T>> {
        let function = match self {
            FunctionSpec::Threshold {
                thresholds,
                values,
                fallback,
            } => Threshold::new(thresholds.clone(), values.clone(), fallback.clone())?.into(),
            FunctionSpec::Interpolate { points, fallback } => Interpolate::new(
                points.iter().map(|p| (p.data, p.value.clone())).collect(),
                fallback.clone(),
            )?
            .into(),
            FunctionSpec::Segment {
                range,
                spacing,
                num_segments,
                palette,
                below_min,
                above_max,
                fallback,
            } => {
                let range = (range[0], range[1]);
                match palette {
                    PaletteRef::Named(name) => Segment::with_named_palette(
                        range,
                        *spacing,
                        *num_segments,
                        name,
                        below_min.clone(),
                        above_max.clone(),
                        fallback.clone(),
                    )?,
                    PaletteRef::Values(values) => Segment::new(
                        range,
                        *spacing,
                        *num_segments,
                        values,
                        below_min.clone(),
                        above_max.clone(),
                        fallback.clone(),
                    )?,
                }
                .into()
            }
            FunctionSpec::Map { table, fallback } => {
                let table = table
                    .iter()
                    .map(|(k, v)| {
                        k.trim()
                            .parse::<i32>()
                            .map(|k| (k, v.clone()))
                            .map_err(|_| FieldError::domain(format!("Category '{}' is not an integer", k)))
                    })
                    .collect::<FieldResult<HashMap<i32, T>>>()?;
                CategoryMap::new(table, fallback.clone()).into()
            }
        };
        Ok(function)
    }
}

/// A style ready for rendering.
#[derive(Debug, Clone)]
pub struct CompiledStyle {
    pub name: String,
    pub units: Option<String>,
    pub colour: StyleFunction<Color>,
    pub opacity: Option<StyleFunction<f32>>,
    pub legend: Option<LegendOptions>,
}

impl StyleEntry {
    pub fn compile(&self) -> FieldResult<CompiledStyle> {
        Ok(CompiledStyle {
            name: self.name.clone(),
            units: self.units.clone(),
            colour: self.colour.compile()?,
            opacity: self.opacity.as_ref().map(|o| o.compile()).transpose()?,
            legend: self.legend.clone(),
        })
    }
}

impl StyleDocument {
    /// Parse and validate a document.
    pub fn from_json(json_str: &str) -> Result<Self, StyleError> {
        let doc: StyleDocument = serde_json::from_str(json_str)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Load a document from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StyleError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Compile every style, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), StyleError> {
        let mut keys: Vec<&String> = self.styles.keys().collect();
        keys.sort();
        for key in keys {
            self.styles[key]
                .compile()
                .map_err(|e| StyleError::ValidationError {
                    style: key.clone(),
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    pub fn get_style(&self, name: &str) -> Option<&StyleEntry> {
        self.styles.get(name)
    }

    pub fn compile(&self, name: &str) -> Result<CompiledStyle, StyleError> {
        let entry = self
            .get_style(name)
            .ok_or_else(|| StyleError::NotFound(name.to_string()))?;
        entry.compile().map_err(|e| StyleError::ValidationError {
            style: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_entry() {
        let json = r##"{
            "version": "1.0",
            "styles": {
                "precip": {
                    "name": "Precipitation",
                    "colour": {
                        "type": "threshold",
                        "thresholds": [0.1, 1.0],
                        "values": ["#00000000", "cyan", [0, 0, 255]]
                    }
                }
            }
        }"##;
        let doc = StyleDocument::from_json(json).unwrap();
        let style = doc.compile("precip").unwrap();
        assert_eq!(style.colour.kind(), "threshold");
        assert_eq!(style.colour.evaluate(Some(5.0)), Some(Color::rgb(0, 0, 255)));
        assert!(style.opacity.is_none());
    }

    #[test]
    fn test_invalid_style_rejected_on_load() {
        let json = r##"{
            "version": "1.0",
            "styles": {
                "bad": {
                    "name": "Bad",
                    "colour": {"type": "threshold", "thresholds": [1.0], "values": ["red"]}
                }
            }
        }"##;
        match StyleDocument::from_json(json) {
            Err(StyleError::ValidationError { style, .. }) => assert_eq!(style, "bad"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_style() {
        let doc = StyleDocument::from_json(r#"{"version": "1.0", "styles": {}}"#).unwrap();
        assert!(matches!(doc.compile("x"), Err(StyleError::NotFound(_))));
        let err: FieldError = StyleError::NotFound("x".into()).into();
        assert!(matches!(err, FieldError::Config(_)));
    }
}
