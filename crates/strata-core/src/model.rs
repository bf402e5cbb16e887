use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::Rect;

/// A depth value read from a depth column, with its location in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthColumnEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub rect: Rect,
    #[serde(rename = "page")]
    pub page_number: usize,
}

/// Interval delimited by two depth column entries; either side may be missing
/// (an open start usually means the layer starts at the surface).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryInterval {
    #[serde(default)]
    pub start: Option<DepthColumnEntry>,
    #[serde(default)]
    pub end: Option<DepthColumnEntry>,
}

/// Interval written out next to the description (e.g. "0.00 - 1.20 m").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedInterval {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub start: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub end: Option<Decimal>,
    #[serde(default)]
    pub background_rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepthInterval {
    Boundary(BoundaryInterval),
    Annotated(AnnotatedInterval),
}

impl DepthInterval {
    pub fn start_value(&self) -> Option<Decimal> {
        match self {
            DepthInterval::Boundary(b) => b.start.as_ref().map(|e| e.value),
            DepthInterval::Annotated(a) => a.start,
        }
    }

    pub fn end_value(&self) -> Option<Decimal> {
        match self {
            DepthInterval::Boundary(b) => b.end.as_ref().map(|e| e.value),
            DepthInterval::Annotated(a) => a.end,
        }
    }
}

impl fmt::Display for DepthInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<Decimal>| v.map(|d| d.to_string()).unwrap_or_else(|| "?".into());
        write!(f, "{} - {}", show(self.start_value()), show(self.end_value()))
    }
}

/// One line of text with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub rect: Rect,
    pub page: usize,
}

/// Consecutive text lines forming one material description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    pub fn new(lines: Vec<TextLine>) -> Self {
        TextBlock { lines }
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Union of all line rectangles (an empty block has a zero rectangle).
    pub fn rect(&self) -> Rect {
        let mut lines = self.lines.iter();
        match lines.next() {
            Some(first) => lines.fold(first.rect, |acc, l| acc.union(&l.rect)),
            None => Rect::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialDescription {
    TextBlock(TextBlock),
    Annotated { text: String, rect: Rect },
}

impl MaterialDescription {
    pub fn text(&self) -> String {
        match self {
            MaterialDescription::TextBlock(block) => block.text(),
            MaterialDescription::Annotated { text, .. } => text.clone(),
        }
    }

    pub fn rect(&self) -> Rect {
        match self {
            MaterialDescription::TextBlock(block) => block.rect(),
            MaterialDescription::Annotated { rect, .. } => *rect,
        }
    }
}

/// A predicted stratigraphy layer.
///
/// The correctness flags stay `None` until the layer has been evaluated;
/// `depth_interval_is_correct` is also `None` when the material did not match
/// any ground truth layer (not applicable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPrediction {
    pub material_description: MaterialDescription,
    #[serde(default)]
    pub depth_interval: Option<DepthInterval>,
    #[serde(default)]
    pub material_is_correct: Option<bool>,
    #[serde(default)]
    pub depth_interval_is_correct: Option<bool>,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
}

impl LayerPrediction {
    pub fn new(
        material_description: MaterialDescription,
        depth_interval: Option<DepthInterval>,
    ) -> Self {
        LayerPrediction {
            material_description,
            depth_interval,
            material_is_correct: None,
            depth_interval_is_correct: None,
            id: Uuid::new_v4(),
        }
    }
}

impl fmt::Display for LayerPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.depth_interval {
            Some(interval) => write!(f, "[{}] {}", interval, self.material_description.text()),
            None => write!(f, "[-] {}", self.material_description.text()),
        }
    }
}

/// Width and height of a page in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}
