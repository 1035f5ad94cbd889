use serde::{Deserialize, Serialize};

use diagramkit_core::{Bounds, Position};

/// Gap between a shape's bottom edge and a label placed below it.
pub const BELOW_LABEL_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTruncation {
    Clip,
    #[default]
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPlacement {
    #[default]
    Inside,
    Below,
}

/// Label text and the layout hints handed to the text renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextLayout {
    pub text: String,
    pub text_wrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    pub text_truncation: TextTruncation,
    pub text_placement: TextPlacement,
    /// Line height as a multiple of the font size
    pub line_height: f64,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            text: String::new(),
            text_wrap: true,
            max_lines: None,
            text_truncation: TextTruncation::Ellipsis,
            text_placement: TextPlacement::Inside,
            line_height: 1.2,
        }
    }
}

impl TextLayout {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Reference point for the label: the centroid for inside labels, the
    /// bottom-center (offset by [`BELOW_LABEL_GAP`]) for labels below.
    pub fn anchor_in(&self, bounds: &Bounds) -> Position {
        match self.text_placement {
            TextPlacement::Inside => bounds.center(),
            TextPlacement::Below => {
                Position::new(bounds.center().x, bounds.max_y() + BELOW_LABEL_GAP)
            }
        }
    }
}
