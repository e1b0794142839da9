use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

pub mod backend;
pub mod config_file;
pub mod memory;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use memory::{MemoryBackend, MemoryDocument, TextFileBackend};

/// What kind of pattern produced a [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Assignment,
    Date,
    /// Synthetic pairing of a nearby assignment mention and date mention.
    Combined,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Date => "date",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in page coordinates.
///
/// Serialized as `[x0, y0, x1, y1]`. The all-zero box is the sentinel for
/// "no location known" (lookup missed, or the match is synthetic).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub const SENTINEL: BoundingBox = BoundingBox {
        x0: 0.0,
        y0: 0.0,
        x1: 0.0,
        y1: 0.0,
    };

    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x0, y0, x1, y1]: [f32; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A located occurrence of an assignment keyword or date in document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The literal substring that matched.
    pub text: String,
    /// 1-based page number.
    pub page_number: usize,
    /// Surrounding text window, trimmed.
    pub context: String,
    pub match_type: MatchType,
    pub position: BoundingBox,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.context.chars().take(100).collect();
        writeln!(f, "Match:")?;
        writeln!(f, "    Text: {}", self.text)?;
        writeln!(f, "    Page: {}", self.page_number)?;
        writeln!(f, "    Type: {}", self.match_type)?;
        writeln!(
            f,
            "    Position: ({}, {}, {}, {})",
            self.position.x0, self.position.y0, self.position.x1, self.position.y1
        )?;
        write!(f, "    Context: {}...", preview)
    }
}

/// Whether an assignment mention looks like a genuine task, and how sure we are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub is_real: bool,
    /// Normalized score in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl Classification {
    pub fn confidence_percentage(&self) -> f64 {
        self.confidence * 100.0
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Classification", 3)?;
        s.serialize_field("is_real", &self.is_real)?;
        s.serialize_field("confidence", &self.confidence)?;
        s.serialize_field("confidence_percentage", &self.confidence_percentage())?;
        s.end()
    }
}

/// Raw matches produced by one extraction request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    pub assignments: Vec<Match>,
    pub dates: Vec<Match>,
    pub combined: Vec<Match>,
}
