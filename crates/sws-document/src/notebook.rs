//! Notebook container types (nbformat 4).
//!
//! Only the parts of the format the codec needs are modelled. Unknown
//! top-level metadata keys survive a decode/encode cycle through
//! [`NotebookMetadata::extra`], so foreign documents stay intact.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocumentError, Result};

/// Major nbformat version written and accepted.
pub const NBFORMAT: u32 = 4;

/// Minor nbformat version written (cell ids are mandatory from 4.5).
pub const NBFORMAT_MINOR: u32 = 5;

/// Metadata key of the workspace extension block.
pub const EXTENSION_KEY: &str = "workspace_export";

/// Cell metadata key marking a per-window cell.
pub const WINDOW_CELL_KEY: &str = "window";

/// Cell metadata key carrying a window's placement.
pub const SPATIAL_CELL_KEY: &str = "spatial";

/// Top-level notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    pub nbformat: u32,
    #[serde(default)]
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Create an empty nbformat 4.5 notebook.
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            metadata: NotebookMetadata::default(),
            nbformat: NBFORMAT,
            nbformat_minor: NBFORMAT_MINOR,
        }
    }

    /// Decode a notebook from raw bytes.
    ///
    /// Anything that is not an nbformat 4 JSON document is a structural error.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let notebook: Notebook =
            serde_json::from_slice(bytes).map_err(|e| DocumentError::Malformed {
                reason: e.to_string(),
            })?;
        if notebook.nbformat != NBFORMAT {
            return Err(DocumentError::Malformed {
                reason: format!("unsupported nbformat {}", notebook.nbformat),
            });
        }
        Ok(notebook)
    }

    /// Encode with one-space indentation and a trailing newline, as Jupyter writes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| DocumentError::Serialization {
                source: Box::new(e),
            })?;
        out.push(b'\n');
        Ok(out)
    }
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

/// Notebook-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernelspec: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_info: Option<Value>,
    /// Raw extension block; decoded lazily so analysis stays cheap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_export: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// CELLS
// =============================================================================

/// A notebook cell, discriminated by `cell_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown(TextCell),
    Raw(TextCell),
    Code(CodeCell),
}

impl Cell {
    pub fn markdown(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Markdown(TextCell {
            id: Some(id.into()),
            metadata: Map::new(),
            source: source.into(),
        })
    }

    pub fn code(id: impl Into<String>, source: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self::Code(CodeCell {
            id: Some(id.into()),
            metadata,
            source: source.into(),
            execution_count: None,
            outputs: Vec::new(),
        })
    }

    pub fn source(&self) -> &str {
        match self {
            Self::Markdown(cell) | Self::Raw(cell) => &cell.source,
            Self::Code(cell) => &cell.source,
        }
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        match self {
            Self::Markdown(cell) | Self::Raw(cell) => &cell.metadata,
            Self::Code(cell) => &cell.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Map<String, Value> {
        match self {
            Self::Markdown(cell) | Self::Raw(cell) => &mut cell.metadata,
            Self::Code(cell) => &mut cell.metadata,
        }
    }

    /// Whether the exporter tagged this cell as a window rendering.
    pub fn is_window_cell(&self) -> bool {
        self.metadata()
            .get(WINDOW_CELL_KEY)
            .is_some_and(Value::is_object)
    }
}

/// Markdown or raw cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(with = "multiline")]
    pub source: String,
}

/// Code cell. Outputs are carried opaquely; nothing is ever executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(with = "multiline")]
    pub source: String,
    #[serde(default)]
    pub execution_count: Option<u32>,
    #[serde(default)]
    pub outputs: Vec<Value>,
}

/// nbformat "multiline string": a single string or a list of lines.
///
/// Written as a list of lines, each keeping its trailing newline.
mod multiline {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Multiline {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(source: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(source.split_inclusive('\n'))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Multiline::deserialize(deserializer)? {
            Multiline::One(s) => s,
            Multiline::Many(lines) => lines.concat(),
        })
    }
}
