use crate::dom::{Document, Element};
use crate::error::ErrorPayload;
use serde::Serialize;

/// Schema version for output payloads.
pub const PHANDOM_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum PhandomOutput {
    Render(RenderReport),
    Check(CheckOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    pub version: String,
    pub page: String,
    pub renderer: String,
    pub elapsed_ms: u64,
    /// Present when the whole document was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    /// Present when a path selection was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub path: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub version: String,
    pub renderer: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    pub error: ErrorPayload,
}

impl Selection {
    pub fn from_document(document: &Document, path: &str) -> Self {
        let elements: Vec<Element> = document.select(path).into_iter().cloned().collect();
        Self {
            path: path.to_string(),
            count: elements.len(),
            elements,
        }
    }
}
