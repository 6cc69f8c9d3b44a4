use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::animation::resolve::AnimationMap;
use crate::export::config::RenderConfig;
use crate::foundation::error::{MotionError, MotionResult};
use crate::render::frame::Scene;
use crate::scene::background::BackgroundConfig;
use crate::scene::element::DesignElement;

/// Font file made available to text elements under `family`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontRef {
    /// Family name text elements refer to.
    pub family: String,
    /// Relative path or `data:` URI of the font file.
    pub src: String,
}

/// Self-contained export document: render settings plus the scene snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Output settings.
    pub config: RenderConfig,
    /// Top-level elements in z-order.
    #[serde(default)]
    pub elements: Vec<DesignElement>,
    /// Animations keyed by element id.
    #[serde(default)]
    pub animations: AnimationMap,
    /// Artboard background.
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Fonts to register before rendering.
    #[serde(default)]
    pub fonts: Vec<FontRef>,
}

impl Project {
    /// Parse a project from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MotionResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| MotionError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON string.
    pub fn from_json(s: &str) -> MotionResult<Self> {
        serde_json::from_str(s).map_err(|e| MotionError::serde(format!("parse project JSON: {e}")))
    }

    /// Parse a project from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MotionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            MotionError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize back to pretty JSON.
    pub fn to_json(&self) -> MotionResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MotionError::serde(format!("serialize project JSON: {e}")))
    }

    /// Borrow the renderable part of the document.
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            elements: &self.elements,
            animations: &self.animations,
            background: &self.background,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
