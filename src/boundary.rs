//! Optional sub-district boundary overlay.
//!
//! The GeoJSON itself is drawn by the map renderer; the core only reads the
//! feature names so sub-district labels from the data can be matched against
//! polygons. A missing or broken file simply means no overlay.

use crate::error::Result;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Feature property keys that may hold the sub-district name, in priority
/// order.
const NAME_KEYS: &[&str] = &["kecamatan", "KECAMATAN", "nama_kecamatan", "WADMKC", "NAMOBJ", "name", "NAME"];

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryOverlay {
    document: Value,
}

/// A data label and the boundary feature it corresponds to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatch {
    pub label: String,
    pub feature_name: Option<String>,
}

impl BoundaryOverlay {
    pub fn parse(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Ok(BoundaryOverlay { document })
    }

    /// Read the overlay, or `None` (with a warning) when it is absent or
    /// unreadable.
    pub fn load(path: &Path) -> Option<Self> {
        let result = std::fs::read_to_string(path)
            .map_err(Into::into)
            .and_then(|text| Self::parse(&text));
        match result {
            Ok(overlay) => {
                info!(
                    "Loaded boundary overlay {} ({} features)",
                    path.display(),
                    overlay.features().len()
                );
                Some(overlay)
            }
            Err(e) => {
                warn!("Boundary overlay {} unavailable: {}", path.display(), e);
                None
            }
        }
    }

    /// The raw document, for the renderer.
    pub fn document(&self) -> &Value {
        &self.document
    }

    fn features(&self) -> &[Value] {
        self.document
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Names of all features that carry one, in document order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features().iter().filter_map(feature_name).collect()
    }

    /// Pair each label with the feature whose name equals it, ignoring case
    /// and surrounding whitespace.
    pub fn match_labels(&self, labels: &[String]) -> Vec<LabelMatch> {
        let names = self.feature_names();
        labels
            .iter()
            .map(|label| LabelMatch {
                label: label.clone(),
                feature_name: names
                    .iter()
                    .find(|n| n.trim().to_lowercase() == label.trim().to_lowercase())
                    .cloned(),
            })
            .collect()
    }
}

fn feature_name(feature: &Value) -> Option<String> {
    let props = feature.get("properties")?;
    NAME_KEYS
        .iter()
        .find_map(|key| props.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"WADMKC": "CIKUPA"}, "geometry": null},
            {"type": "Feature", "properties": {"name": "Curug"}, "geometry": null},
            {"type": "Feature", "properties": {}, "geometry": null}
        ]
    }"#;

    #[test]
    fn names_come_from_known_keys() {
        let overlay = BoundaryOverlay::parse(DOC).unwrap();
        assert_eq!(overlay.feature_names(), vec!["CIKUPA", "Curug"]);
    }

    #[test]
    fn labels_match_case_insensitively() {
        let overlay = BoundaryOverlay::parse(DOC).unwrap();
        let matches = overlay.match_labels(&["Cikupa".to_string(), "Tigaraksa".to_string()]);
        assert_eq!(matches[0].feature_name.as_deref(), Some("CIKUPA"));
        assert_eq!(matches[1].feature_name, None);
    }

    #[test]
    fn missing_or_broken_file_is_none() {
        assert!(BoundaryOverlay::load(Path::new("/nonexistent/batas.geojson")).is_none());

        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{ not json").unwrap();
        assert!(BoundaryOverlay::load(f.path()).is_none());
    }
}
