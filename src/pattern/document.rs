use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AssemblyError, Result, StitchError};
use crate::geometry::Curvature;
use crate::math::Vector2;

/// Flat, serializable description of an assembled pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternDocument {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub panels: BTreeMap<String, PanelRecord>,
    #[serde(default)]
    pub stitches: Vec<[StitchEnd; 2]>,
}

/// One panel of a [`PatternDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRecord {
    /// Loop vertices relative to the panel pivot.
    pub vertices: Vec<[f64; 2]>,
    pub edges: Vec<EdgeRecord>,
    /// Extrinsic X, Y, Z Euler angles in degrees.
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default)]
    pub translation: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Indices into [`PanelRecord::vertices`].
    pub endpoints: [usize; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<CurvatureRecord>,
}

/// Serialized curvature: `{"type": ..., "params": [...]}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum CurvatureRecord {
    /// One chord-relative control point.
    Quadratic([[f64; 2]; 1]),
    /// Two chord-relative control points.
    Cubic([[f64; 2]; 2]),
    /// Radius, large-arc flag, right-side flag.
    Circle(f64, bool, bool),
}

/// One side of a stitch: an edge of a named panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StitchEnd {
    pub panel: String,
    #[serde(alias = "edge")]
    pub edge_id: usize,
}

impl PatternDocument {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Moves the panels and stitches of `other` into this document.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel name is already present.
    pub fn merge(&mut self, other: PatternDocument) -> Result<()> {
        for (name, record) in other.panels {
            if self.panels.contains_key(&name) {
                return Err(AssemblyError::DuplicatePanelName(name).into());
            }
            self.panels.insert(name, record);
        }
        self.stitches.extend(other.stitches);
        Ok(())
    }

    /// Checks that every stitch refers to a panel of the document.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing panel.
    pub fn check_stitches(&self) -> Result<()> {
        for end in self.stitches.iter().flatten() {
            if !self.panels.contains_key(&end.panel) {
                return Err(StitchError::PanelNotInPattern(end.panel.clone()).into());
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    ///
    /// Returns an error if `json` is not a valid pattern document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<Curvature> for CurvatureRecord {
    fn from(curvature: Curvature) -> Self {
        match curvature {
            Curvature::Quadratic { control } => Self::Quadratic([[control.x, control.y]]),
            Curvature::Cubic { controls: [a, b] } => Self::Cubic([[a.x, a.y], [b.x, b.y]]),
            Curvature::Circle {
                radius,
                large_arc,
                right,
            } => Self::Circle(radius, large_arc, right),
        }
    }
}

impl From<CurvatureRecord> for Curvature {
    fn from(record: CurvatureRecord) -> Self {
        match record {
            CurvatureRecord::Quadratic([c]) => Self::Quadratic {
                control: Vector2::from(c),
            },
            CurvatureRecord::Cubic([a, b]) => Self::Cubic {
                controls: [Vector2::from(a), Vector2::from(b)],
            },
            CurvatureRecord::Circle(radius, large_arc, right) => Self::Circle {
                radius,
                large_arc,
                right,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PatternError;
    use serde_json::json;

    fn square() -> PanelRecord {
        PanelRecord {
            vertices: vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]],
            edges: (0..4)
                .map(|i| EdgeRecord {
                    endpoints: [i, (i + 1) % 4],
                    curvature: None,
                })
                .collect(),
            rotation: [0.0; 3],
            translation: [0.0; 3],
        }
    }

    #[test]
    fn json_layout() {
        let mut record = square();
        record.edges[1].curvature = Some(CurvatureRecord::Circle(2.0, false, true));
        record.edges[2].curvature = Some(CurvatureRecord::Quadratic([[0.5, 0.25]]));
        let mut doc = PatternDocument::new("skirt");
        doc.panels.insert("front".into(), record);
        doc.stitches.push([
            StitchEnd {
                panel: "front".into(),
                edge_id: 0,
            },
            StitchEnd {
                panel: "front".into(),
                edge_id: 3,
            },
        ]);

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["name"], "skirt");
        let edges = &value["panels"]["front"]["edges"];
        assert!(edges[0].get("curvature").is_none());
        assert_eq!(edges[1]["curvature"], json!({"type": "circle", "params": [2.0, false, true]}));
        assert_eq!(edges[2]["curvature"], json!({"type": "quadratic", "params": [[0.5, 0.25]]}));
        assert_eq!(value["stitches"][0][1], json!({"panel": "front", "edge_id": 3}));

        let back = PatternDocument::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn accepts_edge_alias_and_missing_name() {
        let json = r#"{
            "panels": {},
            "stitches": [[{"panel": "a", "edge": 1}, {"panel": "b", "edge_id": 2}]]
        }"#;
        let doc = PatternDocument::from_json(json).unwrap();
        assert!(doc.name.is_empty());
        assert_eq!(doc.stitches[0][0].edge_id, 1);
        assert!(matches!(
            doc.check_stitches().unwrap_err(),
            PatternError::Stitch(StitchError::PanelNotInPattern(name)) if name == "a"
        ));
    }

    #[test]
    fn merge_rejects_duplicate_names() {
        let mut a = PatternDocument::default();
        a.panels.insert("front".into(), square());
        let mut b = PatternDocument::default();
        b.panels.insert("front".into(), square());
        let err = a.merge(b).unwrap_err();
        assert!(matches!(
            err,
            PatternError::Assembly(AssemblyError::DuplicatePanelName(name)) if name == "front"
        ));
    }

    #[test]
    fn curvature_conversion() {
        let cubic = Curvature::Cubic {
            controls: [Vector2::new(0.1, 0.2), Vector2::new(0.8, -0.3)],
        };
        let record = CurvatureRecord::from(cubic);
        assert_eq!(record, CurvatureRecord::Cubic([[0.1, 0.2], [0.8, -0.3]]));
        assert_eq!(Curvature::from(record), cubic);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            PatternDocument::from_json("{\"panels\": 3}").unwrap_err(),
            PatternError::Serialization(_)
        ));
    }
}
