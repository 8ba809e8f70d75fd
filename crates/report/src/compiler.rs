//! Assembles the editable inspection report from the result set, the
//! narrative text, and the image store.
//!
//! Sections follow upload order and cross-reference appendix figures.
//! The appendix carries the **original** bitmaps: annotations exist to
//! steer the assessment, not to appear in the delivered report.

use anyhow::anyhow;
use chrono::NaiveDate;
use image::RgbaImage;
use serde::Serialize;
use tracing::debug;

use fieldscope_core::{AssessmentResult, ConditionGrade, FieldscopeError, ReportText};
use fieldscope_store::ImageStore;

/// One component section of the report body. All text fields remain
/// editable in place after generation.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSection {
    pub component_type: String,
    pub condition_grade: ConditionGrade,
    pub condition_description: String,
    pub maintenance_recommendations: String,
    /// 1-based appendix figure number.
    pub figure: usize,
}

/// One appendix entry: the unannotated upload with its caption.
#[derive(Debug, Clone, Serialize)]
pub struct AppendixFigure {
    pub number: usize,
    pub caption: String,
    #[serde(skip_serializing)]
    pub image: RgbaImage,
}

impl AppendixFigure {
    /// File name used when the figure is written to disk.
    pub fn file_name(&self) -> String {
        format!("figure-{}.png", self.number)
    }
}

/// The compiled, editable inspection report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub address: String,
    pub date: NaiveDate,
    pub introduction: String,
    pub sections: Vec<ComponentSection>,
    pub summary: String,
    pub appendix: Vec<AppendixFigure>,
}

impl ReportDocument {
    /// Build the document. `results` must line up one-to-one with the
    /// store's items, in upload order.
    pub fn compile(
        address: impl Into<String>,
        date: NaiveDate,
        store: &ImageStore,
        results: &[AssessmentResult],
        text: &ReportText,
    ) -> Result<Self, FieldscopeError> {
        if results.len() != store.len() {
            return Err(FieldscopeError::Other(anyhow!(
                "result count {} does not match image count {}",
                results.len(),
                store.len()
            )));
        }

        let sections = results
            .iter()
            .enumerate()
            .map(|(i, result)| ComponentSection {
                component_type: result.component_type.clone(),
                condition_grade: result.condition_grade,
                condition_description: result.condition_description.clone(),
                maintenance_recommendations: result.maintenance_recommendations.clone(),
                figure: i + 1,
            })
            .collect();

        let appendix = store
            .iter()
            .zip(results)
            .enumerate()
            .map(|(i, (item, result))| AppendixFigure {
                number: i + 1,
                caption: if item.description().is_empty() {
                    result.component_type.clone()
                } else {
                    format!("{} ({})", result.component_type, item.description())
                },
                image: item.original().clone(),
            })
            .collect();

        debug!(sections = results.len(), "Compiled report document");

        Ok(Self {
            address: address.into(),
            date,
            introduction: text.introduction.clone(),
            sections,
            summary: text.summary.clone(),
            appendix,
        })
    }

    /// Render the report body as Markdown. Appendix images are
    /// referenced by their `file_name` under `appendix/`.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Building Condition Assessment\n\n");
        out.push_str(&format!("**Address:** {}\n\n", self.address));
        out.push_str(&format!("**Date:** {}\n\n", self.date));
        out.push_str("## Introduction\n\n");
        out.push_str(&self.introduction);
        out.push_str("\n\n");

        for section in &self.sections {
            out.push_str(&format!(
                "## Component {}: {}\n\n",
                section.figure, section.component_type
            ));
            match section.condition_grade {
                ConditionGrade::Drawing => {
                    out.push_str("**Condition:** not graded (image identified as a drawing)\n\n");
                }
                grade => {
                    out.push_str(&format!("**Condition:** {}\n\n", grade));
                }
            }
            out.push_str(&format!("{}\n\n", section.condition_description));
            out.push_str(&format!(
                "**Recommendations:** {}\n\n",
                section.maintenance_recommendations
            ));
            out.push_str(&format!("See Figure {} in the appendix.\n\n", section.figure));
        }

        out.push_str("## Summary\n\n");
        out.push_str(&self.summary);
        out.push_str("\n\n## Appendix\n\n");
        for figure in &self.appendix {
            out.push_str(&format!(
                "![Figure {}: {}](appendix/{})\n\n",
                figure.number,
                figure.caption,
                figure.file_name()
            ));
        }
        out
    }

    /// JSON rendering of the document text (appendix bitmaps are
    /// written separately as PNG files).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample_store() -> ImageStore {
        let mut store = ImageStore::new();
        store.add_decoded("boiler.jpg", RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255])));
        store.add_decoded("flange.jpg", RgbaImage::from_pixel(6, 6, Rgba([2, 2, 2, 255])));
        store.update_description(1, "rusted flange").unwrap();
        store
    }

    fn sample_results() -> Vec<AssessmentResult> {
        vec![
            AssessmentResult {
                component_type: "Boiler".into(),
                condition_grade: ConditionGrade::Poor,
                condition_description: "Extensive rust.".into(),
                maintenance_recommendations: "Replace.".into(),
            },
            AssessmentResult {
                component_type: "Pipe Flange".into(),
                condition_grade: ConditionGrade::Fair,
                condition_description: "Surface corrosion.".into(),
                maintenance_recommendations: "Monitor.".into(),
            },
        ]
    }

    fn sample_text() -> ReportText {
        ReportText {
            introduction: "Two components were assessed.".into(),
            summary: "Overall fair condition.".into(),
        }
    }

    #[test]
    fn test_sections_follow_upload_order() {
        let store = sample_store();
        let doc = ReportDocument::compile(
            "123 Main Street",
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            &store,
            &sample_results(),
            &sample_text(),
        )
        .unwrap();

        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].component_type, "Boiler");
        assert_eq!(doc.sections[1].component_type, "Pipe Flange");
        assert_eq!(doc.sections[1].figure, 2);
    }

    #[test]
    fn test_appendix_uses_original_bitmaps_and_captions() {
        let store = sample_store();
        let doc = ReportDocument::compile(
            "123 Main Street",
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            &store,
            &sample_results(),
            &sample_text(),
        )
        .unwrap();

        assert_eq!(doc.appendix[0].caption, "Boiler");
        assert_eq!(doc.appendix[1].caption, "Pipe Flange (rusted flange)");
        assert_eq!(doc.appendix[0].image, *store.get(0).unwrap().original());
        assert_eq!(doc.appendix[1].file_name(), "figure-2.png");
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let store = sample_store();
        let result = ReportDocument::compile(
            "x",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            &store,
            &sample_results()[..1],
            &sample_text(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_markdown_and_editing_in_place() {
        let store = sample_store();
        let mut doc = ReportDocument::compile(
            "123 Main Street",
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            &store,
            &sample_results(),
            &sample_text(),
        )
        .unwrap();

        let md = doc.to_markdown();
        assert!(md.contains("**Address:** 123 Main Street"));
        assert!(md.contains("## Component 2: Pipe Flange"));
        assert!(md.contains("rusted flange"));

        doc.introduction = "Edited introduction.".to_string();
        doc.sections[0].maintenance_recommendations = "Overhaul immediately.".to_string();
        let md = doc.to_markdown();
        assert!(md.contains("Edited introduction."));
        assert!(md.contains("Overhaul immediately."));
    }

    #[test]
    fn test_drawing_sentinel_renders_ungraded() {
        let mut store = ImageStore::new();
        store.add_decoded("sketch.png", RgbaImage::new(4, 4));
        let results = vec![AssessmentResult {
            component_type: "Sketch".into(),
            condition_grade: ConditionGrade::Drawing,
            condition_description: "Only the red annotation is visible.".into(),
            maintenance_recommendations: "Retake the photograph.".into(),
        }];
        let doc = ReportDocument::compile(
            "x",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            &store,
            &results,
            &sample_text(),
        )
        .unwrap();
        assert!(doc.to_markdown().contains("not graded"));
    }

    #[test]
    fn test_json_skips_bitmaps() {
        let store = sample_store();
        let doc = ReportDocument::compile(
            "123 Main Street",
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            &store,
            &sample_results(),
            &sample_text(),
        )
        .unwrap();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"caption\""));
        assert!(!json.contains("\"image\""));
    }
}
