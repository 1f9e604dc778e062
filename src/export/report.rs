//! Export report types for tracking skipped data and policy decisions.
//!
//! Every emitter records what it could not export (and why) in an
//! [`ExportReport`] instead of failing the whole run.

use serde::Serialize;
use std::fmt;

/// A report generated during an export run.
///
/// Tracks how much of the dataset made it into the output and every
/// sample or instance that was skipped along the way.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExportReport {
    /// Export format name.
    pub format: String,
    /// Dataset identifier.
    pub dataset: String,
    /// Release name.
    pub release: String,
    pub counts: ExportCounts,
    /// Issues recorded while exporting.
    pub issues: Vec<ExportIssue>,
}

impl ExportReport {
    /// Create a new empty report for an export run.
    pub fn new(
        format: impl Into<String>,
        dataset: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            format: format.into(),
            dataset: dataset.into(),
            release: release.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report and forward it to the log.
    pub fn add(&mut self, issue: ExportIssue) {
        match issue.severity {
            ExportSeverity::Warning => log::warn!("{}: {}", issue.code.as_str(), issue.message),
            ExportSeverity::Info => log::info!("{}: {}", issue.code.as_str(), issue.message),
        }
        self.issues.push(issue);
    }

    /// Count of warning-level issues (data left out of the export).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ExportSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (policy notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ExportSeverity::Info)
            .count()
    }

    /// Count of issues with the given code.
    pub fn count_code(&self, code: ExportIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }

    /// Returns true if some sample or instance was left out.
    pub fn is_partial(&self) -> bool {
        self.warning_count() > 0
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Exported {} ({}) as {}",
            self.dataset, self.release, self.format
        )?;
        writeln!(
            f,
            "  {} of {} samples, {} annotations, {} files written",
            self.counts.samples_exported,
            self.counts.samples,
            self.counts.annotations,
            self.counts.files_written
        )?;

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ExportSeverity::Warning)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ExportSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts for one export run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExportCounts {
    /// Samples in the dataset.
    pub samples: usize,
    /// Samples that produced output.
    pub samples_exported: usize,
    /// Annotations or segments written.
    pub annotations: usize,
    /// Files written, the JSON document included.
    pub files_written: usize,
}

/// A single issue recorded during export.
#[derive(Clone, Debug, Serialize)]
pub struct ExportIssue {
    pub severity: ExportSeverity,
    pub code: ExportIssueCode,
    pub message: String,
}

impl ExportIssue {
    /// Create a warning-level issue (something was not exported).
    pub fn warning(code: ExportIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ExportSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note).
    pub fn info(code: ExportIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ExportSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for export issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportSeverity {
    Warning,
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportIssueCode {
    /// Sample has no label (`annotations` is null).
    SampleNotLabeled,
    /// Sample needs a segmentation bitmap but has none.
    SampleMissingBitmap,
    /// Sample needs image dimensions but they are unknown or zero.
    SampleMissingImageSize,
    /// Annotation id has no pixels in the sample's raster.
    InstanceNotInBitmap,
    /// Annotation geometry the target format cannot express.
    UnsupportedGeometry,
    /// Bbox annotation without two corner points.
    MalformedBbox,
    /// Semantic raster does not fit 8 bits; written as 16-bit gray.
    SemanticWidenedTo16Bit,
    /// Raster holds ids not listed in the sample's annotations.
    UnannotatedPixels,
}

impl ExportIssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportIssueCode::SampleNotLabeled => "sample_not_labeled",
            ExportIssueCode::SampleMissingBitmap => "sample_missing_bitmap",
            ExportIssueCode::SampleMissingImageSize => "sample_missing_image_size",
            ExportIssueCode::InstanceNotInBitmap => "instance_not_in_bitmap",
            ExportIssueCode::UnsupportedGeometry => "unsupported_geometry",
            ExportIssueCode::MalformedBbox => "malformed_bbox",
            ExportIssueCode::SemanticWidenedTo16Bit => "semantic_widened_to_16_bit",
            ExportIssueCode::UnannotatedPixels => "unannotated_pixels",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_complete() {
        let report = ExportReport::new("coco-instance", "jane/cats", "v1.0");
        assert!(!report.is_partial());
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn warning_makes_report_partial() {
        let mut report = ExportReport::new("yolo", "jane/cats", "v1.0");
        report.add(ExportIssue::warning(
            ExportIssueCode::SampleNotLabeled,
            "sample 'a.jpg' has no label",
        ));
        assert!(report.is_partial());
        assert_eq!(report.count_code(ExportIssueCode::SampleNotLabeled), 1);
    }

    #[test]
    fn info_does_not_make_report_partial() {
        let mut report = ExportReport::new("semantic", "jane/cats", "v1.0");
        report.add(ExportIssue::info(
            ExportIssueCode::UnannotatedPixels,
            "unannotated pixels map to 0",
        ));
        assert!(!report.is_partial());
        assert_eq!(report.info_count(), 1);
    }

    #[test]
    fn display_lists_warnings() {
        let mut report = ExportReport::new("coco-panoptic", "jane/cats", "v1.0");
        report.counts = ExportCounts {
            samples: 3,
            samples_exported: 2,
            annotations: 5,
            files_written: 3,
        };
        report.add(ExportIssue::warning(
            ExportIssueCode::InstanceNotInBitmap,
            "instance 4 has no pixels",
        ));
        let text = report.to_string();
        assert!(text.contains("2 of 3 samples"));
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("instance 4 has no pixels"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ExportReport::new("yolo", "jane/cats", "v1.0");
        report.add(ExportIssue::warning(
            ExportIssueCode::UnsupportedGeometry,
            "polygon skipped",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"format\":\"yolo\""));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"unsupported_geometry\""));
    }
}
