use crate::domain::expression::{Expr, ExpressionGraph};
use crate::utils::error::{ExportError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive calendar window covering one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn for_year(year: i32) -> Result<Self> {
        let invalid = || ExportError::ConfigError {
            message: format!("year {} is outside the supported calendar", year),
        };
        Ok(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?,
        })
    }

    /// First day after the window; date range filters on the API are half-open.
    pub fn end_exclusive(&self) -> Result<NaiveDate> {
        self.end.succ_opt().ok_or_else(|| ExportError::ConfigError {
            message: format!("no day follows {}", self.end),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskParams {
    pub year: i32,
    pub window: DateWindow,
    pub file_prefix: String,
    pub description: String,
}

/// One year's export, ready to be handed to a submitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTask {
    pub params: TaskParams,
    pub image: Expr,
    pub drive_folder: String,
    pub scale: f64,
    pub crs: String,
    pub max_pixels: u64,
}

impl ExportTask {
    pub fn to_request(&self) -> ExportImageRequest {
        // Export scale is expressed by wrapping the image, the grid carries the CRS.
        let scaled = Expr::call(
            "Image.clipToBoundsAndScale",
            [
                ("input", self.image.clone()),
                ("scale", Expr::constant(self.scale)),
            ],
        );

        ExportImageRequest {
            expression: scaled.to_graph(),
            description: self.params.description.clone(),
            file_export_options: FileExportOptions {
                file_format: "GEO_TIFF".to_string(),
                drive_destination: DriveDestination {
                    folder: self.drive_folder.clone(),
                    filename_prefix: self.params.file_prefix.clone(),
                },
            },
            grid: PixelGrid {
                crs_code: self.crs.clone(),
            },
            max_pixels: self.max_pixels.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImageRequest {
    pub expression: ExpressionGraph,
    pub description: String,
    pub file_export_options: FileExportOptions,
    pub grid: PixelGrid,
    /// int64 values travel as JSON strings.
    pub max_pixels: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileExportOptions {
    pub file_format: String,
    pub drive_destination: DriveDestination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDestination {
    pub folder: String,
    pub filename_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelGrid {
    pub crs_code: String,
}

/// Acknowledgement of a registered export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHandle {
    /// Operation resource name, e.g. `projects/p/operations/ABC`.
    pub name: String,
    pub state: Option<String>,
}

impl TaskHandle {
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedTask {
    pub year: i32,
    pub description: String,
    pub handle: TaskHandle,
    pub elapsed: Duration,
}
