use crate::config::{Boundary, ExportConfig};
use crate::core::qa_mask::{quality_mask_function, IMAGE_ARG};
use crate::domain::expression::Expr;
use crate::domain::model::{DateWindow, ExportTask, TaskParams};
use crate::utils::error::Result;
use crate::utils::validation::validate_year_range;

impl TaskParams {
    pub fn for_year(year: i32, config: &ExportConfig) -> Result<Self> {
        Ok(Self {
            year,
            window: DateWindow::for_year(year)?,
            file_prefix: format!("{}_{}_{}", config.file_prefix, year, config.region_tag),
            description: format!(
                "{}_{}_{}",
                config.description_prefix, year, config.region_tag
            ),
        })
    }
}

impl ExportTask {
    pub fn build(year: i32, config: &ExportConfig) -> Result<Self> {
        let boundary = boundary_geometry(&config.boundary)?;
        Self::build_with_boundary(year, config, &boundary)
    }

    fn build_with_boundary(year: i32, config: &ExportConfig, boundary: &Expr) -> Result<Self> {
        let params = TaskParams::for_year(year, config)?;
        let image = annual_mean_image(config, &params.window, boundary)?;

        Ok(Self {
            params,
            image,
            drive_folder: config.drive_folder.clone(),
            scale: config.export_scale,
            crs: config.crs.clone(),
            max_pixels: config.max_pixels,
        })
    }
}

pub fn boundary_geometry(boundary: &Boundary) -> Result<Expr> {
    match boundary {
        Boundary::Table {
            table_id,
            property,
            value,
        } => {
            let table = Expr::call(
                "Collection.loadTable",
                [("tableId", Expr::constant(table_id.as_str()))],
            );
            let matching = Expr::call(
                "Collection.filter",
                [
                    ("collection", table),
                    (
                        "filter",
                        Expr::call(
                            "Filter.equals",
                            [
                                ("leftField", Expr::constant(property.as_str())),
                                ("rightValue", Expr::constant(value.as_str())),
                            ],
                        ),
                    ),
                ],
            );
            Ok(Expr::call("Collection.geometry", [("collection", matching)]))
        }
        Boundary::Polygon { coordinates } => Ok(Expr::call(
            "GeometryConstructors.Polygon",
            [("coordinates", Expr::Constant(serde_json::to_value(coordinates)?))],
        )),
    }
}

/// Masked annual mean of the AOD band in physical units, clipped to `boundary`.
///
/// The mask is mapped over every image before the temporal mean, and the scale
/// factor is applied once to the mean of the raw stored values.
pub fn annual_mean_image(config: &ExportConfig, window: &DateWindow, boundary: &Expr) -> Result<Expr> {
    let collection = Expr::call(
        "ImageCollection.load",
        [("id", Expr::constant(config.collection_id.as_str()))],
    );

    let date_range = Expr::call(
        "DateRange",
        [
            ("start", Expr::constant(window.start.to_string())),
            ("end", Expr::constant(window.end_exclusive()?.to_string())),
        ],
    );
    let in_window = filter(
        collection,
        Expr::call(
            "Filter.dateRangeContains",
            [
                ("leftValue", date_range),
                ("rightField", Expr::constant("system:time_start")),
            ],
        ),
    );

    let in_bounds = filter(
        in_window,
        Expr::call(
            "Filter.intersects",
            [
                ("leftField", Expr::constant(".all")),
                ("rightValue", boundary.clone()),
            ],
        ),
    );

    let masked = map(in_bounds, quality_mask_function(&config.qa_band));

    let band_only = map(
        masked,
        Expr::function(
            &[IMAGE_ARG],
            Expr::call(
                "Image.select",
                [
                    ("input", Expr::argument(IMAGE_ARG)),
                    ("bandSelectors", Expr::constant(vec![config.aod_band.as_str()])),
                ],
            ),
        ),
    );

    let mean = Expr::call("reduce.mean", [("collection", band_only)]);

    let scaled = Expr::call(
        "Image.multiply",
        [
            ("image1", mean),
            ("image2", Expr::image_constant(config.scale_factor)),
        ],
    );

    Ok(Expr::call(
        "Image.clip",
        [("input", scaled), ("geometry", boundary.clone())],
    ))
}

/// One task per year from `start_year` to `end_year` inclusive, ascending.
pub fn plan_tasks(config: &ExportConfig) -> Result<Vec<ExportTask>> {
    validate_year_range(config.start_year, config.end_year)?;
    let boundary = boundary_geometry(&config.boundary)?;

    config
        .years()
        .map(|year| ExportTask::build_with_boundary(year, config, &boundary))
        .collect()
}

fn filter(collection: Expr, predicate: Expr) -> Expr {
    Expr::call(
        "Collection.filter",
        [("collection", collection), ("filter", predicate)],
    )
}

fn map(collection: Expr, algorithm: Expr) -> Expr {
    Expr::call(
        "Collection.map",
        [("collection", collection), ("baseAlgorithm", algorithm)],
    )
}
