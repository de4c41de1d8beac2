//! Export page assembly and annotation reprojection.
//!
//! Building an export page lays the sheet out fresh at export resolution
//! (table, frame numbers, a newly rendered waveform column) and then
//! reprojects the live annotation overlay onto it. Reprojection is pure
//! coordinate math between the two table geometries; it never rescales a
//! rendered bitmap, so the export stays sharp at any page size.
//!
//! The page itself is backend-neutral: a table description plus a flat
//! draw-command list. Producing actual PDF bytes or raster pages is the
//! [`PdfRasterizer`] collaborator's job.

use anyhow::Result;
use image::RgbaImage;
use log::{debug, info};

use crate::core::timeline::TimelineModel;
use crate::entities::drawing::DrawingObject;
use crate::entities::project::{ColumnKind, Metadata, Project, RowCells, COLUMNS};
use crate::render::surface::{draw_object_uniform, DrawCmd, RecordingSurface};
use crate::waveform::{render_waveform, WaveformLayout, WaveformStyle};

/// Reprojected stroke widths never go below this, so hairlines survive
/// aggressive downscaling.
pub const MIN_EXPORT_LINE_WIDTH: f32 = 0.5;

/// Vertical metrics of the live sheet, in live content px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetLayout {
    pub row_height: f32,
    pub header_height: f32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self { row_height: 22.0, header_height: 28.0 }
    }
}

impl SheetLayout {
    /// Total table width from the shared column layout.
    pub fn table_width() -> f32 {
        COLUMNS.iter().map(|c| c.width).sum()
    }

    /// Left edge of a column, from the shared widths.
    pub fn column_x(index: usize) -> f32 {
        COLUMNS.iter().take(index).map(|c| c.width).sum()
    }

    /// `(left, width)` of the waveform column.
    pub fn waveform_column() -> (f32, f32) {
        let index = COLUMNS
            .iter()
            .position(|c| c.kind == ColumnKind::Waveform)
            .unwrap_or(0);
        (Self::column_x(index), COLUMNS[index].width)
    }

    pub fn geometry(&self, frame_count: usize) -> TableGeometry {
        TableGeometry {
            width: Self::table_width(),
            header_height: self.header_height,
            body_height: frame_count as f32 * self.row_height,
        }
    }
}

/// Visual weight of a horizontal row rule. Every fps-th row boundary
/// marks a second, every eighth a traditional sheet subdivision. The live
/// grid and the export table share this weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRule {
    Second,
    Eighth,
    Plain,
}

impl RowRule {
    pub fn for_row(index: usize, fps: f64) -> Self {
        let fps_rows = (fps.round() as usize).max(1);
        if index % fps_rows == 0 {
            RowRule::Second
        } else if index % 8 == 0 {
            RowRule::Eighth
        } else {
            RowRule::Plain
        }
    }

    pub fn line_width(self) -> f32 {
        match self {
            RowRule::Second => 1.5,
            RowRule::Eighth => 1.0,
            RowRule::Plain => 0.5,
        }
    }
}

/// Outer box of a laid-out sheet table: header strip above a body of
/// frame rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableGeometry {
    pub width: f32,
    pub header_height: f32,
    pub body_height: f32,
}

/// Horizontal and vertical scale between two table geometries.
///
/// `x` maps full table width to full table width; `y` maps body height to
/// body height, header excluded, because header heights do not scale with
/// row count. `None` when either geometry is degenerate; the caller skips
/// annotation reprojection and keeps the table.
pub fn scale_factors(live: &TableGeometry, export: &TableGeometry) -> Option<(f32, f32)> {
    if live.width <= 0.0 || live.body_height <= 0.0 || export.width <= 0.0
        || export.body_height <= 0.0
    {
        return None;
    }
    Some((export.width / live.width, export.body_height / live.body_height))
}

/// Reprojected stroke width: the base width scaled by the geometric mean
/// of the two axis factors, clamped to `[0.5, 2 * base]`.
pub fn export_line_width(base: f32, sx: f32, sy: f32) -> f32 {
    (base * (sx * sy).abs().sqrt()).clamp(MIN_EXPORT_LINE_WIDTH, 2.0 * base)
}

/// Map one live overlay point into export body space.
fn reproject_point(
    x: f32,
    y: f32,
    live: &TableGeometry,
    export: &TableGeometry,
    sx: f32,
    sy: f32,
) -> [f32; 2] {
    [x * sx, export.header_height + (y - live.header_height) * sy]
}

/// One body row of the export table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// 1-based frame number as printed in both Fr columns.
    pub frame_number: usize,
    pub cells: RowCells,
}

/// A fully laid-out export page: header metadata, table content and the
/// flat overlay draw list, all in export page coordinates.
#[derive(Debug, Clone)]
pub struct ExportPage {
    pub project_name: String,
    pub metadata: Metadata,
    pub geometry: TableGeometry,
    pub row_height: f32,
    pub rows: Vec<ExportRow>,
    /// Waveform column followed by reprojected annotations, paint order.
    pub commands: Vec<DrawCmd>,
}

/// Turns export pages into raster images (and, downstream, PDF bytes).
pub trait PdfRasterizer {
    fn rasterize_page(&mut self, page: &ExportPage) -> Result<RgbaImage>;
}

/// Geometry knobs for one export run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportLayout {
    pub width: f32,
    pub header_height: f32,
    pub row_height: f32,
}

impl Default for ExportLayout {
    fn default() -> Self {
        // A4 portrait at 72 dpi, minus margins.
        Self { width: 523.0, header_height: 40.0, row_height: 18.0 }
    }
}

/// Lay out the whole sheet as one export page.
pub fn build_export_page(
    project: &Project,
    live: &SheetLayout,
    export: &ExportLayout,
) -> ExportPage {
    let live_geom = live.geometry(project.frame_count);
    let export_geom = TableGeometry {
        width: export.width,
        header_height: export.header_height,
        body_height: project.frame_count as f32 * export.row_height,
    };

    let rows: Vec<ExportRow> = project
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| ExportRow { frame_number: i + 1, cells: cells.clone() })
        .collect();

    let mut commands = Vec::new();
    render_export_waveform(project, export, &export_geom, &mut commands);
    reproject_annotations(project, &live_geom, &export_geom, &mut commands);

    info!(
        "export page: {} rows, {} draw command(s)",
        rows.len(),
        commands.len()
    );

    ExportPage {
        project_name: project.project_name.clone(),
        metadata: project.metadata.clone(),
        geometry: export_geom,
        row_height: export.row_height,
        rows,
        commands,
    }
}

/// Render the waveform column fresh at export resolution. The live strip
/// is never reused or rescaled.
fn render_export_waveform(
    project: &Project,
    export: &ExportLayout,
    export_geom: &TableGeometry,
    out: &mut Vec<DrawCmd>,
) {
    let Some(envelope) = project.envelope.as_ref() else {
        return;
    };
    if envelope.is_empty() {
        return;
    }

    let timeline = TimelineModel::new(project.frame_count, project.metadata.fps, project.audio.duration);
    let x_scale = export_geom.width / SheetLayout::table_width();
    let (live_col_x, live_col_w) = SheetLayout::waveform_column();
    let col_x = live_col_x * x_scale;
    let col_w = live_col_w * x_scale;

    let total_height = timeline.total_pixel_height(export.row_height) as f32;
    let layout = WaveformLayout::unclipped(col_w, export.row_height, total_height);
    let mut rec = RecordingSurface::default();
    // No playhead on paper.
    render_waveform(envelope, &timeline, &layout, &WaveformStyle::default(), None, &mut rec);
    out.extend(translate_commands(rec.commands, col_x, export_geom.header_height));
}

/// Reproject every visible annotation into export space. Degenerate
/// geometry (no scale factors or an empty object) is skipped; the table
/// itself is unaffected.
fn reproject_annotations(
    project: &Project,
    live_geom: &TableGeometry,
    export_geom: &TableGeometry,
    out: &mut Vec<DrawCmd>,
) {
    let Some((sx, sy)) = scale_factors(live_geom, export_geom) else {
        debug!("degenerate table geometry, skipping annotation reprojection");
        return;
    };

    for layer in project.drawing.visible_layers() {
        for obj in &layer.objects {
            if obj.points.is_empty() {
                continue;
            }
            let mut projected: DrawingObject = obj.clone();
            for p in &mut projected.points {
                let [x, y] = reproject_point(p.x, p.y, live_geom, export_geom, sx, sy);
                p.x = x;
                p.y = y;
            }
            let width = export_line_width(obj.style.width, sx, sy);
            let mut rec = RecordingSurface::default();
            draw_object_uniform(&projected, width, &mut rec);
            out.extend(rec.commands);
        }
    }
}

fn translate_commands(commands: Vec<DrawCmd>, dx: f32, dy: f32) -> Vec<DrawCmd> {
    commands
        .into_iter()
        .map(|cmd| match cmd {
            DrawCmd::Polyline { mut points, stroke } => {
                for p in &mut points {
                    p[0] += dx;
                    p[1] += dy;
                }
                DrawCmd::Polyline { points, stroke }
            }
            DrawCmd::Polygon { mut points, fill, stroke } => {
                for p in &mut points {
                    p[0] += dx;
                    p[1] += dy;
                }
                DrawCmd::Polygon { points, fill, stroke }
            }
        })
        .collect()
}
