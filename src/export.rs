//! CSV, Excel and PDF export of the panelist list.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb};
use rust_xlsxwriter::{Color as XlsxColor, Format, FormatBorder, Workbook};

use crate::error::{AppError, Result};
use crate::models::Panelist;

/// Column headers shared by every export format.
pub const HEADERS: [&str; 7] = [
    "Nom",
    "Email",
    "Contact",
    "Poste",
    "Organisation",
    "Domaines",
    "Expérience",
];

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    fn filter_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV Files",
            ExportFormat::Excel => "Excel Files",
            ExportFormat::Pdf => "PDF Files",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("panelistes.{}", self.extension())
    }
}

/// One flattened export row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub name: String,
    pub email: String,
    pub contact: String,
    pub poste: String,
    pub organisation: String,
    pub domains: String,
    pub experience: String,
}

impl ExportRow {
    fn cells(&self) -> [&str; 7] {
        [
            &self.name,
            &self.email,
            &self.contact,
            &self.poste,
            &self.organisation,
            &self.domains,
            &self.experience,
        ]
    }
}

impl From<&Panelist> for ExportRow {
    fn from(p: &Panelist) -> Self {
        Self {
            name: p.export_name(),
            email: p.email.clone(),
            contact: p.contact.clone(),
            poste: p.poste.clone(),
            organisation: p.organisation.clone(),
            domains: p.domains_full(),
            experience: p.experience_label(),
        }
    }
}

/// Flatten panelists into export rows, keeping list order.
pub fn export_rows(panelists: &[Panelist]) -> Vec<ExportRow> {
    panelists.iter().map(ExportRow::from).collect()
}

/// Write panelists to `path` in the given format.
pub fn export_panelists(format: ExportFormat, panelists: &[Panelist], path: &Path) -> Result<()> {
    let rows = export_rows(panelists);
    match format {
        ExportFormat::Csv => export_to_csv(&rows, path),
        ExportFormat::Excel => export_to_excel(&rows, path),
        ExportFormat::Pdf => export_to_pdf(&rows, path),
    }?;
    tracing::info!("Exported {} panelists to {:?}", rows.len(), path);
    Ok(())
}

/// Semicolon-delimited UTF-8 CSV with the fixed header row.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(b';')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(HEADERS)?;
    for row in rows {
        csv.write_record(row.cells())?;
    }
    csv.flush()?;
    Ok(())
}

pub fn export_to_csv(rows: &[ExportRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, BufWriter::new(file))
}

/// Export panelists to an Excel workbook with one "Panelistes" sheet.
pub fn export_to_excel(rows: &[ExportRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Panelistes")?;

    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_background_color(XlsxColor::RGB(0x16A085))
        .set_font_color(XlsxColor::White)
        .set_border(FormatBorder::Thin);

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    // Column widths
    worksheet.set_column_width(0, 30)?; // Nom
    worksheet.set_column_width(1, 32)?; // Email
    worksheet.set_column_width(2, 16)?; // Contact
    worksheet.set_column_width(3, 25)?; // Poste
    worksheet.set_column_width(4, 30)?; // Organisation
    worksheet.set_column_width(5, 50)?; // Domaines
    worksheet.set_column_width(6, 12)?; // Expérience

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            worksheet.write_string(excel_row, col as u16, *cell)?;
        }
    }

    if !rows.is_empty() {
        worksheet.autofilter(0, 0, rows.len() as u32, (HEADERS.len() - 1) as u16)?;
    }

    // Freeze top row
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

// A4 landscape, in millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 14.0;
const HEADER_HEIGHT: f32 = 8.0;
const ROW_HEIGHT: f32 = 6.0;
const BODY_FONT_SIZE: f32 = 8.0;
const COLUMN_WIDTHS: [f32; 7] = [38.0, 48.0, 28.0, 34.0, 38.0, 58.0, 25.0];

/// Export panelists to a PDF with a title and a styled table.
pub fn export_to_pdf(rows: &[ExportRow], path: &Path) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new("Liste des Panelistes", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let mut layer = doc.get_page(page).get_layer(layer);
    layer.use_text("Liste des Panelistes", 14.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 16.0), &bold);
    layer.use_text(
        format!("Généré le {}", Local::now().format("%d/%m/%Y %H:%M")),
        BODY_FONT_SIZE,
        Mm(PAGE_WIDTH - MARGIN - 45.0),
        Mm(PAGE_HEIGHT - 16.0),
        &font,
    );

    let mut top = PAGE_HEIGHT - 20.0;
    draw_header_row(&layer, &bold, top);
    top -= HEADER_HEIGHT;

    for row in rows {
        if top - ROW_HEIGHT < MARGIN {
            let (page, new_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
            layer = doc.get_page(page).get_layer(new_layer);
            top = PAGE_HEIGHT - MARGIN;
            draw_header_row(&layer, &bold, top);
            top -= HEADER_HEIGHT;
        }
        draw_body_row(&layer, &font, top, &row.cells());
        top -= ROW_HEIGHT;
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file)).map_err(pdf_error)?;
    Ok(())
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::export(e.to_string())
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

fn rect(left: f32, top: f32, width: f32, height: f32) -> Polygon {
    let points = vec![
        (Point::new(Mm(left), Mm(top)), false),
        (Point::new(Mm(left + width), Mm(top)), false),
        (Point::new(Mm(left + width), Mm(top - height)), false),
        (Point::new(Mm(left), Mm(top - height)), false),
    ];
    Polygon {
        rings: vec![points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

fn draw_header_row(layer: &PdfLayerReference, font: &IndirectFontRef, top: f32) {
    let width: f32 = COLUMN_WIDTHS.iter().sum();
    layer.set_fill_color(rgb(22, 160, 133));
    layer.add_polygon(rect(MARGIN, top, width, HEADER_HEIGHT));

    layer.set_fill_color(rgb(255, 255, 255));
    let mut left = MARGIN;
    for (header, col_width) in HEADERS.iter().zip(COLUMN_WIDTHS) {
        layer.use_text(*header, BODY_FONT_SIZE, Mm(left + 1.5), Mm(top - 5.5), font);
        left += col_width;
    }
    layer.set_fill_color(rgb(0, 0, 0));
}

fn draw_body_row(layer: &PdfLayerReference, font: &IndirectFontRef, top: f32, cells: &[&str; 7]) {
    let mut left = MARGIN;
    for (cell, col_width) in cells.iter().zip(COLUMN_WIDTHS) {
        layer.use_text(fit_cell(cell, col_width), BODY_FONT_SIZE, Mm(left + 1.5), Mm(top - 4.2), font);
        left += col_width;
    }

    let width: f32 = COLUMN_WIDTHS.iter().sum();
    layer.set_outline_color(rgb(220, 220, 220));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(top - ROW_HEIGHT)), false),
            (Point::new(Mm(MARGIN + width), Mm(top - ROW_HEIGHT)), false),
        ],
        is_closed: false,
    });
}

/// Truncate text to what fits in a column at the body font size.
fn fit_cell(text: &str, col_width: f32) -> String {
    // Helvetica averages about half an em per glyph; 1 pt = 0.3528 mm.
    let glyph_mm = BODY_FONT_SIZE * 0.5 * 0.3528;
    let max_chars = ((col_width - 3.0) / glyph_mm).floor().max(4.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}

/// Open save file dialog and return selected path.
pub fn show_save_dialog(format: ExportFormat, directory: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_file_name(format.default_file_name())
        .add_filter(format.filter_name(), &[format.extension()]);
    if let Some(dir) = directory {
        dialog = dialog.set_directory(dir);
    }
    dialog.save_file()
}
