//! Turns one record into one document by walking a [`LayoutSpec`].

use log::debug;

use crate::document::{Cell, DocumentBuilder, ImageItem, Item, PageWriter, RenderedDocument};
use crate::error::{FieldFormatError, RenderFailure};
use crate::format::truncate;
use crate::layout::{
    Binding, HorizontalAlignment, LabelValueBlock, LayoutSpec, Section, TableSection, TextBlock,
    TotalsSection,
};
use crate::logo::LogoAsset;
use crate::record::Record;

/// Resolves the text a binding produces for `record`.
pub fn resolve(binding: &Binding, record: &Record) -> Result<String, FieldFormatError> {
    match binding {
        Binding::Blank => Ok(String::new()),
        Binding::Literal(text) => Ok(text.clone()),
        Binding::Field { name, format } => format.apply(name, record.get(name)),
        Binding::Joined(names) => Ok(record.joined(names)),
        Binding::Prefixed(prefix, inner) => {
            let text = resolve(inner, record)?;
            if text.is_empty() {
                Ok(text)
            } else {
                Ok(format!("{prefix}{text}"))
            }
        }
        Binding::Lines(lines) => {
            let mut resolved = Vec::with_capacity(lines.len());
            for line in lines {
                let text = resolve(line, record)?;
                if !text.is_empty() {
                    resolved.push(text);
                }
            }
            Ok(resolved.join("\n"))
        }
    }
}

/// Name under which a record shows up in logs and failure reports: the first
/// non-blank identity field, or `row N`.
pub fn identity(record: &Record, layout: &LayoutSpec) -> String {
    layout
        .identity_fields()
        .iter()
        .map(|field| record.text(field))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| format!("row {}", record.row()))
}

/// Renders `record` with `layout`, placing `logo` in the header of every page.
///
/// The result depends only on the three inputs. A field that cannot be
/// formatted fails this record alone with a [`RenderFailure`].
pub fn render(
    record: &Record,
    layout: &LayoutSpec,
    logo: Option<&LogoAsset>,
) -> Result<RenderedDocument, RenderFailure> {
    let identity = identity(record, layout);
    let document = draw(record, layout, logo, &identity).map_err(|err| RenderFailure {
        identity: identity.clone(),
        row: record.row(),
        cause: err.into(),
    })?;
    debug!(
        "Rendered {} (row {}) into {} page(s) with layout `{}`",
        identity,
        record.row(),
        document.pages().len(),
        layout.name()
    );
    Ok(document)
}

fn draw(
    record: &Record,
    layout: &LayoutSpec,
    logo: Option<&LogoAsset>,
    identity: &str,
) -> Result<RenderedDocument, FieldFormatError> {
    let header = *layout.header();
    let mut builder = DocumentBuilder::new(*layout.page())
        .with_title(format!("{} {}", layout.title(), identity));

    builder = match logo.cloned() {
        Some(logo) => builder.with_header(header.height_mm, move |_page| {
            let placement = header.logo;
            vec![Item::Image(ImageItem {
                x: placement.x_mm,
                y: placement.y_mm,
                width: placement.width_mm,
                height: logo.height_for_width(placement.width_mm),
                logo: logo.clone(),
            })]
        }),
        None => builder.with_header(header.height_mm, |_page| Vec::new()),
    };

    let mut writer = builder.build();
    for section in layout.sections() {
        match section {
            Section::Text(block) => draw_text(&mut writer, block, record)?,
            Section::LabelValue(block) => draw_label_value(&mut writer, block, record)?,
            Section::Table(table) => draw_table(&mut writer, table, record)?,
            Section::Totals(totals) => draw_totals(&mut writer, totals, record)?,
            Section::Spacer(height) => writer.advance(*height),
        }
    }
    Ok(writer.finish())
}

fn split_lines(text: &str, max_chars: Option<usize>) -> Vec<String> {
    text.split('\n')
        .map(|line| truncate(line, max_chars))
        .collect()
}

fn draw_text(
    writer: &mut PageWriter,
    block: &TextBlock,
    record: &Record,
) -> Result<(), FieldFormatError> {
    let lines = block
        .lines
        .iter()
        .map(|line| resolve(line, record))
        .collect::<Result<Vec<_>, _>>()?;

    let geometry = *writer.geometry();
    writer.ensure_space(block.line_height * lines.len() as f64);
    for text in lines {
        let y = writer.cursor_y();
        writer.push(Item::Cell(Cell {
            x: geometry.margins.left,
            y,
            width: geometry.content_width(),
            height: block.line_height,
            lines: vec![text],
            line_height: block.line_height,
            font: block.font,
            align: block.align,
            border: false,
            fill: None,
        }));
        writer.advance(block.line_height);
    }
    Ok(())
}

fn draw_label_value(
    writer: &mut PageWriter,
    block: &LabelValueBlock,
    record: &Record,
) -> Result<(), FieldFormatError> {
    let rows = block
        .rows
        .iter()
        .map(|(label, value)| Ok((label.clone(), resolve(value, record)?)))
        .collect::<Result<Vec<_>, FieldFormatError>>()?;

    let x = writer
        .geometry()
        .start_x(block.anchor, block.label_width + block.value_width);
    writer.ensure_space(block.row_height * rows.len() as f64);
    for (label, value) in rows {
        let y = writer.cursor_y();
        writer.push(Item::Cell(Cell {
            x,
            y,
            width: block.label_width,
            height: block.row_height,
            lines: vec![label],
            line_height: block.row_height,
            font: block.label_font,
            align: HorizontalAlignment::Left,
            border: block.border,
            fill: None,
        }));
        writer.push(Item::Cell(Cell {
            x: x + block.label_width,
            y,
            width: block.value_width,
            height: block.row_height,
            lines: vec![value],
            line_height: block.row_height,
            font: block.value_font,
            align: HorizontalAlignment::Left,
            border: block.border,
            fill: None,
        }));
        writer.advance(block.row_height);
    }
    Ok(())
}

fn draw_table(
    writer: &mut PageWriter,
    table: &TableSection,
    record: &Record,
) -> Result<(), FieldFormatError> {
    let values = table
        .columns
        .iter()
        .map(|column| {
            resolve(&column.binding, record).map(|text| split_lines(&text, column.max_chars))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let line_count = values.iter().map(Vec::len).max().unwrap_or(1).max(1);
    let body_height = table.row_height * line_count as f64;
    writer.ensure_space(table.header_height + body_height);

    let start_x = writer.geometry().start_x(table.anchor, table.total_width());
    let header_y = writer.cursor_y();
    let mut x = start_x;
    for column in &table.columns {
        writer.push(Item::Cell(Cell {
            x,
            y: header_y,
            width: column.width,
            height: table.header_height,
            lines: vec![column.header.clone()],
            line_height: table.header_height,
            font: table.header_font,
            align: HorizontalAlignment::Center,
            border: true,
            fill: table.header_fill,
        }));
        x += column.width;
    }
    writer.advance(table.header_height);

    let body_y = writer.cursor_y();
    let mut x = start_x;
    for (column, lines) in table.columns.iter().zip(values) {
        writer.push(Item::Cell(Cell {
            x,
            y: body_y,
            width: column.width,
            height: body_height,
            lines,
            line_height: table.row_height,
            font: table.body_font,
            align: column.align,
            border: true,
            fill: None,
        }));
        x += column.width;
    }
    writer.advance(body_height);
    Ok(())
}

fn draw_totals(
    writer: &mut PageWriter,
    totals: &TotalsSection,
    record: &Record,
) -> Result<(), FieldFormatError> {
    let values = totals
        .bindings
        .iter()
        .map(|binding| resolve(binding, record))
        .collect::<Result<Vec<_>, _>>()?;

    writer.ensure_space(totals.row_height);
    let y = writer.cursor_y();
    let mut x = writer.geometry().start_x(totals.anchor, totals.total_width());
    for (width, text) in totals.widths.iter().zip(values) {
        writer.push(Item::Cell(Cell {
            x,
            y,
            width: *width,
            height: totals.row_height,
            lines: vec![text],
            line_height: totals.row_height,
            font: totals.font,
            align: HorizontalAlignment::Center,
            border: true,
            fill: None,
        }));
        x += width;
    }
    writer.advance(totals.row_height);
    Ok(())
}
