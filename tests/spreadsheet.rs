use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use invoice_batch::error::InputError;
use invoice_batch::format::FieldFormat;
use invoice_batch::input::read_table;
use invoice_batch::Value;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// Style 1 is the built-in `mm-dd-yy` date format.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs>
</styleSheet>"#;

fn workbook_xml(date_1904: bool) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<workbookPr date1904="{}"/>
<sheets>
<sheet name="Billing" sheetId="1" r:id="rId1"/>
<sheet name="Archive" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#,
        if date_1904 { 1 } else { 0 }
    )
}

fn text(reference: &str, value: &str) -> String {
    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{value}</t></is></c>"#)
}

fn number(reference: &str, value: f64) -> String {
    format!(r#"<c r="{reference}"><v>{value}</v></c>"#)
}

fn date(reference: &str, serial: f64) -> String {
    format!(r#"<c r="{reference}" s="1"><v>{serial}</v></c>"#)
}

fn sheet_xml(rows: &[(u32, Vec<String>)]) -> String {
    let body: String = rows
        .iter()
        .map(|(row, cells)| format!(r#"<row r="{row}">{}</row>"#, cells.concat()))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{body}</sheetData></worksheet>"#
    )
}

/// Writes a two-sheet workbook. `Billing` has a blank third row and stores
/// its order dates as serials in the workbook's date system.
fn write_workbook(dir: &Path, date_1904: bool) -> PathBuf {
    let order_date = if date_1904 { 43830.0 } else { 45292.0 };
    let billing = sheet_xml(&[
        (
            1,
            vec![
                text("A1", "Customer_Account_Number"),
                text("B1", "Amount_Due"),
                text("C1", "Order_date"),
            ],
        ),
        (
            2,
            vec![
                text("A2", "A-100"),
                number("B2", 113.4),
                date("C2", order_date),
            ],
        ),
        (4, vec![text("A4", "A-300"), number("B4", 1196.0)]),
    ]);
    let archive = sheet_xml(&[
        (1, vec![text("A1", "Customer_Account_Number")]),
        (2, vec![text("A2", "Z-900")]),
    ]);

    let path = dir.join(if date_1904 { "billing_1904.xlsx" } else { "billing.xlsx" });
    let mut zip = ZipWriter::new(File::create(&path).expect("create workbook"));
    let options = SimpleFileOptions::default();
    let workbook = workbook_xml(date_1904);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
        ("xl/worksheets/sheet1.xml", billing.as_str()),
        ("xl/worksheets/sheet2.xml", archive.as_str()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).expect("start part");
        zip.write_all(content.as_bytes()).expect("write part");
    }
    zip.finish().expect("finish workbook");
    path
}

#[test]
fn first_sheet_is_read_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), false);

    let records = read_table(&path, None).expect("read workbook");
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.row(), 1);
    assert_eq!(first.text("Customer_Account_Number"), "A-100");
    assert_eq!(first.get("Amount_Due"), &Value::Number(113.4));
    assert_eq!(
        FieldFormat::date()
            .apply("Order_date", first.get("Order_date"))
            .unwrap(),
        "01/01/2024"
    );

    assert_eq!(records[1].row(), 3);
    assert_eq!(records[1].text("Customer_Account_Number"), "A-300");
    assert_eq!(records[1].get("Order_date"), &Value::Absent);
}

#[test]
fn named_sheet_is_selected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), false);

    let records = read_table(&path, Some("Archive")).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("Customer_Account_Number"), "Z-900");
}

#[test]
fn unknown_sheet_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), false);

    let err = read_table(&path, Some("Invoices")).unwrap_err();
    assert!(matches!(err, InputError::MissingSheet(ref name) if name == "Invoices"));
    assert_eq!(err.to_string(), "worksheet `Invoices` not found");
}

#[test]
fn workbooks_using_the_1904_date_system_print_the_same_dates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), true);

    let records = read_table(&path, None).unwrap();
    assert_eq!(records[0].get("Order_date"), &Value::Number(45292.0));
    assert_eq!(
        FieldFormat::date()
            .apply("Order_date", records[0].get("Order_date"))
            .unwrap(),
        "01/01/2024"
    );
}
