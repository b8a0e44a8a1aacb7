use std::io::{Cursor, Read};

use invoice_batch::error::RenderCause;
use invoice_batch::input::read_csv;
use invoice_batch::{export, render, BatchStatus, ExportOptions, LayoutVariant};

const BILLING: &str = "\
Customer_Account_Number,Sub_Ref_No,Order,PO_Num,Term,Order_date,Bill_To_Contact_name,Bill_to_City,Bill_to_State,Bill_to_Zip,Pub_desc,Quantity,Material_Amount,Postage,Tax,Paid_Amount,Amount_Due
A-100,R-1,O-1,PO-1,30,45292,Ada Lovelace,London,,NW1,Quarterly Review,1,100.00,5.00,8.40,0,113.40
A-200,R-2,O-2,PO-2,15,45300,Alan Turing,Manchester,,M13,Monthly Digest,2,200.00,5.00,16.40,0,not a number
A-300,R-3,O-3,,,,Grace Hopper,Arlington,VA,22201,Weekly Bulletin,3,\"1,200.00\",0,96,100,\"1,196.00\"
";

fn archive_entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("readable archive");
    (0..zip.len())
        .map(|index| {
            let mut file = zip.by_index(index).expect("archive entry");
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).expect("entry bytes");
            (file.name().to_string(), bytes)
        })
        .collect()
}

#[test]
fn malformed_amount_skips_only_that_invoice() {
    let records = read_csv(BILLING.as_bytes()).expect("parse billing csv");
    assert_eq!(records.len(), 3);

    let layout = LayoutVariant::InvoiceLandscape.layout().unwrap();
    let outcome = export(&records, &layout, None, &ExportOptions::default()).expect("export");

    assert_eq!(outcome.summary(), "2/3 succeeded");
    assert_eq!(outcome.status(), BatchStatus::Partial);

    let failure = &outcome.failures()[0];
    assert_eq!(failure.identity, "A-200");
    assert_eq!(failure.row, 2);
    assert!(matches!(failure.cause, RenderCause::Field(_)));

    let entries = archive_entries(outcome.archive());
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["invoice_A-100_R-1.pdf", "invoice_A-300_R-3.pdf"]);

    for ((_, bytes), record) in entries.iter().zip([&records[0], &records[2]]) {
        let pdf = lopdf::Document::load_mem(bytes).expect("valid pdf");
        let expected = render(record, &layout, None).unwrap().pages().len();
        assert_eq!(pdf.get_pages().len(), expected);
    }
}

#[test]
fn every_layout_exports_with_a_custom_prefix() {
    let records = read_csv(BILLING.as_bytes()).unwrap();
    let options = ExportOptions::default().with_prefix("statement");
    for variant in LayoutVariant::ALL {
        let layout = variant.layout().unwrap();
        let outcome = export(&records, &layout, None, &options).unwrap();
        assert_eq!(outcome.succeeded(), 2, "{}", variant.name());
        assert!(outcome
            .entries()
            .iter()
            .all(|entry| entry.name.starts_with("statement_")));
    }
}

#[test]
fn repeated_exports_produce_identical_archives() {
    let records = read_csv(BILLING.as_bytes()).unwrap();
    let layout = LayoutVariant::Statement.layout().unwrap();
    let options = ExportOptions::default();

    let first = export(&records, &layout, None, &options).unwrap();
    let second = export(&records, &layout, None, &options).unwrap();
    assert_eq!(first.archive(), second.archive());
}

#[test]
fn shared_identity_gets_numbered_entry_names() {
    let header = BILLING.lines().next().unwrap();
    let row = "A-100,R-1,O-1,PO-1,30,45292,Ada Lovelace,London,,NW1,Quarterly Review,1,100.00,5.00,8.40,0,113.40";
    let csv = format!("{}\n{}\n{}\n{}\n", header, row, row, row);
    let records = read_csv(csv.as_bytes()).unwrap();

    let layout = LayoutVariant::InvoicePortrait.layout().unwrap();
    let outcome = export(&records, &layout, None, &ExportOptions::default()).unwrap();
    assert_eq!(outcome.status(), BatchStatus::Complete);

    let names: Vec<String> = archive_entries(outcome.archive())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(
        names,
        vec![
            "invoice_A-100_R-1.pdf",
            "invoice_A-100_R-1_2.pdf",
            "invoice_A-100_R-1_3.pdf",
        ]
    );
}
