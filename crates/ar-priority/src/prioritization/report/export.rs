use super::views::WorklistRow;
use std::io::Write;

/// Writes rows as CSV with a header row, even when there are no rows.
pub fn write_worklist_csv<W: Write>(rows: &[WorklistRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(WorklistRow::HEADERS)?;
    }
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_blank_optionals() {
        let rows = vec![WorklistRow {
            ops_item_id: "OP-007".to_string(),
            client_id: None,
            invoice_id: None,
            amount: 0.0,
            invoice_status: "open".to_string(),
            blocks_invoicing: 1,
            priority_score: 42.5,
        }];

        let mut buffer = Vec::new();
        write_worklist_csv(&rows, &mut buffer).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8 output");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("ops_item_id,client_id,invoice_id,amount,invoice_status,blocks_invoicing,priority_score")
        );
        assert_eq!(lines.next(), Some("OP-007,,,0.0,open,1,42.5"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_worklist_still_has_header() {
        let mut buffer = Vec::new();
        write_worklist_csv(&[], &mut buffer).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8 output");
        assert_eq!(text.trim_end(), WorklistRow::HEADERS.join(","));
    }
}
