//! CSV serialization of a node's credit log.

use std::io::Write;

use crate::node_state::CreditRecord;

/// Writes the fixed-order header row `Date, Timestamp, Uptime credited,
/// Elapsed time, Downtime, Note` followed by one row per credit record.
pub fn write_credit_log<W: Write>(writer: W, records: &[CreditRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Date",
        "Timestamp",
        "Uptime credited",
        "Elapsed time",
        "Downtime",
        "Note",
    ])?;
    for record in records {
        csv_writer.write_record(&[
            record.date(),
            record.timestamp.to_string(),
            record.credited.to_string(),
            record.elapsed.to_string(),
            record.downtime.to_string(),
            record.note.clone(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
