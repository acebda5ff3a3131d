use serde_json::Value;
use std::io;

use super::sections::sections;

/// Write the primary section of the output as CSV to stdout.
///
/// Secondary sections (batch failures and summary) are left to the table and
/// JSON formats so the CSV stays a single rectangular grid.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(primary) = sections(value).into_iter().next() {
        let _ = wtr.write_record(&primary.headers);
        for row in &primary.rows {
            let _ = wtr.write_record(row);
        }
    }

    let _ = wtr.flush();
}
