use std::io::{self, Write};

use crate::sim::process::Telemetry;

/// Write a telemetry history to CSV format.
///
/// One line per tick, headed by [`Telemetry::COLUMNS`]; values come out of
/// [`Telemetry::values`], so the file and the struct can never drift apart.
pub fn write_telemetry<W: Write>(writer: &mut W, rows: &[Telemetry]) -> io::Result<()> {
    writeln!(writer, "{}", Telemetry::COLUMNS.join(","))?;

    for row in rows {
        let fields: Vec<String> = row.values().iter().map(|v| format!("{v:.6}")).collect();
        writeln!(writer, "{}", fields.join(","))?;
    }

    Ok(())
}

/// Write a telemetry history to a CSV file at the given path.
pub fn write_telemetry_file(path: &str, rows: &[Telemetry]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::process::Process;

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut process = Process::new();
        process.set_p(1.0);
        let rows: Vec<Telemetry> = (0..3).map(|_| process.update(0.02)).collect();

        let mut buf = Vec::new();
        write_telemetry(&mut buf, &rows).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], Telemetry::COLUMNS.join(","));
        assert_eq!(lines.len(), 4); // header + 3 data rows
        assert!(lines[1].starts_with("0.020000,"));
        assert_eq!(lines[1].split(',').count(), Telemetry::COLUMNS.len());
    }

    #[test]
    fn empty_history_writes_only_the_header() {
        let mut buf = Vec::new();
        write_telemetry(&mut buf, &[]).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
