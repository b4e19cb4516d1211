use std::io::{self, Write};

use crate::sim::process::Telemetry;
use crate::sim::simulator::StepResponse;

/// Summary statistics computed from a telemetry history.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_time: f64,          // s
    pub final_position: f64,    // rad
    pub final_error: f64,       // rad
    pub peak_velocity: f64,     // rad/s, magnitude
    pub peak_motor_torque: f64, // N·m, magnitude
    pub peak_output: f64,       // unclamped controller total, magnitude
}

impl RunSummary {
    /// Compute a summary from a run's telemetry. The history must hold at
    /// least one row.
    pub fn from_rows(rows: &[Telemetry]) -> Self {
        let peak_velocity = rows.iter().map(|r| r.velocity.abs()).fold(0.0_f64, f64::max);
        let peak_motor_torque = rows
            .iter()
            .map(|r| r.motor_torque.abs())
            .fold(0.0_f64, f64::max);
        let peak_output = rows.iter().map(|r| r.output.abs()).fold(0.0_f64, f64::max);

        let last = rows.last().unwrap();

        RunSummary {
            run_time: last.ts,
            final_position: last.position,
            final_error: last.err,
            peak_velocity,
            peak_motor_torque,
            peak_output,
        }
    }
}

/// Write a run summary as JSON to a writer.
pub fn write_summary<W: Write>(
    writer: &mut W,
    label: &str,
    summary: &RunSummary,
) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"run\": \"{}\",", label)?;
    writeln!(writer, "  \"run_time_s\": {:.3},", summary.run_time)?;
    writeln!(writer, "  \"final_position_rad\": {:.6},", summary.final_position)?;
    writeln!(writer, "  \"final_position_deg\": {:.3},", summary.final_position.to_degrees())?;
    writeln!(writer, "  \"final_error_rad\": {:.6},", summary.final_error)?;
    writeln!(writer, "  \"peak_velocity_rad_s\": {:.4},", summary.peak_velocity)?;
    writeln!(writer, "  \"peak_motor_torque_nm\": {:.4},", summary.peak_motor_torque)?;
    writeln!(writer, "  \"peak_output\": {:.4}", summary.peak_output)?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Write a run summary JSON to a file.
pub fn write_summary_file(path: &str, label: &str, summary: &RunSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, label, summary)
}

/// Write a step-response result as JSON to a writer. Unsettled runs carry
/// `"metrics": null`.
pub fn write_step_response<W: Write>(writer: &mut W, response: &StepResponse) -> io::Result<()> {
    writeln!(writer, "{{")?;
    writeln!(writer, "  \"initial_position_rad\": {:.6},", response.initial_position)?;
    writeln!(writer, "  \"initial_position_deg\": {:.3},", response.initial_position_deg())?;
    writeln!(writer, "  \"settled\": {},", response.settled())?;
    writeln!(writer, "  \"final_time_s\": {:.3},", response.final_time)?;
    match &response.metrics {
        Some(metrics) => {
            writeln!(writer, "  \"metrics\": {{")?;
            writeln!(writer, "    \"steady_state_error\": {:.6},", metrics.steady_state_error)?;
            writeln!(writer, "    \"overshoot\": {:.6},", metrics.overshoot)?;
            writeln!(writer, "    \"settling_time_s\": {:.3}", metrics.settling_time)?;
            writeln!(writer, "  }}")?;
        }
        None => writeln!(writer, "  \"metrics\": null")?,
    }
    writeln!(writer, "}}")?;
    Ok(())
}
