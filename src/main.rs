use arm_sim::io::json::RunSummary;
use arm_sim::io::{csv, json};
use arm_sim::math_util::{gain_deg_to_rad, gain_rad_to_deg};
use arm_sim::{simulate, Process, SettleConfig, TelemetryLog, G};

use std::f64::consts::FRAC_PI_2;

use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // -----------------------------------------------------------------------
    // Arm: 4 kg tube arm on a single Falcon 500 at 20:1
    // -----------------------------------------------------------------------
    let mut process = Process::new();
    process.set_mass(4.0);
    process.set_length(1.0);
    process.set_cof(0.1);
    process.set_p(gain_deg_to_rad(0.02));
    process.set_d(gain_deg_to_rad(0.001));
    process.set_f(0.2);
    process.reset(-FRAC_PI_2);

    let dt = 1.0 / 50.0;
    let run_time = 10.0;
    let steps = (run_time / dt) as usize;

    // -----------------------------------------------------------------------
    // Run the live loop, hanging start to horizontal setpoint
    // -----------------------------------------------------------------------
    let mut log = TelemetryLog::new();
    for _ in 0..steps {
        log.push(process.update(dt));
    }
    let rows = log.drain();
    let summary = RunSummary::from_rows(&rows);

    let model = process.model();
    let gearbox = model.gearbox();
    let pid = process.pid();

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!(
        "  ARM STEP RESPONSE — {} @ {:.0}:1",
        gearbox.motor().name(),
        gearbox.ratio()
    );
    println!("====================================================================");
    println!();
    println!("  Arm Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.1} kg    Length:       {:>8.2} m",
        model.mass(),
        model.length()
    );
    println!(
        "  Inertia:       {:>8.2} kg·m² CoM:          {:>8.2} m",
        model.inertia(),
        model.centre_of_mass()
    );
    println!(
        "  Stall torque:  {:>8.1} N·m   Free speed:   {:>8.1} rad/s",
        gearbox.torque(0.0, 1.0),
        gearbox.free_speed()
    );
    println!(
        "  Gravity load:  {:>8.1} N·m   Friction cap: {:>8.2} N·m",
        G * model.mass() * model.centre_of_mass(),
        model.bearing().friction(model.mass())
    );
    println!();

    println!("  Controller");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  kP: {:>8.4} /deg   kI: {:>8.4} /deg   kD: {:>8.4} /deg",
        gain_rad_to_deg(pid.p()),
        gain_rad_to_deg(pid.i()),
        gain_rad_to_deg(pid.d())
    );
    println!(
        "  kF: {:>8.3}        izone: {:>6.1} deg   setpoint: {:>6.1} deg",
        process.f(),
        pid.izone().to_degrees(),
        pid.setpoint().to_degrees()
    );
    println!(
        "  Supply: {:>5.1} V      loop: {:>6.0} Hz    start: {:>9.1} deg",
        process.supply_voltage(),
        1.0 / dt,
        rows[0].position_deg
    );
    println!();

    println!("  Response Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Final position: {:>8.2} deg   Final error:  {:>8.2} deg",
        summary.final_position.to_degrees(),
        summary.final_error.to_degrees()
    );
    println!(
        "  Peak velocity:  {:>8.1} deg/s Peak torque:  {:>8.1} N·m",
        summary.peak_velocity.to_degrees(),
        summary.peak_motor_torque
    );
    println!(
        "  Peak output:    {:>8.3}       Run time:     {:>8.1} s",
        summary.peak_output, summary.run_time
    );
    println!();

    // -----------------------------------------------------------------------
    // Gain comparison: settle scoring from the same hanging start
    // -----------------------------------------------------------------------
    println!("  Gain Comparison (step from -90 deg)");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:<10}  {:>7}  {:>7}  {:>5}  {:>7}  {:>7}  {:>8}",
        "gains", "kP/deg", "kD/deg", "kF", "over %", "sse %", "settle s"
    );
    println!("  {}", "─".repeat(60));

    let config = SettleConfig {
        dt,
        band: 0.02,
        window: 5.0,
        window_factor: 2.0,
        max_time: 120.0,
    };

    let table = [
        ("P only", 0.02, 0.0, 0.0),
        ("PD", 0.02, 0.001, 0.0),
        ("PD + FF", 0.02, 0.001, 0.2),
        ("Hot PD", 0.05, 0.002, 0.0),
    ];

    for (label, p, d, f) in table {
        let response = simulate(
            &config,
            |process| {
                process.set_mass(4.0);
                process.set_length(1.0);
                process.set_cof(0.1);
                process.set_p(gain_deg_to_rad(p));
                process.set_d(gain_deg_to_rad(d));
                process.set_f(f);
            },
            Some(-FRAC_PI_2),
        );

        match response.metrics {
            Some(m) => println!(
                "  {:<10}  {:>7.3}  {:>7.3}  {:>5.2}  {:>7.1}  {:>7.1}  {:>8.2}",
                label,
                p,
                d,
                f,
                m.overshoot * 100.0,
                m.steady_state_error * 100.0,
                m.settling_time
            ),
            None => println!(
                "  {:<10}  {:>7.3}  {:>7.3}  {:>5.2}  {:>7}  {:>7}  {:>8}",
                label, p, d, f, "-", "-", "DNF"
            ),
        }
    }
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>6}  {:>9}  {:>10}  {:>7}  {:>7}  {:>9}  {:>6}",
        "t (s)", "pos (deg)", "vel(deg/s)", "out", "volts", "drive N·m", "phase"
    );
    println!("  {}", "─".repeat(64));

    let hold_band = 2.0_f64.to_radians();
    let sample_interval = (rows.len() / 30).max(1);
    for (i, row) in rows.iter().enumerate() {
        let print = i % sample_interval == 0 || i == rows.len() - 1;
        if !print {
            continue;
        }

        let phase = if row.output.abs() >= 1.0 {
            "SAT"
        } else if row.err.abs() > hold_band {
            "MOVE"
        } else {
            "HOLD"
        };

        println!(
            "  {:>6.2}  {:>9.2}  {:>10.2}  {:>7.3}  {:>7.2}  {:>9.2}  {:>6}",
            row.ts, row.position_deg, row.velocity_deg, row.output, row.voltage,
            row.motor_torque, phase
        );
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", rows.len(), dt);
    println!("====================================================================");
    println!();

    // -----------------------------------------------------------------------
    // Optional exports: argv[1] = telemetry CSV, argv[2] = summary JSON
    // -----------------------------------------------------------------------
    let args: Vec<String> = std::env::args().collect();
    if let Some(path) = args.get(1) {
        match csv::write_telemetry_file(path, &rows) {
            Ok(()) => println!("  telemetry CSV written to {path}"),
            Err(err) => eprintln!("  failed to write {path}: {err}"),
        }
    }
    if let Some(path) = args.get(2) {
        match json::write_summary_file(path, "arm-step-response", &summary) {
            Ok(()) => println!("  summary JSON written to {path}"),
            Err(err) => eprintln!("  failed to write {path}: {err}"),
        }
    }
}
