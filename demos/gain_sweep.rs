use arm_sim::io::json;
use arm_sim::math_util::gain_deg_to_rad;
use arm_sim::{simulate, SettleConfig};

use std::f64::consts::FRAC_PI_2;

/// Sweep kP and kD over a coarse grid on a light arm and score each pair
/// from the same hanging start, then replay the best pair from a random
/// start angle.
fn main() {
    let config = SettleConfig {
        dt: 1.0 / 50.0,
        band: 0.02,
        window: 5.0,
        window_factor: 2.0,
        max_time: 120.0,
    };

    let p_grid = [0.005, 0.01, 0.02, 0.05, 0.1];
    let d_grid = [0.0, 0.001, 0.002];

    println!("Gain sweep: 4 kg arm, Falcon 500 @ 20:1, step from -90 deg");
    println!(
        "{:>7}  {:>7}  {:>8}  {:>7}  {:>7}  {:>9}",
        "kP/deg", "kD/deg", "settled", "over %", "sse %", "settle s"
    );

    let mut best: Option<(f64, f64, f64)> = None;

    for p in p_grid {
        for d in d_grid {
            let response = simulate(
                &config,
                |process| {
                    process.set_mass(4.0);
                    process.set_length(1.0);
                    process.set_cof(0.1);
                    process.set_p(gain_deg_to_rad(p));
                    process.set_d(gain_deg_to_rad(d));
                },
                Some(-FRAC_PI_2),
            );

            match response.metrics {
                Some(m) => {
                    println!(
                        "{:>7.3}  {:>7.3}  {:>8}  {:>7.1}  {:>7.1}  {:>9.2}",
                        p,
                        d,
                        "yes",
                        m.overshoot * 100.0,
                        m.steady_state_error * 100.0,
                        m.settling_time
                    );
                    // Best: fastest settle among runs that hold within 10%.
                    let better = m.steady_state_error < 0.10
                        && best.map_or(true, |(_, _, t)| m.settling_time < t);
                    if better {
                        best = Some((p, d, m.settling_time));
                    }
                }
                None => println!(
                    "{:>7.3}  {:>7.3}  {:>8}  {:>7}  {:>7}  {:>9}",
                    p, d, "no", "-", "-", "-"
                ),
            }
        }
    }

    let (p, d, _) = best.expect("no gain pair settled");
    println!();
    println!("Best pair: kP={p}/deg kD={d}/deg, replaying from a random start");

    let response = simulate(
        &config,
        |process| {
            process.set_mass(4.0);
            process.set_length(1.0);
            process.set_cof(0.1);
            process.set_p(gain_deg_to_rad(p));
            process.set_d(gain_deg_to_rad(d));
        },
        None,
    );

    println!(
        "Start {:.1} deg, settled: {}, {:.1} s of simulated time",
        response.initial_position_deg(),
        response.settled(),
        response.final_time
    );

    let mut file = std::fs::File::create("gain_sweep_best.json").expect("failed to create JSON");
    json::write_step_response(&mut file, &response).expect("failed to write JSON");
    println!("Exported: gain_sweep_best.json");
}
