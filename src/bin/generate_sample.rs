use std::path::{Path, PathBuf};

use data_plotter::config::DEFAULT_BASE_DIR;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const ROWS: usize = 500;

/// Battery / thermal telemetry sampled once per second.
fn write_telemetry(path: &Path, rng: &mut SimpleRng, drain: f64) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create telemetry file");
    writer
        .write_record(["timestamp_", "voltage", "current", "temperature", "mode"])
        .expect("Failed to write header");

    for i in 0..ROWS {
        let t = i as f64;
        let voltage = 28.0 - drain * t / ROWS as f64 + rng.gauss(0.0, 0.05);
        let current = 1.2 + 0.4 * (t / 40.0).sin() + rng.gauss(0.0, 0.02);
        let temperature = 20.0 + 0.01 * t + rng.gauss(0.0, 0.3);
        let mode = if i < ROWS / 5 { "startup" } else { "nominal" };
        // Drop a sample now and then so the viewer sees gaps.
        let temperature = if rng.next_f64() < 0.01 {
            String::new()
        } else {
            format!("{temperature:.3}")
        };
        writer
            .write_record([
                i.to_string(),
                format!("{voltage:.4}"),
                format!("{current:.4}"),
                temperature,
                mode.to_string(),
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush telemetry file");
}

/// FPGA register log: counter, error flag and a free-form message.
fn write_fpga_log(path: &Path, rng: &mut SimpleRng) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create FPGA log");
    writer
        .write_record(["timestamp_", "cycle_count", "fifo_level", "crc_error", "message"])
        .expect("Failed to write header");

    let mut cycles: u64 = 0;
    for i in 0..ROWS {
        cycles += 1_000 + rng.next_u64() % 50;
        let fifo_level = (rng.next_f64() * 256.0) as u64;
        let crc_error = rng.next_f64() < 0.02;
        let message = if crc_error {
            format!("CRC mismatch, frame {i}")
        } else {
            "ok".to_string()
        };
        writer
            .write_record([
                i.to_string(),
                cycles.to_string(),
                fifo_level.to_string(),
                crc_error.to_string(),
                message,
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush FPGA log");
}

fn main() {
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));

    let mut rng = SimpleRng::new(42);

    let telem = root.join("telem");
    let fpga = root.join("fpga");
    std::fs::create_dir_all(&telem).expect("Failed to create telem directory");
    std::fs::create_dir_all(&fpga).expect("Failed to create fpga directory");

    for (run, drain) in [(1, 0.8), (2, 1.5), (3, 2.2)] {
        write_telemetry(&telem.join(format!("run{run}.csv")), &mut rng, drain);
    }
    for board in ["board_a", "board_b"] {
        write_fpga_log(&fpga.join(format!("{board}.csv")), &mut rng);
    }

    println!(
        "Wrote 3 telemetry runs and 2 FPGA logs ({ROWS} rows each) to {}",
        root.display()
    );
}
