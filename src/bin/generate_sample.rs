use anyhow::{Context, Result};

/// SplitMix64 stream; enough randomness for plausible-looking listings.
struct ListingRng(u64);

impl ListingRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform index in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.unit() * n as f64) as usize
    }

    fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        options[self.below(options.len())]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }

    /// Normal noise via the polar Marsaglia method.
    fn noise(&mut self, std_dev: f64) -> f64 {
        loop {
            let u = 2.0 * self.unit() - 1.0;
            let v = 2.0 * self.unit() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return std_dev * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }
}

/// (model, type, base price in dollars)
const MODELS: [(&str, &str, f64); 10] = [
    ("ford f-150", "pickup", 24000.0),
    ("chevrolet silverado 1500", "pickup", 23000.0),
    ("ram 1500", "truck", 25000.0),
    ("toyota camry", "sedan", 15000.0),
    ("honda civic", "sedan", 13000.0),
    ("jeep wrangler", "SUV", 22000.0),
    ("toyota rav4", "SUV", 18000.0),
    ("honda odyssey", "mini-van", 16000.0),
    ("subaru outback", "wagon", 14000.0),
    ("ford mustang", "coupe", 17000.0),
];

const CONDITIONS: [(&str, f64); 6] = [
    ("new", 1.25),
    ("like new", 1.1),
    ("excellent", 1.0),
    ("good", 0.85),
    ("fair", 0.6),
    ("salvage", 0.35),
];

const FUELS: [&str; 5] = ["gas", "gas", "gas", "diesel", "hybrid"];

fn main() -> Result<()> {
    let mut rng = ListingRng(42);
    let rows = 5000;
    let output_path = "vehicles_us.csv";

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "price",
        "model_year",
        "model",
        "condition",
        "cylinders",
        "fuel",
        "odometer",
        "transmission",
        "type",
    ])?;

    let mut incomplete = 0;
    for _ in 0..rows {
        let (model, vehicle_type, base_price) = rng.pick(&MODELS);
        let (condition, condition_factor) = rng.pick(&CONDITIONS);
        let fuel = rng.pick(&FUELS);

        let year = 1995 + rng.below(25) as i32;
        let age = f64::from(2019 - year);
        let odometer = (age * 12000.0 + rng.noise(15000.0)).max(0.0).round();
        let price = (base_price * condition_factor * 0.9_f64.powf(age) + rng.noise(1500.0))
            .max(500.0)
            .round();
        let cylinders = rng.pick(&["4.0", "6.0", "8.0"]);

        // Real listings have holes; a few rows lose a required field.
        let mut fields = [
            price.to_string(),
            format!("{year}.0"),
            model.to_string(),
            condition.to_string(),
            cylinders.to_string(),
            fuel.to_string(),
            format!("{odometer:.1}"),
            "automatic".to_string(),
            vehicle_type.to_string(),
        ];
        if rng.chance(0.05) {
            let hole = rng.pick(&[0usize, 1, 3, 5, 6]);
            fields[hole].clear();
            incomplete += 1;
        }
        if rng.chance(0.02) {
            fields[8].clear();
        }

        writer.write_record(&fields)?;
    }
    writer.flush().context("flushing CSV writer")?;

    println!("Wrote {rows} listings ({incomplete} incomplete) to {output_path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_seeded_and_in_range() {
        let mut a = ListingRng(42);
        let mut b = ListingRng(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
            let u = a.unit();
            assert!((0.0..1.0).contains(&u));
            assert!(a.below(25) < 25);
            b.unit();
            b.below(25);
        }
        assert!(ListingRng(7).noise(1500.0).is_finite());
    }
}
