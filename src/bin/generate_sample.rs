use chrono::NaiveDate;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let categories = ["Furniture", "Office Supplies", "Technology"];
    let regions = ["Central", "East", "South", "West"];
    let discounts = [0.0, 0.0, 0.0, 0.1, 0.1, 0.2, 0.3];

    // Typical ticket size and margin per category.
    let price_ranges = [
        ("Furniture", 80.0, 900.0, 0.12),
        ("Office Supplies", 5.0, 120.0, 0.25),
        ("Technology", 40.0, 1500.0, 0.18),
    ];

    let start = NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid date");
    let n_days = 730u64; // two years

    let output_path = "sample_orders.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");
    writer
        .write_record(["category", "region", "order_date", "sales", "profit", "discount"])
        .expect("Failed to write header");

    let n_orders = 2000;
    for _ in 0..n_orders {
        let category = *rng.pick(&categories);
        let region = *rng.pick(&regions);
        let &(_, lo, hi, margin) = price_ranges
            .iter()
            .find(|(name, ..)| *name == category)
            .expect("category has a price range");

        let order_date = start + chrono::Days::new(rng.next_u64() % n_days);
        let discount = *rng.pick(&discounts);
        let sales = (lo + rng.next_f64() * (hi - lo)) * (1.0 - discount);
        // Heavier discounts push some orders into the red.
        let profit = sales * (margin - discount * 0.8) + (rng.next_f64() - 0.5) * 10.0;

        writer
            .write_record([
                category,
                region,
                &order_date.format("%Y-%m-%d").to_string(),
                &format!("{sales:.2}"),
                &format!("{profit:.2}"),
                &format!("{discount:.2}"),
            ])
            .expect("Failed to write row");
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {n_orders} orders to {output_path}");
}
