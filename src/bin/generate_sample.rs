//! Writes `sample_data.csv` and `sample_data.xlsx`: a small sales ledger with
//! a few exact duplicate rows and a few blank numeric cells, for trying the
//! cleaning actions by hand.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

const HEADERS: [&str; 5] = ["order_id", "region", "product", "units", "unit_price"];

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// One ledger row; `None` marks a blank cell.
#[derive(Clone)]
struct Order {
    id: u32,
    region: &'static str,
    product: &'static str,
    units: Option<u32>,
    unit_price: Option<f64>,
}

impl Order {
    fn fields(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.region.to_string(),
            self.product.to_string(),
            self.units.map(|u| u.to_string()).unwrap_or_default(),
            self.unit_price.map(|p| format!("{p:.2}")).unwrap_or_default(),
        ]
    }
}

fn generate(rng: &mut SimpleRng, n: u32) -> Vec<Order> {
    const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
    const PRODUCTS: [&str; 3] = ["Widget", "Gadget", "Gizmo"];

    let mut orders: Vec<Order> = (1..=n)
        .map(|id| Order {
            id,
            region: rng.pick(&REGIONS),
            product: rng.pick(&PRODUCTS),
            units: Some(1 + rng.below(40) as u32),
            unit_price: Some(2.5 + rng.below(2000) as f64 / 100.0),
        })
        .collect();

    // Blank a few numeric cells.
    for _ in 0..n / 8 {
        let i = rng.below(n as u64) as usize;
        if rng.below(2) == 0 {
            orders[i].units = None;
        } else {
            orders[i].unit_price = None;
        }
    }

    // Re-append some rows verbatim.
    for _ in 0..n / 10 {
        let i = rng.below(n as u64) as usize;
        orders.push(orders[i].clone());
    }
    orders
}

fn write_csv(path: &str, orders: &[Order]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for order in orders {
        writer.write_record(order.fields())?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_xlsx(path: &str, orders: &[Order]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    for (c, h) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *h, &bold)?;
    }
    for (r, order) in orders.iter().enumerate() {
        let r = r as u32 + 1;
        sheet.write_number(r, 0, order.id)?;
        sheet.write_string(r, 1, order.region)?;
        sheet.write_string(r, 2, order.product)?;
        if let Some(units) = order.units {
            sheet.write_number(r, 3, units)?;
        }
        if let Some(price) = order.unit_price {
            sheet.write_number(r, 4, price)?;
        }
    }
    workbook.save(path).with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let orders = generate(&mut rng, 60);

    write_csv("sample_data.csv", &orders)?;
    write_xlsx("sample_data.xlsx", &orders)?;

    println!(
        "Wrote {} rows to sample_data.csv and sample_data.xlsx",
        orders.len()
    );
    Ok(())
}
