/// build an amortization schedule for a 12-month annuity loan
use std::sync::Arc;

use loan_servicing_rs::{
    Engine, EngineConfig, Loan, Money, Product, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // offline config: weekends-only calendar, no holiday fetch
    let mut engine = Engine::new(EngineConfig::offline());

    let product = Product::personal_loan(1, "cash loan", Rate::from_percentage(12));
    engine.register_product(product.clone(), vec![]);

    let loan = Loan::new(
        1001,
        Money::from_major(12_000),
        12,
        Arc::new(product),
        engine.config(),
    )?;
    let extra = engine.build_schedules(loan)?;

    println!("period | due date   | principal | interest | total");
    for s in &extra.schedules {
        println!(
            "{:>6} | {} | {:>9} | {:>8} | {:>8}",
            s.period,
            s.due_date.format("%Y-%m-%d"),
            s.principal,
            s.interest,
            s.total_due
        );
    }

    Ok(())
}
