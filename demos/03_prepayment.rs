/// prepay a loan under both rewrite strategies
use std::sync::Arc;

use loan_servicing_rs::{
    Engine, EngineConfig, Loan, Money, PrepayStrategy, Product, Rate, RepayInfo, ScheduleStatus,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(EngineConfig::offline());

    let product = Product::personal_loan(1, "cash loan", Rate::from_percentage(12));
    engine.register_product(product.clone(), vec![]);
    let product = Arc::new(product);

    // term reduction: the tail of the plan is cleared back to front
    let loan = Loan::new(
        1001,
        Money::from_major(10_000),
        10,
        Arc::clone(&product),
        engine.config(),
    )?;
    let mut extra = engine.build_schedules(loan)?;
    let remaining = engine.repay(
        &mut extra,
        &RepayInfo {
            amount: Money::from_major(5_000),
            strategy: PrepayStrategy::TermReduction,
        },
    )?;
    let open = extra
        .schedules
        .iter()
        .filter(|s| s.status == ScheduleStatus::Unpaid)
        .count();
    println!("term reduction: {open} periods left, surplus {remaining}");

    // payment reduction: same period count over a smaller principal
    let loan = Loan::new(
        1002,
        Money::from_major(10_000),
        10,
        Arc::clone(&product),
        engine.config(),
    )?;
    let mut extra = engine.build_schedules(loan)?;
    let before = extra.schedules[0].total_due;
    engine.repay(
        &mut extra,
        &RepayInfo {
            amount: Money::from_major(4_000),
            strategy: PrepayStrategy::PaymentReduction,
        },
    )?;
    let after = extra
        .schedules
        .iter()
        .find(|s| s.status == ScheduleStatus::Unpaid)
        .map(|s| s.total_due)
        .unwrap_or(Money::ZERO);
    println!("payment reduction: installment {before} -> {after}");

    Ok(())
}
