/// settle installments through the repayment waterfall
use std::sync::Arc;

use loan_servicing_rs::{
    Engine, EngineConfig, Loan, Money, PrepayStrategy, Product, Rate, RepayInfo,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(EngineConfig::offline());

    let product = Product::personal_loan(1, "cash loan", Rate::from_percentage(10));
    engine.register_product(product.clone(), vec![]);

    let loan = Loan::new(
        1001,
        Money::from_major(6_000),
        6,
        Arc::new(product),
        engine.config(),
    )?;
    let mut extra = engine.build_schedules(loan)?;

    // pay the first installment exactly
    let due = extra.schedules[0].total_due;
    let remaining = engine.repay(
        &mut extra,
        &RepayInfo {
            amount: due,
            strategy: PrepayStrategy::NotPrepay,
        },
    )?;
    println!("paid {due}, surplus {remaining}");
    println!("period 1 status: {:?}", extra.schedules[0].status);

    // a short payment leaves the row partially settled and errors
    let due = extra.schedules[1].total_due - Money::from_major(100);
    match engine.repay(
        &mut extra,
        &RepayInfo {
            amount: due,
            strategy: PrepayStrategy::NotPrepay,
        },
    ) {
        Err(err) => println!("short payment rejected: {err}"),
        Ok(_) => unreachable!(),
    }
    println!(
        "period 2 partially settled: {} of {}",
        extra.schedules[1].total_paid, extra.schedules[1].total_due
    );

    Ok(())
}
