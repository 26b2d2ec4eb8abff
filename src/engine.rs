use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::{Loan, LoanExtra};
use crate::product::Product;
use crate::repayment::{normal_repay, pre_repay, RepayInfo};
use crate::schedule::{annuity_schedule, equal_principal_schedule, Schedule};
use crate::types::{PrepayStrategy, RepayStyle};

/// Mutable view handed to plugins and handler functions for the duration
/// of one engine operation.
pub struct LoanContext<'a> {
    pub loan: &'a mut LoanExtra,
    /// loose parameters plugins may use to talk to each other
    pub params: HashMap<String, serde_json::Value>,
}

impl<'a> LoanContext<'a> {
    fn new(loan: &'a mut LoanExtra) -> Self {
        Self {
            loan,
            params: HashMap::new(),
        }
    }
}

/// Hook pair around schedule generation and repayment. `before_create`
/// hooks run in registration order, `after_create` in reverse; the first
/// error aborts the operation.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn before_create(&self, ctx: &mut LoanContext<'_>) -> Result<()>;
    fn after_create(&self, ctx: &mut LoanContext<'_>) -> Result<()>;
}

pub type BuildFn =
    Box<dyn Fn(&EngineConfig, &mut LoanContext<'_>) -> Result<Vec<Schedule>> + Send + Sync>;
pub type RepayFn =
    Box<dyn Fn(&EngineConfig, &mut LoanContext<'_>, &RepayInfo) -> Result<Money> + Send + Sync>;

struct Handler {
    plugins: Vec<Box<dyn Plugin>>,
    build: BuildFn,
    repay: RepayFn,
}

/// Entry point binding products to their schedule builders and repayment
/// functions. Construction fixes the configuration; registration wires one
/// handler per product id.
pub struct Engine {
    config: EngineConfig,
    handlers: HashMap<i64, Handler>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            handlers: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Bind a product and its plugin chain to the default build/repay
    /// pipeline for the product's repay style.
    pub fn register_product(&mut self, product: Product, plugins: Vec<Box<dyn Plugin>>) {
        let product = Arc::new(product);
        let product_id = product.id;

        let build_product = Arc::clone(&product);
        let build: BuildFn = Box::new(move |config, ctx| {
            let loan = &ctx.loan;
            match build_product.repay_style {
                RepayStyle::EqualInstallment => annuity_schedule(
                    loan.id(),
                    loan.loan.principal,
                    loan.loan.total_periods,
                    &build_product,
                    config,
                ),
                RepayStyle::EqualPrincipal => equal_principal_schedule(
                    loan.id(),
                    loan.loan.principal,
                    loan.loan.total_periods,
                    &build_product,
                    config,
                ),
            }
        });

        let repay: RepayFn = Box::new(move |config, ctx, info| match info.strategy {
            PrepayStrategy::NotPrepay => normal_repay(ctx.loan, info.amount, config),
            strategy => pre_repay(ctx.loan, info.amount, strategy, config),
        });

        tracing::debug!(product_id, plugins = plugins.len(), "product registered");
        self.handlers.insert(
            product_id,
            Handler {
                plugins,
                build,
                repay,
            },
        );
    }

    /// Replace the build and/or repay function for a registered product.
    pub fn set_handler_funcs(
        &mut self,
        product_id: i64,
        build: Option<BuildFn>,
        repay: Option<RepayFn>,
    ) -> Result<()> {
        let handler = self
            .handlers
            .get_mut(&product_id)
            .ok_or(LoanError::ProductNotRegistered { product_id })?;
        if let Some(build) = build {
            handler.build = build;
        }
        if let Some(repay) = repay {
            handler.repay = repay;
        }
        Ok(())
    }

    /// Generate the repayment plan for a loan and attach it to a fresh
    /// aggregate.
    pub fn build_schedules(&self, loan: Loan) -> Result<LoanExtra> {
        let handler = self.handler(loan.product.id)?;
        let mut extra = loan.into_extra();
        {
            let mut ctx = LoanContext::new(&mut extra);
            for plugin in &handler.plugins {
                plugin.before_create(&mut ctx)?;
            }
            let schedules = (handler.build)(&self.config, &mut ctx)?;
            ctx.loan.set_schedules(schedules);
            for plugin in handler.plugins.iter().rev() {
                plugin.after_create(&mut ctx)?;
            }
        }
        tracing::debug!(loan_id = extra.id(), periods = extra.schedules.len(), "schedules built");
        Ok(extra)
    }

    /// Apply a repayment to the aggregate, returning the unspent surplus.
    /// The aggregate keeps all mutations made before a failure.
    pub fn repay(&self, loan: &mut LoanExtra, info: &RepayInfo) -> Result<Money> {
        let handler = self.handler(loan.product().id)?;
        let mut ctx = LoanContext::new(loan);
        for plugin in &handler.plugins {
            plugin.before_create(&mut ctx)?;
        }
        let remaining = (handler.repay)(&self.config, &mut ctx, info)?;
        for plugin in handler.plugins.iter().rev() {
            plugin.after_create(&mut ctx)?;
        }
        Ok(remaining)
    }

    fn handler(&self, product_id: i64) -> Result<&Handler> {
        self.handlers
            .get(&product_id)
            .ok_or(LoanError::ProductNotRegistered { product_id })
    }
}
