use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use contracts::domain::a030_sales_order::aggregate::SalesOrder;
use contracts::domain::a031_customer::aggregate::{Customer, TransferStatus};
use contracts::domain::a034_commission_rules::aggregate::CommissionRules;
use contracts::enums::customer_status::CustomerStatus;
use sea_orm::DatabaseConnection;

use crate::domain::a030_sales_order;
use crate::domain::a032_sales_rep::service::RepDirectory;
use crate::shared::months::{months_between, MonthPolicy};

/// Order history queries needed for status classification
#[async_trait]
pub trait OrderHistorySource: Send + Sync {
    /// Orders of the customer strictly before `before`, newest first, at most `limit`
    async fn prior_orders(
        &self,
        customer_id: &str,
        before: &NaiveDateTime,
        limit: u64,
    ) -> Result<Vec<SalesOrder>>;

    /// The customer's first order ever
    async fn first_order(&self, customer_id: &str) -> Result<Option<SalesOrder>>;
}

pub struct DbOrderHistory<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> DbOrderHistory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderHistorySource for DbOrderHistory<'_> {
    async fn prior_orders(
        &self,
        customer_id: &str,
        before: &NaiveDateTime,
        limit: u64,
    ) -> Result<Vec<SalesOrder>> {
        a030_sales_order::repository::list_prior_orders(self.db, customer_id, before, limit).await
    }

    async fn first_order(&self, customer_id: &str) -> Result<Option<SalesOrder>> {
        a030_sales_order::repository::first_order(self.db, customer_id).await
    }
}

/// Classifies the customer relationship of an order from its history
pub struct CustomerHistoryResolver<'a, H: OrderHistorySource> {
    history: &'a H,
    reps: &'a RepDirectory,
    rules: &'a CommissionRules,
    policy: MonthPolicy,
    window: u64,
}

impl<'a, H: OrderHistorySource> CustomerHistoryResolver<'a, H> {
    pub fn new(
        history: &'a H,
        reps: &'a RepDirectory,
        rules: &'a CommissionRules,
        policy: MonthPolicy,
        window: u64,
    ) -> Self {
        Self {
            history,
            reps,
            rules,
            policy,
            window: window.max(1),
        }
    }

    /// Never fails: lookup errors classify the order as `new`
    pub async fn classify(
        &self,
        customer: Option<&Customer>,
        order: &SalesOrder,
    ) -> CustomerStatus {
        match customer.and_then(|c| c.transfer_status) {
            Some(TransferStatus::Own) => return CustomerStatus::Own,
            Some(TransferStatus::Transferred) => return CustomerStatus::Transferred,
            Some(TransferStatus::Auto) | None => {}
        }

        match self.classify_from_history(order).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    "History lookup failed for customer {} (order {}): {:#}; using 'new'",
                    order.customer_id,
                    order.order_num,
                    e
                );
                CustomerStatus::New
            }
        }
    }

    async fn classify_from_history(&self, order: &SalesOrder) -> Result<CustomerStatus> {
        let current = order.posting_date;
        let prior = self
            .history
            .prior_orders(&order.customer_id, &current, self.window)
            .await?;
        let Some(last) = prior.first() else {
            return Ok(CustomerStatus::New);
        };

        let first_date = match self.history.first_order(&order.customer_id).await? {
            Some(first) => first.posting_date,
            None => prior.last().map(|o| o.posting_date).unwrap_or(last.posting_date),
        };
        let customer_age = months_between(self.policy, current, first_date);
        let since_last = months_between(self.policy, current, last.posting_date);

        if since_last >= 12 {
            return Ok(CustomerStatus::Own);
        }

        let rep = order.sales_person.as_str();
        if self.rules.apply_reorg_rule
            && current.date() >= self.rules.reorg_date
            && customer_age > 6
        {
            let changed_before_reorg = prior
                .iter()
                .filter(|o| o.posting_date.date() < self.rules.reorg_date)
                .any(|o| !self.reps.same_rep(&o.sales_person, rep));
            if changed_before_reorg {
                return Ok(CustomerStatus::Transferred);
            }
        }

        if !self.reps.same_rep(&last.sales_person, rep) {
            return Ok(CustomerStatus::Transferred);
        }

        Ok(match customer_age {
            age if age <= 6 => CustomerStatus::New,
            age if age <= 12 => CustomerStatus::SixMonth,
            _ => CustomerStatus::TwelveMonth,
        })
    }
}
