use anyhow::Result;
use contracts::domain::a031_customer::aggregate::Customer;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::alias::{AliasTable, KeyStrength};

/// Customer lookup by ERP id, account number, customer number or name
pub struct CustomerDirectory {
    table: AliasTable<Customer>,
}

impl CustomerDirectory {
    pub fn build(customers: Vec<Customer>) -> Self {
        let mut table = AliasTable::new();
        for customer in customers {
            let id = customer.id.clone();
            table.add_key(&id, &id, KeyStrength::Strong);
            if let Some(account) = customer.account_number.as_deref() {
                table.add_key(account, &id, KeyStrength::Strong);
            }
            if let Some(num) = customer.customer_num.as_deref() {
                table.add_key(num, &id, KeyStrength::Strong);
            }
            table.add_key(&customer.name, &id, KeyStrength::Weak);
            table.insert_record(id, customer);
        }

        for ambiguous in table.ambiguities() {
            tracing::warn!(
                "Customer key '{}' is claimed by {} records ({}); lookups by it are disabled",
                ambiguous.key,
                ambiguous.claimants.len(),
                ambiguous.claimants.join(", ")
            );
        }
        Self { table }
    }

    /// Looks the customer up by the order's customer id first, then by its name
    pub fn find(&self, customer_id: &str, customer_name: &str) -> Option<&Customer> {
        self.table.resolve_any([customer_id, customer_name])
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

pub async fn load_directory(db: &DatabaseConnection) -> Result<CustomerDirectory> {
    let customers = repository::list_all(db).await?;
    tracing::info!("Loaded {} customers", customers.len());
    Ok(CustomerDirectory::build(customers))
}
