use anyhow::Result;
use contracts::domain::a031_customer::aggregate::{Customer, TransferStatus};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a031_customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_number: Option<String>,
    pub customer_num: Option<String>,
    pub name: String,
    pub account_type: Option<String>,
    pub transfer_status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Customer {
    fn from(m: Model) -> Self {
        Customer {
            id: m.id,
            account_number: m.account_number,
            customer_num: m.customer_num,
            name: m.name,
            account_type: m.account_type,
            transfer_status: m
                .transfer_status
                .as_deref()
                .map(TransferStatus::from_code),
        }
    }
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Customer>> {
    let items = Entity::find().order_by_asc(Column::Id).all(db).await?;
    Ok(items.into_iter().map(Customer::from).collect())
}

pub async fn upsert(db: &DatabaseConnection, customer: &Customer) -> Result<()> {
    let exists = Entity::find_by_id(customer.id.clone())
        .one(db)
        .await?
        .is_some();
    let active = ActiveModel {
        id: Set(customer.id.clone()),
        account_number: Set(customer.account_number.clone()),
        customer_num: Set(customer.customer_num.clone()),
        name: Set(customer.name.clone()),
        account_type: Set(customer.account_type.clone()),
        transfer_status: Set(customer.transfer_status.map(|s| s.code().to_string())),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}
