use anyhow::Result;
use contracts::domain::a030_sales_order::aggregate::OrderLineItem;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a030_order_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sales_order_id: String,
    pub product_num: String,
    pub part_number: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub total_price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OrderLineItem {
    fn from(m: Model) -> Self {
        OrderLineItem {
            id: m.id,
            sales_order_id: m.sales_order_id,
            product_num: m.product_num,
            part_number: m.part_number,
            product_name: m.product_name,
            description: m.description,
            quantity: m.quantity,
            total_price: m.total_price,
        }
    }
}

pub async fn upsert(db: &DatabaseConnection, item: &OrderLineItem) -> Result<()> {
    let exists = Entity::find_by_id(item.id.clone()).one(db).await?.is_some();
    let active = ActiveModel {
        id: Set(item.id.clone()),
        sales_order_id: Set(item.sales_order_id.clone()),
        product_num: Set(item.product_num.clone()),
        part_number: Set(item.part_number.clone()),
        product_name: Set(item.product_name.clone()),
        description: Set(item.description.clone()),
        quantity: Set(item.quantity),
        total_price: Set(item.total_price),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

pub async fn list_by_order(
    db: &DatabaseConnection,
    sales_order_id: &str,
) -> Result<Vec<OrderLineItem>> {
    let items = Entity::find()
        .filter(Column::SalesOrderId.eq(sales_order_id))
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(items.into_iter().map(OrderLineItem::from).collect())
}
