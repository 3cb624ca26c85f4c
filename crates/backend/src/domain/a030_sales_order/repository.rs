use anyhow::Result;
use chrono::NaiveDateTime;
use contracts::domain::a030_sales_order::aggregate::SalesOrder;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use serde::{Deserialize, Serialize};

use crate::shared::format::{format_datetime, parse_datetime};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a030_sales_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_num: String,
    pub customer_id: String,
    pub customer_name: String,
    pub sales_person: String,
    pub posting_date: String,
    pub commission_month: String,
    pub revenue: Option<f64>,
    pub order_value: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SalesOrder {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self> {
        Ok(SalesOrder {
            posting_date: parse_datetime(&m.posting_date)?,
            id: m.id,
            order_num: m.order_num,
            customer_id: m.customer_id,
            customer_name: m.customer_name,
            sales_person: m.sales_person,
            commission_month: m.commission_month,
            revenue: m.revenue,
            order_value: m.order_value,
        })
    }
}

fn to_aggregates(models: Vec<Model>) -> Result<Vec<SalesOrder>> {
    models.into_iter().map(SalesOrder::try_from).collect()
}

pub async fn upsert(db: &DatabaseConnection, order: &SalesOrder) -> Result<()> {
    let exists = Entity::find_by_id(order.id.clone()).one(db).await?.is_some();
    let active = ActiveModel {
        id: Set(order.id.clone()),
        order_num: Set(order.order_num.clone()),
        customer_id: Set(order.customer_id.clone()),
        customer_name: Set(order.customer_name.clone()),
        sales_person: Set(order.sales_person.clone()),
        posting_date: Set(format_datetime(&order.posting_date)),
        commission_month: Set(order.commission_month.clone()),
        revenue: Set(order.revenue),
        order_value: Set(order.order_value),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

fn month_query(commission_month: &str, sales_people: Option<&[String]>) -> Select<Entity> {
    let mut query = Entity::find().filter(Column::CommissionMonth.eq(commission_month));
    if let Some(names) = sales_people {
        query = query.filter(Column::SalesPerson.is_in(names.iter().cloned()));
    }
    query
}

/// Distinct rep strings used on a month's orders
pub async fn distinct_sales_people(
    db: &DatabaseConnection,
    commission_month: &str,
) -> Result<Vec<String>> {
    let names = Entity::find()
        .select_only()
        .column(Column::SalesPerson)
        .distinct()
        .filter(Column::CommissionMonth.eq(commission_month))
        .into_tuple::<String>()
        .all(db)
        .await?;
    Ok(names)
}

/// Number of a month's orders, optionally restricted to the given rep strings
pub async fn count_for_month(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_people: Option<&[String]>,
) -> Result<u64> {
    Ok(month_query(commission_month, sales_people).count(db).await?)
}

/// One page of a month's orders in posting order
pub async fn list_for_month_page(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_people: Option<&[String]>,
    offset: u64,
    limit: u64,
) -> Result<Vec<SalesOrder>> {
    let models = month_query(commission_month, sales_people)
        .order_by_asc(Column::PostingDate)
        .order_by_asc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;
    to_aggregates(models)
}

/// Most recent orders of a customer strictly before `before`, newest first
pub async fn list_prior_orders(
    db: &DatabaseConnection,
    customer_id: &str,
    before: &NaiveDateTime,
    limit: u64,
) -> Result<Vec<SalesOrder>> {
    let models = Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .filter(Column::PostingDate.lt(format_datetime(before)))
        .order_by_desc(Column::PostingDate)
        .limit(limit)
        .all(db)
        .await?;
    to_aggregates(models)
}

/// Oldest order ever placed by a customer
pub async fn first_order(db: &DatabaseConnection, customer_id: &str) -> Result<Option<SalesOrder>> {
    let model = Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .order_by_asc(Column::PostingDate)
        .one(db)
        .await?;
    model.map(SalesOrder::try_from).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use chrono::NaiveDate;

    fn order(id: &str, customer: &str, date: (i32, u32, u32), month: &str) -> SalesOrder {
        SalesOrder {
            id: id.into(),
            order_num: format!("SO-{}", id),
            customer_id: customer.into(),
            customer_name: "Acme Supply".into(),
            sales_person: "BenW".into(),
            posting_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            commission_month: month.into(),
            revenue: Some(100.0),
            order_value: None,
        }
    }

    #[tokio::test]
    async fn test_history_queries() {
        let db = connect_in_memory().await;
        upsert(&db, &order("1", "C1", (2023, 1, 10), "2023-01")).await.unwrap();
        upsert(&db, &order("2", "C1", (2024, 3, 5), "2024-03")).await.unwrap();
        upsert(&db, &order("3", "C1", (2024, 6, 2), "2024-06")).await.unwrap();
        upsert(&db, &order("4", "C2", (2024, 6, 3), "2024-06")).await.unwrap();
        // re-upsert must not duplicate
        upsert(&db, &order("3", "C1", (2024, 6, 2), "2024-06")).await.unwrap();

        let current = order("3", "C1", (2024, 6, 2), "2024-06").posting_date;
        let prior = list_prior_orders(&db, "C1", &current, 10).await.unwrap();
        assert_eq!(
            prior.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["2", "1"]
        );
        assert_eq!(first_order(&db, "C1").await.unwrap().unwrap().id, "1");
        assert!(first_order(&db, "nobody").await.unwrap().is_none());

        assert_eq!(count_for_month(&db, "2024-06", None).await.unwrap(), 2);
        let ben = vec!["BenW".to_string()];
        let other = vec!["Other".to_string()];
        assert_eq!(count_for_month(&db, "2024-06", Some(&ben)).await.unwrap(), 2);
        assert_eq!(count_for_month(&db, "2024-06", Some(&other)).await.unwrap(), 0);
        assert_eq!(
            distinct_sales_people(&db, "2024-06").await.unwrap(),
            vec!["BenW".to_string()]
        );
        let page = list_for_month_page(&db, "2024-06", None, 1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "4");
    }
}
