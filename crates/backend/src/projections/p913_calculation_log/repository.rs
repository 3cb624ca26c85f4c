use anyhow::Result;
use contracts::projections::p913_calculation_log::dto::CalculationLogDto;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p913_calculation_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub commission_month: String,
    pub order_num: String,
    pub order_id: String,
    pub customer_name: String,
    pub rep_name: String,
    pub rep_title: String,
    pub sales_person: String,
    pub customer_segment: String,
    pub customer_status: String,
    pub account_type: String,
    pub order_amount: f64,
    pub commission_rate: f64,
    pub commission_amount: f64,
    pub rate_source: String,
    pub calculated_at: String,
    pub order_date: String,
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CalculationLogDto {
    fn from(m: Model) -> Self {
        CalculationLogDto {
            id: m.id,
            commission_month: m.commission_month,
            order_num: m.order_num,
            order_id: m.order_id,
            customer_name: m.customer_name,
            rep_name: m.rep_name,
            rep_title: m.rep_title,
            sales_person: m.sales_person,
            customer_segment: m.customer_segment,
            customer_status: m.customer_status,
            account_type: m.account_type,
            order_amount: m.order_amount,
            commission_rate: m.commission_rate,
            commission_amount: m.commission_amount,
            rate_source: m.rate_source,
            calculated_at: m.calculated_at,
            order_date: m.order_date,
            notes: m.notes,
        }
    }
}

pub async fn upsert(db: &DatabaseConnection, log: &CalculationLogDto) -> Result<()> {
    let exists = Entity::find_by_id(log.id.clone()).one(db).await?.is_some();
    let active = ActiveModel {
        id: Set(log.id.clone()),
        commission_month: Set(log.commission_month.clone()),
        order_num: Set(log.order_num.clone()),
        order_id: Set(log.order_id.clone()),
        customer_name: Set(log.customer_name.clone()),
        rep_name: Set(log.rep_name.clone()),
        rep_title: Set(log.rep_title.clone()),
        sales_person: Set(log.sales_person.clone()),
        customer_segment: Set(log.customer_segment.clone()),
        customer_status: Set(log.customer_status.clone()),
        account_type: Set(log.account_type.clone()),
        order_amount: Set(log.order_amount),
        commission_rate: Set(log.commission_rate),
        commission_amount: Set(log.commission_amount),
        rate_source: Set(log.rate_source.clone()),
        calculated_at: Set(log.calculated_at.clone()),
        order_date: Set(log.order_date.clone()),
        notes: Set(log.notes.clone()),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

pub async fn delete_month_in_chunks(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
    chunk_size: u64,
) -> Result<u64> {
    let mut cond = Condition::all().add(Column::CommissionMonth.eq(commission_month));
    if let Some(sp) = sales_person {
        cond = cond.add(Column::SalesPerson.eq(sp));
    }

    let mut total = 0u64;
    loop {
        let ids: Vec<String> = Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(cond.clone())
            .limit(chunk_size.max(1))
            .into_tuple()
            .all(db)
            .await?;
        if ids.is_empty() {
            break;
        }
        let result = Entity::delete_many()
            .filter(Column::Id.is_in(ids))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            break;
        }
        total += result.rows_affected;
    }
    Ok(total)
}

/// Logs of a month, newest first. `rep` matches the rep name; "all" or empty means no filter.
pub async fn list(
    db: &DatabaseConnection,
    commission_month: &str,
    rep: Option<&str>,
) -> Result<Vec<CalculationLogDto>> {
    let mut query = Entity::find().filter(Column::CommissionMonth.eq(commission_month));
    match rep.map(str::trim) {
        Some(r) if !r.is_empty() && !r.eq_ignore_ascii_case("all") => {
            query = query.filter(Column::RepName.eq(r));
        }
        _ => {}
    }
    let items = query
        .order_by_desc(Column::CalculatedAt)
        .order_by_desc(Column::OrderDate)
        .all(db)
        .await?;
    Ok(items.into_iter().map(CalculationLogDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn log(order_id: &str, rep: &str, calculated_at: &str) -> CalculationLogDto {
        CalculationLogDto {
            id: CalculationLogDto::log_id("2024-06", order_id),
            commission_month: "2024-06".into(),
            order_num: format!("SO-{}", order_id),
            order_id: order_id.into(),
            customer_name: "Acme".into(),
            rep_name: rep.into(),
            rep_title: "Account Executive".into(),
            sales_person: "BenW".into(),
            customer_segment: "distributor".into(),
            customer_status: "new".into(),
            account_type: "Distributor".into(),
            order_amount: 100.0,
            commission_rate: 8.0,
            commission_amount: 8.0,
            rate_source: "configured".into(),
            calculated_at: calculated_at.into(),
            order_date: "2024-06-03 10:00:00".into(),
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let db = connect_in_memory().await;
        upsert(&db, &log("1", "Ben Wallner", "2024-07-01T10:00:00+00:00")).await.unwrap();
        upsert(&db, &log("2", "Ben Wallner", "2024-07-01T10:00:05+00:00")).await.unwrap();
        upsert(&db, &log("3", "Jared Leuzinger", "2024-07-01T10:00:03+00:00")).await.unwrap();

        let all = list(&db, "2024-06", Some("all")).await.unwrap();
        assert_eq!(
            all.iter().map(|l| l.order_id.as_str()).collect::<Vec<_>>(),
            vec!["2", "3", "1"]
        );
        assert_eq!(list(&db, "2024-06", Some("Ben Wallner")).await.unwrap().len(), 2);
        assert_eq!(list(&db, "2024-05", None).await.unwrap().len(), 0);

        assert_eq!(delete_month_in_chunks(&db, "2024-06", None, 2).await.unwrap(), 3);
        assert!(list(&db, "2024-06", None).await.unwrap().is_empty());
    }
}
