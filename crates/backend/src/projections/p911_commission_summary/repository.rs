use anyhow::Result;
use contracts::projections::p911_commission_summary::dto::MonthlySummaryDto;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p911_commission_summary")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sales_person: String,
    pub rep_name: String,
    pub month: String,
    pub year: i32,
    pub total_orders: i32,
    pub total_revenue: f64,
    pub total_commission: f64,
    pub total_spiffs: f64,
    pub total_earnings: f64,
    pub override_count: i32,
    pub paid_status: String,
    pub calculated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MonthlySummaryDto {
    fn from(m: Model) -> Self {
        MonthlySummaryDto {
            id: m.id,
            sales_person: m.sales_person,
            rep_name: m.rep_name,
            month: m.month,
            year: m.year,
            total_orders: m.total_orders,
            total_revenue: m.total_revenue,
            total_commission: m.total_commission,
            total_spiffs: m.total_spiffs,
            total_earnings: m.total_earnings,
            override_count: m.override_count,
            paid_status: m.paid_status,
            calculated_at: m.calculated_at,
        }
    }
}

pub async fn upsert(db: &DatabaseConnection, summary: &MonthlySummaryDto) -> Result<()> {
    let exists = Entity::find_by_id(summary.id.clone())
        .one(db)
        .await?
        .is_some();
    let active = ActiveModel {
        id: Set(summary.id.clone()),
        sales_person: Set(summary.sales_person.clone()),
        rep_name: Set(summary.rep_name.clone()),
        month: Set(summary.month.clone()),
        year: Set(summary.year),
        total_orders: Set(summary.total_orders),
        total_revenue: Set(summary.total_revenue),
        total_commission: Set(summary.total_commission),
        total_spiffs: Set(summary.total_spiffs),
        total_earnings: Set(summary.total_earnings),
        override_count: Set(summary.override_count),
        paid_status: Set(summary.paid_status.clone()),
        calculated_at: Set(summary.calculated_at.clone()),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

pub async fn get(db: &DatabaseConnection, id: &str) -> Result<Option<MonthlySummaryDto>> {
    Ok(Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(MonthlySummaryDto::from))
}

pub async fn delete_month(
    db: &DatabaseConnection,
    month: &str,
    sales_person: Option<&str>,
) -> Result<u64> {
    let mut query = Entity::delete_many().filter(Column::Month.eq(month));
    if let Some(sp) = sales_person {
        query = query.filter(Column::SalesPerson.eq(sp));
    }
    Ok(query.exec(db).await?.rows_affected)
}

pub async fn list_for_month(
    db: &DatabaseConnection,
    month: &str,
) -> Result<Vec<MonthlySummaryDto>> {
    let items = Entity::find()
        .filter(Column::Month.eq(month))
        .order_by_desc(Column::TotalEarnings)
        .order_by_asc(Column::SalesPerson)
        .all(db)
        .await?;
    Ok(items.into_iter().map(MonthlySummaryDto::from).collect())
}
