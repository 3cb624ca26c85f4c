use anyhow::Result;
use contracts::projections::p912_spiff_earnings::dto::SpiffEarningDto;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p912_spiff_earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub rep_id: String,
    pub sales_person: String,
    pub rep_name: String,
    pub spiff_id: String,
    pub spiff_name: String,
    pub product_num: String,
    pub product_description: String,
    pub order_id: String,
    pub order_num: String,
    pub customer_id: String,
    pub customer_name: String,
    pub line_item_id: String,
    pub quantity: f64,
    pub line_revenue: f64,
    pub incentive_type: String,
    pub incentive_value: f64,
    pub spiff_amount: f64,
    pub order_date: String,
    pub commission_month: String,
    pub commission_year: i32,
    pub calculated_at: String,
    pub paid_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SpiffEarningDto {
    fn from(m: Model) -> Self {
        SpiffEarningDto {
            id: m.id,
            rep_id: m.rep_id,
            sales_person: m.sales_person,
            rep_name: m.rep_name,
            spiff_id: m.spiff_id,
            spiff_name: m.spiff_name,
            product_num: m.product_num,
            product_description: m.product_description,
            order_id: m.order_id,
            order_num: m.order_num,
            customer_id: m.customer_id,
            customer_name: m.customer_name,
            line_item_id: m.line_item_id,
            quantity: m.quantity,
            line_revenue: m.line_revenue,
            incentive_type: m.incentive_type,
            incentive_value: m.incentive_value,
            spiff_amount: m.spiff_amount,
            order_date: m.order_date,
            commission_month: m.commission_month,
            commission_year: m.commission_year,
            calculated_at: m.calculated_at,
            paid_status: m.paid_status,
        }
    }
}

pub async fn upsert(db: &DatabaseConnection, earning: &SpiffEarningDto) -> Result<()> {
    let exists = Entity::find_by_id(earning.id.clone())
        .one(db)
        .await?
        .is_some();
    let active = ActiveModel {
        id: Set(earning.id.clone()),
        rep_id: Set(earning.rep_id.clone()),
        sales_person: Set(earning.sales_person.clone()),
        rep_name: Set(earning.rep_name.clone()),
        spiff_id: Set(earning.spiff_id.clone()),
        spiff_name: Set(earning.spiff_name.clone()),
        product_num: Set(earning.product_num.clone()),
        product_description: Set(earning.product_description.clone()),
        order_id: Set(earning.order_id.clone()),
        order_num: Set(earning.order_num.clone()),
        customer_id: Set(earning.customer_id.clone()),
        customer_name: Set(earning.customer_name.clone()),
        line_item_id: Set(earning.line_item_id.clone()),
        quantity: Set(earning.quantity),
        line_revenue: Set(earning.line_revenue),
        incentive_type: Set(earning.incentive_type.clone()),
        incentive_value: Set(earning.incentive_value),
        spiff_amount: Set(earning.spiff_amount),
        order_date: Set(earning.order_date.clone()),
        commission_month: Set(earning.commission_month.clone()),
        commission_year: Set(earning.commission_year),
        calculated_at: Set(earning.calculated_at.clone()),
        paid_status: Set(earning.paid_status.clone()),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

pub async fn delete_month(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
) -> Result<u64> {
    let mut query = Entity::delete_many().filter(Column::CommissionMonth.eq(commission_month));
    if let Some(sp) = sales_person {
        query = query.filter(Column::SalesPerson.eq(sp));
    }
    Ok(query.exec(db).await?.rows_affected)
}

pub async fn list_for_month(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
) -> Result<Vec<SpiffEarningDto>> {
    let mut query = Entity::find().filter(Column::CommissionMonth.eq(commission_month));
    if let Some(sp) = sales_person {
        query = query.filter(Column::SalesPerson.eq(sp));
    }
    let items = query
        .order_by_asc(Column::OrderDate)
        .order_by_asc(Column::LineItemId)
        .all(db)
        .await?;
    Ok(items.into_iter().map(SpiffEarningDto::from).collect())
}
