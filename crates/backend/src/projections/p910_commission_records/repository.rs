use anyhow::Result;
use contracts::projections::p910_commission_records::dto::CommissionRecordDto;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

/// Marker appended to notes when a recompute refreshes an overridden record
pub const OVERRIDE_NOTE: &str = "[OVERRIDE PRESERVED]";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p910_commission_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub rep_id: String,
    pub sales_person: String,
    pub rep_name: String,
    pub rep_title: String,

    pub order_id: String,
    pub order_num: String,
    pub customer_id: String,
    pub customer_name: String,
    pub account_type: String,
    pub customer_segment: String,
    pub customer_status: String,

    pub order_revenue: f64,
    pub order_value: f64,
    pub commission_rate: f64,
    pub commission_amount: f64,
    pub rate_source: String,

    pub order_date: String,
    pub commission_month: String,
    pub commission_year: i32,
    pub calculated_at: String,
    pub paid_status: String,
    pub notes: String,

    pub is_override: bool,
    #[sea_orm(nullable)]
    pub override_reason: Option<String>,
    #[sea_orm(nullable)]
    pub manual_adjustment: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CommissionRecordDto {
    fn from(m: Model) -> Self {
        CommissionRecordDto {
            id: m.id,
            rep_id: m.rep_id,
            sales_person: m.sales_person,
            rep_name: m.rep_name,
            rep_title: m.rep_title,
            order_id: m.order_id,
            order_num: m.order_num,
            customer_id: m.customer_id,
            customer_name: m.customer_name,
            account_type: m.account_type,
            customer_segment: m.customer_segment,
            customer_status: m.customer_status,
            order_revenue: m.order_revenue,
            order_value: m.order_value,
            commission_rate: m.commission_rate,
            commission_amount: m.commission_amount,
            rate_source: m.rate_source,
            order_date: m.order_date,
            commission_month: m.commission_month,
            commission_year: m.commission_year,
            calculated_at: m.calculated_at,
            paid_status: m.paid_status,
            notes: m.notes,
            is_override: m.is_override,
            override_reason: m.override_reason,
            manual_adjustment: m.manual_adjustment,
        }
    }
}

/// What happened to a computed record on write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// Existing override kept its frozen amount; carries that amount
    OverridePreserved(f64),
}

pub async fn get(db: &DatabaseConnection, id: &str) -> Result<Option<CommissionRecordDto>> {
    Ok(Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(CommissionRecordDto::from))
}

/// Override record for an order in a month, whichever rep key it was stored under
pub async fn find_override_for_order(
    db: &DatabaseConnection,
    commission_month: &str,
    order_id: &str,
) -> Result<Option<CommissionRecordDto>> {
    Ok(Entity::find()
        .filter(Column::CommissionMonth.eq(commission_month))
        .filter(Column::OrderId.eq(order_id))
        .filter(Column::IsOverride.eq(true))
        .one(db)
        .await?
        .map(CommissionRecordDto::from))
}

/// Writes a freshly computed record.
///
/// An existing override only gets its descriptive fields refreshed; amount, override fields and
/// paid status stay as they are. Everything else is a full replace with `paid_status = pending`.
pub async fn upsert_computed(
    db: &DatabaseConnection,
    record: &CommissionRecordDto,
) -> Result<UpsertOutcome> {
    let existing = Entity::find_by_id(record.id.clone()).one(db).await?;

    match existing {
        Some(model) if model.is_override => {
            let frozen = model.commission_amount;
            let mut active: ActiveModel = model.into();
            active.rep_id = Set(record.rep_id.clone());
            active.rep_name = Set(record.rep_name.clone());
            active.rep_title = Set(record.rep_title.clone());
            active.order_num = Set(record.order_num.clone());
            active.customer_id = Set(record.customer_id.clone());
            active.customer_name = Set(record.customer_name.clone());
            active.account_type = Set(record.account_type.clone());
            active.customer_segment = Set(record.customer_segment.clone());
            active.customer_status = Set(record.customer_status.clone());
            active.order_revenue = Set(record.order_revenue);
            active.order_value = Set(record.order_value);
            active.commission_rate = Set(record.commission_rate);
            active.rate_source = Set(record.rate_source.clone());
            active.order_date = Set(record.order_date.clone());
            active.calculated_at = Set(record.calculated_at.clone());
            active.notes = Set(format!("{} {}", record.notes, OVERRIDE_NOTE).trim().to_string());
            active.update(db).await?;
            Ok(UpsertOutcome::OverridePreserved(frozen))
        }
        existing => {
            let active = ActiveModel {
                id: Set(record.id.clone()),
                rep_id: Set(record.rep_id.clone()),
                sales_person: Set(record.sales_person.clone()),
                rep_name: Set(record.rep_name.clone()),
                rep_title: Set(record.rep_title.clone()),
                order_id: Set(record.order_id.clone()),
                order_num: Set(record.order_num.clone()),
                customer_id: Set(record.customer_id.clone()),
                customer_name: Set(record.customer_name.clone()),
                account_type: Set(record.account_type.clone()),
                customer_segment: Set(record.customer_segment.clone()),
                customer_status: Set(record.customer_status.clone()),
                order_revenue: Set(record.order_revenue),
                order_value: Set(record.order_value),
                commission_rate: Set(record.commission_rate),
                commission_amount: Set(record.commission_amount),
                rate_source: Set(record.rate_source.clone()),
                order_date: Set(record.order_date.clone()),
                commission_month: Set(record.commission_month.clone()),
                commission_year: Set(record.commission_year),
                calculated_at: Set(record.calculated_at.clone()),
                paid_status: Set("pending".to_string()),
                notes: Set(record.notes.clone()),
                is_override: Set(false),
                override_reason: Set(None),
                manual_adjustment: Set(None),
            };
            if existing.is_some() {
                active.update(db).await?;
                Ok(UpsertOutcome::Updated)
            } else {
                active.insert(db).await?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

fn month_condition(
    commission_month: &str,
    sales_person: Option<&str>,
    include_overrides: bool,
) -> Condition {
    let mut cond = Condition::all().add(Column::CommissionMonth.eq(commission_month));
    if let Some(sp) = sales_person {
        cond = cond.add(Column::SalesPerson.eq(sp));
    }
    if !include_overrides {
        cond = cond.add(Column::IsOverride.eq(false));
    }
    cond
}

/// Deletes a month's records in bounded batches; overrides survive unless `include_overrides`
pub async fn delete_month_in_chunks(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
    include_overrides: bool,
    chunk_size: u64,
) -> Result<u64> {
    let mut total = 0u64;
    loop {
        let ids: Vec<String> = Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(month_condition(commission_month, sales_person, include_overrides))
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
        tracing::debug!(
            "Deleted {} commission records of {} so far",
            total,
            commission_month
        );
    }
    Ok(total)
}

pub async fn count_overrides(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
) -> Result<u64> {
    let mut query = Entity::find()
        .filter(Column::CommissionMonth.eq(commission_month))
        .filter(Column::IsOverride.eq(true));
    if let Some(sp) = sales_person {
        query = query.filter(Column::SalesPerson.eq(sp));
    }
    Ok(query.count(db).await?)
}

pub async fn list_for_month(
    db: &DatabaseConnection,
    commission_month: &str,
    sales_person: Option<&str>,
) -> Result<Vec<CommissionRecordDto>> {
    let mut query = Entity::find().filter(Column::CommissionMonth.eq(commission_month));
    if let Some(sp) = sales_person {
        query = query.filter(Column::SalesPerson.eq(sp));
    }
    let items = query
        .order_by_asc(Column::SalesPerson)
        .order_by_asc(Column::OrderDate)
        .order_by_asc(Column::OrderId)
        .all(db)
        .await?;
    Ok(items.into_iter().map(CommissionRecordDto::from).collect())
}

/// Turns a record into an override: amount += adjustment
pub async fn apply_adjustment(
    db: &DatabaseConnection,
    id: &str,
    adjustment: f64,
    amount: f64,
    reason: Option<String>,
) -> Result<Option<CommissionRecordDto>> {
    let Some(model) = Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let mut active: ActiveModel = model.into();
    active.commission_amount = Set(amount);
    active.manual_adjustment = Set(Some(adjustment));
    active.is_override = Set(true);
    active.override_reason = Set(reason);
    let updated = active.update(db).await?;
    Ok(Some(updated.into()))
}
