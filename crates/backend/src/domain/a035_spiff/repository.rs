use anyhow::Result;
use contracts::domain::a035_spiff::aggregate::Spiff;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::shared::format::{format_date, parse_date};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a035_spiffs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub product_num: String,
    pub incentive_type: String,
    pub incentive_value: f64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Spiff {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self> {
        Ok(Spiff {
            start_date: parse_date(&m.start_date)?,
            end_date: m.end_date.as_deref().map(parse_date).transpose()?,
            id: m.id,
            name: m.name,
            product_num: m.product_num,
            incentive_type: m.incentive_type,
            incentive_value: m.incentive_value,
            is_active: m.is_active,
        })
    }
}

pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<Spiff>> {
    let rows = Entity::find()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::StartDate)
        .all(db)
        .await?;
    rows.into_iter().map(Spiff::try_from).collect()
}

pub async fn upsert(db: &DatabaseConnection, spiff: &Spiff) -> Result<()> {
    let exists = Entity::find_by_id(spiff.id.clone()).one(db).await?.is_some();
    let active = ActiveModel {
        id: Set(spiff.id.clone()),
        name: Set(spiff.name.clone()),
        product_num: Set(spiff.product_num.clone()),
        incentive_type: Set(spiff.incentive_type.clone()),
        incentive_value: Set(spiff.incentive_value),
        start_date: Set(format_date(&spiff.start_date)),
        end_date: Set(spiff.end_date.as_ref().map(format_date)),
        is_active: Set(spiff.is_active),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}
