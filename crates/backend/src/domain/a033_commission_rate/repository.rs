use anyhow::Result;
use contracts::domain::a033_commission_rate::aggregate::RateEntry;
use contracts::enums::segment::SegmentId;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a033_commission_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub segment_id: String,
    pub status: String,
    pub percentage: f64,
    pub active: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn entry_id(entry: &RateEntry) -> String {
    format!("{}_{}_{}", entry.title, entry.segment_id.code(), entry.status)
}

/// Rows with an unknown segment code are skipped with a warning
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<RateEntry>> {
    let rows = Entity::find()
        .order_by_asc(Column::Title)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        match SegmentId::from_code(&row.segment_id.to_lowercase()) {
            Some(segment_id) => entries.push(RateEntry {
                title: row.title,
                segment_id,
                status: row.status,
                percentage: row.percentage,
                active: row.active,
            }),
            None => tracing::warn!(
                "Rate row {} has unknown segment '{}', ignored",
                row.id,
                row.segment_id
            ),
        }
    }
    Ok(entries)
}

pub async fn upsert(db: &DatabaseConnection, entry: &RateEntry) -> Result<()> {
    let existing = Entity::find()
        .filter(Column::Title.eq(entry.title.as_str()))
        .filter(Column::SegmentId.eq(entry.segment_id.code()))
        .filter(Column::Status.eq(entry.status.as_str()))
        .one(db)
        .await?;

    match existing {
        Some(model) => {
            let mut active: ActiveModel = model.into();
            active.percentage = Set(entry.percentage);
            active.active = Set(entry.active);
            active.update(db).await?;
        }
        None => {
            let active = ActiveModel {
                id: Set(entry_id(entry)),
                title: Set(entry.title.clone()),
                segment_id: Set(entry.segment_id.code().to_string()),
                status: Set(entry.status.clone()),
                percentage: Set(entry.percentage),
                active: Set(entry.active),
            };
            active.insert(db).await?;
        }
    }
    Ok(())
}
