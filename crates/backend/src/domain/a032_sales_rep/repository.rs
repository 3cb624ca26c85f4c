use anyhow::Result;
use contracts::domain::a032_sales_rep::aggregate::SalesRep;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a032_sales_reps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub sales_person: Option<String>,
    pub title: String,
    /// JSON array of alternate ERP spellings
    pub aliases: String,
    pub is_active: bool,
    pub is_commissioned: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SalesRep {
    fn from(m: Model) -> Self {
        let aliases = serde_json::from_str::<Vec<String>>(&m.aliases).unwrap_or_else(|e| {
            tracing::warn!("Rep {} has unreadable aliases '{}': {}", m.id, m.aliases, e);
            Vec::new()
        });
        SalesRep {
            id: m.id,
            name: m.name,
            sales_person: m.sales_person,
            title: m.title,
            aliases,
            is_active: m.is_active,
            is_commissioned: m.is_commissioned,
        }
    }
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<SalesRep>> {
    let items = Entity::find().order_by_asc(Column::Name).all(db).await?;
    Ok(items.into_iter().map(SalesRep::from).collect())
}

pub async fn get_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<SalesRep>> {
    Ok(Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(SalesRep::from))
}

pub async fn upsert(db: &DatabaseConnection, rep: &SalesRep) -> Result<()> {
    let exists = Entity::find_by_id(rep.id.clone()).one(db).await?.is_some();
    let active = ActiveModel {
        id: Set(rep.id.clone()),
        name: Set(rep.name.clone()),
        sales_person: Set(rep.sales_person.clone()),
        title: Set(rep.title.clone()),
        aliases: Set(serde_json::to_string(&rep.aliases)?),
        is_active: Set(rep.is_active),
        is_commissioned: Set(rep.is_commissioned),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}
