use anyhow::Result;
use contracts::domain::a034_commission_rules::aggregate::CommissionRules;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::shared::format::{format_date, parse_date};

/// Rules are a singleton row
const RULES_ID: &str = "commission_rules";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a034_commission_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub exclude_shipping: bool,
    pub exclude_cc_processing: bool,
    pub use_order_value: bool,
    pub apply_reorg_rule: bool,
    pub reorg_date: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn get(db: &DatabaseConnection) -> Result<Option<CommissionRules>> {
    let Some(m) = Entity::find_by_id(RULES_ID.to_string()).one(db).await? else {
        return Ok(None);
    };
    Ok(Some(CommissionRules {
        exclude_shipping: m.exclude_shipping,
        exclude_cc_processing: m.exclude_cc_processing,
        use_order_value: m.use_order_value,
        apply_reorg_rule: m.apply_reorg_rule,
        reorg_date: parse_date(&m.reorg_date)?,
    }))
}

/// Stored rules, or the defaults when none were saved
pub async fn load_or_default(db: &DatabaseConnection) -> Result<CommissionRules> {
    match get(db).await? {
        Some(rules) => Ok(rules),
        None => {
            tracing::info!("No commission rules stored, using defaults");
            Ok(CommissionRules::default())
        }
    }
}

pub async fn save(db: &DatabaseConnection, rules: &CommissionRules) -> Result<()> {
    let exists = Entity::find_by_id(RULES_ID.to_string())
        .one(db)
        .await?
        .is_some();
    let active = ActiveModel {
        id: Set(RULES_ID.to_string()),
        exclude_shipping: Set(rules.exclude_shipping),
        exclude_cc_processing: Set(rules.exclude_cc_processing),
        use_order_value: Set(rules.use_order_value),
        apply_reorg_rule: Set(rules.apply_reorg_rule),
        reorg_date: Set(format_date(&rules.reorg_date)),
    };
    if exists {
        active.update(db).await?;
    } else {
        active.insert(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_defaults_then_saved_rules() {
        let db = connect_in_memory().await;
        assert_eq!(load_or_default(&db).await.unwrap(), CommissionRules::default());

        let rules = CommissionRules {
            exclude_shipping: false,
            ..CommissionRules::default()
        };
        save(&db, &rules).await.unwrap();
        save(&db, &rules).await.unwrap();
        assert_eq!(load_or_default(&db).await.unwrap(), rules);
    }
}
