use anyhow::Result;
use chrono::NaiveDate;
use contracts::domain::a035_spiff::aggregate::Spiff;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;

use super::repository;

/// Active spiffs whose window overlaps the period, keyed by product number.
/// When two campaigns target the same product, the one that started last wins.
pub fn index_for_period(
    spiffs: Vec<Spiff>,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> HashMap<String, Spiff> {
    let mut index: HashMap<String, Spiff> = HashMap::new();
    for spiff in spiffs
        .into_iter()
        .filter(|s| s.overlaps(period_start, period_end))
    {
        let key = spiff.product_num.trim().to_string();
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(current) if current.start_date > spiff.start_date => {
                tracing::warn!(
                    "Spiffs {} and {} both target product {}; keeping {}",
                    current.id,
                    spiff.id,
                    key,
                    current.id
                );
            }
            Some(current) => {
                tracing::warn!(
                    "Spiffs {} and {} both target product {}; keeping {}",
                    current.id,
                    spiff.id,
                    key,
                    spiff.id
                );
                index.insert(key, spiff);
            }
            None => {
                index.insert(key, spiff);
            }
        }
    }
    index
}

pub async fn active_for_period(
    db: &DatabaseConnection,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> Result<HashMap<String, Spiff>> {
    let spiffs = repository::list_active(db).await?;
    let index = index_for_period(spiffs, period_start, period_end);
    tracing::info!(
        "{} spiffs active between {} and {}",
        index.len(),
        period_start,
        period_end
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn spiff(id: &str, product: &str, start: NaiveDate, end: Option<NaiveDate>) -> Spiff {
        Spiff {
            id: id.into(),
            name: format!("Spiff {}", id),
            product_num: product.into(),
            incentive_type: "flat".into(),
            incentive_value: 2.0,
            start_date: start,
            end_date: end,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_active_for_period() {
        let db = connect_in_memory().await;
        repository::upsert(&db, &spiff("s1", "KB-038", d(2024, 5, 1), None)).await.unwrap();
        repository::upsert(&db, &spiff("s2", "KB-040", d(2024, 1, 1), Some(d(2024, 5, 31))))
            .await
            .unwrap();
        let mut inactive = spiff("s3", "KB-041", d(2024, 6, 1), None);
        inactive.is_active = false;
        repository::upsert(&db, &inactive).await.unwrap();

        let index = active_for_period(&db, d(2024, 6, 1), d(2024, 6, 30)).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index["KB-038"].id, "s1");
    }

    #[test]
    fn test_latest_campaign_wins() {
        let index = index_for_period(
            vec![
                spiff("old", "KB-038", d(2024, 1, 1), None),
                spiff("new", "KB-038", d(2024, 6, 10), None),
            ],
            d(2024, 6, 1),
            d(2024, 6, 30),
        );
        assert_eq!(index["KB-038"].id, "new");
    }
}
