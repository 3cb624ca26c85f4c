use anyhow::Result;
use contracts::domain::a032_sales_rep::aggregate::SalesRep;
use sea_orm::DatabaseConnection;

use super::repository;
use crate::shared::alias::{AliasTable, KeyStrength};

/// Rep lookup by any known spelling of a rep's identity.
///
/// Username, full name and configured aliases are identifying keys. First names are only a
/// convenience: they never displace an identifying key and are dropped when two reps share one.
pub struct RepDirectory {
    table: AliasTable<SalesRep>,
}

impl RepDirectory {
    pub fn build(reps: Vec<SalesRep>) -> Self {
        let mut table = AliasTable::new();
        for rep in reps {
            let id = rep.id.clone();
            if let Some(sp) = rep.sales_person.as_deref() {
                table.add_key(sp, &id, KeyStrength::Strong);
            }
            table.add_key(&rep.name, &id, KeyStrength::Strong);
            for alias in &rep.aliases {
                table.add_key(alias, &id, KeyStrength::Strong);
            }
            if let Some(first) = rep.first_name() {
                table.add_key(first, &id, KeyStrength::Weak);
            }
            table.insert_record(id, rep);
        }

        for ambiguous in table.ambiguities() {
            tracing::warn!(
                "Rep key '{}' is shared by reps {}; orders using it will not resolve",
                ambiguous.key,
                ambiguous.claimants.join(", ")
            );
        }
        Self { table }
    }

    pub fn resolve(&self, sales_person: &str) -> Option<&SalesRep> {
        self.table.resolve(sales_person)
    }

    pub fn get(&self, id: &str) -> Option<&SalesRep> {
        self.table.get(id)
    }

    /// Canonical identity of a rep string; unknown strings map to themselves
    pub fn canonical(&self, sales_person: &str) -> String {
        match self.resolve(sales_person) {
            Some(rep) => rep.canonical_key().to_string(),
            None => sales_person.trim().to_string(),
        }
    }

    /// The strings among `candidates` that name the same rep as `sales_person`
    pub fn spellings_of<I>(&self, sales_person: &str, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let target = self.canonical(sales_person);
        candidates
            .into_iter()
            .filter(|c| self.canonical(c) == target)
            .collect()
    }

    /// True when both strings name the same rep
    pub fn same_rep(&self, a: &str, b: &str) -> bool {
        match (self.resolve(a), self.resolve(b)) {
            (Some(x), Some(y)) => x.id == y.id,
            _ => a.trim().eq_ignore_ascii_case(b.trim()),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

pub async fn load_directory(db: &DatabaseConnection) -> Result<RepDirectory> {
    let reps = repository::list_all(db).await?;
    tracing::info!("Loaded {} sales reps", reps.len());
    Ok(RepDirectory::build(reps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(id: &str, name: &str, sp: Option<&str>, aliases: &[&str]) -> SalesRep {
        SalesRep {
            id: id.into(),
            name: name.into(),
            sales_person: sp.map(str::to_string),
            title: "Account Executive".into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            is_active: true,
            is_commissioned: true,
        }
    }

    fn directory() -> RepDirectory {
        RepDirectory::build(vec![
            rep("r1", "Ben Wallner", Some("BenW"), &["Benjamin"]),
            rep("r2", "Ben Kirby", Some("BenK"), &[]),
            rep("r3", "Jared Leuzinger", Some("Jared"), &[]),
            rep("r4", "Brandon Good", None, &[]),
        ])
    }

    #[test]
    fn test_resolve_by_every_spelling() {
        let dir = directory();
        assert_eq!(dir.resolve("BenW").unwrap().id, "r1");
        assert_eq!(dir.resolve("Ben Wallner").unwrap().id, "r1");
        assert_eq!(dir.resolve("Benjamin").unwrap().id, "r1");
        assert_eq!(dir.resolve("Brandon").unwrap().id, "r4");
        // "Jared" is both a username and a first name of the same rep
        assert_eq!(dir.resolve("Jared").unwrap().id, "r3");
    }

    #[test]
    fn test_shared_first_name_is_ambiguous() {
        let dir = directory();
        assert!(dir.resolve("Ben").is_none());
    }

    #[test]
    fn test_canonical_and_same_rep() {
        let dir = directory();
        assert_eq!(dir.canonical("Ben Wallner"), "BenW");
        assert_eq!(dir.canonical("Brandon"), "Brandon Good");
        assert_eq!(dir.canonical(" Unknown "), "Unknown");
        assert!(dir.same_rep("BenW", "Benjamin"));
        assert!(!dir.same_rep("BenW", "BenK"));
        assert!(dir.same_rep("ghost", "GHOST"));
    }

    #[test]
    fn test_spellings_of_rep() {
        let dir = directory();
        let used = ["BenW", "Ben Wallner", "Benjamin", "BenK", "Ben", "Jared"]
            .iter()
            .map(|s| s.to_string());
        assert_eq!(
            dir.spellings_of("BenW", used),
            vec!["BenW", "Ben Wallner", "Benjamin"]
        );
        let used = ["Ghost ", "Ghost", "BenW"].iter().map(|s| s.to_string());
        assert_eq!(dir.spellings_of("Ghost", used), vec!["Ghost ", "Ghost"]);
    }
}
