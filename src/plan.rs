//! Partition plan: which region each retrieval targets and how many items it
//! may return. Kept as data so operators can add or remove regions without
//! touching aggregation or filter logic.

use serde::{Deserialize, Serialize};

use crate::types::Result;

/// One region-scoped query within the overall fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub region: String,
    pub max_items: usize,
}

impl Partition {
    pub fn new(region: impl Into<String>, max_items: usize) -> Self {
        Self {
            region: region.into(),
            max_items,
        }
    }
}

/// The full fetch plan: a single domestic partition plus any number of
/// overseas partitions. Overseas merge order follows plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlan {
    pub domestic: Partition,
    pub overseas: Vec<Partition>,
}

impl PartitionPlan {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for PartitionPlan {
    // Domestic and US feeds run shallow, the wider macro-regions deeper --
    // each pools several country sources.
    fn default() -> Self {
        Self {
            domestic: Partition::new("japan", 15),
            overseas: vec![
                Partition::new("us", 15),
                Partition::new("europe", 50),
                Partition::new("asia", 50),
                Partition::new("latin_america", 50),
                Partition::new("africa", 50),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_keeps_domestic_separate() {
        let plan = PartitionPlan::default();
        assert_eq!(plan.domestic.region, "japan");
        assert_eq!(plan.domestic.max_items, 15);
        assert_eq!(plan.overseas.len(), 5);
        assert_eq!(plan.overseas[0].region, "us");
    }

    #[test]
    fn plan_loads_from_json() {
        let json = r#"{
            "domestic": { "region": "japan", "max_items": 10 },
            "overseas": [
                { "region": "us", "max_items": 20 },
                { "region": "oceania", "max_items": 30 }
            ]
        }"#;
        let plan = PartitionPlan::from_json(json).unwrap();
        assert_eq!(plan.domestic.max_items, 10);
        assert_eq!(plan.overseas[1].region, "oceania");
    }
}
