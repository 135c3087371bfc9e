use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the message pool. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Proof that an item was drawn during a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub item_id: i64,
    pub cycle: i64,
    pub used_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    pub cycle: i64,
    pub total_messages: i64,
    pub used_in_cycle: i64,
    pub remaining_in_cycle: i64,
}

impl CycleStats {
    pub fn new(cycle: i64, total_messages: i64, used_in_cycle: i64) -> Self {
        Self {
            cycle,
            total_messages,
            used_in_cycle,
            remaining_in_cycle: (total_messages - used_in_cycle).max(0),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_messages > 0 && self.used_in_cycle >= self.total_messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_floors_at_zero() {
        let stats = CycleStats::new(4, 3, 5);
        assert_eq!(stats.remaining_in_cycle, 0);
        assert!(stats.is_exhausted());
    }

    #[test]
    fn test_empty_pool_is_not_exhausted() {
        assert!(!CycleStats::new(0, 0, 0).is_exhausted());
    }

    #[test]
    fn test_stats_serialize_snake_case() {
        let value = serde_json::to_value(CycleStats::new(1, 10, 4)).unwrap();
        assert_eq!(value["total_messages"], 10);
        assert_eq!(value["used_in_cycle"], 4);
        assert_eq!(value["remaining_in_cycle"], 6);
    }
}
