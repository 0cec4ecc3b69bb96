//! Lookup of previously stored rollout plans

use super::model::RolloutPlanHeader;
use std::collections::HashMap;

/// Resolves `rollout id=<ref>` references to stored plans.
pub trait RolloutPlanStore {
    fn load(&self, plan_ref: &str) -> Option<RolloutPlanHeader>;
}

/// Plans held in memory, keyed by plan id
#[derive(Debug, Clone, Default)]
pub struct InMemoryPlanStore {
    plans: HashMap<String, RolloutPlanHeader>,
}

impl InMemoryPlanStore {
    /// Store a plan under its id. Plans without an id are ignored.
    pub fn insert(&mut self, plan: RolloutPlanHeader) -> bool {
        match plan.plan_id() {
            Some(id) => {
                self.plans.insert(id.to_string(), plan);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Stored plan ids, sorted
    pub fn plan_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.plans.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl RolloutPlanStore for InMemoryPlanStore {
    fn load(&self, plan_ref: &str) -> Option<RolloutPlanHeader> {
        self.plans.get(plan_ref).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plans_need_an_id() {
        let mut store = InMemoryPlanStore::default();
        assert!(!store.insert(RolloutPlanHeader::new()));
        assert!(store.insert(RolloutPlanHeader::with_id("b")));
        assert!(store.insert(RolloutPlanHeader::with_id("a")));
        assert_eq!(store.plan_ids(), vec!["a", "b"]);
        assert!(store.load("a").is_some());
        assert!(store.load("c").is_none());
    }
}
