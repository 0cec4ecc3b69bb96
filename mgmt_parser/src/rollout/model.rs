//! Rollout plan composite
//!
//! A plan is an ordered list of steps executed in series. Each step is either
//! a single server group or a set of groups executed concurrently. Concurrent
//! steps are never built directly: they arise from fusing the most recent step
//! with a new group.

use super::error::{RolloutError, RolloutResult};
use super::store::RolloutPlanStore;
use crate::config::compile_time::rollout::{
    MAX_CONCURRENT_MEMBERS, MAX_GROUP_PROPERTIES, MAX_ROLLOUT_GROUPS,
};
use crate::grammar::separators::ROLLOUT_PLAN_ID;
use serde_json::{Map, Value};

pub const ROLLOUT_PLAN: &str = "rollout-plan";
pub const IN_SERIES: &str = "in-series";
pub const SERVER_GROUP: &str = "server-group";
pub const CONCURRENT_GROUPS: &str = "concurrent-groups";
pub const PLAN_ID: &str = ROLLOUT_PLAN_ID;

/// Insertion-ordered string properties with unique names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Insert or replace, keeping the original position of a replaced name
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn to_object(&self) -> Map<String, Value> {
        self.iter()
            .map(|(n, v)| (n.to_string(), Value::String(v.to_string())))
            .collect()
    }
}

fn checked_property(properties: &mut Properties, name: &str, value: &str) -> RolloutResult<()> {
    if name.trim().is_empty() || value.trim().is_empty() {
        return Err(RolloutError::invalid_property(name, value));
    }
    if !properties.contains(name) && properties.len() >= MAX_GROUP_PROPERTIES {
        return Err(RolloutError::LimitExceeded {
            what: "properties",
            max: MAX_GROUP_PROPERTIES,
        });
    }
    properties.insert(name, value);
    Ok(())
}

/// One named server group with its own rollout properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleRolloutGroup {
    group_name: String,
    properties: Properties,
}

impl SingleRolloutGroup {
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            properties: Properties::default(),
        }
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name)
    }

    pub fn add_property(&mut self, name: &str, value: &str) -> RolloutResult<()> {
        checked_property(&mut self.properties, name, value)
    }

    fn properties_value(&self) -> Value {
        Value::Object(self.properties.to_object())
    }
}

/// Groups that receive the operation together within one series step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrentRolloutGroup {
    members: Vec<SingleRolloutGroup>,
}

impl ConcurrentRolloutGroup {
    pub fn members(&self) -> &[SingleRolloutGroup] {
        &self.members
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutPlanGroup {
    Single(SingleRolloutGroup),
    Concurrent(ConcurrentRolloutGroup),
}

impl RolloutPlanGroup {
    /// Group names in this step, in insertion order
    pub fn group_names(&self) -> Vec<&str> {
        match self {
            Self::Single(group) => vec![group.group_name()],
            Self::Concurrent(concurrent) => concurrent
                .members
                .iter()
                .map(SingleRolloutGroup::group_name)
                .collect(),
        }
    }

    fn member_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Concurrent(concurrent) => concurrent.members.len(),
        }
    }

    fn to_value(&self) -> Value {
        let mut step = Map::new();
        match self {
            Self::Single(group) => {
                let mut by_name = Map::new();
                by_name.insert(group.group_name.clone(), group.properties_value());
                step.insert(SERVER_GROUP.to_string(), Value::Object(by_name));
            }
            Self::Concurrent(concurrent) => {
                let by_name: Map<String, Value> = concurrent
                    .members
                    .iter()
                    .map(|g| (g.group_name.clone(), g.properties_value()))
                    .collect();
                step.insert(CONCURRENT_GROUPS.to_string(), Value::Object(by_name));
            }
        }
        Value::Object(step)
    }
}

/// The `rollout` operation header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolloutPlanHeader {
    plan_id: Option<String>,
    plan_ref: Option<String>,
    groups: Vec<RolloutPlanGroup>,
    properties: Properties,
}

impl RolloutPlanHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plan stored under `plan_id`
    pub fn with_id(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: Some(plan_id.into()),
            ..Self::default()
        }
    }

    /// This plan, kept under `plan_id` for later `rollout id=` references
    pub fn stored_as(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    pub fn plan_id(&self) -> Option<&str> {
        self.plan_id.as_deref()
    }

    pub fn plan_ref(&self) -> Option<&str> {
        self.plan_ref.as_deref()
    }

    pub fn groups(&self) -> &[RolloutPlanGroup] {
        &self.groups
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name)
    }

    /// Append a group as the next step in series.
    pub fn add_group(&mut self, group: SingleRolloutGroup) -> RolloutResult<()> {
        if self.plan_ref.is_some() {
            return Err(RolloutError::ExclusiveFieldConflict {
                existing: "a plan reference",
                requested: "groups",
            });
        }
        if self.groups.len() >= MAX_ROLLOUT_GROUPS {
            return Err(RolloutError::LimitExceeded {
                what: "groups",
                max: MAX_ROLLOUT_GROUPS,
            });
        }
        self.groups.push(RolloutPlanGroup::Single(group));
        Ok(())
    }

    /// Fuse `group` with the most recent step so both run concurrently.
    pub fn add_concurrent_group(&mut self, group: SingleRolloutGroup) -> RolloutResult<()> {
        let members = self.groups.last().map_or(0, RolloutPlanGroup::member_count);
        if members >= MAX_CONCURRENT_MEMBERS {
            return Err(RolloutError::LimitExceeded {
                what: "concurrent groups",
                max: MAX_CONCURRENT_MEMBERS,
            });
        }
        let Some(previous) = self.groups.pop() else {
            return Err(RolloutError::NoPrecedingGroup {
                group: group.group_name,
            });
        };

        let fused = match previous {
            RolloutPlanGroup::Single(previous) => ConcurrentRolloutGroup {
                members: vec![previous, group],
            },
            RolloutPlanGroup::Concurrent(mut concurrent) => {
                concurrent.members.push(group);
                concurrent
            }
        };
        self.groups.push(RolloutPlanGroup::Concurrent(fused));
        Ok(())
    }

    /// Reference a stored plan instead of listing groups.
    pub fn set_plan_ref(&mut self, plan_ref: &str) -> RolloutResult<()> {
        if !self.groups.is_empty() {
            return Err(RolloutError::ExclusiveFieldConflict {
                existing: "groups",
                requested: "a plan reference",
            });
        }
        if plan_ref.trim().is_empty() {
            return Err(RolloutError::invalid_property(PLAN_ID, plan_ref));
        }
        self.plan_ref = Some(plan_ref.to_string());
        Ok(())
    }

    /// Set a plan-level property such as `rollback-across-groups`.
    pub fn add_property(&mut self, name: &str, value: &str) -> RolloutResult<()> {
        checked_property(&mut self.properties, name, value)
    }

    /// The `rollout-plan` body.
    ///
    /// A plan reference resolves through `store` when one is given; otherwise it
    /// stays an `{"id": ref}` indirection for the execution layer to resolve.
    pub fn to_value(&self, store: Option<&dyn RolloutPlanStore>) -> RolloutResult<Value> {
        let mut plan = match (&self.plan_ref, store) {
            (None, _) => return Ok(Value::Object(self.plan_body())),
            (Some(plan_ref), Some(store)) => {
                let stored = store
                    .load(plan_ref)
                    .ok_or_else(|| RolloutError::UnknownRolloutPlan {
                        plan_ref: plan_ref.clone(),
                    })?;
                // Stored plans never chain to other stored plans
                match stored.to_value(None)? {
                    Value::Object(map) => map,
                    _ => Map::new(),
                }
            }
            (Some(plan_ref), None) => {
                let mut plan = Map::new();
                plan.insert(PLAN_ID.to_string(), Value::String(plan_ref.clone()));
                plan
            }
        };

        for (name, value) in self.properties.iter() {
            plan.insert(name.to_string(), Value::String(value.to_string()));
        }
        Ok(Value::Object(plan))
    }

    fn plan_body(&self) -> Map<String, Value> {
        let mut plan = Map::new();
        let steps: Vec<Value> = self.groups.iter().map(RolloutPlanGroup::to_value).collect();
        plan.insert(IN_SERIES.to_string(), Value::Array(steps));
        for (name, value) in self.properties.iter() {
            plan.insert(name.to_string(), Value::String(value.to_string()));
        }
        plan
    }

    /// Insert `"rollout-plan": {...}` into a headers document.
    pub fn add_to(
        &self,
        headers: &mut Map<String, Value>,
        store: Option<&dyn RolloutPlanStore>,
    ) -> RolloutResult<()> {
        let plan = self.to_value(store)?;
        headers.insert(ROLLOUT_PLAN.to_string(), plan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::store::InMemoryPlanStore;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn group(name: &str, props: &[(&str, &str)]) -> SingleRolloutGroup {
        let mut group = SingleRolloutGroup::new(name);
        for (n, v) in props {
            group.add_property(n, v).unwrap();
        }
        group
    }

    #[test]
    fn test_blank_property_is_invalid() {
        let mut group = SingleRolloutGroup::new("groupA");
        assert_matches!(
            group.add_property("", "true"),
            Err(RolloutError::InvalidProperty { .. })
        );
        assert_matches!(
            group.add_property("rolling-to-servers", "  "),
            Err(RolloutError::InvalidProperty { .. })
        );
        assert!(group.properties().is_empty());
    }

    #[test]
    fn test_concurrent_without_preceding_group() {
        let mut plan = RolloutPlanHeader::new();
        assert_matches!(
            plan.add_concurrent_group(SingleRolloutGroup::new("groupA")),
            Err(RolloutError::NoPrecedingGroup { .. })
        );
        assert!(plan.groups().is_empty());
    }

    #[test]
    fn test_fusion_with_most_recent_step() {
        let mut plan = RolloutPlanHeader::new();
        plan.add_group(group(
            "groupA",
            &[("rolling-to-servers", "true"), ("max-failure-percentage", "20")],
        ))
        .unwrap();
        plan.add_group(SingleRolloutGroup::new("groupB")).unwrap();
        plan.add_concurrent_group(SingleRolloutGroup::new("groupC"))
            .unwrap();

        assert_eq!(plan.groups().len(), 2);
        assert_matches!(
            &plan.groups()[0],
            RolloutPlanGroup::Single(g) if g.group_name() == "groupA"
        );
        assert_eq!(plan.groups()[1].group_names(), vec!["groupB", "groupC"]);
        assert_matches!(&plan.groups()[1], RolloutPlanGroup::Concurrent(_));
    }

    #[test]
    fn test_fusion_extends_existing_concurrent_step() {
        let mut plan = RolloutPlanHeader::new();
        plan.add_group(SingleRolloutGroup::new("a")).unwrap();
        plan.add_concurrent_group(SingleRolloutGroup::new("b")).unwrap();
        plan.add_concurrent_group(SingleRolloutGroup::new("c")).unwrap();
        assert_eq!(plan.groups().len(), 1);
        assert_eq!(plan.groups()[0].group_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_concurrent_limit_keeps_step() {
        let mut plan = RolloutPlanHeader::new();
        plan.add_group(SingleRolloutGroup::new("g0")).unwrap();
        for i in 1..MAX_CONCURRENT_MEMBERS {
            plan.add_concurrent_group(SingleRolloutGroup::new(format!("g{}", i)))
                .unwrap();
        }
        assert_matches!(
            plan.add_concurrent_group(SingleRolloutGroup::new("extra")),
            Err(RolloutError::LimitExceeded { .. })
        );
        assert_eq!(plan.groups().len(), 1);
        assert_eq!(plan.groups()[0].group_names().len(), MAX_CONCURRENT_MEMBERS);
    }

    #[test]
    fn test_plan_ref_and_groups_are_exclusive() {
        let mut by_ref = RolloutPlanHeader::new();
        by_ref.set_plan_ref("myplan").unwrap();
        assert_matches!(
            by_ref.add_group(SingleRolloutGroup::new("groupA")),
            Err(RolloutError::ExclusiveFieldConflict { .. })
        );

        let mut by_groups = RolloutPlanHeader::new();
        by_groups.add_group(SingleRolloutGroup::new("groupA")).unwrap();
        assert_matches!(
            by_groups.set_plan_ref("myplan"),
            Err(RolloutError::ExclusiveFieldConflict { .. })
        );
    }

    #[test]
    fn test_serialization_shape() {
        let mut plan = RolloutPlanHeader::new();
        plan.add_group(group(
            "groupA",
            &[("rolling-to-servers", "true"), ("max-failure-percentage", "20")],
        ))
        .unwrap();
        plan.add_concurrent_group(SingleRolloutGroup::new("groupB"))
            .unwrap();
        plan.add_group(SingleRolloutGroup::new("groupC")).unwrap();
        plan.add_property("rollback-across-groups", "true").unwrap();

        let mut headers = Map::new();
        plan.add_to(&mut headers, None).unwrap();

        assert_eq!(
            Value::Object(headers),
            json!({
                "rollout-plan": {
                    "in-series": [
                        {"concurrent-groups": {
                            "groupA": {"rolling-to-servers": "true", "max-failure-percentage": "20"},
                            "groupB": {}
                        }},
                        {"server-group": {"groupC": {}}}
                    ],
                    "rollback-across-groups": "true"
                }
            })
        );
    }

    #[test]
    fn test_plan_ref_without_store_is_indirection() {
        let mut plan = RolloutPlanHeader::new();
        plan.set_plan_ref("myplan").unwrap();
        assert_eq!(plan.to_value(None).unwrap(), json!({"id": "myplan"}));
    }

    #[test]
    fn test_plan_ref_resolves_through_store() {
        let mut stored = RolloutPlanHeader::with_id("myplan");
        stored.add_group(SingleRolloutGroup::new("groupC")).unwrap();

        let mut store = InMemoryPlanStore::default();
        store.insert(stored);

        let mut plan = RolloutPlanHeader::new();
        plan.set_plan_ref("myplan").unwrap();
        plan.add_property("rollback-across-groups", "false").unwrap();

        assert_eq!(
            plan.to_value(Some(&store)).unwrap(),
            json!({
                "in-series": [{"server-group": {"groupC": {}}}],
                "rollback-across-groups": "false"
            })
        );

        let mut missing = RolloutPlanHeader::new();
        missing.set_plan_ref("other").unwrap();
        assert_matches!(
            missing.to_value(Some(&store)),
            Err(RolloutError::UnknownRolloutPlan { .. })
        );
    }

    #[test]
    fn test_stored_as_keeps_groups() {
        let mut plan = RolloutPlanHeader::new();
        plan.add_group(group("groupA", &[])).unwrap();
        let plan = plan.stored_as("nightly");
        assert_eq!(plan.plan_id(), Some("nightly"));
        assert_eq!(plan.groups().len(), 1);
    }
}
