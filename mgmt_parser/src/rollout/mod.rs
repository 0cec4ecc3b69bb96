//! Rollout plans attached to operations through the `rollout` header

pub mod error;
pub mod model;
pub mod parser;
pub mod store;

pub use error::{RolloutError, RolloutResult};
pub use model::{
    ConcurrentRolloutGroup, Properties, RolloutPlanGroup, RolloutPlanHeader, SingleRolloutGroup,
};
pub use parser::{parse_rollout, RolloutParse, RolloutPosition, RolloutSeparator};
pub use store::{InMemoryPlanStore, RolloutPlanStore};
