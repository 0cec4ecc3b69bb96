//! Building the request document from a finished parse state
//!
//! This step is not incremental. A state that is fine for completion (a
//! dangling argument name, a pending type) can still fail here.

pub mod value;

pub use value::coerce_value;

use crate::address::AddressPath;
use crate::config::runtime::ParserPreferences;
use crate::headers::{headers_to_value, OperationHeader};
use crate::logging::{codes, Code};
use crate::rollout::{RolloutError, RolloutPlanStore};
use crate::syntax::ParseState;
use serde_json::{Map, Value};

pub const OPERATION: &str = "operation";
pub const ADDRESS: &str = "address";
pub const OPERATION_HEADERS: &str = "operation-headers";
/// Name used for a trailing type-only node
pub const WILDCARD: &str = "*";

pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("The operation name is missing")]
    MissingOperationName,

    #[error("Node type '{node_type}' is missing a name")]
    MissingNodeName { node_type: String },

    #[error("Argument '{name}' is missing a value")]
    MissingArgumentValue { name: String },

    #[error("Header '{name}' is missing a value")]
    MissingHeaderValue { name: String },

    #[error(transparent)]
    Rollout(#[from] RolloutError),
}

impl RequestError {
    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MissingOperationName => codes::request::MISSING_OPERATION_NAME,
            Self::MissingNodeName { .. } => codes::request::MISSING_NODE_NAME,
            Self::MissingArgumentValue { .. } => codes::request::MISSING_ARGUMENT_VALUE,
            Self::MissingHeaderValue { .. } => codes::request::MISSING_HEADER_VALUE,
            Self::Rollout(err) => err.error_code(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Options for [`ParseState::to_operation_request`]
#[derive(Clone, Copy)]
pub struct RequestOptions<'a> {
    /// Accept an address whose last node is a pending type
    pub allow_trailing_type: bool,
    /// Turn literal-looking values into typed values
    pub coerce_values: bool,
    /// Resolves `rollout id=<ref>` headers
    pub plan_store: Option<&'a dyn RolloutPlanStore>,
}

impl Default for RequestOptions<'_> {
    fn default() -> Self {
        Self {
            allow_trailing_type: false,
            coerce_values: true,
            plan_store: None,
        }
    }
}

impl<'a> RequestOptions<'a> {
    pub fn from_preferences(preferences: &ParserPreferences) -> Self {
        Self {
            allow_trailing_type: preferences.allow_trailing_type,
            coerce_values: preferences.coerce_values,
            plan_store: None,
        }
    }

    pub fn with_plan_store(mut self, store: &'a dyn RolloutPlanStore) -> Self {
        self.plan_store = Some(store);
        self
    }
}

impl std::fmt::Debug for RequestOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("allow_trailing_type", &self.allow_trailing_type)
            .field("coerce_values", &self.coerce_values)
            .field("plan_store", &self.plan_store.is_some())
            .finish()
    }
}

/// The structured request handed to an execution layer
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    address: AddressPath,
    operation: String,
    arguments: Map<String, Value>,
    headers: Option<Value>,
}

impl OperationRequest {
    pub fn address(&self) -> &AddressPath {
        &self.address
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn arguments(&self) -> &Map<String, Value> {
        &self.arguments
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    pub fn headers(&self) -> Option<&Value> {
        self.headers.as_ref()
    }

    /// `(type, name)` pairs of the address; a trailing type is named `*`
    pub fn address_pairs(&self) -> Vec<(&str, &str)> {
        self.address
            .iter()
            .map(|node| (node.node_type(), node.name().unwrap_or(WILDCARD)))
            .collect()
    }

    /// `{"operation", "address": [{type: name}..], args.., "operation-headers"}`
    pub fn to_value(&self) -> Value {
        let mut document = Map::new();
        document.insert(OPERATION.to_string(), Value::String(self.operation.clone()));

        let address: Vec<Value> = self
            .address_pairs()
            .into_iter()
            .map(|(node_type, name)| {
                let mut node = Map::new();
                node.insert(node_type.to_string(), Value::String(name.to_string()));
                Value::Object(node)
            })
            .collect();
        document.insert(ADDRESS.to_string(), Value::Array(address));

        for (name, value) in &self.arguments {
            document.insert(name.clone(), value.clone());
        }
        if let Some(headers) = &self.headers {
            document.insert(OPERATION_HEADERS.to_string(), headers.clone());
        }
        Value::Object(document)
    }
}

impl ParseState {
    /// Build the request document from this state.
    ///
    /// The address is the one built from the line, or the prefix when the
    /// line named none. Positional arguments and the output target are not
    /// part of the document.
    pub fn to_operation_request(
        &self,
        options: &RequestOptions<'_>,
    ) -> RequestResult<OperationRequest> {
        let operation = self
            .operation_name()
            .ok_or(RequestError::MissingOperationName)?;

        let address = self.effective_address();
        if let Some(position) = address.first_pending() {
            let trailing = position + 1 == address.len();
            if !(trailing && options.allow_trailing_type) {
                let node_type = address.last_type().unwrap_or_default().to_string();
                return Err(RequestError::MissingNodeName { node_type });
            }
        }

        let mut arguments = Map::new();
        for (name, value) in self.named_arguments() {
            let value = value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| RequestError::MissingArgumentValue { name: name.clone() })?;
            let value = if options.coerce_values {
                coerce_value(value)
            } else {
                Value::String(value.to_string())
            };
            arguments.insert(name.clone(), value);
        }

        let headers = if self.has_headers() {
            Some(build_headers(self.headers(), options.plan_store)?)
        } else {
            None
        };

        Ok(OperationRequest {
            address: address.clone(),
            operation: operation.to_string(),
            arguments,
            headers,
        })
    }
}

/// The `operation-headers` document, rejecting generic headers without a value
pub fn build_headers(
    headers: &[OperationHeader],
    store: Option<&dyn RolloutPlanStore>,
) -> RequestResult<Value> {
    for header in headers {
        if let OperationHeader::Generic { name, value: None } = header {
            return Err(RequestError::MissingHeaderValue { name: name.clone() });
        }
    }
    Ok(headers_to_value(headers, store)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::{InMemoryPlanStore, RolloutPlanHeader, SingleRolloutGroup};
    use crate::syntax::{parse_events, ParsePolicy};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn state(line: &str) -> ParseState {
        parse_events(&AddressPath::new(), line, ParsePolicy::operation()).unwrap()
    }

    #[test]
    fn test_round_trip_request() {
        let request = state("profile=production/subsystem=threads:write-core-threads(count=0,per-cpu=20)")
            .to_operation_request(&RequestOptions::default())
            .unwrap();
        assert_eq!(
            request.address_pairs(),
            vec![("profile", "production"), ("subsystem", "threads")]
        );
        assert_eq!(request.operation(), "write-core-threads");
        assert_eq!(request.argument("count"), Some(&json!(0)));
        assert_eq!(request.argument("per-cpu"), Some(&json!(20)));
        assert_eq!(
            request.to_value(),
            json!({
                "operation": "write-core-threads",
                "address": [{"profile": "production"}, {"subsystem": "threads"}],
                "count": 0,
                "per-cpu": 20
            })
        );
    }

    #[test]
    fn test_missing_operation_name() {
        assert_matches!(
            state("subsystem=threads").to_operation_request(&RequestOptions::default()),
            Err(RequestError::MissingOperationName)
        );
    }

    #[test]
    fn test_pending_type_fails_at_build_time() {
        let parsed = state("subsystem=threads/bounded-queue-thread-pool:read-resource");
        assert_matches!(
            parsed.to_operation_request(&RequestOptions::default()),
            Err(RequestError::MissingNodeName { node_type }) if node_type == "bounded-queue-thread-pool"
        );

        let options = RequestOptions {
            allow_trailing_type: true,
            ..RequestOptions::default()
        };
        let request = parsed.to_operation_request(&options).unwrap();
        assert_eq!(
            request.address_pairs(),
            vec![("subsystem", "threads"), ("bounded-queue-thread-pool", "*")]
        );
    }

    #[test]
    fn test_missing_argument_value() {
        assert_matches!(
            state(":add(name=,value=1)").to_operation_request(&RequestOptions::default()),
            Err(RequestError::MissingArgumentValue { name }) if name == "name"
        );
        assert_matches!(
            state(":read-resource(recursive)").to_operation_request(&RequestOptions::default()),
            Err(RequestError::MissingArgumentValue { .. })
        );
    }

    #[test]
    fn test_values_kept_as_strings_without_coercion() {
        let options = RequestOptions {
            coerce_values: false,
            ..RequestOptions::default()
        };
        let request = state(":add(count=0)").to_operation_request(&options).unwrap();
        assert_eq!(request.argument("count"), Some(&json!("0")));
    }

    #[test]
    fn test_prefix_used_when_line_has_no_address() {
        let prefix = AddressPath::from_pairs([("subsystem", "threads")]).unwrap();
        let parsed = parse_events(&prefix, ":read-resource", ParsePolicy::operation()).unwrap();
        let request = parsed.to_operation_request(&RequestOptions::default()).unwrap();
        assert_eq!(request.address_pairs(), vec![("subsystem", "threads")]);
    }

    #[test]
    fn test_headers_in_document() {
        let request = state(":write-attribute(name=x,value=1){rollout groupA^groupB; blocking-timeout=30}")
            .to_operation_request(&RequestOptions::default())
            .unwrap();
        assert_eq!(
            request.headers(),
            Some(&json!({
                "rollout-plan": {"in-series": [
                    {"concurrent-groups": {"groupA": {}, "groupB": {}}}
                ]},
                "blocking-timeout": "30"
            }))
        );
    }

    #[test]
    fn test_header_without_value() {
        assert_matches!(
            state(":add{blocking}").to_operation_request(&RequestOptions::default()),
            Err(RequestError::MissingHeaderValue { name }) if name == "blocking"
        );
    }

    #[test]
    fn test_stored_plan_resolution() {
        let mut stored = RolloutPlanHeader::with_id("myplan");
        stored.add_group(SingleRolloutGroup::new("main-server-group")).unwrap();
        let mut store = InMemoryPlanStore::default();
        store.insert(stored);

        let parsed = state(":add{rollout id=myplan}");
        let options = RequestOptions::default().with_plan_store(&store);
        let request = parsed.to_operation_request(&options).unwrap();
        assert_eq!(
            request.headers(),
            Some(&json!({"rollout-plan": {"in-series": [{"server-group": {"main-server-group": {}}}]}}))
        );

        let parsed = state(":add{rollout id=other}");
        assert_matches!(
            parsed.to_operation_request(&options),
            Err(RequestError::Rollout(RolloutError::UnknownRolloutPlan { .. }))
        );
    }
}
