//! Shell configuration file
//!
//! ```toml
//! prefix = "/profile=full"
//!
//! [parser]
//! positional_arguments = true
//!
//! [[plans]]
//! id = "nightly"
//! rollout = "groupA^groupB rollback-across-groups"
//! ```
//!
//! Every key is optional. Parser keys override the `MGMT_PARSER_*`
//! environment preferences.

use mgmt_parser::config::runtime::ParserPreferences;
use mgmt_parser::rollout::{parse_rollout, InMemoryPlanStore, RolloutError};
use mgmt_parser::{parse_line, AddressPath, ParsePolicy, PipelineError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid prefix '{prefix}': {source}")]
    Prefix {
        prefix: String,
        source: PipelineError,
    },

    #[error("Prefix '{prefix}' must be an address ending on a named node")]
    NotAnAddress { prefix: String },

    #[error("Stored plan '{id}': {source}")]
    Plan { id: String, source: RolloutError },

    #[error("Stored plan '{id}' is incomplete")]
    IncompletePlan { id: String },

    #[error("Stored plan '{id}' cannot refer to another plan")]
    PlanReference { id: String },
}

/// Per-key overrides of [`ParserPreferences`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserOverrides {
    pub validate_identifiers: Option<bool>,
    pub positional_arguments: Option<bool>,
    pub output_redirection: Option<bool>,
    pub coerce_values: Option<bool>,
    pub allow_trailing_type: Option<bool>,
}

impl ParserOverrides {
    pub fn apply(&self, mut preferences: ParserPreferences) -> ParserPreferences {
        if let Some(value) = self.validate_identifiers {
            preferences.validate_identifiers = value;
        }
        if let Some(value) = self.positional_arguments {
            preferences.positional_arguments = value;
        }
        if let Some(value) = self.output_redirection {
            preferences.output_redirection = value;
        }
        if let Some(value) = self.coerce_values {
            preferences.coerce_values = value;
        }
        if let Some(value) = self.allow_trailing_type {
            preferences.allow_trailing_type = value;
        }
        preferences
    }
}

/// A rollout plan kept under an id, written without the `rollout` keyword
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredPlan {
    pub id: String,
    pub rollout: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Address every line starts from
    pub prefix: Option<String>,
    pub parser: ParserOverrides,
    pub plans: Vec<StoredPlan>,
}

impl ShellConfig {
    pub fn load(path: &Path) -> Result<Self, ShellError> {
        let text = std::fs::read_to_string(path).map_err(|source| ShellError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ShellError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn preferences(&self) -> ParserPreferences {
        self.parser.apply(ParserPreferences::default())
    }

    /// The configured prefix, or the root
    pub fn prefix_path(&self) -> Result<AddressPath, ShellError> {
        match &self.prefix {
            Some(prefix) => parse_prefix(prefix),
            None => Ok(AddressPath::new()),
        }
    }

    /// Parse every stored plan into a store. A later plan replaces an earlier
    /// one with the same id.
    pub fn plan_store(&self) -> Result<InMemoryPlanStore, ShellError> {
        let mut store = InMemoryPlanStore::default();
        for plan in &self.plans {
            let parsed = parse_rollout(&plan.rollout, 0).map_err(|source| ShellError::Plan {
                id: plan.id.clone(),
                source,
            })?;
            if parsed.header.plan_ref().is_some() {
                return Err(ShellError::PlanReference {
                    id: plan.id.clone(),
                });
            }
            if parsed.ends_on_separator() || parsed.header.groups().is_empty() {
                return Err(ShellError::IncompletePlan {
                    id: plan.id.clone(),
                });
            }
            log::debug!("Stored rollout plan '{}'", plan.id);
            store.insert(parsed.header.stored_as(plan.id.as_str()));
        }
        Ok(store)
    }
}

/// Parse an address such as `/profile=full/subsystem=threads`.
///
/// Only a complete address is accepted: no operation, no headers and no
/// pending type.
pub fn parse_prefix(text: &str) -> Result<AddressPath, ShellError> {
    let state = parse_line(&AddressPath::new(), text, ParsePolicy::operation()).map_err(
        |source| ShellError::Prefix {
            prefix: text.to_string(),
            source,
        },
    )?;

    let address = state.effective_address();
    if state.has_operation_name()
        || state.has_headers()
        || state.ends_on_separator()
        || address.first_pending().is_some()
    {
        return Err(ShellError::NotAnAddress {
            prefix: text.to_string(),
        });
    }
    Ok(address.clone())
}
