//! One shell session: a prefix, parser settings and stored plans, applied to
//! every line the user enters

use crate::config::{ShellConfig, ShellError};
use mgmt_parser::config::runtime::ParserPreferences;
use mgmt_parser::utils::{format_error, Span};
use mgmt_parser::{
    build_request, headers_value_from_str, parse_line, probe_line, AddressPath,
    InMemoryPlanStore, NodePathFormatter, ParsePolicy, ParseState, PipelineError,
    RequestOptions,
};
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};

/// What `run_lines` prints for each line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Request,
    State,
    Probe,
}

/// Counts reported at the end of `run_lines`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineSummary {
    pub processed: usize,
    pub failed: usize,
}

pub struct Session {
    prefix: AddressPath,
    policy: ParsePolicy,
    preferences: ParserPreferences,
    store: InMemoryPlanStore,
}

impl Session {
    pub fn new(
        prefix: AddressPath,
        preferences: ParserPreferences,
        store: InMemoryPlanStore,
    ) -> Self {
        Self {
            prefix,
            policy: ParsePolicy::from_preferences(&preferences),
            preferences,
            store,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Result<Self, ShellError> {
        Ok(Self::new(
            config.prefix_path()?,
            config.preferences(),
            config.plan_store()?,
        ))
    }

    pub fn with_prefix(mut self, prefix: AddressPath) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn prefix(&self) -> &AddressPath {
        &self.prefix
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    fn options(&self) -> RequestOptions<'_> {
        RequestOptions::from_preferences(&self.preferences).with_plan_store(&self.store)
    }

    /// The request document for `line`
    pub fn request(&self, line: &str) -> Result<Value, PipelineError> {
        build_request(&self.prefix, line, self.policy, &self.options())
            .map(|request| request.to_value())
    }

    /// What the parser accumulated for `line`, without building a request
    pub fn state(&self, line: &str) -> Result<Value, PipelineError> {
        let state = parse_line(&self.prefix, line, self.policy)?;
        Ok(state_summary(&state))
    }

    /// Completion information for a partially typed line
    pub fn probe(&self, line: &str) -> Value {
        let probe = probe_line(&self.prefix, line, self.policy);
        let state = &probe.state;
        json!({
            "address": NodePathFormatter::default().format(state.effective_address()),
            "separator": state.last_separator_kind().as_str(),
            "separator_index": state.last_separator_index(),
            "token_start": state.last_token_start_index(),
            "rollout_separator": state.rollout_separator().as_str(),
            "partial": state.partial_token(line),
            "complete": state.is_request_complete(),
            "error": probe.error.as_ref().map(ToString::to_string),
        })
    }

    /// The document of a `{ rollout ... }` header block
    pub fn rollout(&self, block: &str) -> Result<Value, PipelineError> {
        headers_value_from_str(block, Some(&self.store))
    }

    /// Process one line per input line. Blank lines and `#` comments are
    /// skipped; a failing line is reported and the next one is processed.
    pub fn run_lines<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        mode: LineMode,
    ) -> io::Result<LineSummary> {
        let mut summary = LineSummary::default();
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            summary.processed += 1;

            let result = match mode {
                LineMode::Request => self.request(trimmed),
                LineMode::State => self.state(trimmed),
                LineMode::Probe => Ok(self.probe(trimmed)),
            };
            match result {
                Ok(value) => writeln!(output, "{}", value)?,
                Err(err) => {
                    summary.failed += 1;
                    log::debug!("Line {} failed: {}", summary.processed, err);
                    write!(output, "{}", diagnostic(trimmed, &err))?;
                }
            }
        }
        Ok(summary)
    }
}

/// Render an error with a caret under the offending part of the line
pub fn diagnostic(line: &str, err: &PipelineError) -> String {
    match err {
        PipelineError::Parse(parse) => format_error(line, parse.span(), &err.to_string()),
        _ => format_error(line, Span::new(0, line.len()), &err.to_string()),
    }
}

fn state_summary(state: &ParseState) -> Value {
    let arguments: Map<String, Value> = state
        .named_arguments()
        .iter()
        .map(|(name, value)| {
            let value = value.as_ref().map_or(Value::Null, |v| Value::String(v.clone()));
            (name.clone(), value)
        })
        .collect();
    let headers: Vec<Value> = state
        .headers()
        .iter()
        .map(|header| Value::String(header.name().to_string()))
        .collect();

    json!({
        "address": NodePathFormatter::default().format(state.effective_address()),
        "operation": state.operation_name(),
        "arguments": arguments,
        "positional": state.positional_arguments(),
        "headers": headers,
        "output": state.output_target(),
        "separator": state.last_separator_kind().as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let config = ShellConfig::from_toml(
            r#"
prefix = "/profile=full"

[parser]
validate_identifiers = true
positional_arguments = false
output_redirection = false
coerce_values = true
allow_trailing_type = false

[[plans]]
id = "nightly"
rollout = "groupA^groupB"
"#,
        )
        .unwrap();
        Session::from_config(&config).unwrap()
    }

    #[test]
    fn test_request_uses_prefix() {
        let value = session().request(":read-resource(recursive=true)").unwrap();
        assert_eq!(
            value,
            json!({
                "operation": "read-resource",
                "address": [{"profile": "full"}],
                "recursive": true
            })
        );
    }

    #[test]
    fn test_request_resolves_stored_plan() {
        let value = session().request(":restart{rollout id=nightly}").unwrap();
        assert_eq!(
            value["operation-headers"],
            json!({"rollout-plan": {"in-series": [
                {"concurrent-groups": {"groupA": {}, "groupB": {}}}
            ]}})
        );
    }

    #[test]
    fn test_completion_reports_partial_token() {
        let value = session().probe("subsystem=thr");
        assert_eq!(value["separator"], json!("none"));
        assert_eq!(value["partial"], json!("thr"));
        assert_eq!(value["error"], Value::Null);

        let value = session().probe("subsystem=threads:");
        assert_eq!(value["separator"], json!("address-operation"));
        assert_eq!(value["separator_index"], json!(17));
        assert_eq!(value["partial"], json!(""));
    }

    #[test]
    fn test_completion_inside_rollout_header() {
        let value = session().probe(":restart{rollout groupA^");
        assert_eq!(value["separator"], json!("header-list-start"));
        assert_eq!(value["rollout_separator"], json!("group-concurrent"));
        assert_eq!(value["partial"], json!(""));

        let value = session().probe(":restart{rollout groupA^gr");
        assert_eq!(value["rollout_separator"], json!("none"));
        assert_eq!(value["partial"], json!("gr"));
    }

    #[test]
    fn test_state_summary() {
        let value = session().state("subsystem=threads:add(count=,name=x)").unwrap();
        assert_eq!(value["address"], json!("/profile=full/subsystem=threads"));
        assert_eq!(value["operation"], json!("add"));
        assert_eq!(value["arguments"], json!({"count": null, "name": "x"}));
    }

    #[test]
    fn test_rollout_block() {
        let value = session().rollout("{rollout groupA,groupB}").unwrap();
        assert_eq!(
            value,
            json!({"rollout-plan": {"in-series": [
                {"server-group": {"groupA": {}}},
                {"server-group": {"groupB": {}}}
            ]}})
        );
    }

    #[test]
    fn test_run_lines_continues_after_failure() {
        let input = "# comment\n:read-resource\n\na=b//c:read-resource\n:whoami\n";
        let mut output = Vec::new();
        let summary = session()
            .run_lines(input.as_bytes(), &mut output, LineMode::Request)
            .unwrap();
        assert_eq!(summary, LineSummary { processed: 3, failed: 1 });

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("\"operation\":\"read-resource\""));
        assert!(output.contains("\"operation\":\"whoami\""));
        assert!(output.contains("Error: "));
        assert!(output.contains("  | a=b//c:read-resource"));
    }

    #[test]
    fn test_diagnostic_without_index() {
        let err = session().request("subsystem=threads").unwrap_err();
        let text = diagnostic("subsystem=threads", &err);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("^^^^"));
    }
}
