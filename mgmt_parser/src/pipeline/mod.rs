mod error;
mod result;

pub use error::PipelineError;
pub use result::{PipelineResult, ProbeResult};

use crate::address::AddressPath;
use crate::lexical::tokenize_header_block;
use crate::logging::{self, codes};
use crate::request::{build_headers, OperationRequest, RequestOptions};
use crate::rollout::RolloutPlanStore;
use crate::syntax::{accumulate, ParsePolicy, ParseState};
use crate::{log_debug, log_error, log_success};
use serde_json::Value;
use std::time::Instant;

/// Parse a line starting from `prefix` (line -> events -> state)
pub fn parse_line(
    prefix: &AddressPath,
    line: &str,
    policy: ParsePolicy,
) -> Result<ParseState, PipelineError> {
    logging::with_line_context(line, || {
        let mut state = ParseState::with_prefix(prefix, policy);
        match accumulate(&mut state, line) {
            Ok(events) => {
                log_success!(codes::success::PARSE_STATE_COMPLETE, "Line parsed",
                    "events" => events,
                    "separator" => state.last_separator_kind()
                );
                Ok(state)
            }
            Err(err) => {
                log_error!(err.error_code(), "Line parsing failed",
                    span = err.span(),
                    "error" => &err
                );
                Err(err.into())
            }
        }
    })
}

/// Parse as far as the line allows, for completion.
///
/// Never fails: the state reached so far comes back together with the error
/// that stopped parsing, if any.
pub fn probe_line(prefix: &AddressPath, line: &str, policy: ParsePolicy) -> ProbeResult {
    logging::with_line_context(line, || {
        let mut state = ParseState::with_prefix(prefix, policy);
        let error = accumulate(&mut state, line).err();
        log_debug!("Line probed",
            "separator" => state.last_separator_kind(),
            "partial" => state.partial_token(line),
            "failed" => error.is_some()
        );
        ProbeResult { state, error }
    })
}

/// Parse a line and build its request document
pub fn build_request(
    prefix: &AddressPath,
    line: &str,
    policy: ParsePolicy,
    options: &RequestOptions<'_>,
) -> Result<OperationRequest, PipelineError> {
    process_line(prefix, line, policy, options).map(|result| result.request)
}

/// Complete pipeline for one line (tokenize -> accumulate -> request)
pub fn process_line(
    prefix: &AddressPath,
    line: &str,
    policy: ParsePolicy,
    options: &RequestOptions<'_>,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_line_context(line, || -> Result<PipelineResult, PipelineError> {
        crate::log_info!("Processing operation line", "length" => line.len());

        let mut state = ParseState::with_prefix(prefix, policy);
        let event_count = accumulate(&mut state, line).map_err(|err| {
            log_error!(err.error_code(), "Line parsing failed",
                span = err.span(),
                "error" => &err
            );
            PipelineError::from(err)
        })?;

        let request = state.to_operation_request(options).map_err(|err| {
            log_error!(err.error_code(), "Request building failed", "error" => &err);
            PipelineError::from(err)
        })?;

        let result = PipelineResult {
            state,
            request,
            event_count,
            processing_duration: start_time.elapsed(),
        };
        result.log_success();
        Ok(result)
    })
}

/// Convert a `{ header; header }` block given as text into its document form
pub fn headers_value_from_str(
    text: &str,
    store: Option<&dyn RolloutPlanStore>,
) -> Result<Value, PipelineError> {
    let headers = tokenize_header_block(text)?;
    let value = build_headers(&headers, store)?;
    log_success!(codes::success::ROLLOUT_PLAN_PARSED, "Header block converted",
        "headers" => headers.len()
    );
    Ok(value)
}
