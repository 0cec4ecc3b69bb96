//! Parse-state accumulation
//!
//! Turns the event stream of one line into a [`ParseState`]. What is checked
//! and accepted along the way is controlled by a [`ParsePolicy`] value.

mod error;
mod policy;
mod state;

pub use error::{Limit, ParseError, ParseResult};
pub use policy::ParsePolicy;
pub use state::{apply, ParseState};

use crate::address::AddressPath;
use crate::lexical::tokenize_line;
use crate::log_debug;

/// Tokenize `line` and fold its events into a state that starts from `prefix`.
pub fn parse_events(
    prefix: &AddressPath,
    line: &str,
    policy: ParsePolicy,
) -> ParseResult<ParseState> {
    let mut state = ParseState::with_prefix(prefix, policy);
    accumulate(&mut state, line)?;
    Ok(state)
}

/// Feed the events of `line` into an existing state, returning the number of
/// events applied.
///
/// On error the state holds everything applied up to the failing event.
pub fn accumulate(state: &mut ParseState, line: &str) -> ParseResult<usize> {
    let mut count = 0usize;
    let result = tokenize_line(line, |event| {
        state.apply(&event)?;
        count += 1;
        Ok(())
    });
    log_debug!("Applied line events", "events" => count, "ok" => result.is_ok());
    result.map(|()| count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_accumulate_keeps_progress_on_error() {
        let mut state = ParseState::new(ParsePolicy::operation());
        let result = accumulate(&mut state, "subsystem=threads:write(1x=2)");
        assert_matches!(result, Err(ParseError::MalformedToken { .. }));
        assert_eq!(state.operation_name(), Some("write"));
        assert!(state.ends_on_property_list_start());

        let mut state = ParseState::new(ParsePolicy::operation());
        assert_eq!(accumulate(&mut state, "subsystem=threads:read-resource"), Ok(5));
    }

    #[test]
    fn test_parse_events_from_prefix() {
        let prefix = AddressPath::from_pairs([("subsystem", "threads")]).unwrap();
        let state = parse_events(&prefix, ":read-resource", ParsePolicy::operation()).unwrap();
        assert!(!state.has_address());
        assert_eq!(state.effective_address(), &prefix);
    }
}
