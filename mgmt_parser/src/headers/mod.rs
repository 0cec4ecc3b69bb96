//! Operation headers given in a `{ ... }` block after the operation
//!
//! A header is either a rollout plan (`rollout groupA^groupB`) or a plain
//! `name[=value]` pair.

use crate::grammar::separators::{ARG_NAME_VALUE, ROLLOUT_HEADER};
use crate::rollout::{
    parse_rollout, RolloutPlanHeader, RolloutPlanStore, RolloutPosition, RolloutResult,
};
use crate::syntax::ParseError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationHeader {
    Rollout(RolloutPlanHeader),
    Generic { name: String, value: Option<String> },
}

impl OperationHeader {
    pub fn generic(name: impl Into<String>, value: Option<&str>) -> Self {
        Self::Generic {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Rollout(_) => ROLLOUT_HEADER,
            Self::Generic { name, .. } => name,
        }
    }

    /// Parse one header of a header block. `base` is the offset of `text`
    /// within the line. Blank text yields `None`.
    pub fn parse(text: &str, base: usize) -> Result<Option<Self>, ParseError> {
        Ok(Self::parse_with_position(text, base)?.map(|(header, _)| header))
    }

    /// Like [`OperationHeader::parse`], also returning where the scan of a
    /// rollout clause stopped.
    pub fn parse_with_position(
        text: &str,
        base: usize,
    ) -> Result<Option<(Self, Option<RolloutPosition>)>, ParseError> {
        let start = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if let Some(rest) = trimmed.strip_prefix(ROLLOUT_HEADER) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let rest_base = base + start + ROLLOUT_HEADER.len();
                let parsed = parse_rollout(rest, rest_base).map_err(|source| {
                    ParseError::Rollout {
                        source,
                        index: rest_base,
                    }
                })?;
                let position = parsed.position();
                return Ok(Some((Self::Rollout(parsed.header), Some(position))));
            }
        }

        let (name, value) = match trimmed.split_once(ARG_NAME_VALUE) {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (trimmed, None),
        };
        if name.is_empty() {
            return Err(ParseError::MalformedToken {
                token: trimmed.to_string(),
                index: base + start,
            });
        }
        let header = Self::generic(name, value.filter(|value| !value.is_empty()));
        Ok(Some((header, None)))
    }

    /// Insert this header into a headers document. A generic header without
    /// a value is skipped; callers that require values check first.
    pub fn add_to(
        &self,
        headers: &mut Map<String, Value>,
        store: Option<&dyn RolloutPlanStore>,
    ) -> RolloutResult<()> {
        match self {
            Self::Rollout(plan) => plan.add_to(headers, store),
            Self::Generic { name, value } => {
                if let Some(value) = value {
                    headers.insert(name.clone(), Value::String(value.clone()));
                }
                Ok(())
            }
        }
    }
}

/// Convert a list of headers into the `operation-headers` document.
pub fn headers_to_value(
    headers: &[OperationHeader],
    store: Option<&dyn RolloutPlanStore>,
) -> RolloutResult<Value> {
    let mut document = Map::new();
    for header in headers {
        header.add_to(&mut document, store)?;
    }
    Ok(Value::Object(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::{RolloutError, RolloutSeparator};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_generic_header() {
        let header = OperationHeader::parse(" allow-resource-service-restart = true ", 0)
            .unwrap()
            .unwrap();
        assert_eq!(
            header,
            OperationHeader::generic("allow-resource-service-restart", Some("true"))
        );

        let header = OperationHeader::parse("blocking", 0).unwrap().unwrap();
        assert_eq!(header, OperationHeader::generic("blocking", None));
        assert!(OperationHeader::parse("   ", 0).unwrap().is_none());
    }

    #[test]
    fn test_rollout_header() {
        let header = OperationHeader::parse("rollout groupA^groupB", 0)
            .unwrap()
            .unwrap();
        assert_eq!(header.name(), "rollout");
        let OperationHeader::Rollout(plan) = header else {
            panic!("expected a rollout header");
        };
        assert_eq!(plan.groups()[0].group_names(), vec!["groupA", "groupB"]);
    }

    #[test]
    fn test_rollout_position_is_absolute() {
        let (_, position) = OperationHeader::parse_with_position(" rollout groupA^", 4)
            .unwrap()
            .unwrap();
        let position = position.unwrap();
        assert_eq!(position.separator, RolloutSeparator::GroupConcurrent);
        assert_eq!(position.separator_index, Some(19));

        let (_, position) = OperationHeader::parse_with_position("blocking", 0)
            .unwrap()
            .unwrap();
        assert_eq!(position, None);
    }

    #[test]
    fn test_name_starting_with_rollout_is_generic() {
        let header = OperationHeader::parse("rollouts=2", 0).unwrap().unwrap();
        assert_eq!(header.name(), "rollouts");
    }

    #[test]
    fn test_rollout_errors_carry_offset() {
        let err = OperationHeader::parse("  rollout ^groupA", 5).unwrap_err();
        assert_matches!(
            err,
            ParseError::Rollout {
                source: RolloutError::NoPrecedingGroup { .. },
                index: 14
            }
        );
    }

    #[test]
    fn test_empty_header_name_is_malformed() {
        assert_matches!(
            OperationHeader::parse("=value", 3),
            Err(ParseError::MalformedToken { index: 3, .. })
        );
    }

    #[test]
    fn test_headers_document() {
        let headers = vec![
            OperationHeader::parse("rollout groupA", 0).unwrap().unwrap(),
            OperationHeader::generic("blocking-timeout", Some("30")),
        ];
        assert_eq!(
            headers_to_value(&headers, None).unwrap(),
            json!({
                "rollout-plan": {"in-series": [{"server-group": {"groupA": {}}}]},
                "blocking-timeout": "30"
            })
        );
    }
}
