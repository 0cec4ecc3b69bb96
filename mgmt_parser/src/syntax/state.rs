//! Parse-state accumulator
//!
//! Folds tokenizer events into the address, operation, arguments and headers
//! of one line. Each event is applied atomically: every check runs before
//! anything is changed, so after a failed event the state (including the last
//! separator) still describes the last event that succeeded. A front-end
//! probing an invalid line therefore learns where parsing last went well.

use super::error::{Limit, ParseError, ParseResult};
use super::policy::ParsePolicy;
use crate::address::{AddressPath, AddressResult};
use crate::config::compile_time::arguments::{MAX_ARGUMENTS, MAX_VALUE_LENGTH};
use crate::config::compile_time::headers::MAX_HEADERS;
use crate::grammar::validator::{
    is_argument_name, is_flag, is_identifier, is_operation_name, strip_flag_prefix,
};
use crate::headers::OperationHeader;
use crate::rollout::{RolloutPosition, RolloutSeparator};
use crate::tokens::{EventKind, ParseEvent, SeparatorKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseState {
    policy: ParsePolicy,
    prefix: AddressPath,
    address: Option<AddressPath>,
    operation_name: Option<String>,
    named_arguments: Vec<(String, Option<String>)>,
    positional_arguments: Vec<String>,
    output_target: Option<String>,
    headers: Vec<OperationHeader>,
    in_arguments: bool,
    in_headers: bool,
    last_separator_kind: SeparatorKind,
    last_separator_index: Option<usize>,
    last_token_start_index: Option<usize>,
    rollout_position: Option<RolloutPosition>,
    ends_on_list_end: bool,
    is_complete: bool,
}

/// Apply `event` to a copy of `state`.
pub fn apply(state: &ParseState, event: &ParseEvent) -> ParseResult<ParseState> {
    let mut next = state.clone();
    next.apply(event)?;
    Ok(next)
}

impl ParseState {
    pub fn new(policy: ParsePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// A state whose address starts from a copy of `prefix`
    pub fn with_prefix(prefix: &AddressPath, policy: ParsePolicy) -> Self {
        Self {
            policy,
            prefix: prefix.clone(),
            ..Self::default()
        }
    }

    /// Back to a fresh state with the same prefix and policy
    pub fn reset(&mut self) {
        *self = Self::with_prefix(&self.prefix, self.policy);
    }

    pub fn apply(&mut self, event: &ParseEvent) -> ParseResult<()> {
        let index = event.index;
        match &event.kind {
            EventKind::RootNode => self.navigate(index, |address| {
                address.to_root();
                Ok(())
            })?,
            EventKind::ParentNode => self.navigate(index, |address| {
                address.ascend_to_parent();
                Ok(())
            })?,
            EventKind::NodeType(node_type) => {
                self.check_identifier(node_type, index, is_identifier)?;
                self.navigate(index, |address| address.descend_type(node_type))?
            }
            EventKind::NodeName(name) => {
                self.navigate(index, |address| address.descend_name(name))?
            }
            EventKind::NodeTypeOrName(value) => {
                let pending = self
                    .address
                    .as_ref()
                    .unwrap_or(&self.prefix)
                    .is_pending_type();
                if pending {
                    self.navigate(index, |address| address.descend_name(value))?
                } else {
                    self.check_identifier(value, index, is_identifier)?;
                    self.navigate(index, |address| address.descend_type(value))?
                }
            }
            EventKind::ClearNodeName => {
                self.navigate(index, |address| address.revert_to_type())?
            }
            EventKind::NodeSeparator => self.navigate(index, |_| Ok(()))?,
            EventKind::NodeTypeNameSeparator | EventKind::AddressOperationSeparator => {}
            EventKind::OperationName(name) => {
                self.check_identifier(name, index, is_operation_name)?;
                self.operation_name = Some(name.clone());
            }
            EventKind::PropertyListStart => self.in_arguments = true,
            EventKind::PropertyName(name) => {
                self.expect_arguments(event)?;
                self.check_identifier(name, index, is_argument_name)?;
                self.set_argument(strip_flag_prefix(name), None, index)?;
            }
            EventKind::Property { name, value } => {
                self.expect_arguments(event)?;
                self.check_identifier(name, index, is_argument_name)?;
                if value.len() > MAX_VALUE_LENGTH {
                    return Err(ParseError::limit(Limit::ValueLength, MAX_VALUE_LENGTH, index));
                }
                self.set_argument(strip_flag_prefix(name), Some(value), index)?;
            }
            EventKind::OtherValue(value) => {
                self.expect_arguments(event)?;
                if self.policy.positional_arguments && !is_flag(value) {
                    if self.argument_count() >= MAX_ARGUMENTS {
                        return Err(ParseError::limit(Limit::Arguments, MAX_ARGUMENTS, index));
                    }
                    self.positional_arguments.push(value.clone());
                } else {
                    self.check_identifier(value, index, is_argument_name)?;
                    self.set_argument(strip_flag_prefix(value), None, index)?;
                }
            }
            EventKind::PropertyNameValueSeparator | EventKind::PropertySeparator => {
                self.expect_arguments(event)?
            }
            EventKind::PropertyListEnd => {
                self.expect_arguments(event)?;
                self.in_arguments = false;
                self.is_complete = true;
            }
            EventKind::HeaderListStart => {
                self.in_arguments = false;
                self.in_headers = true;
            }
            EventKind::Header { header, .. } => {
                self.expect_headers(event)?;
                if let OperationHeader::Generic { name, .. } = header {
                    self.check_identifier(name, index, is_identifier)?;
                }
                self.set_header(header, index)?;
            }
            EventKind::HeaderSeparator => self.expect_headers(event)?,
            EventKind::HeaderListEnd => {
                self.expect_headers(event)?;
                self.in_headers = false;
            }
            EventKind::OutputTarget(target) => {
                if !self.policy.output_redirection {
                    return Err(ParseError::UnexpectedEvent {
                        event: event.kind.name(),
                        index,
                    });
                }
                self.output_target = Some(target.clone());
            }
        }

        self.record(event);
        Ok(())
    }

    /// Run an address operation on the address, creating it from the prefix
    /// on first use. A new address is dropped again if the operation fails.
    fn navigate<F>(&mut self, index: usize, op: F) -> ParseResult<()>
    where
        F: FnOnce(&mut AddressPath) -> AddressResult<()>,
    {
        let fresh = self.address.is_none();
        let address = self.address.get_or_insert_with(|| self.prefix.clone());
        if let Err(err) = op(address) {
            if fresh {
                self.address = None;
            }
            return Err(ParseError::from_address(err, index));
        }
        Ok(())
    }

    fn check_identifier(
        &self,
        token: &str,
        index: usize,
        valid: fn(&str) -> bool,
    ) -> ParseResult<()> {
        if self.policy.validate_identifiers && !valid(token) {
            return Err(ParseError::malformed_token(token, index));
        }
        Ok(())
    }

    fn expect_arguments(&self, event: &ParseEvent) -> ParseResult<()> {
        if !self.in_arguments {
            return Err(ParseError::UnexpectedEvent {
                event: event.kind.name(),
                index: event.index,
            });
        }
        Ok(())
    }

    fn expect_headers(&self, event: &ParseEvent) -> ParseResult<()> {
        if !self.in_headers {
            return Err(ParseError::UnexpectedEvent {
                event: event.kind.name(),
                index: event.index,
            });
        }
        Ok(())
    }

    fn argument_count(&self) -> usize {
        self.named_arguments.len() + self.positional_arguments.len()
    }

    /// Insert or replace a named argument, keeping its first position
    fn set_argument(
        &mut self,
        name: &str,
        value: Option<&String>,
        index: usize,
    ) -> ParseResult<()> {
        let value = value.cloned();
        if let Some(entry) = self.named_arguments.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value;
            return Ok(());
        }
        if self.argument_count() >= MAX_ARGUMENTS {
            return Err(ParseError::limit(Limit::Arguments, MAX_ARGUMENTS, index));
        }
        self.named_arguments.push((name.to_string(), value));
        Ok(())
    }

    fn set_header(&mut self, header: &OperationHeader, index: usize) -> ParseResult<()> {
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|existing| existing.name() == header.name())
        {
            *existing = header.clone();
            return Ok(());
        }
        if self.headers.len() >= MAX_HEADERS {
            return Err(ParseError::limit(Limit::Headers, MAX_HEADERS, index));
        }
        self.headers.push(header.clone());
        Ok(())
    }

    fn record(&mut self, event: &ParseEvent) {
        // a header leaves its block open, so the block's separator stays
        if let EventKind::Header { rollout, .. } = &event.kind {
            self.rollout_position = *rollout;
            self.last_token_start_index = Some(event.index);
            return;
        }
        self.rollout_position = None;
        self.last_separator_kind = event.kind.separator();
        if self.last_separator_kind != SeparatorKind::None {
            self.last_separator_index = Some(event.index);
        }
        self.ends_on_list_end = matches!(
            event.kind,
            EventKind::PropertyListEnd | EventKind::HeaderListEnd
        );
        if is_token(&event.kind) {
            self.last_token_start_index = Some(event.index);
        }
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    pub fn prefix(&self) -> &AddressPath {
        &self.prefix
    }

    /// The address built from the line, if any address event was applied
    pub fn address(&self) -> Option<&AddressPath> {
        self.address.as_ref()
    }

    /// The line's address, or the prefix when the line had none
    pub fn effective_address(&self) -> &AddressPath {
        self.address.as_ref().unwrap_or(&self.prefix)
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    pub fn named_arguments(&self) -> &[(String, Option<String>)] {
        &self.named_arguments
    }

    /// `Some(None)` for an argument given without a value
    pub fn argument(&self, name: &str) -> Option<Option<&str>> {
        self.named_arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_deref())
    }

    pub fn has_argument(&self, name: &str) -> bool {
        self.argument(name).is_some()
    }

    pub fn positional_arguments(&self) -> &[String] {
        &self.positional_arguments
    }

    pub fn output_target(&self) -> Option<&str> {
        self.output_target.as_deref()
    }

    pub fn headers(&self) -> &[OperationHeader] {
        &self.headers
    }

    pub fn has_address(&self) -> bool {
        self.address.is_some()
    }

    pub fn has_operation_name(&self) -> bool {
        self.operation_name.is_some()
    }

    pub fn has_properties(&self) -> bool {
        !self.named_arguments.is_empty() || !self.positional_arguments.is_empty()
    }

    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn last_separator_kind(&self) -> SeparatorKind {
        self.last_separator_kind
    }

    pub fn last_separator_index(&self) -> Option<usize> {
        self.last_separator_index
    }

    pub fn last_token_start_index(&self) -> Option<usize> {
        self.last_token_start_index
    }

    /// Where the rollout clause being typed stopped, when the line ends
    /// inside one
    pub fn rollout_position(&self) -> Option<RolloutPosition> {
        self.rollout_position
    }

    pub fn rollout_separator(&self) -> RolloutSeparator {
        self.rollout_position
            .map_or(RolloutSeparator::None, |position| position.separator)
    }

    /// True once the argument list has been closed
    pub fn is_request_complete(&self) -> bool {
        self.is_complete
    }

    pub fn ends_on_separator(&self) -> bool {
        self.last_separator_kind != SeparatorKind::None
    }

    pub fn ends_on(&self, kind: SeparatorKind) -> bool {
        self.last_separator_kind == kind
    }

    pub fn ends_on_node_separator(&self) -> bool {
        self.ends_on(SeparatorKind::NodeSeparator)
    }

    pub fn ends_on_node_type_name_separator(&self) -> bool {
        self.ends_on(SeparatorKind::NodeTypeName)
    }

    pub fn ends_on_address_operation_separator(&self) -> bool {
        self.ends_on(SeparatorKind::AddressOperation)
    }

    pub fn ends_on_property_list_start(&self) -> bool {
        self.ends_on(SeparatorKind::ArgListStart)
    }

    pub fn ends_on_property_value_separator(&self) -> bool {
        self.ends_on(SeparatorKind::ArgNameValue)
    }

    pub fn ends_on_property_separator(&self) -> bool {
        self.ends_on(SeparatorKind::ArgSeparator)
    }

    pub fn ends_on_header_list_start(&self) -> bool {
        self.ends_on(SeparatorKind::HeaderListStart)
    }

    pub fn ends_on_header_separator(&self) -> bool {
        self.ends_on(SeparatorKind::HeaderSeparator)
    }

    /// Last event closed an argument list or header block
    pub fn ends_on_list_end(&self) -> bool {
        self.ends_on_list_end
    }

    /// The text being typed at the end of `line`: everything after the last
    /// separator, or the last token when the line does not end on one. Inside
    /// a rollout clause the clause's own separators count.
    pub fn partial_token<'l>(&self, line: &'l str) -> &'l str {
        if self.ends_on_list_end {
            return "";
        }
        let rollout_start = self
            .rollout_position
            .and_then(|position| position.completion_start());
        let start = match (rollout_start, self.last_separator_kind, self.last_separator_index) {
            (Some(start), _, _) => start,
            (None, SeparatorKind::None, _) => self.last_token_start_index.unwrap_or(0),
            (None, _, Some(separator)) => separator + 1,
            (None, _, None) => 0,
        };
        line.get(start..).map(str::trim).unwrap_or("")
    }
}

fn is_token(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::ParentNode
            | EventKind::NodeType(_)
            | EventKind::NodeName(_)
            | EventKind::NodeTypeOrName(_)
            | EventKind::ClearNodeName
            | EventKind::OperationName(_)
            | EventKind::PropertyName(_)
            | EventKind::Property { .. }
            | EventKind::OtherValue(_)
            | EventKind::OutputTarget(_)
    )
}
