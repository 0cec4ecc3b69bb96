//! Character-level scanner for operation lines
//!
//! ```text
//! [./][/]type=name(/type=name)* [':' op ['(' arg (',' arg)* ')'] ['{' header (';' header)* '}'] ['>' target]]
//! ```
//!
//! Separator searches skip double-quoted text, backslash escapes and anything
//! nested inside `()`, `[]` or `{}`. The scanner never fails on a line that is
//! merely incomplete; it stops emitting at the point the input runs out.

use crate::config::compile_time::lexical::{MAX_LINE_LENGTH, MAX_NESTING_DEPTH, MAX_TOKEN_LENGTH};
use crate::grammar::separators::{
    ADDRESS_OPERATION, ARG, ARG_LIST_END, ARG_LIST_START, ARG_NAME_VALUE, BRACKETS, ESCAPE,
    HEADER, HEADER_LIST_END, HEADER_LIST_START, NODE, NODE_TYPE_NAME, NODE_TYPE_ONLY,
    OUTPUT_REDIRECT, PARENT_NODE, QUOTE, RELATIVE_MARKER,
};
use crate::headers::OperationHeader;
use crate::syntax::{Limit, ParseError, ParseResult};
use crate::tokens::{EventKind, ParseEvent};

/// Tokenize `line`, passing each event to `emit` as it is found.
///
/// An error returned by `emit` stops the scan and is returned unchanged.
pub fn tokenize_line<F>(line: &str, emit: F) -> ParseResult<()>
where
    F: FnMut(ParseEvent) -> ParseResult<()>,
{
    if line.len() > MAX_LINE_LENGTH {
        return Err(ParseError::limit(
            Limit::LineLength,
            MAX_LINE_LENGTH,
            MAX_LINE_LENGTH,
        ));
    }
    LineScanner { line, emit }.scan()
}

/// Tokenize `line` into a list of events.
pub fn tokenize(line: &str) -> ParseResult<Vec<ParseEvent>> {
    let mut events = Vec::new();
    tokenize_line(line, |event| {
        events.push(event);
        Ok(())
    })?;
    Ok(events)
}

/// Parse a standalone `{ header; header }` block, as used for argument values
/// that carry headers.
pub fn tokenize_header_block(text: &str) -> ParseResult<Vec<OperationHeader>> {
    let start = text.len() - text.trim_start().len();
    if !text[start..].starts_with(HEADER_LIST_START) {
        return Err(ParseError::malformed_token(text.trim(), start));
    }

    let mut headers = Vec::new();
    let mut scanner = LineScanner {
        line: text,
        emit: |event: ParseEvent| -> ParseResult<()> {
            if let EventKind::Header { header, .. } = event.kind {
                headers.push(header);
            }
            Ok(())
        },
    };
    if let Some(next) = scanner.header_list(start)? {
        scanner.expect_end(next)?;
    }
    Ok(headers)
}

struct LineScanner<'a, F> {
    line: &'a str,
    emit: F,
}

impl<'a, F> LineScanner<'a, F>
where
    F: FnMut(ParseEvent) -> ParseResult<()>,
{
    fn scan(&mut self) -> ParseResult<()> {
        let len = self.line.len();
        let operation_separator = self.find_top_level(0, len, &[ADDRESS_OPERATION])?;
        self.address(0, operation_separator.unwrap_or(len))?;

        let Some(separator) = operation_separator else {
            return Ok(());
        };
        self.event(separator, EventKind::AddressOperationSeparator)?;
        self.operation(separator + ADDRESS_OPERATION.len_utf8())
    }

    fn address(&mut self, start: usize, end: usize) -> ParseResult<()> {
        let line = self.line;
        let mut pos = start + leading_whitespace(&line[start..end]);
        if line[pos..end].starts_with(RELATIVE_MARKER) {
            self.event(pos + 1, EventKind::NodeSeparator)?;
            pos += RELATIVE_MARKER.len();
        }

        let segments = self.split_top_level(pos, end, NODE)?;
        let last = segments.len() - 1;
        let mut after_root = false;

        for (i, &(seg_start, seg_end)) in segments.iter().enumerate() {
            if i > 0 && !after_root {
                self.event(seg_start - NODE.len_utf8(), EventKind::NodeSeparator)?;
            }
            after_root = false;

            let raw = &line[seg_start..seg_end];
            let segment = raw.trim();
            let index = seg_start + leading_whitespace(raw);

            if segment.is_empty() {
                if i == 0 && last > 0 {
                    self.event(seg_end, EventKind::RootNode)?;
                    after_root = true;
                    continue;
                }
                if i == last {
                    continue;
                }
                return Err(ParseError::malformed_address("empty node", seg_end));
            }
            self.node(segment, index)?;
        }
        Ok(())
    }

    fn node(&mut self, segment: &str, index: usize) -> ParseResult<()> {
        let line = self.line;
        if segment == PARENT_NODE {
            return self.event(index, EventKind::ParentNode);
        }
        if segment == NODE_TYPE_ONLY {
            return self.event(index, EventKind::ClearNodeName);
        }

        let end = index + segment.len();
        match self.find_top_level(index, end, &[NODE_TYPE_NAME])? {
            Some(eq) => {
                let node_type = line[index..eq].trim();
                if node_type.is_empty() {
                    return Err(ParseError::malformed_address("node name without a type", eq));
                }
                self.check_token(node_type, index)?;
                self.event(index, EventKind::NodeType(node_type.to_string()))?;
                self.event(eq, EventKind::NodeTypeNameSeparator)?;

                let raw_name = &line[eq + NODE_TYPE_NAME.len_utf8()..end];
                let name = raw_name.trim();
                if !name.is_empty() {
                    let name_index = eq + NODE_TYPE_NAME.len_utf8() + leading_whitespace(raw_name);
                    self.check_token(name, name_index)?;
                    self.event(name_index, EventKind::NodeName(unquote(name)))?;
                }
                Ok(())
            }
            None => {
                self.check_token(segment, index)?;
                self.event(index, EventKind::NodeTypeOrName(unquote(segment)))
            }
        }
    }

    fn operation(&mut self, start: usize) -> ParseResult<()> {
        let line = self.line;
        let len = line.len();
        let name_end = self
            .find_top_level(start, len, &[ARG_LIST_START, HEADER_LIST_START, OUTPUT_REDIRECT])?
            .unwrap_or(len);

        let raw = &line[start..name_end];
        let name = raw.trim();
        if !name.is_empty() {
            let index = start + leading_whitespace(raw);
            self.check_token(name, index)?;
            self.event(index, EventKind::OperationName(name.to_string()))?;
        }

        let mut pos = name_end;
        if self.peek(pos) == Some(ARG_LIST_START) {
            match self.argument_list(pos)? {
                Some(next) => pos = self.skip_whitespace(next),
                None => return Ok(()),
            }
        }
        if self.peek(pos) == Some(HEADER_LIST_START) {
            match self.header_list(pos)? {
                Some(next) => pos = self.skip_whitespace(next),
                None => return Ok(()),
            }
        }
        if self.peek(pos) == Some(OUTPUT_REDIRECT) {
            let target_start = pos + OUTPUT_REDIRECT.len_utf8();
            let raw = &line[target_start..];
            let target = raw.trim();
            let index = if target.is_empty() {
                target_start
            } else {
                target_start + leading_whitespace(raw)
            };
            return self.event(index, EventKind::OutputTarget(target.to_string()));
        }
        self.expect_end(pos)
    }

    /// Returns the offset after `)`, or `None` when the list is not closed.
    fn argument_list(&mut self, open: usize) -> ParseResult<Option<usize>> {
        let line = self.line;
        self.event(open, EventKind::PropertyListStart)?;
        let start = open + ARG_LIST_START.len_utf8();
        let close = self.find_top_level(start, line.len(), &[ARG_LIST_END])?;
        let end = close.unwrap_or(line.len());

        let arguments = self.split_top_level(start, end, ARG)?;
        let last = arguments.len() - 1;
        for (i, &(arg_start, arg_end)) in arguments.iter().enumerate() {
            if i > 0 {
                self.event(arg_start - ARG.len_utf8(), EventKind::PropertySeparator)?;
            }
            let raw = &line[arg_start..arg_end];
            let argument = raw.trim();
            if argument.is_empty() {
                if i == last {
                    continue;
                }
                return Err(ParseError::malformed_token(ARG.to_string(), arg_end));
            }
            self.argument(argument, arg_start + leading_whitespace(raw))?;
        }

        match close {
            Some(close) => {
                self.event(close, EventKind::PropertyListEnd)?;
                Ok(Some(close + ARG_LIST_END.len_utf8()))
            }
            None => Ok(None),
        }
    }

    fn argument(&mut self, argument: &str, index: usize) -> ParseResult<()> {
        let line = self.line;
        let end = index + argument.len();
        let Some(eq) = self.find_top_level(index, end, &[ARG_NAME_VALUE])? else {
            self.check_token(argument, index)?;
            return self.event(index, EventKind::OtherValue(argument.to_string()));
        };

        let name = line[index..eq].trim();
        if name.is_empty() {
            return Err(ParseError::malformed_token(argument, index));
        }
        self.check_token(name, index)?;
        self.event(index, EventKind::PropertyName(name.to_string()))?;
        self.event(eq, EventKind::PropertyNameValueSeparator)?;

        let raw_value = &line[eq + ARG_NAME_VALUE.len_utf8()..end];
        let value = raw_value.trim();
        if value.is_empty() {
            return Ok(());
        }
        let value_index = eq + ARG_NAME_VALUE.len_utf8() + leading_whitespace(raw_value);
        self.event(
            value_index,
            EventKind::Property {
                name: name.to_string(),
                value: value.to_string(),
            },
        )
    }

    /// Returns the offset after `}`, or `None` when the block is not closed.
    fn header_list(&mut self, open: usize) -> ParseResult<Option<usize>> {
        let line = self.line;
        self.event(open, EventKind::HeaderListStart)?;
        let start = open + HEADER_LIST_START.len_utf8();
        let close = self.find_top_level(start, line.len(), &[HEADER_LIST_END])?;
        let end = close.unwrap_or(line.len());

        let headers = self.split_top_level(start, end, HEADER)?;
        let last = headers.len() - 1;
        for (i, &(header_start, header_end)) in headers.iter().enumerate() {
            if i > 0 {
                self.event(header_start - HEADER.len_utf8(), EventKind::HeaderSeparator)?;
            }
            let raw = &line[header_start..header_end];
            match OperationHeader::parse_with_position(raw, header_start)? {
                Some((header, rollout)) => {
                    let index = header_start + leading_whitespace(raw);
                    self.event(index, EventKind::Header { header, rollout })?;
                }
                None if i == last => {}
                None => return Err(ParseError::malformed_token(HEADER.to_string(), header_end)),
            }
        }

        match close {
            Some(close) => {
                self.event(close, EventKind::HeaderListEnd)?;
                Ok(Some(close + HEADER_LIST_END.len_utf8()))
            }
            None => Ok(None),
        }
    }

    fn expect_end(&self, pos: usize) -> ParseResult<()> {
        let pos = self.skip_whitespace(pos);
        if pos < self.line.len() {
            return Err(ParseError::malformed_token(self.line[pos..].trim_end(), pos));
        }
        Ok(())
    }

    fn event(&mut self, index: usize, kind: EventKind) -> ParseResult<()> {
        (self.emit)(ParseEvent::new(index, kind))
    }

    fn check_token(&self, token: &str, index: usize) -> ParseResult<()> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(ParseError::limit(Limit::TokenLength, MAX_TOKEN_LENGTH, index));
        }
        Ok(())
    }

    fn peek(&self, pos: usize) -> Option<char> {
        self.line[pos..].chars().next()
    }

    fn skip_whitespace(&self, pos: usize) -> usize {
        pos + leading_whitespace(&self.line[pos..])
    }

    /// First offset in `start..end` holding one of `targets` outside quotes,
    /// escapes and brackets.
    fn find_top_level(
        &self,
        start: usize,
        end: usize,
        targets: &[char],
    ) -> ParseResult<Option<usize>> {
        let mut depth = 0usize;
        let mut quoted = false;
        let mut escaped = false;

        for (offset, c) in self.line[start..end].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            if c == ESCAPE {
                escaped = true;
                continue;
            }
            if c == QUOTE {
                quoted = !quoted;
                continue;
            }
            if quoted {
                continue;
            }
            if depth == 0 && targets.contains(&c) {
                return Ok(Some(start + offset));
            }
            if BRACKETS.iter().any(|&(open, _)| open == c) {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(ParseError::limit(
                        Limit::NestingDepth,
                        MAX_NESTING_DEPTH,
                        start + offset,
                    ));
                }
            } else if BRACKETS.iter().any(|&(_, close)| close == c) {
                depth = depth.saturating_sub(1);
            }
        }
        Ok(None)
    }

    /// Split `start..end` on top-level `separator`. Always yields at least one
    /// range.
    fn split_top_level(
        &self,
        start: usize,
        end: usize,
        separator: char,
    ) -> ParseResult<Vec<(usize, usize)>> {
        let mut ranges = Vec::new();
        let mut from = start;
        while let Some(found) = self.find_top_level(from, end, &[separator])? {
            ranges.push((from, found));
            from = found + separator.len_utf8();
        }
        ranges.push((from, end));
        Ok(ranges)
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Remove quotes and resolve backslash escapes in a node name
pub fn unquote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            QUOTE => {}
            _ => out.push(c),
        }
    }
    out
}
