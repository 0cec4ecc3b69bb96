//! Scanner for the text of a `rollout` header
//!
//! ```text
//! rollout (id=<ref> | group ((','|'^') group)*) (prop[=value])*
//! group := name ['(' prop=value (',' prop=value)* ')']
//! ```
//!
//! `,` starts the next step in series and `^` joins the previous step. Plan
//! properties given without a value mean `true`. Like the line tokenizer, an
//! incomplete clause is not an error: the scanner records the last separator
//! it saw so a front-end can complete the group or property being typed.

use super::error::{RolloutError, RolloutResult};
use super::model::{RolloutPlanHeader, SingleRolloutGroup, PLAN_ID};
use crate::grammar::separators::{
    ARG, ARG_LIST_END, ARG_LIST_START, ARG_NAME_VALUE, ROLLOUT_CONCURRENT, ROLLOUT_SEQUENCE,
};

/// Separators of the rollout mini-grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RolloutSeparator {
    #[default]
    None,
    /// `,` between groups
    GroupSequence,
    /// `^` between groups
    GroupConcurrent,
    /// `(` opening a group's properties
    PropertyListStart,
    /// `,` between group properties
    PropertySeparator,
    /// `=` between a property name and its value
    PropertyValue,
}

impl RolloutSeparator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::GroupSequence => "group-sequence",
            Self::GroupConcurrent => "group-concurrent",
            Self::PropertyListStart => "property-list-start",
            Self::PropertySeparator => "property",
            Self::PropertyValue => "property-value",
        }
    }
}

/// Outcome of scanning one rollout clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutParse {
    pub header: RolloutPlanHeader,
    pub last_separator: RolloutSeparator,
    pub last_separator_index: Option<usize>,
    pub last_token_start_index: Option<usize>,
}

impl RolloutParse {
    pub fn ends_on_separator(&self) -> bool {
        self.last_separator != RolloutSeparator::None
    }

    pub fn position(&self) -> RolloutPosition {
        RolloutPosition {
            separator: self.last_separator,
            separator_index: self.last_separator_index,
            token_start: self.last_token_start_index,
        }
    }
}

/// Where scanning of a rollout clause stopped. Indices are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloutPosition {
    pub separator: RolloutSeparator,
    pub separator_index: Option<usize>,
    pub token_start: Option<usize>,
}

impl RolloutPosition {
    /// Offset of the text still being typed: just after the last separator,
    /// or the start of the last token.
    pub fn completion_start(&self) -> Option<usize> {
        match (self.separator, self.separator_index) {
            (RolloutSeparator::None, _) => self.token_start,
            (_, Some(index)) => Some(index + 1),
            (_, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Start,
    AfterGroup,
    AfterSequence,
    AfterConcurrent,
    Properties,
}

struct Scanner<'a> {
    text: &'a str,
    base: usize,
    pos: usize,
    position: Position,
    result: RolloutParse,
}

/// Scan the clause that follows the `rollout` keyword.
///
/// `base` is the offset of `text` within the full line; every recorded index
/// is absolute.
pub fn parse_rollout(text: &str, base: usize) -> RolloutResult<RolloutParse> {
    let mut scanner = Scanner {
        text,
        base,
        pos: 0,
        position: Position::Start,
        result: RolloutParse {
            header: RolloutPlanHeader::new(),
            last_separator: RolloutSeparator::None,
            last_separator_index: None,
            last_token_start_index: None,
        },
    };
    scanner.run()?;
    Ok(scanner.result)
}

fn ends_name(c: char) -> bool {
    c.is_whitespace()
        || c == ROLLOUT_SEQUENCE
        || c == ROLLOUT_CONCURRENT
        || c == ARG_LIST_START
        || c == ARG_LIST_END
        || c == ARG_NAME_VALUE
}

impl<'a> Scanner<'a> {
    fn run(&mut self) -> RolloutResult<()> {
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                return Ok(());
            };

            if c == ROLLOUT_SEQUENCE || c == ROLLOUT_CONCURRENT {
                self.group_separator(c)?;
                continue;
            }

            let name_start = self.pos;
            let name = self.read_while(|c| !ends_name(c));
            if name.is_empty() {
                return Err(RolloutError::malformed(
                    format!("unexpected '{}'", c),
                    self.abs(self.pos),
                ));
            }
            self.token(name_start);
            self.skip_whitespace();

            match self.peek() {
                Some(ARG_NAME_VALUE) => {
                    if !self.plan_property(name)? {
                        return Ok(());
                    }
                }
                Some(ARG_LIST_START) => self.group_with_properties(name)?,
                _ => self.bare_name(name)?,
            }
        }
    }

    fn group_separator(&mut self, c: char) -> RolloutResult<()> {
        match self.position {
            Position::AfterGroup => {}
            Position::Start if c == ROLLOUT_CONCURRENT => {}
            Position::Properties => {
                return Err(RolloutError::malformed(
                    "groups must precede plan properties",
                    self.abs(self.pos),
                ))
            }
            _ => {
                return Err(RolloutError::malformed(
                    format!("expected a group name before '{}'", c),
                    self.abs(self.pos),
                ))
            }
        }
        let (kind, position) = if c == ROLLOUT_SEQUENCE {
            (RolloutSeparator::GroupSequence, Position::AfterSequence)
        } else {
            (RolloutSeparator::GroupConcurrent, Position::AfterConcurrent)
        };
        self.separator(kind, self.pos);
        self.pos += c.len_utf8();
        self.position = position;
        Ok(())
    }

    /// `name = value`. Returns `false` when the value has not been typed yet.
    fn plan_property(&mut self, name: &'a str) -> RolloutResult<bool> {
        self.separator(RolloutSeparator::PropertyValue, self.pos);
        self.pos += ARG_NAME_VALUE.len_utf8();
        self.skip_whitespace();

        let value_start = self.pos;
        let value = self.read_while(|c| !c.is_whitespace());
        if value.is_empty() {
            return Ok(false);
        }
        self.token(value_start);

        match self.position {
            Position::AfterSequence | Position::AfterConcurrent => {
                return Err(RolloutError::malformed(
                    format!("expected a group name, found property '{}'", name),
                    self.abs(value_start),
                ))
            }
            Position::Start if name == PLAN_ID => self.result.header.set_plan_ref(value)?,
            _ => self.result.header.add_property(name, value)?,
        }
        self.position = Position::Properties;
        Ok(true)
    }

    fn group_with_properties(&mut self, name: &'a str) -> RolloutResult<()> {
        if self.position == Position::Properties {
            return Err(RolloutError::malformed(
                "groups must precede plan properties",
                self.abs(self.pos),
            ));
        }
        let text = self.text;
        let open = self.pos;
        self.separator(RolloutSeparator::PropertyListStart, open);

        let inner_start = open + ARG_LIST_START.len_utf8();
        let close = text[inner_start..]
            .find(ARG_LIST_END)
            .map(|offset| inner_start + offset);
        let inner_end = close.unwrap_or(text.len());

        let mut group = SingleRolloutGroup::new(name);
        let items: Vec<(usize, &str)> = split_with_offsets(&text[inner_start..inner_end], ARG)
            .map(|(offset, item)| (inner_start + offset, item))
            .collect();
        let count = items.len();

        for (i, (offset, item)) in items.into_iter().enumerate() {
            let is_last = i + 1 == count;
            if i > 0 {
                self.separator(RolloutSeparator::PropertySeparator, offset - 1);
            }
            let trimmed = item.trim();
            if trimmed.is_empty() {
                if is_last {
                    continue;
                }
                return Err(RolloutError::malformed(
                    "empty group property",
                    self.abs(offset),
                ));
            }
            self.token(offset + leading_whitespace(item));

            let Some(eq) = item.find(ARG_NAME_VALUE) else {
                if is_last && close.is_none() {
                    continue;
                }
                return Err(RolloutError::invalid_property(trimmed, ""));
            };
            let prop_name = item[..eq].trim();
            let raw_value = &item[eq + 1..];
            let prop_value = raw_value.trim();
            self.separator(RolloutSeparator::PropertyValue, offset + eq);
            if prop_value.is_empty() {
                if is_last && close.is_none() {
                    continue;
                }
            } else {
                self.token(offset + eq + 1 + leading_whitespace(raw_value));
            }
            group.add_property(prop_name, prop_value)?;
        }

        self.add_group(group)?;
        match close {
            Some(close) => {
                self.token(close);
                self.pos = close + ARG_LIST_END.len_utf8();
            }
            None => self.pos = text.len(),
        }
        Ok(())
    }

    fn bare_name(&mut self, name: &'a str) -> RolloutResult<()> {
        match self.position {
            Position::Start | Position::AfterSequence | Position::AfterConcurrent => {
                self.add_group(SingleRolloutGroup::new(name))
            }
            Position::AfterGroup | Position::Properties => {
                self.result.header.add_property(name, "true")?;
                self.position = Position::Properties;
                Ok(())
            }
        }
    }

    fn add_group(&mut self, group: SingleRolloutGroup) -> RolloutResult<()> {
        match self.position {
            Position::AfterConcurrent => self.result.header.add_concurrent_group(group)?,
            _ => self.result.header.add_group(group)?,
        }
        self.position = Position::AfterGroup;
        Ok(())
    }

    fn separator(&mut self, kind: RolloutSeparator, offset: usize) {
        self.result.last_separator = kind;
        self.result.last_separator_index = Some(self.abs(offset));
    }

    fn token(&mut self, offset: usize) {
        self.result.last_separator = RolloutSeparator::None;
        self.result.last_token_start_index = Some(self.abs(offset));
    }

    fn abs(&self, offset: usize) -> usize {
        self.base + offset
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        self.read_while(char::is_whitespace);
    }

    fn read_while<F: Fn(char) -> bool>(&mut self, keep: F) -> &'a str {
        let text = self.text;
        let rest = &text[self.pos..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !keep(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn split_with_offsets(text: &str, sep: char) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split(sep).map(move |piece| {
        let start = offset;
        offset += piece.len() + sep.len_utf8();
        (start, piece)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::RolloutPlanGroup;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn plan(text: &str) -> RolloutPlanHeader {
        parse_rollout(text, 0).unwrap().header
    }

    #[test]
    fn test_single_group() {
        let header = plan("groupA");
        assert_eq!(header.groups().len(), 1);
        assert_eq!(header.groups()[0].group_names(), vec!["groupA"]);
    }

    #[test]
    fn test_group_with_properties() {
        let header = plan("groupA(rolling-to-servers=true,max-failure-percentage=20)");
        let RolloutPlanGroup::Single(group) = &header.groups()[0] else {
            panic!("expected a single group");
        };
        assert_eq!(group.property("rolling-to-servers"), Some("true"));
        assert_eq!(group.property("max-failure-percentage"), Some("20"));
    }

    #[test]
    fn test_plan_properties() {
        let header = plan("prop1=value1 prop2 = value2");
        assert!(header.groups().is_empty());
        assert_eq!(header.property("prop1"), Some("value1"));
        assert_eq!(header.property("prop2"), Some("value2"));
    }

    #[test]
    fn test_plan_reference() {
        let header = plan("id = myplan");
        assert_eq!(header.plan_ref(), Some("myplan"));
        assert!(header.groups().is_empty());
    }

    #[test]
    fn test_mixed_plan_serializes_in_series() {
        let header = plan(
            "groupA(rolling-to-servers=true,max-failure-percentage=20) ^ groupB, groupC,\
             groupD(rolling-to-servers=true,max-failed-servers=1) ^ groupE rollback-across-groups",
        );
        assert_eq!(
            header.to_value(None).unwrap(),
            json!({
                "in-series": [
                    {"concurrent-groups": {
                        "groupA": {"rolling-to-servers": "true", "max-failure-percentage": "20"},
                        "groupB": {}
                    }},
                    {"server-group": {"groupC": {}}},
                    {"concurrent-groups": {
                        "groupD": {"rolling-to-servers": "true", "max-failed-servers": "1"},
                        "groupE": {}
                    }}
                ],
                "rollback-across-groups": "true"
            })
        );
    }

    #[test]
    fn test_sequence_names_with_whitespace() {
        let header = plan("groupA ,  groupB");
        assert_eq!(header.groups().len(), 2);
        let header = plan("groupA ^  groupB");
        assert_eq!(header.groups().len(), 1);
        assert_eq!(header.groups()[0].group_names(), vec!["groupA", "groupB"]);
    }

    #[test]
    fn test_leading_concurrent_has_no_preceding_group() {
        assert_matches!(
            parse_rollout("^groupA", 0),
            Err(RolloutError::NoPrecedingGroup { .. })
        );
    }

    #[test]
    fn test_separator_tracking_for_incomplete_input() {
        let parsed = parse_rollout("groupA,", 10).unwrap();
        assert_eq!(parsed.last_separator, RolloutSeparator::GroupSequence);
        assert_eq!(parsed.last_separator_index, Some(16));
        assert_eq!(parsed.header.groups().len(), 1);

        let parsed = parse_rollout("groupA(rolling-to-servers=", 0).unwrap();
        assert_eq!(parsed.last_separator, RolloutSeparator::PropertyValue);
        assert!(parsed.header.groups()[0].group_names() == vec!["groupA"]);

        let parsed = parse_rollout("groupA ^ gr", 0).unwrap();
        assert!(!parsed.ends_on_separator());
        assert_eq!(parsed.last_token_start_index, Some(9));
        assert_eq!(parsed.position().completion_start(), Some(9));

        let parsed = parse_rollout(" groupA^", 12).unwrap();
        assert_eq!(parsed.position().separator, RolloutSeparator::GroupConcurrent);
        assert_eq!(parsed.position().completion_start(), Some(20));
    }

    #[test]
    fn test_blank_property_in_closed_list_is_invalid() {
        assert_matches!(
            parse_rollout("groupA(rolling-to-servers=)", 0),
            Err(RolloutError::InvalidProperty { .. })
        );
    }

    #[test]
    fn test_groups_after_properties_are_malformed() {
        assert_matches!(
            parse_rollout("rollback-across-groups=true , groupA", 0),
            Err(RolloutError::MalformedPlan { .. })
        );
    }
}
