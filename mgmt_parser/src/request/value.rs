//! Opportunistic typing of argument values
//!
//! A value that reads as a literal becomes that literal; anything else stays a
//! string. This is a convenience, not a grammar: `{a=1,b}` is not an object,
//! so it is kept as the string it was typed as.

use crate::grammar::separators::{
    ARG, ARG_NAME_VALUE, BRACKETS, ESCAPE, LIST_END, LIST_START, QUOTE,
};
use crate::lexical::unquote;
use serde_json::{Map, Number, Value};

const UNDEFINED: &str = "undefined";
const OBJECT_ARROW: &str = "=>";

/// Coerce a typed-in argument value into a document value.
pub fn coerce_value(text: &str) -> Value {
    let text = text.trim();

    if is_quoted(text) {
        return Value::String(unquote(text));
    }
    match text {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        UNDEFINED => return Value::Null,
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(int) = text.parse::<u64>() {
        return Value::Number(int.into());
    }
    // Integers beyond u64 stay strings
    if looks_decimal(text) {
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    if let Some(inner) = strip_brackets(text, LIST_START, LIST_END) {
        if let Ok(value @ Value::Array(_)) = serde_json::from_str::<Value>(text) {
            return value;
        }
        return Value::Array(split_top_level(inner).into_iter().map(coerce_value).collect());
    }
    if let Some(inner) = strip_brackets(text, '{', '}') {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
            return value;
        }
        if let Some(object) = object_from_pairs(inner) {
            return Value::Object(object);
        }
    }
    Value::String(text.to_string())
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with(QUOTE) && text.ends_with(QUOTE)
}

fn looks_decimal(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
        && text.chars().any(|c| c.is_ascii_digit())
        && text.contains(&['.', 'e', 'E'][..])
}

fn strip_brackets(text: &str, open: char, close: char) -> Option<&str> {
    text.strip_prefix(open)?.strip_suffix(close)
}

/// `name=value` or `"name" => value` items separated by `,`
fn object_from_pairs(inner: &str) -> Option<Map<String, Value>> {
    let mut object = Map::new();
    for item in split_top_level(inner) {
        let (name, value) = match item.split_once(OBJECT_ARROW) {
            Some(pair) => pair,
            None => item.split_once(ARG_NAME_VALUE)?,
        };
        let name = unquote(name.trim());
        if name.is_empty() {
            return None;
        }
        object.insert(name, coerce_value(value));
    }
    Some(object)
}

/// Split on `,` outside quotes and brackets, dropping blank items
fn split_top_level(text: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    let mut from = 0;

    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            ESCAPE => escaped = true,
            QUOTE => quoted = !quoted,
            _ if quoted => {}
            ARG if depth == 0 => {
                items.push(&text[from..i]);
                from = i + c.len_utf8();
            }
            _ if BRACKETS.iter().any(|&(open, _)| open == c) => depth += 1,
            _ if BRACKETS.iter().any(|&(_, close)| close == c) => {
                depth = depth.saturating_sub(1)
            }
            _ => {}
        }
    }
    items.push(&text[from..]);
    items.retain(|item| !item.trim().is_empty());
    items
}
