//! Rule-text parsing.
//!
//! A rule string is a `;`-separated list of components, each introduced by a
//! three-character marker:
//!
//! ```text
//! [p] (pause:200); [n] ./*[1] (pitch:0.3); [t] "super; script"; [n] ./*[2]
//! └─┬──────────┘   └──┬─────┘ └────┬────┘  └────────┬─────────┘
//!   Personality      Node      attributes     Text (quoted literal)
//! ```
//!
//! Parsing happens in two steps:
//!
//! 1. `split_unquoted` cuts the rule on `;`, ignoring separators that sit
//!    inside a double-quoted literal. The same scanner cuts attribute blocks
//!    on `,`.
//! 2. `parse_component_with` reads one segment: marker, content, and an
//!    optional trailing ` (key:value, flag)` attribute block.
//!
//! Printing is the inverse and lives in the `Display` impls of
//! [`Component`](crate::Component) and [`Action`](crate::Action); for every
//! accepted rule, parsing the printed form yields an equal action.
//!
//! ## Quoting
//!
//! A backslash inside a literal escapes the next character, so `\"` never
//! closes or opens a literal. Quotes outside literals must balance; an odd
//! count is a parse error rather than being silently repaired.

use crate::api::Dialect;
use crate::{Action, Component, ComponentKind, Result, RuleError};

/// Parse a rule string with the default ([`Dialect::Quoted`]) dialect.
pub fn parse_action(text: &str) -> Result<Action> {
    parse_action_with(text, Dialect::Quoted)
}

/// Parse a rule string into an [`Action`].
///
/// Whitespace-only segments (e.g. a trailing `;`) are ignored.
pub fn parse_action_with(text: &str, dialect: Dialect) -> Result<Action> {
    let mut components = Vec::new();
    for segment in split_unquoted(text, ';')? {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        components.push(parse_component_with(segment, dialect)?);
    }
    Ok(Action::new(components))
}

/// Parse a single component (`[n] ./*[1] (pitch:0.3)`) with the default dialect.
pub fn parse_component(text: &str) -> Result<Component> {
    parse_component_with(text, Dialect::Quoted)
}

pub(crate) fn parse_component_with(text: &str, dialect: Dialect) -> Result<Component> {
    let text = text.trim();
    let marker = regex!(r"^\[[A-Za-z]\]")
        .find(text)
        .ok_or_else(|| RuleError::parse(format!("Missing component marker: {text}")))?
        .as_str();
    let kind = ComponentKind::from_marker(marker)
        .ok_or_else(|| RuleError::parse(format!("Unknown component marker {marker} in: {text}")))?;

    let rest = text[marker.len()..].trim_start();
    if rest.is_empty() {
        return Err(RuleError::parse(format!("Missing content: {text}")));
    }

    match kind {
        ComponentKind::Personality => {
            let mut comp = Component::personality();
            parse_attributes(rest, &mut comp)?;
            Ok(comp)
        }
        ComponentKind::Text if rest.starts_with('"') => {
            let close = closing_quote(rest).ok_or_else(|| RuleError::parse(format!("Invalid string syntax: {rest}")))?;
            let mut comp = match dialect {
                Dialect::Quoted => Component::new(kind, &rest[..=close]),
                Dialect::Literal => {
                    let mut comp = Component::new(kind, unescape(&rest[1..close]).trim());
                    comp.mark_literal();
                    comp
                }
            };
            let trailing = rest[close + 1..].trim();
            if !trailing.is_empty() {
                parse_attributes(trailing, &mut comp)?;
            }
            Ok(comp)
        }
        ComponentKind::Node | ComponentKind::Multi | ComponentKind::Text => {
            let (content, attrs) = match find_unquoted(rest, " (") {
                Some(idx) => (rest[..idx].trim(), Some(rest[idx..].trim())),
                None => (rest.trim(), None),
            };
            if content.is_empty() {
                return Err(RuleError::parse(format!("Missing content: {text}")));
            }
            let mut comp = Component::new(kind, content);
            if let Some(attrs) = attrs {
                parse_attributes(attrs, &mut comp)?;
            }
            Ok(comp)
        }
    }
}

/// Parse `(key:value, flag, ...)` into `comp`'s attributes.
///
/// A token without `:` is a flag and is stored as `"true"`. The value is
/// everything after the first colon, so `ctxtfunc:a:b` keeps `a:b`.
fn parse_attributes(block: &str, comp: &mut Component) -> Result<()> {
    if block.len() < 2 || !block.starts_with('(') || !block.ends_with(')') || !balanced_block(block) {
        return Err(RuleError::parse(format!("Invalid attribute expression: {block}")));
    }
    let inner = &block[1..block.len() - 1];
    if inner.trim().is_empty() {
        return Ok(());
    }
    for token in split_unquoted(inner, ',')? {
        let token = token.trim();
        let (key, value) = match token.find(':') {
            Some(colon) => (token[..colon].trim(), token[colon + 1..].trim()),
            None => (token, "true"),
        };
        if key.is_empty() {
            return Err(RuleError::parse(format!("Empty attribute name in: {block}")));
        }
        comp.set_attribute(key, value);
    }
    Ok(())
}

/// True when the parentheses of `block` balance outside literals and the
/// first `(` is closed by the final `)`.
fn balanced_block(block: &str) -> bool {
    let last = block.len() - 1;
    let mut depth = 0usize;
    let mut scan = QuoteScanner::default();
    for (idx, ch) in block.char_indices() {
        if !scan.outside(ch) {
            continue;
        }
        match ch {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 && idx != last {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !scan.in_quote
}

/// Split `input` on `sep`, skipping separators inside double quotes.
///
/// ```text
/// [t] "matrix; 3 by 3"; [n] ./*[1]
///                ^ quoted, kept  ^ split
/// ```
///
/// Segments are returned untrimmed.
fn split_unquoted(input: &str, sep: char) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut scan = QuoteScanner::default();
    for (idx, ch) in input.char_indices() {
        let outside = scan.outside(ch);
        if outside && ch == sep {
            parts.push(&input[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    if scan.in_quote {
        return Err(RuleError::parse(format!("Invalid string in expression: {input}")));
    }
    parts.push(&input[start..]);
    Ok(parts)
}

/// Byte index of the first occurrence of `pat` outside quotes.
fn find_unquoted(input: &str, pat: &str) -> Option<usize> {
    let mut scan = QuoteScanner::default();
    for (idx, ch) in input.char_indices() {
        if scan.outside(ch) && input[idx..].starts_with(pat) {
            return Some(idx);
        }
    }
    None
}

/// Index of the quote closing the literal that opens at byte 0.
fn closing_quote(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in input.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            return Some(idx);
        }
    }
    None
}

fn unescape(body: &str) -> String {
    body.replace("\\\"", "\"")
}

/// Tracks whether the scan position is inside a double-quoted literal.
#[derive(Default)]
struct QuoteScanner {
    in_quote: bool,
    escaped: bool,
}

impl QuoteScanner {
    /// Feed one character; returns true when it sits outside any literal
    /// and is not itself a quote.
    fn outside(&mut self, ch: char) -> bool {
        if self.escaped {
            self.escaped = false;
            return false;
        }
        match ch {
            '\\' if self.in_quote => {
                self.escaped = true;
                false
            }
            '"' => {
                self.in_quote = !self.in_quote;
                false
            }
            _ => !self.in_quote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(action: &Action) -> Vec<ComponentKind> {
        action.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn parses_mixed_rule() {
        let action = parse_action(r#"[p] (pause:200); [n] ./*[1] (pitch:0.3, rate:-0.1); [t] "super"; [m] ./* (separator:"and")"#)
            .unwrap();

        assert_eq!(
            kinds(&action),
            vec![ComponentKind::Personality, ComponentKind::Node, ComponentKind::Text, ComponentKind::Multi]
        );
        assert_eq!(action.components[0].content, "");
        assert_eq!(action.components[0].attribute("pause"), Some("200"));
        assert_eq!(action.components[1].content, "./*[1]");
        assert_eq!(action.components[1].attribute("rate"), Some("-0.1"));
        assert_eq!(action.components[2].content, "\"super\"");
        assert_eq!(action.components[3].attribute("separator"), Some("\"and\""));
    }

    #[test]
    fn semicolon_inside_quotes_does_not_split() {
        let action = parse_action(r#"[t] "matrix; 3 by 3"; [n] ./*[1]"#).unwrap();
        assert_eq!(action.len(), 2);
        assert_eq!(action.components[0].content, "\"matrix; 3 by 3\"");
        assert_eq!(action.components[1].content, "./*[1]");
    }

    #[test]
    fn bare_attribute_is_true() {
        let comp = parse_component("[n] ./*[1] (grammar, pitch:0.5)").unwrap();
        assert_eq!(comp.attribute("grammar"), Some("true"));
        assert_eq!(comp.attribute("pitch"), Some("0.5"));
    }

    #[test]
    fn attribute_value_keeps_later_colons() {
        let comp = parse_component("[n] . (ctxtfunc:CTXF:ordinal)").unwrap();
        assert_eq!(comp.attribute("ctxtfunc"), Some("CTXF:ordinal"));
    }

    #[test]
    fn trailing_separator_is_ignored() {
        let action = parse_action("[n] text(); ").unwrap();
        assert_eq!(action.len(), 1);
    }

    #[test]
    fn blank_rule_is_an_empty_action() {
        assert!(parse_action("").unwrap().is_empty());
        assert!(parse_action(" ;  ; ").unwrap().is_empty());
    }

    #[test]
    fn legacy_string_marker_reads_as_text() {
        let comp = parse_component(r#"[s]"over""#).unwrap();
        assert_eq!(comp.kind, ComponentKind::Text);
        assert_eq!(comp.literal(), Some("over"));
        assert_eq!(comp.to_string(), r#"[t] "over""#);
    }

    #[test]
    fn literal_dialect_strips_quotes() {
        let action = parse_action_with(r#"[t] " squared " (pause:10); [t] text()"#, Dialect::Literal).unwrap();
        let lit = &action.components[0];
        assert_eq!(lit.content, "squared");
        assert!(lit.is_literal());
        assert_eq!(lit.attribute("pause"), Some("10"));
        assert!(!action.components[1].is_literal());
        assert_eq!(action.to_string(), r#"[t] "squared" (pause:10); [t] text()"#);
    }

    #[test]
    fn escaped_quote_stays_inside_literal() {
        let action = parse_action_with(r#"[t] "say \"hi\"; now"; [n] ."#, Dialect::Literal).unwrap();
        assert_eq!(action.len(), 2);
        assert_eq!(action.components[0].content, "say \"hi\"; now");
        let again = parse_action_with(&action.to_string(), Dialect::Literal).unwrap();
        assert_eq!(again, action);
    }

    #[test]
    fn round_trip_preserves_components() {
        let rules = [
            "[n] ./*[1]",
            r#"[p] (pause:400); [n] ./*[1] (pitch:0.3); [p] (pause:400); [n] ./*[2] (pitch:-0.3)"#,
            r#"[t] "Square root of"; [m] ./* (rate:0.2, separator:"plus"); [p] (pause:400)"#,
            r#"[t] "a, b; c" (volume:0.5); [n] @id"#,
            r#"[m] ./*[position()>1] (ctxtfunc:CTXF:ordinal, context:"(x)", grammar)"#,
        ];
        for rule in rules {
            let action = parse_action(rule).unwrap();
            let printed = action.to_string();
            let reparsed = parse_action(&printed).unwrap();
            assert!(reparsed.same_as(&action), "round trip changed {rule:?} -> {printed:?}");
        }
    }

    #[test]
    fn rejects_unknown_marker() {
        let err = parse_action("[x] ./*").unwrap_err();
        assert!(matches!(err, RuleError::Parse(ref m) if m.contains("[x]")), "{err}");
        assert!(parse_action("./*[1]").is_err());
    }

    #[test]
    fn rejects_missing_content() {
        assert!(parse_action("[n]").is_err());
        assert!(parse_action("[p]").is_err());
        assert!(parse_action("[n] ./*[1]; [m]  ").is_err());
    }

    #[test]
    fn rejects_unbalanced_quotes() {
        let err = parse_action(r#"[t] "open; [n] ./*[1]"#).unwrap_err();
        assert!(matches!(err, RuleError::Parse(_)));
    }

    #[test]
    fn rejects_malformed_attribute_blocks() {
        assert!(parse_component("[n] ./*[1] (pitch:0.3").is_err());
        assert!(parse_component("[p] pause:200").is_err());
        assert!(parse_component("[p] (a)(b)").is_err());
        assert!(parse_component("[p] (a))").is_err());
        assert!(parse_component("[p] (:1)").is_err());
        assert!(parse_component(r#"[t] "x" trailing"#).is_err());
    }

    #[test]
    fn empty_attribute_block_is_allowed() {
        let comp = parse_component("[p] ()").unwrap();
        assert!(!comp.has_attributes());
        assert_eq!(comp.to_string(), "[p] ()");
        assert_eq!(parse_component(&comp.to_string()).unwrap(), comp);
    }
}
