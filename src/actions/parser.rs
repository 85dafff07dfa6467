use super::{Action, DELIMITER, ExpectKind, ScrollTarget};
use crate::errors::ParseError;

const FILL_FORMAT: &str = "fill:selector:value";
const EXPECT_FORMAT: &str = "expect:type:value";
const LOOP_FORMAT: &str = "loop:count:action";
const IF_FORMAT: &str = "if:selector:action";

/// Parse a command string into an [`Action`].
///
/// ```
/// use scout::actions::{parse, Action};
///
/// let action = parse("fill:\"div:nth-child(2)\":hello").unwrap();
/// assert_eq!(
///     action,
///     Action::Fill { selector: "div:nth-child(2)".into(), value: "hello".into() }
/// );
/// ```
pub fn parse(command: &str) -> Result<Action, ParseError> {
    let Some((kind, params)) = command.split_once(DELIMITER) else {
        return Err(ParseError::MissingDelimiter(command.to_string()));
    };

    match kind {
        "click" => Ok(Action::Click {
            selector: single("click", params, "click:selector")?,
        }),
        "fill" => parse_fill(params),
        "wait" => {
            let raw = unquote(params);
            let ms = raw.trim().parse::<u64>().map_err(|_| ParseError::InvalidNumber {
                kind: "wait",
                value: raw.clone(),
            })?;
            Ok(Action::Wait { ms })
        }
        "goto" => Ok(Action::Goto {
            url: single("goto", params, "goto:url")?,
        }),
        "press" => Ok(Action::Press {
            key: single("press", params, "press:key")?,
        }),
        "scroll" => Ok(Action::Scroll {
            target: ScrollTarget::from_param(single("scroll", params, "scroll:top|bottom|selector")?),
        }),
        "expect" => parse_expect(params),
        "loop" => parse_loop(params),
        "if" => parse_condition(params),
        other => Err(ParseError::UnknownType(other.to_string())),
    }
}

/// Split off the first field at the first delimiter that is not inside quotes.
///
/// The remainder is `None` when there is no such delimiter.
pub(crate) fn peel(input: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                return (&input[..i], Some(&input[i + DELIMITER.len_utf8()..]));
            }
            _ => {}
        }
    }

    (input, None)
}

/// Strip surrounding quotes from a field and resolve its escapes.
///
/// Fields that are not wrapped in quotes come back unchanged.
pub(crate) fn unquote(field: &str) -> String {
    if field.len() < 2 || !field.starts_with('"') || !field.ends_with('"') {
        return field.to_string();
    }

    match serde_json::from_str::<String>(field) {
        Ok(literal) => literal,
        Err(_) => unescape(&field[1..field.len() - 1]),
    }
}

// Lenient fallback for quoted fields that are not valid JSON string literals
// (raw tabs, `\d` and the like): a backslash keeps the next character as-is.
fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn single(kind: &'static str, params: &str, format: &'static str) -> Result<String, ParseError> {
    let value = unquote(params);
    if value.is_empty() {
        return Err(ParseError::MissingParameter {
            kind,
            params: params.to_string(),
            format,
        });
    }
    Ok(value)
}

fn missing(kind: &'static str, params: &str, format: &'static str) -> ParseError {
    ParseError::MissingParameter {
        kind,
        params: params.to_string(),
        format,
    }
}

fn parse_fill(params: &str) -> Result<Action, ParseError> {
    let (selector, rest) = peel(params);
    let selector = unquote(selector);
    match rest {
        // Everything after the selector is the value, colons included
        Some(value) if !selector.is_empty() => Ok(Action::Fill {
            selector,
            value: unquote(value),
        }),
        _ => Err(missing("fill", params, FILL_FORMAT)),
    }
}

fn parse_expect(params: &str) -> Result<Action, ParseError> {
    let (kind, rest) = peel(params);
    let value = match rest {
        Some(value) if !value.is_empty() => unquote(value),
        _ => return Err(missing("expect", params, EXPECT_FORMAT)),
    };
    let kind_name = unquote(kind);
    let kind = ExpectKind::from_name(&kind_name).ok_or(ParseError::UnknownExpectation(kind_name))?;
    Ok(Action::Expect { kind, value })
}

fn parse_loop(params: &str) -> Result<Action, ParseError> {
    let (count, rest) = peel(params);
    let inner = match rest {
        Some(inner) if !inner.is_empty() => inner,
        _ => return Err(missing("loop", params, LOOP_FORMAT)),
    };
    let raw = unquote(count);
    let count = raw.trim().parse::<u32>().map_err(|_| ParseError::InvalidNumber {
        kind: "loop",
        value: raw.clone(),
    })?;

    Ok(Action::Loop {
        count,
        action: Box::new(parse(inner)?),
    })
}

fn parse_condition(params: &str) -> Result<Action, ParseError> {
    let (selector, rest) = peel(params);
    let selector = unquote(selector);
    let inner = match rest {
        Some(inner) if !inner.is_empty() && !selector.is_empty() => inner,
        _ => return Err(missing("if", params, IF_FORMAT)),
    };

    Ok(Action::Condition {
        selector,
        action: Box::new(parse(inner)?),
    })
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod parser_test;
