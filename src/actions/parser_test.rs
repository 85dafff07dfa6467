// Unit tests for the command parser

use super::*;
use crate::actions::{Action, ExpectKind, ScrollTarget};
use crate::errors::ParseError;
use pretty_assertions::assert_eq;

fn click(selector: &str) -> Action {
    Action::Click {
        selector: selector.to_string(),
    }
}

fn fill(selector: &str, value: &str) -> Action {
    Action::Fill {
        selector: selector.to_string(),
        value: value.to_string(),
    }
}

#[test]
fn test_parse_simple_commands() {
    assert_eq!(parse("click:button").unwrap(), click("button"));
    assert_eq!(
        parse("fill:#email:test@example.com").unwrap(),
        fill("#email", "test@example.com")
    );
    assert_eq!(parse("wait:1000").unwrap(), Action::Wait { ms: 1000 });
    assert_eq!(
        parse("goto:https://example.com").unwrap(),
        Action::Goto {
            url: "https://example.com".to_string()
        }
    );
    assert_eq!(
        parse("press:Enter").unwrap(),
        Action::Press {
            key: "Enter".to_string()
        }
    );
    assert_eq!(
        parse("scroll:bottom").unwrap(),
        Action::Scroll {
            target: ScrollTarget::Bottom
        }
    );
    assert_eq!(
        parse("scroll:top").unwrap(),
        Action::Scroll {
            target: ScrollTarget::Top
        }
    );
    assert_eq!(
        parse("scroll:#footer").unwrap(),
        Action::Scroll {
            target: ScrollTarget::Selector("#footer".to_string())
        }
    );
}

#[test]
fn test_parse_expectations() {
    assert_eq!(
        parse("expect:text:Welcome back").unwrap(),
        Action::Expect {
            kind: ExpectKind::Text,
            value: "Welcome back".to_string()
        }
    );
    assert_eq!(
        parse("expect:selector:#dashboard").unwrap(),
        Action::Expect {
            kind: ExpectKind::Selector,
            value: "#dashboard".to_string()
        }
    );
    assert_eq!(
        parse("expect:url:https://example.com/home").unwrap(),
        Action::Expect {
            kind: ExpectKind::Url,
            value: "https://example.com/home".to_string()
        }
    );
}

#[test]
fn test_fill_value_absorbs_colons() {
    assert_eq!(
        parse("fill:#api-key:key:123:abc").unwrap(),
        fill("#api-key", "key:123:abc")
    );
    assert_eq!(
        parse("fill:input[name='email']:user@test.com").unwrap(),
        fill("input[name='email']", "user@test.com")
    );
}

#[test]
fn test_quoted_fields() {
    assert_eq!(
        parse("fill:\"div:nth-child(2)\":test").unwrap(),
        fill("div:nth-child(2)", "test")
    );
    assert_eq!(
        parse("click:\"button:with:colon\"").unwrap(),
        click("button:with:colon")
    );
    assert_eq!(
        parse("fill:#id:\"value:complex\"").unwrap(),
        fill("#id", "value:complex")
    );
    assert_eq!(
        parse("fill:\"#id:complex\":\"value:complex\"").unwrap(),
        fill("#id:complex", "value:complex")
    );
    assert_eq!(parse("wait:\"1000\"").unwrap(), Action::Wait { ms: 1000 });
    assert_eq!(parse("click:\"a:b\"").unwrap(), click("a:b"));
}

#[test]
fn test_escaped_quotes_in_quoted_selector() {
    assert_eq!(
        parse(r#"fill:"input[name=\"foo\"]":val"#).unwrap(),
        fill("input[name=\"foo\"]", "val")
    );
    assert_eq!(parse(r#"click:"a\\b""#).unwrap(), click("a\\b"));
}

#[test]
fn test_unquoted_selector_with_quoted_attribute() {
    // Delimiters inside an attribute value's quotes do not split the field
    assert_eq!(
        parse(r#"fill:input[name="a:b"]:val"#).unwrap(),
        fill(r#"input[name="a:b"]"#, "val")
    );
}

#[test]
fn test_parse_loop_and_condition() {
    assert_eq!(
        parse("loop:3:click:#btn").unwrap(),
        Action::Loop {
            count: 3,
            action: Box::new(click("#btn"))
        }
    );
    assert_eq!(
        parse("if:#exists:click:#btn").unwrap(),
        Action::Condition {
            selector: "#exists".to_string(),
            action: Box::new(click("#btn"))
        }
    );
    assert_eq!(
        parse("if:\"li:first-child\":fill:#q:a:b").unwrap(),
        Action::Condition {
            selector: "li:first-child".to_string(),
            action: Box::new(fill("#q", "a:b"))
        }
    );
}

#[test]
fn test_parse_nested_control_flow() {
    assert_eq!(
        parse("loop:2:if:#exists:click:#btn").unwrap(),
        Action::Loop {
            count: 2,
            action: Box::new(Action::Condition {
                selector: "#exists".to_string(),
                action: Box::new(click("#btn"))
            })
        }
    );
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        parse("click"),
        Err(ParseError::MissingDelimiter(_))
    ));
    assert!(matches!(parse("fly:moon"), Err(ParseError::UnknownType(t)) if t == "fly"));
    assert!(matches!(
        parse("fill:#email"),
        Err(ParseError::MissingParameter { kind: "fill", .. })
    ));
    assert!(matches!(
        parse("expect:text"),
        Err(ParseError::MissingParameter { kind: "expect", .. })
    ));
    assert!(matches!(
        parse("expect:color:red"),
        Err(ParseError::UnknownExpectation(k)) if k == "color"
    ));
    assert!(matches!(
        parse("loop:3"),
        Err(ParseError::MissingParameter { kind: "loop", .. })
    ));
    assert!(matches!(
        parse("loop:many:click:#btn"),
        Err(ParseError::InvalidNumber { kind: "loop", .. })
    ));
    assert!(matches!(
        parse("if:#exists"),
        Err(ParseError::MissingParameter { kind: "if", .. })
    ));
    assert!(matches!(
        parse("wait:soon"),
        Err(ParseError::InvalidNumber { kind: "wait", .. })
    ));
    assert!(matches!(
        parse("click:"),
        Err(ParseError::MissingParameter { kind: "click", .. })
    ));
    // Errors from the nested command propagate
    assert!(matches!(
        parse("loop:2:fly:moon"),
        Err(ParseError::UnknownType(_))
    ));
}

#[test]
fn test_fill_with_empty_value_is_allowed() {
    assert_eq!(parse("fill:#search:").unwrap(), fill("#search", ""));
}

#[test]
fn test_peel() {
    assert_eq!(peel("a:b:c"), ("a", Some("b:c")));
    assert_eq!(peel("\"a:b\":c"), ("\"a:b\"", Some("c")));
    assert_eq!(peel("\"a\\\":b\":c"), ("\"a\\\":b\"", Some("c")));
    assert_eq!(peel("abc"), ("abc", None));
    assert_eq!(peel("\"unterminated:x"), ("\"unterminated:x", None));
    assert_eq!(peel(":rest"), ("", Some("rest")));
}

#[test]
fn test_unquote() {
    assert_eq!(unquote("plain"), "plain");
    assert_eq!(unquote("\"quoted:value\""), "quoted:value");
    assert_eq!(unquote(r#""say \"hi\"""#), "say \"hi\"");
    assert_eq!(unquote(r#""\d+""#), "d+");
    assert_eq!(unquote("\""), "\"");
    assert_eq!(unquote("\"open"), "\"open");
}
