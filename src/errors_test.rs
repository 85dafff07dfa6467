// Unit tests for error mapping

use super::*;

#[test]
fn test_exit_codes() {
    assert_eq!(
        ScoutError::Parse(ParseError::UnknownType("fly".to_string())).exit_code(),
        2
    );
    assert_eq!(ScoutError::WebDriverFailed("down".to_string()).exit_code(), 4);
    assert_eq!(ScoutError::Timeout("slow".to_string()).exit_code(), 5);
    assert_eq!(
        ScoutError::ExpectationsFailed {
            failed: 1,
            total: 3
        }
        .exit_code(),
        6
    );
    assert_eq!(ScoutError::Other(anyhow::anyhow!("boom")).exit_code(), 1);
}

#[test]
fn test_parse_error_survives_anyhow() {
    let err: anyhow::Error = ParseError::MissingDelimiter("click".to_string()).into();
    let scout_err: ScoutError = err.into();
    assert!(matches!(
        scout_err,
        ScoutError::Parse(ParseError::MissingDelimiter(_))
    ));
}

#[test]
fn test_expectations_failed_survives_anyhow() {
    let err = anyhow::Error::new(ScoutError::ExpectationsFailed {
        failed: 2,
        total: 5,
    });
    let scout_err: ScoutError = err.into();
    assert_eq!(scout_err.exit_code(), 6);
    assert_eq!(scout_err.to_string(), "2 of 5 expectations failed");
}

#[test]
fn test_message_sniffing() {
    let err = anyhow::anyhow!("Failed to connect to WebDriver at http://localhost:4444");
    assert!(matches!(
        ScoutError::from(err),
        ScoutError::WebDriverFailed(_)
    ));

    let err = anyhow::anyhow!("navigation timed out");
    assert!(matches!(ScoutError::from(err), ScoutError::Timeout(_)));

    let err = anyhow::anyhow!("something else");
    assert!(matches!(ScoutError::from(err), ScoutError::Other(_)));
}

#[test]
fn test_parse_error_messages() {
    let err = ParseError::MissingParameter {
        kind: "fill",
        params: "#email".to_string(),
        format: "fill:selector:value",
    };
    assert_eq!(
        err.to_string(),
        "Invalid fill params: #email. Format: fill:selector:value"
    );
    assert_eq!(
        ParseError::UnknownType("fly".to_string()).to_string(),
        "Unknown action type: fly"
    );
}
