// Unit tests for page summaries and error reporting

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_scrape_result_decodes() {
    let result: ExploreResult = serde_json::from_value(json!({
        "url": "https://app.test/login",
        "title": "Sign in",
        "elements": [
            {
                "tag": "button", "text": "Sign in", "id": "", "className": "btn primary",
                "ariaLabel": "", "region": "form#login",
                "box": { "x": 10.0, "y": 20.5, "width": 80.0, "height": 32.0 },
                "isAlert": false
            },
            {
                "tag": "div", "text": "Wrong password", "id": "", "className": "error",
                "ariaLabel": "", "region": "form#login",
                "box": { "x": 0, "y": 0, "width": 200, "height": 20 },
                "isAlert": true
            }
        ]
    }))
    .unwrap();

    assert_eq!(result.elements.len(), 2);
    assert_eq!(result.elements[0].class_name, "btn primary");
    assert_eq!(result.elements[0].bounds.y, 20.5);
    let alerts: Vec<&str> = result.alerts().map(|e| e.text.as_str()).collect();
    assert_eq!(alerts, vec!["Wrong password"]);
}

#[test]
fn test_alert_flag_only_serialized_when_set() {
    let element = InteractiveElement {
        tag: "a".into(),
        ..Default::default()
    };
    let json = serde_json::to_value(&element).unwrap();
    assert!(json.get("isAlert").is_none());
    assert!(json.get("box").is_some());

    let alert = InteractiveElement {
        is_alert: true,
        ..element
    };
    assert_eq!(serde_json::to_value(&alert).unwrap()["isAlert"], true);
}

#[test]
fn test_element_label_fallbacks() {
    let mut element = InteractiveElement {
        id: "close".into(),
        ..Default::default()
    };
    assert_eq!(element.label(), "close");
    element.aria_label = "Close dialog".into();
    assert_eq!(element.label(), "Close dialog");
    element.text = "  ×  ".into();
    assert_eq!(element.label(), "×");
}

#[test]
fn test_redact_url() {
    assert_eq!(
        redact_url("https://api.test/cb?access_token=abc&page=2"),
        "https://api.test/cb?access_token=REDACTED&page=2"
    );
    assert_eq!(
        redact_url("https://api.test/users?Email=a%40b.c"),
        "https://api.test/users?Email=REDACTED"
    );
    // Untouched when nothing is sensitive, even if re-serializing would differ
    assert_eq!(
        redact_url("https://api.test/search?q=a+b"),
        "https://api.test/search?q=a+b"
    );
    assert_eq!(redact_url("not a url"), "not a url");
}

#[test]
fn test_error_messages() {
    let errors = PageErrors {
        console: vec!["Uncaught TypeError: x is undefined".into()],
        network: vec![
            NetworkError {
                status: Some(500),
                method: "POST".into(),
                url: "https://api.test/save".into(),
            },
            NetworkError {
                status: None,
                method: "GET".into(),
                url: "https://cdn.test/app.js".into(),
            },
        ],
    };

    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors.messages(),
        vec![
            "Console Error: Uncaught TypeError: x is undefined",
            "Network Error: [500] POST https://api.test/save",
            "Network Error: [failed] GET https://cdn.test/app.js",
        ]
    );
}

#[test]
fn test_appended_errors_are_capped() {
    let mut errors = PageErrors::default();
    errors.append(PageErrors {
        console: (0..MAX_RECORDED_ERRORS).map(|i| i.to_string()).collect(),
        network: Vec::new(),
    });
    errors.append(PageErrors {
        console: vec!["latest".into()],
        network: Vec::new(),
    });

    assert_eq!(errors.console.len(), MAX_RECORDED_ERRORS);
    assert_eq!(errors.console[0], "1");
    assert_eq!(errors.console.last().map(String::as_str), Some("latest"));
}

#[test]
fn test_monitoring_failure_only_with_errors() {
    let mut report = ExploreReport {
        actions: Vec::new(),
        expectations: ExpectationReport::default(),
        page: ExploreResult::default(),
        forms: None,
        errors: None,
    };
    assert_eq!(report.monitoring_failure(), None);

    report.errors = Some(PageErrors::default());
    assert_eq!(report.monitoring_failure(), None);

    report.errors = Some(PageErrors {
        console: vec!["boom".into()],
        network: Vec::new(),
    });
    assert_eq!(
        report.monitoring_failure().as_deref(),
        Some("Monitoring failed with 1 errors:\nConsole Error: boom")
    );
}
