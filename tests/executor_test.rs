// Behavioral tests for batch execution, control flow and healing

mod common;

use common::{MockPage, button};
use pretty_assertions::assert_eq;
use scout::{ActionExecutor, ElementSnapshot};

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let page = MockPage::new().with_element("#ok", button("OK"));
    let executor = ActionExecutor::new();

    let outcomes = executor
        .perform_actions(&page, &["click:#missing-thing", "bogus", "click:#ok", "press:Enter"])
        .await;

    assert_eq!(outcomes.len(), 4);
    assert!(!outcomes[0].result.success);
    assert!(!outcomes[1].result.success);
    assert_eq!(
        outcomes[1].result.error.as_deref(),
        Some("Invalid action format: bogus")
    );
    assert!(outcomes[2].result.success);
    assert!(outcomes[3].result.success);
    assert_eq!(page.count("press Enter"), 1);
}

#[tokio::test]
async fn test_commands_run_in_order() {
    let page = MockPage::new().with_element("#q", ElementSnapshot::new("input"));
    let executor = ActionExecutor::new();

    executor
        .perform_actions(
            &page,
            &["goto:https://example.com", "fill:#q:rust:lang", "wait:250", "scroll:bottom"],
        )
        .await;

    let calls: Vec<String> = page
        .calls()
        .into_iter()
        .filter(|c| !c.starts_with("query"))
        .collect();
    assert_eq!(
        calls,
        vec![
            "goto https://example.com",
            "fill #q rust:lang",
            "wait 250",
            "scroll bottom"
        ]
    );
}

#[tokio::test]
async fn test_loop_repeats_child() {
    let page = MockPage::new().with_element("#next", button("Next"));
    let outcome = ActionExecutor::new()
        .execute_command(&page, "loop:3:click:#next")
        .await;

    assert!(outcome.result.success);
    assert_eq!(page.count("click #next"), 3);
}

#[tokio::test]
async fn test_loop_stops_at_first_failure() {
    let page = MockPage::new();
    let outcome = ActionExecutor::new()
        .execute_command(&page, "loop:5:click:#gone")
        .await;

    assert!(!outcome.result.success);
    assert_eq!(page.count("click #gone"), 1);
    // Loops are not healed
    assert_eq!(page.count("query_all"), 0);
}

#[tokio::test]
async fn test_loop_returns_failing_iteration() {
    let page = MockPage::new()
        .with_element("#btn", button("More"))
        .with_click_limit(1);
    let outcome = ActionExecutor::new()
        .execute_command(&page, "loop:3:click:#btn")
        .await;

    assert!(!outcome.result.success);
    assert_eq!(
        outcome.result.error.as_deref(),
        Some("Element is detached from the DOM: #btn")
    );
    assert_eq!(page.count("click #btn"), 2);
    assert_eq!(outcome.healed_command, None);
}

#[tokio::test]
async fn test_condition_skips_missing_element() {
    let page = MockPage::new();
    let outcome = ActionExecutor::new()
        .execute_command(&page, "if:#missing:click:#btn")
        .await;

    assert!(outcome.result.success);
    assert_eq!(outcome.result.error, None);
    assert_eq!(page.count("click"), 0);
}

#[tokio::test]
async fn test_nested_loop_and_condition() {
    let page = MockPage::new()
        .with_element("#exists", ElementSnapshot::new("div"))
        .with_element("#btn", button("Go"));
    let outcome = ActionExecutor::new()
        .execute_command(&page, "loop:2:if:#exists:click:#btn")
        .await;

    assert!(outcome.result.success);
    assert_eq!(page.count("exists #exists"), 2);
    assert_eq!(page.count("click #btn"), 2);
}

#[tokio::test]
async fn test_click_derives_semantic_locator_before_clicking() {
    let page = MockPage::new().with_element("#login", button("Log in"));
    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#login")
        .await;

    assert!(outcome.result.success);
    assert_eq!(
        outcome.result.semantic_locator.as_deref(),
        Some("getByRole('button', { name: 'Log in' })")
    );
    let calls = page.calls();
    let query = calls.iter().position(|c| c == "query #login").unwrap();
    let click = calls.iter().position(|c| c == "click #login").unwrap();
    assert!(query < click);
}

#[tokio::test]
async fn test_click_ignores_network_idle_timeout() {
    let page = MockPage::new()
        .with_element("#save", button("Save"))
        .with_slow_network();
    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#save")
        .await;

    assert!(outcome.result.success);
    assert_eq!(page.count("quiescence"), 1);
}

#[tokio::test]
async fn test_scroll_to_missing_selector_fails() {
    let page = MockPage::new();
    let outcome = ActionExecutor::new()
        .execute_command(&page, "scroll:#footer")
        .await;

    assert_eq!(outcome.result.error.as_deref(), Some("Element not found"));
    assert_eq!(page.count("query_all"), 0);
}

#[tokio::test]
async fn test_click_heals_to_text_selector() {
    let page = MockPage::new()
        .with_candidate(ElementSnapshot::new("a").with_text("Home"))
        .with_candidate(button("Submit"))
        .with_element("text=\"Submit\"", button("Submit"));

    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#btn-submit")
        .await;

    assert!(outcome.result.success);
    assert_eq!(outcome.command, "click:#btn-submit");
    assert_eq!(outcome.healed_command.as_deref(), Some("click:text=\"Submit\""));
    assert_eq!(outcome.recorded_command(), "click:text=\"Submit\"");
    assert_eq!(page.count("click text=\"Submit\""), 1);
}

#[tokio::test]
async fn test_fill_heals_to_attribute_selector() {
    let username = ElementSnapshot::new("input").with_attr("name", "username");
    let page = MockPage::new()
        .with_candidate(username.clone())
        .with_element("input[name=\"username\"]", username);

    let outcome = ActionExecutor::new()
        .execute_command(&page, "fill:#user_name_input:bob")
        .await;

    assert!(outcome.result.success);
    assert_eq!(
        outcome.healed_command.as_deref(),
        Some(r#"fill:"input[name=\"username\"]":bob"#)
    );
    assert_eq!(page.count("fill input[name=\"username\"] bob"), 1);
}

#[tokio::test]
async fn test_healing_is_attempted_once() {
    // The candidate matches, but the healed selector does not resolve either
    let page = MockPage::new().with_candidate(button("Submit"));

    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#btn-submit")
        .await;

    assert!(!outcome.result.success);
    assert_eq!(outcome.healed_command, None);
    let error = outcome.result.error.unwrap();
    assert!(error.starts_with("Element not found: #btn-submit"));
    assert!(error.contains("also failed"));
    assert_eq!(page.count("query_all"), 1);
    assert_eq!(page.count("click"), 2);
}

#[tokio::test]
async fn test_failed_healing_surfaces_original_error() {
    let page = MockPage::new().with_candidate(button("Cancel"));
    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#btn-submit")
        .await;

    assert_eq!(
        outcome.result.error.as_deref(),
        Some("Element not found: #btn-submit")
    );
    assert_eq!(page.count("click"), 1);
}

#[tokio::test]
async fn test_healer_page_errors_are_swallowed() {
    let page = MockPage::new().with_broken_queries();
    let outcome = ActionExecutor::new()
        .execute_command(&page, "click:#btn-submit")
        .await;

    assert_eq!(
        outcome.result.error.as_deref(),
        Some("Element not found: #btn-submit")
    );
}

#[tokio::test]
async fn test_expectations_all_evaluated() {
    let page = MockPage::new()
        .with_body_text("Welcome back, admin")
        .with_element("#dashboard", ElementSnapshot::new("main"))
        .at_url("https://app.test/dashboard");

    let report = ActionExecutor::new()
        .check_expectations(
            &page,
            &[
                "text:Missing",
                "text:Welcome",
                "expect:selector:#dashboard",
                "url:/dashboard",
                "url:/settings",
            ],
        )
        .await;

    let passed: Vec<bool> = report.checks.iter().map(|c| c.result.success).collect();
    assert_eq!(passed, vec![false, true, true, true, false]);
    assert!(!report.passed());
    assert_eq!(report.failed_count(), 2);
    assert_eq!(report.checks[2].command, "expect:selector:#dashboard");
    assert_eq!(report.checks[0].command, "expect:text:Missing");
    assert_eq!(page.count("text "), 2);
}

#[tokio::test]
async fn test_invalid_expectation_is_reported() {
    let page = MockPage::new();
    let report = ActionExecutor::new()
        .check_expectations(&page, &["color:red"])
        .await;

    assert!(!report.passed());
    assert!(
        report.checks[0]
            .result
            .error
            .as_deref()
            .unwrap()
            .contains("Unknown expectation type: color")
    );
}

#[tokio::test]
async fn test_empty_expectations_pass() {
    let page = MockPage::new();
    let report = ActionExecutor::new()
        .check_expectations::<&str>(&page, &[])
        .await;
    assert!(report.passed());
}
