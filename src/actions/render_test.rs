// Unit tests for source rendering

use super::*;
use crate::actions::parse;
use pretty_assertions::assert_eq;

fn render(command: &str) -> String {
    parse(command).unwrap().to_source_code(None)
}

#[test]
fn test_render_basic_statements() {
    assert_eq!(render("goto:https://example.com"), "await page.goto('https://example.com');");
    assert_eq!(render("click:#login"), "await page.click('#login');");
    assert_eq!(render("fill:#user:admin"), "await page.fill('#user', 'admin');");
    assert_eq!(render("wait:1000"), "await page.waitForTimeout(1000);");
    assert_eq!(render("press:Enter"), "await page.keyboard.press('Enter');");
    assert_eq!(
        render("expect:text:Welcome"),
        "await expect(page.locator('body')).toContainText('Welcome');"
    );
    assert_eq!(
        render("expect:selector:#dashboard"),
        "await expect(page.locator('#dashboard')).toBeVisible();"
    );
}

#[test]
fn test_render_scroll_targets() {
    assert_eq!(
        render("scroll:top"),
        "await page.evaluate(() => window.scrollTo(0, 0));"
    );
    assert_eq!(
        render("scroll:bottom"),
        "await page.evaluate(() => window.scrollTo(0, document.body.scrollHeight));"
    );
    assert_eq!(
        render("scroll:#footer"),
        "await page.locator('#footer').scrollIntoViewIfNeeded();"
    );
}

#[test]
fn test_render_prefers_semantic_locator() {
    let click = parse("click:#login").unwrap();
    assert_eq!(
        click.to_source_code(Some("getByRole('button', { name: 'Login' })")),
        "await page.getByRole('button', { name: 'Login' }).click();"
    );

    let fill = parse("fill:#username:admin").unwrap();
    assert_eq!(
        fill.to_source_code(Some("getByLabel('Username')")),
        "await page.getByLabel('Username').fill('admin');"
    );
    assert_eq!(
        fill.to_source_code(None),
        "await page.fill('#username', 'admin');"
    );
}

#[test]
fn test_render_escapes_string_literals() {
    assert_eq!(
        render(r#"fill:#form input[name="email"]:test@example.com"#),
        r#"await page.fill('#form input[name="email"]', 'test@example.com');"#
    );
    assert_eq!(
        render("fill:#name:O'Brien"),
        r"await page.fill('#name', 'O\'Brien');"
    );
}

#[test]
fn test_render_url_expectation_is_literal() {
    assert_eq!(
        render("expect:url:/search?q=1"),
        r"await expect(page).toHaveURL(new RegExp('/search\\?q=1'));"
    );
}

#[test]
fn test_render_control_flow() {
    assert_eq!(
        render("loop:3:click:#next"),
        "for (let i = 0; i < 3; i++) {\n  await page.click('#next');\n}"
    );
    assert_eq!(
        render("if:#banner:click:#dismiss"),
        "if (await page.$('#banner')) {\n  await page.click('#dismiss');\n}"
    );
    assert_eq!(
        render("loop:2:if:#exists:click:#btn"),
        "for (let i = 0; i < 2; i++) {\n  if (await page.$('#exists')) {\n    await page.click('#btn');\n  }\n}"
    );
}

#[test]
fn test_js_string() {
    assert_eq!(js_string("plain"), "'plain'");
    assert_eq!(js_string("a\\b"), r"'a\\b'");
    assert_eq!(js_string("line\nbreak"), r"'line\nbreak'");
}
