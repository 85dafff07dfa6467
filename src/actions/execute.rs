use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{Action, ExpectKind, ScrollTarget};
use crate::page::Page;
use crate::semantic::derive_semantic_locator;
use crate::types::ExecutionResult;

/// How long a click waits for network activity to settle before moving on
pub const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_millis(2000);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

impl Action {
    /// Run this action against `page`.
    ///
    /// Page errors never escape: they are folded into a failed
    /// [`ExecutionResult`] so a batch can keep going.
    pub fn execute<'a>(&'a self, page: &'a dyn Page) -> BoxFuture<'a, ExecutionResult> {
        Box::pin(async move {
            match self {
                Action::Click { selector } => click(page, selector).await,
                Action::Fill { selector, value } => fill(page, selector, value).await,
                Action::Wait { ms } => {
                    info!("Waiting {}ms", ms);
                    settle(page.wait_for_timeout(*ms).await)
                }
                Action::Goto { url } => {
                    info!("Navigating to {}", url);
                    settle(page.goto(url).await)
                }
                Action::Press { key } => {
                    info!("Pressing key: {}", key);
                    settle(page.press_key(key).await)
                }
                Action::Scroll { target } => scroll(page, target).await,
                Action::Expect { kind, value } => expect(page, *kind, value).await,
                Action::Loop { count, action } => {
                    info!("Looping {} times", count);
                    let mut last = ExecutionResult::success();
                    for iteration in 0..*count {
                        last = action.execute(page).await;
                        if !last.success {
                            debug!("Loop stopped at iteration {}", iteration + 1);
                            return last;
                        }
                    }
                    last
                }
                Action::Condition { selector, action } => {
                    info!("Checking condition: {}", selector);
                    match page.exists(selector).await {
                        Ok(true) => {
                            info!("Condition met: {} exists. Executing inner action.", selector);
                            action.execute(page).await
                        }
                        Ok(false) => {
                            info!("Condition not met: {} does not exist. Skipping.", selector);
                            ExecutionResult::success()
                        }
                        Err(e) => ExecutionResult::failure(format!("{:#}", e)),
                    }
                }
            }
        })
    }
}

fn settle(outcome: anyhow::Result<()>) -> ExecutionResult {
    match outcome {
        Ok(()) => ExecutionResult::success(),
        Err(e) => ExecutionResult::failure(format!("{:#}", e)),
    }
}

async fn click(page: &dyn Page, selector: &str) -> ExecutionResult {
    info!("Clicking: {}", selector);
    // Derive before clicking: the click may navigate away or detach the element
    let semantic = derive_semantic_locator(page, selector).await;

    if let Err(e) = page.click(selector).await {
        return ExecutionResult::failure(format!("{:#}", e));
    }
    if let Err(e) = page.wait_for_quiescence(NETWORK_IDLE_TIMEOUT).await {
        debug!("Proceeding without network idle: {:#}", e);
    }

    ExecutionResult::with_semantic(semantic)
}

async fn fill(page: &dyn Page, selector: &str, value: &str) -> ExecutionResult {
    info!("Filling {} with \"{}\"", selector, value);
    let semantic = derive_semantic_locator(page, selector).await;

    match page.fill(selector, value).await {
        Ok(()) => ExecutionResult::with_semantic(semantic),
        Err(e) => ExecutionResult::failure(format!("{:#}", e)),
    }
}

async fn scroll(page: &dyn Page, target: &ScrollTarget) -> ExecutionResult {
    match target {
        ScrollTarget::Top => {
            info!("Scrolling to top");
            settle(page.scroll_to_top().await)
        }
        ScrollTarget::Bottom => {
            info!("Scrolling to bottom");
            settle(page.scroll_to_bottom().await)
        }
        ScrollTarget::Selector(selector) => {
            info!("Scrolling to selector: {}", selector);
            match page.scroll_into_view(selector).await {
                Ok(true) => ExecutionResult::success(),
                Ok(false) => {
                    warn!("Element not found for scrolling: {}", selector);
                    ExecutionResult::failure("Element not found")
                }
                Err(e) => ExecutionResult::failure(format!("{:#}", e)),
            }
        }
    }
}

async fn expect(page: &dyn Page, kind: ExpectKind, value: &str) -> ExecutionResult {
    let checked = match kind {
        ExpectKind::Text => page.has_visible_text(value).await,
        ExpectKind::Selector => page.is_visible(value).await,
        ExpectKind::Url => page.current_url().await.map(|url| {
            if !url.contains(value) {
                warn!("Current URL is {}", url);
            }
            url.contains(value)
        }),
    };

    match checked {
        Ok(true) => {
            info!("✅ Expectation passed: {} \"{}\"", kind, value);
            ExecutionResult::success()
        }
        Ok(false) => {
            warn!("❌ Expectation failed: {} \"{}\" NOT found", kind, value);
            ExecutionResult::failure("Expectation failed")
        }
        Err(e) => {
            error!("Error checking expectation {}:{}: {:#}", kind, value, e);
            ExecutionResult::failure(format!("{:#}", e))
        }
    }
}
