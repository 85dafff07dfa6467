use anyhow::Result;
use tokio::io::BufReader;
use tracing::warn;

use scout::repl::Repl;
use scout::{HistoryRecorder, ScoutConfig};

use super::utils::{self, BrowserArgs};

pub async fn handle_repl(
    config: &ScoutConfig,
    url: Option<String>,
    session: Option<String>,
    browser_args: BrowserArgs,
) -> Result<()> {
    let store = config.session_store();
    let browser = utils::open_browser(config, &browser_args).await?;

    let result = async {
        let data =
            utils::start_session(&browser, &store, session.as_deref(), url.as_deref()).await?;

        let mut repl = Repl::new(&browser, HistoryRecorder::from_records(data.history));
        let mut stdout = std::io::stdout();
        repl.run(BufReader::new(tokio::io::stdin()), &mut stdout)
            .await?;

        if let Some(name) = &session {
            let history = repl.into_recorder().into_records();
            utils::persist_session(&browser, &store, name, history).await?;
            println!("Session '{}' saved", name);
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {:#}", e);
    }
    result
}
