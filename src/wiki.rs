use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, unbounded};

const API_URL: &str = "https://en.wikipedia.org/w/api.php";
const USER_AGENT: &str = concat!("mapmarks/", env!("CARGO_PKG_VERSION"));

/// Fixed panel text when the service can't be reached or answers garbage.
pub const ERROR_TEXT: &str = "Error querying Wikipedia.";

/// A summary request issued by the info panel. The ticket identifies this
/// particular fetch; a response whose ticket is no longer current gets
/// discarded instead of rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub marker_id: usize,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub ticket: u64,
    pub marker_id: usize,
    pub summary: Summary,
}

/// Panel body for one location: the text to show and, when the article
/// plausibly exists, a deep link to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub source_url: Option<String>,
}

/// Deep link to the full article. The wiki convention is spaces as
/// underscores with the original casing kept.
pub fn article_url(title: &str) -> String {
    format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_"))
}

/// Pull the intro extract out of a query response.
///
/// Ok(None) means the response was well-formed but the page has no
/// extract (title unknown to the wiki). The API returns at most one
/// resolved page per title query, so the first entry is the only one.
pub fn parse_extract(raw: &str) -> anyhow::Result<Option<String>> {
    let data: serde_json::Value = serde_json::from_str(raw).context("response is not JSON")?;
    let pages = data
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(|p| p.as_object())
        .context("response missing query.pages")?;
    let page = pages.values().next().context("query.pages is empty")?;
    Ok(page
        .get("extract")
        .and_then(|e| e.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

/// Turn a fetch result into panel content. Failures degrade to the fixed
/// error text; a well-formed but extract-less response gets the
/// no-wiki-page fallback. Never an error to the caller.
pub fn compose_summary(title: &str, fetched: anyhow::Result<Option<String>>) -> Summary {
    match fetched {
        Ok(Some(text)) => Summary { text, source_url: Some(article_url(title)) },
        Ok(None) => Summary {
            text: format!("There does not seem to be a wiki page for {}.", title),
            source_url: Some(article_url(title)),
        },
        Err(e) => {
            log::warn!("wikipedia query for {:?} failed: {:#}", title, e);
            Summary { text: ERROR_TEXT.to_string(), source_url: None }
        }
    }
}

fn fetch_extract(title: &str, timeout: Duration) -> anyhow::Result<Option<String>> {
    let response = ureq::get(API_URL)
        .query("action", "query")
        .query("prop", "extracts")
        .query("exintro", "")
        .query("explaintext", "1")
        .query("format", "json")
        .query("titles", title)
        .set("User-Agent", USER_AGENT)
        .timeout(timeout)
        .call()
        .context("request failed")?;
    let body = response.into_string().context("reading response body")?;
    parse_extract(&body)
}

/// Runs summary fetches on short-lived worker threads and hands the
/// outcomes back over a channel, drained by the UI loop each frame.
pub struct WikiFetcher {
    timeout: Duration,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl WikiFetcher {
    pub fn new(timeout: Duration) -> Self {
        let (tx, rx) = unbounded();
        Self { timeout, tx, rx }
    }

    /// Fire-and-forget: the outcome (success or degraded) always arrives
    /// on the channel, tagged with the request's ticket.
    pub fn spawn(&self, request: FetchRequest) {
        let tx = self.tx.clone();
        let timeout = self.timeout;
        log::debug!("fetch #{} for {:?}", request.ticket, request.title);
        thread::spawn(move || {
            let summary = compose_summary(&request.title, fetch_extract(&request.title, timeout));
            let _ = tx.send(FetchOutcome {
                ticket: request.ticket,
                marker_id: request.marker_id,
                summary,
            });
        });
    }

    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.rx.try_recv().ok()
    }
}
