//! Stack Exchange response envelope and pagination decisions
//!
//! Every API response wraps its items in the same envelope. These functions
//! decode it and decide, from one page at a time, whether the fetch loop keeps
//! going. The loop itself (and any waiting) lives in the shell.

use serde::Deserialize;

use crate::record::Record;
use crate::resource::{ResourceType, SORT_ORDER};

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw response wrapper returned by every endpoint
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Envelope {
    #[serde(default)]
    pub items: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub has_more: bool,
    pub quota_max: Option<u64>,
    pub quota_remaining: Option<u64>,
    /// Seconds to wait before calling the same method again
    pub backoff: Option<u64>,
    pub error_id: Option<u64>,
    pub error_name: Option<String>,
    pub error_message: Option<String>,
}

/// One decoded page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub has_more: bool,
    pub quota_remaining: Option<u64>,
    pub backoff: Option<u64>,
}

/// Parameters for a single page request
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub resource: ResourceType,
    pub site: String,
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Query string pairs in the order the API documents them
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("site", self.site.clone()),
            ("page", self.page.to_string()),
            ("pagesize", self.page_size.to_string()),
            ("order", SORT_ORDER.to_string()),
            ("sort", self.resource.sort_key().to_string()),
        ]
    }

    /// Request for the page after this one
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// Clamp a requested page size into the range the API accepts
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// Decode a response body into a page
///
/// An error envelope (one carrying `error_id`) is reported as `Err` with the
/// API's own message.
pub fn parse_page(body: &str) -> Result<Page, String> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| format!("Invalid response body: {e}"))?;
    page_from_envelope(envelope)
}

pub fn page_from_envelope(envelope: Envelope) -> Result<Page, String> {
    if let Some(error_id) = envelope.error_id {
        return Err(format!(
            "API error {} ({}): {}",
            error_id,
            envelope.error_name.as_deref().unwrap_or("unknown"),
            envelope.error_message.as_deref().unwrap_or("no message")
        ));
    }

    Ok(Page {
        records: envelope
            .items
            .into_iter()
            .map(Record::from_json_object)
            .collect(),
        has_more: envelope.has_more,
        quota_remaining: envelope.quota_remaining,
        backoff: envelope.backoff,
    })
}

/// Why the fetch loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The API reported `has_more: false`
    Exhausted,
    /// The page came back without items
    EmptyPage,
    /// `quota_remaining` reached zero
    QuotaExhausted,
    /// The configured page cap was reached
    PageLimit,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "no more pages"),
            StopReason::EmptyPage => write!(f, "empty page"),
            StopReason::QuotaExhausted => write!(f, "request quota exhausted"),
            StopReason::PageLimit => write!(f, "page limit reached"),
        }
    }
}

/// What the fetch loop does after receiving a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Request the next page, first waiting `wait_secs` if the API asked for it
    Continue { wait_secs: Option<u64> },
    Stop(StopReason),
}

/// Decide whether to request another page after `page_number`
///
/// The checks run in a fixed order: an empty page wins over everything, then
/// the `has_more` flag, then quota, then the page cap.
pub fn next_step(page: &Page, page_number: u32, max_pages: Option<u32>) -> NextStep {
    if page.records.is_empty() {
        return NextStep::Stop(StopReason::EmptyPage);
    }
    if !page.has_more {
        return NextStep::Stop(StopReason::Exhausted);
    }
    if page.quota_remaining == Some(0) {
        return NextStep::Stop(StopReason::QuotaExhausted);
    }
    if max_pages.is_some_and(|max| page_number >= max) {
        return NextStep::Stop(StopReason::PageLimit);
    }
    NextStep::Continue {
        wait_secs: page.backoff.filter(|secs| *secs > 0),
    }
}
