use std::time::Duration;

use stackpipe_core::error::FetchError;
use stackpipe_core::page::{
    clamp_page_size, next_step, parse_page, Envelope, NextStep, Page, PageRequest,
};
use stackpipe_core::record::Record;
use stackpipe_core::report::Reporter;
use stackpipe_core::resource::ResourceType;

use crate::config::Options;

const USER_AGENT: &str = concat!("stackpipe/", env!("CARGO_PKG_VERSION"));

/// Paginated reader for the Stack Exchange API
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    api_base: String,
    site: String,
    page_size: u32,
    max_pages: Option<u32>,
}

impl Fetcher {
    pub fn new(options: &Options) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(options.timeout))
            .build()?;

        Ok(Self {
            client,
            api_base: options.api_base.trim_end_matches('/').to_string(),
            site: options.site.clone(),
            page_size: clamp_page_size(options.page_size),
            max_pages: options.max_pages,
        })
    }

    fn first_page(&self, resource: ResourceType) -> PageRequest {
        PageRequest {
            resource,
            site: self.site.clone(),
            page: 1,
            page_size: self.page_size,
        }
    }

    /// Fetch and decode a single page
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let fail = |reason: String| FetchError::new(request.resource, request.page, reason);
        let url = format!("{}{}", self.api_base, request.resource.endpoint());

        let response = self
            .client
            .get(&url)
            .query(&request.query())
            .send()
            .await
            .map_err(|e| fail(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| fail(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            // Error responses usually still carry the API envelope with a message
            let detail = serde_json::from_str::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error_message);
            return Err(fail(match detail {
                Some(message) => format!("HTTP {status}: {message}"),
                None => format!("HTTP {status}"),
            }));
        }

        parse_page(&body).map_err(fail)
    }

    /// Fetch every page of a resource type, in page order
    ///
    /// Stops when the API reports no more pages, returns an empty page, runs
    /// out of quota or the page cap is hit. Any failed request fails the whole
    /// resource type; records from earlier pages are discarded with it.
    pub async fn fetch_all(
        &self,
        resource: ResourceType,
        reporter: &dyn Reporter,
    ) -> Result<Vec<Record>, FetchError> {
        let mut records = Vec::new();
        let mut request = self.first_page(resource);

        loop {
            let page = self.fetch_page(&request).await?;
            reporter.page_fetched(resource, request.page, page.records.len());

            let step = next_step(&page, request.page, self.max_pages);
            records.extend(page.records);

            match step {
                NextStep::Stop(reason) => {
                    reporter.pagination_stopped(resource, request.page, reason);
                    break;
                }
                NextStep::Continue { wait_secs } => {
                    if let Some(secs) = wait_secs {
                        reporter.backoff(resource, request.page, secs);
                        tokio::time::sleep(Duration::from_secs(secs)).await;
                    }
                    request = request.next();
                }
            }
        }

        Ok(records)
    }
}
