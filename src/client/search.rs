//! Query normalization and concurrent result pagination

use super::SubdivxClient;
use crate::config::PageFailurePolicy;
use crate::error::Result;
use crate::parser::parse_page;
use crate::types::{ParsedPage, SearchQuery, Subtitle};
use futures::{StreamExt, TryStreamExt, stream};
use std::ops::RangeInclusive;
use tracing::{debug, info, warn};

impl SubdivxClient {
    /// Search the site and return every result across all pages
    ///
    /// Page 1 is fetched first to learn the page count; the remaining pages
    /// are fetched concurrently (bounded by `search.max_concurrent_pages`) and
    /// merged back in page order, so the result is page-ascending and, within
    /// a page, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`](crate::Error::InvalidQuery) for a query
    /// with no tokens, and a transport error when page 1 fails or, under
    /// [`PageFailurePolicy::Abort`], when any later page fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Subtitle>> {
        let query = SearchQuery::new(query)?;
        let search_url = self.config.site.search_url.as_str();

        debug!(terms = query.terms(), page = 1, "fetching result page");
        let first = self.transport.fetch_text(search_url, &query.params()).await?;
        let ParsedPage {
            mut subtitles,
            total_pages,
        } = parse_page(&first);

        if total_pages <= 1 {
            info!(
                terms = query.terms(),
                pages = 1,
                results = subtitles.len(),
                "search finished"
            );
            return Ok(subtitles);
        }

        let last_page = match self.config.search.max_pages {
            Some(cap) => total_pages.min(cap.max(1)),
            None => total_pages,
        };
        if last_page < total_pages {
            debug!(total_pages, last_page, "limiting result pages");
        }

        let pages = self.fetch_pages(&query, 2..=last_page).await?;
        let fetched = pages.len() + 1;
        for (page, html) in pages {
            let parsed = parse_page(&html);
            debug!(page, results = parsed.subtitles.len(), "parsed result page");
            subtitles.extend(parsed.subtitles);
        }

        info!(
            terms = query.terms(),
            pages = fetched,
            results = subtitles.len(),
            "search finished"
        );
        Ok(subtitles)
    }

    /// Fetch result pages concurrently and return them sorted by page number
    async fn fetch_pages(
        &self,
        query: &SearchQuery,
        pages: RangeInclusive<u32>,
    ) -> Result<Vec<(u32, String)>> {
        let search_url = self.config.site.search_url.as_str();
        let transport = &self.transport;
        let concurrency = self.config.search.max_concurrent_pages.max(1);

        let fetches = stream::iter(pages)
            .map(|page| {
                let params = query.page_params(page);
                async move {
                    debug!(page, "fetching result page");
                    let result = transport.fetch_text(search_url, &params).await;
                    (page, result)
                }
            })
            .buffer_unordered(concurrency);

        let mut fetched: Vec<(u32, String)> = match self.config.search.page_failure {
            PageFailurePolicy::Abort => {
                fetches
                    .map(|(page, result)| result.map(|html| (page, html)))
                    .try_collect()
                    .await?
            }
            PageFailurePolicy::Skip => {
                fetches
                    .filter_map(|(page, result)| async move {
                        match result {
                            Ok(html) => Some((page, html)),
                            Err(e) => {
                                warn!(page, error = %e, "skipping result page");
                                None
                            }
                        }
                    })
                    .collect()
                    .await
            }
        };

        fetched.sort_unstable_by_key(|(page, _)| *page);
        Ok(fetched)
    }
}
