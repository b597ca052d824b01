//! Crawl engine - main orchestration loop
//!
//! Drives pagination through the search index, dedups items against the
//! checkpoint, extracts and enriches each new project, hands records to the
//! sink, and persists progress after every page. A single logical worker:
//! one outstanding fetch at a time, every wait a plain sleep on this task.
//!
//! No per-item error aborts the crawl. The run ends only when a listing
//! page comes back empty or unfetchable.

use crate::config::Config;
use crate::engine::progress::{CrawlProgress, ProgressStore};
use crate::engine::state::CrawlState;
use crate::enrich::RepositoryEnricher;
use crate::extract::{extract_project_details, extract_project_links};
use crate::fetch::{fetch_with_retry, CachingFetcher, RateLimiter, RetryPolicy};
use crate::record::Record;
use crate::sink::RecordSink;
use crate::HarvestError;
use rand::Rng;
use std::time::Duration;

/// Per-run counters, logged at completion
#[derive(Debug, Default, Clone, Copy)]
struct RunStats {
    pages: u32,
    records_inserted: u32,
    sink_failures: u32,
    items_skipped: u32,
    items_deduped: u32,
}

/// Top-level crawl orchestrator
pub struct CrawlEngine<S: RecordSink> {
    config: Config,
    fetcher: CachingFetcher,
    policy: RetryPolicy,
    enricher: RepositoryEnricher,
    sink: S,
    progress_store: ProgressStore,
    progress: CrawlProgress,
    state: CrawlState,
}

impl<S: RecordSink> CrawlEngine<S> {
    /// Creates an engine from configuration and a record sink
    ///
    /// Loads the checkpoint unless `fresh` is set, in which case any prior
    /// progress is ignored and the crawl starts from page 1.
    pub fn new(config: Config, sink: S, fresh: bool) -> Result<Self, HarvestError> {
        let harvester = &config.harvester;
        let timeout = Duration::from_secs(harvester.request_timeout_secs);
        let cache_expiry = Duration::from_secs(harvester.cache_expiry_secs);

        let policy = RetryPolicy {
            max_attempts: harvester.retry_attempts,
            backoff_base: Duration::from_secs(harvester.backoff_base_secs),
            cooldown: Duration::from_secs(harvester.cooldown_secs),
            jitter_min: harvester.jitter_min_secs,
            jitter_max: harvester.jitter_max_secs,
        };

        let limiter = RateLimiter::new(
            harvester.rate_limit_calls,
            Duration::from_secs(harvester.rate_limit_period_secs),
        );
        let fetcher = CachingFetcher::new(limiter, cache_expiry, timeout)?;

        let enricher =
            RepositoryEnricher::new(&config.github, cache_expiry, timeout, policy.clone())?;

        let progress_store = ProgressStore::new(&config.output.checkpoint_path);
        let progress = if fresh {
            tracing::info!("Starting fresh crawl, ignoring any saved progress");
            CrawlProgress::default()
        } else {
            progress_store.load()
        };

        Ok(Self {
            config,
            fetcher,
            policy,
            enricher,
            sink,
            progress_store,
            progress,
            state: CrawlState::Idle,
        })
    }

    /// Runs the crawl to exhaustion
    ///
    /// Resumes from the checkpointed page. Each completed page updates
    /// `last_page` and persists the checkpoint before the engine advances;
    /// the page that ends the crawl is checkpointed the same way.
    pub async fn run(&mut self) -> Result<(), HarvestError> {
        let mut page = self.progress.last_page;
        let mut stats = RunStats::default();
        let start = std::time::Instant::now();

        self.state = CrawlState::Paging(page);
        tracing::info!("Starting crawl at page {}", page);

        loop {
            tracing::info!("Scraping page {}...", page);
            let links = self.scrape_search_page(page).await;

            if links.is_empty() {
                tracing::info!("No more projects found on page {}, ending crawl", page);
                // The exhausted page is checkpointed too, so a later run
                // resumes here instead of re-walking the last full page.
                self.progress.last_page = page;
                if let Err(e) = self.progress_store.save(&self.progress) {
                    tracing::error!("Failed to save progress: {}", e);
                }
                self.state = CrawlState::Exhausted;
                break;
            }

            for link in links {
                if self.progress.visited_projects.contains(&link) {
                    tracing::debug!("Already scraped {}, skipping", link);
                    stats.items_deduped += 1;
                    continue;
                }

                match self.scrape_project_page(&link).await {
                    Some(record) => {
                        match self.sink.insert(&record) {
                            Ok(()) => {
                                tracing::info!("Inserted project {}", record.title);
                                stats.records_inserted += 1;
                            }
                            Err(e) => {
                                // At-most-once delivery: log, never retry
                                tracing::error!("Failed to insert {}: {}", record.title, e);
                                stats.sink_failures += 1;
                            }
                        }
                        self.progress.visited_projects.insert(link);
                    }
                    None => {
                        tracing::warn!("No data for {}, skipping", link);
                        stats.items_skipped += 1;
                    }
                }
            }

            self.progress.last_page = page;
            if let Err(e) = self.progress_store.save(&self.progress) {
                tracing::error!("Failed to save progress: {}", e);
            }
            stats.pages += 1;

            page += 1;
            self.state = CrawlState::Paging(page);
            self.inter_page_delay().await;
        }

        tracing::info!(
            "Crawl completed in {:?}: {} pages, {} records inserted, {} sink failures, \
             {} items skipped, {} deduped, {} total visited",
            start.elapsed(),
            stats.pages,
            stats.records_inserted,
            stats.sink_failures,
            stats.items_skipped,
            stats.items_deduped,
            self.progress.visited_projects.len()
        );

        Ok(())
    }

    /// Fetches and extracts one listing page
    ///
    /// An empty vec means either page exhaustion or an unfetchable listing;
    /// both end the crawl.
    async fn scrape_search_page(&mut self, page: u32) -> Vec<String> {
        let url = format!("{}&page={}", self.config.harvester.search_url, page);

        match fetch_with_retry(&mut self.fetcher, &url, &self.policy).await {
            Some(body) => extract_project_links(&body),
            None => {
                tracing::warn!("Failed to fetch search page {}", page);
                Vec::new()
            }
        }
    }

    /// Fetches, extracts, and enriches one project's detail page
    async fn scrape_project_page(&mut self, link: &str) -> Option<Record> {
        let url = format!(
            "{}{}",
            self.config.harvester.index_base_url.trim_end_matches('/'),
            link
        );
        let body = fetch_with_retry(&mut self.fetcher, &url, &self.policy).await?;

        let details = extract_project_details(&body);

        let repo = match &details.repo_url {
            Some(repo_url) => self.enricher.enrich(repo_url).await,
            None => None,
        };

        let record = Record {
            title: details.title,
            description: details.description,
            maintainer: details.maintainer,
            maintainer_email: details.maintainer_email,
            repo_url: details.repo_url,
            repo,
        };

        tracing::info!("Scraped project: {}", record.title);
        Some(record)
    }

    /// Randomized delay between listing pages, drawn from the jitter range
    async fn inter_page_delay(&self) {
        let harvester = &self.config.harvester;
        let secs = rand::rng().random_range(harvester.jitter_min_secs..=harvester.jitter_max_secs);
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    /// Current state machine state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Current in-memory progress
    pub fn progress(&self) -> &CrawlProgress {
        &self.progress
    }

    /// Borrows the sink (for inspection in tests)
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

// Engine behavior is exercised end-to-end by the wiremock-based integration
// tests; the pieces it composes carry their own unit tests.
