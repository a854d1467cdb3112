//! Batch orchestration across many URLs
//!
//! Inputs are resolved up front, split into consecutive batches of at most
//! `batch_size`, and each batch's pipelines are driven concurrently on the
//! current task. Batches never overlap: batch N+1 starts only after every
//! pipeline of batch N has settled.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{info, warn};

use crate::browser::RenderEngine;
use crate::origin::{ResolvedUrl, resolve};
use crate::page_extractor::{ExtractionResult, FailureKind};
use crate::session::scrape_page;
use crate::{Config, InvalidInputPolicy};

/// One input after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    Resolved(ResolvedUrl),
    /// Unresolvable raw input, kept only under [`InvalidInputPolicy::Record`]
    Invalid(String),
}

/// Split `items` into consecutive, non-overlapping batches of at most
/// `batch_size` elements (a size of 0 is treated as 1).
pub fn partition<T>(items: &[T], batch_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(batch_size.max(1))
}

/// Resolve raw inputs, applying the run's invalid-input policy
pub fn resolve_inputs<I, T>(inputs: I, policy: InvalidInputPolicy) -> Vec<WorkItem>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    inputs
        .into_iter()
        .filter_map(|raw| {
            let raw = raw.as_ref();
            match resolve(raw) {
                Some(resolved) => Some(WorkItem::Resolved(resolved)),
                None => match policy {
                    InvalidInputPolicy::Record => Some(WorkItem::Invalid(raw.to_string())),
                    InvalidInputPolicy::Skip => {
                        warn!(input = raw, "Skipping unresolvable URL");
                        None
                    }
                },
            }
        })
        .collect()
}

/// Drives the per-URL pipeline over a whole input list
pub struct BatchOrchestrator<E: RenderEngine> {
    engine: E,
    config: Config,
}

impl<E: RenderEngine> BatchOrchestrator<E> {
    pub fn new(engine: E, config: Config) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Process every input and return one result per processed URL.
    ///
    /// Batch order is preserved; inside a batch results appear in
    /// completion order. Never fails: pipeline failures become failure
    /// records.
    pub async fn run<I, T>(&self, urls: I) -> Vec<ExtractionResult>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let cap = self.config.max_urls.unwrap_or(usize::MAX);
        let items = resolve_inputs(urls.into_iter().take(cap), self.config.invalid_input);

        let mut results = Vec::with_capacity(items.len());

        for (index, batch) in partition(&items, self.config.batch_size).enumerate() {
            info!(batch = index + 1, size = batch.len(), "Processing batch");

            let mut pending: FuturesUnordered<_> =
                batch.iter().map(|item| self.process(item)).collect();

            while let Some(result) = pending.next().await {
                results.push(result);
            }
        }

        let failures = results.iter().filter(|r| r.is_failure()).count();
        info!(total = results.len(), failures, "Run complete");

        results
    }

    async fn process(&self, item: &WorkItem) -> ExtractionResult {
        match item {
            WorkItem::Resolved(target) => scrape_page(&self.engine, target, &self.config).await,
            WorkItem::Invalid(raw) => ExtractionResult::failure(raw, FailureKind::InvalidInput),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_preserves_order_without_overlap() {
        let items: Vec<u32> = (1..=7).collect();
        let batches: Vec<&[u32]> = partition(&items, 3).collect();
        assert_eq!(batches, vec![&[1u32, 2, 3][..], &[4u32, 5, 6][..], &[7u32][..]]);
    }

    #[test]
    fn partition_zero_is_one() {
        let items = ["a", "b"];
        assert_eq!(partition(&items, 0).count(), 2);
        assert_eq!(partition(&items, 10).count(), 1);
    }

    #[test]
    fn record_policy_keeps_invalid_inputs_in_place() {
        let items = resolve_inputs(["example.com", "not a url", "shop.acme.co.uk"], InvalidInputPolicy::Record);
        assert_eq!(items.len(), 3);
        assert!(matches!(&items[0], WorkItem::Resolved(r) if r.url == "https://www.example.com"));
        assert_eq!(items[1], WorkItem::Invalid("not a url".to_string()));
        assert!(matches!(&items[2], WorkItem::Resolved(r) if r.parts.sld == "acme"));
    }

    #[test]
    fn skip_policy_drops_invalid_inputs() {
        let items = resolve_inputs(["", "example.com", "http://127.0.0.1"], InvalidInputPolicy::Skip);
        assert_eq!(items.len(), 1);
    }
}
