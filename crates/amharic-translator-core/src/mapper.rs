//! Per-document translation table.
//!
//! Every distinct run text in a document is translated exactly once; all
//! runs sharing that text render the same result. The map lives for one
//! document translation and is owned by whoever runs the pipeline.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pdf::{Page, total_runs};
use crate::translator::Translator;

/// How the map is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOptions {
    /// Maximum translation calls in flight; 1 means strictly sequential
    pub concurrency: usize,
    /// Give up on a single call after this long
    pub call_timeout: Option<Duration>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            call_timeout: None,
        }
    }
}

impl MapOptions {
    pub fn from_pipeline(pipeline: &PipelineConfig) -> Self {
        Self {
            concurrency: pipeline.concurrency.max(1),
            call_timeout: pipeline.call_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Progress through the runs of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProgress {
    /// Runs handled so far, cache hits included
    pub processed: usize,
    pub total: usize,
    /// Page of the run that was just handled
    pub page_number: u32,
}

impl ItemProgress {
    /// Share of runs handled, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f32 / self.total as f32
        }
    }
}

/// Original run text to translated text, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMap {
    entries: IndexMap<String, String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.entries.get(text).map(String::as_str)
    }

    /// The translation of `text`, or `text` itself when there is none.
    pub fn resolve<'a>(&'a self, text: &'a str) -> &'a str {
        self.get(text).unwrap_or(text)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// Record a translation, returning the one it replaced.
    pub fn insert(
        &mut self,
        original: impl Into<String>,
        translated: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(original.into(), translated.into())
    }

    /// Number of distinct texts, which is also the number of calls made
    /// when the map was built.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Translate every distinct run text of `pages`.
    ///
    /// `on_item` is told how many runs have been handled after each step.
    /// The first failing call aborts the whole build; no partial map is
    /// returned.
    pub async fn build<F>(
        pages: &[Page],
        translator: &dyn Translator,
        options: &MapOptions,
        on_item: F,
    ) -> Result<Self>
    where
        F: FnMut(ItemProgress),
    {
        let map = if options.concurrency <= 1 {
            Self::build_sequential(pages, translator, options, on_item).await?
        } else {
            Self::build_concurrent(pages, translator, options, on_item).await?
        };

        info!(
            "Translated {} unique texts for {} runs",
            map.len(),
            total_runs(pages)
        );
        Ok(map)
    }

    async fn build_sequential<F>(
        pages: &[Page],
        translator: &dyn Translator,
        options: &MapOptions,
        mut on_item: F,
    ) -> Result<Self>
    where
        F: FnMut(ItemProgress),
    {
        let total = total_runs(pages);
        let mut map = Self::new();
        let mut processed = 0;

        for page in pages {
            for run in &page.runs {
                if !map.contains(&run.text) {
                    let translated =
                        call_translator(translator, &run.text, options.call_timeout).await?;
                    map.insert(run.text.clone(), translated);
                }

                processed += 1;
                on_item(ItemProgress {
                    processed,
                    total,
                    page_number: page.page_number,
                });
            }
        }

        Ok(map)
    }

    /// Distinct texts go out with up to `concurrency` calls in flight and come
    /// back in first-occurrence order, so the result equals the sequential one.
    async fn build_concurrent<F>(
        pages: &[Page],
        translator: &dyn Translator,
        options: &MapOptions,
        mut on_item: F,
    ) -> Result<Self>
    where
        F: FnMut(ItemProgress),
    {
        let total = total_runs(pages);

        // text -> (first page, occurrences)
        let mut unique: IndexMap<&str, (u32, usize)> = IndexMap::new();
        for page in pages {
            for run in &page.runs {
                unique
                    .entry(run.text.as_str())
                    .or_insert((page.page_number, 0))
                    .1 += 1;
            }
        }
        debug!(
            "Translating {} unique texts with concurrency {}",
            unique.len(),
            options.concurrency
        );

        let timeout = options.call_timeout;
        let mut results = stream::iter(unique.iter())
            .map(|(&text, &(page_number, count))| async move {
                let translated = call_translator(translator, text, timeout).await;
                (text, page_number, count, translated)
            })
            .buffered(options.concurrency);

        let mut map = Self::new();
        let mut processed = 0;
        while let Some((text, page_number, count, translated)) = results.next().await {
            map.insert(text, translated?);
            processed += count;
            on_item(ItemProgress {
                processed,
                total,
                page_number,
            });
        }

        Ok(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (original, translated) in iter {
            map.insert(original, translated);
        }
        map
    }
}

/// One capability call, with the optional timeout applied.
async fn call_translator(
    translator: &dyn Translator,
    text: &str,
    timeout: Option<Duration>,
) -> Result<String> {
    debug!("Translating {:?}", text);
    let call = translator.translate(text);

    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| Error::TranslationTimeout)?,
        None => call.await,
    };

    result.map_err(|e| match e {
        Error::TranslationTimeout | Error::TranslationFailed(_) => e,
        other => Error::TranslationFailed(other.to_string()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pdf::{PageGeometry, TextRun};
    use crate::translator::TranslatorInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Uppercases its input, optionally failing on the n-th call.
    #[derive(Default)]
    struct Upper {
        calls: Mutex<Vec<String>>,
        fail_on: Option<usize>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl Translator for Upper {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo { name: "upper" }
        }

        async fn translate(&self, text: &str) -> Result<String> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(text.to_string());
                calls.len()
            };
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_on == Some(n) {
                return Err(Error::TranslationRequest("backend down".into()));
            }
            Ok(text.to_uppercase())
        }
    }

    fn page(number: u32, texts: &[&str]) -> Page {
        let runs = texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                #[allow(clippy::cast_precision_loss)]
                let y = 700.0 - 20.0 * i as f32;
                TextRun::new(text, 72.0, y, 12.0, "Helvetica", PageGeometry::default()).unwrap()
            })
            .collect();
        Page::new(number, PageGeometry::default(), runs).unwrap()
    }

    fn sample() -> Vec<Page> {
        vec![
            page(1, &["alpha", "beta", "alpha", "gamma", "beta"]),
            page(2, &["delta", "alpha", "epsilon", "gamma", "delta"]),
        ]
    }

    #[test]
    fn test_resolve_falls_back_to_original() {
        let map: TranslationMap = [("Hello", "ሰላም"), ("Empty", "")].into_iter().collect();
        assert_eq!(map.resolve("Hello"), "ሰላም");
        assert_eq!(map.resolve("Empty"), "");
        assert_eq!(map.resolve("Missing"), "Missing");
        assert_eq!(map.get("Missing"), None);
    }

    #[tokio::test]
    async fn test_each_unique_text_translated_once() {
        let translator = Upper::default();
        let map = TranslationMap::build(&sample(), &translator, &MapOptions::default(), |_| {})
            .await
            .unwrap();

        let calls = translator.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["alpha", "beta", "gamma", "delta", "epsilon"]);
        assert_eq!(map.len(), 5);
        assert_eq!(map.resolve("gamma"), "GAMMA");
    }

    #[tokio::test]
    async fn test_progress_counts_cache_hits() {
        let translator = Upper::default();
        let mut seen = Vec::new();
        TranslationMap::build(&sample(), &translator, &MapOptions::default(), |p| seen.push(p))
            .await
            .unwrap();

        let processed: Vec<usize> = seen.iter().map(|p| p.processed).collect();
        assert_eq!(processed, (1..=10).collect::<Vec<_>>());
        assert!(seen.iter().all(|p| p.total == 10));
        assert_eq!(seen[4].page_number, 1);
        assert_eq!(seen[5].page_number, 2);
        assert!((seen[9].ratio() - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_failure_aborts_build() {
        let translator = Upper { fail_on: Some(3), ..Upper::default() };
        let mut seen = 0;
        let options = MapOptions::default();
        let result = TranslationMap::build(&sample(), &translator, &options, |_| seen += 1).await;

        assert!(matches!(result, Err(Error::TranslationFailed(_))));
        assert_eq!(translator.calls.lock().unwrap().len(), 3);
        // alpha, beta, alpha were handled before gamma failed
        assert_eq!(seen, 3);
    }

    #[tokio::test]
    async fn test_concurrent_build_matches_sequential() {
        let sequential =
            TranslationMap::build(&sample(), &Upper::default(), &MapOptions::default(), |_| {})
                .await
                .unwrap();

        let translator = Upper {
            delay: Some(Duration::from_millis(5)),
            ..Upper::default()
        };
        let options = MapOptions { concurrency: 4, call_timeout: None };
        let mut seen = Vec::new();
        let concurrent = TranslationMap::build(&sample(), &translator, &options, |p| seen.push(p))
            .await
            .unwrap();

        assert_eq!(concurrent, sequential);
        assert_eq!(
            concurrent.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            vec!["alpha", "beta", "gamma", "delta", "epsilon"]
        );
        assert_eq!(translator.calls.lock().unwrap().len(), 5);
        // alpha x3, beta x2, gamma x2, delta x2, epsilon x1
        let processed: Vec<usize> = seen.iter().map(|p| p.processed).collect();
        assert_eq!(processed, vec![3, 5, 7, 9, 10]);
    }

    #[tokio::test]
    async fn test_call_timeout() {
        let translator = Upper {
            delay: Some(Duration::from_millis(500)),
            ..Upper::default()
        };
        let options = MapOptions {
            concurrency: 1,
            call_timeout: Some(Duration::from_millis(20)),
        };
        let result = TranslationMap::build(&sample(), &translator, &options, |_| {}).await;

        assert!(matches!(result, Err(Error::TranslationTimeout)));
    }

    #[test]
    fn test_options_from_pipeline() {
        let pipeline = PipelineConfig {
            concurrency: 0,
            call_timeout_secs: Some(30),
            ..PipelineConfig::default()
        };
        let options = MapOptions::from_pipeline(&pipeline);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.call_timeout, Some(Duration::from_secs(30)));
    }
}
