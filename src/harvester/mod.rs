//! # 引用采集
//!
//! 离线维护 `quotes.json`：
//!
//! - 从引用网站的主题索引随机抽取若干主题页，提取俄语原文
//! - 通过 LibreTranslate 翻译成目标语言，并发数受信号量限制
//! - 旧文件未过期时复用其中的译文，减少翻译请求
//! - 以 `{"timestamp": ..., "data": {来源: {语言: [引用]}}}` 格式原子写回
//!
//! 周期模式下每隔 `interval` 重复一次，直到收到 Ctrl+C。

pub mod cache;
pub mod scraper;
pub mod storage;
pub mod translator;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{HarvestConfig, SOURCE_LANGUAGE};
use crate::quotes::{QuoteStore, StoreDocument};

pub use cache::TranslationCache;
pub use scraper::{QuoteScraper, ScrapedPage};
pub use storage::{load_previous, save_document};
pub use translator::{BoundedTranslator, LibreTranslator, Translator};

/// 一轮采集的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub sources: usize,
    pub quotes: usize,
    pub translated: usize,
    pub reused: usize,
    pub fallbacks: usize,
    pub written: bool,
}

pub struct Harvester {
    config: HarvestConfig,
    output_path: PathBuf,
    scraper: QuoteScraper,
    translator: BoundedTranslator,
}

impl Harvester {
    pub fn new(config: HarvestConfig, output_path: impl Into<PathBuf>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("random-quotes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("创建HTTP客户端失败: {}", e))?;

        let scraper = QuoteScraper::new(http_client.clone(), config.topic_url.clone());
        let translator: Arc<dyn Translator> =
            Arc::new(LibreTranslator::new(http_client, config.translate_url.clone()));

        Ok(Self::with_parts(config, output_path, scraper, translator))
    }

    pub fn with_parts(
        config: HarvestConfig,
        output_path: impl Into<PathBuf>,
        scraper: QuoteScraper,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let translator = BoundedTranslator::new(translator, config.max_concurrent_translations);
        Self {
            config,
            output_path: output_path.into(),
            scraper,
            translator,
        }
    }

    /// 采集、翻译并写回一次
    pub async fn run_once(&self) -> Result<HarvestReport> {
        info!("🚀 开始采集引用...");

        let pages = {
            // ThreadRng 不能跨 await 持有
            let mut rng = StdRng::from_entropy();
            self.scraper
                .scrape_random_pages(self.config.pages, &mut rng)
                .await?
        };

        self.publish(pages).await
    }

    /// 翻译已采集的页面并写回文件
    pub async fn publish(&self, pages: Vec<ScrapedPage>) -> Result<HarvestReport> {
        if pages.is_empty() {
            warn!("⚠️ 本轮没有采集到任何引用，保留现有文件");
            return Ok(HarvestReport::default());
        }

        let cache = match load_previous(&self.output_path).await {
            Some(previous) => TranslationCache::from_document(
                &previous,
                SOURCE_LANGUAGE,
                self.config.cache_expiry,
                Utc::now(),
            ),
            None => TranslationCache::empty(),
        };

        let (store, mut report) = self.translate_pages(&pages, &cache).await;
        save_document(&self.output_path, &StoreDocument::stamped(store, Utc::now())).await?;
        report.written = true;

        info!(
            "✅ 采集完成: {} 个来源, {} 条原文, 新翻译 {}, 复用 {}, 保留原文 {}",
            report.sources, report.quotes, report.translated, report.reused, report.fallbacks
        );
        Ok(report)
    }

    async fn translate_pages(
        &self,
        pages: &[ScrapedPage],
        cache: &TranslationCache,
    ) -> (QuoteStore, HarvestReport) {
        let mut store = QuoteStore::new();
        let mut report = HarvestReport::default();

        for page in pages {
            store.insert(&page.url, SOURCE_LANGUAGE, page.quotes.iter().cloned());
            report.sources += 1;
            report.quotes += page.quotes.len();

            for language in &self.config.target_languages {
                if language == SOURCE_LANGUAGE {
                    continue;
                }

                let jobs = page.quotes.iter().map(|quote| async move {
                    match cache.get(&page.url, quote, language) {
                        Some(cached) => (cached.to_string(), Outcome::Reused),
                        None => match self.translator.translate_or_original(quote, language).await {
                            (text, true) => (text, Outcome::Translated),
                            (text, false) => (text, Outcome::Fallback),
                        },
                    }
                });

                let results = join_all(jobs).await;
                for (_, outcome) in &results {
                    match outcome {
                        Outcome::Reused => report.reused += 1,
                        Outcome::Translated => report.translated += 1,
                        Outcome::Fallback => report.fallbacks += 1,
                    }
                }
                store.insert(&page.url, language, results.into_iter().map(|(text, _)| text));
            }
        }

        (store, report)
    }

    /// 周期运行，单轮失败不会终止循环
    pub async fn run_periodic(&self) -> Result<()> {
        info!("⏰ 周期采集已启动，间隔 {:?}", self.config.interval);
        loop {
            if let Err(e) = self.run_once().await {
                error!("❌ 本轮采集失败: {:#}", e);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("收到 Ctrl+C，停止周期采集");
                    return Ok(());
                }
            }
        }
    }
}

enum Outcome {
    Reused,
    Translated,
    Fallback,
}
