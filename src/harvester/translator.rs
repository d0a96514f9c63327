use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::HarvestError;

/// 翻译服务
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, HarvestError>;
}

/// LibreTranslate 兼容接口
pub struct LibreTranslator {
    http_client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl LibreTranslator {
    pub fn new(http_client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, HarvestError> {
        let form = [
            ("q", text),
            ("source", "auto"),
            ("target", target_language),
            ("format", "text"),
        ];

        let response = self
            .http_client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| HarvestError::Translation(format!("{} -> {}: {}", self.endpoint, target_language, e)))?;

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::Translation(format!("响应格式错误: {}", e)))?;

        Ok(body.translated_text)
    }
}

/// 限制并发的翻译包装
///
/// 失败时返回原文，保证每条引用在每种语言下都有一条文本。
#[derive(Clone)]
pub struct BoundedTranslator {
    inner: Arc<dyn Translator>,
    semaphore: Arc<Semaphore>,
}

impl BoundedTranslator {
    pub fn new(inner: Arc<dyn Translator>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// 返回译文以及是否真正翻译成功
    pub async fn translate_or_original(&self, text: &str, target_language: &str) -> (String, bool) {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_) => return (text.to_string(), false),
        };

        match self.inner.translate(text, target_language).await {
            Ok(translated) => {
                debug!("🌐 翻译完成 -> {}", target_language);
                (translated, true)
            }
            Err(e) => {
                warn!("⚠️ 翻译到 {} 失败，保留原文: {}", target_language, e);
                (text.to_string(), false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowTranslator {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Translator for SlowTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String, HarvestError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if target_language == "xx" {
                return Err(HarvestError::Translation("unsupported".to_string()));
            }
            Ok(format!("[{}] {}", target_language, text))
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let inner = Arc::new(SlowTranslator {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let translator = BoundedTranslator::new(inner.clone(), 2);

        let jobs = (0..8).map(|i| {
            let translator = translator.clone();
            async move { translator.translate_or_original(&format!("q{}", i), "en").await }
        });
        let results = futures::future::join_all(jobs).await;

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|(_, ok)| *ok));
        assert_eq!(results[3].0, "[en] q3");
        assert!(inner.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_original() {
        let inner = Arc::new(SlowTranslator {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let translator = BoundedTranslator::new(inner, 1);
        let (text, ok) = translator.translate_or_original("Привет", "xx").await;
        assert_eq!(text, "Привет");
        assert!(!ok);
    }
}
