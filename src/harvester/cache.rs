use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use crate::quotes::StoreDocument;

/// 上一轮采集结果中的译文
///
/// 键为 (来源, 原文, 目标语言)。旧文件中某语言的列表与原文列表
/// 长度一致时按位置对应，否则该语言不参与复用。
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<(String, String, String), String>,
}

impl TranslationCache {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_document(
        document: &StoreDocument,
        source_language: &str,
        expiry: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(timestamp) = document.timestamp else {
            info!("旧引用文件没有时间戳，不复用翻译");
            return Self::empty();
        };

        let age = now.signed_duration_since(timestamp);
        let expired = age
            .to_std()
            .map(|age| age >= expiry)
            // 时间戳在未来时视为新鲜
            .unwrap_or(false);
        if expired {
            info!("⌛ 翻译缓存已过期 (生成于 {})", timestamp);
            return Self::empty();
        }

        let mut entries = HashMap::new();
        for (source_id, languages) in document.store.sources() {
            let Some(originals) = languages.get(source_language) else {
                continue;
            };

            for (language, translations) in languages {
                if language == source_language || translations.len() != originals.len() {
                    continue;
                }
                for (original, translated) in originals.iter().zip(translations) {
                    entries.insert(
                        (
                            source_id.to_string(),
                            original.as_str().to_string(),
                            language.clone(),
                        ),
                        translated.as_str().to_string(),
                    );
                }
            }
        }

        info!("♻️ 从旧引用文件加载了 {} 条译文", entries.len());
        Self { entries }
    }

    pub fn get(&self, source_id: &str, original: &str, language: &str) -> Option<&str> {
        self.entries
            .get(&(
                source_id.to_string(),
                original.to_string(),
                language.to_string(),
            ))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
