use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 单条引用文本，保证非空
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QuoteText(String);

impl QuoteText {
    /// 空白字符串不是合法的引用
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for QuoteText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QuoteText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 语言代码 -> 有序引用列表
pub type LanguageMap = BTreeMap<String, Vec<QuoteText>>;

/// 来源标识（通常是URL） -> 各语言的引用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuoteStore {
    sources: BTreeMap<String, LanguageMap>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从原始字符串映射构建，丢弃空白引用
    pub fn from_raw(raw: BTreeMap<String, BTreeMap<String, Vec<String>>>) -> Self {
        let mut store = Self::new();
        for (source_id, languages) in raw {
            for (language, quotes) in languages {
                store.insert(&source_id, &language, quotes);
            }
        }
        store
    }

    /// 追加某来源某语言的引用；来源和语言条目即使为空也会保留
    pub fn insert<I, S>(&mut self, source_id: &str, language: &str, quotes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .sources
            .entry(source_id.to_string())
            .or_default()
            .entry(language.to_string())
            .or_default();
        entry.extend(quotes.into_iter().filter_map(QuoteText::new));
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> impl Iterator<Item = (&str, &LanguageMap)> {
        self.sources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn source(&self, source_id: &str) -> Option<&LanguageMap> {
        self.sources.get(source_id)
    }

    pub fn quotes(&self, source_id: &str, language: &str) -> &[QuoteText] {
        self.sources
            .get(source_id)
            .and_then(|languages| languages.get(language))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 所有出现过的语言代码
    pub fn languages(&self) -> BTreeSet<&str> {
        self.sources
            .values()
            .flat_map(|languages| languages.keys().map(String::as_str))
            .collect()
    }

    /// 展平：按来源、语言的键顺序合并所有匹配的引用
    pub fn flatten(&self, language: Option<&str>) -> Vec<&QuoteText> {
        match language {
            None => self
                .sources
                .values()
                .flat_map(|languages| languages.values().flatten())
                .collect(),
            Some(code) => self
                .sources
                .values()
                .filter_map(|languages| languages.get(code))
                .flatten()
                .collect(),
        }
    }

    pub fn quote_count(&self) -> usize {
        self.flatten(None).len()
    }
}

/// 磁盘上的引用文件
///
/// 采集器写出的文件带有 `timestamp`，手工维护的文件可以只有映射本身。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDocument {
    pub timestamp: Option<DateTime<Utc>>,
    pub store: QuoteStore,
}

/// 采集器写出的信封格式
#[derive(Debug, Serialize)]
pub(crate) struct StoreEnvelope<'a> {
    pub timestamp: String,
    pub data: &'a QuoteStore,
}

/// 仅用于解析信封的 `timestamp` 字段
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    pub timestamp: serde_json::Value,
    pub data: serde_json::Value,
}

impl StoreDocument {
    pub fn new(store: QuoteStore) -> Self {
        Self {
            timestamp: None,
            store,
        }
    }

    pub fn stamped(store: QuoteStore, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            store,
        }
    }

    /// 按信封格式序列化，缺少时间戳时使用当前时间
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        serde_json::to_string_pretty(&StoreEnvelope {
            timestamp: timestamp.to_rfc3339(),
            data: &self.store,
        })
    }
}
