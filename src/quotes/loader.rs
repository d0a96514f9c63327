use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::models::{QuoteStore, RawEnvelope, StoreDocument};
use crate::errors::SelectorError;

/// 从磁盘读取引用文件
///
/// 每次调用都重新读取，不做跨请求缓存。
pub async fn load_document(path: &Path) -> Result<StoreDocument, SelectorError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SelectorError::StoreNotFound(display_name(path)));
        }
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            return Err(SelectorError::DecodeError(e.to_string()));
        }
        Err(e) => {
            debug!("读取引用文件失败: {:?} - {}", path, e);
            return Err(SelectorError::StoreNotFound(display_name(path)));
        }
    };

    parse_document(&text)
}

pub async fn load_store(path: &Path) -> Result<QuoteStore, SelectorError> {
    load_document(path).await.map(|document| document.store)
}

/// 解析引用文件内容
///
/// 顶层可以是 `{来源: {语言: [引用]}}`，也可以是采集器写出的
/// `{"timestamp": ..., "data": {...}}` 信封。
pub fn parse_document(text: &str) -> Result<StoreDocument, SelectorError> {
    let root: Value =
        serde_json::from_str(text).map_err(|e| SelectorError::DecodeError(e.to_string()))?;

    let (timestamp, body) = split_envelope(root);

    let map = match body {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(SelectorError::EmptyStore),
    };

    let raw: BTreeMap<String, BTreeMap<String, Vec<String>>> =
        serde_json::from_value(Value::Object(map))
            .map_err(|e| SelectorError::DecodeError(e.to_string()))?;

    let store = QuoteStore::from_raw(raw);
    debug!(
        "📚 加载引用: {} 个来源, {} 条引用",
        store.sources().count(),
        store.quote_count()
    );

    Ok(StoreDocument { timestamp, store })
}

fn split_envelope(root: Value) -> (Option<DateTime<Utc>>, Value) {
    let is_envelope = matches!(
        &root,
        Value::Object(map)
            if map.len() == 2 && map.contains_key("timestamp") && map.contains_key("data")
    );
    if !is_envelope {
        return (None, root);
    }

    match serde_json::from_value::<RawEnvelope>(root) {
        Ok(envelope) => (
            envelope.timestamp.as_str().and_then(parse_timestamp),
            envelope.data,
        ),
        // 两个字段都存在时反序列化不会失败
        Err(_) => (None, Value::Null),
    }
}

/// 支持 RFC3339 和不带时区的 ISO 时间（按 UTC 处理）
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
