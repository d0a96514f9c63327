use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::errors::ConfigError;

pub const DEFAULT_QUOTES_FILE: &str = "quotes.json";
pub const DEFAULT_TOPIC_URL: &str = "https://citaty.info/topic";
pub const DEFAULT_TRANSLATE_URL: &str = "http://localhost:8080/translate";
/// 采集到的原文语言
pub const SOURCE_LANGUAGE: &str = "ru";

/// 服务配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub quotes_file: PathBuf,
    pub server: ServerConfig,
    pub harvest: HarvestConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// 引用采集配置
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// 主题索引页
    pub topic_url: String,
    /// 每轮随机抽取的主题页数量
    pub pages: usize,
    /// LibreTranslate 兼容的翻译接口
    pub translate_url: String,
    pub target_languages: Vec<String>,
    pub max_concurrent_translations: usize,
    /// 旧文件中的翻译在此时长内可复用
    pub cache_expiry: Duration,
    pub interval: Duration,
    pub http_timeout: Duration,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            topic_url: DEFAULT_TOPIC_URL.to_string(),
            pages: 4,
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            target_languages: ["en", "fr", "de", "es"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_concurrent_translations: 5,
            cache_expiry: Duration::from_secs(24 * 60 * 60),
            interval: Duration::from_secs(24 * 60 * 60),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quotes_file: PathBuf::from(DEFAULT_QUOTES_FILE),
            server: ServerConfig::default(),
            harvest: HarvestConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置（调用方负责先加载 `.env`）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 通过任意键值来源加载，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let harvest = defaults.harvest;

        let quotes_file = lookup("QUOTES_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.quotes_file);

        let server = ServerConfig {
            host: lookup("QUOTES_HOST").unwrap_or(defaults.server.host),
            port: parse_or(&lookup, "QUOTES_PORT", defaults.server.port)?,
            enable_cors: parse_or(&lookup, "QUOTES_ENABLE_CORS", defaults.server.enable_cors)?,
        };

        let target_languages = match lookup("QUOTES_LANGUAGES") {
            Some(raw) => parse_languages(&raw)?,
            None => harvest.target_languages,
        };

        let harvest = HarvestConfig {
            topic_url: lookup("QUOTES_TOPIC_URL").unwrap_or(harvest.topic_url),
            pages: parse_or(&lookup, "QUOTES_PAGES", harvest.pages)?,
            translate_url: lookup("LIBRETRANSLATE_URL").unwrap_or(harvest.translate_url),
            target_languages,
            max_concurrent_translations: parse_or(
                &lookup,
                "QUOTES_MAX_TRANSLATIONS",
                harvest.max_concurrent_translations,
            )?
            .max(1),
            cache_expiry: secs_or(&lookup, "QUOTES_CACHE_EXPIRY_SECS", harvest.cache_expiry)?,
            interval: secs_or(&lookup, "QUOTES_HARVEST_INTERVAL_SECS", harvest.interval)?,
            http_timeout: secs_or(&lookup, "QUOTES_HTTP_TIMEOUT_SECS", harvest.http_timeout)?,
        };

        Ok(Self {
            quotes_file,
            server,
            harvest,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => {
            debug!("{} 未设置，使用默认值: {}", key, default);
            Ok(default)
        }
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}

fn parse_languages(raw: &str) -> Result<Vec<String>, ConfigError> {
    let languages: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if languages.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "QUOTES_LANGUAGES".to_string(),
            value: raw.to_string(),
            reason: "至少需要一种语言".to_string(),
        });
    }
    Ok(languages)
}
