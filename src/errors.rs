use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

/// 选取引用失败的四种结果
///
/// `Display` 输出即面向用户的文本，原样返回给页面或命令行。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Ошибка: Файл {0} не найден.")]
    StoreNotFound(String),

    #[error("Ошибка декодирования JSON: {0}")]
    DecodeError(String),

    #[error("В данных JSON не найдено цитат.")]
    EmptyStore,

    #[error("В данных JSON не найдено цитат на языке {0}.")]
    NoQuotesForLanguage(String),
}

impl SelectorError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SelectorError::StoreNotFound(_) => "STORE_NOT_FOUND",
            SelectorError::DecodeError(_) => "DECODE_ERROR",
            SelectorError::EmptyStore => "EMPTY_STORE",
            SelectorError::NoQuotesForLanguage(_) => "NO_QUOTES_FOR_LANGUAGE",
        }
    }

    /// 是否属于存储文件本身的问题（而不是查询条件的问题）
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            SelectorError::StoreNotFound(_) | SelectorError::DecodeError(_)
        )
    }
}

/// 响应体始终是面向用户的文本，页面直接展示
impl IntoResponse for SelectorError {
    fn into_response(self) -> Response {
        let status = match self {
            SelectorError::StoreNotFound(_) | SelectorError::DecodeError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SelectorError::EmptyStore | SelectorError::NoQuotesForLanguage(_) => {
                StatusCode::NOT_FOUND
            }
        };

        (status, self.to_string()).into_response()
    }
}

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("请求失败: {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("页面结构不符合预期: {0}")]
    UnexpectedMarkup(String),

    #[error("无效的URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("翻译失败: {0}")]
    Translation(String),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HarvestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            HarvestError::Fetch { .. } => "FETCH_ERROR",
            HarvestError::UnexpectedMarkup(_) => "UNEXPECTED_MARKUP",
            HarvestError::InvalidUrl(_) => "INVALID_URL",
            HarvestError::Translation(_) => "TRANSLATION_ERROR",
            HarvestError::IoError(_) => "IO_ERROR",
            HarvestError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// 检查错误是否可恢复（下一轮采集可能成功）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HarvestError::Fetch { .. } | HarvestError::Translation(_)
        )
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("环境变量 {key} 的值无效: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
