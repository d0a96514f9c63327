use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::loader::load_store;
use super::models::QuoteText;
use super::selector::{parse_language_filter, select, RandomSource};
use crate::errors::SelectorError;

/// 服务端和命令行共用的取引用入口
///
/// 每次调用都重新加载引用文件。
#[derive(Debug, Clone)]
pub struct QuoteService {
    store_path: PathBuf,
}

impl QuoteService {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// `language` 为原始用户输入，`any` 或空值表示所有语言
    pub async fn random_quote(
        &self,
        language: Option<&str>,
        rng: &mut impl RandomSource,
    ) -> Result<QuoteText, SelectorError> {
        let filter = parse_language_filter(language);
        let store = load_store(&self.store_path).await?;

        let result = select(&store, filter.as_deref(), rng);
        match &result {
            Ok(quote) => debug!("🎲 选中引用 ({:?}): {}", filter, quote),
            Err(e) => warn!("⚠️ 选取引用失败 [{}]: {}", e.error_code(), e),
        }
        result
    }

    /// 引用或错误文本，直接用于展示
    pub async fn random_quote_text(
        &self,
        language: Option<&str>,
        rng: &mut impl RandomSource,
    ) -> String {
        match self.random_quote(language, rng).await {
            Ok(quote) => quote.into_inner(),
            Err(e) => e.to_string(),
        }
    }
}
