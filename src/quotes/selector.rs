use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::models::{QuoteStore, QuoteText};
use crate::errors::SelectorError;

/// 页面上“所有语言”选项的值
pub const ANY_LANGUAGE: &str = "any";

/// 随机下标来源
pub trait RandomSource {
    /// 返回 `[0, len)` 内的下标，`len` 保证大于 0
    fn next_index(&mut self, len: usize) -> usize;
}

/// 基于 `rand` 的随机来源
#[derive(Debug, Clone)]
pub struct RngSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// 按固定序列循环给出下标，超出范围时取模
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<usize>,
    position: usize,
}

impl SequenceSource {
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }
}

impl RandomSource for SequenceSource {
    fn next_index(&mut self, len: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value % len
    }
}

/// 将用户输入的语言参数规范化
///
/// 缺省、空串和 `any`（不区分大小写）都表示不按语言过滤；
/// 其他语言代码只去掉首尾空白，按原样与引用库中的键比较。
pub fn parse_language_filter(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim();
    if code.is_empty() || code.eq_ignore_ascii_case(ANY_LANGUAGE) {
        None
    } else {
        Some(code.to_string())
    }
}

/// 从引用库中随机选出一条引用
///
/// 先按语言过滤并展平所有来源，再在展平后的序列上均匀取下标。
/// 不指定语言时，每种（来源, 语言）组合按其引用数量贡献概率。
pub fn select(
    store: &QuoteStore,
    language: Option<&str>,
    rng: &mut impl RandomSource,
) -> Result<QuoteText, SelectorError> {
    if store.is_empty() {
        return Err(SelectorError::EmptyStore);
    }

    let pool = store.flatten(language);
    if pool.is_empty() {
        return Err(match language {
            Some(code) => SelectorError::NoQuotesForLanguage(code.to_string()),
            None => SelectorError::EmptyStore,
        });
    }

    let index = rng.next_index(pool.len());
    Ok(pool[index.min(pool.len() - 1)].clone())
}
