use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::HarvestError;

/// 引用正文以外的区块，提取文本时整块跳过
pub const NOISE_CLASSES: &[&str] = &[
    "rate-widget-1",
    "field-name-field-quote-picture",
    "field-type-taxonomy-term-reference",
    "node__topics",
    "quote__meta",
    "pagination",
    "node__series",
    "quote__original",
];

const NOISE_TAGS: &[&str] = &["pre", "code"];

/// 一个主题页采集到的原文引用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub url: String,
    pub quotes: Vec<String>,
}

/// 引用网站爬虫
pub struct QuoteScraper {
    http_client: Client,
    topic_url: String,
}

impl QuoteScraper {
    pub fn new(http_client: Client, topic_url: impl Into<String>) -> Self {
        Self {
            http_client,
            topic_url: topic_url.into(),
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, HarvestError> {
        let fetch_error = |source: reqwest::Error| HarvestError::Fetch {
            url: url.to_string(),
            source,
        };

        self.http_client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)
    }

    /// 获取主题索引页中的全部主题链接
    pub async fn topic_links(&self) -> Result<Vec<String>, HarvestError> {
        info!("🕷️ 获取主题索引: {}", self.topic_url);
        let html = self.fetch_html(&self.topic_url).await?;
        let base = Url::parse(&self.topic_url)?;
        extract_topic_links(&html, &base)
    }

    /// 随机抽取 `pages` 个主题页并采集引用
    ///
    /// 单个页面失败只记录日志，不影响其他页面。
    pub async fn scrape_random_pages(
        &self,
        pages: usize,
        rng: &mut impl Rng,
    ) -> Result<Vec<ScrapedPage>, HarvestError> {
        let links = self.topic_links().await?;
        let chosen = sample_links(&links, pages, rng);
        info!("📑 共 {} 个主题，本轮抽取 {} 个", links.len(), chosen.len());

        let mut scraped = Vec::new();
        for url in chosen {
            match self.scrape_page(&url).await {
                Ok(quotes) if !quotes.is_empty() => {
                    debug!("✅ {} 采集到 {} 条引用", url, quotes.len());
                    scraped.push(ScrapedPage { url, quotes });
                }
                Ok(_) => warn!("⚠️ {} 没有引用", url),
                Err(e) => warn!("⚠️ 采集 {} 失败: {}", url, e),
            }
        }
        Ok(scraped)
    }

    pub async fn scrape_page(&self, url: &str) -> Result<Vec<String>, HarvestError> {
        let html = self.fetch_html(url).await?;
        extract_quotes(&html)
    }
}

/// 从链接中无放回抽样，数量不足时全部返回
pub fn sample_links(links: &[String], count: usize, rng: &mut impl Rng) -> Vec<String> {
    if links.len() <= count {
        return links.to_vec();
    }
    links.choose_multiple(rng, count).cloned().collect()
}

fn selector(css: &str) -> Result<Selector, HarvestError> {
    Selector::parse(css)
        .map_err(|e| HarvestError::UnexpectedMarkup(format!("选择器 {} 无效: {:?}", css, e)))
}

/// 解析主题索引页：`#list-content-wrapper` 下每个 div 的第一个链接
pub fn extract_topic_links(html: &str, base: &Url) -> Result<Vec<String>, HarvestError> {
    let document = Html::parse_document(html);
    let wrapper_selector = selector("div#list-content-wrapper")?;
    let div_selector = selector("div")?;
    let link_selector = selector("a[href]")?;

    let wrapper = document.select(&wrapper_selector).next().ok_or_else(|| {
        HarvestError::UnexpectedMarkup("未找到 div#list-content-wrapper".to_string())
    })?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for div in wrapper.select(&div_selector) {
        let Some(href) = div
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        match base.join(href.trim()) {
            Ok(url) => {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
            Err(e) => debug!("跳过无效链接 {}: {}", href, e),
        }
    }

    Ok(links)
}

/// 解析主题页：`.region-content` 下每个 `.field-item` 的文本
pub fn extract_quotes(html: &str) -> Result<Vec<String>, HarvestError> {
    let document = Html::parse_document(html);
    let region_selector = selector("div.region-content")?;
    let item_selector = selector("div.field-item")?;

    let region = document.select(&region_selector).next().ok_or_else(|| {
        HarvestError::UnexpectedMarkup("未找到 div.region-content".to_string())
    })?;

    let mut seen = HashSet::new();
    let mut quotes = Vec::new();
    for item in region.select(&item_selector) {
        if inside_noise(&item) {
            continue;
        }

        let mut raw = String::new();
        collect_text(item, &mut raw);
        let text = collapse_whitespace(&raw);
        if !text.is_empty() && seen.insert(text.clone()) {
            quotes.push(text);
        }
    }

    Ok(quotes)
}

fn is_noise(element: &ElementRef) -> bool {
    let value = element.value();
    NOISE_TAGS.contains(&value.name()) || value.classes().any(|c| NOISE_CLASSES.contains(&c))
}

fn inside_noise(element: &ElementRef) -> bool {
    is_noise(element)
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_noise(&ancestor))
}

fn collect_text(element: ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_noise(&child) {
                        collect_text(child, out);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
