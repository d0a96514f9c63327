//! # Random Quotes
//!
//! 多语言“每日一句”服务：从 `quotes.json` 中随机挑选一条引用，
//! 以纯文本返回给页面或命令行。
//!
//! ## 特性
//!
//! - 🎲 **随机引用** - 按语言过滤后在所有来源的展平序列上均匀选取
//! - 🌐 **HTTP 服务** - 引用页面、纯文本接口和背景动画帧数据
//! - 🕷️ **引用采集** - 抓取引用网站并通过 LibreTranslate 翻译成多种语言
//! - 💖 **背景动画** - 漂浮爱心的粒子模拟
//!
//! ## 快速开始
//!
//! ```no_run
//! use random_quotes::quotes::{QuoteService, RngSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = QuoteService::new("quotes.json");
//!     let mut rng = RngSource::from_entropy();
//!
//!     // 引用或错误文本
//!     println!("{}", service.random_quote_text(Some("en"), &mut rng).await);
//! }
//! ```

pub mod animation;
pub mod config;
pub mod errors;
pub mod harvester;
pub mod quotes;
pub mod server;

pub use config::AppConfig;
pub use errors::{ConfigError, HarvestError, SelectorError};
pub use quotes::{select, QuoteService, QuoteStore, QuoteText, RandomSource};
