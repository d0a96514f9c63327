pub mod loader;
pub mod models;
pub mod selector;
pub mod service;

pub use loader::{load_document, load_store, parse_document};
pub use models::{LanguageMap, QuoteStore, QuoteText, StoreDocument};
pub use selector::{parse_language_filter, select, RandomSource, RngSource, SequenceSource, ANY_LANGUAGE};
pub use service::QuoteService;
