pub mod app;
pub mod keywords;

pub use app::{AppConfig, ParserKind, SourceConfig};
