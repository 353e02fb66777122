pub mod anchor_links;
pub mod html_source;
pub mod posted_lines;

pub use anchor_links::AnchorLinkParser;
pub use html_source::HtmlSource;
pub use posted_lines::PostedLineParser;
