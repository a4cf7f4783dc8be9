pub mod fetch;
pub mod html;
pub mod search;

pub use fetch::{ContentFetcher, FetchedContent, FetchedPage};
pub use search::{SearchProvider, SearchResult, WebSearch};
