pub mod extract_wrapper;
pub mod page_extractor;
pub mod record_matcher;

pub use extract_wrapper::*;
pub use page_extractor::*;
pub use record_matcher::*;
