//! Page metadata extraction module
//!
//! Isolated, failure-tolerant reads against a rendered document: a missing
//! or malformed fragment empties the corresponding field instead of
//! discarding the page.

pub mod fields;
pub mod page_info;
pub mod schema;
pub mod social;

// Re-export commonly used types
pub use fields::best_effort_read;
pub use page_info::extract_page_info;
pub use schema::{
    ExtractionFailure, ExtractionResult, FailureKind, PageMetadata, Platform, SocialHandleMap,
};
pub use social::{PLATFORMS, PlatformSpec, lookup_platform, lookup_socials};
