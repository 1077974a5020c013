pub mod ai;
pub mod completeness;
pub mod conversation;
pub mod extractor;
pub mod notify;
pub mod provider;
pub mod scheduling;
