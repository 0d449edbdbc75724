pub mod reporting;
pub mod storage;
pub mod uploader;
pub mod workflow;
