pub mod fetcher;
pub mod merger;
pub mod pipeline;
pub mod storage;
