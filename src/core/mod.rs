pub mod config;
pub mod export;
pub mod feed;
pub mod i18n;
pub mod report;
pub mod storage;
pub mod sync;
