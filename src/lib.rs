pub mod core;

pub use crate::core::config::{AppConfig, ConfigError, FeedConfig};
pub use crate::core::feed::{
    parse_beacons, BeaconRecord, FeedClient, FeedError, FeedParseError, FetchError,
};
pub use crate::core::i18n::Language;
