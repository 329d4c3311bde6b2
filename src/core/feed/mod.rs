pub mod fetcher;
pub mod parser;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{FeedClient, FetchError};
pub use parser::{parse_beacons, FeedParseError};
pub use types::BeaconRecord;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] FeedParseError),
}

impl FeedClient {
    /// Fetches and parses the feed. Failures from either step are returned
    /// as-is, with no retry and no partial result.
    pub async fn get_all(&self) -> Result<Vec<BeaconRecord>, FeedError> {
        let xml = self.fetch_raw().await?;
        let beacons = parse_beacons(&xml)?;
        Ok(beacons)
    }
}
