use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::core::feed::{BeaconRecord, FeedClient, FeedError};

/// Beacons from the last successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub beacons: Vec<BeaconRecord>,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug)]
pub enum CycleOutcome<'a> {
    Updated(&'a Snapshot),
    /// The refresh failed; `previous` is what the caller is still showing.
    Failed {
        error: &'a FeedError,
        previous: Option<&'a Snapshot>,
    },
}

/// Periodic refresh around a [`FeedClient`]. Cycles run one after another,
/// the next sleep only starts once the previous cycle finished, and a failed
/// cycle leaves the last snapshot in place.
#[derive(Debug)]
pub struct Refresher {
    client: FeedClient,
    interval: Duration,
    snapshot: Option<Snapshot>,
}

impl Refresher {
    pub fn new(client: FeedClient, interval: Duration) -> Self {
        Self {
            client,
            interval,
            snapshot: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub async fn refresh_once(&mut self) -> Result<&Snapshot, FeedError> {
        let fetched = self.client.get_all().await;
        self.apply(fetched)
    }

    /// Refreshes immediately, then every `interval` until `shutdown`
    /// resolves. A fetch in flight when `shutdown` fires is dropped.
    pub async fn run<S, C>(&mut self, shutdown: S, mut on_cycle: C)
    where
        S: Future<Output = ()>,
        C: FnMut(CycleOutcome<'_>),
    {
        tokio::pin!(shutdown);
        info!(interval_secs = self.interval.as_secs(), "auto-refresh started");

        loop {
            let fetched = tokio::select! {
                _ = &mut shutdown => break,
                fetched = self.client.get_all() => fetched,
            };
            match self.apply(fetched) {
                Ok(snapshot) => on_cycle(CycleOutcome::Updated(snapshot)),
                Err(error) => on_cycle(CycleOutcome::Failed {
                    error: &error,
                    previous: self.snapshot.as_ref(),
                }),
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("auto-refresh stopped");
    }

    fn apply(
        &mut self,
        fetched: Result<Vec<BeaconRecord>, FeedError>,
    ) -> Result<&Snapshot, FeedError> {
        match fetched {
            Ok(beacons) => {
                info!(beacons = beacons.len(), "beacon snapshot updated");
                let snapshot = self.snapshot.insert(Snapshot {
                    beacons,
                    fetched_at: Local::now(),
                });
                Ok(&*snapshot)
            }
            Err(error) => {
                warn!(
                    %error,
                    kept = self.snapshot.as_ref().map(|snapshot| snapshot.beacons.len()),
                    "refresh failed, keeping previous beacons"
                );
                Err(error)
            }
        }
    }
}
