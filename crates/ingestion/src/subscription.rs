//! FeedSubscription - wires a sensor feed into the ingestion filter

use std::sync::Arc;

use contracts::{IdentityProvider, LocationSample, SensorFeed};
use tracing::{debug, info, instrument};

use crate::error::{IngestionError, Result};
use crate::filter::IngestionFilter;

/// Live link between a `SensorFeed` and an `IngestionFilter`
///
/// The device identity is looked up once per `start` and attached to every
/// fix delivered afterwards.
pub struct FeedSubscription {
    feed: Arc<dyn SensorFeed>,
    filter: Arc<IngestionFilter>,
    identity: Arc<dyn IdentityProvider>,
}

impl FeedSubscription {
    pub fn new(
        feed: Arc<dyn SensorFeed>,
        filter: Arc<IngestionFilter>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            feed,
            filter,
            identity,
        }
    }

    /// Check authorization and register the position callback
    #[instrument(name = "feed_subscription_start", skip(self))]
    pub fn start(&self) -> Result<()> {
        self.feed
            .authorization()
            .check()
            .map_err(IngestionError::FeedUnavailable)?;

        let identity = self.identity.identity();
        let filter = Arc::clone(&self.filter);

        self.feed.subscribe(Arc::new(move |raw| {
            filter.offer(LocationSample::from_raw(&raw, &identity));
        }));

        info!("sensor feed subscribed");
        Ok(())
    }

    /// Cancel the feed subscription; no-op when not subscribed
    pub fn stop(&self) {
        if self.feed.is_subscribed() {
            self.feed.cancel();
            debug!("sensor feed unsubscribed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.feed.is_subscribed()
    }

    pub fn feed(&self) -> &Arc<dyn SensorFeed> {
        &self.feed
    }

    pub fn filter(&self) -> &Arc<IngestionFilter> {
        &self.filter
    }
}
