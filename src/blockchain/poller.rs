//! Connection Status Poller
//!
//! Re-checks the blockchain status on a fixed interval until stopped.
//! Every result is published through [`BlockchainClient::subscribe`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::client::BlockchainClient;

pub struct StatusPoller {
    client: Arc<BlockchainClient>,
    interval: Duration,
    shutdown: watch::Sender<bool>,
}

impl StatusPoller {
    pub fn new(client: Arc<BlockchainClient>, interval: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            client,
            interval,
            shutdown,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. The first check runs immediately.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let poller = self.clone();
        let mut shutdown = self.shutdown.subscribe();
        self.shutdown.send_replace(false);

        tokio::spawn(async move {
            tracing::info!(interval_secs = poller.interval.as_secs(), "Status poller started");

            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                if *shutdown.borrow_and_update() {
                    break;
                }

                tokio::select! {
                    _ = ticker.tick() => {
                        poller.client.check_connection().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Status poller stopped");
        })
    }

    /// Ask the polling task to exit
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }
}
