use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::assembler::{assemble_cluster, AssemblyResult};
use crate::clock::Clock;
use crate::clustering::{dbscan, features_of, group_by_label, time_buckets, StandardScaler, Scaler};
use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::geo::parse_coordinate;
use crate::notify::{NotificationKind, Notifier};
use crate::pending::PendingRequest;
use crate::retry::{RequestKind, RetryKey, RetryQueue};
use crate::store::{Database, RequestStore};

/// Wires the components of §2's dataflow together: fetch pending requests,
/// parse coordinates, cluster, select a driver and assemble a trip per
/// cluster, retrying whatever didn't make it this round.
pub struct Engine<Db: Database> {
    db: Db,
    config: Config,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    retry: RetryQueue,
    scaler: Arc<dyn Scaler>,
}

impl<Db: Database> Engine<Db> {
    pub fn new(
        db: Db,
        config: Config,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_scaler(db, config, clock, notifier, Arc::new(StandardScaler))
    }

    /// §9's "scaled feature clustering" design note: lets tests inject a
    /// deterministic `IdentityScaler` instead of `StandardScaler`.
    pub fn with_scaler(
        db: Db,
        config: Config,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        scaler: Arc<dyn Scaler>,
    ) -> Self {
        let retry = RetryQueue::new(config.retry_cooldown_minutes);
        Self {
            db,
            config,
            clock,
            notifier,
            retry,
            scaler,
        }
    }

    pub fn retry_queue_len(&self) -> usize {
        self.retry.len()
    }

    /// Runs exactly one dispatch round: component I invoking C, A, E, F, B,
    /// G, H in order. Returns `Err` only for conditions that should abort
    /// the whole round (`STORE_TRANSIENT`); every other failure is isolated
    /// to its cluster and logged.
    pub async fn run_round(&self) -> Result<()> {
        let now = self.clock.now();
        let mut auto = self.db.auto();

        let passenger_requests = auto.list_pending_passenger_requests().await?;
        let delivery_requests = auto.list_pending_delivery_requests().await?;

        let mut pending = Vec::new();
        for request in passenger_requests {
            match (parse_coordinate(&request.from), parse_coordinate(&request.to)) {
                (Some(from), Some(to)) => {
                    pending.push(PendingRequest::Passenger { request, from, to })
                }
                _ => {
                    log::warn!(
                        "invalid coordinates on passenger request {}",
                        request.id.raw()
                    );
                    self.retry.enqueue(
                        RetryKey {
                            kind: RequestKind::Passenger,
                            id: request.id.raw(),
                        },
                        now,
                    );
                }
            }
        }
        for request in delivery_requests {
            match (parse_coordinate(&request.from), parse_coordinate(&request.to)) {
                (Some(from), Some(to)) => {
                    pending.push(PendingRequest::Delivery { request, from, to })
                }
                _ => {
                    log::warn!(
                        "invalid coordinates on delivery request {}",
                        request.id.raw()
                    );
                    self.retry.enqueue(
                        RetryKey {
                            kind: RequestKind::Delivery,
                            id: request.id.raw(),
                        },
                        now,
                    );
                }
            }
        }

        if pending.is_empty() {
            log::debug!("round at {now}: nothing pending");
            return Ok(());
        }

        log::info!("round at {now}: {} pending requests", pending.len());

        for (cluster, emit_waiting) in self.cluster(pending, now) {
            self.process_cluster(&cluster, now, emit_waiting).await?;
        }

        Ok(())
    }

    /// Component E. Returns clusters paired with whether a below-threshold
    /// "waiting" notification applies to every member (§4.E step 4).
    fn cluster(
        &self,
        pending: Vec<PendingRequest>,
        now: DateTime<Utc>,
    ) -> Vec<(Vec<PendingRequest>, bool)> {
        // §10.F: a minimum of two points before the "too few to cluster"
        // singleton path applies, regardless of how small `min_cluster_size` is.
        let required = self.config.min_cluster_size.max(2);

        if pending.len() < required {
            return pending.into_iter().map(|r| (vec![r], true)).collect();
        }

        let features: Vec<_> = pending.iter().map(features_of).collect();
        let scaled = self.scaler.fit_transform(&features);
        let labels = dbscan(&scaled, self.config.dbscan_eps, self.config.dbscan_min_samples);
        let groups = group_by_label(&labels);

        if groups.is_empty() {
            // Only noise, but enough points existed to try: singleton
            // process without the waiting notification.
            return pending.into_iter().map(|r| (vec![r], false)).collect();
        }

        let mut result = Vec::new();
        for group in groups {
            let departure_minutes = |idx: usize| -> f64 {
                match &pending[idx] {
                    PendingRequest::Passenger { request, .. } => {
                        (request.departure_time - now).num_seconds() as f64 / 60.0
                    }
                    PendingRequest::Delivery { .. } => 0.0,
                }
            };
            for bucket in time_buckets(&group, departure_minutes, now) {
                let members = bucket.into_iter().map(|idx| pending[idx].clone()).collect();
                result.push((members, false));
            }
        }
        result
    }

    async fn process_cluster(
        &self,
        cluster: &[PendingRequest],
        now: DateTime<Utc>,
        emit_waiting: bool,
    ) -> Result<()> {
        match assemble_cluster(&self.db, &self.config, now, cluster).await {
            Ok(AssemblyResult::Assembled {
                trip,
                notifications,
                retry,
            }) => {
                log::info!(
                    "trip {} assembled for cluster of {} items",
                    trip.id.raw(),
                    cluster.len()
                );
                for item in retry {
                    self.retry.enqueue(
                        RetryKey {
                            kind: item.kind,
                            id: item.id,
                        },
                        now,
                    );
                }
                for notification in notifications {
                    self.notifier
                        .enqueue(&notification.user_ref, notification.kind, notification.payload)
                        .await;
                }
                if emit_waiting {
                    self.notify_waiting(cluster).await;
                }
                Ok(())
            }
            Ok(AssemblyResult::NoDriver) => {
                log::warn!("no available driver for cluster of {} items", cluster.len());
                self.retry_all(cluster, now);
                if emit_waiting {
                    self.notify_waiting(cluster).await;
                }
                Ok(())
            }
            Ok(AssemblyResult::ReservationConflict) => {
                log::warn!(
                    "driver reservation conflict, retrying cluster of {} items",
                    cluster.len()
                );
                self.retry_all(cluster, now);
                Ok(())
            }
            Err(DispatchError::StoreTransient(why)) => {
                log::error!("store transient error, aborting round: {why}");
                Err(DispatchError::StoreTransient(why))
            }
            Err(other) => {
                log::warn!("cluster of {} items dropped: {other}", cluster.len());
                self.retry_all(cluster, now);
                Ok(())
            }
        }
    }

    fn retry_all(&self, cluster: &[PendingRequest], now: DateTime<Utc>) {
        for request in cluster {
            let (kind, id) = match request {
                PendingRequest::Passenger { request, .. } => {
                    (RequestKind::Passenger, request.id.raw())
                }
                PendingRequest::Delivery { request, .. } => {
                    (RequestKind::Delivery, request.id.raw())
                }
            };
            self.retry.enqueue(RetryKey { kind, id }, now);
        }
    }

    async fn notify_waiting(&self, cluster: &[PendingRequest]) {
        for request in cluster {
            let user_ref = match request {
                PendingRequest::Passenger { request, .. } => request.requester_ref.clone(),
                PendingRequest::Delivery { request, .. } => request.sender_ref.clone(),
            };
            self.notifier
                .enqueue(&user_ref, NotificationKind::RetryWaiting, json!({}))
                .await;
        }
    }
}
