//! Exchange engine: two-sided resource barter between centers.
//!
//! Orchestrates one exchange end to end:
//!
//! ```text
//! Request → lock both centers → load → validate → points/exemption
//!         → mutate inventories → persist both + ledger → notify
//! ```
//!
//! The load→validate→mutate→persist sequence for a given center id is a
//! critical section: a per-id async lock registry serializes concurrent
//! exchanges touching the same center, closing the lost-update race of a
//! plain read-modify-write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use troca_domain::{total_points, CenterId, CommunityCenter, ExchangeRecord, Resource};
use troca_store::Store;

use crate::error::{EngineError, EngineResult};
use crate::notifier::NotifierPort;

// =============================================================================
// Exchange Request
// =============================================================================

/// One two-sided exchange proposal.
///
/// Both offer lists must be non-empty with strictly positive quantities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// First center
    pub center_one_id: CenterId,
    /// Second center
    pub center_two_id: CenterId,
    /// Resources center one gives up
    pub offered_by_center_one: Vec<Resource>,
    /// Resources center two gives up
    pub offered_by_center_two: Vec<Resource>,
}

// =============================================================================
// Per-center lock registry
// =============================================================================

/// Async locks keyed by center id.
///
/// Lock entries are created on first use and kept for the lifetime of
/// the engine; the guarded sections are short (one exchange).
struct CenterLocks {
    locks: StdMutex<HashMap<CenterId, Arc<Mutex<()>>>>,
}

impl CenterLocks {
    fn new() -> Self {
        Self { locks: StdMutex::new(HashMap::new()) }
    }

    fn lock_for(&self, id: CenterId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

// =============================================================================
// Exchange Engine
// =============================================================================

/// Orchestrates exchanges and occupation updates over the store and
/// notifier collaborators.
pub struct ExchangeEngine<S: Store, N: NotifierPort> {
    /// Persistence for centers and the exchange ledger
    store: Arc<S>,
    /// Alert delivery (fire-and-forget)
    notifier: Arc<N>,
    /// Per-center-id critical sections
    locks: CenterLocks,
}

impl<S: Store, N: NotifierPort> ExchangeEngine<S, N> {
    /// Create a new engine.
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier, locks: CenterLocks::new() }
    }

    /// Execute a two-sided exchange.
    ///
    /// Validation is all-or-nothing: no center is mutated or persisted
    /// unless every check passes for both sides. On success both centers
    /// are saved, a ledger record is appended, and it is returned.
    ///
    /// # Errors
    ///
    /// - `InvalidExchange`: same center on both sides, empty offer list,
    ///   or a non-positive offered quantity
    /// - `CenterNotFound`: either id unresolvable
    /// - `InsufficientResources`: an offer exceeds the offering center's
    ///   inventory
    /// - `UnbalancedExchange`: point totals differ and neither center is
    ///   at high occupancy
    /// - `Store`: persistence failure (propagated, not retried)
    pub async fn exchange(&self, request: ExchangeRequest) -> EngineResult<ExchangeRecord> {
        if request.center_one_id == request.center_two_id {
            return Err(EngineError::InvalidExchange(
                "Cannot exchange resources with the same community center".to_string(),
            ));
        }

        // Serialize on both centers, always in sorted id order so two
        // concurrent exchanges over the same pair cannot deadlock.
        let (first, second) = if request.center_one_id < request.center_two_id {
            (request.center_one_id, request.center_two_id)
        } else {
            (request.center_two_id, request.center_one_id)
        };
        let lock_first = self.locks.lock_for(first);
        let lock_second = self.locks.lock_for(second);
        let _guard_first = lock_first.lock().await;
        let _guard_second = lock_second.lock().await;

        let mut center_one = self.load_center(request.center_one_id).await?;
        let mut center_two = self.load_center(request.center_two_id).await?;

        let offered_by_one = normalize_offers(&request.offered_by_center_one)?;
        let offered_by_two = normalize_offers(&request.offered_by_center_two)?;

        // Sufficiency and receive-side headroom against the
        // pre-mutation snapshots of both sides.
        check_sufficiency(&center_one, &offered_by_one)?;
        check_sufficiency(&center_two, &offered_by_two)?;
        check_receive_headroom(&center_one, &offered_by_two)?;
        check_receive_headroom(&center_two, &offered_by_one)?;

        let points_one = total_points(&offered_by_one);
        let points_two = total_points(&offered_by_two);

        let exemption_applied = center_one.is_high_occupancy() || center_two.is_high_occupancy();

        if !exemption_applied && points_one != points_two {
            return Err(EngineError::UnbalancedExchange {
                points_center_one: points_one,
                points_center_two: points_two,
            });
        }

        debug!(
            center_one = %center_one.id,
            center_two = %center_two.id,
            points_one,
            points_two,
            exemption_applied,
            "Exchange validated, applying mutation"
        );

        // Each side loses its own offer and gains the counterpart's.
        center_one.apply_exchange(&offered_by_one, &offered_by_two);
        center_two.apply_exchange(&offered_by_two, &offered_by_one);

        let record = ExchangeRecord::new(
            center_one.id,
            center_two.id,
            offered_by_one,
            offered_by_two,
            exemption_applied,
        );

        // Both saves plus the ledger append form one consistent outcome:
        // bracket them with the store's transaction hooks and roll back
        // on any failure.
        self.store.begin_transaction().await?;
        let record = match self.persist_exchange(&center_one, &center_two, &record).await {
            Ok(record) => {
                self.store.commit().await?;
                record
            },
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback().await {
                    error!(error = %rollback_err, "Rollback failed after exchange persistence error");
                }
                return Err(e);
            },
        };

        info!(
            record_id = %record.id,
            center_one = %center_one.id,
            center_two = %center_two.id,
            points_exchanged = record.points_exchanged,
            exemption_applied,
            "Exchange completed"
        );

        if exemption_applied {
            self.notify_exemption(&center_one, points_one, points_two, &center_two.name).await;
            self.notify_exemption(&center_two, points_two, points_one, &center_one.name).await;
        }

        Ok(record)
    }

    /// Update a center's occupation, alerting on thresholds.
    ///
    /// Best-effort alerts: a capacity alert when occupation reaches a
    /// defined capacity, otherwise a high-occupancy warning at >= 90%.
    /// Notification failure never fails the update.
    ///
    /// # Errors
    ///
    /// - `CenterNotFound` when the id is unresolvable
    /// - `Domain` when the new occupation exceeds a defined capacity
    /// - `Store` on persistence failure
    pub async fn update_occupation(
        &self,
        center_id: CenterId,
        new_occupation: u32,
    ) -> EngineResult<CommunityCenter> {
        let lock = self.locks.lock_for(center_id);
        let _guard = lock.lock().await;

        let mut center = self.load_center(center_id).await?;
        center.set_occupation(new_occupation)?;

        let updated = self.store.centers().save(&center).await?;

        if updated.is_at_capacity() {
            // Capacity defined when is_at_capacity holds
            let capacity = updated.max_capacity.unwrap_or(0);
            if let Err(e) = self
                .notifier
                .notify_capacity_reached(updated.id, &updated.name, capacity)
                .await
            {
                error!(center_id = %updated.id, error = %e, "Capacity alert delivery failed");
            }
        } else if updated.is_high_occupancy() {
            let capacity = updated.max_capacity.unwrap_or(0);
            warn!(
                center_id = %updated.id,
                occupation = updated.current_occupation,
                capacity,
                "Center crossed high-occupancy threshold"
            );
            if let Err(e) = self
                .notifier
                .notify_high_occupancy(
                    updated.id,
                    &updated.name,
                    updated.current_occupation,
                    capacity,
                )
                .await
            {
                error!(center_id = %updated.id, error = %e, "High-occupancy warning delivery failed");
            }
        }

        Ok(updated)
    }

    /// Load a center or fail with `CenterNotFound`.
    async fn load_center(&self, id: CenterId) -> EngineResult<CommunityCenter> {
        self.store
            .centers()
            .find_by_id(id)
            .await?
            .ok_or(EngineError::CenterNotFound(id))
    }

    /// Save both mutated centers and append the ledger record.
    async fn persist_exchange(
        &self,
        center_one: &CommunityCenter,
        center_two: &CommunityCenter,
        record: &ExchangeRecord,
    ) -> EngineResult<ExchangeRecord> {
        self.store.centers().save(center_one).await?;
        self.store.centers().save(center_two).await?;
        let stored = self.store.ledger().append(record).await?;
        Ok(stored)
    }

    /// Notify one side of an exemption, if that side is high-occupancy.
    async fn notify_exemption(
        &self,
        center: &CommunityCenter,
        points_offered: u64,
        points_received: u64,
        other_center_name: &str,
    ) {
        if !center.is_high_occupancy() {
            return;
        }
        if let Err(e) = self
            .notifier
            .notify_exemption_used(
                center.id,
                &center.name,
                points_offered,
                points_received,
                other_center_name,
            )
            .await
        {
            error!(center_id = %center.id, error = %e, "Exemption notification delivery failed");
        }
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

/// Validate an offer list and coalesce duplicate types.
///
/// The list must be non-empty and every quantity strictly positive.
/// Duplicates are merged before sufficiency checks so two entries of the
/// same type cannot each pass individually while jointly overdrawing.
/// A merged quantity exceeding `u32::MAX` is rejected rather than
/// wrapped; no inventory can cover it anyway.
fn normalize_offers(offers: &[Resource]) -> EngineResult<Vec<Resource>> {
    if offers.is_empty() {
        return Err(EngineError::InvalidExchange("Offer list cannot be empty".to_string()));
    }

    let mut merged: Vec<Resource> = Vec::with_capacity(offers.len());
    for offer in offers {
        if offer.quantity == 0 {
            return Err(EngineError::InvalidExchange(format!(
                "Offered quantity must be positive for {}",
                offer.resource_type
            )));
        }
        match merged.iter_mut().find(|m| m.resource_type == offer.resource_type) {
            Some(existing) => {
                existing.quantity =
                    existing.quantity.checked_add(offer.quantity).ok_or_else(|| {
                        EngineError::InvalidExchange(format!(
                            "Total offered quantity overflows for {}",
                            offer.resource_type
                        ))
                    })?;
            },
            None => merged.push(*offer),
        }
    }
    Ok(merged)
}

/// Check the offering center holds every offered quantity.
///
/// Runs against the pre-mutation snapshot; must not see partial effects
/// of the pending mutation.
fn check_sufficiency(center: &CommunityCenter, offered: &[Resource]) -> EngineResult<()> {
    for offer in offered {
        let available = center.quantity_of(offer.resource_type);
        if available < offer.quantity {
            return Err(EngineError::InsufficientResources {
                center: center.name.clone(),
                resource_type: offer.resource_type,
                required: offer.quantity,
                available,
            });
        }
    }
    Ok(())
}

/// Check the receiving center's inventory can absorb every incoming
/// quantity without exceeding `u32::MAX` per type.
///
/// Keeps the increment in `apply_exchange` from saturating: like
/// sufficiency, it runs against the pre-mutation snapshot so a failing
/// request leaves both inventories untouched.
fn check_receive_headroom(center: &CommunityCenter, incoming: &[Resource]) -> EngineResult<()> {
    for entry in incoming {
        let held = center.quantity_of(entry.resource_type);
        if held.checked_add(entry.quantity).is_none() {
            return Err(EngineError::InvalidExchange(format!(
                "Center {} cannot hold the received quantity of {}",
                center.name, entry.resource_type
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
