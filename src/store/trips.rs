use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{KeyValueStore, LoadFailure, TRIPS_KEY, read_json, write_json};
use crate::core::filter::{TripFilter, filter_trips};
use crate::core::trip::{Activity, Trip};
use crate::error::StoreError;

/// Whether a flag operation actually flipped anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Changed,
    Unchanged,
}

/// Owns the trip collection. Every successful mutation is written through to
/// the `trips` slot; a failed write rolls the collection back.
pub struct TripStore {
    kv: Arc<dyn KeyValueStore>,
    trips: Vec<Trip>,
    editing: Option<Uuid>,
}

impl TripStore {
    /// Restore the collection from `kv`. Never fails: a missing or unreadable
    /// slot starts an empty store.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let trips = match read_json::<Vec<Trip>>(kv.as_ref(), TRIPS_KEY) {
            Ok(trips) => {
                log::info!("Loaded {} trips", trips.len());
                trips
            }
            Err(LoadFailure::Missing) => {
                log::debug!("No saved trips, starting empty");
                Vec::new()
            }
            Err(LoadFailure::Unreadable(e)) => {
                log::error!("Failed to read trips, starting empty: {}", e);
                Vec::new()
            }
            Err(LoadFailure::Corrupt(e)) => {
                log::error!("Failed to decode trips, starting empty: {}", e);
                Vec::new()
            }
        };
        Self {
            kv,
            trips,
            editing: None,
        }
    }

    /// Trips in insertion order.
    pub fn list(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == id)
    }

    pub fn filtered(&self, filter: TripFilter, query: &str) -> Vec<&Trip> {
        filter_trips(&self.trips, filter, query)
    }

    pub fn add(&mut self, trip: Trip) -> Result<(), StoreError> {
        if self.get(trip.id).is_some() {
            return Err(StoreError::DuplicateId(trip.id));
        }
        check_dates(&trip)?;

        let snapshot = self.trips.clone();
        log::info!("Adding trip {} ({})", trip.id, trip.title);
        self.trips.push(trip);
        self.persist(snapshot)
    }

    /// Replace a trip wholesale, matched by id.
    pub fn update(&mut self, trip: Trip) -> Result<(), StoreError> {
        let index = self.index_of(trip.id)?;
        check_dates(&trip)?;

        let snapshot = self.trips.clone();
        self.trips[index] = trip;
        self.persist(snapshot)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Trip, StoreError> {
        let index = self.index_of(id)?;

        let snapshot = self.trips.clone();
        let removed = self.trips.remove(index);
        self.persist(snapshot)?;

        if self.editing == Some(id) {
            self.editing = None;
        }
        log::info!("Deleted trip {} ({})", removed.id, removed.title);
        Ok(removed)
    }

    pub fn archive(&mut self, id: Uuid) -> Result<Change, StoreError> {
        self.set_archived(id, true)
    }

    pub fn unarchive(&mut self, id: Uuid) -> Result<Change, StoreError> {
        self.set_archived(id, false)
    }

    fn set_archived(&mut self, id: Uuid, archived: bool) -> Result<Change, StoreError> {
        let index = self.index_of(id)?;
        if self.trips[index].is_archived == archived {
            return Ok(Change::Unchanged);
        }

        let snapshot = self.trips.clone();
        self.trips[index].is_archived = archived;
        self.persist(snapshot)?;
        Ok(Change::Changed)
    }

    /// Move a trip by a signed number of days, keeping its length.
    pub fn postpone(&mut self, id: Uuid, days: i64) -> Result<&Trip, StoreError> {
        let index = self.index_of(id)?;

        let snapshot = self.trips.clone();
        if !self.trips[index].shift_dates(days) {
            return Err(StoreError::DateOutOfRange);
        }
        self.persist(snapshot)?;

        let trip = &self.trips[index];
        log::debug!(
            "Postponed trip {} by {} days to {}..{}",
            trip.id,
            days,
            trip.start_date,
            trip.end_date
        );
        Ok(trip)
    }

    pub fn add_activity(&mut self, trip_id: Uuid, activity: Activity) -> Result<(), StoreError> {
        let index = self.index_of(trip_id)?;
        if self.trips[index].activity(activity.id).is_some() {
            return Err(StoreError::DuplicateId(activity.id));
        }

        let snapshot = self.trips.clone();
        self.trips[index].activities.push(activity);
        self.persist(snapshot)
    }

    pub fn remove_activity(
        &mut self,
        trip_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Activity, StoreError> {
        let index = self.index_of(trip_id)?;
        let position = self.activity_position(index, activity_id)?;

        let snapshot = self.trips.clone();
        let removed = self.trips[index].activities.remove(position);
        self.persist(snapshot)?;
        Ok(removed)
    }

    pub fn replace_activity(&mut self, trip_id: Uuid, activity: Activity) -> Result<(), StoreError> {
        let index = self.index_of(trip_id)?;
        let position = self.activity_position(index, activity.id)?;

        let snapshot = self.trips.clone();
        self.trips[index].activities[position] = activity;
        self.persist(snapshot)
    }

    /// Select a trip for the edit form. Not persisted.
    pub fn edit(&mut self, id: Uuid) -> Result<(), StoreError> {
        self.index_of(id)?;
        self.editing = Some(id);
        Ok(())
    }

    pub fn editing(&self) -> Option<&Trip> {
        self.editing.and_then(|id| self.get(id))
    }

    pub fn finish_editing(&mut self) {
        self.editing = None;
    }

    fn index_of(&self, id: Uuid) -> Result<usize, StoreError> {
        self.trips
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn activity_position(&self, index: usize, activity_id: Uuid) -> Result<usize, StoreError> {
        let trip = &self.trips[index];
        trip.activities
            .iter()
            .position(|a| a.id == activity_id)
            .ok_or(StoreError::ActivityNotFound {
                trip: trip.id,
                activity: activity_id,
            })
    }

    fn persist(&mut self, snapshot: Vec<Trip>) -> Result<(), StoreError> {
        if let Err(e) = write_json(self.kv.as_ref(), TRIPS_KEY, &self.trips) {
            log::error!("Failed to save trips, reverting change: {}", e);
            self.trips = snapshot;
            return Err(e.into());
        }
        Ok(())
    }
}

fn check_dates(trip: &Trip) -> Result<(), StoreError> {
    if trip.has_valid_dates() {
        Ok(())
    } else {
        Err(StoreError::InvalidDates {
            start: trip.start_date,
            end: trip.end_date,
        })
    }
}

/// A `TripStore` behind a mutex for callers on more than one thread. Each call
/// holds the lock across the mutation and its write, so mutations apply in
/// the order the lock is taken.
#[derive(Clone)]
pub struct SharedTripStore {
    inner: Arc<Mutex<TripStore>>,
}

impl SharedTripStore {
    pub fn new(store: TripStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TripStore> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut TripStore) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn list(&self) -> Vec<Trip> {
        self.lock().list().to_vec()
    }

    pub fn filtered(&self, filter: TripFilter, query: &str) -> Vec<Trip> {
        self.lock()
            .filtered(filter, query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn add(&self, trip: Trip) -> Result<(), StoreError> {
        self.lock().add(trip)
    }

    pub fn update(&self, trip: Trip) -> Result<(), StoreError> {
        self.lock().update(trip)
    }

    pub fn delete(&self, id: Uuid) -> Result<Trip, StoreError> {
        self.lock().delete(id)
    }

    pub fn archive(&self, id: Uuid) -> Result<Change, StoreError> {
        self.lock().archive(id)
    }

    pub fn unarchive(&self, id: Uuid) -> Result<Change, StoreError> {
        self.lock().unarchive(id)
    }

    pub fn postpone(&self, id: Uuid, days: i64) -> Result<Trip, StoreError> {
        self.lock().postpone(id, days).cloned()
    }
}
