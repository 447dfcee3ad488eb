use std::collections::{BTreeSet, HashMap};

use crate::{
    error::EngineResult,
    models::{Booking, Platform, Property, Window},
    schemas::SnapshotPayload,
};

/// In-memory view of the booking store and the property catalog.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    bookings: Vec<Booking>,
    properties: Vec<Property>,
    property_index: HashMap<String, usize>,
}

/// Coarse pre-filter the booking store applies before the engine runs.
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    /// Keeps stays `[check_in, check_out)` that touch the inclusive window.
    pub overlap: Option<Window>,
    pub property_ids: Option<BTreeSet<String>>,
    pub platform: Option<Platform>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(window) = self.overlap {
            if !stay_overlaps_window(booking, &window) {
                return false;
            }
        }
        if let Some(ids) = &self.property_ids {
            if !ids.contains(&booking.property_id) {
                return false;
            }
        }
        self.platform
            .map_or(true, |platform| platform == booking.platform)
    }
}

impl Snapshot {
    pub fn new(bookings: Vec<Booking>, properties: Vec<Property>) -> Self {
        let property_index = properties
            .iter()
            .enumerate()
            .map(|(index, property)| (property.id.clone(), index))
            .collect();
        Self {
            bookings,
            properties,
            property_index,
        }
    }

    pub fn from_payload(payload: SnapshotPayload) -> EngineResult<Self> {
        let bookings = payload
            .bookings
            .into_iter()
            .map(Booking::try_from)
            .collect::<EngineResult<Vec<_>>>()?;
        let properties = payload
            .properties
            .into_iter()
            .map(Property::try_from)
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self::new(bookings, properties))
    }

    pub fn from_json(raw: &str) -> EngineResult<Self> {
        let payload: SnapshotPayload = serde_json::from_str(raw)?;
        Self::from_payload(payload)
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, property_id: &str) -> Option<&Property> {
        self.property_index
            .get(property_id)
            .and_then(|index| self.properties.get(*index))
    }

    pub fn property_ids(&self) -> Vec<String> {
        self.properties
            .iter()
            .map(|property| property.id.clone())
            .collect()
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Vec<Booking> {
        self.bookings
            .iter()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect()
    }
}

fn stay_overlaps_window(booking: &Booking, window: &Window) -> bool {
    booking.check_out_date > window.start && booking.check_in_date <= window.end
}
