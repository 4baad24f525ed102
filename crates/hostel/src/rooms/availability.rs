use serde::{Deserialize, Serialize};

use super::domain::{BedLetter, Room, RoomView, Wing};
use super::repository::RoomQuery;

/// Optional filters accepted by the availability listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityFilter {
    #[serde(default)]
    pub wing: Option<Wing>,
    #[serde(default)]
    pub floor: Option<u16>,
    #[serde(default)]
    pub has_ac: Option<bool>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(default)]
    pub min: Option<u32>,
    #[serde(default)]
    pub max: Option<u32>,
}

impl AvailabilityFilter {
    pub(crate) fn to_query(&self) -> Result<RoomQuery, InvalidFilter> {
        if self.floor == Some(0) {
            return Err(InvalidFilter::Floor);
        }

        let range = self.price_range.unwrap_or_default();
        if let (Some(min), Some(max)) = (range.min, range.max) {
            if min > max {
                return Err(InvalidFilter::PriceRange { min, max });
            }
        }

        Ok(RoomQuery {
            bookable_only: true,
            wing: self.wing,
            floor: self.floor,
            has_ac: self.has_ac,
            min_rent: range.min,
            max_rent: range.max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFilter {
    #[error("floor filter must be 1 or greater")]
    Floor,
    #[error("price range minimum {min} exceeds maximum {max}")]
    PriceRange { min: u32, max: u32 },
}

/// Room listing entry enriched with free bed letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: RoomView,
    pub available_beds: Vec<BedLetter>,
    pub occupied_count: usize,
}

impl RoomSummary {
    pub fn from_room(room: &Room) -> Self {
        Self {
            room: room.view(),
            available_beds: room.beds.free_letters(),
            occupied_count: room.occupied_count(),
        }
    }
}

/// Keeps rooms with at least one free bed, preserving input order.
pub(crate) fn summarize_open_rooms(rooms: &[Room]) -> Vec<RoomSummary> {
    rooms
        .iter()
        .filter(|room| room.has_free_bed())
        .map(RoomSummary::from_room)
        .collect()
}
