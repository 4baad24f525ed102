//! Room inventory, bed allocation, and occupancy reporting.
//!
//! The service layer reads current state from a [`RoomRepository`] on every call and
//! writes rooms back with a revision check, so concurrent allocations against the same
//! room serialize without any in-process cache.

pub(crate) mod availability;
pub mod domain;
pub mod layout;
pub mod memory;
pub(crate) mod recommendation;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod statistics;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityFilter, InvalidFilter, PriceRange, RoomSummary};
pub use domain::{
    Bed, BedAssignment, BedLetter, BedView, Beds, Facilities, Room, RoomHold, RoomNumber,
    RoomParseError, RoomStatus, RoomView, StudentId, Wing, BEDS_PER_ROOM,
};
pub use layout::{InventoryLayout, DEFAULT_TOTAL_ROOMS};
pub use memory::InMemoryRoomRepository;
pub use recommendation::{
    RecommendationEngine, RoomPreferences, ScoreComponent, ScoreFactor, ScoredRoom,
    MAX_RECOMMENDATIONS,
};
pub use repository::{
    AllocationNotice, AllocationNotifier, NotifyError, RepositoryError, RoomQuery,
    RoomRepository,
};
pub use router::room_router;
pub use statistics::{FloorBreakdown, RoomStatistics, WingBreakdown};
pub use service::{
    AllocationConfirmation, AllocationConflict, AllocationSettings, ErrorKind,
    InitializationOutcome, ReleaseConfirmation, RoomService, RoomServiceError,
    StudentAllocation, DEFAULT_MAX_WRITE_ATTEMPTS,
};
