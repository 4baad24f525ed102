use serde::{Deserialize, Serialize};

use super::domain::{BedAssignment, BedLetter, Room, RoomNumber, StudentId, Wing};

/// Storage-level filter. Rooms are always returned in ascending room order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomQuery {
    pub bookable_only: bool,
    pub wing: Option<Wing>,
    pub floor: Option<u16>,
    pub has_ac: Option<bool>,
    pub min_rent: Option<u32>,
    pub max_rent: Option<u32>,
}

impl RoomQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, room: &Room) -> bool {
        if self.bookable_only && !room.status().is_bookable() {
            return false;
        }
        if self.wing.is_some_and(|wing| wing != room.wing) {
            return false;
        }
        if self.floor.is_some_and(|floor| floor != room.floor) {
            return false;
        }
        if self
            .has_ac
            .is_some_and(|has_ac| has_ac != room.facilities.has_ac)
        {
            return false;
        }
        if self.min_rent.is_some_and(|min| room.rent < min) {
            return false;
        }
        if self.max_rent.is_some_and(|max| room.rent > max) {
            return false;
        }
        true
    }
}

/// Storage abstraction over the room collection.
///
/// `replace` is a conditional write: it succeeds only when the stored revision still
/// equals `expected_revision`. It must refuse a room that seats one student in two
/// beds, and a student whose indexed bed is anywhere other than the bed they hold in
/// the written room. The checks and the write happen atomically with respect to other
/// writers.
pub trait RoomRepository: Send + Sync {
    fn count(&self) -> Result<usize, RepositoryError>;
    /// All-or-nothing bulk insert. Fails with `Conflict` if any room already exists.
    fn insert_many(&self, rooms: Vec<Room>) -> Result<usize, RepositoryError>;
    fn fetch(&self, room_number: RoomNumber) -> Result<Option<Room>, RepositoryError>;
    fn find(&self, query: &RoomQuery) -> Result<Vec<Room>, RepositoryError>;
    fn replace(&self, room: Room, expected_revision: u64) -> Result<Room, RepositoryError>;
    fn locate_student(&self, student: &StudentId)
        -> Result<Option<BedAssignment>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("room {room_number} changed since revision {expected}")]
    StaleRevision {
        room_number: RoomNumber,
        expected: u64,
    },
    #[error("student {student} already occupies {existing}")]
    DuplicateOccupant {
        student: StudentId,
        existing: BedAssignment,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for allocation side effects (e-mail, admin dashboards).
pub trait AllocationNotifier: Send + Sync {
    fn notify(&self, notice: AllocationNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationNotice {
    pub template: String,
    pub student_id: StudentId,
    pub room_number: RoomNumber,
    pub bed_letter: BedLetter,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
