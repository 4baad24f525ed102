use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::availability::{summarize_open_rooms, AvailabilityFilter, InvalidFilter, RoomSummary};
use super::domain::{
    BedAssignment, BedLetter, BedStateError, Facilities, Room, RoomHold, RoomNumber,
    RoomParseError, RoomStatus, RoomView, StudentId, Wing,
};
use super::layout::InventoryLayout;
use super::recommendation::{RecommendationEngine, RoomPreferences, ScoredRoom};
use super::repository::{
    AllocationNotice, AllocationNotifier, RepositoryError, RoomQuery, RoomRepository,
};
use super::statistics::RoomStatistics;

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 3;

/// Tunables for the allocation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationSettings {
    pub layout: InventoryLayout,
    /// Upper bound on read-validate-write cycles when a room's revision keeps moving.
    pub max_write_attempts: u32,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            layout: InventoryLayout::standard(),
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

/// Service composing the room repository, recommendation engine, and notifier.
pub struct RoomService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    settings: AllocationSettings,
    recommender: RecommendationEngine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitializationOutcome {
    pub created: usize,
    pub already_initialized: bool,
}

/// Confirmation returned to the admission workflow after a bed is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationConfirmation {
    pub student_id: StudentId,
    pub room_number: RoomNumber,
    pub bed_letter: BedLetter,
    pub floor: u16,
    pub wing: Wing,
    pub rent: u32,
    pub facilities: Facilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseConfirmation {
    pub released: bool,
    pub student_id: StudentId,
    pub room_number: RoomNumber,
    pub bed_letter: BedLetter,
    pub room_status: RoomStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentAllocation {
    pub student_id: StudentId,
    pub room_number: RoomNumber,
    pub bed_letter: BedLetter,
    pub floor: u16,
    pub wing: Wing,
    pub rent: u32,
}

impl<R, N> RoomService<R, N>
where
    R: RoomRepository + 'static,
    N: AllocationNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, settings: AllocationSettings) -> Self {
        Self {
            repository,
            notifier,
            settings,
            recommender: RecommendationEngine::new(),
        }
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    /// Seed the inventory once. A populated store is left untouched.
    pub fn initialize(&self) -> Result<InitializationOutcome, RoomServiceError> {
        if self.repository.count()? > 0 {
            return Ok(InitializationOutcome {
                created: 0,
                already_initialized: true,
            });
        }

        match self.repository.insert_many(self.settings.layout.rooms()) {
            Ok(created) => {
                info!(created, "room inventory initialized");
                Ok(InitializationOutcome {
                    created,
                    already_initialized: false,
                })
            }
            // another initializer won the race
            Err(RepositoryError::Conflict) => Ok(InitializationOutcome {
                created: 0,
                already_initialized: true,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Bind a student to a specific bed.
    pub fn assign(
        &self,
        student_id: &StudentId,
        room_number: RoomNumber,
        bed_letter: BedLetter,
    ) -> Result<AllocationConfirmation, RoomServiceError> {
        if let Some(existing) = self.repository.locate_student(student_id)? {
            return Err(AllocationConflict::StudentAlreadyAllocated {
                student: student_id.clone(),
                existing,
            }
            .into());
        }

        let room = self.commit(room_number, |room| {
            if let Some(held) = room.beds.position_of(student_id) {
                return Err(AllocationConflict::StudentAlreadyAllocated {
                    student: student_id.clone(),
                    existing: BedAssignment {
                        room_number,
                        bed_letter: held,
                    },
                }
                .into());
            }
            let status = room.status();
            if !status.is_bookable() {
                return Err(AllocationConflict::RoomUnavailable {
                    room_number,
                    status,
                }
                .into());
            }
            room.occupy(bed_letter, student_id.clone())
                .map_err(|err| bed_conflict(err, room_number, bed_letter, student_id))
        })?;

        info!(
            student = %student_id,
            room = %room_number,
            bed = %bed_letter,
            status = room.status().label(),
            "bed assigned"
        );
        self.publish("bed_assigned", student_id, room_number, bed_letter);

        Ok(AllocationConfirmation {
            student_id: student_id.clone(),
            room_number,
            bed_letter,
            floor: room.floor,
            wing: room.wing,
            rent: room.rent,
            facilities: room.facilities,
        })
    }

    /// Free a bed currently held by `student_id`.
    pub fn release(
        &self,
        student_id: &StudentId,
        room_number: RoomNumber,
        bed_letter: BedLetter,
    ) -> Result<ReleaseConfirmation, RoomServiceError> {
        let room = self.commit(room_number, |room| {
            room.vacate(bed_letter, student_id)
                .map_err(|err| bed_conflict(err, room_number, bed_letter, student_id))
        })?;

        info!(
            student = %student_id,
            room = %room_number,
            bed = %bed_letter,
            status = room.status().label(),
            "bed released"
        );
        self.publish("bed_released", student_id, room_number, bed_letter);

        Ok(ReleaseConfirmation {
            released: true,
            student_id: student_id.clone(),
            room_number,
            bed_letter,
            room_status: room.status(),
        })
    }

    /// Bookable rooms matching `filter` that still have a free bed, in room order.
    pub fn available(
        &self,
        filter: &AvailabilityFilter,
    ) -> Result<Vec<RoomSummary>, RoomServiceError> {
        let query = filter.to_query()?;
        let rooms = self.repository.find(&query)?;
        Ok(summarize_open_rooms(&rooms))
    }

    pub fn recommend(
        &self,
        preferences: &RoomPreferences,
    ) -> Result<Vec<ScoredRoom>, RoomServiceError> {
        if preferences.floor == Some(0) {
            return Err(InvalidFilter::Floor.into());
        }
        let candidates = self.repository.find(&preferences.candidate_query())?;
        Ok(self.recommender.rank(preferences, &candidates))
    }

    pub fn statistics(&self) -> Result<RoomStatistics, RoomServiceError> {
        let rooms = self.repository.find(&RoomQuery::all())?;
        Ok(RoomStatistics::from_rooms(&rooms))
    }

    /// Put a room under maintenance regardless of its occupancy.
    pub fn schedule_maintenance(
        &self,
        room_number: RoomNumber,
        scheduled_for: DateTime<Utc>,
        reason: &str,
    ) -> Result<RoomView, RoomServiceError> {
        let reason = required_reason(reason)?;
        let room = self.commit(room_number, |room| {
            room.hold = Some(RoomHold::Maintenance {
                scheduled_for,
                reason: reason.clone(),
            });
            Ok(())
        })?;

        info!(room = %room_number, %scheduled_for, reason = %reason, "maintenance scheduled");
        Ok(room.view())
    }

    pub fn complete_maintenance(
        &self,
        room_number: RoomNumber,
    ) -> Result<RoomView, RoomServiceError> {
        let room = self.commit(room_number, |room| {
            if !matches!(room.hold, Some(RoomHold::Maintenance { .. })) {
                return Err(AllocationConflict::NotUnderMaintenance { room_number }.into());
            }
            room.hold = None;
            Ok(())
        })?;

        info!(room = %room_number, status = room.status().label(), "maintenance completed");
        Ok(room.view())
    }

    pub fn block(&self, room_number: RoomNumber, reason: &str) -> Result<RoomView, RoomServiceError> {
        let reason = required_reason(reason)?;
        let room = self.commit(room_number, |room| {
            room.hold = Some(RoomHold::Blocked {
                reason: reason.clone(),
            });
            Ok(())
        })?;

        info!(room = %room_number, reason = %reason, "room blocked");
        Ok(room.view())
    }

    pub fn unblock(&self, room_number: RoomNumber) -> Result<RoomView, RoomServiceError> {
        let room = self.commit(room_number, |room| {
            if !matches!(room.hold, Some(RoomHold::Blocked { .. })) {
                return Err(AllocationConflict::NotBlocked { room_number }.into());
            }
            room.hold = None;
            Ok(())
        })?;

        info!(room = %room_number, status = room.status().label(), "room unblocked");
        Ok(room.view())
    }

    pub fn room(&self, room_number: RoomNumber) -> Result<RoomView, RoomServiceError> {
        self.repository
            .fetch(room_number)?
            .map(|room| room.view())
            .ok_or(RoomServiceError::RoomNotFound(room_number))
    }

    pub fn allocation_for(
        &self,
        student_id: &StudentId,
    ) -> Result<StudentAllocation, RoomServiceError> {
        let assignment = self
            .repository
            .locate_student(student_id)?
            .ok_or_else(|| RoomServiceError::AllocationNotFound(student_id.clone()))?;
        let room = self
            .repository
            .fetch(assignment.room_number)?
            .ok_or(RoomServiceError::RoomNotFound(assignment.room_number))?;

        Ok(StudentAllocation {
            student_id: student_id.clone(),
            room_number: room.room_number,
            bed_letter: assignment.bed_letter,
            floor: room.floor,
            wing: room.wing,
            rent: room.rent,
        })
    }

    /// Read, mutate, and conditionally write one room. A moved revision triggers a
    /// fresh read so `apply` re-validates against current state.
    fn commit<F>(&self, room_number: RoomNumber, mut apply: F) -> Result<Room, RoomServiceError>
    where
        F: FnMut(&mut Room) -> Result<(), RoomServiceError>,
    {
        let attempts = self.settings.max_write_attempts.max(1);
        for attempt in 1..=attempts {
            let mut room = self
                .repository
                .fetch(room_number)?
                .ok_or(RoomServiceError::RoomNotFound(room_number))?;
            let expected = room.revision;
            apply(&mut room)?;

            match self.repository.replace(room, expected) {
                Ok(stored) => return Ok(stored),
                Err(RepositoryError::StaleRevision { .. }) => {
                    debug!(room = %room_number, attempt, "room revision moved; retrying");
                }
                Err(RepositoryError::NotFound) => {
                    return Err(RoomServiceError::RoomNotFound(room_number))
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AllocationConflict::Contended {
            room_number,
            attempts,
        }
        .into())
    }

    fn publish(
        &self,
        template: &str,
        student_id: &StudentId,
        room_number: RoomNumber,
        bed_letter: BedLetter,
    ) {
        let notice = AllocationNotice {
            template: template.to_string(),
            student_id: student_id.clone(),
            room_number,
            bed_letter,
        };
        if let Err(err) = self.notifier.notify(notice) {
            warn!(%err, template, student = %student_id, "allocation notice not delivered");
        }
    }
}

fn bed_conflict(
    err: BedStateError,
    room_number: RoomNumber,
    bed_letter: BedLetter,
    student_id: &StudentId,
) -> RoomServiceError {
    match err {
        BedStateError::AlreadyOccupied => AllocationConflict::BedOccupied {
            room_number,
            bed_letter,
        },
        BedStateError::OccupantMismatch => AllocationConflict::AssignmentMismatch {
            room_number,
            bed_letter,
            student: student_id.clone(),
        },
    }
    .into()
}

fn required_reason(reason: &str) -> Result<String, RoomServiceError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(RoomServiceError::InvalidArgument(
            "reason must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// State conflicts surfaced by the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationConflict {
    #[error("bed already occupied: room {room_number} bed {bed_letter}")]
    BedOccupied {
        room_number: RoomNumber,
        bed_letter: BedLetter,
    },
    #[error("assignment mismatch: room {room_number} bed {bed_letter} is not held by {student}")]
    AssignmentMismatch {
        room_number: RoomNumber,
        bed_letter: BedLetter,
        student: StudentId,
    },
    #[error("student already allocated: {student} holds {existing}")]
    StudentAlreadyAllocated {
        student: StudentId,
        existing: BedAssignment,
    },
    #[error("room {room_number} is unavailable ({})", .status.label())]
    RoomUnavailable {
        room_number: RoomNumber,
        status: RoomStatus,
    },
    #[error("room {room_number} is not under maintenance")]
    NotUnderMaintenance { room_number: RoomNumber },
    #[error("room {room_number} is not blocked")]
    NotBlocked { room_number: RoomNumber },
    #[error("room {room_number} contended; gave up after {attempts} attempts")]
    Contended { room_number: RoomNumber, attempts: u32 },
}

/// Coarse classification used to map failures onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Conflict,
    Internal,
}

/// Error raised by the room service.
#[derive(Debug, thiserror::Error)]
pub enum RoomServiceError {
    #[error("room {0} not found")]
    RoomNotFound(RoomNumber),
    #[error("student {0} has no bed allocation")]
    AllocationNotFound(StudentId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Conflict(#[from] AllocationConflict),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl RoomServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomServiceError::RoomNotFound(_) | RoomServiceError::AllocationNotFound(_) => {
                ErrorKind::NotFound
            }
            RoomServiceError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RoomServiceError::Conflict(_) => ErrorKind::Conflict,
            RoomServiceError::Repository(_) => ErrorKind::Internal,
        }
    }
}

impl From<RepositoryError> for RoomServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateOccupant { student, existing } => {
                Self::Conflict(AllocationConflict::StudentAlreadyAllocated { student, existing })
            }
            other => Self::Repository(other),
        }
    }
}

impl From<RoomParseError> for RoomServiceError {
    fn from(value: RoomParseError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<InvalidFilter> for RoomServiceError {
    fn from(value: InvalidFilter) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}
