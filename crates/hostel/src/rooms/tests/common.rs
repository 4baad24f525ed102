use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::rooms::domain::{BedAssignment, BedLetter, Room, RoomNumber, StudentId};
use crate::rooms::layout::InventoryLayout;
use crate::rooms::memory::InMemoryRoomRepository;
use crate::rooms::repository::{
    AllocationNotice, AllocationNotifier, NotifyError, RepositoryError, RoomQuery,
    RoomRepository,
};
use crate::rooms::service::{AllocationSettings, RoomService};
use crate::rooms::room_router;

pub(super) fn settings(total_rooms: u16) -> AllocationSettings {
    AllocationSettings {
        layout: InventoryLayout::new(total_rooms).expect("non-empty layout"),
        max_write_attempts: 8,
    }
}

pub(super) fn room(value: u16) -> RoomNumber {
    RoomNumber::new(value).expect("valid room number")
}

pub(super) fn student(raw: &str) -> StudentId {
    StudentId(raw.to_string())
}

pub(super) type TestService = RoomService<InMemoryRoomRepository, MemoryNotifier>;

/// Initialized service over an in-memory store with `total_rooms` rooms.
pub(super) fn build_service(
    total_rooms: u16,
) -> (TestService, Arc<InMemoryRoomRepository>, Arc<MemoryNotifier>) {
    let repository = Arc::new(InMemoryRoomRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = RoomService::new(repository.clone(), notifier.clone(), settings(total_rooms));
    service.initialize().expect("inventory initializes");
    (service, repository, notifier)
}

pub(super) fn fetch_room(repository: &InMemoryRoomRepository, value: u16) -> Room {
    repository
        .fetch(room(value))
        .expect("fetch succeeds")
        .expect("room present")
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<AllocationNotice>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<AllocationNotice> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl AllocationNotifier for MemoryNotifier {
    fn notify(&self, notice: AllocationNotice) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl AllocationNotifier for OfflineNotifier {
    fn notify(&self, _notice: AllocationNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("smtp relay offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl RoomRepository for UnavailableRepository {
    fn count(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_many(&self, _rooms: Vec<Room>) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _room_number: RoomNumber) -> Result<Option<Room>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find(&self, _query: &RoomQuery) -> Result<Vec<Room>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace(&self, _room: Room, _expected_revision: u64) -> Result<Room, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn locate_student(
        &self,
        _student: &StudentId,
    ) -> Result<Option<BedAssignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Repository whose every conditional write loses to a concurrent writer.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: InMemoryRoomRepository,
}

impl RoomRepository for RacingRepository {
    fn count(&self) -> Result<usize, RepositoryError> {
        self.inner.count()
    }

    fn insert_many(&self, rooms: Vec<Room>) -> Result<usize, RepositoryError> {
        self.inner.insert_many(rooms)
    }

    fn fetch(&self, room_number: RoomNumber) -> Result<Option<Room>, RepositoryError> {
        self.inner.fetch(room_number)
    }

    fn find(&self, query: &RoomQuery) -> Result<Vec<Room>, RepositoryError> {
        self.inner.find(query)
    }

    fn replace(&self, room: Room, expected_revision: u64) -> Result<Room, RepositoryError> {
        Err(RepositoryError::StaleRevision {
            room_number: room.room_number,
            expected: expected_revision,
        })
    }

    fn locate_student(
        &self,
        student: &StudentId,
    ) -> Result<Option<BedAssignment>, RepositoryError> {
        self.inner.locate_student(student)
    }
}

/// Repository that lets another writer seat a student in a room right before the
/// service's first read of that room.
#[derive(Default)]
pub(super) struct InterleavingRepository {
    pub(super) inner: InMemoryRoomRepository,
    pending: Mutex<Option<(StudentId, BedLetter)>>,
}

impl InterleavingRepository {
    pub(super) fn seat_before_next_fetch(&self, student: StudentId, bed: BedLetter) {
        *self.pending.lock().expect("pending mutex poisoned") = Some((student, bed));
    }
}

impl RoomRepository for InterleavingRepository {
    fn count(&self) -> Result<usize, RepositoryError> {
        self.inner.count()
    }

    fn insert_many(&self, rooms: Vec<Room>) -> Result<usize, RepositoryError> {
        self.inner.insert_many(rooms)
    }

    fn fetch(&self, room_number: RoomNumber) -> Result<Option<Room>, RepositoryError> {
        let pending = self.pending.lock().expect("pending mutex poisoned").take();
        if let Some((student, bed)) = pending {
            let mut room = self
                .inner
                .fetch(room_number)?
                .ok_or(RepositoryError::NotFound)?;
            let revision = room.revision;
            room.occupy(bed, student).expect("interleaved bed free");
            self.inner.replace(room, revision)?;
        }
        self.inner.fetch(room_number)
    }

    fn find(&self, query: &RoomQuery) -> Result<Vec<Room>, RepositoryError> {
        self.inner.find(query)
    }

    fn replace(&self, room: Room, expected_revision: u64) -> Result<Room, RepositoryError> {
        self.inner.replace(room, expected_revision)
    }

    fn locate_student(
        &self,
        student: &StudentId,
    ) -> Result<Option<BedAssignment>, RepositoryError> {
        self.inner.locate_student(student)
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    room_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
