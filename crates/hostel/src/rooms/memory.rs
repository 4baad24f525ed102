use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{BedAssignment, BedLetter, Room, RoomNumber, StudentId};
use super::repository::{RepositoryError, RoomQuery, RoomRepository};

/// Process-local room store. One mutex covers both the room documents and the
/// student index so conditional writes see a consistent view of both.
#[derive(Default, Clone)]
pub struct InMemoryRoomRepository {
    store: Arc<Mutex<RoomStore>>,
}

#[derive(Default)]
struct RoomStore {
    rooms: BTreeMap<RoomNumber, Room>,
    students: HashMap<StudentId, BedAssignment>,
}

impl InMemoryRoomRepository {
    fn lock(&self) -> Result<MutexGuard<'_, RoomStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("room store mutex poisoned".to_string()))
    }
}

impl RoomStore {
    fn index_room(&mut self, room: &Room) {
        for (letter, bed) in room.beds.iter() {
            if let Some(student) = &bed.occupant {
                self.students.insert(
                    student.clone(),
                    BedAssignment {
                        room_number: room.room_number,
                        bed_letter: letter,
                    },
                );
            }
        }
    }

    fn unindex_room(&mut self, room: &Room) {
        for student in room.beds.occupants() {
            self.students.remove(student);
        }
    }
}

impl RoomRepository for InMemoryRoomRepository {
    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.rooms.len())
    }

    fn insert_many(&self, rooms: Vec<Room>) -> Result<usize, RepositoryError> {
        let mut store = self.lock()?;
        if rooms
            .iter()
            .any(|room| store.rooms.contains_key(&room.room_number))
        {
            return Err(RepositoryError::Conflict);
        }

        let inserted = rooms.len();
        for room in rooms {
            store.index_room(&room);
            store.rooms.insert(room.room_number, room);
        }
        Ok(inserted)
    }

    fn fetch(&self, room_number: RoomNumber) -> Result<Option<Room>, RepositoryError> {
        Ok(self.lock()?.rooms.get(&room_number).cloned())
    }

    fn find(&self, query: &RoomQuery) -> Result<Vec<Room>, RepositoryError> {
        let store = self.lock()?;
        Ok(store
            .rooms
            .values()
            .filter(|room| query.matches(room))
            .cloned()
            .collect())
    }

    fn replace(&self, mut room: Room, expected_revision: u64) -> Result<Room, RepositoryError> {
        let mut store = self.lock()?;
        let current = store
            .rooms
            .get(&room.room_number)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;

        if current.revision != expected_revision {
            return Err(RepositoryError::StaleRevision {
                room_number: room.room_number,
                expected: expected_revision,
            });
        }

        let mut seated: HashMap<&StudentId, BedLetter> = HashMap::new();
        for (letter, bed) in room.beds.iter() {
            let Some(student) = bed.occupant.as_ref() else {
                continue;
            };
            if let Some(first) = seated.insert(student, letter) {
                return Err(RepositoryError::DuplicateOccupant {
                    student: student.clone(),
                    existing: BedAssignment {
                        room_number: room.room_number,
                        bed_letter: first,
                    },
                });
            }
            if let Some(existing) = store.students.get(student) {
                let same_bed =
                    existing.room_number == room.room_number && existing.bed_letter == letter;
                if !same_bed {
                    return Err(RepositoryError::DuplicateOccupant {
                        student: student.clone(),
                        existing: *existing,
                    });
                }
            }
        }

        room.revision = expected_revision + 1;
        store.unindex_room(&current);
        store.index_room(&room);
        store.rooms.insert(room.room_number, room.clone());
        Ok(room)
    }

    fn locate_student(
        &self,
        student: &StudentId,
    ) -> Result<Option<BedAssignment>, RepositoryError> {
        Ok(self.lock()?.students.get(student).copied())
    }
}
