use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric room identifier. Stored and exchanged as a digit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomNumber(u16);

impl RoomNumber {
    pub fn new(value: u16) -> Result<Self, RoomParseError> {
        if value == 0 {
            return Err(RoomParseError::RoomNumber(value.to_string()));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for RoomNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoomNumber {
    type Err = RoomParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(RoomParseError::RoomNumber(raw.to_string()));
        }
        let value = trimmed
            .parse::<u16>()
            .map_err(|_| RoomParseError::RoomNumber(raw.to_string()))?;
        Self::new(value).map_err(|_| RoomParseError::RoomNumber(raw.to_string()))
    }
}

impl Serialize for RoomNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoomNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque reference to a student record owned by the admissions workflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl StudentId {
    pub fn parse(raw: &str) -> Result<Self, RoomParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RoomParseError::StudentId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Wing {
    A,
    B,
    C,
    D,
}

impl Wing {
    pub const fn ordered() -> [Wing; 4] {
        [Wing::A, Wing::B, Wing::C, Wing::D]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Wing::A => "A",
            Wing::B => "B",
            Wing::C => "C",
            Wing::D => "D",
        }
    }
}

impl FromStr for Wing {
    type Err = RoomParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Wing::A),
            "B" => Ok(Wing::B),
            "C" => Ok(Wing::C),
            "D" => Ok(Wing::D),
            _ => Err(RoomParseError::Wing(raw.to_string())),
        }
    }
}

/// One of the four fixed bed slots in every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BedLetter {
    A,
    B,
    C,
    D,
}

impl BedLetter {
    pub const ALL: [BedLetter; BEDS_PER_ROOM] =
        [BedLetter::A, BedLetter::B, BedLetter::C, BedLetter::D];

    const fn index(self) -> usize {
        match self {
            BedLetter::A => 0,
            BedLetter::B => 1,
            BedLetter::C => 2,
            BedLetter::D => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            BedLetter::A => "A",
            BedLetter::B => "B",
            BedLetter::C => "C",
            BedLetter::D => "D",
        }
    }
}

impl fmt::Display for BedLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BedLetter {
    type Err = RoomParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(BedLetter::A),
            "B" => Ok(BedLetter::B),
            "C" => Ok(BedLetter::C),
            "D" => Ok(BedLetter::D),
            _ => Err(RoomParseError::BedLetter(raw.to_string())),
        }
    }
}

pub const BEDS_PER_ROOM: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub occupant: Option<StudentId>,
}

impl Bed {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// Fixed set of bed slots, indexed by [`BedLetter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beds([Bed; BEDS_PER_ROOM]);

impl Beds {
    pub fn get(&self, letter: BedLetter) -> &Bed {
        &self.0[letter.index()]
    }

    pub(crate) fn get_mut(&mut self, letter: BedLetter) -> &mut Bed {
        &mut self.0[letter.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (BedLetter, &Bed)> {
        BedLetter::ALL.into_iter().zip(self.0.iter())
    }

    pub fn occupied_count(&self) -> usize {
        self.0.iter().filter(|bed| bed.is_occupied()).count()
    }

    pub fn free_letters(&self) -> Vec<BedLetter> {
        self.iter()
            .filter(|(_, bed)| !bed.is_occupied())
            .map(|(letter, _)| letter)
            .collect()
    }

    pub fn position_of(&self, student: &StudentId) -> Option<BedLetter> {
        self.iter()
            .find(|(_, bed)| bed.occupant.as_ref() == Some(student))
            .map(|(letter, _)| letter)
    }

    pub fn occupants(&self) -> impl Iterator<Item = &StudentId> {
        self.0.iter().filter_map(|bed| bed.occupant.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facilities {
    pub has_ac: bool,
    pub has_attached_bathroom: bool,
    pub has_balcony: bool,
    pub has_furniture: bool,
}

/// Externally visible room status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Blocked,
}

impl RoomStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Occupied => "OCCUPIED",
            RoomStatus::Maintenance => "MAINTENANCE",
            RoomStatus::Blocked => "BLOCKED",
        }
    }

    /// Rooms in these states can still receive students.
    pub const fn is_bookable(self) -> bool {
        matches!(self, RoomStatus::Available | RoomStatus::Occupied)
    }

    fn from_occupancy(occupied: usize) -> Self {
        if occupied == 0 {
            RoomStatus::Available
        } else {
            RoomStatus::Occupied
        }
    }
}

/// Administrative override that takes a room out of the bookable pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomHold {
    Maintenance {
        scheduled_for: DateTime<Utc>,
        reason: String,
    },
    Blocked {
        reason: String,
    },
}

impl RoomHold {
    pub fn reason(&self) -> &str {
        match self {
            RoomHold::Maintenance { reason, .. } | RoomHold::Blocked { reason } => reason,
        }
    }
}

/// Persisted room document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_number: RoomNumber,
    pub floor: u16,
    pub wing: Wing,
    pub beds: Beds,
    pub facilities: Facilities,
    pub rent: u32,
    pub hold: Option<RoomHold>,
    pub revision: u64,
}

impl Room {
    /// Occupancy-derived status, overridden by any active hold.
    pub fn status(&self) -> RoomStatus {
        match &self.hold {
            Some(RoomHold::Maintenance { .. }) => RoomStatus::Maintenance,
            Some(RoomHold::Blocked { .. }) => RoomStatus::Blocked,
            None => RoomStatus::from_occupancy(self.beds.occupied_count()),
        }
    }

    pub fn maintenance_scheduled(&self) -> Option<DateTime<Utc>> {
        match &self.hold {
            Some(RoomHold::Maintenance { scheduled_for, .. }) => Some(*scheduled_for),
            _ => None,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.beds.occupied_count()
    }

    pub fn has_free_bed(&self) -> bool {
        self.occupied_count() < BEDS_PER_ROOM
    }

    pub(crate) fn occupy(
        &mut self,
        letter: BedLetter,
        student: StudentId,
    ) -> Result<(), BedStateError> {
        let bed = self.beds.get_mut(letter);
        if bed.is_occupied() {
            return Err(BedStateError::AlreadyOccupied);
        }
        bed.occupant = Some(student);
        Ok(())
    }

    pub(crate) fn vacate(
        &mut self,
        letter: BedLetter,
        student: &StudentId,
    ) -> Result<(), BedStateError> {
        let bed = self.beds.get_mut(letter);
        if bed.occupant.as_ref() != Some(student) {
            return Err(BedStateError::OccupantMismatch);
        }
        bed.occupant = None;
        Ok(())
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            room_number: self.room_number,
            floor: self.floor,
            wing: self.wing,
            beds: self
                .beds
                .iter()
                .map(|(letter, bed)| BedView {
                    bed_letter: letter,
                    is_occupied: bed.is_occupied(),
                    student_id: bed.occupant.clone(),
                })
                .collect(),
            facilities: self.facilities,
            status: self.status(),
            rent: self.rent,
            maintenance_scheduled: self.maintenance_scheduled(),
            hold_reason: self.hold.as_ref().map(|hold| hold.reason().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BedStateError {
    AlreadyOccupied,
    OccupantMismatch,
}

/// Location of a student's bed across the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedAssignment {
    pub room_number: RoomNumber,
    pub bed_letter: BedLetter,
}

impl fmt::Display for BedAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room {} bed {}", self.room_number, self.bed_letter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BedView {
    pub bed_letter: BedLetter,
    pub is_occupied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
}

/// API-facing rendition of a room including its derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    pub room_number: RoomNumber,
    pub floor: u16,
    pub wing: Wing,
    pub beds: Vec<BedView>,
    pub facilities: Facilities,
    pub status: RoomStatus,
    pub rent: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_scheduled: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomParseError {
    #[error("'{0}' is not a valid room number")]
    RoomNumber(String),
    #[error("'{0}' is not a valid bed letter (expected A, B, C or D)")]
    BedLetter(String),
    #[error("'{0}' is not a valid wing (expected A, B, C or D)")]
    Wing(String),
    #[error("student id must not be empty")]
    StudentId,
}
