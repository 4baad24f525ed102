use super::domain::{Beds, Facilities, Room, RoomNumber, Wing};

pub const DEFAULT_TOTAL_ROOMS: u16 = 200;
pub const ROOMS_PER_FLOOR: u16 = 20;
pub const STANDARD_RENT: u32 = 5000;
pub const AC_RENT: u32 = 7000;

/// Deterministic building layout used to seed the room inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryLayout {
    total_rooms: u16,
}

impl InventoryLayout {
    pub fn new(total_rooms: u16) -> Option<Self> {
        (total_rooms > 0).then_some(Self { total_rooms })
    }

    pub fn standard() -> Self {
        Self {
            total_rooms: DEFAULT_TOTAL_ROOMS,
        }
    }

    pub const fn total_rooms(&self) -> u16 {
        self.total_rooms
    }

    pub fn floor_of(&self, number: RoomNumber) -> u16 {
        number.get().div_ceil(ROOMS_PER_FLOOR)
    }

    /// Wings split the building into quartiles. Inventories smaller than the
    /// standard building keep the standard 50-room wings.
    pub fn wing_of(&self, number: RoomNumber) -> Wing {
        let number = u32::from(number.get());
        let total = u32::from(self.total_rooms.max(DEFAULT_TOTAL_ROOMS));
        if number * 4 <= total {
            Wing::A
        } else if number * 2 <= total {
            Wing::B
        } else if number * 4 <= total * 3 {
            Wing::C
        } else {
            Wing::D
        }
    }

    pub fn room(&self, number: RoomNumber) -> Room {
        let floor = self.floor_of(number);
        let has_ac = number.get() % 10 == 0;

        Room {
            room_number: number,
            floor,
            wing: self.wing_of(number),
            beds: Beds::default(),
            facilities: Facilities {
                has_ac,
                has_attached_bathroom: false,
                has_balcony: floor > 2,
                has_furniture: true,
            },
            rent: if has_ac { AC_RENT } else { STANDARD_RENT },
            hold: None,
            revision: 0,
        }
    }

    pub fn rooms(&self) -> Vec<Room> {
        (1..=self.total_rooms)
            .filter_map(|value| RoomNumber::new(value).ok())
            .map(|number| self.room(number))
            .collect()
    }
}

impl Default for InventoryLayout {
    fn default() -> Self {
        Self::standard()
    }
}
