use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Room, RoomStatus, Wing, BEDS_PER_ROOM};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomStatistics {
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
    pub maintenance_rooms: usize,
    pub blocked_rooms: usize,
    pub occupancy_rate: u8,
    pub total_beds: usize,
    pub occupied_beds: usize,
    pub available_beds: usize,
    pub bed_occupancy_rate: u8,
    pub wings: Vec<WingBreakdown>,
    pub floors: Vec<FloorBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WingBreakdown {
    pub wing: Wing,
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
    pub average_rent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorBreakdown {
    pub floor: u16,
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
}

#[derive(Debug, Default, Clone)]
struct Tally {
    total: usize,
    available: usize,
    occupied: usize,
    rent_sum: u64,
}

impl Tally {
    fn record(&mut self, room: &Room, status: RoomStatus) {
        self.total += 1;
        self.rent_sum += u64::from(room.rent);
        match status {
            RoomStatus::Available => self.available += 1,
            RoomStatus::Occupied => self.occupied += 1,
            RoomStatus::Maintenance | RoomStatus::Blocked => {}
        }
    }

    fn average_rent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.rent_sum as f64 / self.total as f64
        }
    }
}

/// Whole-number percentage, rounded half up. An empty denominator yields 0.
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = (part as u128 * 100 + whole as u128 / 2) / whole as u128;
    scaled.min(100) as u8
}

impl RoomStatistics {
    pub fn from_rooms(rooms: &[Room]) -> Self {
        let mut overall = Tally::default();
        let mut maintenance_rooms = 0;
        let mut blocked_rooms = 0;
        let mut occupied_beds = 0;
        let mut wings: BTreeMap<Wing, Tally> = BTreeMap::new();
        let mut floors: BTreeMap<u16, Tally> = BTreeMap::new();

        for room in rooms {
            let status = room.status();
            overall.record(room, status);
            wings.entry(room.wing).or_default().record(room, status);
            floors.entry(room.floor).or_default().record(room, status);
            occupied_beds += room.occupied_count();

            match status {
                RoomStatus::Maintenance => maintenance_rooms += 1,
                RoomStatus::Blocked => blocked_rooms += 1,
                RoomStatus::Available | RoomStatus::Occupied => {}
            }
        }

        let total_beds = overall.total * BEDS_PER_ROOM;

        RoomStatistics {
            total_rooms: overall.total,
            available_rooms: overall.available,
            occupied_rooms: overall.occupied,
            maintenance_rooms,
            blocked_rooms,
            occupancy_rate: percentage(overall.occupied, overall.total),
            total_beds,
            occupied_beds,
            available_beds: total_beds - occupied_beds,
            bed_occupancy_rate: percentage(occupied_beds, total_beds),
            wings: wings
                .into_iter()
                .map(|(wing, tally)| WingBreakdown {
                    wing,
                    total_rooms: tally.total,
                    available_rooms: tally.available,
                    occupied_rooms: tally.occupied,
                    average_rent: tally.average_rent(),
                })
                .collect(),
            floors: floors
                .into_iter()
                .map(|(floor, tally)| FloorBreakdown {
                    floor,
                    total_rooms: tally.total,
                    available_rooms: tally.available,
                    occupied_rooms: tally.occupied,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::domain::{BedLetter, RoomHold, RoomNumber, StudentId};
    use crate::rooms::layout::InventoryLayout;

    #[test]
    fn empty_inventory_reports_zero_rates() {
        let stats = RoomStatistics::from_rooms(&[]);
        assert_eq!(stats.total_rooms, 0);
        assert_eq!(stats.occupancy_rate, 0);
        assert_eq!(stats.bed_occupancy_rate, 0);
        assert!(stats.wings.is_empty());
        assert!(stats.floors.is_empty());
    }

    #[test]
    fn standard_inventory_breaks_down_by_wing_and_floor() {
        let stats = RoomStatistics::from_rooms(&InventoryLayout::standard().rooms());

        assert_eq!(stats.total_rooms, 200);
        assert_eq!(stats.available_rooms, 200);
        assert_eq!(stats.total_beds, 800);
        assert_eq!(stats.wings.len(), 4);
        assert_eq!(stats.floors.len(), 10);
        assert!(stats.floors.iter().all(|floor| floor.total_rooms == 20));

        let wing_a = &stats.wings[0];
        assert_eq!(wing_a.wing, Wing::A);
        assert_eq!(wing_a.total_rooms, 50);
        // five AC rooms at 7000, forty-five at 5000
        assert!((wing_a.average_rent - 5200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn holds_and_occupancy_are_counted_separately() {
        let layout = InventoryLayout::new(4).expect("non-empty layout");
        let mut rooms = layout.rooms();
        rooms[0]
            .occupy(BedLetter::A, StudentId("s-1".to_string()))
            .expect("bed free");
        rooms[1]
            .occupy(BedLetter::B, StudentId("s-2".to_string()))
            .expect("bed free");
        rooms[1].hold = Some(RoomHold::Blocked {
            reason: "inspection".to_string(),
        });
        rooms[2].hold = Some(RoomHold::Maintenance {
            scheduled_for: chrono::Utc::now(),
            reason: "paint".to_string(),
        });

        let stats = RoomStatistics::from_rooms(&rooms);
        assert_eq!(stats.available_rooms, 1);
        assert_eq!(stats.occupied_rooms, 1);
        assert_eq!(stats.blocked_rooms, 1);
        assert_eq!(stats.maintenance_rooms, 1);
        assert_eq!(stats.occupancy_rate, 25);
        assert_eq!(stats.occupied_beds, 2);
        assert_eq!(stats.occupied_beds + stats.available_beds, stats.total_beds);
        assert_eq!(stats.total_beds, 4 * stats.total_rooms);
        assert_eq!(rooms[3].room_number, RoomNumber::new(4).expect("valid"));
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 0), 0);
    }
}
