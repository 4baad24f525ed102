use super::super::domain::{Room, BEDS_PER_ROOM};
use super::{RoomPreferences, ScoreComponent, ScoreFactor};

const WING_MATCH: i32 = 20;
const FLOOR_MATCH: i32 = 15;
const AC_MATCH: i32 = 10;
const BALCONY: i32 = 5;
const ATTACHED_BATHROOM: i32 = 5;
const PRIVACY_PER_FREE_BED: i32 = 3;
const WELL_UNDER_BUDGET: i32 = 10;
const WITHIN_BUDGET: i32 = 5;
const OVER_BUDGET: i32 = -5;

pub(crate) fn score_room(
    room: &Room,
    preferences: &RoomPreferences,
) -> (Vec<ScoreComponent>, i32) {
    let mut components = Vec::new();

    if preferences.wing == Some(room.wing) {
        components.push(component(ScoreFactor::WingMatch, WING_MATCH));
    }
    if preferences.floor == Some(room.floor) {
        components.push(component(ScoreFactor::FloorMatch, FLOOR_MATCH));
    }
    if preferences.has_ac == Some(room.facilities.has_ac) {
        components.push(component(ScoreFactor::AcMatch, AC_MATCH));
    }
    if room.facilities.has_balcony {
        components.push(component(ScoreFactor::Balcony, BALCONY));
    }
    if room.facilities.has_attached_bathroom {
        components.push(component(ScoreFactor::AttachedBathroom, ATTACHED_BATHROOM));
    }

    let free_beds = BEDS_PER_ROOM.saturating_sub(room.occupied_count()) as i32;
    components.push(component(
        ScoreFactor::Privacy,
        free_beds * PRIVACY_PER_FREE_BED,
    ));

    if let Some(budget) = preferences.budget {
        let rent = u64::from(room.rent);
        let budget = u64::from(budget);
        // 80% of budget, compared in integers
        let points = if rent * 5 <= budget * 4 {
            WELL_UNDER_BUDGET
        } else if rent <= budget {
            WITHIN_BUDGET
        } else {
            OVER_BUDGET
        };
        components.push(component(ScoreFactor::Budget, points));
    }

    let total = components.iter().map(|component| component.points).sum();
    (components, total)
}

fn component(factor: ScoreFactor, points: i32) -> ScoreComponent {
    ScoreComponent { factor, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::domain::{RoomNumber, Wing};
    use crate::rooms::layout::InventoryLayout;

    fn room(value: u16) -> Room {
        InventoryLayout::standard().room(RoomNumber::new(value).expect("valid"))
    }

    fn points_for(components: &[ScoreComponent], factor: ScoreFactor) -> Option<i32> {
        components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.points)
    }

    #[test]
    fn full_match_on_upper_floor_ac_room() {
        // room 60: floor 3, wing B, AC, balcony, rent 7000
        let preferences = RoomPreferences {
            wing: Some(Wing::B),
            floor: Some(3),
            has_ac: Some(true),
            budget: Some(10_000),
        };

        let (components, total) = score_room(&room(60), &preferences);
        assert_eq!(points_for(&components, ScoreFactor::WingMatch), Some(20));
        assert_eq!(points_for(&components, ScoreFactor::FloorMatch), Some(15));
        assert_eq!(points_for(&components, ScoreFactor::AcMatch), Some(10));
        assert_eq!(points_for(&components, ScoreFactor::Balcony), Some(5));
        assert_eq!(points_for(&components, ScoreFactor::AttachedBathroom), None);
        assert_eq!(points_for(&components, ScoreFactor::Privacy), Some(12));
        assert_eq!(points_for(&components, ScoreFactor::Budget), Some(10));
        assert_eq!(total, 72);
    }

    #[test]
    fn budget_tiers_follow_rent_ratio() {
        let standard = room(1);
        let tier = |budget: u32| {
            let preferences = RoomPreferences {
                budget: Some(budget),
                ..RoomPreferences::default()
            };
            let (components, _) = score_room(&standard, &preferences);
            points_for(&components, ScoreFactor::Budget)
        };

        assert_eq!(tier(6250), Some(10), "5000 is exactly 80% of 6250");
        assert_eq!(tier(6000), Some(5));
        assert_eq!(tier(5000), Some(5));
        assert_eq!(tier(4999), Some(-5));
    }

    #[test]
    fn ac_preference_matches_non_ac_rooms_too() {
        let preferences = RoomPreferences {
            has_ac: Some(false),
            ..RoomPreferences::default()
        };
        let (components, total) = score_room(&room(3), &preferences);
        assert_eq!(points_for(&components, ScoreFactor::AcMatch), Some(10));
        assert_eq!(total, 22);
    }
}
