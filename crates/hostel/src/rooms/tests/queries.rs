use super::common::*;
use crate::rooms::availability::{AvailabilityFilter, PriceRange};
use crate::rooms::domain::{BedLetter, RoomStatus, Wing};
use crate::rooms::recommendation::{RoomPreferences, ScoreFactor, MAX_RECOMMENDATIONS};
use crate::rooms::service::RoomServiceError;

#[test]
fn small_inventory_lists_partially_occupied_room_in_wing_a() {
    let (service, _, _) = build_service(10);
    service
        .assign(&student("S1"), room(5), BedLetter::A)
        .expect("bed free");

    let open = service
        .available(&AvailabilityFilter {
            wing: Some(Wing::A),
            ..AvailabilityFilter::default()
        })
        .expect("availability");

    assert_eq!(open.len(), 10);
    let room_five = open
        .iter()
        .find(|summary| summary.room.room_number == room(5))
        .expect("room 5 listed");
    assert_eq!(
        room_five.available_beds,
        vec![BedLetter::B, BedLetter::C, BedLetter::D]
    );
    assert_eq!(room_five.occupied_count, 1);
    assert_eq!(room_five.room.status, RoomStatus::Occupied);
}

#[test]
fn full_ac_room_shows_in_statistics_and_leaves_availability() {
    let (service, _, _) = build_service(10);
    for (index, letter) in BedLetter::ALL.into_iter().enumerate() {
        service
            .assign(&student(&format!("S{index}")), room(10), letter)
            .expect("bed free");
    }

    let stats = service.statistics().expect("statistics");
    assert_eq!(stats.occupied_rooms, 1);
    assert_eq!(stats.available_rooms, 9);
    assert_eq!(stats.occupied_beds, 4);
    assert_eq!(stats.available_beds, 36);
    assert_eq!(stats.occupancy_rate, 10);
    assert_eq!(stats.bed_occupancy_rate, 10);
    assert_eq!(stats.wings.len(), 1);
    assert!((stats.wings[0].average_rent - 5200.0).abs() < f64::EPSILON);

    let open = service
        .available(&AvailabilityFilter {
            has_ac: Some(true),
            ..AvailabilityFilter::default()
        })
        .expect("availability");
    assert!(open.is_empty());
}

#[test]
fn availability_filters_compose() {
    let (service, _, _) = build_service(200);

    let ac_rooms = service
        .available(&AvailabilityFilter {
            has_ac: Some(true),
            ..AvailabilityFilter::default()
        })
        .expect("availability");
    assert_eq!(ac_rooms.len(), 20);
    assert!(ac_rooms.iter().all(|summary| summary.room.rent == 7000));

    let wing_c_floor_six = service
        .available(&AvailabilityFilter {
            wing: Some(Wing::C),
            floor: Some(6),
            ..AvailabilityFilter::default()
        })
        .expect("availability");
    let numbers: Vec<u16> = wing_c_floor_six
        .iter()
        .map(|summary| summary.room.room_number.get())
        .collect();
    assert_eq!(numbers, (101..=120).collect::<Vec<_>>());

    let budget = service
        .available(&AvailabilityFilter {
            price_range: Some(PriceRange {
                min: Some(6000),
                max: None,
            }),
            floor: Some(1),
            ..AvailabilityFilter::default()
        })
        .expect("availability");
    let numbers: Vec<u16> = budget
        .iter()
        .map(|summary| summary.room.room_number.get())
        .collect();
    assert_eq!(numbers, vec![10, 20]);
}

#[test]
fn availability_rejects_inverted_price_range() {
    let (service, _, _) = build_service(10);
    let result = service.available(&AvailabilityFilter {
        price_range: Some(PriceRange {
            min: Some(8000),
            max: Some(4000),
        }),
        ..AvailabilityFilter::default()
    });
    assert!(matches!(result, Err(RoomServiceError::InvalidArgument(_))));
}

#[test]
fn recommendation_applies_preferences_as_filters_and_scores() {
    let (service, _, _) = build_service(200);

    let ranked = service
        .recommend(&RoomPreferences {
            wing: Some(Wing::B),
            floor: Some(3),
            has_ac: Some(true),
            budget: Some(9000),
        })
        .expect("recommendations");

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].summary.room.room_number, room(60));
    assert_eq!(ranked[0].score, 72);
    assert!(ranked[0]
        .components
        .iter()
        .any(|component| component.factor == ScoreFactor::Balcony));
}

#[test]
fn recommendation_prefers_emptier_rooms_and_keeps_room_order_on_ties() {
    let (service, _, _) = build_service(200);
    service
        .assign(&student("S1"), room(41), BedLetter::A)
        .expect("bed free");

    let ranked = service
        .recommend(&RoomPreferences {
            budget: Some(6000),
            ..RoomPreferences::default()
        })
        .expect("recommendations");

    assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
    let numbers: Vec<u16> = ranked
        .iter()
        .map(|scored| scored.summary.room.room_number.get())
        .collect();
    assert_eq!(numbers, vec![42, 43, 44, 45, 46]);
    assert!(ranked.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn recommendation_rejects_floor_zero() {
    let (service, _, _) = build_service(10);
    let result = service.recommend(&RoomPreferences {
        floor: Some(0),
        ..RoomPreferences::default()
    });
    assert!(matches!(result, Err(RoomServiceError::InvalidArgument(_))));
}

#[test]
fn student_allocation_lookup_follows_assignments() {
    let (service, _, _) = build_service(10);
    assert!(matches!(
        service.allocation_for(&student("S1")),
        Err(RoomServiceError::AllocationNotFound(_))
    ));

    service
        .assign(&student("S1"), room(10), BedLetter::D)
        .expect("bed free");
    let allocation = service
        .allocation_for(&student("S1"))
        .expect("allocation present");
    assert_eq!(allocation.room_number, room(10));
    assert_eq!(allocation.bed_letter, BedLetter::D);
    assert_eq!(allocation.rent, 7000);

    service
        .release(&student("S1"), room(10), BedLetter::D)
        .expect("release");
    assert!(matches!(
        service.allocation_for(&student("S1")),
        Err(RoomServiceError::AllocationNotFound(_))
    ));
}

#[test]
fn room_lookup_reports_derived_view() {
    let (service, _, _) = build_service(10);
    let view = service.room(room(10)).expect("room exists");
    assert_eq!(view.beds.len(), 4);
    assert!(view.facilities.has_ac);
    assert!(view.facilities.has_furniture);
    assert_eq!(view.status, RoomStatus::Available);

    assert!(matches!(
        service.room(room(11)),
        Err(RoomServiceError::RoomNotFound(_))
    ));
}
