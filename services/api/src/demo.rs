use crate::infra::{in_memory_service, HostelService};
use chrono::{Duration, Utc};
use clap::Args;
use hostel::config::AppConfig;
use hostel::error::AppError;
use hostel::rooms::{
    AvailabilityFilter, BedLetter, RoomPreferences, RoomStatistics, ScoredRoom, StudentId, Wing,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    /// Seed this many rooms instead of HOSTEL_TOTAL_ROOMS.
    #[arg(long)]
    pub(crate) total_rooms: Option<u16>,
    /// Include the per-floor breakdown.
    #[arg(long)]
    pub(crate) by_floor: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecommendArgs {
    /// Preferred wing (A-D).
    #[arg(long)]
    pub(crate) wing: Option<Wing>,
    /// Preferred floor (1-based).
    #[arg(long)]
    pub(crate) floor: Option<u16>,
    /// Require an air-conditioned room.
    #[arg(long, conflicts_with = "no_ac")]
    pub(crate) ac: bool,
    /// Require a room without air conditioning.
    #[arg(long)]
    pub(crate) no_ac: bool,
    /// Monthly rent ceiling.
    #[arg(long)]
    pub(crate) budget: Option<u32>,
    /// Seed this many rooms instead of HOSTEL_TOTAL_ROOMS.
    #[arg(long)]
    pub(crate) total_rooms: Option<u16>,
}

impl RecommendArgs {
    pub(crate) fn preferences(&self) -> RoomPreferences {
        let has_ac = match (self.ac, self.no_ac) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        RoomPreferences {
            wing: self.wing,
            floor: self.floor,
            has_ac,
            budget: self.budget,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed this many rooms instead of HOSTEL_TOTAL_ROOMS.
    #[arg(long)]
    pub(crate) total_rooms: Option<u16>,
    /// Skip the maintenance portion of the walkthrough.
    #[arg(long)]
    pub(crate) skip_maintenance: bool,
}

fn seeded_service(total_rooms: Option<u16>) -> Result<Arc<HostelService>, AppError> {
    let mut inventory = AppConfig::load()?.inventory;
    if let Some(total_rooms) = total_rooms {
        inventory.total_rooms = total_rooms;
    }
    let service = in_memory_service(inventory.allocation_settings()?);
    service.initialize()?;
    Ok(service)
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let service = seeded_service(args.total_rooms)?;
    let stats = service.statistics()?;
    render_statistics(&stats, args.by_floor);
    Ok(())
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let service = seeded_service(args.total_rooms)?;
    let ranked = service.recommend(&args.preferences())?;
    render_recommendations(&ranked);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = seeded_service(args.total_rooms)?;
    let total_rooms = service.settings().layout.total_rooms();

    println!("Hostel allocation demo ({} rooms)", total_rooms);

    let preferences = RoomPreferences {
        has_ac: Some(true),
        budget: Some(8000),
        ..RoomPreferences::default()
    };
    let ranked = service.recommend(&preferences)?;
    println!("\nRecommendations for an AC room under 8000");
    render_recommendations(&ranked);

    let Some(top) = ranked.first() else {
        println!("\nNo AC rooms available; nothing to assign.");
        return Ok(());
    };
    let room_number = top.summary.room.room_number;

    println!("\nAssigning residents to room {}", room_number);
    let residents = demo_residents();
    for (student, bed) in residents.iter().zip(BedLetter::ALL) {
        match service.assign(student, room_number, bed) {
            Ok(confirmation) => println!(
                "- {} -> room {} bed {} (floor {}, wing {}, rent {})",
                confirmation.student_id,
                confirmation.room_number,
                confirmation.bed_letter,
                confirmation.floor,
                confirmation.wing.label(),
                confirmation.rent
            ),
            Err(err) => println!("- {} not assigned: {}", student, err),
        }
    }

    let fallback = ranked[ranked.len() - 1].summary.room.room_number;
    if let Err(err) = service.assign(&residents[0], fallback, BedLetter::A) {
        println!("- second bed for {} refused: {}", residents[0], err);
    }

    if !args.skip_maintenance {
        let view = service.schedule_maintenance(
            room_number,
            Utc::now() + Duration::days(7),
            "AC compressor service",
        )?;
        println!(
            "\nMaintenance scheduled for room {}: status {}",
            view.room_number,
            view.status.label()
        );
        let view = service.complete_maintenance(room_number)?;
        println!(
            "Maintenance completed for room {}: status {}",
            view.room_number,
            view.status.label()
        );
    }

    let departing = &residents[residents.len() - 1];
    let released = service.release(departing, room_number, BedLetter::D)?;
    println!(
        "\n{} moved out of room {} bed {}; room now {}",
        released.student_id,
        released.room_number,
        released.bed_letter,
        released.room_status.label()
    );

    let open = service.available(&AvailabilityFilter {
        has_ac: Some(true),
        ..AvailabilityFilter::default()
    })?;
    println!("AC rooms with free beds: {}", open.len());

    render_statistics(&service.statistics()?, false);
    Ok(())
}

fn demo_residents() -> Vec<StudentId> {
    ["STU-1001", "STU-1002", "STU-1003", "STU-1004"]
        .into_iter()
        .map(|raw| StudentId(raw.to_string()))
        .collect()
}

pub(crate) fn render_recommendations(ranked: &[ScoredRoom]) {
    if ranked.is_empty() {
        println!("- no rooms match those preferences");
        return;
    }
    for scored in ranked {
        let room = &scored.summary.room;
        println!(
            "- room {} (wing {}, floor {}, rent {}): score {}, free beds {}",
            room.room_number,
            room.wing.label(),
            room.floor,
            room.rent,
            scored.score,
            scored.summary.available_beds.len()
        );
    }
}

pub(crate) fn render_statistics(stats: &RoomStatistics, by_floor: bool) {
    println!("\nOccupancy");
    println!(
        "- rooms: {} total | {} available | {} occupied | {} maintenance | {} blocked",
        stats.total_rooms,
        stats.available_rooms,
        stats.occupied_rooms,
        stats.maintenance_rooms,
        stats.blocked_rooms
    );
    println!(
        "- beds: {} total | {} occupied | {} free",
        stats.total_beds, stats.occupied_beds, stats.available_beds
    );
    println!(
        "- occupancy rate {}% of rooms, {}% of beds",
        stats.occupancy_rate, stats.bed_occupancy_rate
    );

    println!("\nWings");
    for wing in &stats.wings {
        println!(
            "- {}: {} rooms, {} available, {} occupied, average rent {:.0}",
            wing.wing.label(),
            wing.total_rooms,
            wing.available_rooms,
            wing.occupied_rooms,
            wing.average_rent
        );
    }

    if by_floor {
        println!("\nFloors");
        for floor in &stats.floors {
            println!(
                "- floor {}: {} rooms, {} available, {} occupied",
                floor.floor, floor.total_rooms, floor.available_rooms, floor.occupied_rooms
            );
        }
    }
}
