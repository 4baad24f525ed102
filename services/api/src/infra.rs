use hostel::rooms::{
    AllocationNotice, AllocationNotifier, AllocationSettings, InMemoryRoomRepository,
    NotifyError, RoomService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the outbound email collaborator: notices land in the service log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogNotifier;

impl AllocationNotifier for LogNotifier {
    fn notify(&self, notice: AllocationNotice) -> Result<(), NotifyError> {
        info!(
            template = %notice.template,
            student = %notice.student_id,
            room = %notice.room_number,
            bed = %notice.bed_letter,
            "allocation notice queued"
        );
        Ok(())
    }
}

pub(crate) type HostelService = RoomService<InMemoryRoomRepository, LogNotifier>;

pub(crate) fn in_memory_service(settings: AllocationSettings) -> Arc<HostelService> {
    Arc::new(RoomService::new(
        Arc::new(InMemoryRoomRepository::default()),
        Arc::new(LogNotifier),
        settings,
    ))
}
