use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{BookingRepository, EventRepository, LocationRepository};
use crate::domain::services::{
    admission::AdmissionService, lifecycle::LifecycleService, scheduling::SchedulingService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub location_repo: Arc<dyn LocationRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub admission: Arc<AdmissionService>,
    pub scheduling: Arc<SchedulingService>,
    pub lifecycle: Arc<LifecycleService>,
}
