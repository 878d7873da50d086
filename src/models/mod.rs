//! Models Module
//!
//! Request and response DTOs for the HTTP surface.

mod requests;
mod responses;

pub use requests::ScheduleRequest;
pub use responses::{
    DueShowsResponse, HealthResponse, RemovedResponse, ScheduleSnapshotResponse, ScheduledShow,
    ScheduledResponse, StatsResponse, TbaResponse,
};
