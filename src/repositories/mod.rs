pub mod attendance_repo;
pub mod event_repo;

pub use attendance_repo::AttendanceRepo;
pub use event_repo::EventRepo;
