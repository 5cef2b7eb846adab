pub mod admin;
pub mod attendance;
pub mod geofence;
pub mod vacation;
