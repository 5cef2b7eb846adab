pub mod geofence;
pub mod role;
pub mod timestamp;
pub mod user;
pub mod vacation;
