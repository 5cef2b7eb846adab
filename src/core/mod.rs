pub mod admission;
pub mod attendance;
pub mod error;
pub mod geo;
pub mod tenant;
pub mod vacation;
