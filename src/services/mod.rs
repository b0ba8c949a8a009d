pub mod calendar;
pub mod clock;
pub mod contentful;
pub mod dashboard;
pub mod display;
pub mod drive;
pub mod google_auth;
pub mod metrics;
pub mod render;
pub mod rotator;
pub mod schedule;
pub mod sheets;
pub mod upstream;
pub mod weather;
