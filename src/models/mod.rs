pub mod announcement;
pub mod api;
pub mod calendar;
pub mod media;
pub mod rich_text;
pub mod schedule;
pub mod sports;
pub mod weather;
