//! Record shapes exposed by the service, their validation rules, and the
//! Postgres `document` entity that stores them.

pub mod errors;
pub mod validation;
pub mod resource;
pub mod task;
pub mod booking;
pub mod document;
pub mod db;

pub use booking::Booking;
pub use resource::{Record, Resource};
pub use task::Task;
