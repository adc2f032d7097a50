//! Background work detached from request handling.

pub mod followup;

pub use followup::{FollowUp, FollowUpDispatcher, Outcome};
