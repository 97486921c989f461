//! Core types for the batch service
//!
//! Wire shapes of the service responses live next to the client-side
//! tracked state they feed.

pub use artifact::*;
pub use batch::*;
pub use job::*;
pub use model::*;

pub mod artifact;
pub mod batch;
pub mod job;
pub mod model;
