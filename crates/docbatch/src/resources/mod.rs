//! API resource endpoints
//!
//! One type per resource of the service, each holding a cheap clone of the
//! [`Client`](crate::Client).

pub mod batches;
pub mod jobs;
pub mod prompts;
pub mod results;

pub use batches::Batches;
pub use jobs::Jobs;
pub use prompts::Prompts;
pub use results::Results;
