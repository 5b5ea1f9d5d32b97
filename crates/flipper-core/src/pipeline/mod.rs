//! Image pipeline components.
//!
//! - **listing**: fetch the identifier list from the host
//! - **transform**: decode, mirror and re-encode an image
//! - **worker**: fetch → transform → upload for one identifier
//! - **orchestrator**: fan workers out over one shared client

pub mod listing;
pub mod orchestrator;
pub mod transform;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use listing::{list_images, parse_listing, Listing};
pub use orchestrator::Orchestrator;
pub use transform::{mirror, MirroredImage, Transformer};
pub use worker::{Stage, Worker, WorkerOptions};
