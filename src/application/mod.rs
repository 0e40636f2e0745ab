// Application layer - use cases and orchestration on top of the domain and storage.

pub mod error;
pub mod input;
mod ledger;
mod service;

pub use error::*;
pub use ledger::*;
pub use service::*;
