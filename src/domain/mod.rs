mod account;
mod client;
mod clock;
mod ledger;
mod money;
mod product;
mod transaction;

pub use account::*;
pub use client::*;
pub use clock::*;
pub use ledger::*;
pub use money::*;
pub use product::*;
pub use transaction::*;
