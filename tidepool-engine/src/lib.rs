#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod engine;
pub mod events;
pub mod flash;
pub mod journal;
pub mod ledger;
pub mod permit;
pub mod pool;
pub mod registry;
pub mod router;
pub mod state;

pub use engine::{Ctx, Engine, EngineConfig};
