#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod amount;
pub mod deadline;
pub mod error;
pub mod fees;
pub mod issuance;
pub mod tag;
