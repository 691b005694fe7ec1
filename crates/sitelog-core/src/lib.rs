//! sitelog-core
//!
//! Wizard state machine, validation rules and the record store contract for
//! site-visit logging. Depends on sitelog-domain. No CLI, no terminal I/O and
//! no file formats; concrete stores live in their own crates.

pub mod error;
pub mod filter;
pub mod memory_store;
pub mod storage;
pub mod time;
pub mod validation;
pub mod wizard;

pub use error::CoreError;
pub use filter::*;
pub use memory_store::MemoryRecordStore;
pub use storage::RecordStore;
pub use time::{Clock, SystemClock};
pub use validation::{validate, ValidationError};
pub use wizard::*;
