//! sitelog-domain
//!
//! Pure data model for the site-visit wizard: field definitions, visibility
//! rules, collected answers and assembled records.
//! No I/O, no CLI, no storage.

pub mod answer;
pub mod field;
pub mod record;
pub mod schema;
pub mod site_visit;

pub use answer::*;
pub use field::*;
pub use record::*;
pub use schema::*;
pub use site_visit::site_visit_schema;
