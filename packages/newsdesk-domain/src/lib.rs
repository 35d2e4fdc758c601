pub mod date_serde;
pub mod record;
pub mod tags;
pub mod timestamp;

pub use record::{Record, Tags};
pub use tags::{TagChip, TagSelection};
pub use timestamp::DateRange;
