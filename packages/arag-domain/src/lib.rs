pub mod memory;
pub mod outcome;
pub mod piigate;
pub mod record;
pub mod text;
pub mod time_serde;

pub use memory::{DEFAULT_SCORE_HINT, EpisodicEvent, TargetingSummary};
pub use outcome::Outcome;
pub use piigate::{Finding, PiiKind, Rejection};
pub use record::{ApplicationRecord, Artifacts, Method, Status};
