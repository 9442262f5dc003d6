pub mod options;
pub mod criteria;
pub mod planner;

pub use criteria::Criteria;
pub use options::{SearchOptions, SortKey, SortOrder};
pub use planner::{plan, CandidatePlan};
