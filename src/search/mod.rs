pub mod geo;
pub mod results;
pub mod executor;

pub use executor::{execute, paginate, sort_assets};
pub use results::SearchResults;
