pub mod espn;
pub mod http;
pub mod odds_api;
pub mod sportsdb;

// Re-export commonly used types
pub use espn::{EspnClient, Game};
pub use odds_api::{OddsApiClient, OddsApiEvent, QuotaInfo};
pub use sportsdb::{SportsDbClient, SportsDbEvent};
