pub mod address;
pub mod constants;
pub mod date;
pub mod denom;
pub mod error;
pub mod event;
pub mod msgs;
pub mod pagination;
pub mod params;
pub mod recovery;
pub mod rewards;
pub mod token;
pub mod types;

pub use constants::*;
pub use error::LedgerError;
pub use event::Event;
pub use types::*;
