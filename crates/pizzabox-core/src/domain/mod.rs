//! Domain model (records, keys, pizza payloads, connectivity, outcomes, errors).

pub mod ids;
pub mod record;
pub mod pizza;
pub mod events;
pub mod outcome;
pub mod errors;

pub use self::ids::{FlushId, LocalKey};
pub use self::record::{PendingRecord, QueuedRecord, last_key};
pub use self::pizza::{PizzaDraft, PizzaSize, UnknownSize};
pub use self::events::{Connectivity, ConnectivityEvent};
pub use self::outcome::{FlushOutcome, FlushReport};
pub use self::errors::{ErrorKind, SyncError};
