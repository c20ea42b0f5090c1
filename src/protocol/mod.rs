//! Wire protocol shared by the ledger server and its clients.

mod messages;

pub use messages::*;
