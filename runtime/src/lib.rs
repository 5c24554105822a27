pub mod cid;
pub mod engine;
pub mod session;

pub mod prelude {
    pub use crate::cid::{CidMinter, PlaceholderCid};
    pub use crate::engine::LegacyClock;
    pub use crate::session::WalletSession;
    pub use legacy_clock_core::prelude::*;
}

pub use cid::{CidMinter, PlaceholderCid};
pub use engine::LegacyClock;
pub use session::WalletSession;
