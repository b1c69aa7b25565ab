//! Hardware interaction modules
//!
//! EC byte access, the platform lock shared with firmware, and the register
//! transport built from the two.

pub mod ec;
pub mod mutex;
pub mod transport;

pub use ec::{EcBus, SysfsEcBus};
pub use mutex::{FlockMutex, HardwareMutex, Token};
pub use transport::{ByteWidth, RegisterTransport};
