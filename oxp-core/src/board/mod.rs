//! Board registry and identification

pub mod identify;
pub mod registry;

pub use identify::{identify, probe, CpuVendor, SystemIdentity};
pub use registry::{sensor_address, BoardFamily, BoardProfile, SensorAddress, SensorKind};
