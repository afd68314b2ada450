mod capability;
mod db;
mod device_detect;
mod error;
mod helpers;
mod signature;
mod substitution;
mod types;
mod version;

pub use device_detect::DeviceDetect;
pub use error::{Error, Result};
pub use types::*;
