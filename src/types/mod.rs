mod device_info;
mod family;

pub use device_info::*;
pub use family::*;
