pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{write_complete_device, write_device_dir};
