pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{Ceremony, write_signed};
