pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{TestKey, root_document, sign, targets_document, write_document};
