//! Test utilities: a scriptable fake driver and row helpers.

mod fake;
pub mod test_helpers;

pub use fake::{FakeCall, FakeDriver};
pub use test_helpers::{create_test_rows, fake_pool};
