//! Command implementations.

pub mod check;
pub mod extract;
pub mod init;

pub use self::check::execute_check;
pub use self::extract::{execute_extract, run_extraction};
pub use self::init::execute_init;
