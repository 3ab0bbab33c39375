pub mod analyze;
pub mod expand;
pub mod generate;
pub mod watch;
