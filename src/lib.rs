// Next Play Recovery - API Core
//
// Backend API for tracking youth sports injuries: parents register children,
// log injuries, and monitor recovery; administrators view aggregate data and
// export reports.
//
// Every resource route goes through the authorization core in common/auth.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
