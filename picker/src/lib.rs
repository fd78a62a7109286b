// Modules behind the `picker` and `picker-wake` binaries.
//
// The channel, search and selection logic live here so they can be tested
// without a terminal or a running instance.

pub mod catalog;
pub mod channel;
pub mod config;
pub mod consts;
pub mod cursor;
pub mod format;
pub mod frontend;
pub mod net;
pub mod paths;
pub mod runner;
pub mod runtime;
pub mod search;
pub mod session;
