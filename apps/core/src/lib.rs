pub mod announcer;
pub mod config;
pub mod contract;
pub mod coordinator;
pub mod logging;
pub mod model;
pub mod page;
pub mod registry;
pub mod runtime;
pub mod script;
pub mod search;
pub mod timer;
pub mod visibility;
