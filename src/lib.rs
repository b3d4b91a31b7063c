pub mod cli;
pub mod constants;
pub mod logging;
pub mod model;
pub mod post;
pub mod server;
pub mod sse;
pub mod store;
pub mod ticker;
pub mod watch;
