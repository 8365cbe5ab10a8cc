//! Configuration sections.

mod live;
mod serve;
mod watch;

pub use live::{LiveConfig, PushMode};
pub use serve::ServeConfig;
pub use watch::WatchConfig;
