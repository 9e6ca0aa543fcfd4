pub mod cache;
pub mod channel;
pub mod dispatcher;
pub mod publisher;
pub mod snapshot;
pub mod teardown;

pub use cache::{run_cache_loop, TrackCache};
pub use channel::{lane, LaneReceiver, LaneSender};
pub use dispatcher::{selectors_for, CommandDispatcher};
pub use publisher::TrackPublisher;
pub use snapshot::build_snapshot;
pub use teardown::Teardown;
