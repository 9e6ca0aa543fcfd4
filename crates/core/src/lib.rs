pub mod command;
pub mod config;
pub mod covers;
pub mod estimator;
pub mod model;

pub use command::{parse_command, select_raw_command, CommandRequest, COMMAND_PARAMS};
pub use config::{AppConfig, ConfigIntervals, ServerConfig};
pub use covers::normalize_cover_path;
pub use estimator::estimate_position;
pub use model::{epoch_ms, PlaybackStatus, RemoteCommand, TrackSnapshot, TrackStatusPayload, UNKNOWN};
