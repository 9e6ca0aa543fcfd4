use std::sync::Arc;

use tracing::{debug, warn};

use nowplay_bridge_core::RemoteCommand;
use nowplay_bridge_source::ControlSurface;

use crate::channel::LaneReceiver;

pub fn selectors_for(command: RemoteCommand) -> &'static [&'static str] {
    match command {
        RemoteCommand::PlayToggle => &["PlayPause", "Play", "Pause"],
        RemoteCommand::Next => &["Next"],
        RemoteCommand::Prev => &["Previous"],
    }
}

pub struct CommandDispatcher {
    surface: Arc<dyn ControlSurface>,
}

impl CommandDispatcher {
    pub fn new(surface: Arc<dyn ControlSurface>) -> Self {
        Self { surface }
    }

    pub async fn dispatch(&self, command: RemoteCommand) -> bool {
        for selector in selectors_for(command) {
            match self.surface.activate(selector).await {
                Ok(true) => {
                    debug!(?command, selector, "control activated");
                    return true;
                }
                Ok(false) => {}
                Err(err) => {
                    debug!(?command, selector, error = %err, "selector failed, trying next");
                }
            }
        }
        warn!(?command, surface = self.surface.name(), "no control matched");
        false
    }

    pub async fn run(self, mut commands: LaneReceiver<RemoteCommand>) {
        while let Some(command) = commands.recv().await {
            self.dispatch(command).await;
        }
        debug!("command lane closed, dispatcher stopping");
    }
}
