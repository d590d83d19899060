use std::sync::mpsc;
use std::time::{Duration, Instant};

use courier_core::{update, AppState, AppViewModel, Msg, SelectableFile, SelectionPolicy};
use courier_engine::{EngineError, EngineHandle};
use courier_logging::courier_debug;
use thiserror::Error;

use super::config::{ClientConfig, ConfigError};
use super::effects::EffectRunner;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("unknown action {0:?}")]
    UnknownAction(String),
    #[error("no selected file named {0:?}")]
    UnknownFile(String),
}

/// One client session: the core state plus the engine bridge. Messages are
/// applied on the caller's thread; engine events queue up until the next
/// [`Session::pump`] or wait.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Session {
    pub fn new(engine: EngineHandle, policy: SelectionPolicy) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            state: AppState::with_policy(policy),
            runner: EffectRunner::new(engine, msg_tx),
            msg_rx,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, SessionError> {
        let engine = EngineHandle::with_settings(config.api_settings()?, config.downloads())?;
        Ok(Self::new(engine, config.selection_policy()))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Apply every engine message received so far. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut inbox = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            inbox.push(msg);
        }
        let count = inbox.len();
        for msg in inbox {
            self.dispatch(msg);
        }
        count
    }

    /// Apply engine messages until `done` holds. `None` waits without limit.
    /// Returns whether `done` held on return.
    pub fn wait_until(
        &mut self,
        timeout: Option<Duration>,
        done: impl Fn(&AppState) -> bool,
    ) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if done(&self.state) {
                return true;
            }
            let next = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    self.msg_rx.recv_timeout(remaining).ok()
                }
                None => self.msg_rx.recv().ok(),
            };
            match next {
                Some(msg) => self.dispatch(msg),
                None => return done(&self.state),
            }
        }
    }

    /// Start the session and wait for the catalog to load or fail.
    pub fn open(&mut self, timeout: Option<Duration>) -> bool {
        self.dispatch(Msg::SessionStarted);
        self.wait_until(timeout, |state| state.catalog_status().is_settled())
    }

    pub fn wait_for_idle(&mut self, timeout: Option<Duration>) -> bool {
        self.wait_until(timeout, |state| !state.is_in_flight())
    }

    pub fn add_files(&mut self, files: Vec<SelectableFile>) {
        self.dispatch(Msg::FilesAdded(files));
    }

    pub fn remove_file_named(&mut self, name: &str) -> Result<(), SessionError> {
        let id = self
            .state
            .files()
            .find_by_name(name)
            .ok_or_else(|| SessionError::UnknownFile(name.to_string()))?;
        self.dispatch(Msg::FileRemoved(id));
        Ok(())
    }

    /// Toggle the catalog operation with this id.
    pub fn toggle_action(&mut self, id: &str) -> Result<(), SessionError> {
        let key = self
            .state
            .catalog()
            .key_of(id)
            .ok_or_else(|| SessionError::UnknownAction(id.to_string()))?;
        courier_debug!("toggling action {} (key {})", id, key);
        self.dispatch(Msg::ActionToggled(key));
        Ok(())
    }

    /// Make sure the action is selected, toggling only if it is not.
    pub fn select_action(&mut self, id: &str) -> Result<(), SessionError> {
        let key = self
            .state
            .catalog()
            .key_of(id)
            .ok_or_else(|| SessionError::UnknownAction(id.to_string()))?;
        if !self.state.actions().contains(key) {
            self.dispatch(Msg::ActionToggled(key));
        }
        Ok(())
    }

    pub fn submit(&mut self) {
        self.dispatch(Msg::SubmitClicked);
    }

    pub fn cancel(&mut self) {
        self.dispatch(Msg::CancelClicked);
    }
}
