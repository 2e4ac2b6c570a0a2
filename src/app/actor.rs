//! App actor - message loop processing UI events, network responses and timers

use tokio::sync::mpsc;

use crate::app::scheduler::{Fired, Scheduler};
use crate::app::state::{AppState, Effect};
use crate::config::ClientConfig;
use crate::messages::ui_events::InputMode;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use crate::storage::Storage;

/// Destination for copied summaries
pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> anyhow::Result<()>;
}

/// App actor that owns the state, its timers and the clipboard
pub struct AppActor {
    state: AppState,
    scheduler: Scheduler,
    timer_rx: mpsc::UnboundedReceiver<Fired>,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
    clipboard: Box<dyn Clipboard>,
}

impl AppActor {
    pub fn new(
        config: ClientConfig,
        storage: Storage,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        AppActor {
            state: AppState::new(config, storage),
            scheduler: Scheduler::new(timer_tx),
            timer_rx,
            network_tx,
            render_tx,
            clipboard,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        self.scheduler.cancel_all();
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                }
                Some(response) = net_rx.recv() => {
                    self.state.handle_response(response);
                }
                Some(fired) = self.timer_rx.recv() => {
                    if self.scheduler.fired(&fired) {
                        self.state.handle_timer(fired.timer);
                    }
                }
                else => break,
            }

            self.flush_effects();
            let _ = self.render_tx.send(self.state.to_render_state());
        }
    }

    /// Execute queued effects until handlers stop producing new ones
    fn flush_effects(&mut self) {
        loop {
            let effects = self.state.take_effects();
            if effects.is_empty() {
                break;
            }
            for effect in effects {
                match effect {
                    Effect::Network(cmd) => {
                        let _ = self.network_tx.send(cmd);
                    }
                    Effect::Schedule { timer, after } => self.scheduler.schedule(timer, after),
                    Effect::Cancel(timer) => {
                        self.scheduler.cancel(&timer);
                    }
                    Effect::CopyToClipboard(text) => {
                        let copied = match self.clipboard.copy(&text) {
                            Ok(()) => true,
                            Err(e) => {
                                tracing::warn!("Clipboard write failed: {}", e);
                                false
                            }
                        };
                        self.state.clipboard_result(copied);
                    }
                }
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Navigation
            UiEvent::SwitchScreen(screen) => self.state.switch_screen(screen),
            UiEvent::NextField => self.state.next_field(),
            UiEvent::PrevField => self.state.prev_field(),
            UiEvent::ScrollUp => self.state.scroll_up(),
            UiEvent::ScrollDown => self.state.scroll_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),

            // Summary screen
            UiEvent::Preview => {
                self.stop_editing_if_needed();
                self.state.preview();
            }
            UiEvent::Generate => {
                self.stop_editing_if_needed();
                self.state.generate();
            }
            UiEvent::CycleDetailLevel => self.state.cycle_detail_level(),
            UiEvent::CopySummary => self.state.copy_summary(),
            UiEvent::DownloadPdf => self.state.download_pdf(),

            // Forms
            UiEvent::SubmitForm => {
                self.stop_editing_if_needed();
                self.state.submit_form();
            }

            // Patient table
            UiEvent::LoadMore => self.state.load_more(),
            UiEvent::ReloadPatients => self.state.reload_patients(),

            UiEvent::DismissNotification => self.state.dismiss_newest(),
            UiEvent::ToggleTheme => self.state.toggle_theme(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }

    fn stop_editing_if_needed(&mut self) {
        if self.state.input_mode == InputMode::Editing {
            self.state.stop_editing();
        }
    }
}
