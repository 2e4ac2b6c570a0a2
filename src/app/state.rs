//! App state - pure data structure with no I/O logic
//!
//! Handlers never talk to the network or the clock directly; they queue
//! [`Effect`]s that the App actor executes after each event.

use std::path::PathBuf;
use std::time::Duration;

use crate::app::forms::FormDraft;
use crate::app::notifications::NotificationCenter;
use crate::app::pagination::PatientTable;
use crate::app::region::{Region, RegionId};
use crate::app::scheduler::Timer;
use crate::config::ClientConfig;
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::{NetworkCommand, RenderState};
use crate::models::{DetailLevel, GenerateReply, PatientPreview, SubmitReceipt, Theme};
use crate::storage::Storage;
use crate::ui::{self, Palette};

/// Side effects requested by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Network(NetworkCommand),
    Schedule { timer: Timer, after: Duration },
    Cancel(Timer),
    CopyToClipboard(String),
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub config: ClientConfig,

    // Navigation
    pub screen: Screen,
    pub input_mode: InputMode,

    // Preferences
    pub storage: Storage,
    pub theme: Theme,
    pub palette: Palette,

    // Summary screen
    pub lookup: FormDraft,
    pub actions_enabled: bool,
    pub detail_level: DetailLevel,
    pub preview: Region<PatientPreview>,
    pub result: Region<GenerateReply>,
    pub result_scroll: u16,
    pub download: Region<PathBuf>,

    // Forms
    pub patient_form: FormDraft,
    pub patient_status: Region<SubmitReceipt>,
    pub upload_form: FormDraft,
    pub upload_status: Region<SubmitReceipt>,

    // Patient table
    pub patients: PatientTable,
    pub table_scroll: u16,

    pub notifications: NotificationCenter,

    effects: Vec<Effect>,
}

impl AppState {
    pub fn new(config: ClientConfig, storage: Storage) -> Self {
        let theme = storage.load_theme();
        let mut state = AppState {
            config,
            screen: Screen::Lookup,
            input_mode: InputMode::Normal,
            storage,
            theme,
            palette: ui::palette(theme),
            lookup: FormDraft::lookup(),
            actions_enabled: false,
            detail_level: DetailLevel::default(),
            preview: Region::new(RegionId::Preview),
            result: Region::new(RegionId::Result),
            result_scroll: 0,
            download: Region::new(RegionId::PdfDownload),
            patient_form: FormDraft::patient_intake(),
            patient_status: Region::new(RegionId::PatientForm),
            upload_form: FormDraft::report_upload(),
            upload_status: Region::new(RegionId::UploadForm),
            patients: PatientTable::new(),
            table_scroll: 0,
            notifications: NotificationCenter::new(),
            effects: Vec::new(),
        };
        state.apply_theme(theme);
        state
    }

    pub(crate) fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Drain queued effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Form shown on the active screen
    pub fn active_form(&self) -> Option<&FormDraft> {
        match self.screen {
            Screen::Lookup => Some(&self.lookup),
            Screen::AddPatient => Some(&self.patient_form),
            Screen::UploadReport => Some(&self.upload_form),
            Screen::Database => None,
        }
    }

    pub fn active_form_mut(&mut self) -> Option<&mut FormDraft> {
        match self.screen {
            Screen::Lookup => Some(&mut self.lookup),
            Screen::AddPatient => Some(&mut self.patient_form),
            Screen::UploadReport => Some(&mut self.upload_form),
            Screen::Database => None,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            screen: self.screen,
            input_mode: self.input_mode,
            theme: self.theme,
            palette: self.palette,
            base_url: self.config.base_url.clone(),
            lookup: self.lookup.clone(),
            actions_enabled: self.actions_enabled,
            detail_level: self.detail_level,
            preview: self.preview.state().clone(),
            result: self.result.state().clone(),
            result_scroll: self.result_scroll,
            downloading: self.download.is_loading(),
            patient_form: self.patient_form.clone(),
            patient_status: self.patient_status.state().clone(),
            upload_form: self.upload_form.clone(),
            upload_status: self.upload_status.state().clone(),
            rows: self.patients.rows().to_vec(),
            load_more: self.patients.load_more(),
            table_scroll: self.table_scroll,
            notifications: self.notifications.items().to_vec(),
        }
    }
}
