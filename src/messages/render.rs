//! Render state - data structure sent from App layer to UI for rendering

use crate::app::forms::FormDraft;
use crate::app::notifications::Notification;
use crate::app::pagination::LoadMore;
use crate::app::region::RequestState;
use crate::constants::DEFAULT_BASE_URL;
use crate::messages::ui_events::{InputMode, Screen};
use crate::models::{DetailLevel, GenerateReply, PatientPreview, PatientRow, SubmitReceipt, Theme};
use crate::ui::{self, Palette};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub palette: Palette,
    /// Used to resolve test report links in the preview
    pub base_url: String,

    // Summary screen
    pub lookup: FormDraft,
    pub actions_enabled: bool,
    pub detail_level: DetailLevel,
    pub preview: RequestState<PatientPreview>,
    pub result: RequestState<GenerateReply>,
    pub result_scroll: u16,
    pub downloading: bool,

    // Forms
    pub patient_form: FormDraft,
    pub patient_status: RequestState<SubmitReceipt>,
    pub upload_form: FormDraft,
    pub upload_status: RequestState<SubmitReceipt>,

    // Patient table
    pub rows: Vec<PatientRow>,
    pub load_more: LoadMore,
    pub table_scroll: u16,

    pub notifications: Vec<Notification>,
}

impl Default for RenderState {
    fn default() -> Self {
        let theme = Theme::default();
        RenderState {
            screen: Screen::default(),
            input_mode: InputMode::default(),
            theme,
            palette: ui::palette(theme),
            base_url: DEFAULT_BASE_URL.to_string(),
            lookup: FormDraft::lookup(),
            actions_enabled: false,
            detail_level: DetailLevel::default(),
            preview: RequestState::Idle,
            result: RequestState::Idle,
            result_scroll: 0,
            downloading: false,
            patient_form: FormDraft::patient_intake(),
            patient_status: RequestState::Idle,
            upload_form: FormDraft::report_upload(),
            upload_status: RequestState::Idle,
            rows: Vec::new(),
            load_more: LoadMore::default(),
            table_scroll: 0,
            notifications: Vec::new(),
        }
    }
}

