//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Top-level screens
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Screen {
    #[default]
    Lookup,
    AddPatient,
    UploadReport,
    Database,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Lookup,
        Screen::AddPatient,
        Screen::UploadReport,
        Screen::Database,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Lookup => "Summary",
            Screen::AddPatient => "Add Patient",
            Screen::UploadReport => "Upload Report",
            Screen::Database => "Patients",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Screen::Lookup => 0,
            Screen::AddPatient => 1,
            Screen::UploadReport => 2,
            Screen::Database => 3,
        }
    }

    /// Map a server-supplied location onto a screen
    pub fn from_location(location: &str) -> Option<Screen> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .trim_end_matches('/');
        match path {
            "" | "/index" => Some(Screen::Lookup),
            "/add_patient" => Some(Screen::AddPatient),
            "/upload_test_report" => Some(Screen::UploadReport),
            "/view_database" => Some(Screen::Database),
            _ => None,
        }
    }
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Named user actions generated in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    SwitchScreen(Screen),
    NextField,
    PrevField,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,

    // Summary screen
    Preview,
    Generate,
    CycleDetailLevel,
    CopySummary,
    DownloadPdf,

    // Forms
    SubmitForm,

    // Patient table
    LoadMore,
    ReloadPatients,

    // Notifications
    DismissNotification,

    // Preferences
    ToggleTheme,

    // System
    Quit,
}

/// Convert a key event to a UI event based on current context
pub fn key_to_ui_event(key: KeyEvent, screen: Screen, input_mode: InputMode) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    if input_mode == InputMode::Editing {
        return match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(UiEvent::StopEditing),
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::BackTab => Some(UiEvent::PrevField),
            KeyCode::Backspace => Some(UiEvent::Backspace),
            KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
            _ => None,
        };
    }

    let global = match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('1') => Some(UiEvent::SwitchScreen(Screen::Lookup)),
        KeyCode::Char('2') => Some(UiEvent::SwitchScreen(Screen::AddPatient)),
        KeyCode::Char('3') => Some(UiEvent::SwitchScreen(Screen::UploadReport)),
        KeyCode::Char('4') => Some(UiEvent::SwitchScreen(Screen::Database)),
        KeyCode::Char('t') => Some(UiEvent::ToggleTheme),
        KeyCode::Char('x') => Some(UiEvent::DismissNotification),
        KeyCode::Up => Some(UiEvent::ScrollUp),
        KeyCode::Down => Some(UiEvent::ScrollDown),
        _ => None,
    };
    if global.is_some() {
        return global;
    }

    match screen {
        Screen::Lookup => match key.code {
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::BackTab => Some(UiEvent::PrevField),
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('p') => Some(UiEvent::Preview),
            KeyCode::Char('g') => Some(UiEvent::Generate),
            KeyCode::Char('d') => Some(UiEvent::CycleDetailLevel),
            KeyCode::Char('c') => Some(UiEvent::CopySummary),
            KeyCode::Char('o') => Some(UiEvent::DownloadPdf),
            _ => None,
        },
        Screen::AddPatient | Screen::UploadReport => match key.code {
            KeyCode::Tab => Some(UiEvent::NextField),
            KeyCode::BackTab => Some(UiEvent::PrevField),
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('s') => Some(UiEvent::SubmitForm),
            _ => None,
        },
        Screen::Database => match key.code {
            KeyCode::Char('m') | KeyCode::Enter => Some(UiEvent::LoadMore),
            KeyCode::Char('r') => Some(UiEvent::ReloadPatients),
            _ => None,
        },
    }
}
