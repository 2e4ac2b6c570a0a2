//! Command handlers - business logic for processing UI events, network
//! responses and timers

use crate::app::notifications::{NotificationId, NotificationKind};
use crate::app::pagination::PageRequest;
use crate::app::region::RequestState;
use crate::app::scheduler::Timer;
use crate::app::state::{AppState, Effect};
use crate::constants::MISSING_PATIENT_ID;
use crate::messages::ui_events::{InputMode, Screen};
use crate::messages::{ApiOutcome, NetworkCommand, NetworkResponse};
use crate::models::{GenerateOptions, Theme};
use crate::ui;

const PREVIEW_FAILED: &str = "Failed to fetch patient data.";
const GENERATE_FAILED: &str = "Failed to generate summary. Please try again.";
const GENERATE_TIMED_OUT: &str = "Summary generation timed out. Please try again.";
const ADD_PATIENT_FAILED: &str = "Failed to add patient. Please try again.";
const UPLOAD_FAILED: &str = "Failed to upload test report. Please try again.";
const LOAD_MORE_FAILED: &str = "Failed to load more patients. Please try again.";
const DOWNLOAD_FAILED: &str = "Failed to download PDF. Please try again.";
const COPIED: &str = "Summary copied to clipboard!";
const COPY_FAILED: &str = "Failed to copy summary.";
const NO_SUMMARY: &str = "Generate a summary first";

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = InputMode::Normal;
        if screen == Screen::Database && !self.patients.has_loaded() {
            self.load_more();
        }
    }

    /// Follow a server-supplied location
    pub fn navigate(&mut self, location: &str) {
        match Screen::from_location(location) {
            Some(screen) => self.switch_screen(screen),
            None => {
                tracing::warn!(location, "Unknown redirect target, showing lookup");
                self.switch_screen(Screen::Lookup);
            }
        }
    }

    pub fn next_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.next_field();
        }
    }

    pub fn prev_field(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.prev_field();
        }
    }

    pub fn scroll_up(&mut self) {
        match self.screen {
            Screen::Database => self.table_scroll = self.table_scroll.saturating_sub(1),
            _ => self.result_scroll = self.result_scroll.saturating_sub(1),
        }
    }

    pub fn scroll_down(&mut self) {
        match self.screen {
            Screen::Database => self.table_scroll = self.table_scroll.saturating_add(1),
            _ => self.result_scroll = self.result_scroll.saturating_add(1),
        }
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_form().is_some() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        if let Some(form) = self.active_form_mut() {
            form.push_char(c);
        }
        self.after_edit();
    }

    pub fn delete_char(&mut self) {
        if let Some(form) = self.active_form_mut() {
            form.pop_char();
        }
        self.after_edit();
    }

    fn after_edit(&mut self) {
        let editing_patient_id = self.screen == Screen::Lookup
            && self.lookup.focused().map(|f| f.name) == Some("patient_id");
        if editing_patient_id {
            self.patient_id_changed();
        }
    }

    /// Patient id edits gate the lookup actions and clear the preview
    pub fn patient_id_changed(&mut self) {
        let patient_id = self.lookup.value("patient_id").trim();
        self.actions_enabled = !patient_id.is_empty();
        self.preview.reset();
        tracing::debug!(patient_id, enabled = self.actions_enabled, "Patient ID changed");
    }

    // ========================
    // Theme
    // ========================

    /// Install the palette derived from `theme`
    pub fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.palette = ui::palette(theme);
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.theme.toggle();
        self.apply_theme(theme);
        if let Err(e) = self.storage.save_theme(theme) {
            tracing::warn!("Failed to save theme preference: {}", e);
        }
    }

    // ========================
    // Notifications
    // ========================

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let id = self.notifications.push(message, kind);
        let after = self.config.notification_display;
        self.push_effect(Effect::Schedule {
            timer: Timer::NotificationExpire(id),
            after,
        });
        id
    }

    /// Start the exit path early. No-op once the notification is leaving
    /// or gone.
    pub fn dismiss(&mut self, id: NotificationId) {
        if self.begin_exit(id) {
            self.push_effect(Effect::Cancel(Timer::NotificationExpire(id)));
        }
    }

    pub fn dismiss_newest(&mut self) {
        if let Some(id) = self.notifications.newest_visible() {
            self.dismiss(id);
        }
    }

    fn begin_exit(&mut self, id: NotificationId) -> bool {
        if !self.notifications.begin_exit(id) {
            return false;
        }
        let after = self.config.notification_exit;
        self.push_effect(Effect::Schedule {
            timer: Timer::NotificationRemove(id),
            after,
        });
        true
    }

    // ========================
    // Timers
    // ========================

    pub fn handle_timer(&mut self, timer: Timer) {
        match timer {
            Timer::NotificationExpire(id) => {
                self.begin_exit(id);
            }
            Timer::NotificationRemove(id) => {
                self.notifications.remove(id);
            }
            Timer::GenerateDeadline(seq) => self.generate_timed_out(seq),
            Timer::Redirect(location) => self.navigate(&location),
        }
    }

    // ========================
    // Preview / generate
    // ========================

    fn lookup_patient_id(&mut self) -> Option<String> {
        let patient_id = self.lookup.value("patient_id").trim().to_string();
        if patient_id.is_empty() {
            self.notify(MISSING_PATIENT_ID, NotificationKind::Error);
            return None;
        }
        Some(patient_id)
    }

    pub fn preview(&mut self) {
        let Some(patient_id) = self.lookup_patient_id() else {
            return;
        };
        let seq = self.preview.begin();
        self.push_effect(Effect::Network(NetworkCommand::Preview { seq, patient_id }));
    }

    pub fn generate(&mut self) {
        let Some(patient_id) = self.lookup_patient_id() else {
            return;
        };

        let superseded = self.result.is_loading().then(|| self.result.latest_seq());
        let seq = self.result.begin();
        if let Some(old) = superseded {
            self.push_effect(Effect::Cancel(Timer::GenerateDeadline(old)));
            self.push_effect(Effect::Network(NetworkCommand::CancelGenerate(old)));
        }

        let options = GenerateOptions {
            detail_level: self.detail_level,
            doctor_notes: self.lookup.value("doctor_notes").to_string(),
            discharge_date: self.lookup.value("discharge_date").trim().to_string(),
        };
        self.result_scroll = 0;
        self.push_effect(Effect::Network(NetworkCommand::Generate {
            seq,
            patient_id,
            options,
        }));
        let after = self.config.generate_timeout;
        self.push_effect(Effect::Schedule {
            timer: Timer::GenerateDeadline(seq),
            after,
        });
    }

    fn generate_timed_out(&mut self, seq: u64) {
        if self
            .result
            .resolve(seq, RequestState::Failure(GENERATE_TIMED_OUT.to_string()))
        {
            tracing::warn!(seq, "Summary generation timed out");
            self.push_effect(Effect::Network(NetworkCommand::CancelGenerate(seq)));
        }
    }

    pub fn cycle_detail_level(&mut self) {
        self.detail_level = self.detail_level.next();
    }

    pub fn copy_summary(&mut self) {
        match self.result.state().success() {
            Some(reply) => {
                let text = reply.summary.clipboard_text();
                self.push_effect(Effect::CopyToClipboard(text));
            }
            None => {
                self.notify(NO_SUMMARY, NotificationKind::Error);
            }
        }
    }

    pub fn clipboard_result(&mut self, copied: bool) {
        if copied {
            self.notify(COPIED, NotificationKind::Success);
        } else {
            self.notify(COPY_FAILED, NotificationKind::Error);
        }
    }

    pub fn download_pdf(&mut self) {
        let token = self
            .result
            .state()
            .success()
            .and_then(|reply| reply.pdf_file.clone())
            .filter(|token| !token.trim().is_empty());
        let Some(token) = token else {
            self.notify(NO_SUMMARY, NotificationKind::Error);
            return;
        };
        if self.download.is_loading() {
            return;
        }

        let seq = self.download.begin();
        let dest_dir = self.config.download_dir.clone();
        self.push_effect(Effect::Network(NetworkCommand::DownloadPdf {
            seq,
            token,
            dest_dir,
        }));
    }

    // ========================
    // Forms
    // ========================

    pub fn submit_form(&mut self) {
        match self.screen {
            Screen::AddPatient => self.submit_patient(),
            Screen::UploadReport => self.submit_report(),
            _ => {}
        }
    }

    pub fn submit_patient(&mut self) {
        if self.patient_status.is_loading() {
            return;
        }
        if let Some(field) = self.patient_form.missing_required() {
            let message = field.missing_message();
            self.notify(message, NotificationKind::Error);
            return;
        }
        let seq = self.patient_status.begin();
        let form = self.patient_form.payload();
        self.push_effect(Effect::Network(NetworkCommand::AddPatient { seq, form }));
    }

    pub fn submit_report(&mut self) {
        if self.upload_status.is_loading() {
            return;
        }
        if let Some(field) = self.upload_form.missing_required() {
            let message = field.missing_message();
            self.notify(message, NotificationKind::Error);
            return;
        }
        let seq = self.upload_status.begin();
        let form = self.upload_form.payload();
        self.push_effect(Effect::Network(NetworkCommand::UploadTestReport { seq, form }));
    }

    // ========================
    // Patient table
    // ========================

    pub fn load_more(&mut self) {
        if let Some(request) = self.patients.begin_load() {
            self.push_effect(Effect::Network(NetworkCommand::LoadPatients {
                seq: request.seq,
                page: request.page,
            }));
        }
    }

    pub fn reload_patients(&mut self) {
        self.patients.reset();
        self.table_scroll = 0;
        self.load_more();
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) {
        tracing::debug!(seq = response.seq(), kind = response.kind(), "Network response");

        match response {
            NetworkResponse::Preview { seq, outcome } => {
                let state = match outcome {
                    ApiOutcome::Success(preview) => RequestState::Success(preview),
                    ApiOutcome::Rejected(error) => RequestState::Failure(error),
                    ApiOutcome::Failed(e) => {
                        tracing::warn!(seq, error = %e, "Preview request failed");
                        RequestState::Failure(PREVIEW_FAILED.to_string())
                    }
                };
                self.preview.resolve(seq, state);
            }

            NetworkResponse::Generate { seq, outcome } => {
                let state = match outcome {
                    ApiOutcome::Success(reply) => RequestState::Success(reply),
                    ApiOutcome::Rejected(error) => RequestState::Failure(error),
                    ApiOutcome::Failed(e) => {
                        tracing::warn!(seq, error = %e, "Generate request failed");
                        RequestState::Failure(GENERATE_FAILED.to_string())
                    }
                };
                if self.result.resolve(seq, state) {
                    self.push_effect(Effect::Cancel(Timer::GenerateDeadline(seq)));
                }
            }

            NetworkResponse::PatientAdded { seq, outcome } => {
                if !self.patient_status.accepts(seq) {
                    return;
                }
                match outcome {
                    ApiOutcome::Success(receipt) => {
                        let message = receipt
                            .message
                            .clone()
                            .unwrap_or_else(|| "Patient added".to_string());
                        self.notify(message, NotificationKind::Success);
                        if let Some(location) = receipt.redirect.clone() {
                            let after = self.config.redirect_delay;
                            self.push_effect(Effect::Schedule {
                                timer: Timer::Redirect(location),
                                after,
                            });
                        }
                        self.patient_status.resolve(seq, RequestState::Success(receipt));
                    }
                    ApiOutcome::Rejected(error) => {
                        let message = format!("Failed to add patient: {}", error);
                        self.notify(message.clone(), NotificationKind::Error);
                        self.patient_status.resolve(seq, RequestState::Failure(message));
                    }
                    ApiOutcome::Failed(e) => {
                        tracing::warn!(seq, error = %e, "Add patient request failed");
                        self.notify(ADD_PATIENT_FAILED, NotificationKind::Error);
                        self.patient_status
                            .resolve(seq, RequestState::Failure(ADD_PATIENT_FAILED.to_string()));
                    }
                }
            }

            NetworkResponse::ReportUploaded { seq, outcome } => {
                if !self.upload_status.accepts(seq) {
                    return;
                }
                match outcome {
                    ApiOutcome::Success(receipt) => {
                        let message = receipt
                            .message
                            .clone()
                            .unwrap_or_else(|| "Test report uploaded".to_string());
                        self.notify(message, NotificationKind::Success);
                        self.upload_form.reset();
                        self.upload_status.resolve(seq, RequestState::Success(receipt));
                    }
                    ApiOutcome::Rejected(error) => {
                        let message = format!("Failed to upload test report: {}", error);
                        self.notify(message.clone(), NotificationKind::Error);
                        self.upload_status.resolve(seq, RequestState::Failure(message));
                    }
                    ApiOutcome::Failed(e) => {
                        tracing::warn!(seq, error = %e, "Test report upload failed");
                        self.notify(UPLOAD_FAILED, NotificationKind::Error);
                        self.upload_status
                            .resolve(seq, RequestState::Failure(UPLOAD_FAILED.to_string()));
                    }
                }
            }

            NetworkResponse::PatientsPage { seq, page, outcome } => {
                let request = PageRequest { seq, page };
                match outcome {
                    ApiOutcome::Success(patients) => {
                        if let Some(appended) = self.patients.apply_page(request, patients) {
                            tracing::info!(page, appended, has_more = self.patients.cursor().has_more, "Patients appended");
                        }
                    }
                    ApiOutcome::Rejected(error) => {
                        if self.patients.fail(request) {
                            self.notify(
                                format!("Failed to load more patients: {}", error),
                                NotificationKind::Error,
                            );
                        }
                    }
                    ApiOutcome::Failed(e) => {
                        if self.patients.fail(request) {
                            tracing::warn!(seq, page, error = %e, "Patient page request failed");
                            self.notify(LOAD_MORE_FAILED, NotificationKind::Error);
                        }
                    }
                }
            }

            NetworkResponse::PdfDownloaded { seq, outcome } => {
                if !self.download.accepts(seq) {
                    return;
                }
                match outcome {
                    Ok(path) => {
                        self.notify(
                            format!("Summary PDF saved to {}", path.display()),
                            NotificationKind::Success,
                        );
                        self.download.resolve(seq, RequestState::Success(path));
                    }
                    Err(e) => {
                        tracing::warn!(seq, error = %e, "PDF download failed");
                        self.notify(DOWNLOAD_FAILED, NotificationKind::Error);
                        self.download
                            .resolve(seq, RequestState::Failure(DOWNLOAD_FAILED.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pagination::LoadMore;
    use crate::config::ClientConfig;
    use crate::models::{DischargeSummary, GenerateReply, PatientPage, PatientPreview, PatientRow, SubmitReceipt};
    use crate::network::TransportError;
    use crate::storage::Storage;
    use std::time::Duration;

    fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(ClientConfig::default(), Storage::at(dir.path()));
        (state, dir)
    }

    fn type_patient_id(state: &mut AppState, id: &str) {
        state.lookup.focus = 0;
        for c in id.chars() {
            state.enter_char(c);
        }
    }

    fn network_commands(effects: &[Effect]) -> Vec<NetworkCommand> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Network(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn messages(state: &AppState) -> Vec<String> {
        state.notifications.items().iter().map(|n| n.message.clone()).collect()
    }

    #[test]
    fn test_blank_patient_id_never_reaches_network() {
        for blank in ["", "   ", "\t"] {
            let (mut state, _dir) = state();
            type_patient_id(&mut state, blank);
            state.take_effects();

            state.preview();
            state.generate();

            let effects = state.take_effects();
            assert!(network_commands(&effects).is_empty());
            assert_eq!(messages(&state), vec![MISSING_PATIENT_ID, MISSING_PATIENT_ID]);
            assert!(!state.preview.is_loading());
            assert!(!state.result.is_loading());
        }
    }

    #[test]
    fn test_preview_renders_patient_fields() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "P100");
        state.take_effects();

        state.preview();
        assert!(state.preview.is_loading());
        let commands = network_commands(&state.take_effects());
        assert_eq!(
            commands,
            vec![NetworkCommand::Preview {
                seq: state.preview.latest_seq(),
                patient_id: "P100".into()
            }]
        );

        let preview: PatientPreview = serde_json::from_str(
            r#"{"name":"Jane Doe","sex":"F","age":45,"state":"Telangana","disease":"Hypertension"}"#,
        )
        .unwrap();
        state.handle_response(NetworkResponse::Preview {
            seq: state.preview.latest_seq(),
            outcome: ApiOutcome::Success(preview),
        });

        let shown = state.preview.state().success().unwrap();
        let fields = shown.fields(&state.config.base_url);
        assert_eq!(fields[0], ("Name", "Jane Doe".to_string()));
        assert_eq!(fields[2], ("Age", "45".to_string()));
        assert!(state.preview.state().failure().is_none());
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_stale_preview_is_discarded() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "7");
        state.preview();
        let first = state.preview.latest_seq();
        state.preview();
        let second = state.preview.latest_seq();

        let named = |name: &str| PatientPreview {
            name: Some(name.to_string()),
            ..Default::default()
        };
        state.handle_response(NetworkResponse::Preview {
            seq: second,
            outcome: ApiOutcome::Success(named("newer")),
        });
        state.handle_response(NetworkResponse::Preview {
            seq: first,
            outcome: ApiOutcome::Success(named("older")),
        });

        let shown = state.preview.state().success().unwrap();
        assert_eq!(shown.name.as_deref(), Some("newer"));
    }

    #[test]
    fn test_application_error_and_transport_error_stay_distinct() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "9");

        state.preview();
        state.handle_response(NetworkResponse::Preview {
            seq: state.preview.latest_seq(),
            outcome: ApiOutcome::Rejected("No patient found with ID 9".into()),
        });
        assert_eq!(state.preview.state().failure(), Some("No patient found with ID 9"));

        state.preview();
        state.handle_response(NetworkResponse::Preview {
            seq: state.preview.latest_seq(),
            outcome: ApiOutcome::Failed(TransportError::Status {
                status: 404,
                detail: Some("No patient found with ID 9".into()),
            }),
        });
        assert_eq!(state.preview.state().failure(), Some(PREVIEW_FAILED));
    }

    #[test]
    fn test_editing_patient_id_toggles_actions_and_clears_preview() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "5");
        assert!(state.actions_enabled);

        state.preview();
        let seq = state.preview.latest_seq();
        state.delete_char();
        assert!(!state.actions_enabled);

        state.handle_response(NetworkResponse::Preview {
            seq,
            outcome: ApiOutcome::Success(PatientPreview::default()),
        });
        assert_eq!(state.preview.state(), &RequestState::Idle);
    }

    #[test]
    fn test_generate_schedules_deadline_and_late_success_is_dropped() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "12");
        state.take_effects();

        state.generate();
        let seq = state.result.latest_seq();
        let effects = state.take_effects();
        assert!(effects.contains(&Effect::Schedule {
            timer: Timer::GenerateDeadline(seq),
            after: Duration::from_secs(60),
        }));

        state.handle_timer(Timer::GenerateDeadline(seq));
        assert_eq!(state.result.state().failure(), Some(GENERATE_TIMED_OUT));
        assert_eq!(
            network_commands(&state.take_effects()),
            vec![NetworkCommand::CancelGenerate(seq)]
        );

        state.handle_response(NetworkResponse::Generate {
            seq,
            outcome: ApiOutcome::Success(GenerateReply::default()),
        });
        assert_eq!(state.result.state().failure(), Some(GENERATE_TIMED_OUT));
    }

    #[test]
    fn test_regenerate_cancels_superseded_wait() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "12");
        state.generate();
        let first = state.result.latest_seq();
        state.take_effects();

        state.generate();
        let effects = state.take_effects();
        assert!(effects.contains(&Effect::Cancel(Timer::GenerateDeadline(first))));
        assert!(effects.contains(&Effect::Network(NetworkCommand::CancelGenerate(first))));
    }

    #[test]
    fn test_copy_summary_uses_fixed_field_order() {
        let (mut state, _dir) = state();
        type_patient_id(&mut state, "12");
        state.generate();
        let reply = GenerateReply {
            summary: DischargeSummary {
                hpi: Some("Presented with chest pain".into()),
                ..Default::default()
            },
            pdf_file: Some("discharge_summary.pdf".into()),
        };
        state.handle_response(NetworkResponse::Generate {
            seq: state.result.latest_seq(),
            outcome: ApiOutcome::Success(reply.clone()),
        });
        state.take_effects();

        state.copy_summary();
        assert_eq!(
            state.take_effects(),
            vec![Effect::CopyToClipboard(reply.summary.clipboard_text())]
        );
    }

    #[test]
    fn test_dismiss_follows_exit_path_once() {
        let (mut state, _dir) = state();
        let id = state.notify("Saved", NotificationKind::Success);
        state.take_effects();

        state.dismiss(id);
        let effects = state.take_effects();
        assert_eq!(
            effects,
            vec![
                Effect::Schedule {
                    timer: Timer::NotificationRemove(id),
                    after: Duration::from_millis(500),
                },
                Effect::Cancel(Timer::NotificationExpire(id)),
            ]
        );

        state.dismiss(id);
        state.handle_timer(Timer::NotificationExpire(id));
        assert!(state.take_effects().is_empty());

        state.handle_timer(Timer::NotificationRemove(id));
        assert!(state.notifications.is_empty());
        state.handle_timer(Timer::NotificationRemove(id));
    }

    #[test]
    fn test_duplicate_patient_notifies_without_redirect() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::AddPatient);
        state.patient_form.set("name", "Jane Doe");
        state.submit_form();
        let seq = state.patient_status.latest_seq();
        state.take_effects();

        state.handle_response(NetworkResponse::PatientAdded {
            seq,
            outcome: ApiOutcome::Rejected("Duplicate ID".into()),
        });

        assert_eq!(messages(&state), vec!["Failed to add patient: Duplicate ID"]);
        let effects = state.take_effects();
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::Schedule { timer: Timer::Redirect(_), .. })));
        assert_eq!(state.patient_form.value("name"), "Jane Doe");
    }

    #[test]
    fn test_added_patient_schedules_redirect() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::AddPatient);
        state.patient_form.set("name", "Jane Doe");
        state.submit_form();
        let seq = state.patient_status.latest_seq();
        state.take_effects();

        state.handle_response(NetworkResponse::PatientAdded {
            seq,
            outcome: ApiOutcome::Success(SubmitReceipt {
                message: Some("Patient added with ID 101".into()),
                redirect: Some("/".into()),
            }),
        });

        assert_eq!(messages(&state), vec!["Patient added with ID 101"]);
        assert!(state.take_effects().contains(&Effect::Schedule {
            timer: Timer::Redirect("/".into()),
            after: Duration::from_millis(2000),
        }));

        state.handle_timer(Timer::Redirect("/".into()));
        assert_eq!(state.screen, Screen::Lookup);
        assert_eq!(state.patient_status.state().success().and_then(|r| r.redirect.as_deref()), Some("/"));
    }

    #[test]
    fn test_missing_form_fields_block_submission() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::UploadReport);
        state.submit_form();
        assert!(network_commands(&state.take_effects()).is_empty());
        assert_eq!(messages(&state), vec![MISSING_PATIENT_ID]);
    }

    #[test]
    fn test_upload_success_resets_form_and_failure_keeps_it() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::UploadReport);
        state.upload_form.set("patient_id", "3");
        state.upload_form.set("test_report", "/tmp/cbc.pdf");

        state.submit_form();
        state.handle_response(NetworkResponse::ReportUploaded {
            seq: state.upload_status.latest_seq(),
            outcome: ApiOutcome::Failed(TransportError::Timeout),
        });
        assert_eq!(state.upload_form.value("patient_id"), "3");
        assert_eq!(messages(&state), vec![UPLOAD_FAILED]);

        state.submit_form();
        state.handle_response(NetworkResponse::ReportUploaded {
            seq: state.upload_status.latest_seq(),
            outcome: ApiOutcome::Success(SubmitReceipt {
                message: Some("Test report uploaded for Patient ID 3".into()),
                redirect: None,
            }),
        });
        assert_eq!(state.upload_form.value("patient_id"), "");
        assert_eq!(state.upload_form.value("test_report"), "");
    }

    #[test]
    fn test_second_submit_while_in_flight_is_refused() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::AddPatient);
        state.patient_form.set("name", "A");
        state.submit_form();
        state.submit_form();
        assert_eq!(network_commands(&state.take_effects()).len(), 1);
    }

    #[test]
    fn test_last_page_removes_load_more() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::Database);
        let first = network_commands(&state.take_effects());
        assert_eq!(first, vec![NetworkCommand::LoadPatients { seq: 1, page: 1 }]);

        state.handle_response(NetworkResponse::PatientsPage {
            seq: 1,
            page: 1,
            outcome: ApiOutcome::Success(PatientPage {
                patients: vec![PatientRow::default(); 100],
                has_more: true,
                next_page: Some(2),
            }),
        });

        state.load_more();
        let second = network_commands(&state.take_effects());
        assert_eq!(second, vec![NetworkCommand::LoadPatients { seq: 2, page: 2 }]);

        state.handle_response(NetworkResponse::PatientsPage {
            seq: 2,
            page: 2,
            outcome: ApiOutcome::Success(PatientPage {
                patients: vec![PatientRow::default(); 3],
                has_more: false,
                next_page: Some(3),
            }),
        });

        assert_eq!(state.patients.rows().len(), 103);
        assert_eq!(state.patients.load_more(), LoadMore::Removed);
        state.load_more();
        assert!(network_commands(&state.take_effects()).is_empty());
    }

    #[test]
    fn test_page_error_notifies_and_allows_retry() {
        let (mut state, _dir) = state();
        state.switch_screen(Screen::Database);
        state.take_effects();

        state.handle_response(NetworkResponse::PatientsPage {
            seq: 1,
            page: 1,
            outcome: ApiOutcome::Rejected("Failed to load patient database".into()),
        });
        assert_eq!(
            messages(&state),
            vec!["Failed to load more patients: Failed to load patient database"]
        );
        assert_eq!(state.patients.cursor().next_page, 1);

        state.load_more();
        assert_eq!(
            network_commands(&state.take_effects()),
            vec![NetworkCommand::LoadPatients { seq: 2, page: 1 }]
        );
    }

    #[test]
    fn test_toggle_theme_persists_and_applies() {
        let (mut state, dir) = state();
        assert_eq!(state.theme, Theme::Light);
        state.toggle_theme();
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(state.palette, ui::palette(Theme::Dark));
        assert_eq!(Storage::at(dir.path()).load_theme(), Theme::Dark);
    }

    #[test]
    fn test_download_requires_generated_summary() {
        let (mut state, _dir) = state();
        state.download_pdf();
        assert!(network_commands(&state.take_effects()).is_empty());
        assert_eq!(messages(&state), vec![NO_SUMMARY]);
    }
}
