//! Network actor - runs backend calls in the Tokio async runtime

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::config::ClientConfig;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::BackendClient;

/// Tracks an outstanding `/generate` wait for cancellation
struct ActiveRequest {
    cancel_tx: oneshot::Sender<()>,
}

/// Network actor that processes backend commands
pub struct NetworkActor {
    client: BackendClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
    cancel_handles: HashMap<u64, ActiveRequest>,
}

impl NetworkActor {
    pub fn new(config: ClientConfig, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client: BackendClient::new(config),
            response_tx,
            active_requests: JoinSet::new(),
            cancel_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => {
                            for (_, active) in self.cancel_handles.drain() {
                                let _ = active.cancel_tx.send(());
                            }
                            self.active_requests.abort_all();
                            break;
                        }
                        Some(cmd) => self.dispatch(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {
                    self.cancel_handles.retain(|_, active| !active.cancel_tx.is_closed());
                }
            }
        }
    }

    fn dispatch(&mut self, cmd: NetworkCommand) {
        let client = self.client.clone();
        let response_tx = self.response_tx.clone();

        match cmd {
            NetworkCommand::Preview { seq, patient_id } => {
                self.active_requests.spawn(async move {
                    tracing::info!(seq, patient_id = %patient_id, "Requesting preview");
                    let outcome = client.preview(&patient_id).await;
                    let _ = response_tx.send(NetworkResponse::Preview { seq, outcome });
                });
            }

            NetworkCommand::Generate { seq, patient_id, options } => {
                let (cancel_tx, cancel_rx) = oneshot::channel();
                self.cancel_handles.insert(seq, ActiveRequest { cancel_tx });

                self.active_requests.spawn(async move {
                    tracing::info!(seq, patient_id = %patient_id, detail_level = options.detail_level.as_str(), "Requesting summary");
                    tokio::select! {
                        _ = cancel_rx => {
                            tracing::info!(seq, "Stopped waiting for summary");
                        }
                        outcome = client.generate(&patient_id, &options) => {
                            let _ = response_tx.send(NetworkResponse::Generate { seq, outcome });
                        }
                    }
                });
            }

            NetworkCommand::CancelGenerate(seq) => {
                if let Some(active) = self.cancel_handles.remove(&seq) {
                    tracing::info!(seq, "Cancelling summary request");
                    let _ = active.cancel_tx.send(());
                }
            }

            NetworkCommand::AddPatient { seq, form } => {
                self.active_requests.spawn(async move {
                    tracing::info!(seq, fields = form.fields.len(), attachment = form.attachment.is_some(), "Submitting new patient");
                    let outcome = client.add_patient(&form).await;
                    let _ = response_tx.send(NetworkResponse::PatientAdded { seq, outcome });
                });
            }

            NetworkCommand::UploadTestReport { seq, form } => {
                self.active_requests.spawn(async move {
                    tracing::info!(seq, patient_id = form.get("patient_id").unwrap_or(""), "Uploading test report");
                    let outcome = client.upload_test_report(&form).await;
                    let _ = response_tx.send(NetworkResponse::ReportUploaded { seq, outcome });
                });
            }

            NetworkCommand::LoadPatients { seq, page } => {
                self.active_requests.spawn(async move {
                    tracing::info!(seq, page, "Loading patient page");
                    let outcome = client.view_database(page).await;
                    let _ = response_tx.send(NetworkResponse::PatientsPage { seq, page, outcome });
                });
            }

            NetworkCommand::DownloadPdf { seq, token, dest_dir } => {
                self.active_requests.spawn(async move {
                    tracing::info!(seq, token = %token, "Downloading summary PDF");
                    let outcome = client.download_pdf(&token, &dest_dir).await;
                    let _ = response_tx.send(NetworkResponse::PdfDownloaded { seq, outcome });
                });
            }

            NetworkCommand::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::net::TcpListener;

    use crate::models::{DetailLevel, GenerateOptions};

    /// Backend that accepts connections and never answers
    async fn silent_backend() -> ClientConfig {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let mut config = ClientConfig::default().with_base_url(format!("http://{addr}"));
        config.request_timeout = Duration::from_secs(300);
        config
    }

    fn generate(seq: u64) -> NetworkCommand {
        NetworkCommand::Generate {
            seq,
            patient_id: "P100".into(),
            options: GenerateOptions {
                detail_level: DetailLevel::Brief,
                doctor_notes: String::new(),
                discharge_date: "2024-05-01".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_cancel_generate_stops_pending_request() {
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let mut actor = NetworkActor::new(silent_backend().await, resp_tx);

        actor.dispatch(generate(1));
        assert!(actor.cancel_handles.contains_key(&1));

        actor.dispatch(NetworkCommand::CancelGenerate(1));
        assert!(actor.cancel_handles.is_empty());

        let joined = tokio::time::timeout(Duration::from_secs(5), actor.active_requests.join_next())
            .await
            .expect("generate task still waiting after cancel");
        assert!(joined.unwrap().is_ok());
        assert!(resp_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_of_unknown_sequence_leaves_others_running() {
        let (resp_tx, _resp_rx) = mpsc::unbounded_channel();
        let mut actor = NetworkActor::new(silent_backend().await, resp_tx);

        actor.dispatch(generate(2));
        actor.dispatch(NetworkCommand::CancelGenerate(1));

        assert!(actor.cancel_handles.contains_key(&2));
        assert_eq!(actor.active_requests.len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_abandons_in_flight_requests() {
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let actor = NetworkActor::new(silent_backend().await, resp_tx);
        let running = tokio::spawn(actor.run(cmd_rx));

        cmd_tx.send(generate(1)).unwrap();
        cmd_tx
            .send(NetworkCommand::Preview { seq: 2, patient_id: "P100".into() })
            .unwrap();
        cmd_tx.send(NetworkCommand::Shutdown).unwrap();

        tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("actor kept running after shutdown")
            .unwrap();

        // Every sender is gone once the aborted tasks are dropped
        let next = tokio::time::timeout(Duration::from_secs(5), resp_rx.recv())
            .await
            .expect("response channel still open");
        assert!(next.is_none());
    }
}
