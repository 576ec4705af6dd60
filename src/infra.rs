use ldap_provisioning::directory::{DirectoryClient, DirectoryConnector, DirectoryLayout};
use ldap_provisioning::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) directory: Arc<dyn DirectoryConnector>,
    pub(crate) layout: DirectoryLayout,
    /// Held for the whole of each directory unit of work.
    batch_gate: Arc<Mutex<()>>,
}

impl AppState {
    pub(crate) fn new(
        readiness: Arc<AtomicBool>,
        metrics: Arc<PrometheusHandle>,
        directory: Arc<dyn DirectoryConnector>,
        layout: DirectoryLayout,
    ) -> Self {
        Self {
            readiness,
            metrics,
            directory,
            layout,
            batch_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Opens a session on the blocking pool and runs `work` against it. Units
    /// of work never overlap; the session is released when `work` returns.
    pub(crate) async fn with_directory<T, F>(&self, work: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut (dyn DirectoryClient + Send), &DirectoryLayout) -> Result<T, AppError>
            + Send
            + 'static,
    {
        let connector = Arc::clone(&self.directory);
        let layout = self.layout.clone();
        let gate = Arc::clone(&self.batch_gate);

        tokio::task::spawn_blocking(move || {
            let _guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
            let mut session = connector.open()?;
            work(session.as_mut(), &layout)
        })
        .await
        .map_err(|err| AppError::Runtime(format!("directory task failed: {err}")))?
    }
}
