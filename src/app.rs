use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::fetcher::read_records_file;
use crate::services::ReportService;

/// Running HTTP server serving one energy report
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Load the report JSON and spawn the HTTP API server
    ///
    /// The records file is read once; restart to pick up a new conversion.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let records_path = config.records_path.clone();
        let records =
            tokio::task::spawn_blocking(move || read_records_file(&records_path)).await??;
        info!(
            "Loaded {} records from {}",
            records.len(),
            config.records_path.display()
        );

        let report_service = ReportService::new(records)
            .with_display_timezone(config.display_timezone)
            .with_invalid_date_policy(config.invalid_date_policy);

        let app_state = AppState { report_service };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        // Spawn server
        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let server_handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await
        });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Run until the server stops (which runs indefinitely unless error)
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
