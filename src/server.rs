use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ldap_provisioning::config::AppConfig;
use ldap_provisioning::directory::LdapConnector;
use ldap_provisioning::error::AppError;
use ldap_provisioning::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<(), AppError> {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let app_state = AppState::new(
        readiness_flag.clone(),
        Arc::new(prometheus_handle),
        Arc::new(LdapConnector::new(config.ldap.clone())),
        config.ldap.layout(),
    );

    let app = router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        directory = %config.ldap.url,
        bind_dn = %config.ldap.bind_dn,
        "ldap provisioner ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
