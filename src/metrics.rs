use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::MetricsConfig;

pub const UPLOADS_TOTAL: &str = "intake_uploads_total";
pub const UPLOAD_REJECTIONS_TOTAL: &str = "intake_upload_rejections_total";
pub const ROWS_VALID_TOTAL: &str = "intake_rows_valid_total";
pub const ROWS_MISSING_TOTAL: &str = "intake_rows_missing_total";
pub const ROWS_DROPPED_TOTAL: &str = "intake_rows_dropped_total";

/// Install the Prometheus exporter when enabled in config.
pub fn init_metrics(config: &MetricsConfig) {
    if !config.enabled {
        return;
    }
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}
