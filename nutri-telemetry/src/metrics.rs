use std::sync::Mutex;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::trace;

/// Interval between two upkeep runs of the Prometheus recorder.
const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

// Global cache for the Prometheus handle used by [`init_metrics_handle`].
//
// A [`Mutex`] is used instead of a `OnceLock` because the initialization is fallible. The
// recorder must only be installed once per process, while tests and binaries may ask for the
// handle several times.
static PROMETHEUS_HANDLE: Mutex<Option<PrometheusHandle>> = Mutex::new(None);

/// Installs the global Prometheus recorder and returns a handle for rendering metrics.
///
/// The exporter does not serve metrics itself, the HTTP API renders them through the returned
/// handle. Later calls return clones of the cached handle.
///
/// Must be called from within a Tokio runtime, since it spawns the recorder's upkeep task.
pub fn init_metrics_handle() -> Result<PrometheusHandle, BuildError> {
    let mut prometheus_handle = PROMETHEUS_HANDLE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(handle) = &*prometheus_handle {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    *prometheus_handle = Some(handle.clone());

    let upkeep_handle = handle.clone();

    // Upkeep drains histogram buckets, without it memory grows with every recorded sample.
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(UPKEEP_INTERVAL).await;
            trace!("running metrics upkeep");
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_is_cached() {
        let first = init_metrics_handle().unwrap();
        let second = init_metrics_handle().unwrap();

        ::metrics::counter!("nutri_telemetry_test_total").increment(1);

        assert!(first.render().contains("nutri_telemetry_test_total"));
        assert_eq!(first.render(), second.render());
    }
}
