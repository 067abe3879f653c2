// src/utils/progress_bars/progress_callback.rs - Progress callbacks reported out of the scan worker

use indicatif::ProgressBar;
use log::debug;
use std::sync::Arc;

/// Type alias for progress callback functions
/// Takes phase name and optional detailed progress information
pub type ProgressCallback = Arc<dyn Fn(String, Option<String>) + Send + Sync>;

/// Convenience macro for updating progress through an optional callback
#[macro_export]
macro_rules! update_progress {
    ($callback:expr, $phase:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), None);
        }
    };
    ($callback:expr, $phase:expr, $details:expr) => {
        if let Some(ref cb) = $callback {
            cb($phase.to_string(), Some($details.to_string()));
        }
    };
}

/// Convenience macro for updating progress with a current/total counter
#[macro_export]
macro_rules! update_detailed_progress {
    ($callback:expr, $phase:expr, $current:expr, $total:expr) => {
        if let Some(ref cb) = $callback {
            let details = format!("{}/{}", $current, $total);
            cb($phase.to_string(), Some(details));
        }
    };
}

/// Callback that only writes debug log lines; used when no UI is attached.
pub fn create_logging_callback(label: &'static str) -> ProgressCallback {
    Arc::new(move |phase: String, details: Option<String>| match details {
        Some(d) => debug!("[{}] {}: {}", label, phase, d),
        None => debug!("[{}] {}", label, phase),
    })
}

/// Callback that advances an indicatif bar whenever a new phase starts and
/// mirrors details into an optional status spinner.
pub fn create_bar_callback(main_pb: ProgressBar, status_pb: Option<ProgressBar>) -> ProgressCallback {
    Arc::new(move |phase: String, details: Option<String>| {
        main_pb.set_message(phase.clone());
        match details {
            Some(d) => {
                if let Some(status) = &status_pb {
                    status.set_message(d);
                }
            }
            None => main_pb.inc(1),
        }
    })
}
