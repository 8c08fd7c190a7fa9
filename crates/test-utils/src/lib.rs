pub mod builders;
pub mod fixtures;

use std::sync::{Arc, Mutex, Once};

use ddoptim::engine::AppearanceObserver;
use ddoptim::network::NodeId;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Float comparison with an absolute tolerance.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Observer that records every notification; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    calls: Arc<Mutex<Vec<Vec<NodeId>>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification so far, oldest first.
    pub fn calls(&self) -> Vec<Vec<NodeId>> {
        self.calls.lock().expect("observer mutex poisoned").clone()
    }
}

impl AppearanceObserver for RecordingObserver {
    fn appearance_changed(&self, ids: &[NodeId]) {
        self.calls
            .lock()
            .expect("observer mutex poisoned")
            .push(ids.to_vec());
    }
}
