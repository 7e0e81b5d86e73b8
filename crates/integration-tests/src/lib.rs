//! Helpers shared by the end-to-end tests.

/// A single-threaded runtime with time enabled; concurrency in the engine is
/// task-level, so this is enough to observe interleaving.
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build the test runtime")
}
