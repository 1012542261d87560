use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => std::env::set_var(&self.key, value),
            None => std::env::remove_var(&self.key),
        }
    }
}

/// Runs `f` with one environment variable pinned to `value` (or removed when
/// `None`), restoring the previous state afterwards.
///
/// Restoration happens on unwind too, and a process-wide lock serializes the
/// callers so parallel tests do not race on the environment.
pub fn with_env_var<F, R>(key: &str, value: Option<&str>, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = EnvGuard {
        key: key.to_string(),
        previous: std::env::var(key).ok(),
    };
    match value {
        Some(v) => std::env::set_var(key, v),
        None => std::env::remove_var(key),
    }
    f()
}
