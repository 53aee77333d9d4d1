use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// A PID no process on this machine can have: Linux caps pid_max at 2^22,
/// and other platforms stay far below this value. Probing it always
/// reports "not alive", which makes stale-lock tests deterministic.
pub(crate) const NO_SUCH_PID: u32 = 1_073_741_823;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}
