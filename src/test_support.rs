use crate::error::{DirlockError, Result};
use crate::liveness::LivenessOracle;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

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

/// Liveness oracle with a fixed set of live pids.
#[derive(Debug, Default)]
pub(crate) struct FakeLiveness {
    alive: Mutex<HashSet<u32>>,
    probes: AtomicUsize,
}

impl FakeLiveness {
    pub(crate) fn with_alive(pids: &[u32]) -> Self {
        Self {
            alive: Mutex::new(pids.iter().copied().collect()),
            probes: AtomicUsize::new(0),
        }
    }

    pub(crate) fn kill(&self, pid: u32) {
        self.alive.lock().unwrap().remove(&pid);
    }

    pub(crate) fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl LivenessOracle for FakeLiveness {
    fn is_alive(&self, pid: i64) -> Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if pid == 0 {
            return Err(DirlockError::InvalidArgument("pid 0".to_string()));
        }
        let Ok(pid) = u32::try_from(pid) else {
            return Ok(false);
        };
        Ok(self.alive.lock().unwrap().contains(&pid))
    }
}

/// Scratch directory plus the path of a (not yet created) lock inside it.
pub(crate) fn lock_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let lock_root = temp_dir.path().join("LOCK");
    (temp_dir, lock_root)
}

/// Create a lock directory by hand containing the given entries.
pub(crate) fn plant_lock(lock_root: &Path, entries: &[&str]) {
    std::fs::create_dir(lock_root).unwrap();
    for entry in entries {
        std::fs::write(lock_root.join(entry), b"").unwrap();
    }
}

/// Sorted entry names of a directory.
pub(crate) fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
