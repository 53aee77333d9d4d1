//! Process liveness probing.

/// Answers "does this process id currently name a running process".
///
/// Staleness detection depends on nothing else, so putting the probe
/// behind a trait keeps the lock logic platform-neutral and lets tests
/// drive the stale and live paths deterministically with fakes.
pub trait ProcessProbe {
    /// Whether a process with this PID exists right now.
    fn is_alive(&self, pid: u32) -> bool;
}

/// Probe backed by `kill(pid, 0)`.
///
/// Signal 0 performs every check delivery would, without delivering
/// anything. Success means the process exists; `EPERM` also means it
/// exists (it just is not ours to signal); only `ESRCH` means the PID
/// is gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillProbe;

impl ProcessProbe for KillProbe {
    fn is_alive(&self, pid: u32) -> bool {
        // PID 0 would signal our own process group, and values beyond
        // i32::MAX cannot name a process. Both count as dead so corrupt
        // lock files stay reclaimable.
        if pid == 0 || pid > i32::MAX as u32 {
            return false;
        }

        let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if rc == 0 {
            return true;
        }

        std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
    }
}
