use sysinfo::System;

use crate::channel::ChannelError;
use crate::model::MemoryReport;

/// Ask the OS to release reclaimable memory and report the before/after
/// delta. The reclaim step needs elevated rights on most systems; failure
/// surfaces as a channel error.
pub fn optimize() -> Result<MemoryReport, ChannelError> {
    let used_before = sample_used();
    reclaim()?;
    let used_after = sample_used();

    Ok(MemoryReport {
        used_before,
        used_after,
        freed: used_before.saturating_sub(used_after),
    })
}

fn sample_used() -> u64 {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.used_memory()
}

#[cfg(target_os = "macos")]
fn reclaim() -> Result<(), ChannelError> {
    let status = std::process::Command::new("/usr/sbin/purge")
        .status()
        .map_err(|e| ChannelError::Internal(format!("could not run purge: {e}")))?;
    if !status.success() {
        return Err(ChannelError::Internal(format!("purge exited with {status}")));
    }
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn reclaim() -> Result<(), ChannelError> {
    // Drop clean page/dentry/inode caches. Writable by root only.
    std::fs::write("/proc/sys/vm/drop_caches", "3")
        .map_err(|e| ChannelError::Internal(format!("could not drop caches: {e}")))
}
