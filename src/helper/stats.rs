use chrono::Utc;
use std::path::Path;
use sysinfo::{Disks, System};

use crate::model::SystemStats;

/// Take a point-in-time snapshot of CPU, memory and root-disk usage.
/// CPU usage needs two refreshes separated by the minimum interval to
/// produce a meaningful number.
pub fn sample() -> SystemStats {
    let mut sys = System::new_all();
    sys.refresh_cpu_usage();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let (disk_used, disk_total) = root_disk();

    SystemStats {
        cpu_usage: sys.global_cpu_usage(),
        memory_used: sys.used_memory(),
        memory_total: sys.total_memory(),
        disk_used,
        disk_total,
        sampled_at: Utc::now(),
    }
}

fn root_disk() -> (u64, u64) {
    let disks = Disks::new_with_refreshed_list();
    for disk in &disks {
        if disk.mount_point() == Path::new("/") {
            let total = disk.total_space();
            return (total.saturating_sub(disk.available_space()), total);
        }
    }
    (0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reports_memory_totals() {
        let stats = sample();
        assert!(stats.memory_total > 0);
        assert!(stats.memory_used <= stats.memory_total);
        assert!(stats.disk_used <= stats.disk_total);
    }
}
