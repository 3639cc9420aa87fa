// Convert a raw Docker stats API response into the snapshot wire schema.

use crate::models::{BlockIoCounters, CpuCounters, MemoryUsage, NetworkCounters, Snapshot};
use bollard::models::ContainerStatsResponse;

/// None when the response carries no cumulative CPU counter (nothing to derive from).
pub(crate) fn to_snapshot(
    s: &ContainerStatsResponse,
    container_id: &str,
    observed_at: i64,
) -> Option<Snapshot> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;
    let total_usage = cpu_usage.total_usage?;

    // Same formula as `docker stats`: container share of host CPU time, times online CPUs.
    let usage_percent = s
        .precpu_stats
        .as_ref()
        .and_then(|pre| {
            let pre_total = pre.cpu_usage.as_ref()?.total_usage?;
            // A counter that went backwards gives no percentage.
            let cpu_delta = total_usage.checked_sub(pre_total)?;
            let system_delta = cpu_stats
                .system_cpu_usage?
                .checked_sub(pre.system_cpu_usage?)?;
            let online = cpu_stats.online_cpus.unwrap_or(1) as f64;
            (system_delta > 0).then(|| (cpu_delta as f64 / system_delta as f64) * online * 100.0)
        });

    let memory = s.memory_stats.as_ref().map(|m| MemoryUsage {
        usage: m.usage,
        limit: m.limit,
        usage_percent: None,
    });

    let network = s.networks.as_ref().map(|n| {
        let mut rx_bytes = 0u64;
        let mut tx_bytes = 0u64;
        for v in n.values() {
            rx_bytes = rx_bytes.saturating_add(v.rx_bytes.unwrap_or(0));
            tx_bytes = tx_bytes.saturating_add(v.tx_bytes.unwrap_or(0));
        }
        NetworkCounters {
            rx_bytes: Some(rx_bytes),
            tx_bytes: Some(tx_bytes),
        }
    });

    let block_io = s
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_ref())
        .map(|entries| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in entries {
                match e.op.as_deref() {
                    Some(op) if op.eq_ignore_ascii_case("read") => {
                        read = read.saturating_add(e.value.unwrap_or(0))
                    }
                    Some(op) if op.eq_ignore_ascii_case("write") => {
                        write = write.saturating_add(e.value.unwrap_or(0))
                    }
                    _ => {}
                }
            }
            BlockIoCounters {
                read_bytes: Some(read),
                write_bytes: Some(write),
            }
        });

    let id = s
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| container_id.to_string());
    let name = s
        .name
        .as_deref()
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| id.clone());

    Some(Snapshot {
        id,
        name,
        observed_at,
        cpu: CpuCounters {
            total_usage,
            per_core_usage: cpu_usage.percpu_usage.clone().unwrap_or_default(),
            usage_percent,
        },
        memory,
        network,
        block_io,
    })
}
