// Inbound snapshot: one observation of a container's resource counters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Unix milliseconds.
    pub observed_at: i64,
    pub cpu: CpuCounters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkCounters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_io: Option<BlockIoCounters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuCounters {
    /// Cumulative; unit is whatever the source reports (ns for Docker).
    pub total_usage: u64,
    #[serde(default)]
    pub per_core_usage: Vec<u64>,
    /// Precomputed by the source; passed through to the gauge untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_percent: Option<f64>,
}

impl MemoryUsage {
    /// Source percentage if present, else usage over a non-zero limit.
    pub fn percent(&self) -> Option<f64> {
        self.usage_percent.or_else(|| match (self.usage, self.limit) {
            (Some(usage), Some(limit)) if limit > 0 => Some(usage as f64 / limit as f64 * 100.0),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkCounters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockIoCounters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_bytes: Option<u64>,
}

impl Snapshot {
    pub fn memory_usage(&self) -> Option<u64> {
        self.memory.as_ref().and_then(|m| m.usage)
    }

    pub fn memory_limit(&self) -> Option<u64> {
        self.memory.as_ref().and_then(|m| m.limit)
    }

    pub fn network_rx(&self) -> Option<u64> {
        self.network.as_ref().and_then(|n| n.rx_bytes)
    }

    pub fn network_tx(&self) -> Option<u64> {
        self.network.as_ref().and_then(|n| n.tx_bytes)
    }

    pub fn block_read(&self) -> Option<u64> {
        self.block_io.as_ref().and_then(|b| b.read_bytes)
    }

    pub fn block_write(&self) -> Option<u64> {
        self.block_io.as_ref().and_then(|b| b.write_bytes)
    }
}
