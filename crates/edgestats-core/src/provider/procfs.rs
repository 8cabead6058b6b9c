//! Reference collaborators backed by a Linux procfs tree.
//!
//! The root directory is configurable so the same code reads `/proc` on a
//! host, a bind-mounted `/host/proc` in a container, or a test fixture.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{CounterProvider, ProcessIdentity, ProcessMonitor};
use crate::counters::{InterfaceCounters, InterfaceTable};

/// Kernel limit on `/proc/<pid>/comm`, excluding the trailing newline.
const COMM_LEN: usize = 15;

/// Which interfaces to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceFilter {
    /// Exact names to keep; empty keeps every interface.
    pub names: Vec<String>,
    pub include_loopback: bool,
}

impl InterfaceFilter {
    pub fn matches(&self, iface: &str) -> bool {
        if iface == "lo" && !self.include_loopback {
            return false;
        }
        self.names.is_empty() || self.names.iter().any(|n| n == iface)
    }
}

/// Parse the body of `/proc/net/dev`.
///
/// Lines that do not carry the full 16 counter columns are skipped.
pub fn parse_net_dev(raw: &str) -> InterfaceTable {
    let mut out = InterfaceTable::new();
    for line in raw.lines().skip(2) {
        let Some((iface_raw, stats_raw)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<u64> = stats_raw
            .split_whitespace()
            .filter_map(|s| s.parse::<u64>().ok())
            .collect();
        if fields.len() < 16 {
            continue;
        }
        out.insert(
            iface_raw.trim().to_string(),
            InterfaceCounters::new(fields[0], fields[1], fields[8], fields[9]),
        );
    }
    out
}

/// Interface counters from `<root>/net/dev`.
#[derive(Debug, Clone)]
pub struct ProcNetDevCounters {
    path: PathBuf,
    filter: InterfaceFilter,
}

impl ProcNetDevCounters {
    pub fn new(proc_root: impl AsRef<Path>, filter: InterfaceFilter) -> Self {
        Self {
            path: proc_root.as_ref().join("net").join("dev"),
            filter,
        }
    }
}

impl CounterProvider for ProcNetDevCounters {
    fn snapshot(&self) -> Option<InterfaceTable> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("cannot read {}: {e}", self.path.display());
                return None;
            }
        };
        let mut table = parse_net_dev(&raw);
        table.retain(|iface, _| self.filter.matches(iface));
        debug!("read counters for {} interfaces", table.len());
        Some(table)
    }
}

/// Tracks a process by command name, like `pidof`.
///
/// The identity token is the space-separated sorted list of matching pids,
/// so any worker restart changes it.
#[derive(Debug, Clone)]
pub struct ProcessByName {
    proc_root: PathBuf,
    name: String,
}

impl ProcessByName {
    pub fn new(proc_root: impl Into<PathBuf>, name: &str) -> Self {
        let name: String = name.chars().take(COMM_LEN).collect();
        Self {
            proc_root: proc_root.into(),
            name,
        }
    }

    fn matching_pids(&self) -> Vec<u32> {
        let entries = match std::fs::read_dir(&self.proc_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot list {}: {e}", self.proc_root.display());
                return Vec::new();
            }
        };
        let mut pids: Vec<u32> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
                // The process may exit between readdir and this read.
                let comm = std::fs::read_to_string(entry.path().join("comm")).ok()?;
                (comm.trim_end_matches('\n') == self.name).then_some(pid)
            })
            .collect();
        pids.sort_unstable();
        pids
    }
}

impl ProcessMonitor for ProcessByName {
    fn identity(&self) -> ProcessIdentity {
        let token = self
            .matching_pids()
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        ProcessIdentity::new(token)
    }

    fn is_live(&self) -> bool {
        !self.matching_pids().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:    4200      42    0    0    0     0          0         0     4200      42    0    0    0     0       0          0
  eth0: 1500000    1200    0    3    0     0          0        12   260000     900    0    0    0     0       0          0
  eth1:     100      10    0    0    0     0          0         0      200      20    0    0    0     0       0          0
 bogus: 1 2 3
";

    fn write_proc(root: &Path, pid: u32, comm: &str) {
        let dir = root.join(pid.to_string());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("comm"), format!("{comm}\n")).unwrap();
    }

    #[test]
    fn test_parse_net_dev() {
        let table = parse_net_dev(NET_DEV);
        assert_eq!(table.len(), 3);
        assert_eq!(table["eth0"], InterfaceCounters::new(1_500_000, 1200, 260_000, 900));
        assert_eq!(table["eth1"], InterfaceCounters::new(100, 10, 200, 20));
        assert!(!table.contains_key("bogus"));
    }

    #[test]
    fn test_filter_defaults_drop_loopback() {
        let f = InterfaceFilter::default();
        assert!(!f.matches("lo"));
        assert!(f.matches("eth0"));

        let f = InterfaceFilter {
            names: vec!["eth1".to_string(), "lo".to_string()],
            include_loopback: true,
        };
        assert!(f.matches("lo"));
        assert!(f.matches("eth1"));
        assert!(!f.matches("eth0"));
    }

    #[test]
    fn test_net_dev_provider_reads_fixture() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("net")).unwrap();
        std::fs::write(root.path().join("net/dev"), NET_DEV).unwrap();

        let provider = ProcNetDevCounters::new(root.path(), InterfaceFilter::default());
        let table = provider.snapshot().unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["eth0", "eth1"]);
    }

    #[test]
    fn test_net_dev_provider_missing_file_fails() {
        let root = tempfile::tempdir().unwrap();
        let provider = ProcNetDevCounters::new(root.path(), InterfaceFilter::default());
        assert!(provider.snapshot().is_none());
    }

    #[test]
    fn test_process_by_name_identity() {
        let root = tempfile::tempdir().unwrap();
        write_proc(root.path(), 812, "vpp_main");
        write_proc(root.path(), 77, "vpp_main");
        write_proc(root.path(), 90, "sshd");
        std::fs::create_dir_all(root.path().join("net")).unwrap();

        let monitor = ProcessByName::new(root.path(), "vpp_main");
        assert_eq!(monitor.identity(), ProcessIdentity::new("77 812"));
        assert!(monitor.is_live());

        let absent = ProcessByName::new(root.path(), "dpdk");
        assert_eq!(absent.identity(), ProcessIdentity::none());
        assert!(!absent.is_live());
    }

    #[test]
    fn test_process_by_name_truncates_to_comm_len() {
        let root = tempfile::tempdir().unwrap();
        write_proc(root.path(), 5, "forwarding-engi");
        let monitor = ProcessByName::new(root.path(), "forwarding-engine");
        assert_eq!(monitor.identity(), ProcessIdentity::new("5"));
    }

    #[test]
    fn test_process_by_name_missing_root() {
        let monitor = ProcessByName::new("/nonexistent/edgestats-proc", "vpp");
        assert!(!monitor.identity().is_running());
    }
}
