// src/cli/handlers/sysinfo.rs

//! Read-only system reports: `watchproc`, `du`, `whoami` and `netinfo`.
//!
//! Everything here is gathered from `/proc`, the filesystem and libc lookups
//! through `nix`; nothing is spawned.

use crate::cli::handlers::commons;
use crate::constants::{PROC_NET_ROUTE, RESOLV_CONF, WATCHPROC_SAMPLE_INTERVAL};
use crate::core::errors::ShellError;
use crate::models::{Command, Flow};
use crate::state::Shell;
use nix::ifaddrs;
use nix::unistd::{self, User};
use std::fs;
use std::net::Ipv4Addr;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::thread;
use std::time::Duration;
use walkdir::WalkDir;

// --- watchproc ---

/// CPU and resident memory of one process, measured over a sample interval.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProcessUsage {
    cpu_percent: f64,
    memory_mb: f64,
}

pub fn handle_watchproc(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    let (Some(token), 2) = (command.arg(1), command.arg_count()) else {
        return Err(ShellError::invalid_arguments("watchproc"));
    };
    let pid: i64 = token
        .parse()
        .map_err(|_| ShellError::invalid_arguments("watchproc"))?;

    let usage = sample_usage(pid, WATCHPROC_SAMPLE_INTERVAL)
        .ok_or_else(|| ShellError::lookup("watchproc", format!("pid {pid} does not exist")))?;
    commons::emit(
        shell,
        format!(
            t!("watchproc.report"),
            pid = pid,
            cpu = usage.cpu_percent,
            memory = usage.memory_mb
        ),
    )?;
    Ok(Flow::Continue)
}

/// Takes two samples `interval` apart. `None` if the process is gone at
/// either sample.
fn sample_usage(pid: i64, interval: Duration) -> Option<ProcessUsage> {
    let (process_before, total_before) = read_ticks(pid)?;
    thread::sleep(interval);
    let (process_after, total_after) = read_ticks(pid)?;

    let process_delta = process_after.saturating_sub(process_before);
    let total_delta = total_after.saturating_sub(total_before);
    let cpu_percent = if total_delta == 0 {
        0.0
    } else {
        100.0 * process_delta as f64 / total_delta as f64
    };

    let memory_mb = fs::read_to_string(format!("/proc/{pid}/status"))
        .ok()
        .and_then(|status| parse_vm_rss_kb(&status))
        .map_or(0.0, |kb| kb / 1024.0);

    Some(ProcessUsage {
        cpu_percent,
        memory_mb,
    })
}

/// `(utime + stime of pid, sum of the aggregate cpu line)` in clock ticks.
fn read_ticks(pid: i64) -> Option<(u64, u64)> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
    let process = parse_process_ticks(&stat)?;
    let system = fs::read_to_string("/proc/stat").ok()?;
    Some((process, parse_total_ticks(&system)?))
}

/// Fields are counted after the `)` closing the command name, which may
/// itself contain spaces. `utime` and `stime` are fields 14 and 15.
fn parse_process_ticks(stat: &str) -> Option<u64> {
    let (_, rest) = stat.rsplit_once(')')?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    Some(utime + stime)
}

fn parse_total_ticks(proc_stat: &str) -> Option<u64> {
    let cpu_line = proc_stat.lines().next()?;
    let mut fields = cpu_line.split_whitespace();
    if fields.next() != Some("cpu") {
        return None;
    }
    Some(fields.filter_map(|field| field.parse::<u64>().ok()).sum())
}

fn parse_vm_rss_kb(status: &str) -> Option<f64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

// --- du ---

pub fn handle_du(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    commons::check_max_args(command, 2, "du", "too many arguments")?;
    let target = command.arg(1).unwrap_or(".");
    let root = shell.resolve_path(target);
    if fs::metadata(&root).is_err() {
        return Err(ShellError::lookup("du", format!("directory {target} does not exist")));
    }

    let blocks = allocated_blocks(&root);
    // st_blocks counts 512-byte units.
    commons::emit(shell, format!(t!("du.total"), kb = blocks.div_ceil(2)))?;
    Ok(Flow::Continue)
}

/// Sums `st_blocks` over directories and regular files without following
/// symlinks. Unreadable entries are skipped.
fn allocated_blocks(root: &Path) -> u64 {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("du: skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir() || entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.blocks())
        .sum()
}

// --- whoami ---

pub fn handle_whoami(shell: &mut Shell, _command: &Command) -> Result<Flow, ShellError> {
    let user = User::from_uid(unistd::getuid())
        .map_err(|e| ShellError::syscall("getpwuid", e))?
        .ok_or_else(|| ShellError::lookup("whoami", "user not found"))?;
    commons::emit(
        shell,
        format!(t!("whoami.report"), user = user.name, home = user.dir.display()),
    )?;
    Ok(Flow::Continue)
}

// --- netinfo ---

pub fn handle_netinfo(shell: &mut Shell, command: &Command) -> Result<Flow, ShellError> {
    let Some(interface) = command.arg(1) else {
        return Err(ShellError::argument("netinfo", "interface not specified"));
    };
    commons::check_max_args(command, 2, "netinfo", "too many arguments")?;

    let (address, netmask) = interface_ipv4(interface)?.ok_or_else(|| {
        ShellError::lookup("netinfo", format!("interface {interface} does not exist"))
    })?;

    let gateway = fs::read_to_string(PROC_NET_ROUTE)
        .ok()
        .and_then(|routes| parse_default_gateway(&routes, interface))
        .map(|gateway| gateway.to_string())
        .unwrap_or_default();
    let servers = fs::read_to_string(RESOLV_CONF)
        .map(|resolv| parse_nameservers(&resolv))
        .unwrap_or_default();

    commons::emit(shell, format!(t!("netinfo.ip_address"), ip = address))?;
    commons::emit(shell, format!(t!("netinfo.subnet_mask"), mask = netmask))?;
    commons::emit(shell, format!(t!("netinfo.default_gateway"), gateway = gateway))?;
    commons::emit(
        shell,
        format!(t!("netinfo.dns_servers"), servers = servers.join(", ")),
    )?;
    Ok(Flow::Continue)
}

/// First IPv4 address and netmask bound to `interface`.
fn interface_ipv4(interface: &str) -> Result<Option<(Ipv4Addr, Ipv4Addr)>, ShellError> {
    let addresses = ifaddrs::getifaddrs().map_err(|e| ShellError::syscall("getifaddrs", e))?;
    for entry in addresses.filter(|entry| entry.interface_name == interface) {
        let address = entry.address.as_ref().and_then(|a| a.as_sockaddr_in());
        let netmask = entry.netmask.as_ref().and_then(|m| m.as_sockaddr_in());
        if let (Some(address), Some(netmask)) = (address, netmask) {
            return Ok(Some((
                Ipv4Addr::from(address.ip()),
                Ipv4Addr::from(netmask.ip()),
            )));
        }
    }
    Ok(None)
}

/// Finds the `00000000` destination row for `interface` in `/proc/net/route`.
/// Addresses there are hex dumps of the in-memory (network order) value.
fn parse_default_gateway(routes: &str, interface: &str) -> Option<Ipv4Addr> {
    routes.lines().skip(1).find_map(|line| {
        let mut fields = line.split_whitespace();
        let (name, destination, gateway) = (fields.next()?, fields.next()?, fields.next()?);
        if name != interface || destination != "00000000" {
            return None;
        }
        let raw = u32::from_str_radix(gateway, 16).ok()?;
        Some(Ipv4Addr::from(raw.to_ne_bytes()))
    })
}

fn parse_nameservers(resolv: &str) -> Vec<String> {
    resolv
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("nameserver"), Some(server)) => Some(server.to_string()),
                _ => None,
            }
        })
        .collect()
}
