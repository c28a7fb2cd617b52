// src/constants.rs

/// The name of the directory holding smash configuration (inside the system config dir).
pub const SMASH_CONFIG_DIR: &str = "smash";

/// The name of the configuration file inside [`SMASH_CONFIG_DIR`].
pub const CONFIG_FILENAME: &str = "config.toml";

/// Prompt name used at startup and restored by a bare `chprompt`.
pub const DEFAULT_PROMPT: &str = "smash";

/// Appended to the prompt name when it is displayed.
pub const PROMPT_SUFFIX: &str = "> ";

/// Interpreter that receives command lines containing wildcards.
pub const DEFAULT_GLOB_INTERPRETER: &str = "/bin/bash";

/// Highest job id the allocator hands out.
pub const MAX_JOBS: usize = 100;

/// How often the foreground wait loop polls the child and the interrupt flag.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

/// Characters treated as blanks when trimming and splitting command lines.
pub const WHITESPACE: &[char] = &[' ', '\n', '\r', '\t', '\x0c', '\x0b'];

/// Gap between the two `/proc` samples taken by `watchproc`.
pub const WATCHPROC_SAMPLE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Kernel routing table read by `netinfo` for the default gateway.
pub const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Resolver configuration read by `netinfo` for DNS servers.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";
