//! Arena configuration and the heap-vs-arena activation policy.
//!
//! The arena is enabled by two parameters, a physical base address and a
//! byte size. They are read from the environment at startup
//! ([`ArenaConfig::from_env`]); values exported while the workspace was
//! built act as defaults, so a build configured with
//! `PHYSMEM_PHYS_ADDR=0xF00000000UL PHYSMEM_SIZE=0x100000000UL` keeps
//! working without a runtime environment.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use physmem_core::ArenaError;

use crate::region::page_size;

/// Where and how large the physical arena is.
///
/// Validated by [`validate`](ArenaConfig::validate) before mapping; all
/// values are immutable once the arena exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Physical address of the first byte (offset into the device).
    ///
    /// Must be a multiple of the system page size.
    pub phys_addr: u64,

    /// Length of the range in bytes. Must be non-zero.
    pub size: usize,

    /// Device exposing physical memory. Default: `/dev/mem`.
    pub device: PathBuf,
}

impl ArenaConfig {
    /// Default memory device.
    pub const DEFAULT_DEVICE: &'static str = "/dev/mem";

    /// Environment variable holding the physical base address.
    pub const PHYS_ADDR_VAR: &'static str = "PHYSMEM_PHYS_ADDR";

    /// Environment variable holding the arena size in bytes.
    pub const SIZE_VAR: &'static str = "PHYSMEM_SIZE";

    /// Environment variable overriding the device path.
    pub const DEVICE_VAR: &'static str = "PHYSMEM_DEVICE";

    /// Create a config for `[phys_addr, phys_addr + size)` on the default device.
    pub fn new(phys_addr: u64, size: usize) -> Self {
        Self {
            phys_addr,
            size,
            device: PathBuf::from(Self::DEFAULT_DEVICE),
        }
    }

    /// Use a different device path (e.g. a file standing in for `/dev/mem`).
    pub fn with_device(mut self, device: impl Into<PathBuf>) -> Self {
        self.device = device.into();
        self
    }

    /// Check that the range can be handed to `mmap` as-is.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.size == 0 {
            return Err(invalid("size must be non-zero"));
        }
        let page = page_size() as u64;
        if self.phys_addr % page != 0 {
            return Err(invalid(format!(
                "phys_addr {:#x} is not aligned to the {page}-byte page size",
                self.phys_addr
            )));
        }
        if libc::off_t::try_from(self.phys_addr).is_err() {
            return Err(invalid(format!(
                "phys_addr {:#x} does not fit in off_t",
                self.phys_addr
            )));
        }
        let end = u64::try_from(self.size)
            .ok()
            .and_then(|size| self.phys_addr.checked_add(size));
        if end.is_none() {
            return Err(invalid(format!(
                "range {:#x} + {} overflows the physical address space",
                self.phys_addr, self.size
            )));
        }
        Ok(())
    }

    /// Read the activation policy from the process environment.
    ///
    /// Returns `Ok(None)` when neither address nor size is set, meaning
    /// allocations should go to the ordinary heap.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok().or_else(|| build_time(name)))
    }

    /// Like [`from_env`](Self::from_env), with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(Self::PHYS_ADDR_VAR);
        let size = lookup(Self::SIZE_VAR);
        let (addr, size) = match (addr, size) {
            (None, None) => return Ok(None),
            (Some(_), None) => {
                return Err(ConfigError::Partial {
                    set: Self::PHYS_ADDR_VAR,
                    missing: Self::SIZE_VAR,
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::Partial {
                    set: Self::SIZE_VAR,
                    missing: Self::PHYS_ADDR_VAR,
                })
            }
            (Some(addr), Some(size)) => (addr, size),
        };

        let phys_addr = parse_u64(Self::PHYS_ADDR_VAR, &addr)?;
        let size = parse_u64(Self::SIZE_VAR, &size)?;
        let size = usize::try_from(size).map_err(|_| ConfigError::Parse {
            var: Self::SIZE_VAR,
            value: size.to_string(),
        })?;

        let mut config = Self::new(phys_addr, size);
        if let Some(device) = lookup(Self::DEVICE_VAR) {
            config.device = PathBuf::from(device);
        }
        Ok(Some(config))
    }
}

fn invalid(reason: impl Into<String>) -> ArenaError {
    ArenaError::InvalidConfig {
        reason: reason.into(),
    }
}

fn build_time(name: &str) -> Option<String> {
    let value = match name {
        ArenaConfig::PHYS_ADDR_VAR => option_env!("PHYSMEM_PHYS_ADDR"),
        ArenaConfig::SIZE_VAR => option_env!("PHYSMEM_SIZE"),
        ArenaConfig::DEVICE_VAR => option_env!("PHYSMEM_DEVICE"),
        _ => None,
    };
    value.map(str::to_owned)
}

/// Parse a decimal or `0x`-prefixed hex integer.
///
/// `_` separators and a C-style `u`/`l` suffix (`0xF00000000UL`) are
/// accepted so values can be copied from build scripts verbatim.
fn parse_u64(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let err = || ConfigError::Parse {
        var,
        value: raw.to_owned(),
    };
    let cleaned: String = raw
        .trim()
        .trim_end_matches(['u', 'U', 'l', 'L'])
        .chars()
        .filter(|&c| c != '_')
        .collect();
    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse::<u64>(),
    };
    parsed.map_err(|_| err())
}

/// Errors from reading the activation policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but is not an integer.
    Parse {
        /// Name of the offending variable.
        var: &'static str,
        /// The raw value.
        value: String,
    },
    /// Only one of address and size is set.
    Partial {
        /// The variable that is set.
        set: &'static str,
        /// The variable that is missing.
        missing: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { var, value } => {
                write!(f, "{var}={value:?} is not a decimal or 0x-hex integer")
            }
            Self::Partial { set, missing } => {
                write!(f, "{set} is set but {missing} is not; set both or neither")
            }
        }
    }
}

impl Error for ConfigError {}

impl From<ConfigError> for ArenaError {
    fn from(err: ConfigError) -> Self {
        ArenaError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
