//! Error types for arena setup and allocation.
//!
//! Every failure at this layer leaves the caller unable to proceed with
//! the buffer it asked for, so every [`ArenaError`] is classified as
//! [`Severity::Fatal`]. Whether a fatal error terminates the process or
//! is propagated is the caller's decision.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// How a diagnostic should be treated by the host program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// The requested operation cannot complete and must not be retried.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors that can occur while mapping the region or serving allocations.
#[derive(Debug)]
pub enum ArenaError {
    /// The privileged memory device could not be opened.
    DeviceOpen {
        /// Device path that was opened.
        path: PathBuf,
        /// The underlying OS error.
        source: io::Error,
    },
    /// The OS rejected the mapping request.
    MapRejected {
        /// Physical address (device offset) of the requested range.
        phys_addr: u64,
        /// Requested mapping length in bytes.
        size: usize,
        /// The underlying OS error.
        source: io::Error,
    },
    /// The arena configuration cannot be mapped as given.
    InvalidConfig {
        /// What is wrong with the configuration.
        reason: String,
    },
    /// The request does not fit in the remaining arena space.
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes in use (including alignment padding for this request).
        used: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// `count * size_of::<T>()` does not fit in `usize`.
    LayoutOverflow {
        /// Element count requested.
        count: usize,
        /// Size of a single element in bytes.
        elem_size: usize,
    },
    /// The ordinary heap allocator returned null.
    HeapExhausted {
        /// Number of bytes requested.
        bytes: usize,
    },
}

impl ArenaError {
    /// Classification of this error.
    ///
    /// All arena errors are fatal: the caller must not continue with the
    /// buffer it asked for.
    pub fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Shorthand for `self.severity() == Severity::Fatal`.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Operator-facing remediation hint, if one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DeviceOpen { .. } => {
                Some("run as root (or with CAP_SYS_RAWIO) and boot with iomem=relaxed")
            }
            Self::MapRejected { .. } => Some(
                "reserve the range from the kernel (mem=/memmap= boot parameter) \
                 and check that STRICT_DEVMEM does not block it",
            ),
            Self::CapacityExceeded { .. } => Some("increase PHYSMEM_SIZE"),
            _ => None,
        }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceOpen { path, source } => {
                write!(f, "cannot open {}: {source}", path.display())
            }
            Self::MapRejected {
                phys_addr,
                size,
                source,
            } => {
                write!(
                    f,
                    "mmap rejected for phys_addr={phys_addr:#x} size={size}: {source}"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::CapacityExceeded {
                requested,
                used,
                capacity,
            } => {
                write!(
                    f,
                    "out of memory (need {requested}, used {used} / {capacity} bytes)"
                )
            }
            Self::LayoutOverflow { count, elem_size } => {
                write!(
                    f,
                    "allocation size overflows usize: {count} elements of {elem_size} bytes"
                )
            }
            Self::HeapExhausted { bytes } => write!(f, "heap allocation of {bytes} bytes failed"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DeviceOpen { source, .. } | Self::MapRejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_is_fatal() {
        let errors = [
            ArenaError::DeviceOpen {
                path: "/dev/mem".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
            ArenaError::InvalidConfig {
                reason: "size is zero".into(),
            },
            ArenaError::CapacityExceeded {
                requested: 1000,
                used: 84,
                capacity: 1024,
            },
            ArenaError::LayoutOverflow {
                count: usize::MAX,
                elem_size: 8,
            },
            ArenaError::HeapExhausted { bytes: 16 },
        ];
        for err in &errors {
            assert!(err.is_fatal(), "{err} should be fatal");
        }
    }

    #[test]
    fn exhaustion_message_reports_requested_and_available() {
        let err = ArenaError::CapacityExceeded {
            requested: 1000,
            used: 84,
            capacity: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("need 1000"));
        assert!(msg.contains("84 / 1024"));
    }

    #[test]
    fn device_open_exposes_io_source_and_hint() {
        let err = ArenaError::DeviceOpen {
            path: "/dev/mem".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.source().is_some());
        assert!(err.hint().unwrap().contains("iomem=relaxed"));
        assert!(err.to_string().starts_with("cannot open /dev/mem"));
    }

    #[test]
    fn map_rejected_formats_address_as_hex() {
        let err = ArenaError::MapRejected {
            phys_addr: 0xF_0000_0000,
            size: 4096,
            source: io::Error::from_raw_os_error(22),
        };
        assert!(err.to_string().contains("phys_addr=0xf00000000"));
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Fatal.to_string(), "fatal");
    }

    #[test]
    fn overflow_has_no_hint() {
        let err = ArenaError::LayoutOverflow {
            count: 3,
            elem_size: usize::MAX,
        };
        assert!(err.hint().is_none());
        assert!(err.source().is_none());
    }
}
