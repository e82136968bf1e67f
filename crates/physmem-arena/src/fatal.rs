//! Process termination for fatal arena errors.
//!
//! Arena-backed structures cannot be unwound halfway through
//! construction, so programs that do not propagate [`ArenaError`]
//! terminate through here. The diagnostic always reaches stderr, even
//! when no logger is installed.

use log::error;
use physmem_core::ArenaError;

/// Exit status used for fatal arena errors.
pub const FATAL_EXIT_CODE: i32 = 1;

/// The diagnostic printed for `err`: the cause, then the hint if any.
pub fn fatal_message(err: &ArenaError) -> String {
    match err.hint() {
        Some(hint) => format!("physmem: {err}\n  hint: {hint}"),
        None => format!("physmem: {err}"),
    }
}

/// Unwrap `result`, or report the error and exit the process.
pub fn exit_on_fatal<T>(result: Result<T, ArenaError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            let message = fatal_message(&err);
            error!("{message}");
            eprintln!("{message}");
            std::process::exit(FATAL_EXIT_CODE)
        }
    }
}
