//! Exit code constants for the adsage CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `MISSING_DATA` | Critical dataset columns are absent |
//! | 4 | `GENERATION_UNAVAILABLE` | No generation provider could be constructed |
//! | 5 | `NORMALIZATION_FAILED` | `adsage normalize` could not coerce the input |
//!
//! A pipeline run that degraded to fallbacks still exits with `SUCCESS`: the
//! run result always has a well-formed shape and failure is reported in its
//! content.

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use adsage_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::MISSING_DATA, ExitCode::from_i32(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Missing data - spend, revenue, roas or ctr column absent
    pub const MISSING_DATA: ExitCode = ExitCode(3);

    /// Generation unavailable - no provider key and not running offline
    pub const GENERATION_UNAVAILABLE: ExitCode = ExitCode(4);

    /// Normalization failed - raw text did not satisfy the requested contract
    pub const NORMALIZATION_FAILED: ExitCode = ExitCode(5);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
