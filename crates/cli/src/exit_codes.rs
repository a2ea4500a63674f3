//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | Usage error (bad args, missing folder)        |
//! | 3    | Folder holds no markup key files              |
//! | 4    | Markup files parsed but no usable keys found  |
//! | 5    | Export could not be written                   |
//! | 6    | Settings file unreadable or invalid           |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, folder does not exist.
pub const EXIT_USAGE: u8 = 2;

/// No markup key files in the scanned folder.
pub const EXIT_NO_INPUT: u8 = 3;

/// Every source was read (or skipped) and the store is still empty.
pub const EXIT_NO_KEYS: u8 = 4;

/// JSON or tabular export failed.
pub const EXIT_WRITE: u8 = 5;

/// Settings could not be loaded or failed validation.
pub const EXIT_CONFIG: u8 = 6;
