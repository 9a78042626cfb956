//! Error Module - heapref Error Types
//!
//! The accessor itself never fails: precondition violations are debug
//! assertions and invalid addresses are undefined behavior. Errors only
//! exist for runtime bring-up, where configuration is validated and the
//! write barrier hook is installed.
//!
//! # Error Categories
//!
//! ## Configuration Errors
//! - `Configuration` - Invalid knob values
//! - `PolicyMismatch` - Requested encoding differs from the compiled-in policy
//!
//! ## Bring-up Errors
//! - `BarrierAlreadyInstalled` - Write barrier hook installed twice
//! - `UnrepresentableAddress` - Address cannot be expressed as a compressed reference
//! - `InvalidArgument` - Invalid function argument

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for heapref bring-up operations
///
/// # Examples
///
/// ```rust
/// use heapref::error::RefError;
///
/// fn handle_error(err: RefError) {
///     match err {
///         RefError::BarrierAlreadyInstalled => {
///             eprintln!("write barrier was already installed");
///         }
///         _ => {
///             eprintln!("Other error: {}", err);
///         }
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum RefError {
    /// Configuration error
    ///
    /// **When returned:** `RefConfig::validate` rejected the configuration
    ///
    /// **Recovery strategy:** Fix the knob values or use `RefConfig::default()`
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Requested encoding differs from the compiled-in policy
    ///
    /// **When returned:** `init_with_config` is asked for an encoding the
    /// process singleton was not built with. The singleton policy is a
    /// constant and cannot be reconfigured.
    ///
    /// **Recovery strategy:** Rebuild with matching cargo features, or use
    /// `ReferenceAccess::with_config` for a non-global accessor
    #[error("Encoding policy mismatch: built with {expected}, requested {actual}")]
    PolicyMismatch { expected: String, actual: String },

    /// Write barrier hook already installed
    ///
    /// **When returned:** `install_write_barrier` called a second time
    ///
    /// **Recovery strategy:** Cannot recover - bring-up ran twice
    #[error("Write barrier hook already installed")]
    BarrierAlreadyInstalled,

    /// Address cannot be expressed as a compressed reference
    ///
    /// **When returned:** checked encoding of an address below the heap
    /// base, outside the 32-bit range, or not aligned to the shift
    #[error("Address {address:#x} is not representable as a compressed reference")]
    UnrepresentableAddress { address: usize },

    /// Invalid argument
    ///
    /// **When returned:** Function argument fails validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl RefError {
    /// Check if this error indicates a bug in the caller
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            RefError::BarrierAlreadyInstalled | RefError::UnrepresentableAddress { .. }
        )
    }
}

/// Result type alias for heapref operations
pub type Result<T> = std::result::Result<T, RefError>;
