//! Runtime Initialization
//!
//! Bring-up sequence for the process accessor:
//! 1. Validate configuration
//! 2. Check it matches the compiled-in encoding policy
//! 3. Install the write barrier hook, if any
//! 4. Record the policy in the event log

use std::sync::atomic::{AtomicBool, Ordering};

use crate::barrier::{install_write_barrier, BarrierFn, GlobalBarrier};
use crate::config::RefConfig;
use crate::error::{RefError, Result};
use crate::logging::{configure_logger, log_event, RefEvent, RefLoggerConfig};
use crate::reference::{EncodingPolicy, ReferenceAccess};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// RuntimeInitializer - brings up the process accessor
///
/// ```rust
/// use heapref::{RefConfig, RuntimeInitializer};
///
/// let access = RuntimeInitializer::new(RefConfig::default()).initialize()?;
/// assert_eq!(access.compressed_enabled(), heapref::compressed_enabled());
/// # Ok::<(), heapref::RefError>(())
/// ```
pub struct RuntimeInitializer {
    config: RefConfig,
    write_barrier: Option<BarrierFn>,
}

impl RuntimeInitializer {
    pub fn new(config: RefConfig) -> Self {
        Self {
            config,
            write_barrier: None,
        }
    }

    /// Install `hook` as the process write barrier during `initialize`.
    ///
    /// # Safety
    ///
    /// `hook` must honor the `WriteBarrier` contract.
    pub unsafe fn with_write_barrier(mut self, hook: BarrierFn) -> Self {
        self.write_barrier = Some(hook);
        self
    }

    /// Initialize the process accessor
    ///
    /// Can run more than once as long as the configuration keeps matching
    /// the build, but a write barrier hook can only be installed once.
    pub fn initialize(&self) -> Result<&'static ReferenceAccess<GlobalBarrier>> {
        if self.config.verbose {
            configure_logger(RefLoggerConfig {
                console: true,
                ..Default::default()
            });
        }

        if let Err(e) = self.config.validate() {
            log_event(RefEvent::ConfigRejected {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        let requested = self.config.policy();
        if requested != EncodingPolicy::BUILD {
            let err = RefError::PolicyMismatch {
                expected: EncodingPolicy::BUILD.to_string(),
                actual: requested.to_string(),
            };
            log_event(RefEvent::ConfigRejected {
                reason: err.to_string(),
            });
            return Err(err);
        }

        if let Some(hook) = self.write_barrier {
            // SAFETY: the caller vouched for the hook in `with_write_barrier`.
            unsafe { install_write_barrier(hook)? };
        }

        if INITIALIZED.swap(true, Ordering::AcqRel) {
            log_event(RefEvent::Reinitialized {
                reason: "accessor bring-up ran again".to_string(),
            });
        } else {
            log_event(RefEvent::PolicyInstalled {
                compressed: requested.compressed_enabled(),
                heap_base: requested.base(),
                reference_shift: requested.shift(),
            });
        }

        Ok(ReferenceAccess::singleton())
    }

    pub fn config(&self) -> &RefConfig {
        &self.config
    }
}

/// Whether bring-up has completed at least once
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}
