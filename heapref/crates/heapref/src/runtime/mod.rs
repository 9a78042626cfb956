//! Runtime Module - Process-Wide Reference Accessor
//!
//! The process has exactly one accessor, built from the compiled-in encoding
//! policy and dispatching barriered stores to the process write barrier
//! hook. It is a constant-initialized `static`: there is no lazy
//! initialization, and reading its policy folds at compile time.
//!
//! Bring-up (`RuntimeInitializer`) checks the embedding runtime's
//! configuration against the build and installs the barrier hook. It must
//! finish before any mutator thread starts.

pub mod init;

pub use init::RuntimeInitializer;

use crate::barrier::{GlobalBarrier, WriteBarrier};
use crate::config::RefConfig;
use crate::error::Result;
use crate::logging::{log_event, RefEvent};
use crate::reference::{EncodingPolicy, ReferenceAccess};

/// The process-wide reference accessor.
pub static REFERENCE_ACCESS: ReferenceAccess<GlobalBarrier> =
    ReferenceAccess::new(EncodingPolicy::BUILD, GlobalBarrier);

/// The process-wide reference accessor.
#[inline(always)]
pub fn reference_access() -> &'static ReferenceAccess<GlobalBarrier> {
    &REFERENCE_ACCESS
}

impl ReferenceAccess<GlobalBarrier> {
    /// The process-wide reference accessor.
    #[inline(always)]
    pub fn singleton() -> &'static Self {
        &REFERENCE_ACCESS
    }
}

impl<B: WriteBarrier> ReferenceAccess<B> {
    /// Build a standalone accessor from a configuration.
    ///
    /// For image builders, tools and tests that need an encoding other than
    /// the compiled-in one. The process singleton is unaffected.
    pub fn with_config(config: &RefConfig, barrier: B) -> Result<Self> {
        if let Err(e) = config.validate() {
            log_event(RefEvent::ConfigRejected {
                reason: e.to_string(),
            });
            return Err(e.into());
        }
        Ok(Self::new(config.policy(), barrier))
    }
}
