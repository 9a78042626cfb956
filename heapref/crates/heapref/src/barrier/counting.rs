//! Counting Barrier - instrumentation decorator

use crate::barrier::stats::{AtomicWriteBarrierStats, WriteBarrierStats};
use crate::barrier::WriteBarrier;
use crate::logging::{log_event, RefEvent};
use crate::object::{Obj, Off};

/// Counts barrier invocations, then forwards to `inner`.
#[derive(Debug, Default)]
pub struct CountingBarrier<B> {
    inner: B,
    stats: AtomicWriteBarrierStats,
}

impl<B: WriteBarrier> CountingBarrier<B> {
    pub const fn new(inner: B) -> Self {
        Self {
            inner,
            stats: AtomicWriteBarrierStats::new(),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn stats(&self) -> &AtomicWriteBarrierStats {
        &self.stats
    }

    /// Snapshot the counters and report them to the event log.
    pub fn report(&self) -> WriteBarrierStats {
        let snapshot = self.stats.snapshot();
        log_event(RefEvent::BarrierStats {
            total_invocations: snapshot.total_invocations,
            null_stores: snapshot.null_stores,
            self_references: snapshot.self_references,
        });
        snapshot
    }
}

unsafe impl<B: WriteBarrier> WriteBarrier for CountingBarrier<B> {
    #[inline(always)]
    fn post_write(&self, obj: Obj, off: Off, value: Obj) {
        self.stats.record_invocation();
        if value.is_null() {
            self.stats.record_null();
        } else if value == obj {
            self.stats.record_self_reference();
        }
        self.inner.post_write(obj, off, value);
    }
}
