//! The single global execution lock and its FIFO hand-off policy.

use crate::events::LockEvent;
use crate::state::SimThread;

#[derive(Clone, Debug, Default)]
pub struct GlobalLock {
    holder: Option<usize>,
}

impl GlobalLock {
    pub fn holder(&self) -> Option<usize> {
        self.holder
    }

    pub fn is_held_by(&self, thread_id: usize) -> bool {
        self.holder == Some(thread_id)
    }

    /// Frees the lock when its holder finished or moved onto an IO phase.
    pub fn release_if_idle(&mut self, threads: &[SimThread], tick: u64) -> Option<LockEvent> {
        let holder = self.holder?;
        if threads[holder].wants_lock() {
            return None;
        }
        self.holder = None;
        tracing::trace!(tick, thread = holder, "lock released");
        Some(LockEvent::Released {
            tick,
            thread_id: holder,
        })
    }

    /// Stamps new waiters, then grants a free lock to the longest waiter.
    ///
    /// Waiters with the same `waiting_since` are served in thread index order.
    pub fn acquire(&mut self, threads: &mut [SimThread], tick: u64) -> Option<LockEvent> {
        for thread in threads.iter_mut() {
            if thread.wants_lock() && !self.is_held_by(thread.id) && thread.waiting_since.is_none()
            {
                thread.waiting_since = Some(tick);
            }
        }

        if self.holder.is_some() {
            return None;
        }

        let mut winner: Option<(usize, u64)> = None;
        for (idx, thread) in threads.iter().enumerate() {
            if !thread.wants_lock() {
                continue;
            }
            let Some(since) = thread.waiting_since else {
                continue;
            };
            match winner {
                Some((_, best)) if since >= best => {}
                _ => winner = Some((idx, since)),
            }
        }

        let (idx, since) = winner?;
        let thread = &mut threads[idx];
        thread.waiting_since = None;
        self.holder = Some(thread.id);
        let waited = tick - since;
        tracing::trace!(tick, thread = thread.id, waited, "lock acquired");
        Some(LockEvent::Acquired {
            tick,
            thread_id: thread.id,
            waited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, RequestProfile};

    fn cpu_profile() -> RequestProfile {
        RequestProfile::new("cpu", "CPU", "", vec![Phase::cpu(5)])
    }

    fn io_profile() -> RequestProfile {
        RequestProfile::new("io", "IO", "", vec![Phase::io(5)])
    }

    #[test]
    fn acquire_prefers_earliest_waiting_since() {
        let profile = cpu_profile();
        let mut threads = vec![SimThread::new(0, &profile), SimThread::new(1, &profile)];
        threads[0].waiting_since = Some(7);
        threads[1].waiting_since = Some(3);

        let mut lock = GlobalLock::default();
        let event = lock.acquire(&mut threads, 9).unwrap();

        assert_eq!(
            event,
            LockEvent::Acquired {
                tick: 9,
                thread_id: 1,
                waited: 6,
            }
        );
        assert_eq!(lock.holder(), Some(1));
        assert_eq!(threads[1].waiting_since, None);
        assert_eq!(threads[0].waiting_since, Some(7));
    }

    #[test]
    fn acquire_breaks_equal_timestamps_by_lowest_index() {
        let profile = cpu_profile();
        let mut threads = vec![
            SimThread::new(0, &profile),
            SimThread::new(1, &profile),
            SimThread::new(2, &profile),
        ];
        let mut lock = GlobalLock::default();
        let event = lock.acquire(&mut threads, 0).unwrap();

        assert_eq!(event.thread_id(), 0);
        assert_eq!(threads[1].waiting_since, Some(0));
        assert_eq!(threads[2].waiting_since, Some(0));
    }

    #[test]
    fn acquire_ignores_io_threads() {
        let profile = io_profile();
        let mut threads = vec![SimThread::new(0, &profile)];
        let mut lock = GlobalLock::default();

        assert_eq!(lock.acquire(&mut threads, 0), None);
        assert_eq!(lock.holder(), None);
        assert_eq!(threads[0].waiting_since, None);
    }

    #[test]
    fn held_lock_only_stamps_waiters() {
        let profile = cpu_profile();
        let mut threads = vec![SimThread::new(0, &profile), SimThread::new(1, &profile)];
        let mut lock = GlobalLock::default();
        lock.acquire(&mut threads, 0);

        assert_eq!(lock.acquire(&mut threads, 1), None);
        assert_eq!(lock.holder(), Some(0));
        assert_eq!(threads[0].waiting_since, None);
        assert_eq!(threads[1].waiting_since, Some(0));
    }

    #[test]
    fn release_only_when_holder_stops_wanting_lock() {
        let profile = RequestProfile::new("p", "P", "", vec![Phase::cpu(1), Phase::io(1)]);
        let mut threads = vec![SimThread::new(0, &profile)];
        let mut lock = GlobalLock::default();
        lock.acquire(&mut threads, 0);

        assert_eq!(lock.release_if_idle(&threads, 0), None);

        threads[0].advance();
        assert_eq!(
            lock.release_if_idle(&threads, 1),
            Some(LockEvent::Released {
                tick: 1,
                thread_id: 0,
            })
        );
        assert_eq!(lock.holder(), None);
    }
}
