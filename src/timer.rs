use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::models::DayKey;

/// A rest timer is identified by the day and the exercise's position in it.
pub type TimerKey = (DayKey, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    Remaining(u32),
    Finished,
}

struct TimerHandle {
    // Dropping the sender wakes the countdown thread and stops it.
    cancel: Sender<()>,
    thread: JoinHandle<()>,
}

/// Running countdowns, at most one per key. Starting a timer for a key that
/// already has one replaces it.
pub struct RestTimers {
    interval: Duration,
    active: HashMap<TimerKey, TimerHandle>,
}

impl Default for RestTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTimers {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    /// Length of one countdown step; one second outside of tests.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval, active: HashMap::new() }
    }

    pub fn start<F>(&mut self, key: TimerKey, seconds: u32, mut on_tick: F)
    where
        F: FnMut(TimerKey, TimerTick) + Send + 'static,
    {
        if self.cancel(key) {
            debug!(day = %key.0, exercise = key.1, "replacing running rest timer");
        }

        let (cancel, cancelled) = mpsc::channel::<()>();
        let interval = self.interval;
        let thread = thread::spawn(move || {
            let mut remaining = seconds;
            while remaining > 0 {
                on_tick(key, TimerTick::Remaining(remaining));
                match cancelled.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => remaining -= 1,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
            on_tick(key, TimerTick::Finished);
        });

        self.active.insert(key, TimerHandle { cancel, thread });
    }

    /// Stops the timer for `key`. Returns whether one was registered.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let Some(handle) = self.active.remove(&key) else {
            return false;
        };
        drop(handle.cancel);
        if handle.thread.join().is_err() {
            warn!(day = %key.0, exercise = key.1, "rest timer callback panicked");
        }
        true
    }

    pub fn cancel_all(&mut self) {
        let keys: Vec<TimerKey> = self.active.keys().copied().collect();
        for key in keys {
            self.cancel(key);
        }
    }

    /// Blocks until the timer for `key` runs out.
    pub fn wait(&mut self, key: TimerKey) {
        if let Some(TimerHandle { cancel, thread }) = self.active.remove(&key) {
            if thread.join().is_err() {
                warn!(day = %key.0, exercise = key.1, "rest timer callback panicked");
            }
            drop(cancel);
        }
    }

    pub fn is_running(&self, key: TimerKey) -> bool {
        self.active.get(&key).is_some_and(|handle| !handle.thread.is_finished())
    }

    pub fn active_count(&self) -> usize {
        self.active.values().filter(|handle| !handle.thread.is_finished()).count()
    }
}

impl Drop for RestTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder() -> (Arc<Mutex<Vec<(TimerKey, TimerTick)>>>, impl FnMut(TimerKey, TimerTick) + Send + Clone + 'static) {
        let ticks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&ticks);
        (ticks, move |key: TimerKey, tick: TimerTick| sink.lock().unwrap().push((key, tick)))
    }

    #[test]
    fn countdown_runs_to_finish() {
        let (ticks, on_tick) = recorder();
        let mut timers = RestTimers::with_interval(Duration::from_millis(1));
        timers.start((DayKey::A, 0), 3, on_tick);
        timers.wait((DayKey::A, 0));

        let seen: Vec<TimerTick> = ticks.lock().unwrap().iter().map(|(_, t)| *t).collect();
        assert_eq!(
            seen,
            vec![TimerTick::Remaining(3), TimerTick::Remaining(2), TimerTick::Remaining(1), TimerTick::Finished]
        );
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn restarting_a_key_replaces_the_timer() {
        let (ticks, on_tick) = recorder();
        let mut timers = RestTimers::with_interval(Duration::from_secs(60));
        timers.start((DayKey::B, 1), 90, on_tick.clone());
        timers.start((DayKey::B, 1), 120, on_tick.clone());
        timers.start((DayKey::A, 1), 75, on_tick);

        assert_eq!(timers.active_count(), 2);
        assert!(timers.is_running((DayKey::B, 1)));

        assert!(timers.cancel((DayKey::B, 1)));
        assert!(!timers.cancel((DayKey::B, 1)));
        timers.cancel_all();
        assert_eq!(timers.active_count(), 0);

        // The replaced and cancelled timers never reach zero.
        let ticks = ticks.lock().unwrap();
        assert!(ticks.iter().all(|(_, tick)| *tick != TimerTick::Finished));
        assert!(ticks.contains(&((DayKey::B, 1), TimerTick::Remaining(120))));
    }

    #[test]
    fn zero_second_timer_finishes_immediately() {
        let (ticks, on_tick) = recorder();
        let mut timers = RestTimers::with_interval(Duration::from_secs(60));
        timers.start((DayKey::A, 2), 0, on_tick);
        timers.wait((DayKey::A, 2));
        assert_eq!(ticks.lock().unwrap().as_slice(), &[((DayKey::A, 2), TimerTick::Finished)]);
    }
}
