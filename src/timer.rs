//! Fire-and-forget deferred callbacks.
//!
//! The queue keeps its own clock; the host advances it with the wall time
//! that elapsed between ticks. Tasks cannot be cancelled. A task may fire
//! early through [`TimerQueue::take_matching`], which removes it so the
//! delayed copy never runs a second time.

use std::time::Duration;

#[derive(Debug)]
struct Timer<T> {
    due: Duration,
    seq: u64,
    task: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Duration,
    next_seq: u64,
    pending: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Timer {
            due: self.now + delay,
            seq,
            task,
        });
    }

    /// Moves the clock forward and returns every task that came due, in the
    /// order they were due (ties in scheduling order).
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let now = self.now;
        self.drain(|timer| timer.due <= now)
    }

    /// Removes and returns pending tasks matching `predicate`, regardless of
    /// their due time.
    pub fn take_matching(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        self.drain(|timer| predicate(&timer.task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn drain(&mut self, mut should_fire: impl FnMut(&Timer<T>) -> bool) -> Vec<T> {
        let (mut fired, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|timer| should_fire(timer));
        self.pending = rest;
        fired.sort_by_key(|timer| (timer.due, timer.seq));
        fired.into_iter().map(|timer| timer.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_once_due() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(300), "reset");
        queue.schedule(Duration::from_millis(50), "focus");

        assert!(queue.advance(Duration::from_millis(49)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(1)), vec!["focus"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.advance(Duration::from_secs(1)), vec!["reset"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_simultaneous_tasks_keep_scheduling_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(10), 1);
        queue.schedule(Duration::from_millis(10), 2);
        queue.schedule(Duration::from_millis(5), 0);
        assert_eq!(queue.advance(Duration::from_millis(10)), vec![0, 1, 2]);
    }

    #[test]
    fn test_take_matching_fires_early_and_only_once() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(300), "reset");
        queue.schedule(Duration::from_millis(50), "focus");

        assert_eq!(queue.take_matching(|task| *task == "reset"), vec!["reset"]);
        assert_eq!(queue.advance(Duration::from_secs(1)), vec!["focus"]);
    }

    #[test]
    fn test_delay_is_relative_to_current_clock() {
        let mut queue = TimerQueue::new();
        queue.advance(Duration::from_millis(100));
        queue.schedule(Duration::from_millis(50), ());
        assert!(queue.advance(Duration::from_millis(49)).is_empty());
        assert_eq!(queue.advance(Duration::from_millis(1)).len(), 1);
    }
}
