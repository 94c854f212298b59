use std::collections::VecDeque;
use std::sync::Mutex;

use crate::sample::Sample;

/// FIFO handoff between the download thread and the UI thread.
///
/// The lock is held only for the duration of a single operation, never across
/// computation. `pop` on an empty queue is not an error: it is the "nothing
/// new this frame" signal the consumer polls for.
pub struct SampleQueue {
    inner: Mutex<VecDeque<Sample>>,
}

impl SampleQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, sample: Sample) {
        self.inner.lock().unwrap().push_back(sample);
    }

    pub fn pop(&self) -> Option<Sample> {
        self.inner.lock().unwrap().pop_front()
    }

    /// Drop a specific element if present (identity match on all fields).
    /// Removing an absent element is a no-op.
    pub fn remove(&self, target: &Sample) {
        let mut queue = self.inner.lock().unwrap();
        if let Some(idx) = queue.iter().position(|s| s == target) {
            queue.remove(idx);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64) -> Sample {
        Sample {
            time,
            cumulative_kb: time * 100.0,
            avg_kbs: 100.0,
            window_kbs: 90.0,
        }
    }

    #[test]
    fn pops_in_push_order() {
        let q = SampleQueue::new();
        q.push(sample(0.0));
        q.push(sample(1.0));
        q.push(sample(2.0));

        assert_eq!(q.pop().unwrap().time, 0.0);
        assert_eq!(q.pop().unwrap().time, 1.0);
        assert_eq!(q.pop().unwrap().time, 2.0);
        assert!(q.pop().is_none());
    }

    #[test]
    fn pop_on_empty_is_none() {
        let q = SampleQueue::new();
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn remove_by_identity() {
        let q = SampleQueue::new();
        let first = sample(0.0);
        let second = sample(1.0);
        let third = sample(2.0);
        q.push(first);
        q.push(second.clone());
        q.push(third.clone());

        assert_eq!(q.pop().unwrap().time, 0.0);
        q.remove(&second);

        assert_eq!(q.len(), 1);
        assert_eq!(q.pop().unwrap(), third);
    }

    #[test]
    fn remove_absent_is_noop() {
        let q = SampleQueue::new();
        q.push(sample(0.0));
        q.remove(&sample(5.0));
        assert_eq!(q.len(), 1);
    }
}
