//! Queue of work that must run on the thread owning the screenshot actions.
//!
//! Worker threads never touch action state directly. They post a closure
//! here and the owning thread runs it the next time it drains the queue,
//! typically once per frame.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type MainThreadTask = Box<dyn FnOnce() + Send + 'static>;

/// Receiving end, kept by the main thread.
pub struct MainThreadQueue {
    sender: Sender<MainThreadTask>,
    receiver: Receiver<MainThreadTask>,
}

/// Sending end, cloned into worker continuations.
#[derive(Clone)]
pub struct MainThreadHandle {
    sender: Sender<MainThreadTask>,
}

impl MainThreadHandle {
    /// Schedules `task` on the main thread. Returns `false` if the queue is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.sender.send(Box::new(task)).is_ok()
    }
}

impl MainThreadQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            sender: self.sender.clone(),
        }
    }

    /// Runs every task queued so far without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Blocks until at least one task arrives or `timeout` elapses, then runs
    /// everything queued. Returns how many tasks ran.
    pub fn wait_and_run(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Drains the queue until `done` returns `true` or `timeout` elapses.
    /// Returns `true` if `done` was satisfied.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait_and_run(deadline - now);
        }
    }
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::thread;

    #[test]
    fn tasks_run_only_when_drained() {
        let queue = MainThreadQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = queue.handle();
        let c = counter.clone();
        assert!(handle.post(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn tasks_posted_from_worker_run_on_owner_thread() {
        let queue = MainThreadQueue::new();
        let owner = thread::current().id();
        let ran_on = Arc::new(std::sync::Mutex::new(None));
        let handle = queue.handle();
        let slot = ran_on.clone();

        thread::spawn(move || {
            handle.post(move || {
                *slot.lock().unwrap() = Some(thread::current().id());
            });
        })
        .join()
        .unwrap();

        assert_eq!(queue.wait_and_run(Duration::from_secs(1)), 1);
        assert_eq!(*ran_on.lock().unwrap(), Some(owner));
    }

    #[test]
    fn run_until_times_out() {
        let queue = MainThreadQueue::new();
        assert!(!queue.run_until(Duration::from_millis(20), || false));
        assert!(queue.run_until(Duration::from_millis(20), || true));
    }

    #[test]
    fn post_fails_after_queue_dropped() {
        let queue = MainThreadQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert!(!handle.post(|| {}));
    }
}
