use anyhow::Context;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Timer,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    Queued,
    /// A manual refresh was already waiting; this one folds into it.
    Coalesced,
    Stopped,
}

/// Counts of cycles begun and finished since the scheduler was spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleProgress {
    pub started: u64,
    pub completed: u64,
}

pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Runs `cycle` once right away and then every `period`.
    ///
    /// Cycles never overlap: the loop awaits each cycle before looking at the
    /// next trigger. Timer ticks missed while a cycle runs are skipped and
    /// manual triggers queue at most one deep.
    pub fn spawn<F, Fut>(period: Duration, mut cycle: F) -> anyhow::Result<SchedulerHandle>
    where
        F: FnMut(Trigger) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        anyhow::ensure!(!period.is_zero(), "refresh period must be non-zero");

        let (trigger_tx, mut trigger_rx) = mpsc::channel::<Trigger>(1);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (progress_tx, progress_rx) = watch::channel(CycleProgress::default());

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately and belongs to the startup cycle.
            ticker.tick().await;

            if *shutdown_rx.borrow() {
                tracing::info!("refresh scheduler stopped before startup");
                return;
            }

            let mut trigger = Trigger::Startup;
            loop {
                tracing::debug!(?trigger, "refresh cycle starting");
                progress_tx.send_modify(|p| p.started += 1);
                cycle(trigger).await;
                progress_tx.send_modify(|p| p.completed += 1);

                trigger = tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    Some(trigger) = trigger_rx.recv() => trigger,
                    _ = ticker.tick() => Trigger::Timer,
                };
            }

            tracing::info!("refresh scheduler stopped");
        });

        tracing::info!(period_secs = period.as_secs(), "refresh scheduler armed");

        Ok(SchedulerHandle {
            trigger: trigger_tx,
            shutdown: shutdown_tx,
            progress: progress_rx,
            task,
        })
    }
}

/// Control side of a running scheduler. Dropping it also stops the loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    trigger: mpsc::Sender<Trigger>,
    shutdown: watch::Sender<bool>,
    progress: watch::Receiver<CycleProgress>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Asks for a cycle outside the timer schedule.
    pub fn refresh_now(&self) -> RefreshRequest {
        self.trigger().refresh_now()
    }

    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            tx: self.trigger.clone(),
            progress: self.progress.clone(),
        }
    }

    /// Stops future cycles. A cycle already running is allowed to finish.
    pub async fn cancel(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        self.task.await.context("refresh scheduler task failed")?;
        Ok(())
    }
}

/// Cloneable manual-refresh button for a running scheduler.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    tx: mpsc::Sender<Trigger>,
    progress: watch::Receiver<CycleProgress>,
}

impl RefreshTrigger {
    pub fn refresh_now(&self) -> RefreshRequest {
        match self.tx.try_send(Trigger::Manual) {
            Ok(()) => RefreshRequest::Queued,
            Err(TrySendError::Full(_)) => RefreshRequest::Coalesced,
            Err(TrySendError::Closed(_)) => RefreshRequest::Stopped,
        }
    }

    /// Requests a cycle and waits until a cycle that had not yet begun at the
    /// time of the request has finished.
    pub async fn refresh_and_wait(&self) -> RefreshRequest {
        let mut progress = self.progress.clone();
        let target = progress.borrow_and_update().started + 1;

        let request = self.refresh_now();
        if request == RefreshRequest::Stopped {
            return request;
        }

        let finished = progress.wait_for(|p| p.completed >= target).await.is_ok();
        if finished {
            request
        } else {
            RefreshRequest::Stopped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[tokio::test(start_paused = true)]
    async fn fires_at_startup_then_every_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = RefreshScheduler::spawn(Duration::from_secs(300), move |trigger| {
            let tx = tx.clone();
            async move {
                let _ = tx.send((trigger, time::Instant::now()));
            }
        })
        .unwrap();

        let (t0, at0) = rx.recv().await.unwrap();
        let (t1, at1) = rx.recv().await.unwrap();
        let (t2, at2) = rx.recv().await.unwrap();
        assert_eq!(t0, Trigger::Startup);
        assert_eq!(t1, Trigger::Timer);
        assert_eq!(t2, Trigger::Timer);
        assert_eq!(at1 - at0, Duration::from_secs(300));
        assert_eq!(at2 - at1, Duration::from_secs(300));

        handle.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn manual_triggers_coalesce_while_cycle_in_flight() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let (release_tx, release_rx) = mpsc::unbounded_channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));

        let handle = RefreshScheduler::spawn(Duration::from_secs(300), move |trigger| {
            let seen_tx = seen_tx.clone();
            let release_rx = release_rx.clone();
            async move {
                let _ = seen_tx.send(trigger);
                release_rx.lock().await.recv().await;
            }
        })
        .unwrap();

        assert_eq!(seen_rx.recv().await, Some(Trigger::Startup));
        assert_eq!(handle.refresh_now(), RefreshRequest::Queued);
        assert_eq!(handle.refresh_now(), RefreshRequest::Coalesced);
        assert_eq!(handle.refresh_now(), RefreshRequest::Coalesced);

        release_tx.send(()).unwrap();
        assert_eq!(seen_rx.recv().await, Some(Trigger::Manual));
        release_tx.send(()).unwrap();

        handle.cancel().await.unwrap();
        // Exactly one manual cycle ran for three requests.
        assert!(seen_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_cycles_never_overlap_and_skip_missed_ticks() {
        let active = Arc::new(AtomicUsize::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let base = time::Instant::now();

        let cycle_active = active.clone();
        let handle = RefreshScheduler::spawn(Duration::from_secs(300), move |trigger| {
            let tx = tx.clone();
            let active = cycle_active.clone();
            async move {
                let overlapping = active.fetch_add(1, Ordering::SeqCst);
                let _ = tx.send((trigger, time::Instant::now() - base, overlapping));
                // Only the startup cycle overruns, spanning the ticks at 300s and 600s.
                if trigger == Trigger::Startup {
                    time::sleep(Duration::from_secs(700)).await;
                }
                active.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .unwrap();

        let mut cycles = Vec::new();
        for _ in 0..4 {
            cycles.push(rx.recv().await.unwrap());
        }
        handle.cancel().await.unwrap();

        assert!(cycles.iter().all(|(_, _, overlapping)| *overlapping == 0));
        let timeline: Vec<_> = cycles.iter().map(|(t, at, _)| (*t, at.as_secs())).collect();
        assert_eq!(
            timeline,
            vec![
                (Trigger::Startup, 0),
                (Trigger::Timer, 700),
                (Trigger::Timer, 900),
                (Trigger::Timer, 1200),
            ]
        );
    }

    #[tokio::test]
    async fn startup_cycle_runs_before_an_early_manual_request() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let handle = RefreshScheduler::spawn(Duration::from_secs(300), move |trigger| {
            let seen_tx = seen_tx.clone();
            async move {
                let _ = seen_tx.send(trigger);
            }
        })
        .unwrap();

        assert_eq!(handle.refresh_now(), RefreshRequest::Queued);
        assert_eq!(seen_rx.recv().await, Some(Trigger::Startup));
        assert_eq!(seen_rx.recv().await, Some(Trigger::Manual));

        handle.cancel().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_and_wait_returns_after_a_fresh_cycle() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let base = time::Instant::now();
        let handle = RefreshScheduler::spawn(Duration::from_secs(300), move |trigger| {
            let seen_tx = seen_tx.clone();
            async move {
                let _ = seen_tx.send(trigger);
                time::sleep(Duration::from_secs(10)).await;
            }
        })
        .unwrap();

        // Startup is in flight, so the request has to wait for it and then for
        // the manual cycle queued behind it.
        assert_eq!(seen_rx.recv().await, Some(Trigger::Startup));
        let request = handle.trigger().refresh_and_wait().await;

        assert_eq!(request, RefreshRequest::Queued);
        assert_eq!(seen_rx.try_recv(), Ok(Trigger::Manual));
        assert_eq!(time::Instant::now() - base, Duration::from_secs(20));

        handle.cancel().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_scheduler_refuses_refresh() {
        let handle = RefreshScheduler::spawn(Duration::from_secs(300), |_| async {}).unwrap();
        let trigger = handle.trigger();
        handle.cancel().await.unwrap();
        assert_eq!(trigger.refresh_now(), RefreshRequest::Stopped);
        assert_eq!(trigger.refresh_and_wait().await, RefreshRequest::Stopped);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let err = RefreshScheduler::spawn(Duration::ZERO, |_| async {}).unwrap_err();
        assert!(err.to_string().contains("non-zero"));
    }
}
