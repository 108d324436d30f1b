//! Bounded claim polling.
//!
//! [`ClaimPoller::start`] spawns one polling task per query. The task issues
//! attempt 0 immediately, then one attempt per tick of a fixed interval until
//! a record shows up, the attempt budget runs out, a lookup fails, or the
//! poll is cancelled.
//!
//! ## Observer contract
//!
//! The observer sees `Loading { attempt }` before every attempt and then
//! exactly one terminal state. Notifications pass through a gate that
//! [`CancelToken::cancel`] also takes, so once `cancel` returns the observer
//! is never called again for that poll, even if an in-flight lookup resolves
//! later.
//!
//! ## Example
//!
//! ```ignore
//! let poller = ClaimPoller::new(HttpClaimTransport::new(DEFAULT_LOOKUP_BASE)?);
//! let mut handle = poller.start(query, |state: &PollState| println!("{state:?}"))?;
//! match handle.wait().await {
//!     PollOutcome::Found(record) => println!("{}", links.url_for(&record)),
//!     other => println!("{other}"),
//! }
//! ```

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use claimwatch_core::{ClaimError, ClaimQuery, PollOutcome, PollState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::FetchError;
use crate::transport::ClaimTransport;

// ============================================================================
// Observer
// ============================================================================

/// Receives poll state transitions.
///
/// Called from the polling task, or from the thread calling
/// [`CancelToken::cancel`] for the `Cancelled` notification.
pub trait PollObserver: Send + Sync + 'static {
    /// Called once per state transition.
    fn on_update(&self, state: &PollState);
}

impl<F> PollObserver for F
where
    F: Fn(&PollState) + Send + Sync + 'static,
{
    fn on_update(&self, state: &PollState) {
        self(state);
    }
}

// ============================================================================
// Notification Gate
// ============================================================================

thread_local! {
    /// Address of the gate whose observer is running on this thread.
    static NOTIFYING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as inside `gate`'s observer until dropped.
struct NotifyScope {
    prev: usize,
}

impl NotifyScope {
    fn enter(gate: &Gate) -> Self {
        Self {
            prev: NOTIFYING.with(|n| n.replace(gate.id())),
        }
    }

    fn is_active(gate: &Gate) -> bool {
        NOTIFYING.with(|n| n.get() == gate.id())
    }
}

impl Drop for NotifyScope {
    fn drop(&mut self) {
        NOTIFYING.with(|n| n.set(self.prev));
    }
}

/// Shared between the polling task, the handle, and cancel tokens.
///
/// `notify` serializes observer calls with terminal transitions. `outcome`
/// is only held for reads and writes, never across a callback, so the
/// observer may query its own handle.
struct Gate {
    observer: Box<dyn PollObserver>,
    notify: Mutex<()>,
    /// `Some` once a terminal state was reached; closes the gate.
    outcome: Mutex<Option<PollOutcome>>,
    cancel_tx: watch::Sender<bool>,
    /// Cancel requested from inside our own observer callback.
    deferred_cancel: AtomicBool,
}

impl Gate {
    fn new(observer: Box<dyn PollObserver>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            observer,
            notify: Mutex::new(()),
            outcome: Mutex::new(None),
            cancel_tx,
            deferred_cancel: AtomicBool::new(false),
        }
    }

    fn id(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }

    fn serialize(&self) -> MutexGuard<'_, ()> {
        self.notify.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Option<PollOutcome>> {
        self.outcome.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, state: &PollState) {
        let _scope = NotifyScope::enter(self);
        self.observer.on_update(state);
    }

    /// Records `outcome` and tells the observer. Caller holds `notify`.
    fn finish(&self, outcome: PollOutcome) {
        *self.lock() = Some(outcome.clone());
        self.notify(&PollState::from(outcome));
    }

    /// Delivers `state` unless the gate is closed. Returns false if the poll
    /// must stop (closed before, or cancelled from inside the callback).
    fn emit(&self, state: PollState) -> bool {
        let _serial = self.serialize();
        if self.lock().is_some() {
            return false;
        }

        if state.is_terminal() {
            if let Some(terminal) = state.into_outcome() {
                self.finish(terminal);
            }
            return false;
        }

        self.notify(&state);

        if self.deferred_cancel.load(Ordering::Acquire) {
            self.finish(PollOutcome::Cancelled);
            return false;
        }

        true
    }

    fn cancel(&self) {
        self.cancel_tx.send_replace(true);

        if NotifyScope::is_active(self) {
            // The emit() below us on this stack holds `notify` and finishes the job
            self.deferred_cancel.store(true, Ordering::Release);
            return;
        }

        let _serial = self.serialize();
        if self.lock().is_some() {
            return;
        }
        self.finish(PollOutcome::Cancelled);
    }

    fn outcome(&self) -> Option<PollOutcome> {
        self.lock().clone()
    }

    fn final_outcome(&self) -> PollOutcome {
        self.outcome().unwrap_or(PollOutcome::Cancelled)
    }
}

// ============================================================================
// Cancel Token & Handle
// ============================================================================

/// Cloneable cancellation capability for one poll.
#[derive(Clone)]
pub struct CancelToken {
    gate: Arc<Gate>,
}

impl CancelToken {
    /// Stops the poll.
    ///
    /// Idempotent and a no-op once the poll is terminal. If the poll was
    /// still running the observer receives `Cancelled` before this returns,
    /// and nothing after.
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// Returns true once the poll reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.gate.outcome().is_some()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Handle to a running poll.
///
/// Dropping the handle cancels the poll.
pub struct PollHandle {
    gate: Arc<Gate>,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    /// Stops the poll. See [`CancelToken::cancel`].
    pub fn cancel(&self) {
        self.gate.cancel();
    }

    /// Returns a token that can cancel this poll from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            gate: Arc::clone(&self.gate),
        }
    }

    /// Returns true once the poll reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.gate.outcome().is_some()
    }

    /// Returns the terminal outcome, if reached.
    pub fn outcome(&self) -> Option<PollOutcome> {
        self.gate.outcome()
    }

    /// Waits for the polling task to finish and returns the outcome.
    ///
    /// The outcome is the same terminal state delivered to the observer.
    pub async fn wait(&mut self) -> PollOutcome {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Poll task ended abnormally");
            }
        }
        self.gate.final_outcome()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.gate.cancel();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("outcome", &self.outcome())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Poller
// ============================================================================

/// Starts bounded polls against a [`ClaimTransport`].
pub struct ClaimPoller<T: ?Sized> {
    transport: Arc<T>,
}

impl<T: ClaimTransport + 'static> ClaimPoller<T> {
    /// Creates a poller that owns `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }
}

impl<T: ClaimTransport + ?Sized + 'static> ClaimPoller<T> {
    /// Creates a poller sharing `transport`.
    pub fn from_arc(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Validates `query` and starts polling on the current tokio runtime.
    ///
    /// Returns immediately; the first attempt is issued by the spawned task
    /// without waiting for the interval.
    ///
    /// # Errors
    ///
    /// Fails if the query is invalid or no tokio runtime is running.
    pub fn start<O: PollObserver>(
        &self,
        query: ClaimQuery,
        observer: O,
    ) -> Result<PollHandle, FetchError> {
        query.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|e| FetchError::NoRuntime(e.to_string()))?;

        let gate = Arc::new(Gate::new(Box::new(observer)));
        let cancel_rx = gate.cancel_tx.subscribe();

        let span = info_span!(
            "claim_poll",
            token = %query.reference_token(),
            max_attempts = query.max_attempts()
        );
        let task = runtime.spawn(
            run_poll(
                Arc::clone(&gate),
                Arc::clone(&self.transport),
                query,
                cancel_rx,
            )
            .instrument(span),
        );

        Ok(PollHandle {
            gate,
            task: Some(task),
        })
    }
}

impl<T: ?Sized> Clone for ClaimPoller<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

async fn cancelled(rx: &mut watch::Receiver<bool>) {
    // Err means the sender is gone, which only happens once the gate is dropped
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}

async fn run_poll<T: ClaimTransport + ?Sized>(
    gate: Arc<Gate>,
    transport: Arc<T>,
    query: ClaimQuery,
    mut cancel_rx: watch::Receiver<bool>,
) -> PollOutcome {
    let max_attempts = query.max_attempts();
    let attempt_timeout = query.attempt_timeout();

    let mut ticker = interval(query.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut remaining = max_attempts;
    let mut attempt = 0u32;

    loop {
        tokio::select! {
            biased;
            () = cancelled(&mut cancel_rx) => {
                debug!(attempt, "Cancelled before next attempt");
                return gate.final_outcome();
            }
            _ = ticker.tick() => {}
        }

        if !gate.emit(PollState::Loading { attempt }) {
            return gate.final_outcome();
        }

        debug!(attempt, remaining, "Issuing claim lookup");
        let result = tokio::select! {
            biased;
            () = cancelled(&mut cancel_rx) => {
                debug!(attempt, "Cancelled with lookup in flight; discarding response");
                return gate.final_outcome();
            }
            result = timeout(attempt_timeout, transport.lookup(&query)) => result,
        };
        remaining -= 1;

        let state = match result {
            Ok(Ok(records)) => match records.into_iter().next() {
                Some(record) => {
                    info!(attempt, token = %record.token, status = %record.claimed_status, "Claim record found");
                    PollState::Found(record)
                }
                None if remaining == 0 => {
                    info!(attempts = max_attempts, "Attempt budget exhausted");
                    PollState::Exhausted {
                        attempts: max_attempts,
                    }
                }
                None => {
                    debug!(attempt, remaining, "No claim record yet");
                    attempt += 1;
                    continue;
                }
            },
            Ok(Err(err)) => {
                warn!(attempt, error = %err, "Claim lookup failed; stopping");
                PollState::Failed(err)
            }
            Err(_) => {
                warn!(attempt, timeout_ms = attempt_timeout.as_millis(), "Claim lookup timed out; stopping");
                PollState::Failed(ClaimError::Timeout(attempt_timeout))
            }
        };

        gate.emit(state);
        return gate.final_outcome();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use claimwatch_core::{ClaimRecord, ClaimStatus};
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    /// Always answers with an empty data array.
    struct EmptyTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl ClaimTransport for EmptyTransport {
        async fn lookup(&self, _query: &ClaimQuery) -> Result<Vec<ClaimRecord>, ClaimError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn recorder() -> (Arc<Mutex<Vec<PollState>>>, impl PollObserver) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        (states, move |state: &PollState| {
            sink.lock().unwrap().push(state.clone());
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_budget() {
        let transport = Arc::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let poller = ClaimPoller::from_arc(Arc::clone(&transport));
        let (states, observer) = recorder();

        let query = ClaimQuery::builder("ref", "shop").max_attempts(4).build().unwrap();
        let mut handle = poller.start(query, observer).unwrap();

        assert_eq!(handle.wait().await, PollOutcome::Exhausted { attempts: 4 });
        assert_eq!(transport.calls.load(Ordering::SeqCst), 4);

        let states = states.lock().unwrap();
        assert_eq!(states.len(), 5);
        assert_eq!(states[4], PollState::Exhausted { attempts: 4 });
        assert!(states.iter().all(|s| !matches!(s, PollState::Found(_))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_query() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let query = ClaimQuery::new("", "shop");
        assert!(matches!(
            poller.start(query, |_: &PollState| {}),
            Err(FetchError::Core(_))
        ));
    }

    #[test]
    fn test_start_outside_runtime_fails() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let query = ClaimQuery::new("ref", "shop");
        assert!(matches!(
            poller.start(query, |_: &PollState| {}),
            Err(FetchError::NoRuntime(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let (states, observer) = recorder();
        let query = ClaimQuery::builder("ref", "shop")
            .poll_interval(Duration::from_secs(60))
            .build()
            .unwrap();

        let mut handle = poller.start(query, observer).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        handle.cancel();
        handle.cancel();
        handle.cancel_token().cancel();

        assert_eq!(handle.wait().await, PollOutcome::Cancelled);
        let states = states.lock().unwrap();
        assert_eq!(
            states.iter().filter(|s| **s == PollState::Cancelled).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_terminal_is_noop() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let (states, observer) = recorder();
        let query = ClaimQuery::builder("ref", "shop").max_attempts(1).build().unwrap();

        let mut handle = poller.start(query, observer).unwrap();
        assert_eq!(handle.wait().await, PollOutcome::Exhausted { attempts: 1 });

        handle.cancel();
        assert_eq!(handle.outcome(), Some(PollOutcome::Exhausted { attempts: 1 }));
        assert_eq!(states.lock().unwrap().last(), Some(&PollState::Exhausted { attempts: 1 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_may_cancel_from_callback() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let states = Arc::new(Mutex::new(Vec::new()));
        let token_slot: Arc<Mutex<Option<CancelToken>>> = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&states);
        let slot = Arc::clone(&token_slot);
        let observer = move |state: &PollState| {
            sink.lock().unwrap().push(state.clone());
            if *state == (PollState::Loading { attempt: 1 }) {
                if let Some(token) = slot.lock().unwrap().as_ref() {
                    token.cancel();
                }
            }
        };

        let query = ClaimQuery::builder("ref", "shop").build().unwrap();
        let mut handle = poller.start(query, observer).unwrap();
        *token_slot.lock().unwrap() = Some(handle.cancel_token());

        assert_eq!(handle.wait().await, PollOutcome::Cancelled);
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                PollState::Loading { attempt: 0 },
                PollState::Loading { attempt: 1 },
                PollState::Cancelled,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_may_query_its_own_token() {
        let poller = ClaimPoller::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let seen: Arc<Mutex<Vec<(PollState, bool, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let token_slot: Arc<Mutex<Option<CancelToken>>> = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&seen);
        let slot = Arc::clone(&token_slot);
        let observer = move |state: &PollState| {
            if let Some(token) = slot.lock().unwrap().as_ref() {
                let finished = token.is_finished();
                let debug = format!("{token:?}");
                sink.lock().unwrap().push((state.clone(), finished, debug));
            }
        };

        let query = ClaimQuery::builder("ref", "shop").max_attempts(2).build().unwrap();
        let mut handle = poller.start(query, observer).unwrap();
        *token_slot.lock().unwrap() = Some(handle.cancel_token());

        let outcome = tokio::time::timeout(Duration::from_secs(60), handle.wait())
            .await
            .expect("poll should finish");
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 2 });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(!seen[0].1);
        assert!(!seen[1].1);
        assert_eq!(seen[2].0, PollState::Exhausted { attempts: 2 });
        assert!(seen[2].1);
        assert!(seen[2].2.contains("finished: true"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let transport = Arc::new(EmptyTransport {
            calls: AtomicU32::new(0),
        });
        let poller = ClaimPoller::from_arc(Arc::clone(&transport));
        let (states, observer) = recorder();

        let handle = poller.start(ClaimQuery::new("ref", "shop"), observer).unwrap();
        let token = handle.cancel_token();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        drop(handle);

        let calls = transport.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(token.is_finished());
        assert_eq!(transport.calls.load(Ordering::SeqCst), calls);
        assert_eq!(states.lock().unwrap().last(), Some(&PollState::Cancelled));
    }
}
