// ── Account lifecycle ──
//
// One configured account: authentication, the poll scheduler, command
// routing and the published snapshot. Every tick fetches the appliance
// list, each appliance's controls and (optionally) notifications, then
// swaps a complete `Snapshot` into the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use strum::Display;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use smartdevice_api::transport::{TlsMode, TransportConfig};
use smartdevice_api::{Authenticator, Credentials, HomeApiClient};

use crate::command::{Command, CommandEnvelope, Route};
use crate::config::{AccountConfig, TlsVerification};
use crate::convert;
use crate::door::DoorWatcher;
use crate::error::CoreError;
use crate::model::{Appliance, ControlKey, DoorState, Snapshot};
use crate::store::SnapshotStore;
use crate::stream::SnapshotStream;

const COMMAND_CHANNEL_SIZE: usize = 32;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

// ── AccountState ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AccountState {
    Stopped,
    Authenticating,
    Running,
    /// Setup failed; call `setup()` again to retry.
    Failed,
}

/// Result of a `refresh()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was published.
    Updated,
    /// Another poll was in flight; nothing was fetched.
    Skipped,
}

// ── Account ──────────────────────────────────────────────────────

/// The entry point for consumers.
///
/// Cheaply cloneable. Nothing talks to the network until
/// [`setup()`](Self::setup).
#[derive(Clone)]
pub struct Account {
    inner: Arc<AccountInner>,
}

struct AccountInner {
    config: AccountConfig,
    store: Arc<SnapshotStore>,
    state: watch::Sender<AccountState>,
    authenticator: Authenticator,
    client: Mutex<Option<Arc<HomeApiClient>>>,
    /// Held for the duration of one poll tick.
    poll_gate: Mutex<()>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current run; cancelled on unload, replaced on
    /// the next setup.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    doors: DoorWatcher,
}

impl Account {
    pub fn new(config: AccountConfig) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let (state, _) = watch::channel(AccountState::Stopped);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();
        let authenticator = Authenticator::new(config.oauth.clone(), &build_transport(&config));
        let doors = DoorWatcher::new(config.door_debounce);

        Self {
            inner: Arc::new(AccountInner {
                config,
                store,
                state,
                authenticator,
                client: Mutex::new(None),
                poll_gate: Mutex::new(()),
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
                doors,
            }),
        }
    }

    pub fn config(&self) -> &AccountConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Authenticate (password accounts), run the first poll and start the
    /// background tasks.
    ///
    /// Authentication failures are returned with their login step and
    /// leave the account `Failed`. The first poll never fails the setup;
    /// unreachable collections are simply empty.
    pub async fn setup(&self) -> Result<(), CoreError> {
        if *self.inner.state.borrow() == AccountState::Running {
            debug!("setup called on a running account");
            return Ok(());
        }
        let config = &self.inner.config;
        config.validate()?;

        self.inner.state.send_replace(AccountState::Authenticating);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let client = match self.connect().await {
            Ok(client) => client,
            Err(e) => {
                self.inner.state.send_replace(AccountState::Failed);
                return Err(e);
            }
        };
        *self.inner.client.lock().await = Some(client);

        self.refresh().await?;
        self.inner.state.send_replace(AccountState::Running);

        let mut handles = self.inner.task_handles.lock().await;
        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let account = self.clone();
            handles.push(tokio::spawn(command_processor_task(account, rx, child.clone())));
        }
        if !config.poll_interval.is_zero() {
            let account = self.clone();
            handles.push(tokio::spawn(poll_task(account, config.poll_interval, child)));
        }

        info!(
            account = %config.credentials.display_identity(),
            poll_interval = ?config.poll_interval,
            "account running"
        );
        Ok(())
    }

    async fn connect(&self) -> Result<Arc<HomeApiClient>, CoreError> {
        let config = &self.inner.config;
        let transport = build_transport(config);
        let client = HomeApiClient::new(config.api_url.clone(), &config.credentials, &transport)?;

        if let Credentials::Password { username, password } = &config.credentials {
            let token = self
                .inner
                .authenticator
                .authenticate(username, password)
                .await
                .inspect_err(|e| error!(error = %e, stage = ?e.auth_stage(), "login failed"))?;
            client.set_token(token);
        }
        Ok(Arc::new(client))
    }

    /// Stop background tasks and drop the session. The account can be set
    /// up again afterwards.
    pub async fn unload(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        *self.inner.client.lock().await = None;
        self.inner.doors.clear().await;
        self.inner.store.clear();

        // The previous receiver was consumed by the command processor.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner.state.send_replace(AccountState::Stopped);
        debug!("account unloaded");
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Run one poll tick now, unless one is already in flight.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        let Ok(_gate) = self.inner.poll_gate.try_lock() else {
            debug!("poll already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };
        self.poll().await?;
        Ok(RefreshOutcome::Updated)
    }

    /// Schedule a poll in the background and return immediately.
    pub async fn request_refresh(&self) {
        let account = self.clone();
        let cancel = self.inner.cancel_child.lock().await.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                result = account.refresh() => {
                    if let Err(e) = result {
                        warn!(error = %e, "requested refresh failed");
                    }
                }
            }
        });

        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    async fn poll(&self) -> Result<(), CoreError> {
        let client = self
            .inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::AccountNotRunning)?;
        let config = &self.inner.config;
        let retries = config.fetch_retries;
        let api: &HomeApiClient = &client;
        let mut tick = Tick::default();

        let devices = with_retries(retries, move || api.list_devices()).await;
        let devices = tick.degrade("devices", None, devices);

        let control_results = join_all(devices.iter().map(|d| {
            let device_id = d.device_id.as_str();
            with_retries(retries, move || api.list_controls(device_id))
        }))
        .await;

        let appliances: Vec<Appliance> = devices
            .into_iter()
            .zip(control_results)
            .map(|(device, result)| {
                let controls = tick.degrade("controls", Some(&device.device_id), result);
                convert::appliance(device, controls, config.availability)
            })
            .collect();

        let notifications = if config.notifications.enabled {
            let raw = with_retries(retries, move || api.list_notifications()).await;
            convert::notifications(
                tick.degrade("notifications", None, raw),
                &config.notifications,
            )
        } else {
            Vec::new()
        };

        debug!(
            appliances = appliances.len(),
            notifications = notifications.len(),
            "poll complete"
        );
        let snapshot = self.inner.store.replace(Snapshot {
            appliances,
            notifications,
        });
        self.inner.doors.observe(&snapshot).await;

        if tick.unauthorized {
            self.reauthenticate(api).await;
        }
        Ok(())
    }

    /// Recover from a 401. Password accounts log in again; an API key
    /// cannot be renewed here.
    async fn reauthenticate(&self, client: &HomeApiClient) {
        match &self.inner.config.credentials {
            Credentials::Password { username, password } => {
                info!("session rejected, logging in again");
                match self.inner.authenticator.authenticate(username, password).await {
                    Ok(token) => {
                        client.set_token(token);
                        info!("re-authenticated");
                    }
                    Err(e) => {
                        client.clear_token();
                        error!(error = %e, stage = ?e.auth_stage(), "re-authentication failed");
                    }
                }
            }
            Credentials::ApiKey { .. } => {
                error!("API key rejected by the Home API");
            }
        }
    }

    // ── Command execution ────────────────────────────────────────

    /// Send one command and wait for the vendor to accept it.
    ///
    /// The snapshot is not updated; use [`request_refresh()`](Self::request_refresh)
    /// or [`execute_and_refresh()`](Self::execute_and_refresh).
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if *self.inner.state.borrow() != AccountState::Running {
            return Err(CoreError::AccountNotRunning);
        }

        let (tx, rx) = oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::AccountNotRunning)?;

        rx.await.map_err(|_| CoreError::AccountNotRunning)?
    }

    /// Execute, give the appliance `settle_delay` to apply the change, then
    /// poll. Waits for an in-flight poll instead of skipping.
    pub async fn execute_and_refresh(&self, cmd: Command) -> Result<(), CoreError> {
        self.execute(cmd).await?;
        tokio::time::sleep(self.inner.config.settle_delay).await;
        let _gate = self.inner.poll_gate.lock().await;
        self.poll().await
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Set up, run `f`, unload. Background polling is disabled.
    pub async fn oneshot<F, Fut, T>(config: AccountConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Account) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval = Duration::ZERO;

        let account = Account::new(cfg);
        account.setup().await?;
        let result = f(account.clone()).await;
        account.unload().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn state(&self) -> AccountState {
        *self.inner.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<AccountState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> SnapshotStream {
        self.inner.store.subscribe()
    }

    pub fn appliance(&self, device_id: &str) -> Result<Appliance, CoreError> {
        self.snapshot()
            .appliance(device_id)
            .cloned()
            .ok_or_else(|| CoreError::ApplianceNotFound {
                device_id: device_id.to_owned(),
            })
    }

    /// Debounced state of an auto door.
    pub async fn door_state(&self, device_id: &str, key: &ControlKey) -> DoorState {
        self.inner.doors.confirmed(device_id, key).await
    }

    pub async fn door_updates(
        &self,
        device_id: &str,
        key: &ControlKey,
    ) -> Option<watch::Receiver<DoorState>> {
        self.inner.doors.subscribe(device_id, key).await
    }
}

// ── Tick bookkeeping ─────────────────────────────────────────────

#[derive(Default)]
struct Tick {
    unauthorized: bool,
}

impl Tick {
    /// Degrade a failed fetch to an empty collection.
    fn degrade<T>(
        &mut self,
        what: &str,
        device_id: Option<&str>,
        result: Result<Vec<T>, smartdevice_api::Error>,
    ) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                if e.is_unauthorized() {
                    self.unauthorized = true;
                }
                warn!(what, device_id, error = %e, "fetch failed, using empty list");
                Vec::new()
            }
        }
    }
}

/// Retry connect and timeout failures up to `retries` extra times.
async fn with_retries<T, F, Fut>(retries: u32, mut op: F) -> Result<T, smartdevice_api::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, smartdevice_api::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < retries => {
                attempt += 1;
                debug!(attempt, error = %e, "transient fetch failure, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            other => return other,
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn poll_task(account: Account, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // setup already polled

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = account.refresh().await {
                    warn!(error = %e, "periodic poll failed");
                }
            }
        }
    }
}

async fn command_processor_task(
    account: Account,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&account, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

/// Validate a command and issue its single vendor call.
async fn route_command(account: &Account, cmd: Command) -> Result<(), CoreError> {
    let route = cmd.prepare(&account.snapshot())?;
    let client = account
        .inner
        .client
        .lock()
        .await
        .clone()
        .ok_or(CoreError::AccountNotRunning)?;

    let result = match &route {
        Route::Control {
            device_id,
            control_name,
            request,
        } => client.set_control(device_id, control_name, request).await,
        Route::Acknowledge {
            device_id,
            notification_id,
        } => {
            client
                .acknowledge_notification(device_id, notification_id)
                .await
        }
    };

    match result {
        Ok(()) => {
            debug!(?route, "command accepted");
            Ok(())
        }
        Err(e) => {
            if e.is_unauthorized() {
                account.reauthenticate(&client).await;
            }
            Err(CoreError::from(e).into_command())
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &AccountConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        ..TransportConfig::default()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
    }
}
