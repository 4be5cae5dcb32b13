//! Wallet orchestrator
//!
//! Owns the account registry, the active account and the installed wallet
//! providers. Every mutation is persisted through the session store and
//! announced on the event channel afterwards.
//!
//! State is never locked across a remote call, so concurrent installs and
//! refreshes interleave at await points; the last write wins.

use crate::account::{Account, AccountKey, Address};
use crate::account_source::AccountSource;
use crate::chain::Chain;
use crate::config::NetworkMode;
use crate::provider::{ProviderFactory, Transaction, WalletProvider};
use crate::registry::AccountRegistry;
use crate::session::{SessionStore, WalletSession};
use crate::signature::SignOptions;
use crate::{Error, Result};
use alloy::primitives::U256;
use futures::future::{join_all, try_join_all};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Notifications published by the wallet
#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    /// State was persisted after a mutation
    Changed,
    /// A provider was installed and its first account selected
    Connected { provider: String, account: Account },
}

#[derive(Debug, Clone, Default)]
struct WalletState {
    registry: AccountRegistry,
    active: Option<Account>,
    installed: BTreeSet<String>,
}

impl WalletState {
    fn from_session(session: WalletSession) -> Self {
        let mut registry = AccountRegistry::from_accounts(session.accounts);
        if let Some(active) = &session.active_account {
            if !registry.contains(&active.address) {
                registry = registry.add(active.clone());
            }
        }
        let active = session
            .active_account
            .and_then(|a| registry.find(&a.address).cloned());

        Self {
            registry,
            active,
            installed: session.installed_provider_names.into_iter().collect(),
        }
    }

    fn to_session(&self) -> WalletSession {
        WalletSession {
            accounts: self.registry.elements().to_vec(),
            active_account: self.active.clone(),
            installed_provider_names: self.installed.iter().cloned().collect(),
        }
    }
}

/// Live providers in install order; routing checks them first to last
#[derive(Default)]
struct ProviderSet {
    entries: Vec<(String, Arc<dyn WalletProvider>)>,
}

impl ProviderSet {
    /// Insert or replace in place, returning the replaced instance
    fn insert(
        &mut self,
        name: &str,
        provider: Arc<dyn WalletProvider>,
    ) -> Option<Arc<dyn WalletProvider>> {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, provider)),
            None => {
                self.entries.push((name.to_string(), provider));
                None
            }
        }
    }

    fn remove(&mut self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        let position = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(position).1)
    }

    fn get(&self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
    }

    fn providers(&self) -> Vec<Arc<dyn WalletProvider>> {
        self.entries.iter().map(|(_, p)| p.clone()).collect()
    }

    fn take(&mut self) -> Vec<(String, Arc<dyn WalletProvider>)> {
        std::mem::take(&mut self.entries)
    }
}

pub struct Wallet {
    mode: NetworkMode,
    store: Arc<dyn SessionStore>,
    accounts: Arc<dyn AccountSource>,
    factory: Arc<dyn ProviderFactory>,
    state: RwLock<WalletState>,
    providers: RwLock<ProviderSet>,
    events: broadcast::Sender<WalletEvent>,
}

impl Wallet {
    /// Create a wallet, restoring the persisted session for `mode`
    ///
    /// An unreadable session blob is discarded with a warning.
    pub async fn load(
        mode: NetworkMode,
        store: Arc<dyn SessionStore>,
        accounts: Arc<dyn AccountSource>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Result<Self> {
        let session = match store.read(mode.session_key()).await? {
            Some(blob) => serde_json::from_str::<WalletSession>(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable wallet session");
                WalletSession::default()
            }),
            None => WalletSession::default(),
        };
        debug!(
            mode = ?mode,
            accounts = session.accounts.len(),
            installed = session.installed_provider_names.len(),
            "Loaded wallet session"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            mode,
            store,
            accounts,
            factory,
            state: RwLock::new(WalletState::from_session(session)),
            providers: RwLock::new(ProviderSet::default()),
            events,
        })
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    /// Snapshot of the registry
    pub async fn accounts(&self) -> AccountRegistry {
        self.state.read().await.registry.clone()
    }

    pub async fn active_account(&self) -> Option<Account> {
        self.state.read().await.active.clone()
    }

    pub async fn installed_provider_names(&self) -> Vec<String> {
        self.state.read().await.installed.iter().cloned().collect()
    }

    /// Live provider instance for `name`, if one is held
    pub async fn installed_provider(&self, name: &str) -> Option<Arc<dyn WalletProvider>> {
        self.providers.read().await.get(name)
    }

    /// Subscribe to wallet events; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Fetch an account from the remote source without registering it
    pub async fn get_account(&self, address: &Address) -> Result<Option<Account>> {
        debug!(address = %address, "Fetching account");
        self.accounts.fetch(address).await
    }

    /// Register an account, fetching it when unknown
    ///
    /// Accounts on a chain outside the wallet's network mode are skipped and
    /// `Ok(None)` is returned. The first account ever added becomes active.
    pub async fn add(&self, key: &AccountKey) -> Result<Option<Account>> {
        if !self.mode.accepts(key.chain) {
            info!(
                address = %key.address,
                chain = ?key.chain,
                mode = ?self.mode,
                "Skipping account on a network outside the current mode"
            );
            return Ok(None);
        }

        if let Some(account) = self.state.read().await.registry.find(&key.address) {
            return Ok(Some(account.clone()));
        }

        let Some(account) = self.get_account(&key.address).await? else {
            debug!(address = %key.address, "Account not found");
            return Ok(None);
        };

        {
            let mut state = self.state.write().await;
            state.registry = state.registry.add(account.clone());
            if state.active.is_none() {
                state.active = Some(account.clone());
            }
        }
        self.persist().await?;
        Ok(Some(account))
    }

    /// Register an account and make it the active one
    pub async fn select(&self, key: &AccountKey) -> Result<Option<Account>> {
        let Some(account) = self.add(key).await? else {
            return Ok(None);
        };

        self.state.write().await.active = Some(account.clone());
        self.persist().await?;
        info!(address = %account.address, "Selected account");
        Ok(Some(account))
    }

    pub async fn delete(&self, address: &Address) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.registry = state.registry.delete(address);
            if state.active.as_ref().is_some_and(|a| a.address == *address) {
                state.active = None;
            }
        }
        self.persist().await
    }

    /// Re-fetch every registered account
    ///
    /// The first fetch failure is returned and nothing is updated. Accounts
    /// the source no longer knows keep their cached copy.
    pub async fn refresh(&self) -> Result<()> {
        let cached = self.state.read().await.registry.elements().to_vec();
        let fetched = try_join_all(cached.iter().map(|a| self.accounts.fetch(&a.address))).await?;

        {
            let mut state = self.state.write().await;
            let mut registry = state.registry.clone();
            for account in fetched.into_iter().flatten() {
                if registry.contains(&account.address) {
                    registry = registry.add(account);
                }
            }
            state.active = state
                .active
                .take()
                .map(|active| registry.find(&active.address).cloned().unwrap_or(active));
            state.registry = registry;
        }
        debug!(accounts = cached.len(), "Refreshed accounts");
        self.persist().await
    }

    /// Forget every account and provider; the persisted session is deleted
    pub async fn clear(&self) -> Result<()> {
        let providers = self.providers.write().await.take();
        for (name, provider) in providers {
            release(&name, provider).await;
        }

        *self.state.write().await = WalletState::default();
        info!("Cleared wallet");
        self.persist().await
    }

    /// Connect a provider backend and register its accounts
    ///
    /// Any failure removes `name` from the installed set, releases the
    /// provider and persists before the error is returned.
    pub async fn install(&self, name: &str) -> Result<()> {
        info!(provider = name, "Installing wallet provider");
        let result = self.try_install(name).await;
        if let Err(err) = &result {
            warn!(provider = name, error = %err, "Install failed, rolling back");
            self.rollback_install(name).await;
        }
        result
    }

    async fn try_install(&self, name: &str) -> Result<()> {
        let provider = self
            .factory
            .create(name)
            .await
            .ok_or_else(|| Error::ProviderUnavailable(name.to_string()))?;
        let replaced = self.providers.write().await.insert(name, provider.clone());
        if let Some(previous) = replaced {
            debug!(provider = name, "Releasing previous provider instance");
            release(name, previous).await;
        }

        provider.connect().await?;
        let accounts = provider.get_accounts().await?;
        if accounts.is_empty() {
            info!(provider = name, "Provider connected without accounts");
            return Ok(());
        }

        let Some(first) = accounts.iter().find(|k| self.mode.accepts(k.chain)).cloned() else {
            let connected = accounts[0].chain;
            return match connected.counterpart() {
                Some(expected) => Err(Error::WrongNetwork(expected)),
                None => {
                    info!(provider = name, chain = ?connected, "No account on a supported network");
                    Ok(())
                }
            };
        };

        if let Some(account) = self.select(&first).await? {
            let _ = self.events.send(WalletEvent::Connected {
                provider: name.to_string(),
                account,
            });
        }
        // add() skips accounts outside the network mode
        for key in accounts.iter().filter(|k| **k != first) {
            self.add(key).await?;
        }

        self.state.write().await.installed.insert(name.to_string());
        self.persist().await?;
        info!(provider = name, accounts = accounts.len(), "Installed wallet provider");
        Ok(())
    }

    async fn rollback_install(&self, name: &str) {
        self.state.write().await.installed.remove(name);
        let provider = self.providers.write().await.remove(name);
        if let Some(provider) = provider {
            release(name, provider).await;
        }
        if let Err(e) = self.persist().await {
            warn!(provider = name, error = %e, "Failed to persist rolled back install");
        }
    }

    /// Reconnect every provider installed in a previous session
    ///
    /// Reconnects run concurrently; a failure only affects its own provider.
    /// Returns the providers that failed.
    pub async fn load_providers(&self) -> Vec<(String, Error)> {
        let names = self.installed_provider_names().await;
        let results = join_all(names.iter().map(|name| self.install(name))).await;

        names
            .into_iter()
            .zip(results)
            .filter_map(|(name, result)| result.err().map(|e| (name, e)))
            .collect()
    }

    /// Disconnect a provider and forget that it was installed
    pub async fn uninstall(&self, name: &str) -> Result<()> {
        let provider = self.providers.write().await.remove(name);
        if let Some(provider) = provider {
            release(name, provider).await;
        }
        self.state.write().await.installed.remove(name);
        info!(provider = name, "Uninstalled wallet provider");
        self.persist().await
    }

    /// Provider holding the active account, `None` when either is missing
    ///
    /// Callers use this to send the user through a connect flow before
    /// signing.
    pub async fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        let active = self.active_account().await?;
        self.provider_for(&active.address).await
    }

    async fn provider_for(&self, address: &Address) -> Option<Arc<dyn WalletProvider>> {
        let providers = self.providers.read().await.providers();
        for provider in providers {
            match provider.get_accounts().await {
                Ok(keys) if keys.iter().any(|k| k.address == *address) => return Some(provider),
                Ok(_) => {}
                Err(e) => {
                    debug!(provider = provider.name(), error = %e, "Could not list provider accounts")
                }
            }
        }
        None
    }

    async fn require_provider(&self) -> Result<(Account, Arc<dyn WalletProvider>)> {
        let active = self.active_account().await.ok_or(Error::ProviderNotFound)?;
        let provider = self
            .provider_for(&active.address)
            .await
            .ok_or(Error::ProviderNotFound)?;
        Ok((active, provider))
    }

    pub async fn sign(&self, message: &str, options: SignOptions) -> Result<String> {
        let (active, provider) = self.require_provider().await?;
        provider.sign(message, &active.address, options).await
    }

    pub async fn sign_typed_data(&self, message: &str, options: SignOptions) -> Result<String> {
        let (active, provider) = self.require_provider().await?;
        provider
            .sign_typed_data(message, &active.address, options)
            .await
    }

    pub async fn transact(&self, transaction: &Transaction) -> Result<String> {
        let (_, provider) = self.require_provider().await?;
        provider.transact(transaction).await
    }

    pub async fn switch_chain(&self, chain: Chain) -> Result<()> {
        let (_, provider) = self.require_provider().await?;
        provider.switch_chain(chain).await
    }

    /// Native balance of the active account
    pub async fn balance(&self) -> Result<U256> {
        let (active, provider) = self.require_provider().await?;
        provider.get_balance(&active.address).await
    }

    async fn persist(&self) -> Result<()> {
        let session = self.state.read().await.to_session();
        let key = self.mode.session_key();
        if session.is_empty() {
            self.store.delete(key).await?;
        } else {
            let blob = serde_json::to_string(&session)?;
            self.store.write(key, &blob).await?;
        }
        // no subscribers is fine
        let _ = self.events.send(WalletEvent::Changed);
        Ok(())
    }
}

async fn release(name: &str, provider: Arc<dyn WalletProvider>) {
    if let Err(e) = provider.disconnect().await {
        warn!(provider = name, error = %e, "Failed to disconnect provider");
    }
}
