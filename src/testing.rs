//! Test doubles shared by the unit tests

use crate::account::{Account, Address};
use crate::account_source::AccountSource;
use crate::provider::{codes, EventHandler, JsonRpcTransport, RpcError, Subscription};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// EIP-712 reference "Mail" payload
pub const MAIL_TYPED_DATA: &str = r#"{
    "types": {
        "EIP712Domain": [
            { "name": "name", "type": "string" },
            { "name": "version", "type": "string" },
            { "name": "chainId", "type": "uint256" },
            { "name": "verifyingContract", "type": "address" }
        ],
        "Person": [
            { "name": "name", "type": "string" },
            { "name": "wallet", "type": "address" }
        ],
        "Mail": [
            { "name": "from", "type": "Person" },
            { "name": "to", "type": "Person" },
            { "name": "contents", "type": "string" }
        ]
    },
    "primaryType": "Mail",
    "domain": {
        "name": "Ether Mail",
        "version": "1",
        "chainId": 1,
        "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
    },
    "message": {
        "from": { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
        "to": { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" },
        "contents": "Hello, Bob!"
    }
}"#;

type Handlers = Arc<Mutex<HashMap<String, Vec<(u64, EventHandler)>>>>;

/// Scripted JSON-RPC transport
///
/// Responses are queued per method; the last queued response keeps being
/// returned. Unscripted methods answer "method not found".
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<std::result::Result<Value, RpcError>>>>,
    requests: Mutex<Vec<(String, Value)>>,
    handlers: Handlers,
    next_handler: AtomicU64,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, response: std::result::Result<Value, RpcError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Script a connected wallet on `network_id` holding `accounts`
    pub fn with_accounts(&self, network_id: u64, accounts: &[&str]) {
        self.respond("eth_requestAccounts", Ok(json!(accounts)));
        self.respond("eth_accounts", Ok(json!(accounts)));
        self.respond("eth_chainId", Ok(json!(format!("0x{:x}", network_id))));
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|(method, _)| method).collect()
    }

    pub fn emit(&self, event: &str, payload: Value) {
        let handlers: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap()
            .get(event)
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        for handler in handlers {
            handler(payload.clone());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JsonRpcTransport for MockTransport {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, RpcError> {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(method) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(RpcError::new(
                codes::METHOD_NOT_FOUND,
                format!("{} not scripted", method),
            )),
        }
    }

    fn subscribe(&self, event: &str, handler: EventHandler) -> Subscription {
        let id = self.next_handler.fetch_add(1, Ordering::SeqCst);
        self.handlers
            .lock()
            .unwrap()
            .entry(event.to_string())
            .or_default()
            .push((id, handler));

        let handlers = self.handlers.clone();
        let event = event.to_string();
        Subscription::new(move || {
            if let Some(hs) = handlers.lock().unwrap().get_mut(&event) {
                hs.retain(|(handler_id, _)| *handler_id != id);
            }
        })
    }

    async fn close(&self) -> std::result::Result<(), RpcError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Account source answering from a fixed table and counting fetches
#[derive(Default)]
pub struct MockAccountSource {
    accounts: Mutex<HashMap<String, Account>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl MockAccountSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.address.normalized(), account);
    }

    pub fn with(addresses: &[&str]) -> Self {
        let source = Self::new();
        for address in addresses {
            source.insert(Account::new(*address));
        }
        source
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountSource for MockAccountSource {
    async fn fetch(&self, address: &Address) -> Result<Option<Account>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::AccountSource("account source unavailable".to_string()));
        }
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&address.normalized())
            .cloned())
    }
}
