#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use sbt_mint_flow::{
    AccountState, BridgeError, Connector, ContractWrite, MintCallbacks, ReceiptStatus, TxHash,
    WalletBridge,
};

pub const BASE: u64 = 8453;
pub const MAINNET: u64 = 1;

pub fn user() -> Address {
    Address::repeat_byte(0x42)
}

pub fn hash_abcd() -> TxHash {
    TxHash::left_padding_from(&[0xab, 0xcd])
}

// 按脚本返回结果的钱包桥，队列为空时一律成功
pub struct FakeBridge {
    account: Mutex<AccountState>,
    connect_as: (Address, u64),
    connect_results: Mutex<VecDeque<Result<(), BridgeError>>>,
    switch_results: Mutex<VecDeque<Result<(), BridgeError>>>,
    write_results: Mutex<VecDeque<Result<TxHash, BridgeError>>>,
    receipt_results: Mutex<VecDeque<Result<ReceiptStatus, BridgeError>>>,
    connect_gate: Mutex<Option<Arc<Notify>>>,
    write_gate: Mutex<Option<Arc<Notify>>>,
    receipt_gate: Mutex<Option<Arc<Notify>>>,
    connects: Mutex<Vec<Connector>>,
    switches: Mutex<Vec<u64>>,
    writes: Mutex<Vec<ContractWrite>>,
    receipts: Mutex<Vec<TxHash>>,
}

impl FakeBridge {
    fn with_account(account: AccountState, connect_as: (Address, u64)) -> Arc<Self> {
        Arc::new(Self {
            account: Mutex::new(account),
            connect_as,
            connect_results: Mutex::new(VecDeque::new()),
            switch_results: Mutex::new(VecDeque::new()),
            write_results: Mutex::new(VecDeque::new()),
            receipt_results: Mutex::new(VecDeque::new()),
            connect_gate: Mutex::new(None),
            write_gate: Mutex::new(None),
            receipt_gate: Mutex::new(None),
            connects: Mutex::new(Vec::new()),
            switches: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            receipts: Mutex::new(Vec::new()),
        })
    }

    // 未连接；连接成功后落在 chain_id 上
    pub fn disconnected(chain_id: u64) -> Arc<Self> {
        Self::with_account(AccountState::disconnected(), (user(), chain_id))
    }

    pub fn connected(chain_id: u64) -> Arc<Self> {
        Self::with_account(AccountState::connected(user(), chain_id), (user(), chain_id))
    }

    pub fn with_state(account: AccountState) -> Arc<Self> {
        Self::with_account(account, (user(), BASE))
    }

    // 模拟用户在组件外切换网络
    pub fn set_chain(&self, chain_id: u64) {
        self.account.lock().chain_id = Some(chain_id);
    }

    pub fn queue_connect(&self, result: Result<(), BridgeError>) {
        self.connect_results.lock().push_back(result);
    }

    pub fn queue_switch(&self, result: Result<(), BridgeError>) {
        self.switch_results.lock().push_back(result);
    }

    pub fn queue_write(&self, result: Result<TxHash, BridgeError>) {
        self.write_results.lock().push_back(result);
    }

    pub fn queue_receipt(&self, result: Result<ReceiptStatus, BridgeError>) {
        self.receipt_results.lock().push_back(result);
    }

    pub fn gate_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn gate_write(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.write_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn gate_receipt(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.receipt_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn connects(&self) -> Vec<Connector> {
        self.connects.lock().clone()
    }

    pub fn switches(&self) -> Vec<u64> {
        self.switches.lock().clone()
    }

    pub fn writes(&self) -> Vec<ContractWrite> {
        self.writes.lock().clone()
    }

    pub fn receipts(&self) -> Vec<TxHash> {
        self.receipts.lock().clone()
    }

    async fn pass(gate: &Mutex<Option<Arc<Notify>>>) {
        let gate = gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl WalletBridge for FakeBridge {
    fn account(&self) -> AccountState {
        *self.account.lock()
    }

    async fn connect(&self, connector: Connector) -> Result<(), BridgeError> {
        self.connects.lock().push(connector);
        Self::pass(&self.connect_gate).await;
        let result = self.connect_results.lock().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            let (address, chain_id) = self.connect_as;
            *self.account.lock() = AccountState::connected(address, chain_id);
        }
        result
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        self.switches.lock().push(chain_id);
        let result = self.switch_results.lock().pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.account.lock().chain_id = Some(chain_id);
        }
        result
    }

    async fn write_contract(&self, request: ContractWrite) -> Result<TxHash, BridgeError> {
        self.writes.lock().push(request);
        Self::pass(&self.write_gate).await;
        let result = self.write_results.lock().pop_front();
        result.unwrap_or_else(|| Ok(hash_abcd()))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<ReceiptStatus, BridgeError> {
        self.receipts.lock().push(hash);
        Self::pass(&self.receipt_gate).await;
        let result = self.receipt_results.lock().pop_front();
        result.unwrap_or(Ok(ReceiptStatus::Success))
    }
}

// 记录回调调用
#[derive(Clone, Default)]
pub struct Outcomes {
    successes: Arc<Mutex<Vec<TxHash>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl Outcomes {
    pub fn callbacks(&self) -> MintCallbacks {
        let successes = self.successes.clone();
        let errors = self.errors.clone();
        MintCallbacks::new()
            .on_mint_success(move |hash| successes.lock().push(hash))
            .on_mint_error(move |message| errors.lock().push(message))
    }

    pub fn successes(&self) -> Vec<TxHash> {
        self.successes.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}
