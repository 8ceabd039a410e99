use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::sbt::{ContractWrite, TxHash};

// 钱包连接状态快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    pub connected: bool,
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
}

impl AccountState {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(address: Address, chain_id: u64) -> Self {
        Self {
            connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
        }
    }

    // 已连接且在目标链上
    pub fn is_on_chain(&self, chain_id: u64) -> bool {
        self.connected && self.chain_id == Some(chain_id)
    }
}

// 宿主提供的钱包连接器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    // mini-app 宿主内置的托管钱包
    FarcasterFrame,
}

// 交易回执状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("wallet not connected")]
    NotConnected,
    #[error("chain {0} is not configured")]
    UnsupportedChain(u64),
    #[error("wallet is on chain {actual}, request targets chain {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
    #[error("{0}")]
    Rpc(String),
    #[error("wallet operation failed")]
    Unknown,
}

impl BridgeError {
    // 底层错误自带的描述，Unknown 没有描述
    pub fn message(&self) -> Option<String> {
        match self {
            BridgeError::Unknown => None,
            other => Some(other.to_string()),
        }
    }
}

// 宿主钱包桥
#[async_trait]
pub trait WalletBridge: Send + Sync + 'static {
    // 当前连接状态
    fn account(&self) -> AccountState;

    async fn connect(&self, connector: Connector) -> Result<(), BridgeError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError>;

    // 提交写合约请求，返回待确认的交易哈希
    async fn write_contract(&self, request: ContractWrite) -> Result<TxHash, BridgeError>;

    // 等待交易回执；未确认时 future 保持挂起
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<ReceiptStatus, BridgeError>;
}

#[async_trait]
impl<T: WalletBridge + ?Sized> WalletBridge for Arc<T> {
    fn account(&self) -> AccountState {
        (**self).account()
    }

    async fn connect(&self, connector: Connector) -> Result<(), BridgeError> {
        (**self).connect(connector).await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        (**self).switch_chain(chain_id).await
    }

    async fn write_contract(&self, request: ContractWrite) -> Result<TxHash, BridgeError> {
        (**self).write_contract(request).await
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<ReceiptStatus, BridgeError> {
        (**self).wait_for_receipt(hash).await
    }
}

// 宿主 SDK 是否已加载
pub trait SdkStatus {
    fn is_loaded(&self) -> bool;
}

impl SdkStatus for bool {
    fn is_loaded(&self) -> bool {
        *self
    }
}

// 可共享的加载标记，宿主加载完成后置位
#[derive(Debug, Clone, Default)]
pub struct SdkHandle(Arc<AtomicBool>);

impl SdkHandle {
    pub fn new(loaded: bool) -> Self {
        Self(Arc::new(AtomicBool::new(loaded)))
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.0.store(loaded, Ordering::SeqCst);
    }
}

impl SdkStatus for SdkHandle {
    fn is_loaded(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
