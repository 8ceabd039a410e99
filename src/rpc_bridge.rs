use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Bytes, TransactionRequest, H160, H256, U64},
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::bridge::{AccountState, BridgeError, Connector, ReceiptStatus, WalletBridge};
use crate::sbt::{ContractWrite, TxHash};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

// 已连接的钱包会话
#[derive(Clone)]
struct Session {
    address: Address,
    chain_id: u64,
    client: Arc<Client>,
}

// 基于 JSON-RPC 和本地私钥的托管钱包桥
pub struct RpcWalletBridge {
    // 链 ID 到 RPC 地址
    endpoints: BTreeMap<u64, String>,
    // connect 时使用的链
    default_chain: u64,
    key_path: PathBuf,
    poll_interval: Duration,
    session: RwLock<Option<Session>>,
}

impl RpcWalletBridge {
    pub fn new(key_path: impl Into<PathBuf>, default_chain: u64, rpc_url: impl Into<String>) -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert(default_chain, rpc_url.into());
        Self {
            endpoints,
            default_chain,
            key_path: key_path.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            session: RwLock::new(None),
        }
    }

    // 为其他链登记 RPC 地址，switch_chain 只能切到登记过的链
    pub fn with_endpoint(mut self, chain_id: u64, rpc_url: impl Into<String>) -> Self {
        self.endpoints.insert(chain_id, rpc_url.into());
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn endpoints(&self) -> impl Iterator<Item = (u64, &str)> {
        self.endpoints.iter().map(|(id, url)| (*id, url.as_str()))
    }

    fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    // 在指定链上建立会话，并核对节点返回的链 ID
    async fn open_session(&self, wallet: LocalWallet, chain_id: u64) -> Result<Session, BridgeError> {
        let url = self
            .endpoints
            .get(&chain_id)
            .ok_or(BridgeError::UnsupportedChain(chain_id))?;
        let provider = Provider::<Http>::try_from(url.as_str()).map_err(rpc_error)?;
        let reported = provider.get_chainid().await.map_err(rpc_error)?.low_u64();
        if reported != chain_id {
            return Err(BridgeError::ChainMismatch {
                expected: chain_id,
                actual: reported,
            });
        }

        let wallet = wallet.with_chain_id(chain_id);
        let address = Address::from(wallet.address().0);
        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        Ok(Session {
            address,
            chain_id,
            client,
        })
    }
}

fn rpc_error(err: impl std::fmt::Display) -> BridgeError {
    BridgeError::Rpc(err.to_string())
}

// 读取私钥文件的第一行
pub fn read_secret_from_file(fpath: &Path) -> std::io::Result<String> {
    let f = File::open(fpath)?;
    let mut buf_reader = BufReader::new(f);
    let mut secret = String::new();
    buf_reader.read_line(&mut secret)?;
    Ok(secret.trim().to_string())
}

#[async_trait]
impl WalletBridge for RpcWalletBridge {
    fn account(&self) -> AccountState {
        match self.current_session() {
            Some(session) => AccountState::connected(session.address, session.chain_id),
            None => AccountState::disconnected(),
        }
    }

    async fn connect(&self, connector: Connector) -> Result<(), BridgeError> {
        debug!(?connector, key = %self.key_path.display(), "opening custodial wallet");
        let secret = read_secret_from_file(&self.key_path)
            .map_err(|err| BridgeError::Rpc(format!("cannot read private key: {err}")))?;
        let wallet = LocalWallet::from_str(&secret)
            .map_err(|err| BridgeError::Rpc(format!("invalid private key: {err}")))?;
        let session = self.open_session(wallet, self.default_chain).await?;
        info!(address = %session.address, chain_id = session.chain_id, "wallet connected");
        *self.session.write() = Some(session);
        Ok(())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), BridgeError> {
        let current = self.current_session().ok_or(BridgeError::NotConnected)?;
        if current.chain_id == chain_id {
            return Ok(());
        }
        let wallet = current.client.signer().clone();
        let session = self.open_session(wallet, chain_id).await?;
        info!(from = current.chain_id, to = chain_id, "switched chain");
        *self.session.write() = Some(session);
        Ok(())
    }

    async fn write_contract(&self, request: ContractWrite) -> Result<TxHash, BridgeError> {
        let session = self.current_session().ok_or(BridgeError::NotConnected)?;
        if request.chain_id != session.chain_id {
            return Err(BridgeError::ChainMismatch {
                expected: request.chain_id,
                actual: session.chain_id,
            });
        }

        let tx = TransactionRequest::new()
            .from(H160::from_slice(session.address.as_slice()))
            .to(H160::from_slice(request.address.as_slice()))
            .data(Bytes::from(request.calldata()))
            .chain_id(session.chain_id);
        debug!(
            contract = %request.address,
            function = request.function_name,
            calldata = %request.calldata_hex(),
            "sending contract write"
        );
        let pending = session
            .client
            .send_transaction(tx, None)
            .await
            .map_err(rpc_error)?;
        let hash = pending.tx_hash();
        Ok(TxHash::from(hash.0))
    }

    // 轮询回执直到交易被打包
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<ReceiptStatus, BridgeError> {
        let session = self.current_session().ok_or(BridgeError::NotConnected)?;
        let tx_hash = H256::from_slice(hash.as_slice());
        loop {
            let receipt = session
                .client
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(rpc_error)?;
            match receipt {
                Some(receipt) if receipt.status == Some(U64::from(1)) => {
                    return Ok(ReceiptStatus::Success)
                }
                Some(_) => return Ok(ReceiptStatus::Reverted),
                None => {
                    debug!(tx = %tx_hash, "receipt pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn key_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sbt-mint-{}-{name}", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn secret_is_first_trimmed_line() {
        let path = key_file("secret", "  abcdef  \nsecond line\n");
        assert_eq!(read_secret_from_file(&path).unwrap(), "abcdef");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn endpoints_are_registered() {
        let bridge = RpcWalletBridge::new("/nonexistent", 8453, "http://localhost:8545")
            .with_endpoint(1, "http://localhost:8546");
        let endpoints: Vec<_> = bridge.endpoints().collect();
        assert_eq!(
            endpoints,
            vec![(1, "http://localhost:8546"), (8453, "http://localhost:8545")]
        );
        assert_eq!(bridge.account(), AccountState::disconnected());
    }

    #[tokio::test]
    async fn operations_require_a_session() {
        let bridge = RpcWalletBridge::new("/nonexistent", 8453, "http://localhost:8545");
        let request = ContractWrite::mint(Address::ZERO, Address::repeat_byte(1), 8453);
        assert_eq!(
            bridge.write_contract(request).await,
            Err(BridgeError::NotConnected)
        );
        assert_eq!(bridge.switch_chain(1).await, Err(BridgeError::NotConnected));
        assert_eq!(
            bridge.wait_for_receipt(TxHash::ZERO).await,
            Err(BridgeError::NotConnected)
        );
    }

    #[tokio::test]
    async fn connect_reports_unreadable_key() {
        let bridge = RpcWalletBridge::new("/nonexistent/key", 8453, "http://localhost:8545");
        let err = bridge.connect(Connector::FarcasterFrame).await.unwrap_err();
        assert!(matches!(err, BridgeError::Rpc(msg) if msg.starts_with("cannot read private key")));
    }

    #[tokio::test]
    async fn connect_needs_endpoint_for_default_chain() {
        let path = key_file("unsupported", &"01".repeat(32));
        let mut bridge = RpcWalletBridge::new(&path, 8453, "http://localhost:8545");
        bridge.endpoints.clear();
        let err = bridge.connect(Connector::FarcasterFrame).await.unwrap_err();
        assert_eq!(err, BridgeError::UnsupportedChain(8453));
        assert!(!bridge.account().connected);
        std::fs::remove_file(path).unwrap();
    }
}
