use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::{AccountState, BridgeError, Connector, ReceiptStatus, SdkStatus, WalletBridge};
use crate::chains::{resolve_target_chain, Chain};
use crate::props::{MintCallbacks, MintFlowProps};
use crate::sbt::{ContractWrite, TxHash};

// 铸造成功后自动关闭面板的延迟
pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

pub const SDK_NOT_LOADED: &str = "Farcaster SDK not loaded";
pub const CONNECT_FAILED: &str = "Failed to connect wallet";
pub const MINT_FAILED: &str = "Mint transaction failed";
pub const RECEIPT_FAILED: &str = "Transaction confirmation failed";
pub const RECEIPT_REVERTED: &str = "Transaction reverted";

// 面板当前显示的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MintStep {
    Idle,
    Connecting,
    Minting,
    Waiting,
    Success,
    Error,
}

impl MintStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            MintStep::Idle => "idle",
            MintStep::Connecting => "connecting",
            MintStep::Minting => "minting",
            MintStep::Waiting => "waiting",
            MintStep::Success => "success",
            MintStep::Error => "error",
        }
    }

    // 这些步骤期间不能开始新的尝试
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            MintStep::Connecting | MintStep::Minting | MintStep::Waiting
        )
    }
}

impl fmt::Display for MintStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 每次异步操作的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Connect,
    Switch,
    Mint,
}

// 钱包桥回传的异步结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    Connected,
    ConnectFailed(BridgeError),
    Switched,
    SwitchFailed(BridgeError),
    WriteSubmitted(TxHash),
    WriteFailed(BridgeError),
    ReceiptConfirmed(TxHash),
    ReceiptReverted(TxHash),
    ReceiptFailed(BridgeError),
}

impl TxEvent {
    fn kind(&self) -> OperationKind {
        match self {
            TxEvent::Connected | TxEvent::ConnectFailed(_) => OperationKind::Connect,
            TxEvent::Switched | TxEvent::SwitchFailed(_) => OperationKind::Switch,
            _ => OperationKind::Mint,
        }
    }

    // 除了写入成功，其他结果都会结束当前操作
    fn is_terminal(&self) -> bool {
        !matches!(self, TxEvent::WriteSubmitted(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("mint widget is disabled")]
    Disabled,
    #[error("a mint attempt is already in flight (step: {0})")]
    AttemptInFlight(MintStep),
    #[error("mint attempt already finished (step: {0}), close the sheet first")]
    AttemptSettled(MintStep),
    #[error("retry is only available after a failed attempt (step: {0})")]
    RetryUnavailable(MintStep),
    #[error("host SDK not loaded")]
    SdkNotLoaded,
}

struct Operation {
    id: OperationId,
    kind: OperationKind,
    cancel: CancellationToken,
    // 一次性闩锁：终态只能进入一次
    settled: bool,
}

struct FlowEvent {
    op: OperationId,
    event: TxEvent,
}

// 后台任务把结果送回控制器
struct EventSink {
    op: OperationId,
    tx: mpsc::UnboundedSender<FlowEvent>,
}

impl EventSink {
    fn send(&self, event: TxEvent) {
        let op = self.op;
        if self.tx.send(FlowEvent { op, event }).is_err() {
            debug!(%op, "mint flow dropped before event delivery");
        }
    }
}

enum Wake {
    Event(Option<FlowEvent>),
    Dismiss,
}

// 铸造流程控制器
//
// 用户操作都是同步方法，钱包调用在 tokio 任务里执行，
// 结果通过 next_event / pump / settle 应用到状态上。
pub struct MintFlow<B: WalletBridge, S: SdkStatus> {
    props: MintFlowProps,
    target: &'static Chain,
    bridge: Arc<B>,
    sdk: S,
    callbacks: MintCallbacks,
    step: MintStep,
    sheet_open: bool,
    error: Option<String>,
    tx_hash: Option<TxHash>,
    operation: Option<Operation>,
    next_operation: u64,
    dismiss_at: Option<Instant>,
    last_switch_failure: Option<BridgeError>,
    events_tx: mpsc::UnboundedSender<FlowEvent>,
    events_rx: mpsc::UnboundedReceiver<FlowEvent>,
}

impl<B: WalletBridge, S: SdkStatus> MintFlow<B, S> {
    pub fn new(props: MintFlowProps, bridge: B, sdk: S, callbacks: MintCallbacks) -> Self {
        // 目标链在构造时解析一次，之后不再变化
        let target = resolve_target_chain(&props.network);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            props,
            target,
            bridge: Arc::new(bridge),
            sdk,
            callbacks,
            step: MintStep::Idle,
            sheet_open: false,
            error: None,
            tx_hash: None,
            operation: None,
            next_operation: 0,
            dismiss_at: None,
            last_switch_failure: None,
            events_tx,
            events_rx,
        }
    }

    pub fn step(&self) -> MintStep {
        self.step
    }

    pub fn is_sheet_open(&self) -> bool {
        self.sheet_open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        self.tx_hash
    }

    pub fn props(&self) -> &MintFlowProps {
        &self.props
    }

    pub fn target_chain(&self) -> &'static Chain {
        self.target
    }

    pub fn account(&self) -> AccountState {
        self.bridge.account()
    }

    pub fn is_sdk_loaded(&self) -> bool {
        self.sdk.is_loaded()
    }

    // 钱包当前链是否就是目标链
    pub fn is_correct_network(&self) -> bool {
        self.bridge.account().chain_id == Some(self.target.id)
    }

    pub fn current_operation(&self) -> Option<OperationId> {
        self.operation.as_ref().map(|op| op.id)
    }

    pub fn operation_kind(&self) -> Option<OperationKind> {
        self.operation
            .as_ref()
            .filter(|op| !op.settled)
            .map(|op| op.kind)
    }

    // 是否有尚未结束的异步操作
    pub fn is_busy(&self) -> bool {
        self.operation.as_ref().is_some_and(|op| !op.settled)
    }

    pub fn dismiss_deadline(&self) -> Option<Instant> {
        self.dismiss_at
    }

    pub fn last_switch_failure(&self) -> Option<&BridgeError> {
        self.last_switch_failure.as_ref()
    }

    // 主按钮：打开面板，条件满足时直接铸造
    pub fn initiate(&mut self) -> Result<(), FlowError> {
        // 成功面板在关闭前保持不变
        if self.step == MintStep::Success {
            return Err(FlowError::AttemptSettled(self.step));
        }
        if !self.sdk.is_loaded() {
            warn!("mint requested before host SDK loaded");
            self.cancel_operation();
            self.error = Some(SDK_NOT_LOADED.to_string());
            self.set_step(MintStep::Error);
            self.sheet_open = true;
            return Ok(());
        }
        if self.props.disabled {
            return Err(FlowError::Disabled);
        }
        self.ensure_startable()?;

        self.sheet_open = true;
        let account = self.bridge.account();
        if account.connected && self.is_correct_network() {
            self.submit()
        } else {
            // 等用户在面板里连接钱包或切换网络
            self.error = None;
            self.set_step(MintStep::Idle);
            Ok(())
        }
    }

    pub fn connect_wallet(&mut self) -> Result<(), FlowError> {
        self.ensure_startable()?;
        self.set_step(MintStep::Connecting);
        let (op, cancel) = self.begin(OperationKind::Connect);
        info!(%op, "requesting wallet connection");
        self.spawn(op, cancel, |bridge, sink| async move {
            match bridge.connect(Connector::FarcasterFrame).await {
                Ok(()) => sink.send(TxEvent::Connected),
                Err(err) => sink.send(TxEvent::ConnectFailed(err)),
            }
        });
        Ok(())
    }

    // 切换网络；成功或失败都不改变当前步骤
    pub fn switch_network(&mut self) -> Result<(), FlowError> {
        self.ensure_startable()?;
        let chain_id = self.target.id;
        let (op, cancel) = self.begin(OperationKind::Switch);
        info!(%op, chain_id, network = self.target.name, "requesting network switch");
        self.spawn(op, cancel, move |bridge, sink| async move {
            match bridge.switch_chain(chain_id).await {
                Ok(()) => sink.send(TxEvent::Switched),
                Err(err) => sink.send(TxEvent::SwitchFailed(err)),
            }
        });
        Ok(())
    }

    // 提交铸造；未连接先连接，链不对先切换
    pub fn submit(&mut self) -> Result<(), FlowError> {
        self.ensure_startable()?;
        let account = self.bridge.account();
        if !account.connected {
            return self.connect_wallet();
        }
        if !self.is_correct_network() {
            return self.switch_network();
        }

        self.error = None;
        self.tx_hash = None;
        self.set_step(MintStep::Minting);
        let (op, cancel) = self.begin(OperationKind::Mint);

        // 已连接却拿不到地址，按写入失败处理
        let Some(recipient) = account.address else {
            self.observe(op, TxEvent::WriteFailed(BridgeError::NotConnected));
            return Ok(());
        };

        let request = ContractWrite::mint(self.props.contract_address, recipient, self.target.id);
        info!(
            %op,
            contract = %request.address,
            %recipient,
            chain_id = request.chain_id,
            "submitting mint"
        );
        self.spawn(op, cancel, move |bridge, sink| async move {
            let hash = match bridge.write_contract(request).await {
                Ok(hash) => hash,
                Err(err) => {
                    sink.send(TxEvent::WriteFailed(err));
                    return;
                }
            };
            sink.send(TxEvent::WriteSubmitted(hash));
            match bridge.wait_for_receipt(hash).await {
                Ok(ReceiptStatus::Success) => sink.send(TxEvent::ReceiptConfirmed(hash)),
                Ok(ReceiptStatus::Reverted) => sink.send(TxEvent::ReceiptReverted(hash)),
                Err(err) => sink.send(TxEvent::ReceiptFailed(err)),
            }
        });
        Ok(())
    }

    pub fn retry(&mut self) -> Result<(), FlowError> {
        if self.step != MintStep::Error {
            return Err(FlowError::RetryUnavailable(self.step));
        }
        if !self.sdk.is_loaded() {
            return Err(FlowError::SdkNotLoaded);
        }
        self.error = None;
        self.submit()
    }

    // 任意状态下关闭面板并复位
    pub fn close(&mut self) {
        self.cancel_operation();
        self.dismiss_at = None;
        self.sheet_open = false;
        self.error = None;
        self.tx_hash = None;
        self.set_step(MintStep::Idle);
    }

    // 对应面板的 open 状态变化
    pub fn set_sheet_open(&mut self, open: bool) {
        if open {
            self.sheet_open = true;
        } else {
            self.close();
        }
    }

    // 应用一个异步结果，返回是否生效
    //
    // 过期操作的事件、以及已进入终态后的重复事件都会被忽略，
    // 因此每次尝试的回调最多触发一次。
    pub fn observe(&mut self, op: OperationId, event: TxEvent) -> bool {
        let current = self
            .operation
            .as_mut()
            .filter(|current| current.id == op && current.kind == event.kind());
        let Some(current) = current else {
            debug!(%op, ?event, "ignoring event for stale operation");
            return false;
        };
        if current.settled {
            debug!(%op, ?event, "operation already settled");
            return false;
        }
        if event.is_terminal() {
            current.settled = true;
        }

        match event {
            TxEvent::Connected => {
                info!(%op, "wallet connected");
                self.set_step(MintStep::Idle);
            }
            TxEvent::ConnectFailed(err) => {
                warn!(%op, %err, "wallet connection failed");
                self.error = Some(CONNECT_FAILED.to_string());
                self.set_step(MintStep::Error);
            }
            TxEvent::Switched => {
                info!(%op, chain_id = self.target.id, "network switched");
                self.last_switch_failure = None;
            }
            TxEvent::SwitchFailed(err) => {
                // 切换失败不进入错误状态，只记录
                warn!(%op, %err, chain_id = self.target.id, "network switch failed");
                self.last_switch_failure = Some(err);
            }
            TxEvent::WriteSubmitted(hash) => {
                self.tx_hash = Some(hash);
                if self.step == MintStep::Minting {
                    self.set_step(MintStep::Waiting);
                }
            }
            TxEvent::WriteFailed(err) => {
                let message = err.message().unwrap_or_else(|| MINT_FAILED.to_string());
                self.fail_attempt(op, message);
            }
            TxEvent::ReceiptFailed(err) => {
                let message = err.message().unwrap_or_else(|| RECEIPT_FAILED.to_string());
                self.fail_attempt(op, message);
            }
            TxEvent::ReceiptReverted(hash) => {
                self.tx_hash = Some(hash);
                self.fail_attempt(op, RECEIPT_REVERTED.to_string());
            }
            TxEvent::ReceiptConfirmed(hash) => {
                info!(%op, tx = %hash, "mint confirmed");
                self.tx_hash = Some(hash);
                self.set_step(MintStep::Success);
                self.dismiss_at = Some(Instant::now() + AUTO_DISMISS);
                self.callbacks.success(hash);
            }
        }
        true
    }

    // 等待下一个异步结果或自动关闭计时器，两者都没有时立即返回
    pub async fn next_event(&mut self) -> MintStep {
        let deadline = self.dismiss_at;
        if deadline.is_none() && !self.is_busy() {
            return self.step;
        }
        let wake = tokio::select! {
            received = self.events_rx.recv() => Wake::Event(received),
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::Dismiss,
        };
        match wake {
            Wake::Event(Some(FlowEvent { op, event })) => {
                self.observe(op, event);
            }
            Wake::Event(None) => {}
            Wake::Dismiss => {
                info!("auto-dismissing sheet after successful mint");
                self.close();
            }
        }
        self.step
    }

    // 不等待，应用所有已到达的结果
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(FlowEvent { op, event }) = self.events_rx.try_recv() {
            if self.observe(op, event) {
                applied += 1;
            }
        }
        if self.dismiss_at.is_some_and(|at| at <= Instant::now()) {
            info!("auto-dismissing sheet after successful mint");
            self.close();
        }
        applied
    }

    // 一直处理事件直到没有进行中的操作
    pub async fn settle(&mut self) -> MintStep {
        while self.is_busy() {
            self.next_event().await;
        }
        self.step
    }

    // 新操作只能从 idle 或 error 开始
    fn ensure_startable(&self) -> Result<(), FlowError> {
        match self.step {
            step if step.is_in_flight() => Err(FlowError::AttemptInFlight(step)),
            MintStep::Success => Err(FlowError::AttemptSettled(MintStep::Success)),
            _ => Ok(()),
        }
    }

    fn fail_attempt(&mut self, op: OperationId, message: String) {
        warn!(%op, %message, "mint attempt failed");
        self.error = Some(message.clone());
        self.set_step(MintStep::Error);
        self.callbacks.error(message);
    }

    fn set_step(&mut self, next: MintStep) {
        if self.step != next {
            debug!(from = %self.step, to = %next, "mint step changed");
        }
        self.step = next;
    }

    // 开始新操作，旧操作被取消
    fn begin(&mut self, kind: OperationKind) -> (OperationId, CancellationToken) {
        self.cancel_operation();
        self.next_operation += 1;
        let id = OperationId(self.next_operation);
        let cancel = CancellationToken::new();
        self.operation = Some(Operation {
            id,
            kind,
            cancel: cancel.clone(),
            settled: false,
        });
        (id, cancel)
    }

    fn cancel_operation(&mut self) {
        if let Some(op) = self.operation.take() {
            if !op.settled {
                info!(op = %op.id, kind = ?op.kind, "cancelling in-flight operation");
            }
            op.cancel.cancel();
        }
    }

    fn spawn<F, Fut>(&self, op: OperationId, cancel: CancellationToken, task: F)
    where
        F: FnOnce(Arc<B>, EventSink) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let sink = EventSink {
            op,
            tx: self.events_tx.clone(),
        };
        let work = task(Arc::clone(&self.bridge), sink);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => debug!(%op, "operation cancelled"),
                _ = work => {}
            }
        });
    }
}

impl<B: WalletBridge, S: SdkStatus> Drop for MintFlow<B, S> {
    fn drop(&mut self) {
        // 组件销毁时取消进行中的钱包调用
        self.cancel_operation();
    }
}
