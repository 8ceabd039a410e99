// 灵魂绑定代币（SBT）铸造流程：宿主钱包桥 + 状态机 + mini-app manifest

// 引入模块
pub mod bridge;
pub mod chains;
pub mod config;
pub mod flow;
pub mod manifest;
pub mod props;
pub mod rpc_bridge;
pub mod sbt;
pub mod view;

// 常用类型
pub use bridge::{
    AccountState, BridgeError, Connector, ReceiptStatus, SdkHandle, SdkStatus, WalletBridge,
};
pub use chains::{chain_by_id, find_chain_by_name, resolve_target_chain, Chain, CHAINS};
pub use flow::{FlowError, MintFlow, MintStep, OperationId, OperationKind, TxEvent};
pub use props::{host_page_props, ButtonSize, ButtonVariant, MintCallbacks, MintFlowProps};
pub use sbt::{ContractWrite, TxHash};
pub use view::{PrimaryAction, SheetBody, SheetView, TriggerButton};
