use alloy_primitives::{Address, B256};
use alloy_sol_types::{sol, SolCall};
use serde_json::{json, Value};

// SBT 合约对外暴露的唯一写入方法
sol! {
    // 给指定地址铸造一枚不可转让的 token
    function mint(address to) external;
}

// 交易哈希
pub type TxHash = B256;

// 钱包写合约时需要的全部参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractWrite {
    // 合约地址
    pub address: Address,
    // 调用的方法名
    pub function_name: &'static str,
    // 接收 SBT 的账户，也就是唯一的参数
    pub recipient: Address,
    // 目标链 ID
    pub chain_id: u64,
}

impl ContractWrite {
    // 构造一次 mint 调用
    pub fn mint(address: Address, recipient: Address, chain_id: u64) -> Self {
        Self {
            address,
            function_name: "mint",
            recipient,
            chain_id,
        }
    }

    // 调用参数列表
    pub fn args(&self) -> Vec<Address> {
        vec![self.recipient]
    }

    // mint 方法的 JSON ABI 片段
    pub fn abi_fragment() -> Value {
        json!([{
            "name": "mint",
            "type": "function",
            "inputs": [{ "name": "to", "type": "address" }],
            "outputs": [],
            "stateMutability": "nonpayable",
        }])
    }

    // ABI 编码后的 calldata（选择器 + 参数）
    pub fn calldata(&self) -> Vec<u8> {
        mintCall {
            to: self.recipient,
        }
        .abi_encode()
    }

    pub fn calldata_hex(&self) -> String {
        format!("0x{}", hex::encode(self.calldata()))
    }
}

// 截断长字符串，保留开头和结尾
fn shorten(value: &str, head: usize, tail: usize) -> String {
    if value.len() <= head + tail {
        return value.to_string();
    }
    format!("{}...{}", &value[..head], &value[value.len() - tail..])
}

// 地址显示为 0x1234...abcd
pub fn short_address(address: &Address) -> String {
    shorten(&address.to_checksum(None), 6, 4)
}

pub fn full_hash(hash: &TxHash) -> String {
    format!("0x{}", hex::encode(hash.as_slice()))
}

// 交易哈希显示为前 10 位和后 8 位
pub fn short_hash(hash: &TxHash) -> String {
    shorten(&full_hash(hash), 10, 8)
}
