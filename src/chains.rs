use tracing::warn;

// 默认回退网络的链 ID（以太坊主网）
pub const MAINNET_ID: u64 = 1;

// 描述一个 EVM 兼容网络
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    // 链 ID
    pub id: u64,
    // 展示用名称
    pub name: &'static str,
    // 配置中使用的标识
    pub slug: &'static str,
    // 其他常见叫法
    pub aliases: &'static [&'static str],
}

// 静态链表
pub const CHAINS: &[Chain] = &[
    Chain {
        id: MAINNET_ID,
        name: "Ethereum",
        slug: "ethereum",
        aliases: &["mainnet", "eth", "ethereum-mainnet"],
    },
    Chain {
        id: 10,
        name: "OP Mainnet",
        slug: "optimism",
        aliases: &["op", "op-mainnet"],
    },
    Chain {
        id: 56,
        name: "BNB Smart Chain",
        slug: "bsc",
        aliases: &["bnb", "binance"],
    },
    Chain {
        id: 100,
        name: "Gnosis",
        slug: "gnosis",
        aliases: &["xdai"],
    },
    Chain {
        id: 137,
        name: "Polygon",
        slug: "polygon",
        aliases: &["matic", "polygon-mainnet"],
    },
    Chain {
        id: 8453,
        name: "Base",
        slug: "base",
        aliases: &["base-mainnet"],
    },
    Chain {
        id: 42161,
        name: "Arbitrum One",
        slug: "arbitrum",
        aliases: &["arb", "arbitrum-one"],
    },
    Chain {
        id: 42220,
        name: "Celo",
        slug: "celo",
        aliases: &[],
    },
    Chain {
        id: 7777777,
        name: "Zora",
        slug: "zora",
        aliases: &[],
    },
    Chain {
        id: 666666666,
        name: "Degen",
        slug: "degen",
        aliases: &[],
    },
    Chain {
        id: 11155111,
        name: "Sepolia",
        slug: "sepolia",
        aliases: &["ethereum-sepolia"],
    },
    Chain {
        id: 84532,
        name: "Base Sepolia",
        slug: "base-sepolia",
        aliases: &["basesepolia"],
    },
];

// 统一大小写和分隔符，"Base Sepolia"、"base_sepolia" 都视为 "base-sepolia"
fn normalize(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// 按名称查找网络
pub fn find_chain_by_name(name: &str) -> Option<&'static Chain> {
    let wanted = normalize(name);
    if wanted.is_empty() {
        return None;
    }
    CHAINS.iter().find(|chain| {
        chain.slug == wanted
            || normalize(chain.name) == wanted
            || chain.aliases.iter().any(|alias| *alias == wanted)
    })
}

// 按链 ID 查找网络
pub fn chain_by_id(id: u64) -> Option<&'static Chain> {
    CHAINS.iter().find(|chain| chain.id == id)
}

// 解析目标网络，无法识别时回退到主网
pub fn resolve_target_chain(network: &str) -> &'static Chain {
    match find_chain_by_name(network) {
        Some(chain) => chain,
        None => {
            warn!(network, "network not recognized, defaulting to Ethereum mainnet");
            mainnet()
        }
    }
}

fn mainnet() -> &'static Chain {
    // 表的第一项就是主网
    &CHAINS[0]
}
