use crate::bridge::{SdkStatus, WalletBridge};
use crate::flow::{MintFlow, MintStep};
use crate::props::{ButtonSize, ButtonVariant};
use crate::sbt::{short_address, short_hash};

// 打开面板的主按钮
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerButton {
    pub label: String,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Connect,
    Switch,
    Mint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryButton {
    pub action: PrimaryAction,
    pub label: &'static str,
    pub variant: ButtonVariant,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

// 已连接但不在目标链上时显示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkBanner {
    pub message: &'static str,
    pub switch_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetBody {
    Idle {
        banner: Option<NetworkBanner>,
        details: Vec<DetailRow>,
        primary: PrimaryButton,
    },
    Connecting {
        message: &'static str,
    },
    Minting {
        headline: &'static str,
        hint: &'static str,
    },
    Waiting {
        headline: &'static str,
        hint: &'static str,
        tx: Option<String>,
    },
    Success {
        headline: &'static str,
        message: &'static str,
        done_label: &'static str,
    },
    Error {
        headline: &'static str,
        message: Option<String>,
        close_label: &'static str,
        retry_label: &'static str,
        retry_enabled: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetView {
    pub open: bool,
    pub title: &'static str,
    pub body: SheetBody,
}

pub fn sheet_title(step: MintStep) -> &'static str {
    match step {
        MintStep::Idle => "Mint Soulbound Token",
        MintStep::Connecting => "Connecting Wallet",
        MintStep::Minting => "Preparing Mint",
        MintStep::Waiting => "Minting SBT...",
        MintStep::Success => "SBT Minted Successfully!",
        MintStep::Error => "Transaction Failed",
    }
}

impl<B: WalletBridge, S: SdkStatus> MintFlow<B, S> {
    pub fn trigger(&self) -> TriggerButton {
        let props = self.props();
        TriggerButton {
            label: props.button_text.clone(),
            variant: props.variant,
            size: props.size,
            disabled: props.disabled || !self.is_sdk_loaded(),
        }
    }

    // 当前步骤对应的面板内容
    pub fn view(&self) -> SheetView {
        let step = self.step();
        let body = match step {
            MintStep::Idle => self.idle_body(),
            MintStep::Connecting => SheetBody::Connecting {
                message: "Connecting to your Farcaster wallet...",
            },
            MintStep::Minting => SheetBody::Minting {
                headline: "Preparing mint transaction",
                hint: "Please approve the transaction in your wallet",
            },
            MintStep::Waiting => SheetBody::Waiting {
                headline: "Transaction submitted",
                hint: "Waiting for confirmation on the blockchain...",
                tx: self.tx_hash().map(|hash| short_hash(&hash)),
            },
            MintStep::Success => SheetBody::Success {
                headline: "SBT Minted!",
                message: "Your Soulbound Token has been successfully minted",
                done_label: "Done",
            },
            MintStep::Error => {
                let account = self.account();
                let wrong_network = account.connected && !self.is_correct_network();
                SheetBody::Error {
                    headline: "Transaction Failed",
                    message: self.error().map(str::to_string),
                    close_label: "Close",
                    retry_label: "Try Again",
                    retry_enabled: self.is_sdk_loaded() && !wrong_network,
                }
            }
        };
        SheetView {
            open: self.is_sheet_open(),
            title: sheet_title(step),
            body,
        }
    }

    fn idle_body(&self) -> SheetBody {
        let account = self.account();
        let correct = self.is_correct_network();
        let network = self.target_chain().name;

        let banner = (account.connected && !correct).then(|| NetworkBanner {
            message: "Wrong network",
            switch_label: format!("Switch to {network}"),
        });

        let details = vec![
            DetailRow {
                label: "Token Type",
                value: "Soulbound Token (SBT)".to_string(),
            },
            DetailRow {
                label: "Contract",
                value: short_address(&self.props().contract_address),
            },
            DetailRow {
                label: "Network",
                value: network.to_string(),
            },
            DetailRow {
                label: "Price",
                value: "Free".to_string(),
            },
        ];

        let (action, label) = if !account.connected {
            (PrimaryAction::Connect, "Connect Wallet to Mint")
        } else if !correct {
            (PrimaryAction::Switch, "Switch Network to Mint")
        } else {
            (PrimaryAction::Mint, "Mint SBT")
        };
        let variant = if action == PrimaryAction::Mint {
            ButtonVariant::Default
        } else {
            ButtonVariant::Outline
        };

        SheetBody::Idle {
            banner,
            details,
            primary: PrimaryButton {
                action,
                label,
                variant,
                disabled: self.is_busy(),
            },
        }
    }
}
