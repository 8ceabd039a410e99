use alloy_primitives::Address;

use crate::sbt::TxHash;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Default,
    Destructive,
    Secondary,
    Ghost,
    Outline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonSize {
    #[default]
    Default,
    Sm,
    Lg,
    Icon,
}

// 组件构造时的静态配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintFlowProps {
    // SBT 合约地址
    pub contract_address: Address,
    // 网络名称，按链表解析
    pub network: String,
    pub button_text: String,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
    pub disabled: bool,
}

impl MintFlowProps {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            network: "ethereum".to_string(),
            button_text: "Mint SBT".to_string(),
            variant: ButtonVariant::Default,
            size: ButtonSize::Default,
            disabled: false,
        }
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn button_text(mut self, text: impl Into<String>) -> Self {
        self.button_text = text.into();
        self
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = size;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

// 宿主页面的演示配置：占位合约地址，Base 网络
pub fn host_page_props() -> MintFlowProps {
    MintFlowProps::new(Address::ZERO)
        .network("base")
        .button_text("Mint Your SBT")
        .size(ButtonSize::Lg)
}

type SuccessCallback = Box<dyn FnMut(TxHash) + Send>;
type ErrorCallback = Box<dyn FnMut(String) + Send>;

// 铸造结果回调
#[derive(Default)]
pub struct MintCallbacks {
    on_mint_success: Option<SuccessCallback>,
    on_mint_error: Option<ErrorCallback>,
}

impl MintCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_mint_success(mut self, callback: impl FnMut(TxHash) + Send + 'static) -> Self {
        self.on_mint_success = Some(Box::new(callback));
        self
    }

    pub fn on_mint_error(mut self, callback: impl FnMut(String) + Send + 'static) -> Self {
        self.on_mint_error = Some(Box::new(callback));
        self
    }

    pub(crate) fn success(&mut self, hash: TxHash) {
        if let Some(callback) = self.on_mint_success.as_mut() {
            callback(hash);
        }
    }

    pub(crate) fn error(&mut self, message: String) {
        if let Some(callback) = self.on_mint_error.as_mut() {
            callback(message);
        }
    }
}

impl std::fmt::Debug for MintCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintCallbacks")
            .field("on_mint_success", &self.on_mint_success.is_some())
            .field("on_mint_error", &self.on_mint_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget() {
        let props = MintFlowProps::new(Address::repeat_byte(7));
        assert_eq!(props.network, "ethereum");
        assert_eq!(props.button_text, "Mint SBT");
        assert_eq!(props.variant, ButtonVariant::Default);
        assert_eq!(props.size, ButtonSize::Default);
        assert!(!props.disabled);
    }

    #[test]
    fn host_page_uses_placeholder_on_base() {
        let props = host_page_props();
        assert_eq!(props.contract_address, Address::ZERO);
        assert_eq!(props.network, "base");
        assert_eq!(props.button_text, "Mint Your SBT");
        assert_eq!(props.size, ButtonSize::Lg);
    }

    #[test]
    fn missing_callbacks_are_no_ops() {
        let mut callbacks = MintCallbacks::new();
        callbacks.success(TxHash::ZERO);
        callbacks.error("boom".into());
        assert_eq!(
            format!("{callbacks:?}"),
            "MintCallbacks { on_mint_success: false, on_mint_error: false }"
        );
    }
}
