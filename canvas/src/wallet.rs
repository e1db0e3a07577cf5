//! Wallet collaborator: yields an address the holdings check can be run against.

#[cfg(test)]
#[path = "wallet_test.rs"]
mod wallet_test;

use async_trait::async_trait;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Shortest and longest base58 encodings of a 32-byte public key.
const ADDRESS_LEN: std::ops::RangeInclusive<usize> = 32..=44;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet provider available")]
    NoProvider,
    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// A connectable wallet.
#[async_trait(?Send)]
pub trait Wallet {
    /// Ask the user to connect. `Ok(None)` means they declined.
    ///
    /// # Errors
    ///
    /// Returns an error when no provider exists or the provider fails.
    async fn connect(&self) -> Result<Option<String>, WalletError>;

    /// Drop the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails.
    async fn disconnect(&self) -> Result<(), WalletError>;
}

/// Trim `raw` and accept it only if it looks like a base58 public key.
#[must_use]
pub fn normalize_address(raw: &str) -> Option<String> {
    let address = raw.trim();
    if !ADDRESS_LEN.contains(&address.len()) {
        return None;
    }
    address.chars().all(|c| BASE58_ALPHABET.contains(c)).then(|| address.to_owned())
}

#[cfg(feature = "browser")]
pub use injected::InjectedWallet;

#[cfg(feature = "browser")]
mod injected {
    use async_trait::async_trait;
    use js_sys::{Function, Promise, Reflect};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use super::{Wallet, WalletError, normalize_address};

    /// Provider error code for "user rejected the request".
    const USER_REJECTED: f64 = 4001.0;

    /// The provider a wallet extension injects as `window.solana`.
    #[derive(Debug, Default)]
    pub struct InjectedWallet;

    impl InjectedWallet {
        #[must_use]
        pub fn new() -> Self {
            Self
        }

        fn provider() -> Result<JsValue, WalletError> {
            let window = web_sys::window().ok_or(WalletError::NoProvider)?;
            let provider = Reflect::get(&window, &JsValue::from_str("solana")).map_err(provider_err)?;
            if provider.is_undefined() || provider.is_null() {
                return Err(WalletError::NoProvider);
            }
            Ok(provider)
        }

        async fn call(provider: &JsValue, method: &str) -> Result<JsValue, JsValue> {
            let function = Reflect::get(provider, &JsValue::from_str(method))?.dyn_into::<Function>()?;
            let promise = Promise::resolve(&function.call0(provider)?);
            JsFuture::from(promise).await
        }
    }

    fn provider_err(value: JsValue) -> WalletError {
        let message = Reflect::get(&value, &JsValue::from_str("message"))
            .map(|m| m.as_string())
            .unwrap_or_default();
        WalletError::Provider(message.unwrap_or_else(|| format!("{value:?}")))
    }

    fn is_rejection(value: &JsValue) -> bool {
        Reflect::get(value, &JsValue::from_str("code")).is_ok_and(|code| code.as_f64() == Some(USER_REJECTED))
    }

    #[async_trait(?Send)]
    impl Wallet for InjectedWallet {
        async fn connect(&self) -> Result<Option<String>, WalletError> {
            let provider = Self::provider()?;
            let response = match Self::call(&provider, "connect").await {
                Ok(response) => response,
                Err(e) if is_rejection(&e) => {
                    log::info!("wallet connection declined");
                    return Ok(None);
                }
                Err(e) => return Err(provider_err(e)),
            };
            let key = Reflect::get(&response, &JsValue::from_str("publicKey")).map_err(provider_err)?;
            let text = Reflect::get(&key, &JsValue::from_str("toString"))
                .and_then(<JsValue as JsCast>::dyn_into::<Function>)
                .and_then(|f| f.call0(&key))
                .map_err(provider_err)?;
            let raw = text.as_string().ok_or_else(|| WalletError::Provider("public key is not a string".into()))?;
            normalize_address(&raw)
                .map(Some)
                .ok_or_else(|| WalletError::Provider(format!("malformed address {raw:?}")))
        }

        async fn disconnect(&self) -> Result<(), WalletError> {
            let provider = Self::provider()?;
            Self::call(&provider, "disconnect").await.map_err(provider_err)?;
            Ok(())
        }
    }
}
