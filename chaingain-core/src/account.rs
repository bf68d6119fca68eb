//! Lazy provisioning of the learner's on-chain identity.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::error::ChainGainError;
use crate::http_request::Request;
use crate::storage::{PersistentStore, ACCOUNT_ID_KEY, PUBLIC_KEY_KEY};

/// The learner's persisted identity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Account {
    /// Ledger account id, e.g. `0.0.4515`.
    pub account_id: String,
    /// Public key registered for the account.
    pub public_key: String,
}

/// Freshly created key material, as handed to a [`PrivateKeySink`].
///
/// The private key only exists for the duration of the provisioning call.
pub struct ProvisionedKey {
    /// The account the key belongs to.
    pub account: Account,
    /// The account's private key.
    pub private_key: SecretString,
}

impl std::fmt::Debug for ProvisionedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionedKey")
            .field("account", &self.account)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Trusted receiver for the one-time private key.
///
/// Whatever a sink does with the key, it must not write it to the
/// [`PersistentStore`].
pub trait PrivateKeySink: Send + Sync {
    /// Receives the key material of a newly created account.
    fn receive(&self, key: &ProvisionedKey);
}

/// Sink that drops the private key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardPrivateKey;

impl PrivateKeySink for DiscardPrivateKey {
    fn receive(&self, key: &ProvisionedKey) {
        tracing::debug!(
            account_id = %key.account.account_id,
            "discarding private key of new account"
        );
    }
}

/// Response of `POST /createKey`.
#[derive(Deserialize)]
struct CreateKeyResponse {
    #[serde(rename = "AccId")]
    acc_id: String,
    #[serde(rename = "PubKey")]
    pub_key: String,
    #[serde(rename = "PrivKey")]
    priv_key: String,
}

/// Ensures a local identity exists, creating it on the backend at most once.
pub struct AccountProvisioner {
    store: Arc<dyn PersistentStore>,
    sink: Arc<dyn PrivateKeySink>,
    request: Request,
    config: ClientConfig,
    in_flight: Mutex<()>,
}

impl AccountProvisioner {
    /// Creates a provisioner writing to `store`, discarding private keys.
    #[must_use]
    pub fn new(config: ClientConfig, store: Arc<dyn PersistentStore>) -> Self {
        Self::with_sink(config, store, Arc::new(DiscardPrivateKey))
    }

    /// Creates a provisioner that hands new private keys to `sink`.
    #[must_use]
    pub fn with_sink(
        config: ClientConfig,
        store: Arc<dyn PersistentStore>,
        sink: Arc<dyn PrivateKeySink>,
    ) -> Self {
        Self {
            store,
            sink,
            request: Request::new(&config),
            config,
            in_flight: Mutex::new(()),
        }
    }

    /// Returns the persisted account, if both identity fields are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current_account(&self) -> Result<Option<Account>, ChainGainError> {
        let account_id = self.store.get(ACCOUNT_ID_KEY.to_string())?;
        let public_key = self.store.get(PUBLIC_KEY_KEY.to_string())?;
        Ok(match (account_id, public_key) {
            (Some(account_id), Some(public_key))
                if !account_id.is_empty() && !public_key.is_empty() =>
            {
                Some(Account {
                    account_id,
                    public_key,
                })
            }
            _ => None,
        })
    }

    /// Makes sure an account is persisted, creating one if needed.
    ///
    /// Issues zero requests when the identity is already stored. Concurrent
    /// callers are serialised: whoever waits re-reads the store once the
    /// running request has finished and only creates an account if that
    /// request failed.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::ProvisioningFailed`] (or a storage error) if
    /// the account could not be created and persisted. Nothing is persisted
    /// in that case, so the next call starts from scratch.
    pub async fn ensure_account(&self) -> Result<Account, ChainGainError> {
        if let Some(account) = self.current_account()? {
            return Ok(account);
        }

        let _guard = self.in_flight.lock().await;
        if let Some(account) = self.current_account()? {
            tracing::debug!("account provisioned by a concurrent caller");
            return Ok(account);
        }

        match self.create_account().await {
            Ok(account) => Ok(account),
            Err(err) => {
                tracing::error!("account creation failed: {err}");
                Err(err)
            }
        }
    }

    /// Removes the persisted identity so the next `ensure_account` creates a
    /// new one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn forget_account(&self) -> Result<(), ChainGainError> {
        self.store.remove(ACCOUNT_ID_KEY.to_string())?;
        self.store.remove(PUBLIC_KEY_KEY.to_string())?;
        Ok(())
    }

    async fn create_account(&self) -> Result<Account, ChainGainError> {
        let url = self.config.endpoint("/createKey");
        tracing::debug!(%url, "requesting a new account");

        let response = self
            .request
            .send_once(self.request.post(&url))
            .await
            .map_err(|err| ChainGainError::ProvisioningFailed {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainGainError::ProvisioningFailed {
                reason: format!("status {}: {body}", status.as_u16()),
            });
        }

        let created: CreateKeyResponse =
            response
                .json()
                .await
                .map_err(|err| ChainGainError::ProvisioningFailed {
                    reason: format!("malformed response: {err}"),
                })?;
        let private_key = SecretString::from(created.priv_key);
        if created.acc_id.is_empty()
            || created.pub_key.is_empty()
            || private_key.expose_secret().is_empty()
        {
            return Err(ChainGainError::ProvisioningFailed {
                reason: "response is missing key material".to_string(),
            });
        }

        let key = ProvisionedKey {
            account: Account {
                account_id: created.acc_id,
                public_key: created.pub_key,
            },
            private_key,
        };

        let ttl = self.config.identity_ttl;
        self.store.set(
            ACCOUNT_ID_KEY.to_string(),
            key.account.account_id.clone(),
            ttl,
        )?;
        if let Err(err) = self.store.set(
            PUBLIC_KEY_KEY.to_string(),
            key.account.public_key.clone(),
            ttl,
        ) {
            // A lone account id would read as "unprovisioned" anyway; drop it
            // so the store holds either both fields or neither.
            let _ = self.store.remove(ACCOUNT_ID_KEY.to_string());
            return Err(err.into());
        }

        tracing::info!(account_id = %key.account.account_id, "account provisioned");
        self.sink.receive(&key);
        Ok(key.account)
    }
}
