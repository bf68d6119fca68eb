//! The `ChainGain` client ties provisioning, verification and sessions
//! together for a front end.

use std::sync::Arc;

use crate::account::{Account, AccountProvisioner, PrivateKeySink};
use crate::certificate::CertificateClient;
use crate::config::ClientConfig;
use crate::error::ChainGainError;
use crate::session::{CardStage, PendingVerification, Session, SessionStep};
use crate::storage::PersistentStore;
use crate::verification::{VerificationClient, VerificationResult};

/// Entry point for front ends.
///
/// Call [`ChainGain::init`] once at startup; answers are only verified once
/// an account is persisted.
pub struct ChainGain {
    config: ClientConfig,
    provisioner: AccountProvisioner,
    verifier: VerificationClient,
    certificates: CertificateClient,
}

impl ChainGain {
    /// Creates a client persisting its identity in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::InvalidInput`] if `config` does not validate.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn PersistentStore>,
    ) -> Result<Self, ChainGainError> {
        config.validate()?;
        Ok(Self {
            verifier: VerificationClient::new(&config),
            certificates: CertificateClient::new(&config),
            provisioner: AccountProvisioner::new(config.clone(), store),
            config,
        })
    }

    /// Like [`ChainGain::new`], handing new private keys to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::InvalidInput`] if `config` does not validate.
    pub fn with_private_key_sink(
        config: ClientConfig,
        store: Arc<dyn PersistentStore>,
        sink: Arc<dyn PrivateKeySink>,
    ) -> Result<Self, ChainGainError> {
        config.validate()?;
        Ok(Self {
            verifier: VerificationClient::new(&config),
            certificates: CertificateClient::new(&config),
            provisioner: AccountProvisioner::with_sink(config.clone(), store, sink),
            config,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The account provisioner.
    #[must_use]
    pub const fn provisioner(&self) -> &AccountProvisioner {
        &self.provisioner
    }

    /// The certificate client.
    #[must_use]
    pub const fn certificates(&self) -> &CertificateClient {
        &self.certificates
    }

    /// Provisions the account if needed. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// See [`AccountProvisioner::ensure_account`].
    pub async fn init(&self) -> Result<Account, ChainGainError> {
        self.provisioner.ensure_account().await
    }

    /// The persisted account, without touching the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn account(&self) -> Result<Option<Account>, ChainGainError> {
        self.provisioner.current_account()
    }

    /// Submits the live card of `session` and, when that calls for it,
    /// verifies the answer and applies the outcome.
    ///
    /// Verification is gated on a provisioned account: without one the card
    /// is left untouched and [`ChainGainError::AccountNotReady`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChainGainError::AccountNotReady`], storage errors, or
    /// [`ChainGainError::Session`] if the card is already awaiting a result.
    pub async fn submit(
        &self,
        session: &mut Session,
    ) -> Result<SessionStep, ChainGainError> {
        let account = if session.card().stage() == CardStage::Editing {
            Some(self.account()?.ok_or(ChainGainError::AccountNotReady)?)
        } else {
            None
        };

        let step = session.submit()?;
        if let (SessionStep::Verify(pending), Some(account)) = (&step, account) {
            let result = self.verify_pending(pending, &account).await;
            session.complete(pending, result);
        }
        Ok(step)
    }

    /// Verifies a pending answer on behalf of `account`, failing closed.
    pub async fn verify_pending(
        &self,
        pending: &PendingVerification,
        account: &Account,
    ) -> VerificationResult {
        self.verifier
            .verify(&pending.original, &pending.translated, &account.account_id)
            .await
    }

    /// Public link for a certificate.
    #[must_use]
    pub fn certificate_url(&self, certificate: &str) -> String {
        self.certificates.url_for(certificate)
    }
}
