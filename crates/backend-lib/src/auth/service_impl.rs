use super::password::{hash_password, verify_password};
use super::session::{IssuedSession, SessionManager};
use super::token_generator::is_well_formed;
use super::CredentialService;
use crate::config::HashingSettings;
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, SIGNUP_CREATED, SIGNUP_REJECTED};
use crate::storage::{Account, AccountId, AccountNamespace, AccountStore};
use crate::validation::{Identifier, LoginForm, Secret, SignupForm};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use quickcare_common::{AccountSummary, Role};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

const TIMING_FILLER: &str = "quickcare-timing-filler";

/// Credential service over an injected account store
pub struct DefaultCredentialService<S> {
    store: S,
    sessions: SessionManager,
    hashing: Arc<HashingSettings>,
    /// Verified against when an identifier is unknown, so a miss costs the
    /// same as a wrong secret
    dummy_hash: OnceCell<String>,
}

impl<S: AccountStore> DefaultCredentialService<S> {
    pub fn new(store: S, sessions: SessionManager, hashing: HashingSettings) -> Self {
        Self {
            store,
            sessions,
            hashing: Arc::new(hashing),
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Create a privileged account in the `doctors` namespace.
    ///
    /// Only reachable from the operator CLI; signup never writes there.
    pub async fn provision_doctor(
        &self,
        identifier: Identifier,
        secret: Secret,
    ) -> Result<AccountId, AppError> {
        let id = self
            .create_account(AccountNamespace::Doctors, identifier.clone(), secret, None)
            .await?;
        info!(identifier = %identifier, account_id = %id, "doctor account provisioned");
        Ok(id)
    }

    /// Pre-check every namespace, then insert. The insert itself is atomic,
    /// so a racing duplicate in the same namespace ends as `DuplicateAccount`.
    /// A racer in another namespace is caught by re-checking after the
    /// insert; on a hit our record is rolled back, so at most one survives.
    async fn create_account(
        &self,
        namespace: AccountNamespace,
        identifier: Identifier,
        secret: Secret,
        role: Option<Role>,
    ) -> Result<AccountId, AppError> {
        if self.lookup(&identifier).await?.is_some() {
            return Err(AppError::DuplicateAccount);
        }

        let credential_hash = self.hash(secret).await?;
        let account = Account {
            id: AccountId::new(),
            identifier: identifier.into_inner(),
            credential_hash,
            role,
            created_at: Utc::now(),
        };

        let identifier = account.identifier.clone();
        let id = self.store.insert(namespace, account).await?;

        for other in AccountNamespace::LOOKUP_ORDER {
            if other == namespace {
                continue;
            }
            if self
                .store
                .find_by_identifier(other, &identifier)
                .await?
                .is_some()
            {
                self.store.remove(namespace, &identifier, id).await?;
                warn!(
                    %identifier,
                    namespace = other.as_str(),
                    "identifier claimed concurrently, rolled back"
                );
                return Err(AppError::DuplicateAccount);
            }
        }

        Ok(id)
    }

    /// First hit in lookup order wins
    async fn lookup(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<(AccountNamespace, Account)>, AppError> {
        for namespace in AccountNamespace::LOOKUP_ORDER {
            if let Some(account) = self
                .store
                .find_by_identifier(namespace, identifier.as_str())
                .await?
            {
                return Ok(Some((namespace, account)));
            }
        }
        Ok(None)
    }

    async fn hash(&self, secret: Secret) -> Result<String, AppError> {
        let hashing = self.hashing.clone();
        tokio::task::spawn_blocking(move || hash_password(secret.expose(), &hashing))
            .await?
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    async fn verify(&self, hash: String, secret: Secret) -> Result<bool, AppError> {
        Ok(tokio::task::spawn_blocking(move || verify_password(&hash, secret.expose())).await?)
    }

    async fn dummy_hash(&self) -> Result<String, AppError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async {
                match Secret::parse(TIMING_FILLER.to_string()) {
                    Ok(filler) => self.hash(filler).await,
                    Err(e) => Err(AppError::from(e)),
                }
            })
            .await?;
        Ok(hash.clone())
    }
}

/// Doctors-namespace accounts are always doctors; others default to user
fn derive_role(namespace: AccountNamespace, account: &Account) -> Role {
    match namespace {
        AccountNamespace::Doctors => Role::Doctor,
        AccountNamespace::Users => account.role.unwrap_or_default(),
    }
}

#[async_trait]
impl<S: AccountStore> CredentialService for DefaultCredentialService<S> {
    async fn signup(&self, form: SignupForm) -> Result<IssuedSession, AppError> {
        let SignupForm {
            identifier,
            secret,
            role,
        } = form;

        let summary = AccountSummary {
            identifier: identifier.as_str().to_string(),
            role,
        };

        match self
            .create_account(AccountNamespace::Users, identifier, secret, Some(role))
            .await
        {
            Ok(id) => {
                counter!(SIGNUP_CREATED).increment(1);
                info!(identifier = %summary.identifier, %role, account_id = %id, "account created");
            },
            Err(err) => {
                counter!(SIGNUP_REJECTED).increment(1);
                return Err(err);
            },
        }

        Ok(self.sessions.issue(summary).await)
    }

    async fn login(&self, form: LoginForm) -> Result<IssuedSession, AppError> {
        let LoginForm { identifier, secret } = form;

        let Some((namespace, account)) = self.lookup(&identifier).await? else {
            let _ = self.verify(self.dummy_hash().await?, secret).await?;
            counter!(LOGIN_FAILED).increment(1);
            warn!(identifier = %identifier, "login for unknown identifier");
            return Err(AppError::AccountNotFound);
        };

        if !self.verify(account.credential_hash.clone(), secret).await? {
            counter!(LOGIN_FAILED).increment(1);
            warn!(identifier = %identifier, "login with wrong secret");
            return Err(AppError::InvalidCredentials);
        }

        let role = derive_role(namespace, &account);
        counter!(LOGIN_SUCCEEDED).increment(1);
        info!(
            identifier = %account.identifier,
            %role,
            namespace = namespace.as_str(),
            "login succeeded"
        );

        Ok(self
            .sessions
            .issue(AccountSummary {
                identifier: account.identifier,
                role,
            })
            .await)
    }

    async fn validate(&self, token: &str) -> Result<AccountSummary, AppError> {
        if !is_well_formed(token) {
            return Err(AppError::InvalidToken);
        }

        self.sessions
            .get(token)
            .await
            .map(|session| session.account)
            .ok_or(AppError::InvalidToken)
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        if is_well_formed(token) && self.sessions.revoke(token).await {
            Ok(())
        } else {
            Err(AppError::InvalidToken)
        }
    }
}
