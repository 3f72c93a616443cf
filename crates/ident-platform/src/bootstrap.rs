//! Bootstrap
//!
//! Wires stores, the unit of work, MFA strategies and the service facades.

use anyhow::{Context, Result};
use ident_config::{AppConfig, ConfigLoader, MfaConfig};
use std::sync::Arc;
use tracing::info;

use crate::domain::{DomainRepository, DomainStore};
use crate::handler::HandlerChain;
use crate::mfa::{EmailMfaStrategy, MfaStrategyRegistry, MongoVerifyCodeStore, VerifyCodeStore};
use crate::notify::{Notifier, SmtpNotifier};
use crate::password::{Argon2Config, PasswordPolicy, PasswordService, RandomPasswordGenerator};
use crate::role::{RoleRepository, RoleStore};
use crate::role_binding::{RoleBindingRepository, RoleBindingService, RoleBindingStore};
use crate::shared::UserLocks;
use crate::token::JwtTokenIssuer;
use crate::usecase::{MongoUnitOfWork, UnitOfWork};
use crate::user::{UserRepository, UserStore};
use crate::user_profile::{ProfileCollaborators, UserProfileService};
use crate::workspace::{WorkspaceRepository, WorkspaceStore};

/// Read side of every aggregate.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub workspaces: Arc<dyn WorkspaceStore>,
    pub domains: Arc<dyn DomainStore>,
    pub role_bindings: Arc<dyn RoleBindingStore>,
    pub verify_codes: Arc<dyn VerifyCodeStore>,
}

impl Stores {
    pub fn mongo(db: &mongodb::Database) -> Self {
        Self {
            users: Arc::new(UserRepository::new(db)),
            roles: Arc::new(RoleRepository::new(db)),
            workspaces: Arc::new(WorkspaceRepository::new(db)),
            domains: Arc::new(DomainRepository::new(db)),
            role_bindings: Arc::new(RoleBindingRepository::new(db)),
            verify_codes: Arc::new(MongoVerifyCodeStore::new(db)),
        }
    }
}

/// Strategy registry with the email-code strategy registered.
pub fn email_strategies(
    codes: Arc<dyn VerifyCodeStore>,
    notifier: Arc<dyn Notifier>,
    config: &MfaConfig,
) -> MfaStrategyRegistry {
    MfaStrategyRegistry::default().register(Arc::new(EmailMfaStrategy::new(
        codes,
        notifier,
        config.clone(),
    )))
}

pub struct Platform<U: UnitOfWork> {
    pub role_bindings: RoleBindingService<U>,
    pub user_profile: UserProfileService<U>,
    /// Per-user lock registry shared by both facades
    pub locks: Arc<UserLocks>,
}

impl<U: UnitOfWork> Platform<U> {
    /// Both facades share one lock registry and one handler chain.
    pub fn assemble(
        stores: &Stores,
        collaborators: ProfileCollaborators,
        config: &AppConfig,
        unit_of_work: Arc<U>,
    ) -> Self {
        let locks = Arc::new(UserLocks::new());
        let chain = Arc::new(HandlerChain::new());

        Self {
            role_bindings: RoleBindingService::new(
                stores,
                locks.clone(),
                unit_of_work.clone(),
                chain.clone(),
            ),
            user_profile: UserProfileService::new(
                stores,
                collaborators,
                config,
                locks.clone(),
                unit_of_work,
                chain,
            ),
            locks,
        }
    }
}

impl Platform<MongoUnitOfWork> {
    /// MongoDB stores, SMTP delivery, JWT temporary tokens.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        info!(
            uri = %config.mongodb.uri,
            database = %config.mongodb.database,
            "Connecting to MongoDB"
        );
        let client = mongodb::Client::with_uri_str(&config.mongodb.uri)
            .await
            .context("failed to connect to MongoDB")?;
        let db = client.database(&config.mongodb.database);

        let stores = Stores::mongo(&db);
        let unit_of_work = Arc::new(MongoUnitOfWork::new(client, db));
        info!("Repositories initialized");

        let notifier: Arc<dyn Notifier> = Arc::new(
            SmtpNotifier::new(&config.email.smtp).context("invalid SMTP configuration")?,
        );
        let tokens = Arc::new(JwtTokenIssuer::new(&config.token).context("invalid token configuration")?);
        let passwords = Arc::new(
            PasswordService::new(Argon2Config::default(), PasswordPolicy::default())
                .context("invalid password hashing parameters")?,
        );
        let strategies = Arc::new(email_strategies(
            stores.verify_codes.clone(),
            notifier.clone(),
            &config.mfa,
        ));
        info!(mfa_types = ?strategies.supported(), "Collaborators initialized");

        let collaborators = ProfileCollaborators {
            notifier,
            tokens,
            generator: Arc::new(RandomPasswordGenerator),
            passwords,
            strategies,
        };

        Ok(Self::assemble(&stores, collaborators, config, unit_of_work))
    }
}

/// Process entry point for embedders: installs logging, loads the
/// configuration and connects.
pub async fn start(service_name: &str, loader: ConfigLoader) -> Result<(AppConfig, Platform<MongoUnitOfWork>)> {
    ident_common::init_logging(service_name);

    let config = loader.load().context("failed to load configuration")?;
    info!(mode = ?config.reset_password.mode, "Configuration loaded");

    let platform = Platform::connect(&config).await?;
    info!("Identity platform ready");
    Ok((config, platform))
}
