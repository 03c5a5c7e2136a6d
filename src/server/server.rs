use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::MySqlPool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub session_service: Arc<dyn SessionService>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cancel = CancellationToken::new();

        let token_config = TokenConfig {
            shared_secret: settings.token.shared_secret.clone().into_bytes(),
            algorithm: settings.token.algorithm.parse()?,
            access_ttl: Duration::from_secs(settings.token.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.token.refresh_ttl_secs),
        };
        debug!(?token_config);
        let token_codec: Arc<dyn TokenCodec> =
            Arc::new(JwtTokenCodec::try_new(token_config, clock.clone())?);

        let mut sweeper_handle = None;
        let revocation_store: Arc<dyn RevocationStore> =
            match settings.revocation.backend.as_str() {
                "memory" => {
                    let store = Arc::new(MemoryRevocationStore::new(clock.clone()));
                    let every = Duration::from_secs(settings.revocation.sweep_interval_secs.max(1));
                    sweeper_handle = Some(spawn_sweeper(store.clone(), every, cancel.clone()));
                    store
                }
                "redis" => {
                    let redis_client = redis::Client::open(settings.revocation.redis_url.as_str())?;
                    let redis_manager = redis_client.get_connection_manager().await?;
                    Arc::new(RedisRevocationStore::new(
                        redis_manager,
                        settings.revocation.prefix.clone(),
                    ))
                }
                other => return Err(anyhow!("Unknown revocation backend: {}", other)),
            };

        let policy: RevocationPolicy = settings
            .revocation
            .policy
            .parse()
            .map_err(|e: String| anyhow!(e))?;
        if policy == RevocationPolicy::FailOpen {
            warn!("revocation policy is fail_open: tokens are accepted while the store is down");
        }

        let session_service: Arc<dyn SessionService> = Arc::new(
            RealSessionService::new(token_codec, revocation_store, clock.clone())
                .with_policy(policy)
                .with_store_timeout(Duration::from_millis(settings.revocation.timeout_ms)),
        );

        let (principal_store, login_history, pool): (
            Arc<dyn PrincipalStore>,
            Arc<dyn LoginHistoryRepo>,
            Option<MySqlPool>,
        ) = match settings.account.backend.as_str() {
            "memory" => {
                let principal_store: Arc<dyn PrincipalStore> = Arc::new(MemoryPrincipalStore::new());
                let login_history: Arc<dyn LoginHistoryRepo> =
                    Arc::new(MemoryLoginHistoryRepo::new());
                (principal_store, login_history, None)
            }
            "mysql" => {
                let dsn = settings
                    .account
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("account.mysql_dsn is required for the mysql backend"))?;
                let pool = MySqlPool::connect(dsn).await?;
                let principal_store: Arc<dyn PrincipalStore> =
                    Arc::new(MySqlPrincipalStore::new(pool.clone()));
                let login_history: Arc<dyn LoginHistoryRepo> =
                    Arc::new(MySqlLoginHistoryRepo::new(pool.clone()));
                (principal_store, login_history, Some(pool))
            }
            other => return Err(anyhow!("Unknown account backend: {}", other)),
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            principal_store,
            login_history,
            credential_hasher,
            session_service.clone(),
            clock,
        ));

        info!(
            revocation = %settings.revocation.backend,
            account = %settings.account.backend,
            "server started"
        );

        Ok(Self {
            auth_service,
            session_service,
            sweeper_handle: Mutex::new(sweeper_handle),
            cancel,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self
            .sweeper_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

fn spawn_sweeper(
    store: Arc<MemoryRevocationStore>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    store.purge_expired();
                }
            }
        }
        debug!("revocation sweeper stopped");
    })
}
