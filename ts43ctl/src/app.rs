use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};
use ts43_config::Config;
use ts43_core::{
    ConfigurationRepository, ConfigurationStore, EngineDependencies, FileConfigurationRepository,
    HttpEntitlementTransport, HttpTransportSettings, InMemoryConfigurationRepository,
    LoggingProvisioningSink, PollingComponents, PollingService, QuerySettings,
    StaticNotificationToken, SubscriptionRegistry, SystemClock, TokioFollowUpScheduler,
    TracingMetrics,
};
use ts43_model::{EntitlementResult, SubscriptionId};

const WAIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything a command may need, built from [`Config`].
pub struct App {
    config: Config,
    repository: Arc<dyn ConfigurationRepository>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let repository: Arc<dyn ConfigurationRepository> = match &config.storage.dir {
            Some(dir) => Arc::new(
                FileConfigurationRepository::open(dir)
                    .await
                    .with_context(|| format!("failed to open storage dir {}", dir.display()))?,
            ),
            None => {
                warn!("no storage dir configured; cached configuration is not persisted");
                Arc::new(InMemoryConfigurationRepository::new())
            }
        };
        Ok(Self { config, repository })
    }

    fn registry(&self) -> Result<SubscriptionRegistry> {
        let server_url = self
            .config
            .server
            .url
            .clone()
            .ok_or_else(|| anyhow!("no entitlement server configured (set TS43_SERVER_URL)"))?;
        let transport = HttpEntitlementTransport::new(&HttpTransportSettings {
            server_url,
            timeout: self.config.server.request_timeout,
        })
        .context("failed to create entitlement transport")?;
        let notifications = match &self.config.carrier.notification_token {
            Some(token) => StaticNotificationToken::new(token.clone()),
            None => StaticNotificationToken::none(),
        };

        Ok(SubscriptionRegistry::new(EngineDependencies {
            transport: Arc::new(transport),
            notifications: Arc::new(notifications),
            repository: self.repository.clone(),
            clock: Arc::new(SystemClock),
            settings: QuerySettings {
                needs_ims_provisioning: self.config.carrier.needs_ims_provisioning,
            },
        }))
    }

    pub async fn query(&self, subscription: SubscriptionId, json: bool) -> Result<()> {
        let registry = self.registry()?;
        let result = registry
            .handle(subscription)
            .await
            .check_entitlement_status()
            .await;

        match (result, json) {
            (Some(result), true) => println!("{}", serde_json::to_string_pretty(&result)?),
            (Some(result), false) => print_result(subscription, &result),
            (None, _) => println!("subscription {subscription}: no entitlement result"),
        }
        Ok(())
    }

    pub async fn poll(&self, subscription: SubscriptionId, wait: bool) -> Result<()> {
        let (scheduler, due_rx) = TokioFollowUpScheduler::new();
        let scheduler = Arc::new(scheduler);
        let service = PollingService::new(PollingComponents {
            registry: Arc::new(self.registry()?),
            sink: Arc::new(LoggingProvisioningSink),
            scheduler: scheduler.clone(),
            metrics: Arc::new(TracingMetrics),
        });
        let follow_ups = service.spawn_follow_up_loop(due_rx);

        let run = service
            .trigger(subscription)
            .await
            .await
            .context("poll task failed")?;
        println!("subscription {subscription}: poll {}", run.state());

        if wait {
            // A fired timer hands over to the follow-up loop asynchronously,
            // so idle has to be observed twice in a row.
            let mut idle_checks = 0;
            while idle_checks < 2 {
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
                if scheduler.pending() > 0 || service.in_flight().await > 0 {
                    idle_checks = 0;
                } else {
                    idle_checks += 1;
                }
            }
            info!(subscription = %subscription, "no follow-ups pending");
        }

        follow_ups.abort();
        Ok(())
    }

    pub async fn show(&self, subscription: SubscriptionId) -> Result<()> {
        let store = self.store(subscription).await;
        let record = store.record();
        println!("subscription:      {subscription}");
        println!("version:           {}", record.version);
        println!("vers validity:     {}s", store.vers_validity_secs());
        println!("client behavior:   {}", store.entitlement_validation());
        println!("last query (ms):   {}", record.last_query_timestamp_ms);
        println!(
            "token:             {}",
            if store.token().is_some() { "valid" } else { "none" }
        );
        println!("token validity:    {}s", store.token_validity_secs());
        Ok(())
    }

    pub async fn reset(&self, subscription: SubscriptionId) -> Result<()> {
        self.store(subscription).await.reset().await;
        println!("subscription {subscription}: configuration reset");
        Ok(())
    }

    async fn store(&self, subscription: SubscriptionId) -> ConfigurationStore {
        ConfigurationStore::load(subscription, self.repository.clone(), Arc::new(SystemClock))
            .await
    }
}

fn print_result(subscription: SubscriptionId, result: &EntitlementResult) {
    let yes_no = |value: bool| if value { "yes" } else { "no" };

    println!("subscription {subscription}");
    if let Some(seconds) = result.retry_after_seconds {
        println!("  server busy, retry after {seconds}s");
        return;
    }
    println!(
        "  vowifi:    entitled={} data_missing={} in_progress={} incompatible={}",
        yes_no(result.vowifi.entitled()),
        yes_no(result.vowifi.server_data_missing()),
        yes_no(result.vowifi.in_progress()),
        yes_no(result.vowifi.incompatible()),
    );
    println!("  volte:     entitled={}", yes_no(result.volte.entitled()));
    println!(
        "  vonr:      home={} roaming={}",
        yes_no(result.vonr.home_entitled()),
        yes_no(result.vonr.roaming_entitled()),
    );
    println!("  smsoip:    entitled={}", yes_no(result.sms_over_ip.entitled()));
    if let Some(url) = &result.emergency_address_web_url {
        println!("  web flow:  {url}");
    }
}
