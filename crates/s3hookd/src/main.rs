// # s3hookd - S3 Subscription Hook Daemon
//
// Thin integration layer around s3hook-core. All reconcile logic lives in
// the core library; this binary only wires components together.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering handlers
// 4. Serving one hook request: read from stdin, response to stdout
//
// Logs go to stderr so that stdout only carries the JSON response.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Secret Store
// - `S3HOOK_SECRET_STORE_TYPE`: Type of secret store (memory, file)
// - `S3HOOK_SECRET_STORE_PATH`: Path to secret file (for file store)
//
// ### Reconciler
// - `S3HOOK_CALL_TIMEOUT_SECS`: Deadline of a single provider call
// - `S3HOOK_EVENT_CHANNEL_CAPACITY`: Capacity of the subscription event channel
//
// ### AWS
// - `S3HOOK_AWS_ENDPOINT_URL`: Endpoint override (e.g. LocalStack)
// - `S3HOOK_AWS_OPERATION_TIMEOUT_SECS`: SDK operation timeout
//
// ### Logging
// - `S3HOOK_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export S3HOOK_SECRET_STORE_TYPE=file
// export S3HOOK_SECRET_STORE_PATH=/etc/s3hook/secrets.json
//
// s3hookd < request.json
// ```

use anyhow::{Context, Result};
use s3hook_core::config::{AwsProviderConfig, HookConfig, ReconcilerConfig, SecretStoreConfig};
use s3hook_core::hook::{HookRequest, HookResponse};
use s3hook_core::reconciler::SubscriptionEvent;
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Request served
/// - 1: Configuration or startup error
/// - 2: Runtime error (unreadable request, unknown kind, I/O failure)
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Request served (whatever the reported status)
    Served = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    secret_store_type: String,
    secret_store_path: Option<String>,
    call_timeout_secs: Option<u64>,
    event_channel_capacity: Option<usize>,
    aws_endpoint_url: Option<String>,
    aws_operation_timeout_secs: Option<u64>,
    log_level: String,
}

/// Parse an optional numeric environment variable
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .ok()
        .map(|s| {
            s.trim()
                .parse()
                .with_context(|| format!("{} must be a number. Got: {}", name, s))
        })
        .transpose()
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret_store_type: env::var("S3HOOK_SECRET_STORE_TYPE")
                .unwrap_or_else(|_| "memory".to_string()),
            secret_store_path: env::var("S3HOOK_SECRET_STORE_PATH").ok(),
            call_timeout_secs: parse_var("S3HOOK_CALL_TIMEOUT_SECS")?,
            event_channel_capacity: parse_var("S3HOOK_EVENT_CHANNEL_CAPACITY")?,
            aws_endpoint_url: env::var("S3HOOK_AWS_ENDPOINT_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            aws_operation_timeout_secs: parse_var("S3HOOK_AWS_OPERATION_TIMEOUT_SECS")?,
            log_level: env::var("S3HOOK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.secret_store_type.as_str() {
            "memory" => {}
            "file" => {
                if self.secret_store_path.as_ref().is_none_or(|p| p.is_empty()) {
                    anyhow::bail!(
                        "S3HOOK_SECRET_STORE_PATH is required when S3HOOK_SECRET_STORE_TYPE=file. \
                        Set it via: export S3HOOK_SECRET_STORE_PATH=/etc/s3hook/secrets.json"
                    );
                }
            }
            _ => anyhow::bail!(
                "S3HOOK_SECRET_STORE_TYPE '{}' is not supported. \
                Supported types: memory, file",
                self.secret_store_type
            ),
        }

        if let Some(timeout) = self.call_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "S3HOOK_CALL_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        if let (Some(call), Some(operation)) =
            (self.call_timeout_secs, self.aws_operation_timeout_secs)
            && operation > call
        {
            warn_early(&format!(
                "S3HOOK_AWS_OPERATION_TIMEOUT_SECS ({}) exceeds S3HOOK_CALL_TIMEOUT_SECS ({}). \
                Calls will be cut off before the SDK gives up.",
                operation, call
            ));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "S3HOOK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.to_hook_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(())
    }

    /// Build the library configuration
    fn to_hook_config(&self) -> HookConfig {
        let mut reconciler = ReconcilerConfig::default();
        if let Some(timeout) = self.call_timeout_secs {
            reconciler.call_timeout_secs = timeout;
        }
        if let Some(capacity) = self.event_channel_capacity {
            reconciler.event_channel_capacity = capacity;
        }

        let secret_store = match (self.secret_store_type.as_str(), &self.secret_store_path) {
            ("file", Some(path)) => SecretStoreConfig::File { path: path.clone() },
            _ => SecretStoreConfig::Memory,
        };

        let mut aws = AwsProviderConfig {
            endpoint_url: self.aws_endpoint_url.clone(),
            ..AwsProviderConfig::default()
        };
        if let Some(timeout) = self.aws_operation_timeout_secs {
            aws.operation_timeout_secs = timeout;
        }

        HookConfig {
            reconciler,
            secret_store,
            aws,
        }
    }
}

/// Print a warning before the subscriber is installed
fn warn_early(message: &str) {
    eprintln!("WARNING: {}", message);
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return HookExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::ConfigError.into();
    }

    info!("Starting s3hookd");
    info!(
        "Secret store: {}, provider call timeout: {}s",
        config.secret_store_type,
        config.to_hook_config().reconciler.call_timeout_secs
    );

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run(config.to_hook_config()).await {
            Ok(()) => HookExitCode::Served,
            Err(RunError::Setup(e)) => {
                error!("Startup error: {:#}", e);
                HookExitCode::ConfigError
            }
            Err(RunError::Request(e)) => {
                error!("Request error: {:#}", e);
                HookExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Failure of a daemon run
enum RunError {
    /// Components could not be created from the configuration
    Setup(anyhow::Error),
    /// The request could not be read, dispatched or answered
    Request(anyhow::Error),
}

/// Serve one hook request
async fn run(config: HookConfig) -> std::result::Result<(), RunError> {
    let (registry, mut events) = build_registry(&config).await.map_err(RunError::Setup)?;

    let request = read_request().await.map_err(RunError::Request)?;
    debug!(operation = ?request.operation, "Received hook request");

    let response = registry
        .dispatch(request)
        .await
        .context("Failed to dispatch hook request")
        .map_err(RunError::Request)?;

    log_events(&mut events);

    write_response(&response).await.map_err(RunError::Request)?;
    Ok(())
}

/// Create the handler registry from configuration
#[cfg(feature = "aws")]
async fn build_registry(
    config: &HookConfig,
) -> Result<(
    s3hook_core::HandlerRegistry,
    mpsc::Receiver<SubscriptionEvent>,
)> {
    use s3hook_core::{S3SourceHandler, SubscriptionReconciler};
    use std::sync::Arc;

    let secrets = s3hook_core::secrets::from_config(&config.secret_store)
        .await
        .context("Failed to create secret store")?;
    info!("Secret store type: {}", config.secret_store.type_name());

    let client_getter = s3hook_aws::AwsClientGetter::new(secrets, config.aws.clone())
        .context("Failed to create AWS client getter")?;
    if let Some(endpoint) = &config.aws.endpoint_url {
        info!("Using AWS endpoint override: {}", endpoint);
    }

    let (reconciler, events) =
        SubscriptionReconciler::new(Arc::new(client_getter), config.reconciler.clone())
            .context("Failed to create reconciler")?;

    let mut registry = s3hook_core::HandlerRegistry::new();
    info!("Registering AWSS3Source handler");
    registry.register(Arc::new(S3SourceHandler::new(reconciler)));

    Ok((registry, events))
}

#[cfg(not(feature = "aws"))]
async fn build_registry(
    _config: &HookConfig,
) -> Result<(
    s3hook_core::HandlerRegistry,
    mpsc::Receiver<SubscriptionEvent>,
)> {
    anyhow::bail!("s3hookd was built without the \"aws\" feature; no handler is available")
}

/// Read the hook request from stdin
async fn read_request() -> Result<HookRequest> {
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read hook request from stdin")?;

    serde_json::from_str(&raw).context("Failed to parse hook request")
}

/// Write the hook response to stdout
async fn write_response(response: &HookResponse) -> Result<()> {
    let mut body = serde_json::to_vec(response).context("Failed to encode hook response")?;
    body.push(b'\n');

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&body).await.context("Failed to write hook response")?;
    stdout.flush().await.context("Failed to flush hook response")?;
    Ok(())
}

/// Log the subscription events emitted while serving the request
fn log_events(events: &mut mpsc::Receiver<SubscriptionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SubscriptionEvent::QueueCreated { source, queue_arn } => {
                info!("Created queue {} for {}", queue_arn, source);
            }
            SubscriptionEvent::QueuePolicyUpdated { source, queue_arn } => {
                info!("Updated policy of queue {} for {}", queue_arn, source);
            }
            SubscriptionEvent::NotificationsEnabled { source, queue_arn } => {
                info!("Enabled notifications to {} for {}", queue_arn, source);
            }
            SubscriptionEvent::NotificationsDisabled { source } => {
                info!("Disabled notifications for {}", source);
            }
            SubscriptionEvent::QueueDeleted { source, queue_url } => {
                info!("Deleted queue {} of {}", queue_url, source);
            }
            SubscriptionEvent::ReconcileFailed {
                source,
                reason,
                error,
            } => {
                warn!("Reconcile of {} failed ({}): {}", source, reason, error);
            }
            SubscriptionEvent::Warning { source, message } => {
                warn!("Teardown of {} left resources behind: {}", source, message);
            }
        }
    }
}
