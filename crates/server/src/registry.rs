//! Prometheus-backed metric registry and the URL counter family
//!
//! [`MetricsRegistry`] is the process-wide store handed to every middleware
//! instance. [`CounterBinding`] registers one counter family in it, exactly
//! once, on first use.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, OnceLock};

use metrics::{Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use url_metrics_core::{MetricsError, is_valid_metric_name};

/// Help text attached to the URL counter family
pub const URL_COUNTER_HELP: &str = "Total number of HTTP requests by URL";

/// Label names of the URL counter family, in exposition order
pub const URL_LABEL_NAMES: [&str; 3] = ["url", "method", "status"];

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Shared metric registry.
///
/// Cloning is cheap; every clone records into and renders from the same
/// Prometheus recorder. Family names are claimed on registration so a
/// second registration under the same name is rejected.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
    families: Arc<Mutex<HashSet<String>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        Self {
            recorder: Arc::new(recorder),
            handle,
            families: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Handle for the `/metrics` scrape route
    pub fn handle(&self) -> PrometheusHandle {
        self.handle.clone()
    }

    /// Render all registered families in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Whether a family with this name has been registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.families
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }

    /// Register the `(url, method, status)` counter family under `name`.
    ///
    /// Fails on names Prometheus would reject and on names already claimed
    /// in this registry.
    pub fn register_url_counter(&self, name: &str) -> Result<UrlCounter, MetricsError> {
        if !is_valid_metric_name(name) {
            return Err(MetricsError::InvalidName(name.to_string()));
        }

        let mut families = self.families.lock().unwrap_or_else(|e| e.into_inner());
        if !families.insert(name.to_string()) {
            return Err(MetricsError::AlreadyRegistered(name.to_string()));
        }
        drop(families);

        let key_name = KeyName::from(name.to_string());
        self.recorder
            .describe_counter(key_name.clone(), None, URL_COUNTER_HELP.into());

        tracing::debug!(metric = %name, labels = ?URL_LABEL_NAMES, "Registered counter family");

        Ok(UrlCounter {
            name: key_name,
            recorder: Arc::clone(&self.recorder),
        })
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered `(url, method, status)` counter family.
///
/// Increments go straight to the recorder's atomic counter for the series.
#[derive(Clone)]
pub struct UrlCounter {
    name: KeyName,
    recorder: Arc<PrometheusRecorder>,
}

impl std::fmt::Debug for UrlCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlCounter")
            .field("name", &self.name.as_str())
            .finish_non_exhaustive()
    }
}

impl UrlCounter {
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Add one to the series identified by the label values
    pub fn increment(&self, url: &str, method: &str, status: &str) {
        let [url_label, method_label, status_label] = URL_LABEL_NAMES;
        let labels = vec![
            Label::new(url_label, url.to_string()),
            Label::new(method_label, method.to_string()),
            Label::new(status_label, status.to_string()),
        ];
        let key = Key::from_parts(self.name.clone(), labels);
        self.recorder.register_counter(&key, &METADATA).increment(1);
    }
}

/// One-shot registration of a [`UrlCounter`].
///
/// The registration side effect runs at most once, successful or not.
/// Concurrent first callers block until it has finished and then all observe
/// the same outcome.
pub struct CounterBinding {
    registry: MetricsRegistry,
    name: String,
    counter: OnceLock<Result<UrlCounter, MetricsError>>,
}

impl CounterBinding {
    pub fn new(registry: &MetricsRegistry, name: impl Into<String>) -> Self {
        Self {
            registry: registry.clone(),
            name: name.into(),
            counter: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register on first call, then return the cached outcome
    pub fn get(&self) -> Result<&UrlCounter, &MetricsError> {
        self.counter
            .get_or_init(|| {
                let result = self.registry.register_url_counter(&self.name);
                if let Err(e) = &result {
                    tracing::error!(metric = %self.name, error = %e, "Counter registration failed");
                }
                result
            })
            .as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.counter.get().is_some()
    }
}
