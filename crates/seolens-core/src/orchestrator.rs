//! Concurrent fan-out over the six audit modules
//!
//! All module futures are polled on the calling task. Each result is
//! recorded into the [`AuditRun`] as soon as its future settles, and every
//! module owns exactly one key, so no locking is needed.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::audits::{headings, images, keyword_density, meta_tags, mobile_friendly, page_speed};
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::fetch::{HtmlFetcher, HtmlSource};
use crate::pagespeed::{PageSpeedClient, PerformanceSource};
use crate::types::{ModuleKind, ModuleResult};
use crate::url_utils::AuditTarget;

/// How error-status modules take part in the overall score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScorePolicy {
    /// Failed modules count with their score of 0
    #[default]
    IncludeErrors,
    /// Only successful modules are averaged
    ExcludeErrors,
}

/// Results of one audit, keyed by module. A missing key is a pending module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRun {
    pub id: Uuid,
    pub target: AuditTarget,
    pub started_at: DateTime<Utc>,
    results: BTreeMap<ModuleKind, ModuleResult>,
}

impl AuditRun {
    pub fn new(target: AuditTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            started_at: Utc::now(),
            results: BTreeMap::new(),
        }
    }

    /// Store a module's result. A module can only be recorded once.
    pub fn record(&mut self, result: ModuleResult) -> Result<()> {
        if self.results.contains_key(&result.module) {
            return Err(AuditError::AlreadyRecorded(result.module));
        }
        self.results.insert(result.module, result);
        Ok(())
    }

    pub fn get(&self, module: ModuleKind) -> Option<&ModuleResult> {
        self.results.get(&module)
    }

    pub fn is_pending(&self, module: ModuleKind) -> bool {
        !self.results.contains_key(&module)
    }

    /// Modules without a result yet, in report order
    pub fn pending(&self) -> Vec<ModuleKind> {
        ModuleKind::ALL
            .into_iter()
            .filter(|module| self.is_pending(*module))
            .collect()
    }

    /// Completed results, in report order
    pub fn completed(&self) -> impl Iterator<Item = &ModuleResult> {
        self.results.values()
    }

    pub fn is_complete(&self) -> bool {
        self.results.len() == ModuleKind::ALL.len()
    }

    /// Rounded mean of every recorded score; 0 while nothing has completed
    pub fn overall_score(&self) -> u8 {
        self.overall_score_with(ScorePolicy::IncludeErrors)
    }

    pub fn overall_score_with(&self, policy: ScorePolicy) -> u8 {
        let scores: Vec<u32> = self
            .completed()
            .filter(|result| policy == ScorePolicy::IncludeErrors || result.is_success())
            .map(|result| u32::from(result.score))
            .collect();

        if scores.is_empty() {
            return 0;
        }
        let sum: u32 = scores.iter().sum();
        (f64::from(sum) / scores.len() as f64).round() as u8
    }
}

/// Runs every audit module against a target
pub struct Auditor {
    html: Arc<dyn HtmlSource>,
    performance: Arc<dyn PerformanceSource>,
}

impl Auditor {
    pub fn new(html: Arc<dyn HtmlSource>, performance: Arc<dyn PerformanceSource>) -> Self {
        Self { html, performance }
    }

    /// Live proxy fetcher and PageSpeed client
    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let fetcher = HtmlFetcher::from_config(config)?;
        info!(strategies = ?fetcher.strategy_names(), "configured fetch strategies");
        if config.usable_api_key().is_none() {
            warn!("PAGESPEED_API_KEY is not set; the page speed module will report an error");
        }
        let client = PageSpeedClient::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher), Arc::new(client)))
    }

    /// Run all six modules concurrently.
    ///
    /// `observer` is called once per module, in completion order, right after
    /// its result is recorded.
    pub async fn run<F>(&self, target: &AuditTarget, mut observer: F) -> AuditRun
    where
        F: FnMut(ModuleKind, &ModuleResult),
    {
        let mut run = AuditRun::new(target.clone());
        info!(run_id = %run.id, url = %target, "starting audit");

        let mut in_flight: FuturesUnordered<_> = ModuleKind::ALL
            .into_iter()
            .map(|module| self.run_module(module, target))
            .collect();

        while let Some(result) = in_flight.next().await {
            let module = result.module;
            info!(
                module = module.key(),
                score = result.score,
                status = ?result.status,
                "module settled"
            );
            if let Err(err) = run.record(result) {
                warn!(error = %err, "dropping duplicate module result");
                continue;
            }
            if let Some(recorded) = run.get(module) {
                observer(module, recorded);
            }
        }

        info!(
            run_id = %run.id,
            overall = run.overall_score(),
            "audit complete"
        );
        run
    }

    async fn run_module(&self, module: ModuleKind, target: &AuditTarget) -> ModuleResult {
        let html = self.html.as_ref();
        match module {
            ModuleKind::PageSpeed => page_speed::run(self.performance.as_ref(), target).await,
            ModuleKind::MetaTags => meta_tags::run(html, target).await,
            ModuleKind::Headings => headings::run(html, target).await,
            ModuleKind::Images => images::run(html, target).await,
            ModuleKind::MobileFriendly => mobile_friendly::run(html, target).await,
            ModuleKind::KeywordDensity => keyword_density::run(html, target).await,
        }
    }
}
