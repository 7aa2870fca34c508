use std::fs;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;

use crate::config::Config;
use crate::domain::Action;
use crate::error::GfetchError;
use crate::fs_util::ensure_dir;
use crate::manifest::{Manifest, TabularRecord};
use crate::query::{QueryFilter, QueryResult};
use crate::remote::{RemoteStore, StoreSession};
use crate::resolve::AssetPathResolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub verbose: bool,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RunOutcome {
    Search(SearchResult),
    Fetch(FetchReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    pub rows: Vec<SearchRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRow {
    pub name: String,
    pub group: String,
    pub subgroup: String,
    pub status: String,
    pub taxonomy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchOutcome {
    Downloaded,
    Planned,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub taxonomy_id: String,
    pub name: String,
    pub outcome: FetchOutcome,
    pub remote_path: Option<String>,
    pub local_path: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub outdir: String,
    pub dry_run: bool,
    pub finished_at: String,
    pub items: Vec<FetchItemResult>,
}

impl FetchReport {
    pub fn count(&self, outcome: FetchOutcome) -> usize {
        self.items
            .iter()
            .filter(|item| item.outcome == outcome)
            .count()
    }

    pub fn problems(&self) -> usize {
        self.count(FetchOutcome::Failed) + self.count(FetchOutcome::Skipped)
    }

    pub fn is_complete(&self) -> bool {
        self.problems() == 0
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

fn emit(sink: &dyn ProgressSink, message: String, elapsed: Option<Duration>) {
    sink.event(ProgressEvent { message, elapsed });
}

pub struct App<S: RemoteStore> {
    store: S,
    config: Config,
    resolver: AssetPathResolver,
}

impl<S: RemoteStore> App<S> {
    pub fn new(store: S, config: Config) -> Self {
        let resolver = AssetPathResolver::from_config(&config);
        Self {
            store,
            config,
            resolver,
        }
    }

    pub fn execute(
        &self,
        action: &str,
        filter: &QueryFilter,
        outdir: &Utf8Path,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutcome, GfetchError> {
        let action: Action = action.parse()?;
        let session = StoreSession::open(&self.store);

        let manifest = self.load_manifest(session.store(), sink)?;
        let result = filter.apply(&manifest);
        emit(
            sink,
            format!(
                "phase=Filter; {} of {} records matched",
                result.len(),
                manifest.len()
            ),
            None,
        );

        self.dispatch(session.store(), action, &manifest, &result, outdir, options, sink)
    }

    pub fn run(
        &self,
        action: &str,
        manifest: &Manifest,
        result: &QueryResult<'_>,
        outdir: &Utf8Path,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutcome, GfetchError> {
        let action: Action = action.parse()?;
        let session = StoreSession::open(&self.store);
        self.dispatch(session.store(), action, manifest, result, outdir, options, sink)
    }

    pub fn load_manifest(
        &self,
        store: &S,
        sink: &dyn ProgressSink,
    ) -> Result<Manifest, GfetchError> {
        emit(
            sink,
            format!("phase=Resolve; manifest {}", self.config.manifest_path),
            None,
        );
        let temp_dir = tempfile::Builder::new()
            .prefix("gfetch-manifest")
            .tempdir()
            .map_err(|err| GfetchError::Filesystem(err.to_string()))?;
        let local = temp_dir.path().join("genomes.txt");

        let start = Instant::now();
        store.download(&self.config.manifest_path, &local)?;
        emit(
            sink,
            "phase=Download; manifest retrieved".to_string(),
            Some(start.elapsed()),
        );

        let bytes = fs::read(&local).map_err(|err| GfetchError::Filesystem(err.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);
        Manifest::parse(&text, self.config.header_skip, &self.config.sequence_column)
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch(
        &self,
        store: &S,
        action: Action,
        manifest: &Manifest,
        result: &QueryResult<'_>,
        outdir: &Utf8Path,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunOutcome, GfetchError> {
        match action {
            Action::Search => Ok(RunOutcome::Search(self.search(manifest, result, options))),
            Action::Fetch => self
                .fetch(store, result, outdir, options, sink)
                .map(RunOutcome::Fetch),
        }
    }

    pub fn search(
        &self,
        manifest: &Manifest,
        result: &QueryResult<'_>,
        options: RunOptions,
    ) -> SearchResult {
        let rows = result
            .iter()
            .map(|record| SearchRow {
                name: record.name.clone(),
                group: record.group.clone(),
                subgroup: record.subgroup.clone(),
                status: record.status.clone(),
                taxonomy_id: record.taxonomy_id.clone(),
                fields: options.verbose.then(|| record.fields.clone()),
            })
            .collect();
        SearchResult {
            columns: options.verbose.then(|| manifest.columns().to_vec()),
            rows,
        }
    }

    pub fn fetch(
        &self,
        store: &S,
        result: &QueryResult<'_>,
        outdir: &Utf8Path,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchReport, GfetchError> {
        if !options.dry_run {
            ensure_dir(outdir)?;
        }

        let total = result.len();
        let mut items = Vec::with_capacity(total);
        for (idx, record) in result.iter().enumerate() {
            emit(
                sink,
                format!(
                    "phase=Fetch; [{}/{total}] {} ({})",
                    idx + 1,
                    record.name,
                    record.taxonomy_id
                ),
                None,
            );
            items.push(self.fetch_record(store, record, outdir, options, sink));
        }

        let report = FetchReport {
            outdir: outdir.to_string(),
            dry_run: options.dry_run,
            finished_at: chrono::Utc::now().to_rfc3339(),
            items,
        };
        if report.is_complete() {
            tracing::info!(records = total, "fetch complete");
        } else {
            tracing::warn!(
                records = total,
                failed = report.count(FetchOutcome::Failed),
                skipped = report.count(FetchOutcome::Skipped),
                "fetch finished with problems"
            );
        }
        Ok(report)
    }

    fn fetch_record(
        &self,
        store: &S,
        record: &TabularRecord,
        outdir: &Utf8Path,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> FetchItemResult {
        let mut item = FetchItemResult {
            taxonomy_id: record.taxonomy_id.clone(),
            name: record.name.clone(),
            outcome: FetchOutcome::Skipped,
            remote_path: None,
            local_path: None,
            error: None,
        };

        let job = match self.resolver.resolve(record) {
            Ok(job) => job,
            Err(err) => {
                tracing::warn!(taxonomy_id = %record.taxonomy_id, error = %err, "skipping record");
                item.error = Some(err.to_string());
                return item;
            }
        };
        let local_path = outdir.join(&job.local_filename);
        item.remote_path = Some(job.remote_path.clone());
        item.local_path = Some(local_path.to_string());

        if options.dry_run {
            item.outcome = FetchOutcome::Planned;
            return item;
        }

        let start = Instant::now();
        match store.download(&job.remote_path, local_path.as_std_path()) {
            Ok(()) => {
                emit(
                    sink,
                    format!("phase=Store; wrote {local_path}"),
                    Some(start.elapsed()),
                );
                item.outcome = FetchOutcome::Downloaded;
            }
            Err(err) => {
                tracing::warn!(
                    remote_path = %job.remote_path,
                    error = %err,
                    "download failed, continuing"
                );
                item.outcome = FetchOutcome::Failed;
                item.error = Some(err.to_string());
            }
        }
        item
    }
}
