use std::path::Path;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use genome_fetch::app::{App, FetchOutcome, ProgressEvent, ProgressSink, RunOptions, RunOutcome};
use genome_fetch::config::Config;
use genome_fetch::error::GfetchError;
use genome_fetch::manifest::Manifest;
use genome_fetch::query::QueryFilter;
use genome_fetch::remote::RemoteStore;

const MANIFEST: &str = "#Organism/Name\tTaxID\tGroup\tSubGroup\tStatus\tFTP Path\tChromosomes/RefSeq
Escherichia coli K-12\t511145\tProteobacteria\tGammaproteobacteria\tComplete\tEcoli_uid57779\tNC_000913.3
Salmonella enterica LT2\t99287\tProteobacteria\tGammaproteobacteria\tChromosome\tSalmonella_uid57799\tNC_003197.2
Bacillus subtilis 168\t224308\tFirmicutes\tBacilli\tComplete\t-\tNC_000964.3
";

struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Default)]
struct MockStore {
    calls: Mutex<Vec<String>>,
    closes: Mutex<usize>,
    fail_paths: Vec<String>,
    manifest: Option<String>,
}

impl MockStore {
    fn serving(manifest: &str) -> Self {
        Self {
            manifest: Some(manifest.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn closes(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

impl RemoteStore for MockStore {
    fn download(&self, remote_path: &str, local_path: &Path) -> Result<(), GfetchError> {
        self.calls.lock().unwrap().push(remote_path.to_string());
        if self.fail_paths.iter().any(|path| path == remote_path) {
            return Err(GfetchError::Transfer("connection reset".to_string()));
        }
        let body = if remote_path.ends_with("prokaryotes.txt") {
            self.manifest
                .clone()
                .ok_or_else(|| GfetchError::Status {
                    status: 404,
                    message: "not found".to_string(),
                })?
        } else {
            format!(">{remote_path}\nACGT\n")
        };
        std::fs::write(local_path, body).map_err(|err| GfetchError::Filesystem(err.to_string()))
    }

    fn close(&self) {
        *self.closes.lock().unwrap() += 1;
    }
}

fn outdir(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("genomes")).unwrap()
}

#[test]
fn invalid_action_fails_before_store_is_touched() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::serving(MANIFEST);
    let app = App::new(&store, Config::default());

    let err = app
        .execute(
            "delete",
            &QueryFilter::default(),
            &outdir(&temp),
            RunOptions::default(),
            &NoopSink,
        )
        .unwrap_err();

    assert_matches!(err, GfetchError::InvalidAction(action) if action == "delete");
    assert!(store.calls().is_empty());
    assert_eq!(store.closes(), 0);
    assert!(!outdir(&temp).as_std_path().exists());
}

#[test]
fn search_lists_matches_without_writing() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::serving(MANIFEST);
    let app = App::new(&store, Config::default());

    let outcome = app
        .execute(
            "search",
            &QueryFilter::default(),
            &outdir(&temp),
            RunOptions::default(),
            &NoopSink,
        )
        .unwrap();

    let RunOutcome::Search(result) = outcome else {
        panic!("expected search outcome");
    };
    let names: Vec<_> = result.rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Escherichia coli K-12", "Salmonella enterica LT2"]);
    assert!(result.columns.is_none());
    assert_eq!(store.calls(), vec!["/genomes/GENOME_REPORTS/prokaryotes.txt"]);
    assert_eq!(store.closes(), 1);
    assert!(!outdir(&temp).as_std_path().exists());
}

#[test]
fn verbose_search_carries_every_column() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::serving(MANIFEST);
    let app = App::new(&store, Config::default());
    let options = RunOptions {
        verbose: true,
        dry_run: false,
    };

    let outcome = app
        .execute("search", &QueryFilter::default(), &outdir(&temp), options, &NoopSink)
        .unwrap();

    let RunOutcome::Search(result) = outcome else {
        panic!("expected search outcome");
    };
    assert_eq!(result.columns.as_ref().map(Vec::len), Some(7));
    assert_eq!(result.rows[0].fields.as_ref().map(Vec::len), Some(7));
}

#[test]
fn failed_download_does_not_stop_the_next_one() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = outdir(&temp);
    let first = "genomes/ASSEMBLY_BACTERIA/Ecoli_uid57779/NC_000913.fna".to_string();
    let second = "genomes/ASSEMBLY_BACTERIA/Salmonella_uid57799/NC_003197.fna".to_string();
    let store = MockStore {
        fail_paths: vec![first.clone()],
        ..MockStore::default()
    };
    let manifest = Manifest::parse(MANIFEST, 10, "Chromosomes/RefSeq").unwrap();
    let result = QueryFilter::default().apply(&manifest);
    assert_eq!(result.len(), 2);

    let app = App::new(&store, Config::default());
    let outcome = app
        .run("fetch", &manifest, &result, &outdir, RunOptions::default(), &NoopSink)
        .unwrap();

    let RunOutcome::Fetch(report) = outcome else {
        panic!("expected fetch outcome");
    };
    assert_eq!(store.calls(), vec![first, second]);
    assert_eq!(report.items[0].outcome, FetchOutcome::Failed);
    assert!(report.items[0]
        .error
        .as_deref()
        .is_some_and(|error| error.contains("connection reset")));
    assert_eq!(report.items[1].outcome, FetchOutcome::Downloaded);
    assert!(!report.is_complete());
    assert!(!outdir.join("NC_000913.fna").as_std_path().exists());
    assert!(outdir.join("NC_003197.fna").as_std_path().exists());
    assert_eq!(store.closes(), 1);
}

#[test]
fn malformed_record_is_skipped_and_reported() {
    let temp = tempfile::tempdir().unwrap();
    let text = "#Organism/Name\tTaxID\tGroup\tSubGroup\tStatus\tFTP Path\tChromosomes/RefSeq
Odd organism\t1\tG\tS\tComplete\todd_dir\t-
Escherichia coli K-12\t511145\tProteobacteria\tGammaproteobacteria\tComplete\tEcoli_uid57779\tNC_000913.3
";
    let store = MockStore::serving(text);
    let app = App::new(&store, Config::default());

    let outcome = app
        .execute(
            "fetch",
            &QueryFilter::default(),
            &outdir(&temp),
            RunOptions::default(),
            &NoopSink,
        )
        .unwrap();

    let RunOutcome::Fetch(report) = outcome else {
        panic!("expected fetch outcome");
    };
    assert_eq!(report.count(FetchOutcome::Skipped), 1);
    assert_eq!(report.count(FetchOutcome::Downloaded), 1);
    assert_eq!(report.problems(), 1);
    assert_eq!(store.calls().len(), 2);
}

#[test]
fn existing_outdir_is_reused() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = outdir(&temp);
    std::fs::create_dir_all(outdir.as_std_path()).unwrap();
    let store = MockStore::serving(MANIFEST);
    let app = App::new(&store, Config::default());

    let outcome = app
        .execute("fetch", &QueryFilter::default(), &outdir, RunOptions::default(), &NoopSink)
        .unwrap();

    assert_matches!(outcome, RunOutcome::Fetch(report) if report.is_complete());
}

#[test]
fn dry_run_plans_without_downloading() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::serving(MANIFEST);
    let app = App::new(&store, Config::default());
    let options = RunOptions {
        verbose: false,
        dry_run: true,
    };

    let outcome = app
        .execute("fetch", &QueryFilter::default(), &outdir(&temp), options, &NoopSink)
        .unwrap();

    let RunOutcome::Fetch(report) = outcome else {
        panic!("expected fetch outcome");
    };
    assert_eq!(report.count(FetchOutcome::Planned), 2);
    assert_eq!(store.calls().len(), 1);
    assert!(!outdir(&temp).as_std_path().exists());
}

#[test]
fn manifest_failure_is_fatal_and_still_closes() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::default();
    let app = App::new(&store, Config::default());

    let err = app
        .execute(
            "fetch",
            &QueryFilter::default(),
            &outdir(&temp),
            RunOptions::default(),
            &NoopSink,
        )
        .unwrap_err();

    assert_matches!(err, GfetchError::Status { status: 404, .. });
    assert_eq!(store.closes(), 1);
}

#[test]
fn unparseable_manifest_is_fatal_and_still_closes() {
    let temp = tempfile::tempdir().unwrap();
    let store = MockStore::serving("#Organism/Name\tTaxID\n");
    let app = App::new(&store, Config::default());

    let err = app
        .execute(
            "search",
            &QueryFilter::default(),
            &outdir(&temp),
            RunOptions::default(),
            &NoopSink,
        )
        .unwrap_err();

    assert_matches!(err, GfetchError::ManifestParse(_));
    assert_eq!(store.closes(), 1);
}

#[test]
fn custom_header_skip_and_base_dir() {
    let temp = tempfile::tempdir().unwrap();
    let outdir = outdir(&temp);
    let text = MANIFEST.replacen("#Organism/", "", 1);
    let store = MockStore::serving(&text);
    let config = Config {
        header_skip: 0,
        base_dir: "mirror".to_string(),
        ..Config::default()
    };
    let app = App::new(&store, config);

    app.execute("fetch", &QueryFilter::default(), &outdir, RunOptions::default(), &NoopSink)
        .unwrap();

    assert_eq!(store.calls()[1], "mirror/Ecoli_uid57779/NC_000913.fna");
}
