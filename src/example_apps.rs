use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, error::ErrorKind};
use indexmap::IndexSet;
use serde::Serialize;

use crate::config::KFoldConfig;
use crate::constants::config::{DEFAULT_CACHE_DIR, DEFAULT_FOLD_COUNT, MIN_FOLD_COUNT};
use crate::dataset::{FoldDataset, TrialDataset};
use crate::metadata::{MetadataTable, SUBJECT_ID_COLUMN};
use crate::partitioner::KFoldGroupbyTrial;
use crate::store::FoldStore;
use crate::types::{FoldId, SubjectId};

#[derive(Debug, Parser)]
#[command(
    name = "kfold_trial_demo",
    disable_help_subcommand = true,
    about = "Trial-grouped k-fold partitioning",
    long_about = "Partition a subject/trial metadata CSV into k folds, splitting every trial on its own, and persist the folds for later runs.",
    after_help = "An existing cache directory is replayed as-is. Pass --clear-cache to recompute it."
)]
/// CLI for `kfold_trial_demo`.
///
/// Common usage:
/// - Partition into five folds under the default cache: `--metadata info.csv`
/// - Reproducible shuffled folds: `--metadata info.csv --shuffle --seed 42`
/// - Recompute after changing the fold count: `--fold-count 10 --clear-cache`
struct KFoldDemoCli {
    #[arg(
        long,
        value_name = "CSV",
        help = "Metadata CSV with subject_id and trial_id columns"
    )]
    metadata: PathBuf,
    #[arg(
        long = "fold-count",
        default_value_t = DEFAULT_FOLD_COUNT,
        value_parser = parse_fold_count,
        help = "Number of folds per trial"
    )]
    fold_count: usize,
    #[arg(long, help = "Shuffle samples inside each trial before splitting")]
    shuffle: bool,
    #[arg(long, help = "Seed for reproducible shuffling (ignored without --shuffle)")]
    seed: Option<u64>,
    #[arg(
        long = "cache-path",
        value_name = "DIR",
        default_value = DEFAULT_CACHE_DIR,
        help = "Directory holding persisted fold partitions"
    )]
    cache_path: PathBuf,
    #[arg(long = "clear-cache", help = "Remove persisted folds before splitting")]
    clear_cache: bool,
    #[arg(long, help = "Print the fold summary as JSON")]
    json: bool,
}

/// Row counts of one fold as reported by the demo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoldSummary {
    /// Fold index.
    pub fold_id: FoldId,
    /// Rows in the train partition.
    pub train_rows: usize,
    /// Rows in the test partition.
    pub test_rows: usize,
    /// Subjects present in the test partition, in first-appearance order.
    pub test_subjects: Vec<SubjectId>,
}

/// Parse demo CLI args, partition the metadata CSV, and print fold sizes.
pub fn run_kfold_demo<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<KFoldDemoCli, _>(
        std::iter::once("kfold_trial_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let config = KFoldConfig::default()
        .with_fold_count(cli.fold_count)
        .with_shuffle(cli.shuffle)
        .with_random_seed(cli.seed)
        .with_cache_path(cli.cache_path);
    let cv = KFoldGroupbyTrial::new(config)?;
    if cli.clear_cache {
        cv.clear_cache()?;
    }

    let info = MetadataTable::from_csv_path(&cli.metadata)?;
    let dataset = TrialDataset::new(Arc::new(cli.metadata), info);
    let summaries = summarize_folds(&cv, &dataset)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{cv}");
        print_fold_summaries(&summaries);
    }
    Ok(())
}

/// Walk every fold produced by `cv.split` and count its rows.
pub fn summarize_folds<S, D>(
    cv: &KFoldGroupbyTrial<S>,
    dataset: &D,
) -> Result<Vec<FoldSummary>, Box<dyn Error>>
where
    S: FoldStore,
    D: FoldDataset,
{
    let splits = cv.split(dataset)?;
    let fold_ids = splits.remaining_fold_ids().to_vec();
    let mut summaries = Vec::with_capacity(fold_ids.len());
    for (fold_id, item) in fold_ids.into_iter().zip(splits) {
        let (train, test) = item?;
        let test_meta = test.metadata();
        let subject_col = test_meta.require_column(SUBJECT_ID_COLUMN)?;
        let test_subjects: IndexSet<&str> = test_meta
            .rows()
            .iter()
            .map(|row| row[subject_col].as_str())
            .collect();
        summaries.push(FoldSummary {
            fold_id,
            train_rows: train.metadata().len(),
            test_rows: test_meta.len(),
            test_subjects: test_subjects.into_iter().map(str::to_string).collect(),
        });
    }
    Ok(summaries)
}

fn print_fold_summaries(summaries: &[FoldSummary]) {
    if summaries.is_empty() {
        println!("No folds persisted. Ensure the metadata table has rows.");
        return;
    }
    println!("{:>6} {:>10} {:>10}  test subjects", "fold", "train", "test");
    for summary in summaries {
        println!(
            "{:>6} {:>10} {:>10}  {}",
            summary.fold_id,
            summary.train_rows,
            summary.test_rows,
            summary.test_subjects.join(",")
        );
    }
}

fn parse_fold_count(raw: &str) -> Result<usize, String> {
    let parsed = raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --fold-count value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed < MIN_FOLD_COUNT {
        return Err(format!("--fold-count must be at least {MIN_FOLD_COUNT}"));
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_info(path: &std::path::Path) {
        let mut csv = String::from("subject_id,trial_id,clip_id\n");
        for subject in ["s1", "s2"] {
            for idx in 0..6 {
                csv.push_str(&format!("{subject},t0,{subject}_{idx}\n"));
            }
        }
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn fold_count_parser_enforces_minimum() {
        assert_eq!(parse_fold_count("3"), Ok(3));
        assert!(parse_fold_count("1").unwrap_err().contains("at least 2"));
        assert!(parse_fold_count("abc").unwrap_err().contains("positive integer"));
    }

    #[test]
    fn cli_defaults_and_flags() {
        let cli = parse_cli::<KFoldDemoCli, _>(["kfold_trial_demo", "--metadata", "info.csv"])
            .unwrap()
            .unwrap();
        assert_eq!(cli.fold_count, DEFAULT_FOLD_COUNT);
        assert_eq!(cli.cache_path, PathBuf::from(DEFAULT_CACHE_DIR));
        assert!(!cli.shuffle && !cli.json && !cli.clear_cache);

        let cli = parse_cli::<KFoldDemoCli, _>([
            "kfold_trial_demo",
            "--metadata",
            "info.csv",
            "--fold-count",
            "3",
            "--shuffle",
            "--seed",
            "9",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cli.fold_count, 3);
        assert!(cli.shuffle);
        assert_eq!(cli.seed, Some(9));

        assert!(
            parse_cli::<KFoldDemoCli, _>(["kfold_trial_demo", "--fold-count", "3"]).is_err()
        );
    }

    #[test]
    fn demo_persists_folds_and_summaries_match() {
        let dir = tempdir().unwrap();
        let info_path = dir.path().join("info.csv");
        write_info(&info_path);
        let cache = dir.path().join("cache");

        run_kfold_demo(
            [
                "--metadata",
                info_path.to_str().unwrap(),
                "--fold-count",
                "3",
                "--cache-path",
                cache.to_str().unwrap(),
                "--json",
            ]
            .into_iter()
            .map(String::from),
        )
        .unwrap();
        assert!(cache.join("train_fold_2.csv").is_file());
        assert!(cache.join("test_fold_2.csv").is_file());

        let cv = KFoldGroupbyTrial::new(
            KFoldConfig::default()
                .with_fold_count(3)
                .with_cache_path(&cache),
        )
        .unwrap();
        let info = MetadataTable::from_csv_path(&info_path).unwrap();
        let dataset = TrialDataset::new(Arc::new(()), info);
        let summaries = summarize_folds(&cv, &dataset).unwrap();
        assert_eq!(summaries.len(), 3);
        for (fold_id, summary) in summaries.iter().enumerate() {
            assert_eq!(summary.fold_id, fold_id);
            assert_eq!(summary.train_rows, 8);
            assert_eq!(summary.test_rows, 4);
            assert_eq!(summary.test_subjects, vec!["s1", "s2"]);
        }
    }
}
