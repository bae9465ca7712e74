//! Stable (subject, trial) grouping of metadata rows.
//!
//! Subjects are visited in order of first appearance, and so are the trials
//! of each subject. The order therefore depends only on the table contents,
//! which keeps persisted folds reproducible between runs.

use indexmap::IndexMap;

use crate::errors::FoldError;
use crate::metadata::{MetadataTable, SUBJECT_ID_COLUMN, TRIAL_ID_COLUMN};
use crate::types::{SubjectId, TrialId};

/// Rows of one trial of one subject, as indices into the source table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialGroup {
    /// Subject owning the trial.
    pub subject_id: SubjectId,
    /// Trial within the subject.
    pub trial_id: TrialId,
    /// Row indices in original table order.
    pub rows: Vec<usize>,
}

/// Group table rows by subject, then by trial within each subject.
pub fn group_rows_by_trial(table: &MetadataTable) -> Result<Vec<TrialGroup>, FoldError> {
    let subject_col = table.require_column(SUBJECT_ID_COLUMN)?;
    let trial_col = table.require_column(TRIAL_ID_COLUMN)?;

    let mut subjects: IndexMap<&str, IndexMap<&str, Vec<usize>>> = IndexMap::new();
    for (idx, row) in table.rows().iter().enumerate() {
        subjects
            .entry(row[subject_col].as_str())
            .or_default()
            .entry(row[trial_col].as_str())
            .or_default()
            .push(idx);
    }

    Ok(subjects
        .into_iter()
        .flat_map(|(subject_id, trials)| {
            trials.into_iter().map(move |(trial_id, rows)| TrialGroup {
                subject_id: subject_id.to_string(),
                trial_id: trial_id.to_string(),
                rows,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str)]) -> MetadataTable {
        MetadataTable::from_rows(
            ["trial_id", "subject_id", "clip_id"],
            rows.iter()
                .enumerate()
                .map(|(idx, (subject, trial))| {
                    vec![trial.to_string(), subject.to_string(), format!("clip_{idx}")]
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn groups_follow_first_appearance_order() {
        let info = table(&[
            ("b", "t1"),
            ("a", "t0"),
            ("b", "t0"),
            ("a", "t0"),
            ("b", "t1"),
        ]);
        let groups = group_rows_by_trial(&info).unwrap();
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|group| (group.subject_id.as_str(), group.trial_id.as_str()))
            .collect();
        assert_eq!(keys, vec![("b", "t1"), ("b", "t0"), ("a", "t0")]);
        assert_eq!(groups[0].rows, vec![0, 4]);
        assert_eq!(groups[1].rows, vec![2]);
        assert_eq!(groups[2].rows, vec![1, 3]);
    }

    #[test]
    fn same_trial_id_under_different_subjects_stays_separate() {
        let info = table(&[("a", "t0"), ("b", "t0")]);
        let groups = group_rows_by_trial(&info).unwrap();
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn missing_grouping_columns_are_reported() {
        let info = MetadataTable::new(["subject_id", "clip_id"]).unwrap();
        assert!(matches!(
            group_rows_by_trial(&info),
            Err(FoldError::MissingColumn(ref name)) if name == "trial_id"
        ));
    }

    #[test]
    fn empty_table_has_no_groups() {
        let info = MetadataTable::new(["subject_id", "trial_id"]).unwrap();
        assert!(group_rows_by_trial(&info).unwrap().is_empty());
    }
}
