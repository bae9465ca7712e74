/// Subject identifier as stored in the metadata table.
/// Examples: `s01`, `7`
pub type SubjectId = String;
/// Trial identifier as stored in the metadata table, unique within a subject.
/// Examples: `trial_3`, `12`
pub type TrialId = String;
/// Zero-based fold index encoded in persisted partition filenames.
/// Example: `3` for `test_fold_3.csv`
pub type FoldId = usize;
/// Metadata column name.
/// Examples: `subject_id`, `trial_id`, `clip_id`, `valence`
pub type ColumnName = String;
/// One metadata row, cell values in column order.
/// Example: `["s01", "trial_0", "clip_0", "5.3"]`
pub type MetadataRow = Vec<String>;
