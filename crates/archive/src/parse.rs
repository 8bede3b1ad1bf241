// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-delimited JSON change-record parsing, shared by the real SFTP client
//! and the fake used in tests.

use datasync_core::ChangeRecord;

use crate::error::ArchiveError;

/// Parse `contents` as one JSON object per line. Blank lines are dropped.
/// The first line that fails to deserialize, or that deserializes but
/// violates a [`ChangeRecord`] invariant, fails the whole file.
pub fn parse_change_file(file_name: &str, contents: &str) -> Result<Vec<ChangeRecord>, ArchiveError> {
    let mut records = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ChangeRecord = serde_json::from_str(line).map_err(|source| {
            ArchiveError::MalformedRecord { file: file_name.to_string(), line: idx + 1, source }
        })?;
        record.validate().map_err(|source| ArchiveError::InvalidRecord {
            file: file_name.to_string(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_blank_lines() {
        let body = r#"
{"table":"users","op":"INSERT","data":{"id":1},"lsn":"0/1","ts":"2026-01-01T00:00:00Z"}

{"table":"users","op":"INSERT","data":{"id":2},"lsn":"0/2","ts":"2026-01-01T00:00:01Z"}
"#;
        let recs = parse_change_file("001.json", body).unwrap();
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn fails_whole_file_on_first_malformed_line() {
        let body = "{\"table\":\"users\",\"op\":\"INSERT\",\"data\":{\"id\":1},\"lsn\":\"0/1\",\"ts\":\"2026-01-01T00:00:00Z\"}\nnot json\n";
        let err = parse_change_file("001.json", body).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn fails_on_invariant_violation() {
        let body = "{\"table\":\"users\",\"op\":\"INSERT\",\"lsn\":\"0/1\",\"ts\":\"2026-01-01T00:00:00Z\"}\n";
        let err = parse_change_file("001.json", body).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidRecord { line: 1, .. }));
    }
}
