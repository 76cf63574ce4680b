use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// One step's observation batch as the trainer appends it, one JSON object
/// per line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObservationBatch {
    pub step: u64,
    pub true_labels: Vec<usize>,
    pub predicted_labels: Vec<usize>,
}

/// Byte cursor over an append-only JSONL observations file.
///
/// Only newline-terminated lines are consumed; a partially written trailing
/// line stays in the file for the next poll. The file not existing yet is
/// not an error, the trainer may simply not have started.
#[derive(Debug)]
pub struct BatchReader {
    path: PathBuf,
    offset: u64,
    line_no: usize,
}

impl BatchReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            offset: 0,
            line_no: 0,
        }
    }

    /// Parse every complete line appended since the last poll.
    pub fn poll(&mut self) -> Result<Vec<ObservationBatch>> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed opening observations file {}", self.path.display())
                })
            }
        };

        file.seek(SeekFrom::Start(self.offset)).with_context(|| {
            format!(
                "failed seeking to offset {} in {}",
                self.offset,
                self.path.display()
            )
        })?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .with_context(|| format!("failed reading {}", self.path.display()))?;

        let Some(last_newline) = buf.rfind('\n') else {
            return Ok(Vec::new());
        };
        let complete = &buf[..=last_newline];

        let mut batches = Vec::new();
        for line in complete.lines() {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let batch: ObservationBatch = serde_json::from_str(line).with_context(|| {
                format!(
                    "malformed observation batch at line {} of {}",
                    self.line_no,
                    self.path.display()
                )
            })?;
            batches.push(batch);
        }

        self.offset += complete.len() as u64;
        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn batch_line(step: u64) -> String {
        format!("{{\"step\":{step},\"true_labels\":[0,1],\"predicted_labels\":[0,1]}}\n")
    }

    #[test]
    fn missing_file_yields_no_batches() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = BatchReader::new(dir.path().join("obs.jsonl"));
        assert!(reader.poll().unwrap().is_empty());
    }

    #[test]
    fn consumes_only_complete_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{}", batch_line(0)).unwrap();
        // Trailing partial line: the trainer is mid-write.
        write!(f, "{{\"step\":1,\"true_l").unwrap();
        f.flush().unwrap();

        let mut reader = BatchReader::new(&path);
        let batches = reader.poll().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].step, 0);

        // Nothing new until the line is finished.
        assert!(reader.poll().unwrap().is_empty());

        write!(f, "abels\":[1],\"predicted_labels\":[0]}}\n").unwrap();
        write!(f, "{}", batch_line(2)).unwrap();
        f.flush().unwrap();

        let batches = reader.poll().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].step, 1);
        assert_eq!(batches[0].true_labels, vec![1]);
        assert_eq!(batches[0].predicted_labels, vec![0]);
        assert_eq!(batches[1].step, 2);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");
        std::fs::write(&path, format!("{}\n\n{}", batch_line(0), batch_line(1))).unwrap();

        let mut reader = BatchReader::new(&path);
        let batches = reader.poll().unwrap();
        assert_eq!(batches.len(), 2);
    }

    #[test]
    fn malformed_line_is_an_error_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.jsonl");
        std::fs::write(&path, format!("{}not json\n", batch_line(0))).unwrap();

        let mut reader = BatchReader::new(&path);
        let err = reader.poll().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
