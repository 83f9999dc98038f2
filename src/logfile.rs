//! Plain-text solve logs (diagnostics, errors and warnings).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Current local time, `YYYY-MM-DD HH:MM:SS`
pub fn time_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A log written to a file, or discarded when created with [`LogFile::sink`]
pub struct LogFile {
    writer: Option<BufWriter<File>>,
    written: String,
    keep: bool,
}

impl LogFile {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let file = File::create(&path)
            .map_err(|e| format!("Cannot create log file {:?}: {}", path.as_ref(), e))?;
        Ok(LogFile { writer: Some(BufWriter::new(file)), written: String::new(), keep: false })
    }

    pub fn sink() -> Self {
        LogFile { writer: None, written: String::new(), keep: false }
    }

    /// Keeps everything written in memory; used to inspect logs in tests
    pub fn memory() -> Self {
        LogFile { writer: None, written: String::new(), keep: true }
    }

    pub fn contents(&self) -> &str {
        &self.written
    }

    pub fn write(&mut self, text: &str) {
        if self.keep {
            self.written.push_str(text);
        }
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.write_all(text.as_bytes()) {
                log::warn!("Failed to write log file: {}", e);
            }
        }
    }

    /// Write a titled table; the first row is the header
    pub fn log_table(&mut self, title: &str, rows: &[Vec<String>]) {
        let widths: Vec<usize> = rows.iter().fold(Vec::new(), |mut widths, row| {
            for (i, cell) in row.iter().enumerate() {
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(cell.len()),
                    None => widths.push(cell.len()),
                }
            }
            widths
        });

        let mut out = format!("\n{}\n", title);
        for (r, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect();
            out.push_str(cells.join(" | ").trim_end());
            out.push('\n');
            if r == 0 {
                let total = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
                out.push_str(&"-".repeat(total));
                out.push('\n');
            }
        }
        out.push('\n');
        self.write(&out);
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let mut log = LogFile::memory();
        log.log_table(
            "Useless Sites",
            &[vec!["Site".to_string()], vec!["Oslo".to_string()], vec!["Rome".to_string()]],
        );
        assert_eq!(log.contents(), "\nUseless Sites\nSite\n----\nOslo\nRome\n\n");
    }

    #[test]
    fn test_sink_discards() {
        let mut log = LogFile::sink();
        log.write("ignored");
        assert!(log.contents().is_empty());
    }

    #[test]
    fn test_file_log_is_flushed() {
        let path = std::env::temp_dir().join(format!("cog-log-{}.txt", std::process::id()));
        {
            let mut log = LogFile::create(&path).unwrap();
            log.write("COG output log\n");
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "COG output log\n");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_time_stamp_format() {
        let ts = time_stamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[13..14], ":");
    }
}
