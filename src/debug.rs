use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Opt-in JSONL trace of adjustment passes. One record per line plus a
/// counter summary emitted on demand.
///
/// Loggers made with `for_document` share the output file but count on their
/// own, and tag every record with the document id.
#[derive(Clone)]
pub(crate) struct DebugLogger {
    writer: Arc<Mutex<BufWriter<File>>>,
    counters: Arc<Mutex<BTreeMap<String, u64>>>,
    doc_id: Option<usize>,
}

impl DebugLogger {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            counters: Arc::new(Mutex::new(BTreeMap::new())),
            doc_id: None,
        })
    }

    pub fn for_document(&self, doc_id: Option<usize>) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            counters: Arc::new(Mutex::new(BTreeMap::new())),
            doc_id,
        }
    }

    pub fn log(&self, kind: &str, fields: Value) {
        let mut record = Map::new();
        record.insert("type".to_string(), Value::String(kind.to_string()));
        if let Some(doc_id) = self.doc_id {
            record.insert("doc_id".to_string(), json!(doc_id));
        }
        if let Value::Object(extra) = fields {
            record.extend(extra);
        }
        self.write_line(&Value::Object(record));
    }

    pub fn increment(&self, key: &str, amount: u64) {
        if let Ok(mut counters) = self.counters.lock() {
            let entry = counters.entry(key.to_string()).or_insert(0);
            *entry = entry.saturating_add(amount);
        }
    }

    pub fn emit_summary(&self, context: &str) {
        let counters = match self.counters.lock() {
            Ok(mut counters) => std::mem::take(&mut *counters),
            Err(_) => return,
        };
        self.log("debug.summary", json!({ "context": context, "counts": counters }));
    }

    pub fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }

    fn write_line(&self, record: &Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{record}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .expect("read")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn records_and_summary_are_json_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trace.jsonl");
        let logger = DebugLogger::new(&path).expect("logger");
        logger.log("adjust.page_breaks", json!({ "selector": ".block", "marked": 2 }));
        logger.increment("page_breaks.marked", 2);
        logger.increment("page_breaks.marked", 1);
        logger.emit_summary("prepare");
        logger.flush();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "adjust.page_breaks");
        assert_eq!(lines[0]["marked"], 2);
        assert!(lines[0].get("doc_id").is_none());
        assert_eq!(lines[1]["type"], "debug.summary");
        assert_eq!(lines[1]["counts"]["page_breaks.marked"], 3);
    }

    #[test]
    fn document_loggers_share_file_but_not_counters() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trace.jsonl");
        let root = DebugLogger::new(&path).expect("logger");
        let first = root.for_document(Some(0));
        let second = root.for_document(Some(1));
        first.increment("label.passes", 1);
        second.increment("label.passes", 5);
        first.emit_summary("prepare");
        second.emit_summary("prepare");
        root.flush();

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["doc_id"], 0);
        assert_eq!(lines[0]["counts"]["label.passes"], 1);
        assert_eq!(lines[1]["doc_id"], 1);
        assert_eq!(lines[1]["counts"]["label.passes"], 5);
    }
}
