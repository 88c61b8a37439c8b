use super::StatePaths;
use chrono::Utc;
use std::fs;
use std::io::Write;

pub fn append_wizard_log(paths: &StatePaths, level: &str, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": Utc::now().timestamp(),
        "level": level,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    let path = paths.wizard_log_path();
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_lines_are_json_objects() {
        let temp = tempdir().expect("tempdir");
        let paths = StatePaths::new(temp.path());
        append_wizard_log(&paths, "info", "ebo.save", "saved ebo-1");
        append_wizard_log(&paths, "error", "ebo.save", "disk full");
        let body = fs::read_to_string(paths.wizard_log_path()).expect("read log");
        let lines: Vec<serde_json::Value> = body
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["level"], "error");
        assert_eq!(lines[1]["event"], "ebo.save");
        assert!(lines[0]["timestamp"].as_i64().is_some());
    }
}
