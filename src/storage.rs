use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::TrackerError;

pub const RECORD_FILE_NAME: &str = "studyTimeRecord.txt";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const TRACE_FILE_NAME: &str = "studytime.log";

/// A run of consecutive non-blank lines from the record log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogParagraph {
    /// 1-based line number of `lines[0]`.
    pub first_line: usize,
    pub lines: Vec<String>,
}

/// Reads the record log as paragraphs of trimmed lines. A missing file is an
/// empty log.
pub fn read_log(path: &Path) -> io::Result<Vec<LogParagraph>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    Ok(split_paragraphs(&content))
}

pub fn split_paragraphs(content: &str) -> Vec<LogParagraph> {
    let groups = content
        .lines()
        .map(str::trim)
        .enumerate()
        .group_by(|(_, line)| !line.is_empty());

    (&groups)
        .into_iter()
        .filter(|(non_blank, _)| *non_blank)
        .filter_map(|(_, group)| {
            let numbered: Vec<(usize, &str)> = group.collect();
            let first_line = numbered.first()?.0 + 1;
            Some(LogParagraph {
                first_line,
                lines: numbered
                    .into_iter()
                    .map(|(_, line)| line.to_string())
                    .collect(),
            })
        })
        .collect()
}

/// Appends `text` to the record log, creating the file and its directory on
/// first use. History is never rewritten. A last line left without its
/// newline is terminated first so `text` starts on a line of its own.
pub fn append_to_log(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    if !ends_with_newline(&mut file)? {
        file.write_all(b"\n")?;
    }
    file.write_all(text.as_bytes())?;
    file.flush()
}

fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Opens the trace file for appending so earlier runs stay readable.
pub fn open_trace_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "studytime", "studytime")
}

/// Directory holding the record log. A record file in the working directory
/// wins, so a checkout can carry its own history.
pub fn get_data_dir() -> PathBuf {
    if Path::new(".").join(RECORD_FILE_NAME).exists() {
        return PathBuf::from(".");
    }

    if let Some(proj_dirs) = project_dirs() {
        let data_dir = proj_dirs.data_dir().to_path_buf();
        fs::create_dir_all(&data_dir).ok();
        data_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn get_config_path() -> PathBuf {
    let dir = project_dirs()
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).ok();
    dir.join(CONFIG_FILE_NAME)
}

pub fn get_state_dir() -> PathBuf {
    if let Some(proj_dirs) = project_dirs() {
        if let Some(state_dir) = proj_dirs.state_dir() {
            let dir = state_dir.to_path_buf();
            fs::create_dir_all(&dir).ok();
            return dir;
        }
        let dir = proj_dirs.cache_dir().to_path_buf();
        fs::create_dir_all(&dir).ok();
        return dir;
    }
    PathBuf::from(".")
}

pub fn get_trace_path() -> PathBuf {
    get_state_dir().join(TRACE_FILE_NAME)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, TrackerError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), TrackerError> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, &json)?;
    Ok(())
}

pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::SystemTime};

    use serde::Deserialize;

    use super::*;

    fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}.{}", prefix, now, extension))
    }

    #[test]
    fn test_split_paragraphs_groups_non_blank_lines() {
        let content = "\n2024-01-01\n09:00:00 10:00:00\n\n\n  2024-01-02  \n\n2024-01-03\n";
        let paragraphs = split_paragraphs(content);

        assert_eq!(
            paragraphs,
            vec![
                LogParagraph {
                    first_line: 2,
                    lines: vec!["2024-01-01".to_string(), "09:00:00 10:00:00".to_string()],
                },
                LogParagraph {
                    first_line: 6,
                    lines: vec!["2024-01-02".to_string()],
                },
                LogParagraph {
                    first_line: 8,
                    lines: vec!["2024-01-03".to_string()],
                },
            ]
        );
    }

    #[test]
    fn test_split_paragraphs_of_blank_text_is_empty() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_read_log_missing_file_is_empty() {
        let path = unique_path("studytime_missing_log", "txt");
        assert!(read_log(&path).unwrap().is_empty());
    }

    #[test]
    fn test_append_to_log_only_extends_the_file() {
        let path = unique_path("studytime_append_log", "txt");

        append_to_log(&path, "\n2024-01-01\n").unwrap();
        append_to_log(&path, "09:00:00 10:00:00\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\n2024-01-01\n09:00:00 10:00:00\n");
        assert_eq!(read_log(&path).unwrap().len(), 1);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_append_to_log_terminates_unfinished_last_line() {
        let path = unique_path("studytime_unterminated_log", "txt");
        fs::write(&path, "\n2024-01-01\n09:00:00 10:00:00").unwrap();

        append_to_log(&path, "11:00:00 12:00:00\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\n2024-01-01\n09:00:00 10:00:00\n11:00:00 12:00:00\n"
        );
        assert_eq!(read_log(&path).unwrap()[0].lines.len(), 3);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_trace_file_keeps_earlier_runs() {
        let path = unique_path("studytime_trace", "log");

        open_trace_file(&path).unwrap().write_all(b"first run\n").unwrap();
        open_trace_file(&path).unwrap().write_all(b"second run\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first run\nsecond run\n");

        fs::remove_file(path).ok();
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestJsonValue {
        name: String,
        count: usize,
    }

    #[test]
    fn test_json_helper_round_trip() {
        let path = unique_path("studytime_json_roundtrip", "json");
        let value = TestJsonValue {
            name: "sample".to_string(),
            count: 3,
        };

        assert_eq!(read_json::<TestJsonValue>(&path).unwrap(), None);
        write_json_atomic(&path, &value).unwrap();
        let loaded: Option<TestJsonValue> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(value));

        fs::remove_file(path).ok();
    }
}
