//! Reference configuration loader.
//!
//! The source reads a file path on every solve; this crate treats the
//! reference configuration as an injected value (Design Note `spec.md` §9:
//! "the data loader is a collaborator, not a module global"). `ConfigLoader`
//! is the one piece that still knows about a filesystem path, grounded on
//! `original_source/api/data_loader.py::load_input_data`.

use std::path::{Path, PathBuf};

use crate::domain::InitialData;
use crate::error::ScheduleError;

/// Reads and lightly sanitizes `InitialData` from disk.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `getInitialData` (`spec.md` §6). Fails `ConfigNotFound` when the file
    /// is absent, matching `data_loader.py`'s `404` behaviour.
    pub fn load(&self) -> Result<InitialData, ScheduleError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ScheduleError::ConfigNotFound
            } else {
                ScheduleError::Io(err)
            }
        })?;
        let mut data: InitialData = serde_json::from_str(&raw)?;
        sanitize(&mut data);
        Ok(data)
    }
}

/// Local recovery per `spec.md` §7: "only configuration clamping ... happens
/// silently". `nightRecoveryCounts` is clamped by `Rules::recovery_count` on
/// read, so the only sanitizing left here is dropping out-of-range
/// `dayTypeByDate`/`wishOffs` entries that don't fit the declared horizon.
fn sanitize(data: &mut InitialData) {
    let days = data.days;
    for entries in data.wish_offs.values_mut() {
        entries.retain(|&d| d >= 0 && d < days);
    }
    data.day_type_by_date.truncate(days.max(0) as usize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_config_not_found() {
        let loader = ConfigLoader::new("/nonexistent/path/to/initial-data.json");
        assert!(matches!(loader.load(), Err(ScheduleError::ConfigNotFound)));
    }

    #[test]
    fn loads_and_clamps_out_of_range_wish_offs() {
        let mut file = tempfile_json(
            r#"{
                "year": 2024, "month": 1, "days": 3, "weekdayOfDay1": 0,
                "shifts": [], "needTemplate": {"bathDay": {"7-9":0,"9-15":0,"16-18":0,"18-24":0,"0-7":0},
                "normalDay": {"7-9":0,"9-15":0,"16-18":0,"18-24":0,"0-7":0},
                "wednesday": {"7-9":0,"9-15":0,"16-18":0,"18-24":0,"0-7":0}},
                "dayTypeByDate": ["normalDay", "normalDay", "normalDay", "normalDay"],
                "people": [], "rules": {"nightRest": {}}, "weights": {
                    "W_shortage": 1, "W_overstaff_gt_need_plus1": 1,
                    "W_requested_off_violation": 1
                },
                "wishOffs": {"alice": [0, 1, 99]}
            }"#,
        );
        let loader = ConfigLoader::new(file.path_buf());
        let data = loader.load().expect("loads");
        assert_eq!(data.wish_offs.get("alice").unwrap(), &vec![0, 1]);
        assert_eq!(data.day_type_by_date.len(), 3);
        file.close();
    }

    struct TempJson {
        path: PathBuf,
    }

    impl TempJson {
        fn path_buf(&self) -> PathBuf {
            self.path.clone()
        }
        fn close(self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn tempfile_json(contents: &str) -> TempJson {
        let path = std::env::temp_dir().join(format!(
            "shift-scheduling-core-test-{}.json",
            std::process::id()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        TempJson { path }
    }
}
