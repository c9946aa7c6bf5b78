//! Persisted schedule state (`spec.md` §4.5/§5), grounded on
//! `original_source/api/state.py`. The on-disk file is the source of truth;
//! a `parking_lot::Mutex` only serialises this process's own load→validate→
//! write sequence, matching `ConfigLoader`'s approach to filesystem state.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::domain::{PersonSchedule, ScheduleChange, ScheduleSaveRequest, ScheduleSaveResponse, ScheduleState};
use crate::error::ScheduleError;

pub struct StateStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `load()` (`spec.md` §4.5): defaults to `{version: 1, locked: false}`
    /// when the file is absent.
    pub fn load(&self) -> Result<ScheduleState, ScheduleError> {
        let _lock = self.guard.lock();
        self.load_locked()
    }

    fn load_locked(&self) -> Result<ScheduleState, ScheduleError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ScheduleState::default()),
            Err(err) => Err(ScheduleError::Io(err)),
        }
    }

    /// `save(state)` (`spec.md` §4.5/§5): write-temp-then-rename so readers
    /// never observe a torn file.
    fn save_locked(&self, state: &ScheduleState) -> Result<(), ScheduleError> {
        let payload = serde_json::to_vec_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = std::fs::File::create(&tmp_path)?;
            tmp.write_all(&payload)?;
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Validates `request` against the current state (version + lock),
    /// persists the new state with `locked` set as requested, and returns
    /// the change set. Shared by `saveDraft` (`locked = false`) and
    /// `finalizeSchedule` (`locked = true`).
    pub fn apply(
        &self,
        request: &ScheduleSaveRequest,
        locked_after: bool,
    ) -> Result<ScheduleSaveResponse, ScheduleError> {
        let _guard = self.guard.lock();
        let current = self.load_locked()?;
        enforce_version_and_lock(request, &current)?;

        let changes = diff(&current.schedule, &request.schedule);
        let next = ScheduleState {
            version: current.version + 1,
            locked: locked_after,
            schedule: request.schedule.clone(),
        };
        self.save_locked(&next)?;

        Ok(ScheduleSaveResponse {
            version: next.version,
            locked: next.locked,
            changes,
        })
    }
}

/// `enforce(request, current)` (`spec.md` §4.5): locked schedules reject
/// every mutation; a stale `baseVersion` fails with the diff attached so the
/// caller can present merge UI.
fn enforce_version_and_lock(
    request: &ScheduleSaveRequest,
    current: &ScheduleState,
) -> Result<(), ScheduleError> {
    if current.locked {
        return Err(ScheduleError::Locked {
            current_version: current.version,
        });
    }

    if let Some(base_version) = request.base_version {
        if base_version != current.version {
            let changes = diff(&request.schedule, &current.schedule);
            return Err(ScheduleError::VersionConflict {
                current_version: current.version,
                changes,
            });
        }
    }

    Ok(())
}

fn value_or_none(days: &PersonSchedule, index: usize) -> Option<String> {
    days.get(index).cloned().flatten()
}

/// `diff(prev, next)` (`spec.md` §4.5): union of person IDs in sorted order,
/// cell-by-cell comparison up to the longer array's length, null-safe.
pub fn diff(
    previous: &std::collections::HashMap<String, PersonSchedule>,
    updated: &std::collections::HashMap<String, PersonSchedule>,
) -> Vec<ScheduleChange> {
    let mut person_ids: Vec<&String> = previous.keys().chain(updated.keys()).collect();
    person_ids.sort();
    person_ids.dedup();

    let empty: PersonSchedule = Vec::new();
    let mut changes = Vec::new();
    for person_id in person_ids {
        let prev_days = previous.get(person_id).unwrap_or(&empty);
        let next_days = updated.get(person_id).unwrap_or(&empty);
        let max_len = prev_days.len().max(next_days.len());
        for day_index in 0..max_len {
            let before = value_or_none(prev_days, day_index);
            let after = value_or_none(next_days, day_index);
            if before == after {
                continue;
            }
            changes.push(ScheduleChange {
                person_id: person_id.clone(),
                day_index,
                previous: before,
                updated: after,
            });
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "shift-scheduling-core-state-test-{}-{}.json",
            std::process::id(),
            name
        ))
    }

    #[test]
    fn load_defaults_when_file_absent() {
        let store = StateStore::new(temp_path("missing"));
        let state = store.load().expect("loads");
        assert_eq!(state.version, 1);
        assert!(!state.locked);
        assert!(state.schedule.is_empty());
    }

    #[test]
    fn diff_is_null_safe_and_sorted_by_person() {
        let mut previous = HashMap::new();
        previous.insert("bob".to_string(), vec![Some("D".to_string()), None]);
        previous.insert("alice".to_string(), vec![None, Some("D".to_string())]);

        let mut updated = previous.clone();
        updated.insert("alice".to_string(), vec![None, None]);

        let changes = diff(&previous, &updated);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].person_id, "alice");
        assert_eq!(changes[0].day_index, 1);
        assert_eq!(changes[0].previous.as_deref(), Some("D"));
        assert_eq!(changes[0].updated, None);
    }

    /// Seed scenario 5 (`spec.md` §8): a stale `baseVersion` is rejected with
    /// the current version and a diff attached.
    #[test]
    fn version_conflict_carries_current_version_and_diff() {
        let path = temp_path("version-conflict");
        let store = StateStore::new(&path);

        let mut first_schedule = HashMap::new();
        first_schedule.insert("alice".to_string(), vec![Some("D".to_string())]);
        store
            .apply(
                &ScheduleSaveRequest {
                    schedule: first_schedule,
                    base_version: Some(1),
                },
                false,
            )
            .expect("first save succeeds");

        let stale_request = ScheduleSaveRequest {
            schedule: HashMap::from([("alice".to_string(), vec![Some("NA".to_string())])]),
            base_version: Some(1),
        };
        let err = store.apply(&stale_request, false).unwrap_err();
        match err {
            ScheduleError::VersionConflict { current_version, changes } => {
                assert_eq!(current_version, 2);
                assert!(!changes.is_empty());
            }
            other => panic!("expected VersionConflict, got {other:?}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    /// Seed scenario 6 (`spec.md` §8): once locked, every save is rejected
    /// regardless of `baseVersion`.
    #[test]
    fn locked_state_rejects_every_save() {
        let path = temp_path("locked");
        let store = StateStore::new(&path);

        store
            .apply(
                &ScheduleSaveRequest {
                    schedule: HashMap::new(),
                    base_version: None,
                },
                true,
            )
            .expect("finalize succeeds");

        let err = store
            .apply(
                &ScheduleSaveRequest {
                    schedule: HashMap::new(),
                    base_version: None,
                },
                false,
            )
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Locked { current_version: 2 }));

        let _ = std::fs::remove_file(&path);
    }
}
