use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::errors::{AuditLogError, Result};
use crate::core::models::filter::{LoginFilter, OperationFilter, Page, TimeWindow};
use crate::core::models::login_event::LoginEvent;
use crate::core::models::operation_event::OperationEvent;
use crate::core::models::summary::{LoginSummary, OperationSummary};
use crate::core::traits::AuditStore;
use crate::core::traits::login_log::LoginLogStore;
use crate::core::traits::operation_log::OperationLogStore;

const OPERATIONS_FILE: &str = "operations.jsonl";
const LOGINS_FILE: &str = "logins.jsonl";

/// Fields the store needs from any record it holds.
trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn timestamp(&self) -> i64;
}

impl Record for OperationEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Record for LoginEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Store that appends records as JSON lines, one file per relation.
///
/// Each line in a log file is a self-contained JSON object. Appends are a
/// single `write_all` of one line, so readers never observe half a record.
/// Every read loads the file once and answers from that copy, which gives
/// each call a consistent snapshot. The duplicate-id check scans before
/// appending and is not atomic across processes; use the SQLite backend
/// when several writers share a store.
pub struct JsonLinesStore {
    dir: PathBuf,
}

impl JsonLinesStore {
    /// Create a store that keeps its files under `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn append<T: Record>(&self, file: &str, record: &T) -> Result<()> {
        let path = self.dir.join(file);
        let existing: Vec<T> =
            self.load(file, AuditLogError::persistence)
                .map_err(|e| match e {
                    AuditLogError::CorruptRecord { detail } => AuditLogError::persistence(
                        format!("cannot check {file} for duplicate ids: {detail}"),
                    ),
                    other => other,
                })?;
        if existing.iter().any(|r| r.id() == record.id()) {
            return Err(AuditLogError::persistence(format!(
                "id '{}' already exists in {file}",
                record.id()
            )));
        }

        let mut line = serde_json::to_string(record).map_err(|e| {
            AuditLogError::persistence(format!("Failed to serialize record: {e}"))
        })?;
        line.push('\n');

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                AuditLogError::persistence(format!("Cannot create {}: {e}", self.dir.display()))
            })?;
        }

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                AuditLogError::persistence(format!("Cannot open {}: {e}", path.display()))
            })?;

        handle
            .write_all(line.as_bytes())
            .and_then(|()| handle.sync_data())
            .map_err(|e| AuditLogError::persistence(format!("Failed to append record: {e}")))
    }

    /// Read every record of one relation, in insertion order.
    fn load<T: Record>(
        &self,
        file: &str,
        io_err: fn(String) -> AuditLogError,
    ) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let handle = fs::File::open(&path)
            .map_err(|e| io_err(format!("Cannot read {}: {e}", path.display())))?;

        let mut records = Vec::new();
        for (line_num, line) in BufReader::new(handle).lines().enumerate() {
            let line = line.map_err(|e| {
                io_err(format!("Error reading {file} line {}: {e}", line_num + 1))
            })?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(trimmed).map_err(|e| {
                AuditLogError::corrupt(format!("{file} line {}: {e}", line_num + 1))
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

/// Keep matching records, order newest first (later lines first among
/// equal timestamps), then cut one page.
fn page_of<T: Record>(records: Vec<T>, keep: impl Fn(&T) -> bool, page: Page) -> Vec<T> {
    let mut matched: Vec<(usize, T)> = records
        .into_iter()
        .enumerate()
        .filter(|(_, r)| keep(r))
        .collect();

    matched.sort_by(|(ia, a), (ib, b)| {
        b.timestamp()
            .cmp(&a.timestamp())
            .then_with(|| ib.cmp(ia))
    });

    matched
        .into_iter()
        .skip(usize::try_from(page.skip).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .map(|(_, r)| r)
        .collect()
}

impl OperationLogStore for JsonLinesStore {
    fn insert_operation(&self, event: &OperationEvent) -> Result<()> {
        self.append(OPERATIONS_FILE, event)
            .inspect_err(|e| tracing::warn!(id = %event.id, error = %e, "operation insert failed"))
    }

    fn list_operations(
        &self,
        filter: &OperationFilter,
        page: Page,
    ) -> Result<Vec<OperationEvent>> {
        let records = self
            .load(OPERATIONS_FILE, AuditLogError::query)
            .inspect_err(|e| tracing::warn!(error = %e, "operation query failed"))?;
        Ok(page_of(records, |e| filter.matches(e), page))
    }

    fn count_operations(&self, filter: &OperationFilter) -> Result<u64> {
        let records: Vec<OperationEvent> = self
            .load(OPERATIONS_FILE, AuditLogError::query)
            .inspect_err(|e| tracing::warn!(error = %e, "operation count failed"))?;
        Ok(records.iter().filter(|e| filter.matches(e)).count() as u64)
    }

    fn summarize_operations(&self, window: TimeWindow) -> Result<OperationSummary> {
        let records: Vec<OperationEvent> = self
            .load(OPERATIONS_FILE, AuditLogError::aggregation)
            .inspect_err(|e| tracing::warn!(error = %e, "operation summary failed"))?;
        Ok(OperationSummary::tally(
            records.iter().filter(|e| window.contains(e.timestamp)),
        ))
    }
}

impl LoginLogStore for JsonLinesStore {
    fn insert_login(&self, event: &LoginEvent) -> Result<()> {
        self.append(LOGINS_FILE, event)
            .inspect_err(|e| tracing::warn!(id = %event.id, error = %e, "login insert failed"))
    }

    fn list_logins(&self, filter: &LoginFilter, page: Page) -> Result<Vec<LoginEvent>> {
        let records = self
            .load(LOGINS_FILE, AuditLogError::query)
            .inspect_err(|e| tracing::warn!(error = %e, "login query failed"))?;
        Ok(page_of(records, |e| filter.matches(e), page))
    }

    fn count_logins(&self, filter: &LoginFilter) -> Result<u64> {
        let records: Vec<LoginEvent> = self
            .load(LOGINS_FILE, AuditLogError::query)
            .inspect_err(|e| tracing::warn!(error = %e, "login count failed"))?;
        Ok(records.iter().filter(|e| filter.matches(e)).count() as u64)
    }

    fn summarize_logins(&self, window: TimeWindow) -> Result<LoginSummary> {
        let records: Vec<LoginEvent> = self
            .load(LOGINS_FILE, AuditLogError::aggregation)
            .inspect_err(|e| tracing::warn!(error = %e, "login summary failed"))?;
        Ok(LoginSummary::tally(
            records.iter().filter(|e| window.contains(e.timestamp)),
        ))
    }
}

impl AuditStore for JsonLinesStore {
    fn backend_name(&self) -> &'static str {
        "jsonl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::sqlite_store::SqliteStore;
    use crate::core::models::login_event::LoginStatus;
    use crate::core::models::operation_event::{Actor, RequestInfo, Resource, ResponseInfo};
    use crate::core::models::origin::Origin;
    use crate::core::models::vocabulary::{Action, LoginType};
    use tempfile::TempDir;

    fn sample_login(id: &str, email: &str, status: LoginStatus, timestamp: i64) -> LoginEvent {
        LoginEvent {
            id: id.to_string(),
            user_id: Some(format!("id-{email}")),
            user_email: email.to_string(),
            login_type: LoginType::new("password").unwrap(),
            status,
            failure_reason: None,
            origin: Origin {
                ip_address: "198.51.100.4".into(),
                user_agent: None,
            },
            timestamp,
        }
    }

    fn sample_operation(
        id: &str,
        user_id: Option<&str>,
        role: Option<&str>,
        status: i64,
        timestamp: i64,
    ) -> OperationEvent {
        OperationEvent {
            id: id.to_string(),
            actor: Actor {
                user_id: user_id.map(String::from),
                user_name: Some("Ada".into()),
                user_email: None,
                user_role: role.map(String::from),
            },
            action: Action::new(if status >= 400 { "DELETE" } else { "READ" }).unwrap(),
            resource: Resource {
                resource_type: "model".into(),
                resource_id: Some(format!("m-{id}")),
            },
            request: RequestInfo {
                method: "POST".into(),
                endpoint: "/api/models".into(),
                body: Some("{\"name\":\"x\"}".into()),
            },
            response: ResponseInfo {
                status,
                body: None,
            },
            origin: Origin {
                ip_address: "203.0.113.1".into(),
                user_agent: Some("curl/8.0".into()),
            },
            timestamp,
        }
    }

    #[test]
    fn operation_fields_survive_append_and_reload() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());
        let event = sample_operation("op-1", Some("u1"), Some("admin"), 201, 1_700_000_000);
        store.insert_operation(&event).unwrap();

        let listed = store
            .list_operations(&OperationFilter::default(), Page::default())
            .unwrap();
        assert_eq!(listed.len(), 1);
        let got = &listed[0];
        assert_eq!(got.id, event.id);
        assert_eq!(got.actor, event.actor);
        assert_eq!(got.action, event.action);
        assert_eq!(got.resource, event.resource);
        assert_eq!(got.request.body.as_deref(), Some("{\"name\":\"x\"}"));
        assert_eq!(got.request, event.request);
        assert_eq!(got.response, event.response);
        assert_eq!(got.origin, event.origin);
        assert_eq!(got.timestamp, event.timestamp);
    }

    #[test]
    fn operation_summary_matches_sqlite() {
        let tmp = TempDir::new().unwrap();
        let jsonl = JsonLinesStore::new(tmp.path());
        let sqlite = SqliteStore::open_in_memory().unwrap();
        let events = [
            sample_operation("a", Some("u1"), Some("admin"), 200, 99),
            sample_operation("b", Some("u1"), Some("admin"), 400, 100),
            sample_operation("c", None, None, 500, 150),
            sample_operation("d", Some("u2"), Some(""), 399, 150),
            sample_operation("e", Some(""), Some("user"), 201, 200),
            sample_operation("f", Some("u3"), None, 404, 201),
        ];
        for event in &events {
            jsonl.insert_operation(event).unwrap();
            sqlite.insert_operation(event).unwrap();
        }

        for window in [
            TimeWindow::new(100, 200),
            TimeWindow::new(0, i64::MAX),
            TimeWindow::new(150, 150),
            TimeWindow::new(200, 100),
        ] {
            assert_eq!(
                jsonl.summarize_operations(window).unwrap(),
                sqlite.summarize_operations(window).unwrap(),
                "{window:?}"
            );
        }
        let s = jsonl.summarize_operations(TimeWindow::new(100, 200)).unwrap();
        assert_eq!(s.total_operations, 4);
        assert_eq!(s.failed_operations, 2);
        assert_eq!(s.operations_by_user_role[""], 1);
    }

    #[test]
    fn corrupt_line_blocks_append_as_persistence_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOGINS_FILE), "{\"id\":\"x\", trunc\n").unwrap();
        let store = JsonLinesStore::new(tmp.path());

        let err = store
            .insert_login(&sample_login("l1", "a@example.com", LoginStatus::Success, 1))
            .unwrap_err();

        assert!(matches!(err, AuditLogError::Persistence { .. }), "{err:?}");
        let content = fs::read_to_string(tmp.path().join(LOGINS_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn uncreatable_directory_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("plain"), "not a directory").unwrap();
        let store = JsonLinesStore::new(&tmp.path().join("plain/logs"));

        let err = store
            .insert_operation(&sample_operation("op-1", None, None, 200, 1))
            .unwrap_err();

        assert!(matches!(err, AuditLogError::Persistence { .. }), "{err:?}");
    }

    #[test]
    fn insert_and_list_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());

        let event = sample_login("l1", "alice@example.com", LoginStatus::Success, 10);
        store.insert_login(&event).unwrap();

        let results = store
            .list_logins(&LoginFilter::default(), Page::default())
            .unwrap();
        assert_eq!(results, vec![event]);
    }

    #[test]
    fn missing_files_read_as_empty() {
        let store = JsonLinesStore::new(Path::new("/nonexistent/auditlog"));

        assert!(
            store
                .list_operations(&OperationFilter::default(), Page::default())
                .unwrap()
                .is_empty()
        );
        assert_eq!(store.count_logins(&LoginFilter::default()).unwrap(), 0);
        assert_eq!(
            store.summarize_logins(TimeWindow::new(0, 100)).unwrap(),
            LoginSummary::default()
        );
    }

    #[test]
    fn creates_directory_on_first_write() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(&tmp.path().join("nested/logs"));

        store
            .insert_login(&sample_login("l1", "a@example.com", LoginStatus::Failed, 1))
            .unwrap();

        assert!(tmp.path().join("nested/logs/logins.jsonl").exists());
    }

    #[test]
    fn duplicate_id_is_rejected_and_not_written() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());

        store
            .insert_login(&sample_login("l1", "a@example.com", LoginStatus::Success, 1))
            .unwrap();
        let err = store
            .insert_login(&sample_login("l1", "b@example.com", LoginStatus::Failed, 2))
            .unwrap_err();

        assert!(matches!(err, AuditLogError::Persistence { .. }));
        let content = fs::read_to_string(tmp.path().join(LOGINS_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn orders_newest_first_with_stable_ties() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());

        for (id, ts) in [("a", 5), ("b", 9), ("c", 5), ("d", 1)] {
            store
                .insert_login(&sample_login(id, "x@example.com", LoginStatus::Success, ts))
                .unwrap();
        }

        let ids: Vec<_> = store
            .list_logins(&LoginFilter::default(), Page::default())
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn pages_cover_every_match_once() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());
        for i in 0..7 {
            let event = sample_login(&format!("l{i}"), "x@example.com", LoginStatus::Failed, i % 2);
            store.insert_login(&event).unwrap();
        }

        let first = store.list_logins(&LoginFilter::failed(), Page::new(0, 4)).unwrap();
        let second = store.list_logins(&LoginFilter::failed(), Page::new(4, 4)).unwrap();
        let third = store.list_logins(&LoginFilter::failed(), Page::new(8, 4)).unwrap();

        assert_eq!(first.len() + second.len(), 7);
        assert!(third.is_empty());
        assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
    }

    #[test]
    fn malformed_line_is_corrupt_record() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(LOGINS_FILE), "{not json}\n").unwrap();
        let store = JsonLinesStore::new(tmp.path());

        let err = store.count_logins(&LoginFilter::default()).unwrap_err();
        assert!(matches!(err, AuditLogError::CorruptRecord { .. }));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(tmp.path());
        store
            .insert_login(&sample_login("l1", "a@example.com", LoginStatus::Success, 1))
            .unwrap();

        let path = tmp.path().join(LOGINS_FILE);
        let padded = format!("\n{}\n\n", fs::read_to_string(&path).unwrap());
        fs::write(&path, padded).unwrap();

        assert_eq!(store.count_logins(&LoginFilter::default()).unwrap(), 1);
    }
}
