//! SQLite scan ledger persistence.
//!
//! Findings, summary, and permissions are stored as JSON text columns.
//! Ordering is `scanned_at DESC` with `rowid DESC` breaking ties, so two scans
//! stamped in the same microsecond still come back newest-inserted first.

use serde_json::Value;
use sqlx::Row;
use squid_core::scan::repository::ScanRepository;
use squid_types::error::RepositoryError;
use squid_types::scan::{ScanRecord, TriggerType};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

const SCAN_COLUMNS: &str = "id, trigger_type, version, result, risk_score, trust_score, \
     findings, summary, permissions, scanner_version, patterns_checked, categories_checked, \
     files_scanned, total_bytes, scan_duration_ms, scanned_at";

/// SQLite-backed implementation of `ScanRepository`.
#[derive(Clone)]
pub struct SqliteScanRepository {
    pool: DatabasePool,
}

impl SqliteScanRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ScanRow {
    id: String,
    trigger_type: String,
    version: String,
    result: String,
    risk_score: i64,
    trust_score: i64,
    findings: String,
    summary: String,
    permissions: String,
    scanner_version: String,
    patterns_checked: i64,
    categories_checked: i64,
    files_scanned: i64,
    total_bytes: i64,
    scan_duration_ms: i64,
    scanned_at: String,
}

impl ScanRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            trigger_type: row.try_get("trigger_type")?,
            version: row.try_get("version")?,
            result: row.try_get("result")?,
            risk_score: row.try_get("risk_score")?,
            trust_score: row.try_get("trust_score")?,
            findings: row.try_get("findings")?,
            summary: row.try_get("summary")?,
            permissions: row.try_get("permissions")?,
            scanner_version: row.try_get("scanner_version")?,
            patterns_checked: row.try_get("patterns_checked")?,
            categories_checked: row.try_get("categories_checked")?,
            files_scanned: row.try_get("files_scanned")?,
            total_bytes: row.try_get("total_bytes")?,
            scan_duration_ms: row.try_get("scan_duration_ms")?,
            scanned_at: row.try_get("scanned_at")?,
        })
    }

    fn into_record(self) -> Result<ScanRecord, RepositoryError> {
        let trigger_type = self
            .trigger_type
            .parse::<TriggerType>()
            .map_err(RepositoryError::Query)?;

        Ok(ScanRecord {
            id: self.id,
            trigger_type,
            version: self.version,
            result: self.result,
            risk_score: self.risk_score,
            trust_score: self.trust_score,
            findings: json_list(&self.findings)?,
            summary: json_column(&self.summary)?,
            permissions: json_list(&self.permissions)?,
            scanner_version: self.scanner_version,
            patterns_checked: non_negative(self.patterns_checked),
            categories_checked: non_negative(self.categories_checked),
            files_scanned: non_negative(self.files_scanned),
            total_bytes: non_negative(self.total_bytes),
            scan_duration_ms: non_negative(self.scan_duration_ms),
            scanned_at: parse_datetime(&self.scanned_at)?,
        })
    }
}

fn json_column(raw: &str) -> Result<Value, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn json_list(raw: &str) -> Result<Vec<Value>, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn non_negative(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn as_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// ScanRepository implementation
// ---------------------------------------------------------------------------

impl ScanRepository for SqliteScanRepository {
    async fn insert(&self, scan: &ScanRecord) -> Result<(), RepositoryError> {
        let findings = to_json(&scan.findings)?;
        let summary = to_json(&scan.summary)?;
        let permissions = to_json(&scan.permissions)?;

        sqlx::query(
            r#"INSERT INTO scans (id, trigger_type, version, result, risk_score, trust_score,
                   findings, summary, permissions, scanner_version, patterns_checked,
                   categories_checked, files_scanned, total_bytes, scan_duration_ms, scanned_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&scan.id)
        .bind(scan.trigger_type.as_str())
        .bind(&scan.version)
        .bind(&scan.result)
        .bind(scan.risk_score)
        .bind(scan.trust_score)
        .bind(&findings)
        .bind(&summary)
        .bind(&permissions)
        .bind(&scan.scanner_version)
        .bind(as_sql_int(scan.patterns_checked))
        .bind(as_sql_int(scan.categories_checked))
        .bind(as_sql_int(scan.files_scanned))
        .bind(as_sql_int(scan.total_bytes))
        .bind(as_sql_int(scan.scan_duration_ms))
        .bind(format_datetime(&scan.scanned_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::InvalidInput(format!("scan '{}' already recorded", scan.id))
            }
            _ => query_err(e),
        })?;

        Ok(())
    }

    async fn latest(&self) -> Result<Option<ScanRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS} FROM scans ORDER BY scanned_at DESC, rowid DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(ref r) => Ok(Some(ScanRow::from_row(r).map_err(query_err)?.into_record()?)),
            None => Ok(None),
        }
    }

    async fn history(&self, limit: u32) -> Result<Vec<ScanRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS} FROM scans ORDER BY scanned_at DESC, rowid DESC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| ScanRow::from_row(row).map_err(query_err)?.into_record())
            .collect()
    }

    async fn count_by_trigger(&self, trigger: TriggerType) -> Result<u32, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scans WHERE trigger_type = ?")
                .bind(trigger.as_str())
                .fetch_one(&self.pool.reader)
                .await
                .map_err(query_err)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
