use super::models::{
    format_timestamp, Donation, DonationPatch, DonationRow, NewDonation, DATE_FORMAT,
};
use super::validators;
use crate::common::ApiError;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const SELECT_ALL: &str = r#"
    SELECT id, donor_name, donation_type, quantity, date, created_at, updated_at
    FROM donations
    ORDER BY created_at DESC, id DESC
"#;

const SELECT_BY_ID: &str = r#"
    SELECT id, donor_name, donation_type, quantity, date, created_at, updated_at
    FROM donations
    WHERE id = ?
"#;

/// Persistent donation collection.
///
/// Reads go straight to the pool. Create, update and delete are serialized
/// by `write_gate` and run in a transaction, so the fetch/merge/write of an
/// update can never interleave with another write.
#[derive(Debug)]
pub struct DonationStore {
    db: SqlitePool,
    write_gate: Mutex<()>,
}

impl DonationStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            write_gate: Mutex::new(()),
        }
    }

    // ============================================================================
    // Reads
    // ============================================================================

    /// All donations, newest first
    pub async fn list_all(&self) -> Result<Vec<Donation>, ApiError> {
        let rows = sqlx::query_as::<_, DonationRow>(SELECT_ALL)
            .fetch_all(&self.db)
            .await?;

        rows.into_iter().map(into_donation).collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Donation, ApiError> {
        let id = ensure_positive(id)?;
        find(&self.db, id).await?.ok_or_else(|| not_found(id))
    }

    /// Cheap round trip used by the health check
    pub async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    // ============================================================================
    // Writes
    // ============================================================================

    pub async fn create(&self, record: NewDonation) -> Result<Donation, ApiError> {
        let record = enforce_constraints(record)?;

        let _gate = self.write_gate.lock().await;
        let now = format_timestamp(&Utc::now());

        let mut tx = self.db.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO donations (donor_name, donation_type, quantity, date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.donor_name)
        .bind(record.donation_type.as_str())
        .bind(record.quantity)
        .bind(record.date.format(DATE_FORMAT).to_string())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let donation = find(&mut *tx, id).await?.ok_or_else(|| {
            error!(donation_id = id, "Inserted donation could not be read back");
            ApiError::StorageFault("Inserted donation could not be read back".to_string())
        })?;

        tx.commit().await?;

        info!(
            donation_id = donation.id,
            donation_type = %donation.donation_type,
            "Created donation"
        );

        Ok(donation)
    }

    /// Apply the supplied fields to an existing donation.
    ///
    /// Existence is resolved first: a missing id is `NotFound` even when the
    /// patch is empty. Either every supplied field is written together with a
    /// fresh `updated_at`, or nothing is.
    pub async fn update(&self, id: i64, patch: DonationPatch) -> Result<Donation, ApiError> {
        let id = ensure_positive(id)?;

        let _gate = self.write_gate.lock().await;
        let mut tx = self.db.begin().await?;

        let current = match find(&mut *tx, id).await? {
            Some(current) => current,
            None => {
                warn!(donation_id = id, "Update requested for missing donation");
                return Err(not_found(id));
            }
        };

        if patch.is_empty() {
            return Err(ApiError::InvalidArgument("no fields provided".to_string()));
        }

        let merged = enforce_constraints(patch.merge_onto(&current))?;
        let updated_at = next_update_time(current.updated_at);

        sqlx::query(
            r#"
            UPDATE donations
            SET donor_name = ?, donation_type = ?, quantity = ?, date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&merged.donor_name)
        .bind(merged.donation_type.as_str())
        .bind(merged.quantity)
        .bind(merged.date.format(DATE_FORMAT).to_string())
        .bind(format_timestamp(&updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let donation = find(&mut *tx, id).await?.ok_or_else(|| not_found(id))?;

        tx.commit().await?;

        info!(donation_id = id, "Updated donation");

        Ok(donation)
    }

    /// Hard delete. `Ok(false)` means there was nothing to delete.
    pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        let id = ensure_positive(id)?;

        let _gate = self.write_gate.lock().await;

        let result = sqlx::query("DELETE FROM donations WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(donation_id = id, "Deleted donation");
        } else {
            warn!(donation_id = id, "Delete requested for missing donation");
        }

        Ok(deleted)
    }

    /// Wait for the in-flight write to finish, then release the pool.
    ///
    /// Every call after this fails with `StorageFault`.
    pub async fn close(&self) {
        let _gate = self.write_gate.lock().await;
        self.db.close().await;
        info!("Donation store closed");
    }
}

/// Parse an identifier taken from a path or other untyped source
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidArgument(format!("Invalid donation id '{}'", raw)))?;
    ensure_positive(id)
}

fn ensure_positive(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::InvalidArgument(format!(
            "Donation id must be a positive integer, got {}",
            id
        )));
    }
    Ok(id)
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Donation {} not found", id))
}

async fn find<'e, E>(executor: E, id: i64) -> Result<Option<Donation>, ApiError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, DonationRow>(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(into_donation)
        .transpose()
}

fn into_donation(row: DonationRow) -> Result<Donation, ApiError> {
    let id = row.id;
    Donation::try_from(row).map_err(|reason| {
        error!(donation_id = id, %reason, "Stored donation row is corrupt");
        ApiError::StorageFault(format!("Donation {} is unreadable", id))
    })
}

/// Store-side copy of the field rules, applied whoever the caller is
fn enforce_constraints(mut record: NewDonation) -> Result<NewDonation, ApiError> {
    record.donor_name = record.donor_name.trim().to_string();

    let result = validators::check_record(&record);
    if !result.is_valid {
        let violations = result.into_messages();
        error!(?violations, "Store rejected a donation that bypassed validation");
        return Err(ApiError::ConstraintViolation(violations.join(", ")));
    }

    Ok(record)
}

/// Strictly later than `previous` at the microsecond precision we persist
fn next_update_time(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    now.max(previous + Duration::microseconds(1))
}
