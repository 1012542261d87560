//! Batch intake service.
//!
//! New mass obligations arrive as batches: a bulk or donor batch becomes
//! gap-filler material for the rebuild, a Gregorian batch additionally opens
//! the 30-day series the series pass will advance.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::db::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::models::{BatchId, BatchKind, GregorianSeriesId, NewBatch, NewGregorianSeries, UserId};

/// Ids assigned while registering one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchIntake {
    pub batch_id: BatchId,
    /// Present only for Gregorian batches, which carry a series row.
    pub series_id: Option<GregorianSeriesId>,
}

fn validate_batch(batch: &NewBatch) -> RepositoryResult<()> {
    if batch.code.trim().is_empty() {
        return Err(RepositoryError::validation("Batch code must not be empty"));
    }
    if batch.total_count == 0 {
        return Err(RepositoryError::validation(
            "Batch must carry at least one mass",
        ));
    }
    if batch.start_index.checked_add(batch.total_count).is_none() {
        return Err(RepositoryError::validation(
            "Batch serial numbers would run past the supported range",
        ));
    }
    if batch.kind == BatchKind::Gregorian && batch.donor_name.trim().is_empty() {
        return Err(RepositoryError::validation(
            "Gregorian batches need a donor name",
        ));
    }
    Ok(())
}

/// Store one incoming batch and, for Gregorian batches, its series row.
///
/// The series starts out PENDING with nothing completed; its start date is
/// the batch's receipt date, so the next rebuild begins the run there.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `batch` - Batch payload to store
///
/// # Returns
/// * `Ok(BatchIntake)` - Assigned ids
/// * `Err(RepositoryError::ValidationError)` - On an empty code, a zero
///   count, a serial range past `u32::MAX` or a missing donor name
pub async fn register_batch<R: FullRepository>(
    repo: &R,
    batch: &NewBatch,
) -> RepositoryResult<BatchIntake> {
    validate_batch(batch)?;
    info!(
        "Registering {:?} batch '{}' with {} masses",
        batch.kind, batch.code, batch.total_count
    );

    let batch_id = repo.insert_batch(batch).await?;
    let series_id = if batch.kind == BatchKind::Gregorian {
        let series = NewGregorianSeries {
            user_id: batch.user_id,
            donor_name: batch.donor_name.clone(),
            batch_id,
            start_date: Some(batch.date_received),
        };
        Some(repo.insert_gregorian_series(&series).await?)
    } else {
        None
    };

    Ok(BatchIntake {
        batch_id,
        series_id,
    })
}

#[derive(Deserialize)]
struct BatchInput {
    user_id: i64,
    code: String,
    kind: BatchKind,
    total_count: u32,
    #[serde(default = "default_start_index")]
    start_index: u32,
    date_received: NaiveDate,
    #[serde(default)]
    donor_name: String,
}

fn default_start_index() -> u32 {
    1
}

/// Parse a batch intake payload from its JSON form.
///
/// # Arguments
/// * `payload` - JSON object with `user_id`, `code`, `kind`, `total_count`,
///   `date_received` and the optional `start_index` / `donor_name`
pub fn parse_batch_json(payload: &str) -> Result<NewBatch> {
    let input: BatchInput = serde_json::from_str(payload).context("Invalid batch JSON")?;
    Ok(NewBatch {
        user_id: UserId(input.user_id),
        code: input.code,
        kind: input.kind,
        total_count: input.total_count,
        start_index: input.start_index,
        date_received: input.date_received,
        donor_name: input.donor_name,
    })
}

/// Split a legacy fixed-intention label of the form `<month>-<category>`
/// into its explicit month and bare category.
///
/// Older records carried their target month only as a numeric prefix on the
/// category label; current records store the month as its own field, so the
/// prefix is stripped during migration.
pub fn parse_legacy_fixed_label(label: &str) -> Result<(u32, String)> {
    let (prefix, rest) = label
        .split_once('-')
        .context("Legacy label has no month prefix")?;
    let month: u32 = prefix
        .trim()
        .parse()
        .context("Legacy label month prefix is not a number")?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Legacy label month {} is out of range", month);
    }
    let category = rest.trim();
    if category.is_empty() {
        anyhow::bail!("Legacy label has an empty category");
    }
    Ok((month, category.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::db::repository::SeriesRepository;
    use crate::models::SeriesStatus;

    fn bulk_batch() -> NewBatch {
        NewBatch {
            user_id: UserId(1),
            code: "B-2026-01".to_string(),
            kind: BatchKind::Bulk,
            total_count: 40,
            start_index: 1,
            date_received: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            donor_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_bulk_batch_is_stored_without_a_series() {
        let repo = LocalRepository::new();
        let intake = register_batch(&repo, &bulk_batch()).await.unwrap();

        assert!(intake.series_id.is_none());
        let stored = repo.batch(intake.batch_id).unwrap();
        assert_eq!(stored.code, "B-2026-01");
        assert_eq!(stored.scheduled_count, 0);
    }

    #[tokio::test]
    async fn test_gregorian_batch_opens_a_pending_series() {
        let repo = LocalRepository::new();
        let batch = NewBatch {
            code: "G-2026-03".to_string(),
            kind: BatchKind::Gregorian,
            total_count: 30,
            donor_name: "Anna Kowalska".to_string(),
            ..bulk_batch()
        };

        let intake = register_batch(&repo, &batch).await.unwrap();

        let series_id = intake.series_id.unwrap();
        let series = repo.series(series_id).unwrap();
        assert_eq!(series.batch_id, intake.batch_id);
        assert_eq!(series.donor_name, "Anna Kowalska");
        assert_eq!(series.status, SeriesStatus::Pending);
        assert_eq!(series.completed, 0);
        assert_eq!(series.start_date, Some(batch.date_received));

        let open = repo.fetch_open_series(UserId(1)).await.unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_batches_are_refused() {
        let repo = LocalRepository::new();

        let empty_code = NewBatch {
            code: "  ".to_string(),
            ..bulk_batch()
        };
        let result = register_batch(&repo, &empty_code).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ValidationError { .. })
        ));

        let zero_count = NewBatch {
            total_count: 0,
            ..bulk_batch()
        };
        let result = register_batch(&repo, &zero_count).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ValidationError { .. })
        ));

        let anonymous_gregorian = NewBatch {
            kind: BatchKind::Gregorian,
            ..bulk_batch()
        };
        let result = register_batch(&repo, &anonymous_gregorian).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ValidationError { .. })
        ));

        let serial_overflow = NewBatch {
            total_count: 2,
            start_index: u32::MAX,
            ..bulk_batch()
        };
        let result = register_batch(&repo, &serial_overflow).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ValidationError { .. })
        ));

        // The bound is exact: a range ending at the cap still registers.
        let at_the_cap = NewBatch {
            code: "B-CAP".to_string(),
            start_index: u32::MAX - 40,
            ..bulk_batch()
        };
        assert!(register_batch(&repo, &at_the_cap).await.is_ok());
    }

    #[test]
    fn test_batch_json_round_trips_with_defaults() {
        let payload = r#"{
            "user_id": 1,
            "code": "B-2026-02",
            "kind": "DONOR",
            "total_count": 12,
            "date_received": "2026-02-01"
        }"#;

        let batch = parse_batch_json(payload).unwrap();
        assert_eq!(batch.kind, BatchKind::Donor);
        assert_eq!(batch.start_index, 1);
        assert_eq!(batch.donor_name, "");

        assert!(parse_batch_json("{\"code\": 3}").is_err());
    }

    #[test]
    fn test_legacy_labels_split_into_month_and_category() {
        assert_eq!(
            parse_legacy_fixed_label("5-anniversary").unwrap(),
            (5, "anniversary".to_string())
        );
        assert_eq!(
            parse_legacy_fixed_label("12 - memorial").unwrap(),
            (12, "memorial".to_string())
        );

        assert!(parse_legacy_fixed_label("anniversary").is_err());
        assert!(parse_legacy_fixed_label("13-memorial").is_err());
        assert!(parse_legacy_fixed_label("5-").is_err());
    }
}
