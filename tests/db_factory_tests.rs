//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use mis_rust::db::factory::{RepositoryFactory, RepositoryType};
use mis_rust::db::repository::FullRepository;
use mis_rust::models::UserId;

#[test]
fn test_repository_type_from_str_local() {
    let rt = RepositoryType::from_str("local").unwrap();
    assert_eq!(rt, RepositoryType::Local);

    let rt = RepositoryType::from_str("LOCAL").unwrap();
    assert_eq!(rt, RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("postgres");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_env_var("MIS_REPOSITORY_TYPE", None, || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_explicit() {
    support::with_env_var("MIS_REPOSITORY_TYPE", Some("local"), || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_unknown_falls_back() {
    support::with_env_var("MIS_REPOSITORY_TYPE", Some("oracle"), || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_factory_creates_working_repository() {
    let repo: Arc<dyn FullRepository> =
        RepositoryFactory::create(RepositoryType::Local).unwrap();
    assert!(repo.health_check().await.unwrap());

    let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
    let masses = repo
        .fetch_masses_in_range(UserId(1), start, end)
        .await
        .unwrap();
    assert!(masses.is_empty());
}

#[tokio::test]
async fn test_factory_from_env() {
    let repo = support::with_env_var("MIS_REPOSITORY_TYPE", Some("local"), || {
        RepositoryFactory::from_env().unwrap()
    });
    assert!(repo.health_check().await.unwrap());
}
