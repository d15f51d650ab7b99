use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use crate::models::measurement::{CreateMeasurementRecord, MeasurementRecord};

/// Repository trait for BMI measurements
#[async_trait]
pub trait MeasurementRepositoryTrait {
    /// Create a new measurement from a request
    async fn create(
        &self,
        request: CreateMeasurementRecord,
    ) -> Result<MeasurementRecord, RepositoryError>;

    /// Get the latest measurement for a user
    async fn get_latest(&self, user_id: &str)
        -> Result<Option<MeasurementRecord>, RepositoryError>;

    /// Get a user's measurement by ID
    async fn get_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<MeasurementRecord>, RepositoryError>;

    /// Get filtered measurements for a user
    async fn get_filtered(
        &self,
        user_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<MeasurementRecord>, usize), RepositoryError>;
}

/// Repository for BMI measurements backed by in-memory storage.
///
/// The application deliberately has no database: the store stands in for a
/// backend the same way the original system kept its history in memory.
#[derive(Debug, Clone, Default)]
pub struct MeasurementRepository {
    storage: InMemoryStorage,
}

impl MeasurementRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
        }
    }
}

#[async_trait]
impl MeasurementRepositoryTrait for MeasurementRepository {
    /// Create a new measurement from a request
    async fn create(
        &self,
        request: CreateMeasurementRecord,
    ) -> Result<MeasurementRecord, RepositoryError> {
        // Generate a unique ID
        let id = Uuid::new_v4();

        let record = MeasurementRecord {
            id: id.to_string(),
            user_id: request.user_id,
            weight_kg: request.weight_kg,
            height_m: request.height_m,
            bmi: request.bmi,
            classification: request.classification,
            created_at: request.created_at,
        };

        debug!("Storing measurement {} for user {}", record.id, record.user_id);
        self.storage.store_record(&record).await
    }

    /// Get the latest measurement for a user
    async fn get_latest(
        &self,
        user_id: &str,
    ) -> Result<Option<MeasurementRecord>, RepositoryError> {
        self.storage.get_latest(user_id).await
    }

    /// Get a user's measurement by ID
    async fn get_by_id(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<MeasurementRecord>, RepositoryError> {
        self.storage.get_by_id(user_id, &id.to_string()).await
    }

    /// Get filtered measurements for a user
    async fn get_filtered(
        &self,
        user_id: &str,
        start_date: Option<String>,
        end_date: Option<String>,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<MeasurementRecord>, usize), RepositoryError> {
        self.storage
            .get_filtered(
                user_id,
                start_date.as_deref(),
                end_date.as_deref(),
                limit,
                offset,
                sort_desc,
            )
            .await
    }
}

/// Mock measurement repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Mock implementation of MeasurementRepository for testing
    pub struct MockMeasurementRepository {
        records: Vec<MeasurementRecord>,
    }

    impl Default for MockMeasurementRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockMeasurementRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self {
                records: Vec::new(),
            }
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<MeasurementRecord>) -> Self {
            Self { records }
        }
    }

    #[async_trait]
    impl MeasurementRepositoryTrait for MockMeasurementRepository {
        async fn create(
            &self,
            request: CreateMeasurementRecord,
        ) -> Result<MeasurementRecord, RepositoryError> {
            Ok(MeasurementRecord {
                id: Uuid::new_v4().to_string(),
                user_id: request.user_id,
                weight_kg: request.weight_kg,
                height_m: request.height_m,
                bmi: request.bmi,
                classification: request.classification,
                created_at: request.created_at,
            })
        }

        async fn get_latest(
            &self,
            user_id: &str,
        ) -> Result<Option<MeasurementRecord>, RepositoryError> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.user_id == user_id)
                .max_by(|a, b| a.created_at.cmp(&b.created_at))
                .cloned())
        }

        async fn get_by_id(
            &self,
            user_id: &str,
            id: Uuid,
        ) -> Result<Option<MeasurementRecord>, RepositoryError> {
            Ok(self
                .records
                .iter()
                .find(|r| r.user_id == user_id && r.id == id.to_string())
                .cloned())
        }

        async fn get_filtered(
            &self,
            user_id: &str,
            start_date: Option<String>,
            end_date: Option<String>,
            limit: Option<usize>,
            offset: Option<usize>,
            sort_desc: Option<bool>,
        ) -> Result<(Vec<MeasurementRecord>, usize), RepositoryError> {
            let offset = offset.unwrap_or(0);
            let limit = limit.unwrap_or(usize::MAX);
            let sort_desc = sort_desc.unwrap_or(true);

            let mut filtered: Vec<MeasurementRecord> = self
                .records
                .iter()
                .filter(|record| {
                    if record.user_id != user_id {
                        return false;
                    }

                    if let Some(start) = &start_date {
                        if record.created_at < *start {
                            return false;
                        }
                    }

                    if let Some(end) = &end_date {
                        if record.created_at > *end {
                            return false;
                        }
                    }

                    true
                })
                .cloned()
                .collect();

            filtered.sort_by(|a, b| {
                let cmp = a.created_at.cmp(&b.created_at);
                if sort_desc {
                    cmp.reverse()
                } else {
                    cmp
                }
            });

            let total = filtered.len();

            let paged = filtered.into_iter().skip(offset).take(limit).collect();

            Ok((paged, total))
        }
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request(user_id: &str, weight_kg: f64, created_at: String) -> CreateMeasurementRecord {
        CreateMeasurementRecord {
            user_id: user_id.to_string(),
            weight_kg,
            height_m: 1.75,
            bmi: weight_kg / (1.75 * 1.75),
            classification: "Normal".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_by_id() {
        let repo = MeasurementRepository::new();
        let created = repo
            .create(request("user-1", 70.0, Utc::now().to_rfc3339()))
            .await
            .unwrap();

        let id = Uuid::parse_str(&created.id).unwrap();
        let fetched = repo.get_by_id("user-1", id).await.unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().weight_kg, 70.0);

        // A different user must not see the record
        let other = repo.get_by_id("user-2", id).await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_histories_are_isolated_per_user() {
        let repo = MeasurementRepository::new();
        let now = Utc::now();

        repo.create(request("user-1", 70.0, now.to_rfc3339()))
            .await
            .unwrap();
        repo.create(request("user-1", 71.0, (now + Duration::minutes(1)).to_rfc3339()))
            .await
            .unwrap();
        repo.create(request("user-2", 90.0, now.to_rfc3339()))
            .await
            .unwrap();

        let (_, user1_total) = repo
            .get_filtered("user-1", None, None, None, None, None)
            .await
            .unwrap();
        assert_eq!(user1_total, 2);

        let (_, user2_total) = repo
            .get_filtered("user-2", None, None, None, None, None)
            .await
            .unwrap();
        assert_eq!(user2_total, 1);

        let (user3_page, user3_total) = repo
            .get_filtered("user-3", None, None, None, None, None)
            .await
            .unwrap();
        assert_eq!(user3_total, 0);
        assert!(user3_page.is_empty());

        let latest = repo.get_latest("user-1").await.unwrap().unwrap();
        assert_eq!(latest.weight_kg, 71.0);
    }

    #[tokio::test]
    async fn test_get_filtered_pagination_and_sort() {
        let repo = MeasurementRepository::new();
        let now = Utc::now();

        for i in 0..5 {
            repo.create(request(
                "user-1",
                70.0 + i as f64,
                (now + Duration::minutes(i)).to_rfc3339(),
            ))
            .await
            .unwrap();
        }

        // Newest first by default
        let (page, total) = repo
            .get_filtered("user-1", None, None, Some(2), Some(0), None)
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].weight_kg, 74.0);

        // Ascending with offset
        let (page, _) = repo
            .get_filtered("user-1", None, None, Some(2), Some(1), Some(false))
            .await
            .unwrap();
        assert_eq!(page[0].weight_kg, 71.0);

        // Date range excludes the oldest records
        let start = (now + Duration::minutes(3)).to_rfc3339();
        let (page, total) = repo
            .get_filtered("user-1", Some(start), None, None, None, Some(false))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(page[0].weight_kg, 73.0);
    }
}
