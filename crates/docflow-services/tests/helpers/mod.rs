#![allow(dead_code)]

use docflow_core::models::{File, FileStatus};
use docflow_db::traits::{AgentRepository, FileRepository};
use docflow_db::{
    InMemoryAgentRepository, InMemoryAssignmentLogRepository, InMemoryFileRepository,
    InMemoryPaymentRepository,
};
use docflow_services::{AssignmentService, Cache, FileLifecycleService, PaymentService};
use docflow_storage::{generate_storage_key, LocalStorage, ObjectStorage};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const GATEWAY_SECRET: &str = "test-gateway-secret";

/// Full service wiring over in-memory repositories and a tempdir-backed
/// local object store.
pub struct TestEnv {
    pub files: Arc<InMemoryFileRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub agents: Arc<InMemoryAgentRepository>,
    pub assignment_log: Arc<InMemoryAssignmentLogRepository>,
    pub storage: Arc<dyn ObjectStorage>,
    pub cache: Arc<Cache>,
    pub lifecycle: FileLifecycleService,
    pub payment: PaymentService,
    _dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn ObjectStorage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
                .await
                .unwrap(),
        );

        let files = Arc::new(InMemoryFileRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let agents = Arc::new(InMemoryAgentRepository::new());
        let assignment_log = Arc::new(InMemoryAssignmentLogRepository::new());
        let cache = Arc::new(Cache::new());

        let assignment = Arc::new(AssignmentService::new(
            files.clone(),
            agents.clone(),
            assignment_log.clone(),
        ));
        let lifecycle = FileLifecycleService::new(files.clone(), storage.clone(), cache.clone());
        let payment = PaymentService::new(
            payments.clone(),
            files.clone(),
            assignment,
            cache.clone(),
            GATEWAY_SECRET.to_string(),
        );

        Self {
            files,
            payments,
            agents,
            assignment_log,
            storage,
            cache,
            lifecycle,
            payment,
            _dir: dir,
        }
    }

    /// Seed a file record in `status` with real bytes behind its storage key.
    pub async fn seed_file(&self, user_id: Uuid, status: FileStatus) -> File {
        let data = b"sample document bytes".to_vec();
        let key = generate_storage_key("sample.pdf");
        let stored = self
            .storage
            .upload(&key, "application/pdf", data.clone())
            .await
            .unwrap();

        let mut file = File::new_pending_upload(
            user_id,
            "sample.pdf".to_string(),
            data.len() as i64,
            "application/pdf".to_string(),
            key,
            stored.url,
            None,
        );
        file.status = status;
        self.files.insert(&file).await.unwrap();
        file
    }

    pub async fn seed_agent(&self, active: bool) -> Uuid {
        let agent = docflow_core::models::Agent {
            id: Uuid::new_v4(),
            display_name: "Test Agent".to_string(),
            is_agent: true,
            active,
        };
        self.agents.insert(&agent).await.unwrap();
        agent.id
    }
}
