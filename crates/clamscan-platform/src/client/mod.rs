// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The platform client: a generic read/write/watch abstraction over the
//! declarative resources and the scanner workload. The orchestration
//! platform itself is an out-of-scope external collaborator; this trait is
//! the seam a concrete backend plugs into.

mod http;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use http::HttpPlatformClient;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePlatformClient, PlatformCall};

use async_trait::async_trait;
use clamscan_core::{
    ClusterScan, ClusterScanSpec, ClusterScanStatus, NodeScan, NodeScanSpec, NodeScanStatus,
    OperatorEvent, ResourceEnvelope, ScanCacheSpec, ScanCacheStatus, ScanPolicy, ScanPolicyStatus,
    ScanSchedule, ScanScheduleStatus,
};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("version conflict on {0}")]
    Conflict(String),
    #[error("transient: {0}")]
    Transient(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl PlatformError {
    /// Transient errors (conflicts, timeouts, throttling) warrant a requeue
    /// with backoff rather than a status mutation (spec §7 taxonomy).
    pub fn is_transient(&self) -> bool {
        matches!(self, PlatformError::Conflict(_) | PlatformError::Transient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl Default for WorkloadPhase {
    fn default() -> Self {
        WorkloadPhase::Pending
    }
}

/// A read of the batch workload backing a NodeScan: its current phase plus
/// the stdout lines produced so far (spec §4.1 "Log parsing").
#[derive(Debug, Clone)]
pub struct WorkloadObservation {
    pub phase: WorkloadPhase,
    pub log_lines: Vec<String>,
}

/// Generic read/write/watch abstraction over the five declarative resource
/// kinds plus the scanner workload, nodes, and platform events. A concrete
/// implementation talks to the orchestration platform's API; reconcilers and
/// the executor only ever see this trait.
#[async_trait]
pub trait PlatformClient: Clone + Send + Sync + 'static {
    async fn node_exists(&self, name: &str) -> Result<bool, PlatformError>;

    /// List node names, optionally filtered to those carrying every label in
    /// `selector`. `None` lists every node visible to the control plane.
    async fn list_nodes(
        &self,
        selector: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<String>, PlatformError>;

    async fn get_node_scan(&self, name: &str) -> Result<Option<NodeScan>, PlatformError>;

    /// List every NodeScan visible to the control plane, regardless of
    /// ownership. The reconcile loop drives every NodeScan through this
    /// listing, whether it was created directly or fanned out by a
    /// ClusterScan.
    async fn list_node_scans(&self) -> Result<Vec<NodeScan>, PlatformError>;
    async fn list_node_scans_by_label(
        &self,
        label: &str,
        value: &str,
    ) -> Result<Vec<NodeScan>, PlatformError>;
    async fn create_node_scan(
        &self,
        name: &str,
        spec: NodeScanSpec,
        labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError>;
    async fn update_node_scan_status(
        &self,
        name: &str,
        status: NodeScanStatus,
    ) -> Result<(), PlatformError>;
    async fn delete_node_scan(&self, name: &str) -> Result<(), PlatformError>;

    async fn get_cluster_scan(&self, name: &str) -> Result<Option<ClusterScan>, PlatformError>;
    async fn list_cluster_scans(&self) -> Result<Vec<ClusterScan>, PlatformError>;
    async fn create_cluster_scan(
        &self,
        name: &str,
        spec: ClusterScanSpec,
        labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError>;
    async fn update_cluster_scan_status(
        &self,
        name: &str,
        status: ClusterScanStatus,
    ) -> Result<(), PlatformError>;
    async fn delete_cluster_scan(&self, name: &str) -> Result<(), PlatformError>;

    async fn get_scan_policy(&self, name: &str) -> Result<Option<ScanPolicy>, PlatformError>;
    async fn update_scan_policy_status(
        &self,
        name: &str,
        status: ScanPolicyStatus,
    ) -> Result<(), PlatformError>;

    async fn get_scan_schedule(&self, name: &str) -> Result<Option<ScanSchedule>, PlatformError>;
    async fn list_scan_schedules(&self) -> Result<Vec<ScanSchedule>, PlatformError>;
    async fn update_scan_schedule_status(
        &self,
        name: &str,
        status: ScanScheduleStatus,
    ) -> Result<(), PlatformError>;

    async fn get_scan_cache_by_node(
        &self,
        node_name: &str,
    ) -> Result<Option<(ScanCacheSpec, ScanCacheStatus)>, PlatformError>;
    async fn write_scan_cache(
        &self,
        name: &str,
        spec: ScanCacheSpec,
        status: ScanCacheStatus,
    ) -> Result<(), PlatformError>;
    async fn write_cache_blob(
        &self,
        name: &str,
        data: HashMap<String, String>,
    ) -> Result<(), PlatformError>;

    /// Create the batch workload backing a NodeScan (spec §4.1 "Workload
    /// construction"). `env` are the computed environment variables (§6);
    /// `owner_node_scan` becomes the owner reference the platform uses for
    /// cascading deletion.
    async fn create_workload(
        &self,
        name: &str,
        owner_node_scan: &str,
        node_name: &str,
        env: Vec<(String, String)>,
        resources: ResourceEnvelope,
        retry_budget: u32,
    ) -> Result<(), PlatformError>;
    async fn get_workload(&self, name: &str) -> Result<Option<WorkloadObservation>, PlatformError>;
    async fn delete_workload(&self, name: &str) -> Result<(), PlatformError>;

    async fn emit_event(&self, event: OperatorEvent) -> Result<(), PlatformError>;

    async fn service_account_exists(&self, name: &str) -> Result<bool, PlatformError>;
    async fn self_subject_access_review(
        &self,
        verb: &str,
        resource: &str,
    ) -> Result<bool, PlatformError>;
    async fn api_server_reachable(&self) -> Result<bool, PlatformError>;
    async fn virus_scanner_service_ready(&self) -> Result<bool, PlatformError>;
}
