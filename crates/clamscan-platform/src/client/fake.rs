// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake of the platform client, for reconciler and end-to-end tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{PlatformClient, PlatformError, WorkloadObservation, WorkloadPhase};
use async_trait::async_trait;
use clamscan_core::{
    ClusterScan, ClusterScanSpec, ClusterScanStatus, NodeScan, NodeScanSpec, NodeScanStatus,
    OperatorEvent, ResourceEnvelope, ScanCacheSpec, ScanCacheStatus, ScanPolicy, ScanPolicyStatus,
    ScanSchedule, ScanScheduleStatus,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Recorded call, for assertions on what the reconcilers actually did.
#[derive(Debug, Clone)]
pub enum PlatformCall {
    CreateNodeScan { name: String },
    UpdateNodeScanStatus { name: String, phase: String },
    DeleteNodeScan { name: String },
    CreateClusterScan { name: String },
    UpdateClusterScanStatus { name: String, phase: String },
    DeleteClusterScan { name: String },
    UpdateScanPolicyStatus { name: String },
    UpdateScanScheduleStatus { name: String },
    WriteScanCache { name: String },
    WriteCacheBlob { name: String },
    CreateWorkload { name: String, node_name: String },
    DeleteWorkload { name: String },
    EmitEvent { reason: String },
}

struct FakeWorkload {
    owner_node_scan: String,
    node_name: String,
    phase: WorkloadPhase,
    log_lines: Vec<String>,
    resources: ResourceEnvelope,
}

#[derive(Default)]
struct FakeState {
    nodes: Vec<String>,
    node_scans: HashMap<String, NodeScan>,
    cluster_scans: HashMap<String, ClusterScan>,
    scan_policies: HashMap<String, ScanPolicy>,
    scan_schedules: HashMap<String, ScanSchedule>,
    scan_caches: HashMap<String, (ScanCacheSpec, ScanCacheStatus)>,
    cache_blobs: HashMap<String, HashMap<String, String>>,
    workloads: HashMap<String, FakeWorkload>,
    events: Vec<OperatorEvent>,
    calls: Vec<PlatformCall>,
    service_accounts: Vec<String>,
    access_reviews_allowed: bool,
    api_reachable: bool,
    virus_scanner_ready: bool,
}

/// In-memory `PlatformClient`. Every resource kind is a plain map; tests seed
/// it directly with [`FakePlatformClient::put_node`],
/// [`FakePlatformClient::put_node_scan`], etc. and observe effects via
/// [`FakePlatformClient::calls`].
#[derive(Clone)]
pub struct FakePlatformClient {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakePlatformClient {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                access_reviews_allowed: true,
                api_reachable: true,
                virus_scanner_ready: true,
                ..Default::default()
            })),
        }
    }
}

impl FakePlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_node(&self, name: impl Into<String>) {
        self.inner.lock().nodes.push(name.into());
    }

    pub fn put_node_scan(&self, node_scan: NodeScan) {
        self.inner.lock().node_scans.insert(node_scan.name.clone(), node_scan);
    }

    pub fn put_cluster_scan(&self, cluster_scan: ClusterScan) {
        self.inner.lock().cluster_scans.insert(cluster_scan.name.clone(), cluster_scan);
    }

    pub fn put_scan_policy(&self, policy: ScanPolicy) {
        self.inner.lock().scan_policies.insert(policy.name.clone(), policy);
    }

    pub fn put_scan_schedule(&self, schedule: ScanSchedule) {
        self.inner.lock().scan_schedules.insert(schedule.name.clone(), schedule);
    }

    pub fn put_scan_cache(&self, name: impl Into<String>, spec: ScanCacheSpec, status: ScanCacheStatus) {
        self.inner.lock().scan_caches.insert(name.into(), (spec, status));
    }

    /// Move a workload through its lifecycle from a test, as if the scanner
    /// process it wraps ran to completion.
    pub fn set_workload_phase(&self, name: &str, phase: WorkloadPhase) {
        if let Some(w) = self.inner.lock().workloads.get_mut(name) {
            w.phase = phase;
        }
    }

    pub fn append_workload_log(&self, name: &str, line: impl Into<String>) {
        if let Some(w) = self.inner.lock().workloads.get_mut(name) {
            w.log_lines.push(line.into());
        }
    }

    pub fn set_service_account(&self, name: impl Into<String>) {
        self.inner.lock().service_accounts.push(name.into());
    }

    pub fn set_access_reviews_allowed(&self, allowed: bool) {
        self.inner.lock().access_reviews_allowed = allowed;
    }

    pub fn set_api_reachable(&self, reachable: bool) {
        self.inner.lock().api_reachable = reachable;
    }

    pub fn set_virus_scanner_ready(&self, ready: bool) {
        self.inner.lock().virus_scanner_ready = ready;
    }

    pub fn node_scan(&self, name: &str) -> Option<NodeScan> {
        self.inner.lock().node_scans.get(name).cloned()
    }

    pub fn cluster_scan(&self, name: &str) -> Option<ClusterScan> {
        self.inner.lock().cluster_scans.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.inner.lock().calls.clone()
    }

    pub fn events(&self) -> Vec<OperatorEvent> {
        self.inner.lock().events.clone()
    }

    pub fn workload_exists(&self, name: &str) -> bool {
        self.inner.lock().workloads.contains_key(name)
    }
}

#[async_trait]
impl PlatformClient for FakePlatformClient {
    async fn node_exists(&self, name: &str) -> Result<bool, PlatformError> {
        Ok(self.inner.lock().nodes.iter().any(|n| n == name))
    }

    async fn list_nodes(
        &self,
        selector: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<String>, PlatformError> {
        // The fake has no label metadata for nodes; an empty/unset selector
        // lists everything, a non-empty one matches nothing (tests that need
        // selector semantics seed nodes directly and pass no selector).
        let state = self.inner.lock();
        if selector.map(|s| s.is_empty()).unwrap_or(true) {
            Ok(state.nodes.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn get_node_scan(&self, name: &str) -> Result<Option<NodeScan>, PlatformError> {
        Ok(self.inner.lock().node_scans.get(name).cloned())
    }

    async fn list_node_scans(&self) -> Result<Vec<NodeScan>, PlatformError> {
        Ok(self.inner.lock().node_scans.values().cloned().collect())
    }

    async fn list_node_scans_by_label(
        &self,
        label: &str,
        value: &str,
    ) -> Result<Vec<NodeScan>, PlatformError> {
        // Labels aren't modelled on the stored NodeScan itself; this fake
        // mirrors `clusterscan=<parent>` membership via name prefix, which is
        // how every test constructs child names.
        let state = self.inner.lock();
        if label == "clusterscan" {
            let prefix = format!("{value}-");
            Ok(state
                .node_scans
                .values()
                .filter(|ns| ns.name.starts_with(&prefix))
                .cloned()
                .collect())
        } else {
            Ok(Vec::new())
        }
    }

    async fn create_node_scan(
        &self,
        name: &str,
        spec: NodeScanSpec,
        _labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.node_scans.insert(
            name.to_string(),
            NodeScan { name: name.to_string(), spec, status: NodeScanStatus::default() },
        );
        state.calls.push(PlatformCall::CreateNodeScan { name: name.to_string() });
        Ok(())
    }

    async fn update_node_scan_status(
        &self,
        name: &str,
        status: NodeScanStatus,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        let phase = status.phase.to_string();
        match state.node_scans.get_mut(name) {
            Some(ns) => ns.status = status,
            None => return Err(PlatformError::NotFound(name.to_string())),
        }
        state.calls.push(PlatformCall::UpdateNodeScanStatus { name: name.to_string(), phase });
        Ok(())
    }

    async fn delete_node_scan(&self, name: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.node_scans.remove(name);
        state.calls.push(PlatformCall::DeleteNodeScan { name: name.to_string() });
        Ok(())
    }

    async fn get_cluster_scan(&self, name: &str) -> Result<Option<ClusterScan>, PlatformError> {
        Ok(self.inner.lock().cluster_scans.get(name).cloned())
    }

    async fn list_cluster_scans(&self) -> Result<Vec<ClusterScan>, PlatformError> {
        Ok(self.inner.lock().cluster_scans.values().cloned().collect())
    }

    async fn create_cluster_scan(
        &self,
        name: &str,
        spec: ClusterScanSpec,
        _labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.cluster_scans.insert(
            name.to_string(),
            ClusterScan { name: name.to_string(), spec, status: ClusterScanStatus::default() },
        );
        state.calls.push(PlatformCall::CreateClusterScan { name: name.to_string() });
        Ok(())
    }

    async fn update_cluster_scan_status(
        &self,
        name: &str,
        status: ClusterScanStatus,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        let phase = status.phase.to_string();
        match state.cluster_scans.get_mut(name) {
            Some(cs) => cs.status = status,
            None => return Err(PlatformError::NotFound(name.to_string())),
        }
        state.calls.push(PlatformCall::UpdateClusterScanStatus { name: name.to_string(), phase });
        Ok(())
    }

    async fn delete_cluster_scan(&self, name: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.cluster_scans.remove(name);
        state.calls.push(PlatformCall::DeleteClusterScan { name: name.to_string() });
        Ok(())
    }

    async fn get_scan_policy(&self, name: &str) -> Result<Option<ScanPolicy>, PlatformError> {
        Ok(self.inner.lock().scan_policies.get(name).cloned())
    }

    async fn update_scan_policy_status(
        &self,
        name: &str,
        status: ScanPolicyStatus,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        match state.scan_policies.get_mut(name) {
            Some(p) => p.status = status,
            None => return Err(PlatformError::NotFound(name.to_string())),
        }
        state.calls.push(PlatformCall::UpdateScanPolicyStatus { name: name.to_string() });
        Ok(())
    }

    async fn get_scan_schedule(&self, name: &str) -> Result<Option<ScanSchedule>, PlatformError> {
        Ok(self.inner.lock().scan_schedules.get(name).cloned())
    }

    async fn list_scan_schedules(&self) -> Result<Vec<ScanSchedule>, PlatformError> {
        Ok(self.inner.lock().scan_schedules.values().cloned().collect())
    }

    async fn update_scan_schedule_status(
        &self,
        name: &str,
        status: ScanScheduleStatus,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        match state.scan_schedules.get_mut(name) {
            Some(s) => s.status = status,
            None => return Err(PlatformError::NotFound(name.to_string())),
        }
        state.calls.push(PlatformCall::UpdateScanScheduleStatus { name: name.to_string() });
        Ok(())
    }

    async fn get_scan_cache_by_node(
        &self,
        node_name: &str,
    ) -> Result<Option<(ScanCacheSpec, ScanCacheStatus)>, PlatformError> {
        let name = format!("scancache-{node_name}");
        Ok(self.inner.lock().scan_caches.get(&name).cloned())
    }

    async fn write_scan_cache(
        &self,
        name: &str,
        spec: ScanCacheSpec,
        status: ScanCacheStatus,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.scan_caches.insert(name.to_string(), (spec, status));
        state.calls.push(PlatformCall::WriteScanCache { name: name.to_string() });
        Ok(())
    }

    async fn write_cache_blob(
        &self,
        name: &str,
        data: HashMap<String, String>,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.cache_blobs.insert(name.to_string(), data);
        state.calls.push(PlatformCall::WriteCacheBlob { name: name.to_string() });
        Ok(())
    }

    async fn create_workload(
        &self,
        name: &str,
        owner_node_scan: &str,
        node_name: &str,
        _env: Vec<(String, String)>,
        resources: ResourceEnvelope,
        _retry_budget: u32,
    ) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.workloads.insert(
            name.to_string(),
            FakeWorkload {
                owner_node_scan: owner_node_scan.to_string(),
                node_name: node_name.to_string(),
                phase: WorkloadPhase::Running,
                log_lines: Vec::new(),
                resources,
            },
        );
        state.calls.push(PlatformCall::CreateWorkload {
            name: name.to_string(),
            node_name: node_name.to_string(),
        });
        Ok(())
    }

    async fn get_workload(&self, name: &str) -> Result<Option<WorkloadObservation>, PlatformError> {
        Ok(self.inner.lock().workloads.get(name).map(|w| WorkloadObservation {
            phase: w.phase,
            log_lines: w.log_lines.clone(),
        }))
    }

    async fn delete_workload(&self, name: &str) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.workloads.remove(name);
        state.calls.push(PlatformCall::DeleteWorkload { name: name.to_string() });
        Ok(())
    }

    async fn emit_event(&self, event: OperatorEvent) -> Result<(), PlatformError> {
        let mut state = self.inner.lock();
        state.calls.push(PlatformCall::EmitEvent { reason: format!("{:?}", event.reason) });
        state.events.push(event);
        Ok(())
    }

    async fn service_account_exists(&self, name: &str) -> Result<bool, PlatformError> {
        Ok(self.inner.lock().service_accounts.iter().any(|n| n == name))
    }

    async fn self_subject_access_review(
        &self,
        _verb: &str,
        _resource: &str,
    ) -> Result<bool, PlatformError> {
        Ok(self.inner.lock().access_reviews_allowed)
    }

    async fn api_server_reachable(&self) -> Result<bool, PlatformError> {
        Ok(self.inner.lock().api_reachable)
    }

    async fn virus_scanner_service_ready(&self) -> Result<bool, PlatformError> {
        Ok(self.inner.lock().virus_scanner_ready)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
