// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PlatformClient` backed by the orchestration platform's HTTP API.
//!
//! Every resource kind hangs off a flat namespaced path
//! (`{base}/nodescans/{name}`, `{base}/workloads/{name}`, ...); the wire
//! format is the same JSON the resource types already derive via serde. A
//! real deployment points `base_url` at the platform's API gateway.

use super::{PlatformClient, PlatformError, WorkloadObservation, WorkloadPhase};
use async_trait::async_trait;
use clamscan_core::{
    ClusterScan, ClusterScanSpec, ClusterScanStatus, NodeScan, NodeScanSpec, NodeScanStatus,
    OperatorEvent, ResourceEnvelope, ScanCacheSpec, ScanCacheStatus, ScanPolicy, ScanPolicyStatus,
    ScanSchedule, ScanScheduleStatus,
};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Clone)]
pub struct HttpPlatformClient {
    base_url: String,
    namespace: String,
    http: Client,
}

impl HttpPlatformClient {
    pub fn new(base_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into(),
            namespace: namespace.into(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/namespaces/{}/{}", self.base_url.trim_end_matches('/'), self.namespace, path)
    }

    async fn get_opt<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, PlatformError> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| PlatformError::Transient(e.to_string()))?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => resp
                .json()
                .await
                .map(Some)
                .map_err(|e| PlatformError::RequestFailed(e.to_string())),
            StatusCode::CONFLICT => Err(PlatformError::Conflict(path.to_string())),
            s => Err(PlatformError::RequestFailed(format!("{path}: {s}"))),
        }
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, PlatformError> {
        Ok(self.get_opt(path).await?.unwrap_or_default())
    }

    async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), PlatformError> {
        let resp = self
            .http
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| PlatformError::Transient(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(PlatformError::Conflict(path.to_string())),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                Err(PlatformError::Transient(path.to_string()))
            }
            s => Err(PlatformError::RequestFailed(format!("{path}: {s}"))),
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), PlatformError> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| PlatformError::Transient(e.to_string()))?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(PlatformError::Conflict(path.to_string())),
            s => Err(PlatformError::RequestFailed(format!("{path}: {s}"))),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), PlatformError> {
        let resp = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| PlatformError::Transient(e.to_string()))?;
        match resp.status() {
            s if s.is_success() || s == StatusCode::NOT_FOUND => Ok(()),
            s => Err(PlatformError::RequestFailed(format!("{path}: {s}"))),
        }
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn node_exists(&self, name: &str) -> Result<bool, PlatformError> {
        Ok(self
            .get_opt::<serde_json::Value>(&format!("nodes/{name}"))
            .await?
            .is_some())
    }

    async fn list_nodes(
        &self,
        selector: Option<&BTreeMap<String, String>>,
    ) -> Result<Vec<String>, PlatformError> {
        let path = match selector {
            Some(sel) if !sel.is_empty() => {
                let query = sel
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("nodes?selector={query}")
            }
            _ => "nodes".to_string(),
        };
        self.list(&path).await
    }

    async fn get_node_scan(&self, name: &str) -> Result<Option<NodeScan>, PlatformError> {
        self.get_opt(&format!("nodescans/{name}")).await
    }

    async fn list_node_scans(&self) -> Result<Vec<NodeScan>, PlatformError> {
        self.list("nodescans").await
    }

    async fn list_node_scans_by_label(
        &self,
        label: &str,
        value: &str,
    ) -> Result<Vec<NodeScan>, PlatformError> {
        self.list(&format!("nodescans?label={label}={value}")).await
    }

    async fn create_node_scan(
        &self,
        name: &str,
        spec: NodeScanSpec,
        labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError> {
        self.post(&format!("nodescans/{name}"), &json!({ "spec": spec, "labels": labels })).await
    }

    async fn update_node_scan_status(
        &self,
        name: &str,
        status: NodeScanStatus,
    ) -> Result<(), PlatformError> {
        self.put(&format!("nodescans/{name}/status"), &status).await
    }

    async fn delete_node_scan(&self, name: &str) -> Result<(), PlatformError> {
        self.delete(&format!("nodescans/{name}")).await
    }

    async fn get_cluster_scan(&self, name: &str) -> Result<Option<ClusterScan>, PlatformError> {
        self.get_opt(&format!("clusterscans/{name}")).await
    }

    async fn list_cluster_scans(&self) -> Result<Vec<ClusterScan>, PlatformError> {
        self.list("clusterscans").await
    }

    async fn create_cluster_scan(
        &self,
        name: &str,
        spec: ClusterScanSpec,
        labels: BTreeMap<String, String>,
    ) -> Result<(), PlatformError> {
        self.post(&format!("clusterscans/{name}"), &json!({ "spec": spec, "labels": labels })).await
    }

    async fn update_cluster_scan_status(
        &self,
        name: &str,
        status: ClusterScanStatus,
    ) -> Result<(), PlatformError> {
        self.put(&format!("clusterscans/{name}/status"), &status).await
    }

    async fn delete_cluster_scan(&self, name: &str) -> Result<(), PlatformError> {
        self.delete(&format!("clusterscans/{name}")).await
    }

    async fn get_scan_policy(&self, name: &str) -> Result<Option<ScanPolicy>, PlatformError> {
        self.get_opt(&format!("scanpolicies/{name}")).await
    }

    async fn update_scan_policy_status(
        &self,
        name: &str,
        status: ScanPolicyStatus,
    ) -> Result<(), PlatformError> {
        self.put(&format!("scanpolicies/{name}/status"), &status).await
    }

    async fn get_scan_schedule(&self, name: &str) -> Result<Option<ScanSchedule>, PlatformError> {
        self.get_opt(&format!("scanschedules/{name}")).await
    }

    async fn list_scan_schedules(&self) -> Result<Vec<ScanSchedule>, PlatformError> {
        self.list("scanschedules").await
    }

    async fn update_scan_schedule_status(
        &self,
        name: &str,
        status: ScanScheduleStatus,
    ) -> Result<(), PlatformError> {
        self.put(&format!("scanschedules/{name}/status"), &status).await
    }

    async fn get_scan_cache_by_node(
        &self,
        node_name: &str,
    ) -> Result<Option<(ScanCacheSpec, ScanCacheStatus)>, PlatformError> {
        let name = format!("scancache-{node_name}");
        let value: Option<serde_json::Value> = self.get_opt(&format!("scancaches/{name}")).await?;
        value
            .map(|v| {
                let spec = serde_json::from_value(v["spec"].clone())
                    .map_err(|e| PlatformError::RequestFailed(e.to_string()))?;
                let status = serde_json::from_value(v["status"].clone())
                    .map_err(|e| PlatformError::RequestFailed(e.to_string()))?;
                Ok((spec, status))
            })
            .transpose()
    }

    async fn write_scan_cache(
        &self,
        name: &str,
        spec: ScanCacheSpec,
        status: ScanCacheStatus,
    ) -> Result<(), PlatformError> {
        self.put(&format!("scancaches/{name}"), &json!({ "spec": spec, "status": status })).await
    }

    async fn write_cache_blob(
        &self,
        name: &str,
        data: HashMap<String, String>,
    ) -> Result<(), PlatformError> {
        self.put(&format!("blobs/{name}"), &data).await
    }

    async fn create_workload(
        &self,
        name: &str,
        owner_node_scan: &str,
        node_name: &str,
        env: Vec<(String, String)>,
        resources: ResourceEnvelope,
        retry_budget: u32,
    ) -> Result<(), PlatformError> {
        self.post(
            &format!("workloads/{name}"),
            &json!({
                "ownerNodeScan": owner_node_scan,
                "nodeName": node_name,
                "env": env,
                "resources": resources,
                "retryBudget": retry_budget,
            }),
        )
        .await
    }

    async fn get_workload(&self, name: &str) -> Result<Option<WorkloadObservation>, PlatformError> {
        let value: Option<serde_json::Value> = self.get_opt(&format!("workloads/{name}")).await?;
        value
            .map(|v| {
                let phase = match v["phase"].as_str().unwrap_or("pending") {
                    "running" => WorkloadPhase::Running,
                    "succeeded" => WorkloadPhase::Succeeded,
                    "failed" => WorkloadPhase::Failed,
                    _ => WorkloadPhase::Pending,
                };
                let log_lines = v["logLines"]
                    .as_array()
                    .map(|a| a.iter().filter_map(|l| l.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                Ok(WorkloadObservation { phase, log_lines })
            })
            .transpose()
    }

    async fn delete_workload(&self, name: &str) -> Result<(), PlatformError> {
        self.delete(&format!("workloads/{name}")).await
    }

    async fn emit_event(&self, event: OperatorEvent) -> Result<(), PlatformError> {
        self.post("events", &event).await
    }

    async fn service_account_exists(&self, name: &str) -> Result<bool, PlatformError> {
        Ok(self
            .get_opt::<serde_json::Value>(&format!("serviceaccounts/{name}"))
            .await?
            .is_some())
    }

    async fn self_subject_access_review(
        &self,
        verb: &str,
        resource: &str,
    ) -> Result<bool, PlatformError> {
        let resp = self
            .http
            .post(self.url("selfsubjectaccessreviews"))
            .json(&json!({ "verb": verb, "resource": resource }))
            .send()
            .await
            .map_err(|e| PlatformError::Transient(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(PlatformError::RequestFailed(format!("access review: {}", resp.status())));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| PlatformError::RequestFailed(e.to_string()))?;
        Ok(body["allowed"].as_bool().unwrap_or(false))
    }

    async fn api_server_reachable(&self) -> Result<bool, PlatformError> {
        let resp = self.http.get(self.url("nodes?limit=1")).send().await;
        Ok(resp.map(|r| r.status().is_success()).unwrap_or(false))
    }

    async fn virus_scanner_service_ready(&self) -> Result<bool, PlatformError> {
        let resp = self.http.get(self.url("services/virus-scanner/ready")).send().await;
        Ok(resp.map(|r| r.status().is_success()).unwrap_or(false))
    }
}
