// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ClusterScanReconciler (spec §4.2): fan-out NodeScan creation over a node
//! set with a bounded concurrency window, aggregating child status back into
//! the parent.

use crate::error::ReconcileError;
use crate::executor::apply_effects;
use crate::metrics;
use clamscan_core::{
    truncate_identifier, ChildNodeScanRef, ClusterScan, ClusterScanPhase, ClusterScanStatus,
    Clock, Effect, NodeScanPhase, NodeScanSpec,
};
use clamscan_platform::{CredentialResolver, PlatformClient};
use std::collections::BTreeMap;

/// Requeue interval while a ClusterScan still has unscanned nodes (spec
/// §4.2 "Phase rule").
pub const RUNNING_REQUEUE_SECS: u64 = 30;

/// Child NodeScan name for `node` under `cluster_scan` (spec §4.2
/// "Concurrency window").
pub fn child_name(cluster_scan_name: &str, node: &str) -> String {
    truncate_identifier(&format!("{cluster_scan_name}-{node}"))
}

/// Build the NodeScanSpec for a fan-out child, copying non-empty template
/// fields (spec §4.2 "Template propagation").
fn child_spec(cs: &ClusterScan, node: &str) -> NodeScanSpec {
    let mut spec = NodeScanSpec {
        node_name: node.to_string(),
        policy_ref: cs.spec.policy_ref.clone(),
        priority: cs.spec.priority,
        paths: None,
        exclude_patterns: None,
        max_concurrent: None,
        file_timeout_ms: None,
        max_file_size_bytes: None,
        resources: None,
        ttl_after_completion_secs: None,
        strategy: Default::default(),
        incremental: None,
        force_full_scan: false,
    };
    if let Some(template) = &cs.spec.template {
        if let Some(paths) = &template.paths {
            if !paths.is_empty() {
                spec.paths = Some(paths.clone());
            }
        }
        if let Some(max_concurrent) = template.max_concurrent {
            if max_concurrent != 0 {
                spec.max_concurrent = Some(max_concurrent);
            }
        }
        if let Some(resources) = &template.resources {
            spec.resources = Some(resources.clone());
        }
        if let Some(strategy) = template.strategy {
            spec.strategy = strategy;
        }
        if let Some(incremental) = &template.incremental {
            spec.incremental = Some(incremental.clone());
        }
        spec.force_full_scan = template.force_full_scan;
    }
    spec
}

/// Aggregated counts over a set of child NodeScans (spec §4.2 "Aggregation").
#[derive(Debug, Clone, Default)]
struct Aggregate {
    completed: u32,
    running: u32,
    failed: u32,
    infected: u32,
    total_files_scanned: u64,
    total_files_infected: u64,
    children: Vec<ChildNodeScanRef>,
}

fn aggregate(node_scans: &[clamscan_core::NodeScan]) -> Aggregate {
    let mut agg = Aggregate::default();
    for ns in node_scans {
        match ns.status.phase {
            NodeScanPhase::Completed => {
                agg.completed += 1;
                agg.total_files_scanned += ns.status.files_scanned;
                agg.total_files_infected += ns.status.files_infected;
            }
            NodeScanPhase::Running => agg.running += 1,
            NodeScanPhase::Failed => agg.failed += 1,
            NodeScanPhase::Pending => {}
        }
        if ns.status.files_infected > 0 {
            agg.infected += 1;
        }
        agg.children.push(ChildNodeScanRef {
            name: ns.name.clone(),
            node: ns.spec.node_name.clone(),
            phase: ns.status.phase,
            files_scanned: ns.status.files_scanned,
            files_infected: ns.status.files_infected,
            completion_time_epoch_ms: ns.status.completion_time_epoch_ms,
        });
    }
    agg
}

/// Gather from the platform, compute the fan-out/aggregation decision, and
/// execute the resulting effects for one ClusterScan.
pub async fn reconcile<C, Clk, R>(client: &C, clock: &Clk, resolver: &R, name: &str) -> Result<(), ReconcileError>
where
    C: PlatformClient,
    Clk: Clock,
    R: CredentialResolver,
{
    let Some(mut cs) = client.get_cluster_scan(name).await? else {
        return Ok(());
    };
    let now_ms = clock.now_epoch_ms();
    let mut effects = Vec::new();

    if cs.status.pending_deletion {
        let children = client.list_node_scans_by_label("clusterscan", name).await?;
        for child in &children {
            effects.push(Effect::DeleteNodeScan { name: child.name.clone() });
        }
        cs.status.pending_deletion = false;
        client.update_cluster_scan_status(name, cs.status.clone()).await?;
        return apply_effects(client, resolver, effects).await;
    }

    // Snapshot the node set on the first reconcile after Pending (spec §4.2
    // "Node selection"); never re-list afterward so the set cannot grow.
    if !cs.status.node_set_snapshotted {
        let nodes = client.list_nodes(cs.spec.node_selector.as_ref()).await?;
        cs.status.selected_nodes = nodes;
        cs.status.total_nodes = cs.status.selected_nodes.len() as u32;
        cs.status.node_set_snapshotted = true;
        cs.status.phase = ClusterScanPhase::Running;
    }

    let existing_children = client.list_node_scans_by_label("clusterscan", name).await?;
    let agg = aggregate(&existing_children);

    let existing_nodes: std::collections::HashSet<&str> =
        existing_children.iter().map(|ns| ns.spec.node_name.as_str()).collect();
    let cap = cs.spec.effective_concurrency();
    let mut running = agg.running;

    for node in &cs.status.selected_nodes {
        if running >= cap {
            break;
        }
        if existing_nodes.contains(node.as_str()) {
            continue;
        }
        let name_for_child = child_name(name, node);
        let mut labels = BTreeMap::new();
        labels.insert("clusterscan".to_string(), name.to_string());
        effects.push(Effect::CreateNodeScan {
            name: name_for_child,
            spec: child_spec(&cs, node),
            labels,
        });
        running += 1;
    }

    cs.status.completed = agg.completed;
    cs.status.running = agg.running;
    cs.status.failed = agg.failed;
    cs.status.infected = agg.infected;
    cs.status.total_files_scanned = agg.total_files_scanned;
    cs.status.total_files_infected = agg.total_files_infected;
    cs.status.children = agg.children;

    metrics::CLUSTERSCAN_NODES_TOTAL.with_label_values(&[name]).set(cs.status.total_nodes as f64);
    metrics::CLUSTERSCAN_NODES_COMPLETED.with_label_values(&[name]).set(cs.status.completed as f64);
    metrics::CLUSTERSCAN_NODES_FAILED.with_label_values(&[name]).set(cs.status.failed as f64);

    let was_terminal = cs.status.phase.is_terminal();
    cs.status.phase =
        ClusterScanPhase::from_counts(cs.status.total_nodes, cs.status.completed, cs.status.failed);

    if cs.status.phase.is_terminal() && !was_terminal {
        cs.status.completion_time_epoch_ms = Some(now_ms);
        metrics::CLUSTERSCANS_TOTAL
            .with_label_values(&[&cs.status.phase.to_string().to_lowercase()])
            .inc();
    }

    client.update_cluster_scan_status(name, cs.status).await?;
    apply_effects(client, resolver, effects).await
}

#[cfg(test)]
#[path = "cluster_scan_reconciler_tests.rs"]
mod tests;
