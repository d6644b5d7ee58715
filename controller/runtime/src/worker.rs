use crate::{
    k8s::{ClusterInfo, Error, Ingress, NetworkPolicy, Outcome, Reconciler, ResourceExt, Store},
    metrics::Metrics,
};
use futures::prelude::*;
use kube::runtime::watcher;
use std::sync::Arc;
use tokio::{sync::mpsc, time};
use tracing::{debug, warn};

const QUEUE_CAPACITY: usize = 1024;
const REQUEUE_DELAY: time::Duration = time::Duration::from_secs(5);

pub(crate) const INGRESS_TRIGGER: &str = "ingress";
pub(crate) const POLICY_TRIGGER: &str = "networkpolicy";

/// Feeds Ingress events through the annotation filter into a work queue and
/// synchronizes each queued object, re-queuing failures after a delay.
pub(crate) async fn ingresses<S: Store>(
    reconciler: Arc<Reconciler<S>>,
    cluster: Arc<ClusterInfo>,
    metrics: Metrics,
    events: impl Stream<Item = watcher::Event<Ingress>>,
) {
    let (tx, mut rx) = mpsc::channel::<(String, String)>(QUEUE_CAPACITY);
    let requeue_tx = tx.clone();

    let produce = async move {
        tokio::pin!(events);
        while let Some(ev) = events.next().await {
            let ingress = match ev {
                watcher::Event::Apply(ingress) | watcher::Event::InitApply(ingress) => ingress,
                watcher::Event::Delete(_) | watcher::Event::Init | watcher::Event::InitDone => {
                    continue
                }
            };
            if !cluster.is_recognized(ingress.annotations()) {
                continue;
            }
            let Some(namespace) = ingress.namespace() else {
                continue;
            };
            if tx.send((namespace, ingress.name_unchecked())).await.is_err() {
                return;
            }
        }
    };

    let consume = async move {
        while let Some((namespace, name)) = rx.recv().await {
            metrics.reconcile(INGRESS_TRIGGER);
            match reconciler.reconcile_ingress(&namespace, &name).await {
                Ok(Outcome::Updated) => {}
                Ok(Outcome::Unchanged) => metrics.noop(INGRESS_TRIGGER),
                Err(error) => {
                    metrics.failure(INGRESS_TRIGGER);
                    requeue((namespace, name), &requeue_tx, &error);
                }
            }
        }
    };

    tokio::join!(produce, consume);
}

/// Feeds NetworkPolicy events from the policy namespace into a work queue and
/// re-synchronizes every referencing Ingress. Deletions enqueue too, so that
/// CIDRs belonging to a removed policy are dropped from referencing objects.
pub(crate) async fn network_policies<S: Store>(
    reconciler: Arc<Reconciler<S>>,
    cluster: Arc<ClusterInfo>,
    metrics: Metrics,
    events: impl Stream<Item = watcher::Event<NetworkPolicy>>,
) {
    let (tx, mut rx) = mpsc::channel::<String>(QUEUE_CAPACITY);
    let requeue_tx = tx.clone();

    let produce = async move {
        tokio::pin!(events);
        while let Some(ev) = events.next().await {
            let policy = match ev {
                watcher::Event::Apply(policy)
                | watcher::Event::InitApply(policy)
                | watcher::Event::Delete(policy) => policy,
                watcher::Event::Init | watcher::Event::InitDone => continue,
            };
            if policy.namespace().as_deref() != Some(cluster.policy_ns.as_str()) {
                continue;
            }
            if tx.send(policy.name_unchecked()).await.is_err() {
                return;
            }
        }
    };

    let consume = async move {
        while let Some(policy) = rx.recv().await {
            metrics.reconcile(POLICY_TRIGGER);
            match reconciler.reconcile_network_policy(&policy).await {
                Ok(0) => metrics.noop(POLICY_TRIGGER),
                Ok(updated) => debug!(%policy, %updated, "Synchronized referencing Ingresses"),
                Err(error) => {
                    metrics.failure(POLICY_TRIGGER);
                    requeue(policy, &requeue_tx, &error);
                }
            }
        }
    };

    tokio::join!(produce, consume);
}

/// Schedules a failed work item to be retried once the delay elapses.
fn requeue<T: Send + 'static>(item: T, tx: &mpsc::Sender<T>, error: &Error) {
    warn!(%error, "Reconciliation failed, requeuing");
    let tx = tx.clone();
    tokio::spawn(async move {
        time::sleep(REQUEUE_DELAY).await;
        let _ = tx.send(item).await;
    });
}
