use crate::{
    k8s::{ClusterInfo, ClusterStore, Reconciler},
    metrics::Metrics,
    worker,
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "ingress-cidr-controller",
    about = "Synchronizes NetworkPolicy CIDRs into Ingress access-list annotations"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "ingress_cidr_controller=info,warn",
        env = "INGRESS_CIDR_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Namespace referenced NetworkPolicies are read from.
    #[clap(long, default_value = "network-policies")]
    policy_namespace: String,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            policy_namespace,
        } = self;

        let cluster = Arc::new(ClusterInfo {
            policy_ns: policy_namespace,
            ..ClusterInfo::default()
        });

        let mut prom = <Registry>::default();
        let metrics = Metrics::register(prom.sub_registry_with_prefix("ingress_cidr"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let store = ClusterStore::new(runtime.client(), cluster.policy_ns.clone());
        let reconciler = Arc::new(Reconciler::new(store, cluster.clone()));

        // Ingress events re-synchronize the one object; NetworkPolicy events
        // fan out to every referencing Ingress.
        let ingresses = runtime.watch_all::<crate::k8s::Ingress>(watcher::Config::default());
        tokio::spawn(
            worker::ingresses(reconciler.clone(), cluster.clone(), metrics.clone(), ingresses)
                .instrument(info_span!("ingresses")),
        );

        let policies = runtime.watch_all::<crate::k8s::NetworkPolicy>(watcher::Config::default());
        tokio::spawn(
            worker::network_policies(reconciler, cluster, metrics, policies)
                .instrument(info_span!("networkpolicies")),
        );

        // Block the main thread on the shutdown signal; once it fires, wait
        // for the background tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
