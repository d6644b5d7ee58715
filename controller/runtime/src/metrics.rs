use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

/// Counters for the reconciliation workers, labeled by what triggered the
/// reconciliation.
#[derive(Clone)]
pub(crate) struct Metrics {
    reconciles: Family<TriggerLabels, Counter>,
    failures: Family<TriggerLabels, Counter>,
    noops: Family<TriggerLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct TriggerLabels {
    trigger: String,
}

// === impl Metrics ===

impl Metrics {
    pub fn register(prom: &mut Registry) -> Self {
        let reconciles = Family::default();
        prom.register(
            "reconciles",
            "Count of reconciliation attempts",
            reconciles.clone(),
        );

        let failures = Family::default();
        prom.register(
            "reconcile_failures",
            "Count of reconciliation attempts that failed",
            failures.clone(),
        );

        let noops = Family::default();
        prom.register(
            "reconcile_noops",
            "Count of reconciliations that left the cluster unchanged",
            noops.clone(),
        );

        Self {
            reconciles,
            failures,
            noops,
        }
    }

    pub fn reconcile(&self, trigger: &str) {
        self.reconciles.get_or_create(&TriggerLabels::new(trigger)).inc();
    }

    pub fn failure(&self, trigger: &str) {
        self.failures.get_or_create(&TriggerLabels::new(trigger)).inc();
    }

    pub fn noop(&self, trigger: &str) {
        self.noops.get_or_create(&TriggerLabels::new(trigger)).inc();
    }
}

impl TriggerLabels {
    fn new(trigger: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
        }
    }
}
