use crate::{
    cluster_info::ClusterInfo,
    network_policy::extract_cidrs,
    store::Store,
    validation::{self, AnnotationError},
};
use ingress_cidr_controller_core::{annotation::parse_list, cidr, CidrSet};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::ResourceExt;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, info, warn};

/// Errors that abort a reconciliation attempt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch Ingress {namespace}/{name}")]
    Fetch {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to list Ingresses")]
    List(#[source] kube::Error),

    #[error("Ingress {namespace}/{name} would have invalid annotations")]
    InvalidAnnotations {
        namespace: String,
        name: String,
        #[source]
        source: AnnotationError,
    },

    #[error("failed to update Ingress {namespace}/{name}")]
    Update {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}

/// What a synchronization did to the object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The object's annotations were rewritten.
    Updated,
    /// The object already reflected the computed state (or is gone); nothing
    /// was written.
    Unchanged,
}

/// Aggregates policy CIDRs and synchronizes Ingress output annotations.
///
/// Holds no mutable state of its own, so one instance may serve any number of
/// concurrent reconciliations; consistency across racing updates of the same
/// object is left to the API server's `resourceVersion` check.
pub struct Reconciler<S> {
    store: S,
    cluster: Arc<ClusterInfo>,
}

// === impl Reconciler ===

impl<S: Store> Reconciler<S> {
    pub fn new(store: S, cluster: Arc<ClusterInfo>) -> Self {
        Self { store, cluster }
    }

    /// Entry point for Ingress events: re-synchronizes the one object.
    ///
    /// An Ingress that no longer exists, or that carries none of the
    /// recognized annotations, is left alone.
    pub async fn reconcile_ingress(&self, namespace: &str, name: &str) -> Result<Outcome, Error> {
        let ingress = self
            .store
            .get_ingress(namespace, name)
            .await
            .map_err(|source| Error::Fetch {
                namespace: namespace.to_string(),
                name: name.to_string(),
                source,
            })?;

        let Some(mut ingress) = ingress else {
            debug!(%namespace, %name, "Ingress is gone, nothing to synchronize");
            return Ok(Outcome::Unchanged);
        };

        if !self.cluster.is_recognized(ingress.annotations()) {
            debug!(%namespace, %name, "Ingress carries no recognized annotations");
            return Ok(Outcome::Unchanged);
        }

        self.sync_ingress(&mut ingress).await
    }

    /// Entry point for NetworkPolicy events: re-synchronizes every Ingress
    /// whose allow or deny reference list names the policy. Returns how many
    /// objects were rewritten.
    ///
    /// Keyed on the policy name alone so that deletions re-synchronize too;
    /// aggregation then simply finds the policy missing and drops its CIDRs.
    /// The first legality or persist failure aborts the remainder.
    pub async fn reconcile_network_policy(&self, policy: &str) -> Result<usize, Error> {
        let ingresses = self.store.list_ingresses().await.map_err(Error::List)?;

        let mut updated = 0;
        for mut ingress in ingresses {
            if !self.references_policy(&ingress, policy) {
                continue;
            }
            if self.sync_ingress(&mut ingress).await? == Outcome::Updated {
                updated += 1;
            }
        }

        if updated == 0 {
            debug!(%policy, "No Ingress required an update");
        }
        Ok(updated)
    }

    fn references_policy(&self, ingress: &Ingress, policy: &str) -> bool {
        let annotations = ingress.annotations();
        [
            &self.cluster.allow_policies_key,
            &self.cluster.deny_policies_key,
        ]
        .into_iter()
        .filter_map(|key| annotations.get(key))
        .any(|value| parse_list(value).iter().any(|token| token == policy))
    }

    /// Computes both output slots for one Ingress and persists the object,
    /// but only when the annotations actually changed.
    async fn sync_ingress(&self, ingress: &mut Ingress) -> Result<Outcome, Error> {
        let namespace = ingress.namespace().unwrap_or_default();
        let name = ingress.name_unchecked();

        let annotations = ingress.annotations().clone();
        let get = |key: &str| annotations.get(key).map(String::as_str).unwrap_or("");

        let allow = self
            .aggregate(
                &parse_list(get(&self.cluster.allow_policies_key)),
                &parse_list(get(&self.cluster.allow_entries_key)),
            )
            .await;
        let deny = self
            .aggregate(
                &parse_list(get(&self.cluster.deny_policies_key)),
                &parse_list(get(&self.cluster.deny_entries_key)),
            )
            .await;

        let mut desired = annotations.clone();
        apply_slot(&mut desired, &self.cluster.allow_output_key, &allow);
        apply_slot(&mut desired, &self.cluster.deny_output_key, &deny);

        if desired == annotations {
            debug!(%namespace, %name, "Annotations already up to date");
            return Ok(Outcome::Unchanged);
        }

        validation::validate_annotations(&desired).map_err(|source| {
            Error::InvalidAnnotations {
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            }
        })?;

        ingress.metadata.annotations = Some(desired);
        self.store
            .update_ingress(ingress)
            .await
            .map_err(|source| Error::Update {
                namespace: namespace.clone(),
                name: name.clone(),
                source,
            })?;

        info!(%namespace, %name, "Updated Ingress annotations");
        Ok(Outcome::Updated)
    }

    /// Fetches each referenced policy, unions its CIDRs with the admitted
    /// literal entries, and returns the canonical sorted list.
    ///
    /// A reference that cannot be fetched contributes nothing; aggregation
    /// itself never fails.
    async fn aggregate(&self, refs: &[String], literals: &[String]) -> Vec<String> {
        if refs.is_empty() && literals.is_empty() {
            return Vec::new();
        }

        let mut cidrs = CidrSet::default();
        for policy in refs {
            match self.store.get_network_policy(policy).await {
                Ok(Some(found)) => extract_cidrs(&found, &mut cidrs),
                Ok(None) => {
                    warn!(namespace = %self.cluster.policy_ns, %policy, "Referenced NetworkPolicy not found");
                }
                Err(error) => {
                    warn!(namespace = %self.cluster.policy_ns, %policy, %error, "Failed to fetch NetworkPolicy");
                }
            }
        }

        for entry in literals {
            if cidr::admits_literal(entry) {
                cidrs.insert(entry.clone());
            }
        }

        cidr::normalize(cidrs.into_iter().collect())
    }
}

/// An output slot is present iff its merged CIDR list is non-empty; an empty
/// merge removes the slot rather than writing an empty string.
fn apply_slot(annotations: &mut BTreeMap<String, String>, key: &str, cidrs: &[String]) {
    if cidrs.is_empty() {
        annotations.remove(key);
    } else {
        annotations.insert(key.to_string(), cidrs.join(","));
    }
}
