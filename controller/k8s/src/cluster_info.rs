use std::collections::BTreeMap;

/// Holds process-wide configuration: the namespace policy objects are read
/// from and the annotation keys the controller recognizes.
#[derive(Clone, Debug)]
pub struct ClusterInfo {
    /// Namespace all referenced `NetworkPolicy` objects are fetched from.
    pub policy_ns: String,

    /// Comma-separated policy names contributing allow CIDRs.
    pub allow_policies_key: String,

    /// Comma-separated policy names contributing deny CIDRs.
    pub deny_policies_key: String,

    /// Comma-separated literal entries, allow side.
    pub allow_entries_key: String,

    /// Comma-separated literal entries, deny side.
    pub deny_entries_key: String,

    /// Output slot consumed by the proxy, allow side.
    pub allow_output_key: String,

    /// Output slot consumed by the proxy, deny side.
    pub deny_output_key: String,
}

impl Default for ClusterInfo {
    fn default() -> Self {
        Self {
            policy_ns: "network-policies".to_string(),
            allow_policies_key: "networking.k8s.io/whitelist-policy".to_string(),
            deny_policies_key: "networking.k8s.io/denylist-policy".to_string(),
            allow_entries_key: "networking.k8s.io/whitelist".to_string(),
            deny_entries_key: "networking.k8s.io/denylist".to_string(),
            allow_output_key: "nginx.ingress.kubernetes.io/whitelist-source-range".to_string(),
            deny_output_key: "nginx.ingress.kubernetes.io/denylist-source-range".to_string(),
        }
    }
}

// === impl ClusterInfo ===

impl ClusterInfo {
    /// True when the object carries at least one annotation this controller
    /// recognizes, either as an input or as a previously written output slot.
    ///
    /// Output slots count so that an object whose inputs were all removed is
    /// still synchronized once more to clear its stale outputs.
    pub fn is_recognized(&self, annotations: &BTreeMap<String, String>) -> bool {
        [
            &self.allow_policies_key,
            &self.deny_policies_key,
            &self.allow_entries_key,
            &self.deny_entries_key,
            &self.allow_output_key,
            &self.deny_output_key,
        ]
        .into_iter()
        .any(|key| annotations.contains_key(key))
    }
}
