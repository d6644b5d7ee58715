use ingress_cidr_controller_core::CidrSet;
use k8s_openapi::api::networking::v1::NetworkPolicy;

/// Extends `cidrs` with every distinct, non-empty CIDR declared across the
/// policy's ingress rules. Absent specs, rules, or source blocks are skipped.
pub(crate) fn extract_cidrs(policy: &NetworkPolicy, cidrs: &mut CidrSet) {
    let rules = policy
        .spec
        .iter()
        .flat_map(|spec| spec.ingress.iter().flatten());

    for rule in rules {
        for peer in rule.from.iter().flatten() {
            if let Some(block) = &peer.ip_block {
                if !block.cidr.is_empty() {
                    cidrs.insert(block.cidr.clone());
                }
            }
        }
    }
}
