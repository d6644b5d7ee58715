use ahash::AHashSet;

/// Transient set of CIDR strings used to deduplicate while aggregating.
pub type CidrSet = AHashSet<String>;

/// Decides whether an access-list entry may be admitted as a literal.
///
/// CIDR blocks must be declared through policy objects; a literal entry is
/// admitted only when it does *not* parse as a CIDR. Bare addresses
/// (`192.168.1.1`) and any other non-CIDR text pass through unchanged for the
/// proxy to interpret.
pub fn admits_literal(entry: &str) -> bool {
    entry.trim().parse::<ipnet::IpNet>().is_err()
}

/// Sorts a CIDR collection and drops duplicates.
///
/// Ordering is lexical on the textual form, not numeric on the address.
/// Idempotent: normalizing a normalized list returns it unchanged.
pub fn normalize(mut cidrs: Vec<String>) -> Vec<String> {
    cidrs.sort();
    cidrs.dedup();
    cidrs
}
