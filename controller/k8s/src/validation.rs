use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

const NAME_MAX_LEN: usize = 63;
const PREFIX_MAX_LEN: usize = 253;

/// Keys and values together may not exceed 256KiB.
const TOTAL_SIZE_LIMIT: usize = 256 * 1024;

const QUALIFIED_NAME_REGEX: &str = r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$";
const DNS_SUBDOMAIN_REGEX: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AnnotationError {
    #[error(
        "annotation key `{0}` is invalid: the name part must be non-empty, at most \
         {NAME_MAX_LEN} characters, and consist of alphanumerics, `-`, `_`, or `.`"
    )]
    InvalidName(String),

    #[error(
        "annotation key `{0}` is invalid: the prefix part must be a DNS subdomain of at \
         most {PREFIX_MAX_LEN} characters"
    )]
    InvalidPrefix(String),

    #[error("annotation key `{0}` is invalid: at most one `/` is allowed")]
    TooManySegments(String),

    #[error("annotations exceed the {TOTAL_SIZE_LIMIT}-byte size limit ({0} bytes)")]
    TooLarge(usize),
}

/// Checks that every annotation key is a qualified name and that the mapping
/// fits within the platform size limit, per the rules the API server applies.
pub fn validate_annotations(
    annotations: &BTreeMap<String, String>,
) -> Result<(), AnnotationError> {
    let mut total = 0;
    for (key, value) in annotations {
        validate_key(key)?;
        total += key.len() + value.len();
    }
    if total > TOTAL_SIZE_LIMIT {
        return Err(AnnotationError::TooLarge(total));
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), AnnotationError> {
    let (prefix, name) = match key.split_once('/') {
        None => (None, key),
        Some((_, name)) if name.contains('/') => {
            return Err(AnnotationError::TooManySegments(key.to_string()));
        }
        Some((prefix, name)) => (Some(prefix), name),
    };

    if let Some(prefix) = prefix {
        let regex = Regex::new(DNS_SUBDOMAIN_REGEX).expect("should_compile");
        if prefix.is_empty() || prefix.len() > PREFIX_MAX_LEN || !regex.is_match(prefix) {
            return Err(AnnotationError::InvalidPrefix(key.to_string()));
        }
    }

    let regex = Regex::new(QUALIFIED_NAME_REGEX).expect("should_compile");
    if name.is_empty() || name.len() > NAME_MAX_LEN || !regex.is_match(name) {
        return Err(AnnotationError::InvalidName(key.to_string()));
    }

    Ok(())
}
