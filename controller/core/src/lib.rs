#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotation;
pub mod cidr;

pub use self::cidr::CidrSet;
pub use ipnet::IpNet;
