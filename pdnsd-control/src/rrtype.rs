//! Resource record type registry
//!
//! A fixed, ordered table of the RR types the daemon caches. The basic set is
//! always available; the remaining types are only known to daemons built with
//! the extended type set and are hidden unless that capability is enabled.

use std::collections::HashMap;

/// Type value used by `neg` to cover every record type of a name.
pub const WHOLE_DOMAIN: u16 = 255;

pub const A: u16 = 1;
pub const CNAME: u16 = 5;
pub const PTR: u16 = 12;
pub const MX: u16 = 15;
pub const AAAA: u16 = 28;

/// `(name, id, extended)` in ascending id order.
const TABLE: &[(&str, u16, bool)] = &[
    ("A", A, false),
    ("NS", 2, false),
    ("MD", 3, false),
    ("MF", 4, false),
    ("CNAME", CNAME, false),
    ("SOA", 6, false),
    ("MB", 7, false),
    ("MG", 8, false),
    ("MR", 9, false),
    ("NULL", 10, false),
    ("WKS", 11, false),
    ("PTR", PTR, false),
    ("HINFO", 13, false),
    ("MINFO", 14, false),
    ("MX", MX, false),
    ("TXT", 16, false),
    ("RP", 17, true),
    ("AFSDB", 18, true),
    ("X25", 19, true),
    ("ISDN", 20, true),
    ("RT", 21, true),
    ("NSAP", 22, true),
    ("NSAP-PTR", 23, true),
    ("SIG", 24, true),
    ("KEY", 25, true),
    ("PX", 26, true),
    ("GPOS", 27, true),
    ("AAAA", AAAA, false),
    ("LOC", 29, true),
    ("NXT", 30, true),
    ("EID", 31, true),
    ("NIMLOC", 32, true),
    ("SRV", 33, false),
    ("ATMA", 34, true),
    ("NAPTR", 35, true),
    ("KX", 36, true),
    ("CERT", 37, true),
    ("A6", 38, true),
    ("DNAME", 39, true),
    ("SINK", 40, true),
    ("OPT", 41, true),
    ("APL", 42, true),
    ("DS", 43, true),
    ("SSHFP", 44, true),
    ("IPSECKEY", 45, true),
    ("RRSIG", 46, true),
    ("NSEC", 47, true),
    ("DNSKEY", 48, true),
];

/// A single registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrType {
    pub name: &'static str,
    pub id: u16,
}

/// Bidirectional name/id lookup over the enabled RR types.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    ordered: Vec<RrType>,
    by_name: HashMap<&'static str, u16>,
    by_id: HashMap<u16, &'static str>,
}

impl TypeRegistry {
    /// Build the registry, including the extended types only when asked to.
    #[must_use]
    pub fn new(extended: bool) -> Self {
        let ordered: Vec<RrType> = TABLE
            .iter()
            .filter(|(_, _, ext)| extended || !ext)
            .map(|&(name, id, _)| RrType { name, id })
            .collect();

        let by_name = ordered.iter().map(|t| (t.name, t.id)).collect();
        let by_id = ordered.iter().map(|t| (t.id, t.name)).collect();

        Self {
            ordered,
            by_name,
            by_id,
        }
    }

    /// Numeric id for an exact (case-sensitive) type name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn name(&self, id: u16) -> Option<&'static str> {
        self.by_id.get(&id).copied()
    }

    /// Number of enabled types
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Enabled types in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &RrType> {
        self.ordered.iter()
    }
}
