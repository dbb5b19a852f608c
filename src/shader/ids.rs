//! Strongly-typed identifiers.
//!
//! Thin `Copy` wrappers around the raw integers the host hands us. The driver
//! keeps ownership of every object these refer to; the toggler only ever
//! compares them by value and never releases anything. Distinct newtypes keep
//! pipeline handles, command contexts and code addresses from being mixed up.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::checksum::crc32;

/// Content hash of a shader's byte code.
///
/// Two pipelines compiled from identical code share one hash. This is a
/// practical identity, not a cryptographic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShaderHash(pub u32);

impl ShaderHash {
    /// Hashes a shader code buffer.
    #[inline]
    #[must_use]
    pub fn of_code(code: &[u8]) -> Self {
        Self(crc32(code))
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShaderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Handle to a pipeline object realized by the driver.
///
/// Zero is the null handle ("no pipeline bound").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineHandle(u64);

impl PipelineHandle {
    pub const NULL: Self = Self(0);

    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Identity of an in-flight command recording stream (command list, deferred
/// context, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandContextId(u64);

impl CommandContextId {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Address of a shader code buffer, valid only while a pipeline is being
/// created.
///
/// Used purely as a key linking the create and init callbacks; it is never
/// dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeAddress(usize);

impl CodeAddress {
    #[inline]
    #[must_use]
    pub fn of(code: &[u8]) -> Self {
        Self(code.as_ptr() as usize)
    }
}
