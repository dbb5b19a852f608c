//! Shader identity
//!
//! Fingerprinting of driver-owned shader objects:
//! - `checksum`: CRC-32 over shader byte code
//! - `ids`: value-type wrappers for hashes, handles, contexts and code addresses
//! - `stage`: tracked stages and host event payloads
//! - `hash_cache`: create → init hand-off of freshly computed hashes
//! - `identity`: hash ⇄ pipeline handle table

pub mod checksum;
pub mod hash_cache;
pub mod identity;
pub mod ids;
pub mod stage;

pub use hash_cache::HashCache;
pub use identity::{HandleList, IdentityTable};
pub use ids::{CodeAddress, CommandContextId, PipelineHandle, ShaderHash};
pub use stage::{IndirectCommand, PerStage, PipelineStage, PipelineSubobject, ShaderStage, SubobjectType};
