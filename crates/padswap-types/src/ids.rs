//! Identifiers used throughout Padswap.
//!
//! Accounts and tokens are 20-byte [`Address`]es ordered by value. Pools are
//! keyed by their canonical [`PairKey`] and carry a deterministic
//! [`PoolId`] derived from it. Launchpad projects use UUIDv7 [`ProjectId`]s.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{PadswapError, Result, constants};

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account or token address. `Address::ZERO` is the null address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose low 8 bytes hold `n` big-endian, so ordering follows `n`.
    #[must_use]
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Parse a hex address, with or without the `0x` prefix.
    ///
    /// # Errors
    /// Returns `InvalidTokenAddress` if the string is not 20 bytes of hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).map_err(|e| PadswapError::InvalidTokenAddress {
            reason: format!("{s}: {e}"),
        })?;
        let bytes: [u8; 20] =
            decoded
                .try_into()
                .map_err(|v: Vec<u8>| PadswapError::InvalidTokenAddress {
                    reason: format!("{s}: expected 20 bytes, got {}", v.len()),
                })?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// PoolId
// ---------------------------------------------------------------------------

/// Deterministic pool identifier: SHA-256 over the canonical pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// PairKey
// ---------------------------------------------------------------------------

/// Canonically ordered token pair: `token_a < token_b`, neither null.
///
/// The only way to build one is [`PairKey::canonical`], so a `PairKey` in
/// hand is always valid and always the same for both argument orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PairKey {
    token_a: Address,
    token_b: Address,
}

impl PairKey {
    /// Order two tokens lower-address-first.
    ///
    /// # Errors
    /// Returns `InvalidPair` if the tokens are equal or either is null.
    pub fn canonical(x: Address, y: Address) -> Result<Self> {
        if x == y {
            return Err(PadswapError::InvalidPair {
                reason: format!("identical tokens {x}"),
            });
        }
        if x.is_zero() || y.is_zero() {
            return Err(PadswapError::InvalidPair {
                reason: "null token address".to_string(),
            });
        }
        let (token_a, token_b) = if x < y { (x, y) } else { (y, x) };
        Ok(Self { token_a, token_b })
    }

    #[must_use]
    pub fn token_a(&self) -> Address {
        self.token_a
    }

    #[must_use]
    pub fn token_b(&self) -> Address {
        self.token_b
    }

    #[must_use]
    pub fn contains(&self, token: Address) -> bool {
        token == self.token_a || token == self.token_b
    }

    /// Deterministic pool id for this pair.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        let mut hasher = Sha256::new();
        hasher.update(constants::POOL_ID_DOMAIN);
        hasher.update(self.token_a.as_bytes());
        hasher.update(self.token_b.as_bytes());
        PoolId(hasher.finalize().into())
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_a, self.token_b)
    }
}

// ---------------------------------------------------------------------------
// ProjectId
// ---------------------------------------------------------------------------

/// Launchpad project identifier. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Whole seconds since the UNIX epoch.
///
/// Every operation takes `now` explicitly; nothing in the engine reads the
/// wall clock except [`Timestamp::now`], which callers use at the edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Current wall-clock time, truncated to whole seconds.
    #[must_use]
    pub fn now() -> Self {
        Self(u64::try_from(Utc::now().timestamp()).unwrap_or(0))
    }

    /// `self + secs`.
    ///
    /// # Errors
    /// Returns `Overflow` if the result does not fit in `u64`.
    pub fn checked_add_secs(self, secs: u64) -> Result<Self> {
        self.0
            .checked_add(secs)
            .map(Self)
            .ok_or(PadswapError::Overflow("timestamp addition"))
    }

    /// Seconds elapsed since `earlier`, or zero if `earlier` is in the future.
    #[must_use]
    pub fn elapsed_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// A random non-null address.
    #[must_use]
    pub fn random() -> Self {
        use rand::Rng;
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill(&mut bytes);
        bytes[0] |= 0x01;
        Self(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
