//! Cooldown buckets and outcomes
//!
//! A bucket type is an opaque, comparable discriminator naming one rate-limit
//! dimension (per-user, per-channel, global, ...). Any `Eq + Hash + Display`
//! value can serve as one; values of different Rust types never compare equal.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Values usable as a bucket discriminator.
pub trait BucketKind: fmt::Debug + fmt::Display + Eq + Hash + Send + Sync + 'static {}

impl<T> BucketKind for T where T: fmt::Debug + fmt::Display + Eq + Hash + Send + Sync + 'static {}

trait ErasedBucket: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_erased(&self, other: &dyn Any) -> bool;
    fn hash_erased(&self, state: &mut dyn Hasher);
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: BucketKind> ErasedBucket for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_erased(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn hash_erased(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Type-erased bucket discriminator
#[derive(Clone)]
pub struct BucketType {
    value: Arc<dyn ErasedBucket>,
    type_id: TypeId,
    label: Arc<str>,
}

impl BucketType {
    /// Wrap a discriminator value. Its `Display` form is the label used in
    /// rejection messages and must not be empty.
    pub fn new<T: BucketKind>(value: T) -> Result<Self, ConfigurationError> {
        let label = value.to_string();
        if label.trim().is_empty() {
            return Err(ConfigurationError::InvalidBucketType);
        }
        Ok(Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Recover the original discriminator.
    pub fn downcast_ref<T: BucketKind>(&self) -> Option<&T> {
        self.value.as_any().downcast_ref::<T>()
    }

    pub fn is<T: BucketKind>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl From<BucketScope> for BucketType {
    fn from(scope: BucketScope) -> Self {
        Self {
            value: Arc::new(scope),
            type_id: TypeId::of::<BucketScope>(),
            label: scope.to_string().into(),
        }
    }
}

impl PartialEq for BucketType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.value.eq_erased(other.value.as_any())
    }
}

impl Eq for BucketType {}

impl Hash for BucketType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.value.hash_erased(state);
    }
}

impl fmt::Debug for BucketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt_debug(f)
    }
}

impl fmt::Display for BucketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Common rate-limit dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketScope {
    Global,
    User,
    Channel,
    Guild,
}

impl fmt::Display for BucketScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketScope::Global => write!(f, "Global"),
            BucketScope::User => write!(f, "User"),
            BucketScope::Channel => write!(f, "Channel"),
            BucketScope::Guild => write!(f, "Guild"),
        }
    }
}

/// Result of one cooldown bucket evaluation.
///
/// Either the "none" sentinel (not rate-limited) or a hot bucket with a
/// strictly positive retry-after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CooldownOutcome {
    bucket_type: Option<BucketType>,
    retry_after: Option<Duration>,
}

impl CooldownOutcome {
    /// Not on cooldown
    pub fn none() -> Self {
        Self {
            bucket_type: None,
            retry_after: None,
        }
    }

    /// Bucket is hot for `retry_after`.
    pub fn on_cooldown(
        bucket_type: BucketType,
        retry_after: Duration,
    ) -> Result<Self, ConfigurationError> {
        if retry_after.is_zero() {
            return Err(ConfigurationError::NonPositiveRetryAfter);
        }
        Ok(Self {
            bucket_type: Some(bucket_type),
            retry_after: Some(retry_after),
        })
    }

    /// Bucket is hot for a signed number of seconds.
    ///
    /// Rejects non-positive, non-finite and out-of-range values.
    pub fn on_cooldown_secs(
        bucket_type: BucketType,
        retry_after_secs: f64,
    ) -> Result<Self, ConfigurationError> {
        if !retry_after_secs.is_finite() || retry_after_secs <= 0.0 {
            return Err(ConfigurationError::NonPositiveRetryAfter);
        }
        let retry_after = Duration::try_from_secs_f64(retry_after_secs).map_err(|_| {
            ConfigurationError::InvalidConfig(format!(
                "retry-after of {retry_after_secs}s does not fit a duration"
            ))
        })?;
        Self::on_cooldown(bucket_type, retry_after)
    }

    pub fn is_successful(&self) -> bool {
        self.retry_after.is_none()
    }

    pub fn bucket_type(&self) -> Option<&BucketType> {
        self.bucket_type.as_ref()
    }

    /// Time until the bucket cools down; zero for the sentinel.
    pub fn retry_after(&self) -> Duration {
        self.retry_after.unwrap_or(Duration::ZERO)
    }
}

impl Default for CooldownOutcome {
    fn default() -> Self {
        Self::none()
    }
}
