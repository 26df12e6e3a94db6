//! Rotation decisions.
//!
//! [`Capacity`] holds the maximum size of the active log file and answers the
//! three questions the writer asks before every write:
//!
//! - can this write ever succeed? ([`Capacity::check`])
//! - must the open file rotate before this write? ([`Capacity::must_rotate`])
//! - how should a file found on disk be opened? ([`Capacity::plan_open`])

use crate::error::{CreekError, CreekResult};

/// Bytes per megabyte, as configured by callers.
pub const MEGABYTE: u64 = 1024 * 1024;

/// Maximum size in bytes of the active log file.
///
/// # Invariants
///
/// - A capacity is always greater than zero
/// - A write longer than the capacity is rejected before any state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Capacity(u64);

/// How to open a log file that is not currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenPlan {
    /// No file exists yet; create an empty one.
    CreateNew,
    /// Append to the existing file and continue counting from its size.
    Resume {
        /// Size of the file on disk.
        size: u64,
    },
    /// The existing file cannot take the write; rotate it without opening it.
    Rotate,
}

impl Capacity {
    /// Creates a capacity from a size in megabytes.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::InvalidCapacity`] if `megabytes` is zero or the
    /// byte count overflows `u64`.
    pub fn from_megabytes(megabytes: u64) -> CreekResult<Self> {
        megabytes
            .checked_mul(MEGABYTE)
            .filter(|bytes| *bytes > 0)
            .map(Self)
            .ok_or(CreekError::InvalidCapacity {
                max_size_mb: megabytes,
            })
    }

    /// Creates a capacity from an exact byte count.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::InvalidCapacity`] if `bytes` is zero.
    pub fn from_bytes(bytes: u64) -> CreekResult<Self> {
        if bytes == 0 {
            return Err(CreekError::InvalidCapacity { max_size_mb: 0 });
        }
        Ok(Self(bytes))
    }

    /// Returns the capacity in bytes.
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Rejects writes that could never fit, even in an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`CreekError::CapacityExceeded`] if `len` exceeds the capacity.
    pub fn check(self, len: u64) -> CreekResult<()> {
        if len > self.0 {
            return Err(CreekError::CapacityExceeded {
                len,
                capacity: self.0,
            });
        }
        Ok(())
    }

    /// Returns true if a file holding `size` bytes cannot take `incoming` more.
    #[must_use]
    pub const fn must_rotate(self, size: u64, incoming: u64) -> bool {
        size.saturating_add(incoming) > self.0
    }

    /// Decides how to open the log file given its size on disk, if any.
    ///
    /// An existing file is rotated when the write would bring it to or past
    /// the capacity; otherwise it is resumed in append mode.
    #[must_use]
    pub const fn plan_open(self, on_disk: Option<u64>, incoming: u64) -> OpenPlan {
        match on_disk {
            None => OpenPlan::CreateNew,
            Some(size) if size.saturating_add(incoming) >= self.0 => OpenPlan::Rotate,
            Some(size) => OpenPlan::Resume { size },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn megabytes_convert_to_bytes() {
        let capacity = Capacity::from_megabytes(10).unwrap();
        assert_eq!(capacity.bytes(), 10 * 1_048_576);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            Capacity::from_megabytes(0),
            Err(CreekError::InvalidCapacity { max_size_mb: 0 })
        ));
        assert!(Capacity::from_bytes(0).is_err());
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        assert!(matches!(
            Capacity::from_megabytes(u64::MAX),
            Err(CreekError::InvalidCapacity { .. })
        ));
    }

    #[test]
    fn check_allows_exactly_capacity() {
        let capacity = Capacity::from_bytes(8).unwrap();
        assert!(capacity.check(8).is_ok());
        assert!(matches!(
            capacity.check(9),
            Err(CreekError::CapacityExceeded { len: 9, capacity: 8 })
        ));
    }

    #[test]
    fn rotate_only_when_over_capacity() {
        let capacity = Capacity::from_bytes(8).unwrap();
        assert!(!capacity.must_rotate(0, 8));
        assert!(!capacity.must_rotate(7, 1));
        assert!(capacity.must_rotate(8, 1));
        assert!(!capacity.must_rotate(8, 0));
    }

    #[test]
    fn plan_open_for_missing_file() {
        let capacity = Capacity::from_bytes(8).unwrap();
        assert_eq!(capacity.plan_open(None, 4), OpenPlan::CreateNew);
    }

    #[test]
    fn plan_open_resumes_under_capacity() {
        let capacity = Capacity::from_bytes(8).unwrap();
        assert_eq!(capacity.plan_open(Some(3), 4), OpenPlan::Resume { size: 3 });
    }

    #[test]
    fn plan_open_rotates_when_reaching_capacity() {
        let capacity = Capacity::from_bytes(8).unwrap();
        assert_eq!(capacity.plan_open(Some(4), 4), OpenPlan::Rotate);
        assert_eq!(capacity.plan_open(Some(8), 0), OpenPlan::Rotate);
    }

    proptest! {
        #[test]
        fn admitted_writes_fit_after_rotation(cap in 1u64..4096, size in 0u64..4096, len in 0u64..4096) {
            let capacity = Capacity::from_bytes(cap).unwrap();
            prop_assume!(capacity.check(len).is_ok());
            prop_assume!(size <= cap);

            let after = if capacity.must_rotate(size, len) { len } else { size + len };
            prop_assert!(after <= cap);
        }
    }
}
