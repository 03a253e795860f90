//! Process-unique identifiers for synthetic entities.
//!
//! Every generator captures a base once and then hands out `base + n` for an
//! atomically incremented `n`. The base mixes the wall clock in milliseconds
//! with a random per-process salt, so runs started back to back or side by
//! side land in different slots; the sequence keeps a single run free of
//! duplicates no matter how many scenarios call [`unique_id`] concurrently.
//!
//! All generated values live in `[1_000_000_000, i32::MAX]`, which keeps
//! them inside the 32-bit id range the API accepts and clear of the
//! sentinel identifiers below.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use crate::model::EntityId;

/// Identifier of an entity that never existed.
pub const NEVER_EXISTED_ID: EntityId = 999_999_999;

/// Structurally invalid identifier.
pub const INVALID_ID: EntityId = -1;

/// Lowest value a generator will ever return.
const FLOOR: EntityId = 1_000_000_000;

/// Ids between two neighbouring bases.
const SLOT_WIDTH: EntityId = 1_000;

/// Number of distinct bases. The highest one still leaves ~147 million ids
/// below `i32::MAX`.
const BASE_SLOTS: u64 = 1_000_000;

static GLOBAL: Lazy<IdGenerator> = Lazy::new(IdGenerator::new);

/// Drawn once per process.
static PROCESS_SALT: Lazy<u64> = Lazy::new(|| u64::from(rand::random::<u32>()));

/// Generators created so far in this process
static CREATED: AtomicU64 = AtomicU64::new(0);

/// Next identifier from the process-wide generator.
pub fn unique_id() -> EntityId {
    GLOBAL.next()
}

/// Monotonic identifier source
#[derive(Debug)]
pub struct IdGenerator {
    base: EntityId,
    seq: AtomicI32,
}

impl IdGenerator {
    /// Create a generator whose base is derived from the current time and
    /// the process salt. Generators created in the same process get
    /// different bases.
    pub fn new() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().unsigned_abs() % BASE_SLOTS;
        let ordinal = CREATED.fetch_add(1, Ordering::Relaxed) % BASE_SLOTS;
        let slot = (millis + *PROCESS_SALT + ordinal) % BASE_SLOTS;
        // slot < 1_000_000, so the offset is below 1_000_000_000
        Self::with_base(FLOOR + slot as EntityId * SLOT_WIDTH)
    }

    /// Create a generator with a fixed base. Bases below the floor are
    /// raised to it.
    pub fn with_base(base: EntityId) -> Self {
        Self {
            base: base.max(FLOOR),
            seq: AtomicI32::new(0),
        }
    }

    /// Base this generator counts up from.
    pub fn base(&self) -> EntityId {
        self.base
    }

    /// Next identifier. Never returns the same value twice.
    ///
    /// # Panics
    ///
    /// Panics once the generator has handed out every id between its base
    /// and `i32::MAX`. That is at least ~147 million ids for one process.
    pub fn next(&self) -> EntityId {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        n.checked_add(self.base)
            .filter(|_| n >= 0)
            .unwrap_or_else(|| panic!("identifier space exhausted after base {}", self.base))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_sequential_from_base() {
        let generator = IdGenerator::with_base(1_500_000_000);
        assert_eq!(generator.next(), 1_500_000_000);
        assert_eq!(generator.next(), 1_500_000_001);
        assert_eq!(generator.next(), 1_500_000_002);
    }

    #[test]
    fn test_base_is_clamped_to_floor() {
        let generator = IdGenerator::with_base(5);
        assert_eq!(generator.base(), FLOOR);
    }

    #[test]
    fn test_time_base_stays_in_range() {
        let generator = IdGenerator::new();
        assert!(generator.base() >= FLOOR);
        assert!(generator.base() <= FLOOR + 999_999 * SLOT_WIDTH);
        assert_eq!((generator.base() - FLOOR) % SLOT_WIDTH, 0);
        assert!(i32::MAX - generator.base() > 147_000_000);
    }

    #[test]
    fn test_fresh_generators_get_distinct_bases() {
        let first = IdGenerator::new();
        let second = IdGenerator::new();
        assert_ne!(first.base(), second.base());

        let bases: HashSet<_> = (0..16).map(|_| IdGenerator::new().base()).collect();
        assert_eq!(bases.len(), 16);
    }

    #[test]
    fn test_generated_ids_never_hit_sentinels() {
        for _ in 0..1_000 {
            let id = unique_id();
            assert_ne!(id, NEVER_EXISTED_ID);
            assert_ne!(id, INVALID_ID);
            assert!(id > 0);
        }
    }

    #[test]
    fn test_distinct_under_concurrency() {
        let generator = Arc::new(IdGenerator::new());
        let threads = 8;
        let per_thread = 5_000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || (0..per_thread).map(|_| generator.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), threads * per_thread);
    }

    #[test]
    #[should_panic(expected = "identifier space exhausted")]
    fn test_exhaustion_panics_instead_of_wrapping() {
        let generator = IdGenerator::with_base(i32::MAX - 1);
        generator.next();
        generator.next();
        generator.next();
    }
}
