//! Shared constants for end-to-end tests

// ============================================================================
// Users
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Second user for collaborative scenarios
#[allow(dead_code)]
pub const OTHER_USER: &str = "otheruser";

/// Alias of the LAMC cold-start seed
#[allow(dead_code)]
pub const COLLECTOR_SEED: &str = "collector-seed";

/// Seed for the engine's tiebreak RNG
pub const RNG_SEED: u64 = 20240611;

// ============================================================================
// Collector catalog
// ============================================================================

/// Artists of the LAMC seed, as they appear in the catalog
#[allow(dead_code)]
pub const SEED_ARTISTS: [&str; 5] = ["Chardin", "Morandi", "Cezanne", "Braque", "Klee"];

/// Works per seed artist
#[allow(dead_code)]
pub const WORKS_PER_SEED_ARTIST: usize = 2;

/// Still-life works by artists outside the seed
#[allow(dead_code)]
pub const STILL_LIFE_WORKS: usize = 8;

/// High-quality works from a period the seeded user has never met
#[allow(dead_code)]
pub const UNSEEN_PERIOD_WORKS: usize = 10;

// ============================================================================
// Single artworks
// ============================================================================

/// Monet seascape used for interaction tests
#[allow(dead_code)]
pub const MONET_ARTWORK_ID: &str = "monet-impression-sunrise";

/// Van Gogh portrait used for propagation tests
#[allow(dead_code)]
pub const VAN_GOGH_ARTWORK_ID: &str = "van-gogh-postman";
