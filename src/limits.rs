/// Longest accepted reservation user name, in bytes.
pub const MAX_USER_LEN: usize = 64;

/// Reservations admitted per room per day.
pub const MAX_RESERVATIONS_PER_DAY: usize = 256;

/// Rooms in one catalog seed.
pub const MAX_CATALOG_ROOMS: usize = 100_000;

/// Size of a single WAL record payload accepted on replay.
pub const MAX_WAL_RECORD_BYTES: usize = 64 * 1024;
