pub mod fs_atomic;
pub mod hashing;
pub mod ids;
pub mod serde_ext;
