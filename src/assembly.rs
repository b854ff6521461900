//! Element-local and global assembly of the operator-pairing integrators.
pub mod buffers;
pub mod global;
pub mod local;
