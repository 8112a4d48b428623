/// Modular arithmetic helpers.
pub mod field;
/// Group trait and operations.
pub mod group;
/// Hashing group elements.
pub mod hash;
/// Prime generation for group parameters.
pub mod prime;
/// Secret scalars wiped on drop.
pub mod secret;

pub use group::Group;
pub use hash::{hash_elements, hash_to_int};
pub use secret::SecretScalar;
