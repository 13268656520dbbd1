//! BLAKE3 fingerprints for scaffold trees

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash over a sequence of `(path, content)` pairs
///
/// The caller supplies entries in a deterministic order (scaffold trees
/// iterate sorted by path), so equal trees always hash equal.
pub fn hash_entries<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut hasher = Hasher::new();

    for (path, content) in entries {
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content);
    }

    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}
