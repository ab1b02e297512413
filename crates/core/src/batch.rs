//! Chunking for multi-row writes.

/// Maximum number of rows touched by one batched statement.
pub const MAX_BATCH_SIZE: usize = 500;

/// Split `items` into chunks of at most `MAX_BATCH_SIZE`.
pub fn chunks<T>(items: &[T]) -> std::slice::Chunks<'_, T> {
    items.chunks(MAX_BATCH_SIZE)
}
