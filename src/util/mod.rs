/// Client-assigned block id. The store validates and keeps it, so the
/// optimistic local block and the persisted one share an id from the
/// start (no tmp-id swap needed).
pub(crate) fn new_block_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_are_unique_and_non_empty() {
        let a = new_block_id();
        let b = new_block_id();
        assert!(!a.is_empty());
        assert_ne!(a, b);
    }
}
