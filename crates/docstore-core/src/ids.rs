// ID generation utility.
//
// Generates nanoid-based unique identifiers for backends that mint their
// own ids (the in-memory store).

/// Generate a unique ID using nanoid (21 characters).
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Generate an ID with a custom length.
pub fn generate_id_with_length(len: usize) -> String {
    nanoid::nanoid!(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_length() {
        let id = generate_id();
        assert_eq!(id.len(), 21);
    }

    #[test]
    fn test_generate_id_custom_length() {
        let id = generate_id_with_length(32);
        assert_eq!(id.len(), 32);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
