use rand::{distributions::Alphanumeric, Rng};

/// Number of random characters appended to the prefix.
pub const ID_SUFFIX_LEN: usize = 16;

/// How many identifier candidates a caller may try before giving up and reporting an internal
/// error. With a 62^16 identifier space a single retry is already newsworthy.
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Produces `prefix` followed by [`ID_SUFFIX_LEN`] characters drawn uniformly from the
/// alphanumeric alphabet. Not cryptographically secure, and uniqueness is not guaranteed:
/// callers must insert under a uniqueness constraint and regenerate on a violation.
pub fn random_id(prefix: &str) -> String {
    let suffix: String =
        rand::thread_rng().sample_iter(&Alphanumeric).take(ID_SUFFIX_LEN).map(char::from).collect();
    format!("{prefix}{suffix}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_carry_the_prefix_and_a_fixed_length_suffix() {
        let id = random_id("order_");
        assert!(id.starts_with("order_"));
        assert_eq!(id.len(), "order_".len() + ID_SUFFIX_LEN);
        assert!(id["order_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn consecutive_ids_differ() {
        // Not a uniqueness proof, just a sanity check that the RNG is actually sampled.
        let ids: Vec<String> = (0..50).map(|_| random_id("pay_")).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }
}
