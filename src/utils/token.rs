use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Random alphanumeric secret, used for temporary passwords handed out by
/// admin user creation.
pub fn generate_secret(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
