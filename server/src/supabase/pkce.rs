use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};

/// Generate a PKCE code verifier and its S256 challenge
pub fn generate_pkce_codes() -> (String, String) {
    // 64 random bytes encode to an 86 character verifier, inside the 43..=128 range
    let mut code_verifier_bytes = [0u8; 64];
    thread_rng().fill_bytes(&mut code_verifier_bytes);

    let code_verifier = Base64UrlUnpadded::encode_string(&code_verifier_bytes);
    let code_challenge = challenge_for(&code_verifier);

    (code_verifier, code_challenge)
}

pub fn challenge_for(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    Base64UrlUnpadded::encode_string(&hasher.finalize())
}
