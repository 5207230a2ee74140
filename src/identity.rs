use sha2::{Digest, Sha256};

pub fn track_id(artist: &str, title: &str) -> String {
    let canonical = canonical_identity(artist, title);
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(&digest[..])
}

fn canonical_identity(artist: &str, title: &str) -> String {
    serde_json::json!({
        "artist": artist,
        "title": title,
    })
    .to_string()
}
