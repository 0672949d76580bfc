//! Session token persistence: a plain `token.txt` next to the binary, so a
//! login survives restarts.

use std::fs;
use std::path::PathBuf;

fn token_path() -> PathBuf {
    std::env::var("TOKEN_FILE")
        .unwrap_or_else(|_| "token.txt".to_string())
        .into()
}

pub fn load_token() -> Option<String> {
    let token = fs::read_to_string(token_path()).ok()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub fn save_token(token: &str) {
    if let Err(e) = fs::write(token_path(), token) {
        eprintln!("Warning: could not save session token: {e}");
    }
}

pub fn clear_token() {
    let _ = fs::remove_file(token_path());
}
