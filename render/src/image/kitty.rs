//! Kitty graphics protocol (APC) encoding.
//!
//! Framing: each chunk is `ESC _G{keys};{base64} ESC \` with no
//! intermediate whitespace. The first chunk carries the transmission
//! parameters; `m=1` marks "more chunks follow", the final chunk carries
//! `m=0`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Maximum base64 payload bytes per APC chunk the kitty protocol allows.
pub const CHUNK_SIZE: usize = 4096;

pub fn encode(bytes: &[u8], cols: u16, rows: u16) -> String {
    let encoded = BASE64.encode(bytes);
    let chunks: Vec<&str> = {
        let as_bytes = encoded.as_bytes();
        as_bytes
            .chunks(CHUNK_SIZE)
            // Base64 output is ASCII, chunk boundaries cannot split a char.
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect()
    };
    let mut out = String::with_capacity(encoded.len() + chunks.len() * 16);
    let last = chunks.len().saturating_sub(1);
    for (index, chunk) in chunks.iter().enumerate() {
        let more = if index == last { 0 } else { 1 };
        if index == 0 {
            out.push_str(&format!(
                "\x1b_Gf=100,a=T,t=d,c={cols},r={rows},m={more};{chunk}\x1b\\"
            ));
        } else {
            out.push_str(&format!("\x1b_Gm={more};{chunk}\x1b\\"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_chunk_closes_immediately() {
        let out = encode(b"tiny", 40, 20);
        assert!(out.starts_with("\x1b_Gf=100,a=T,t=d,c=40,r=20,m=0;"));
        assert!(out.ends_with("\x1b\\"));
        assert_eq!(out.matches("\x1b_G").count(), 1);
    }

    #[test]
    fn multi_chunk_framing() {
        // 3073 raw bytes -> 4100 base64 chars -> two chunks.
        let bytes = vec![0xABu8; 3073];
        let out = encode(&bytes, 40, 20);
        assert!(out.starts_with("\x1b_Gf=100,a=T,t=d,c=40,r=20,m=1;"));
        assert_eq!(out.matches("\x1b_G").count(), 2);
        assert_eq!(out.matches("m=1").count(), 1);
        assert_eq!(out.matches("m=0").count(), 1);
        // The closing chunk is last: no m=1 after the final m=0.
        let final_m0 = out.rfind("m=0;").expect("m=0 present");
        assert!(!out[final_m0..].contains("m=1"));
    }

    #[test]
    fn chunks_respect_payload_cap() {
        let bytes = vec![0u8; 64 * 1024];
        let out = encode(&bytes, 24, 12);
        for frame in out.split("\x1b\\").filter(|f| !f.is_empty()) {
            let payload = frame.rsplit(';').next().unwrap_or_default();
            assert!(payload.len() <= CHUNK_SIZE, "{} > {CHUNK_SIZE}", payload.len());
        }
    }

    #[test]
    fn no_whitespace_inside_frames() {
        let bytes = vec![7u8; 10_000];
        let out = encode(&bytes, 24, 12);
        assert!(!out.contains(' '));
        assert!(!out.contains('\n'));
    }
}
