//! iTerm2 inline-image (OSC 1337) encoding: a single frame
//! `ESC ]1337;File={params}:{base64} BEL`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

pub fn encode(bytes: &[u8], cols: u16, rows: u16) -> String {
    let encoded = BASE64.encode(bytes);
    format!(
        "\x1b]1337;File=inline=1;size={};width={cols};height={rows};preserveAspectRatio=1:{encoded}\x07",
        bytes.len()
    )
}
