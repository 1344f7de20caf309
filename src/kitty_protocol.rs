use base64::{engine::general_purpose::STANDARD, Engine};

const CHUNK_SIZE: usize = 4096;

/// Transmit-and-display APC sequence for a PNG, scaled by the terminal into
/// a `cols` x `rows` cell box at the cursor. Payloads are split in 4096-byte
/// base64 chunks with `m=1` on all but the last.
pub fn encode_png(image_id: u32, png_bytes: &[u8], cols: u16, rows: u16) -> String {
    let b64 = STANDARD.encode(png_bytes);
    let total = b64.len();

    let mut out = String::with_capacity(total + 64);
    let mut start = 0;
    loop {
        let end = (start + CHUNK_SIZE).min(total);
        let more = u8::from(end < total);

        out.push_str("\x1b_G");
        if start == 0 {
            out.push_str(&format!(
                "a=T,f=100,q=2,C=1,i={image_id},c={cols},r={rows},m={more};"
            ));
        } else {
            out.push_str(&format!("m={more};"));
        }
        // base64 output is ASCII, any byte offset is a char boundary
        out.push_str(&b64[start..end]);
        out.push_str("\x1b\\");

        if end >= total {
            break;
        }
        start = end;
    }
    out
}

pub fn delete_all_images() -> &'static str {
    "\x1b_Ga=d,d=a,q=2;\x1b\\"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_sequence() {
        let png = vec![0x89, 0x50, 0x4E, 0x47];
        let encoded = encode_png(3, &png, 4, 2);
        assert!(encoded.starts_with("\x1b_Ga=T,f=100,q=2,C=1,i=3,c=4,r=2,m=0;"));
        assert!(encoded.ends_with("\x1b\\"));
        assert_eq!(encoded.matches("\x1b_G").count(), 1);
    }

    #[test]
    fn large_payload_is_chunked() {
        let png = vec![0xAA; 8000];
        let encoded = encode_png(2, &png, 4, 2);
        assert!(encoded.matches("\x1b_G").count() >= 3);
        assert!(encoded.contains("m=1;"));
        assert!(encoded.contains("\x1b_Gm=0;"));
    }

    #[test]
    fn delete_targets_all_placements() {
        assert!(delete_all_images().contains("a=d,d=a"));
    }
}
