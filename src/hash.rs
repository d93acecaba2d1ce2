const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 64-bit FNV-1a over the UTF-8 bytes of `text`.
pub fn fnv1a_64(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Content fingerprint used to recognize highlights already written to disk.
pub fn content_hash(text: &str) -> String {
    to_base62(fnv1a_64(text))
}

fn to_base62(mut num: u64) -> String {
    if num == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let base = ALPHABET.len() as u64;
    let mut digits = Vec::new();
    while num > 0 {
        digits.push(ALPHABET[(num % base) as usize]);
        num /= base;
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(fnv1a_64(""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_64("foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_base62_encoding() {
        assert_eq!(to_base62(0), "0");
        assert_eq!(to_base62(61), "Z");
        assert_eq!(to_base62(62), "10");
        assert_eq!(to_base62(u64::MAX), "lYGhA16ahyf");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let text = "Some text\nwith a second line";

        assert_eq!(content_hash(text), content_hash(text));
        assert_ne!(content_hash(text), content_hash("Some text"));
    }
}
