//! Reversible share codes built from district names.
//! Code format: <WORD><NN>, e.g., BHOPAL42, AGARMALWA07

use twox_hash::XxHash64;

use crate::districts::{DISTRICTS, District};

const HASH_DOMAIN: &[u8; 5] = b"MHLTH";

fn sanitize_word(word: &str) -> String {
    word.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Code word for the district at `index`.
#[must_use]
pub fn word_at(index: usize) -> Option<String> {
    DISTRICTS.get(index).map(|d| sanitize_word(d.name))
}

/// Every code word, in district order.
#[must_use]
pub fn word_list() -> Vec<String> {
    DISTRICTS.iter().map(|d| sanitize_word(d.name)).collect()
}

#[inline]
fn pack(word_index: u16, nn: u8) -> u16 {
    word_index & 0x01FF | ((u16::from(nn) & 0x7F) << 9)
}

#[inline]
fn unpack(packed: u16) -> (u16, u8) {
    (packed & 0x01FF, ((packed >> 9) & 0x7F) as u8)
}

fn compose_seed(word_index: u16, nn: u8) -> u64 {
    let packed = pack(word_index, nn);
    let mut buf = [0u8; 8];
    buf[..5].copy_from_slice(HASH_DOMAIN);
    buf[5] = (packed & 0xFF) as u8;
    buf[6] = (packed >> 8) as u8;
    buf[7] = 0x5A;
    let h = XxHash64::oneshot(0, &buf);
    (h & 0xFFFF_FFFF_FFFF_0000) | u64::from(packed)
}

fn word_index(seed: u64) -> usize {
    let (wi, _) = unpack((seed & 0xFFFF) as u16);
    usize::from(wi) % DISTRICTS.len()
}

#[must_use]
pub fn encode_friendly(seed: u64) -> String {
    let (_, nn) = unpack((seed & 0xFFFF) as u16);
    let word = word_at(word_index(seed))
        .unwrap_or_else(|| "BHOPAL".to_string());
    format!("{word}{:02}", nn % 100)
}

#[must_use]
pub fn decode_to_seed(code: &str) -> Option<u64> {
    let s = code.trim();
    if s.len() < 3 || !s.is_ascii() {
        return None;
    }
    let (word_part, nn_part) = s.split_at(s.len() - 2);
    let nn: u8 = nn_part.parse().ok()?;
    let word = sanitize_word(word_part);
    let idx = DISTRICTS
        .iter()
        .position(|d| sanitize_word(d.name) == word)?;
    let wi = u16::try_from(idx).ok()?;
    Some(compose_seed(wi, nn))
}

#[must_use]
pub fn generate_code_from_entropy(entropy: u64) -> String {
    let wi = u16::try_from(entropy % DISTRICTS.len() as u64).unwrap_or(0);
    let nn = ((entropy >> 17) % 100) as u8;
    encode_friendly(compose_seed(wi, nn))
}

/// District named by a seed's code word.
#[must_use]
pub fn district_for_seed(seed: u64) -> &'static District {
    &DISTRICTS[word_index(seed)]
}

/// Parse a share code into the district it names and its seed.
#[must_use]
pub fn parse_share_code(code: &str) -> Option<(&'static District, u64)> {
    decode_to_seed(code)
        .map(|seed| (district_for_seed(seed), seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrips_code() {
        let seed = 0xDEAD_BEEF_CAFE_BABE;
        let code = encode_friendly(seed);
        let new_seed = decode_to_seed(&code).unwrap();
        assert_eq!(encode_friendly(new_seed), code);
    }

    #[test]
    fn bhopal_42_stable() {
        let seed = decode_to_seed("BHOPAL42").unwrap();
        assert_eq!(encode_friendly(seed), "BHOPAL42");
        assert_eq!(decode_to_seed("bhopal42"), Some(seed));
    }

    #[test]
    fn multi_word_districts_accept_spacing() {
        let seed = decode_to_seed("Agar Malwa07").unwrap();
        assert_eq!(encode_friendly(seed), "AGARMALWA07");
        assert_eq!(district_for_seed(seed).name, "Agar Malwa");
    }

    #[test]
    fn rejects_unknown_words_and_bad_numbers() {
        assert!(decode_to_seed("ORANGE42").is_none());
        assert!(decode_to_seed("BHOPALXX").is_none());
        assert!(decode_to_seed("42").is_none());
        assert!(decode_to_seed("").is_none());
    }

    #[test]
    fn entropy_codes_decode() {
        for entropy in [0_u64, 1, 51, 0xFFFF_FFFF, u64::MAX] {
            let code = generate_code_from_entropy(entropy);
            let seed = decode_to_seed(&code).unwrap();
            assert_eq!(encode_friendly(seed), code);
        }
    }

    #[test]
    fn share_code_names_its_district() {
        let (district, seed) = parse_share_code("INDORE05").unwrap();
        assert_eq!(district.name, "Indore");
        assert_eq!(encode_friendly(seed), "INDORE05");
        assert_eq!(word_list().len(), DISTRICTS.len());
        assert_eq!(word_at(0).as_deref(), Some("BHOPAL"));
    }
}
