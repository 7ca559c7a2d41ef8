use anyhow::{Context, Result, bail};
use mission_health_game::seed::word_list;
use mission_health_game::{encode_friendly, parse_share_code};
use std::collections::HashMap;

/// Seed plus the share code it was given as, when there was one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub fn from_numeric(seed: u64) -> Self {
        Self { seed, code: None }
    }

    #[must_use]
    pub fn from_share_code(seed: u64, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
        }
    }

    #[must_use]
    pub fn share_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| encode_friendly(self.seed))
    }
}

/// Resolve a list of CLI seed arguments into canonical seed metadata.
///
/// Supports literal integers, share codes, and the special keywords
/// `all` / `available` which expand to every share-code seed.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();
    let mut request_all = false;

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            request_all = true;
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Some((_, seed)) = parse_share_code(token) {
            pending.push(SeedInfo::from_share_code(seed, encode_friendly(seed)));
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if request_all {
        pending.extend(generate_all_share_code_seeds()?);
    }

    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for info in pending {
        if let Some(&existing) = index.get(&info.seed) {
            if let Some(entry) = deduped.get_mut(existing)
                && entry.code.is_none()
                && info.code.is_some()
            {
                *entry = info;
            }
        } else {
            index.insert(info.seed, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}

fn generate_all_share_code_seeds() -> Result<Vec<SeedInfo>> {
    let words = word_list();
    let mut seeds = Vec::with_capacity(words.len() * 100);

    for word in &words {
        for suffix in 0..100 {
            let code = format!("{word}{suffix:02}");
            let (_, seed) = parse_share_code(&code)
                .with_context(|| format!("failed to parse share code: {code}"))?;
            seeds.push(SeedInfo::from_share_code(seed, code));
        }
    }

    Ok(seeds)
}
