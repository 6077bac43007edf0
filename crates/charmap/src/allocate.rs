//! Classification of corpus characters and proxy allocation.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::{
    CharacterMapping, CharmapError, CodePage, Result,
    text::{SAFE_CONTROLS, is_control_or_separator},
};

/// Code points available as proxies, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPool(Vec<char>);

impl ProxyPool {
    /// Every printable double-byte character of the code page that the corpus
    /// does not already use.
    pub fn from_code_page(code_page: CodePage, corpus: &BTreeSet<char>) -> Self {
        let chars: BTreeSet<char> = code_page
            .double_byte_characters()
            .filter(|c| !corpus.contains(c))
            .collect();
        Self(chars.into_iter().collect())
    }

    /// Characters of a reference font that the corpus does not use, limited to
    /// those the code page encodes in exactly two bytes.
    pub fn from_reference(
        code_page: CodePage,
        reference: &BTreeSet<char>,
        corpus: &BTreeSet<char>,
    ) -> Self {
        let chars = reference
            .iter()
            .copied()
            .filter(|c| !corpus.contains(c) && !c.is_whitespace())
            .filter(|c| code_page.is_double_byte(*c))
            .collect();
        Self(chars)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.0
    }
}

/// The corpus split into characters that can stay and those needing a proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub safe: BTreeSet<char>,
    pub needs_mapping: BTreeSet<char>,
}

/// Splits `corpus` into safe characters and those needing a proxy.
///
/// A character is safe when it is a layout control, a C*/Z* category
/// character, or encodable in the code page and (when a reference charset is
/// given) present in it.
pub fn classify(
    corpus: &BTreeSet<char>,
    code_page: CodePage,
    reference: Option<&BTreeSet<char>>,
) -> Classification {
    let mut result = Classification::default();
    for &ch in corpus {
        let safe = SAFE_CONTROLS.contains(&ch)
            || is_control_or_separator(ch)
            || (code_page.can_encode(ch) && reference.is_none_or(|r| r.contains(&ch)));
        if safe {
            result.safe.insert(ch);
        } else {
            result.needs_mapping.insert(ch);
        }
    }
    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// Every corpus character is already representable.
    NothingToMap { safe: usize },
    Mapped {
        mapping: CharacterMapping,
        safe: usize,
        pool_size: usize,
    },
}

/// Allocates one proxy per character needing relocation.
///
/// Both sides are taken in ascending code point order and paired 1:1, so the
/// same corpus and pool always produce the same mapping.
pub fn allocate(
    corpus: &BTreeSet<char>,
    code_page: CodePage,
    reference: Option<&BTreeSet<char>>,
) -> Result<AllocationOutcome> {
    let classes = classify(corpus, code_page, reference);
    info!(
        "{} characters are safe, {} need mapping",
        classes.safe.len(),
        classes.needs_mapping.len()
    );

    if classes.needs_mapping.is_empty() {
        return Ok(AllocationOutcome::NothingToMap {
            safe: classes.safe.len(),
        });
    }

    let pool = match reference {
        Some(reference) => ProxyPool::from_reference(code_page, reference, corpus),
        None => ProxyPool::from_code_page(code_page, corpus),
    };
    debug!("Proxy pool has {} entries", pool.len());

    if pool.len() < classes.needs_mapping.len() {
        return Err(CharmapError::AllocationCapacity {
            needed: classes.needs_mapping.len(),
            available: pool.len(),
        });
    }

    let mapping: BTreeMap<char, char> = classes
        .needs_mapping
        .iter()
        .copied()
        .zip(pool.as_slice().iter().copied())
        .collect();

    Ok(AllocationOutcome::Mapped {
        mapping: CharacterMapping::from(mapping),
        safe: classes.safe.len(),
        pool_size: pool.len(),
    })
}
