//! Token counting for extraction metrics.
//!
//! Counts come from the BPE vocabulary registered for the model (via
//! `tiktoken-rs`), falling back to [`DEFAULT_ENCODING`]. They feed metrics only
//! and never influence control flow.

use std::sync::LazyLock;

use tiktoken_rs::tokenizer::{get_tokenizer, Tokenizer};
use tiktoken_rs::CoreBPE;

/// Encoding used when the model is not registered.
pub const DEFAULT_ENCODING: Encoding = Encoding::Cl100kBase;

/// A BPE encoding known to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// GPT-4o, GPT-4.1 and o-series models.
    O200kBase,
    /// GPT-4, GPT-3.5 and the `text-embedding-3` family.
    Cl100kBase,
    /// Codex and `text-davinci-002/003`.
    P50kBase,
    /// The edit models.
    P50kEdit,
    /// GPT-3 base models and GPT-2.
    R50kBase,
}

/// Tokenizers registered by `tiktoken-rs` and the encoding each one uses.
const TOKENIZERS: &[(Tokenizer, Encoding)] = &[
    (Tokenizer::O200kBase, Encoding::O200kBase),
    (Tokenizer::Cl100kBase, Encoding::Cl100kBase),
    (Tokenizer::P50kBase, Encoding::P50kBase),
    (Tokenizer::P50kEdit, Encoding::P50kEdit),
    (Tokenizer::R50kBase, Encoding::R50kBase),
    (Tokenizer::Gpt2, Encoding::R50kBase),
];

static O200K_BASE: LazyLock<Option<CoreBPE>> =
    LazyLock::new(|| load(Encoding::O200kBase, tiktoken_rs::o200k_base));
static CL100K_BASE: LazyLock<Option<CoreBPE>> =
    LazyLock::new(|| load(Encoding::Cl100kBase, tiktoken_rs::cl100k_base));
static P50K_BASE: LazyLock<Option<CoreBPE>> =
    LazyLock::new(|| load(Encoding::P50kBase, tiktoken_rs::p50k_base));
static P50K_EDIT: LazyLock<Option<CoreBPE>> =
    LazyLock::new(|| load(Encoding::P50kEdit, tiktoken_rs::p50k_edit));
static R50K_BASE: LazyLock<Option<CoreBPE>> =
    LazyLock::new(|| load(Encoding::R50kBase, tiktoken_rs::r50k_base));

fn load<E: std::fmt::Display>(
    encoding: Encoding,
    build: fn() -> Result<CoreBPE, E>,
) -> Option<CoreBPE> {
    build()
        .inspect_err(|e| {
            tracing::warn!(encoding = encoding.name(), error = %e, "Failed to load BPE vocabulary");
        })
        .ok()
}

impl Encoding {
    /// Registered name of the encoding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::O200kBase => "o200k_base",
            Self::Cl100kBase => "cl100k_base",
            Self::P50kBase => "p50k_base",
            Self::P50kEdit => "p50k_edit",
            Self::R50kBase => "r50k_base",
        }
    }

    /// The loaded vocabulary, built once per process.
    fn bpe(self) -> Option<&'static CoreBPE> {
        let bpe = match self {
            Self::O200kBase => &O200K_BASE,
            Self::Cl100kBase => &CL100K_BASE,
            Self::P50kBase => &P50K_BASE,
            Self::P50kEdit => &P50K_EDIT,
            Self::R50kBase => &R50K_BASE,
        };
        bpe.as_ref()
    }

    /// Counts the tokens `text` occupies under this encoding.
    ///
    /// Special tokens such as `<|endoftext|>` count as one token each. Returns
    /// 0 if the vocabulary failed to load.
    #[must_use]
    pub fn count(self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe()
            .map_or(0, |bpe| bpe.encode_with_special_tokens(text).len())
    }
}

/// Resolves the encoding registered for `model`, if any.
///
/// Accepts exact model names and the dated or suffixed variants of known
/// families (`gpt-4o-mini`, `gpt-4-0613`, ...).
#[must_use]
pub fn encoding_for_model(model: &str) -> Option<Encoding> {
    let tokenizer = get_tokenizer(model)?;
    TOKENIZERS
        .iter()
        .find(|(known, _)| *known == tokenizer)
        .map(|(_, encoding)| *encoding)
}

/// Returns the number of tokens `text` occupies for `model`.
///
/// Unregistered models fall back to [`DEFAULT_ENCODING`].
///
/// # Examples
///
/// ```
/// use docex::extraction::count_tokens;
///
/// assert_eq!(count_tokens("", "gpt-4o-mini"), 0);
/// assert_eq!(count_tokens("hello world", "gpt-4o-mini"), 2);
/// ```
#[must_use]
pub fn count_tokens(text: &str, model: &str) -> usize {
    encoding_for_model(model).unwrap_or(DEFAULT_ENCODING).count(text)
}
