//! In-process decoder backend.
//!
//! The decoder is split into a [`Tokenizer`] and a [`CausalLm`] so that the
//! sampling loop does not care which model produced the logits. The shipped
//! pair ([`PieceTokenizer`], [`BigramModel`]) loads from a single JSON weights
//! file:
//!
//! ```json
//! { "vocab": ["<eos>", "<unk>", " Cleanse", " with", ...],
//!   "eos": "<eos>", "unk": "<unk>",
//!   "logits": [[0.1, -2.0, ...], ...] }
//! ```
//!
//! `logits[i][j]` scores token `j` following token `i`.

use async_trait::async_trait;
use fs_err as fs;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::errors::{Result, SkinGenError};
use crate::profile::{RoutineResult, SkinProfile};
use crate::prompt;

pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;
    /// Special tokens are skipped.
    fn decode(&self, ids: &[u32]) -> String;
    fn eos_token(&self) -> Option<u32>;
}

pub trait CausalLm: Send + Sync {
    fn vocab_size(&self) -> usize;
    /// Unnormalized scores for the token following `context`.
    fn next_token_logits(&self, context: &[u32]) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    /// Upper bound on prompt plus generated tokens.
    pub max_length: usize,
    /// 0 disables top-k filtering.
    pub top_k: usize,
    /// 0 or below means greedy decoding.
    pub temperature: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self { max_length: 300, top_k: 50, temperature: 0.7 }
    }
}

impl SamplingParams {
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(SkinGenError::Configuration(format!(
                "temperature must be a finite number >= 0, got {}",
                self.temperature
            )));
        }
        if self.max_length == 0 {
            return Err(SkinGenError::Configuration("max_length must be at least 1".into()));
        }
        Ok(())
    }
}

/// Draw one token id: scale by temperature, keep the `top_k` best, softmax,
/// then sample. Non-finite logits are never chosen. Falls back to the best
/// candidate when the weights cannot be normalized. Returns `None` when no
/// candidate is left.
pub fn sample_top_k<R: Rng + ?Sized>(
    logits: &[f32],
    top_k: usize,
    temperature: f64,
    rng: &mut R,
) -> Option<u32> {
    let mut cands: Vec<(u32, f64)> = logits
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_finite())
        .map(|(i, &l)| (i as u32, l as f64))
        .collect();
    if cands.is_empty() {
        return None;
    }

    cands.sort_by(|a, b| b.1.total_cmp(&a.1));
    if temperature <= 0.0 {
        return Some(cands[0].0);
    }
    if top_k > 0 {
        cands.truncate(top_k);
    }

    let max = cands[0].1 / temperature;
    let weights: Vec<f64> = cands
        .iter()
        .map(|(_, l)| (l / temperature - max).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    // Extreme temperatures overflow the scaled logits.
    if !(total.is_finite() && total > 0.0) {
        return Some(cands[0].0);
    }

    let mut draw = rng.gen_range(0.0..total);
    for ((id, _), w) in cands.iter().zip(&weights) {
        if draw < *w {
            return Some(*id);
        }
        draw -= w;
    }
    cands.last().map(|(id, _)| *id)
}

/// Greedy longest-match subword tokenizer over a fixed piece vocabulary.
pub struct PieceTokenizer {
    pieces: Vec<String>,
    index: HashMap<String, u32>,
    special: HashSet<u32>,
    max_piece_chars: usize,
    unk: Option<u32>,
    eos: Option<u32>,
}

impl PieceTokenizer {
    pub fn new(pieces: Vec<String>, eos: Option<&str>, unk: Option<&str>) -> Result<Self> {
        let mut index = HashMap::with_capacity(pieces.len());
        for (i, p) in pieces.iter().enumerate() {
            if p.is_empty() {
                return Err(SkinGenError::Configuration(format!("vocab entry {i} is empty")));
            }
            if index.insert(p.clone(), i as u32).is_some() {
                return Err(SkinGenError::Configuration(format!("duplicate vocab entry {p:?}")));
            }
        }
        let lookup = |name: Option<&str>| -> Result<Option<u32>> {
            name.map(|n| {
                index.get(n).copied().ok_or_else(|| {
                    SkinGenError::Configuration(format!("special token {n:?} not in vocab"))
                })
            })
            .transpose()
        };
        let eos = lookup(eos)?;
        let unk = lookup(unk)?;
        let special: HashSet<u32> = eos.into_iter().chain(unk).collect();
        let max_piece_chars = pieces.iter().map(|p| p.chars().count()).max().unwrap_or(0);
        Ok(Self { pieces, index, special, max_piece_chars, unk, eos })
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl Tokenizer for PieceTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut ids = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let start = chars[pos].0;
            let longest = self.max_piece_chars.min(chars.len() - pos);
            let hit = (1..=longest).rev().find_map(|n| {
                let end = chars.get(pos + n).map(|c| c.0).unwrap_or(text.len());
                self.index
                    .get(&text[start..end])
                    .filter(|id| !self.special.contains(*id))
                    .map(|id| (*id, n))
            });
            match hit {
                Some((id, n)) => {
                    ids.push(id);
                    pos += n;
                }
                None => {
                    if let Some(unk) = self.unk {
                        ids.push(unk);
                    }
                    pos += 1;
                }
            }
        }
        ids
    }

    fn decode(&self, ids: &[u32]) -> String {
        ids.iter()
            .filter(|id| !self.special.contains(*id))
            .filter_map(|id| self.pieces.get(*id as usize))
            .map(String::as_str)
            .collect()
    }

    fn eos_token(&self) -> Option<u32> {
        self.eos
    }
}

/// Next-token scores depend only on the previous token.
pub struct BigramModel {
    logits: Vec<Vec<f32>>,
    start: u32,
}

impl BigramModel {
    /// `start` is the row used when the context is empty.
    pub fn new(logits: Vec<Vec<f32>>, start: u32) -> Result<Self> {
        let n = logits.len();
        if n == 0 {
            return Err(SkinGenError::Configuration("bigram table is empty".into()));
        }
        if let Some((i, row)) = logits.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(SkinGenError::Configuration(format!(
                "bigram row {i} has {} columns, expected {n}",
                row.len()
            )));
        }
        if start as usize >= n {
            return Err(SkinGenError::Configuration(format!("start token {start} out of range")));
        }
        Ok(Self { logits, start })
    }
}

impl CausalLm for BigramModel {
    fn vocab_size(&self) -> usize {
        self.logits.len()
    }

    fn next_token_logits(&self, context: &[u32]) -> Result<Vec<f32>> {
        let prev = context.last().copied().unwrap_or(self.start);
        self.logits
            .get(prev as usize)
            .cloned()
            .ok_or_else(|| SkinGenError::Generation(format!("token {prev} outside model vocabulary")))
    }
}

#[derive(Deserialize)]
struct WeightsFile {
    vocab: Vec<String>,
    #[serde(default)]
    eos: Option<String>,
    #[serde(default)]
    unk: Option<String>,
    logits: Vec<Vec<f32>>,
}

pub struct LocalDecoderBackend<T, M> {
    tokenizer: T,
    model: M,
    params: SamplingParams,
    rng: Mutex<StdRng>,
}

impl<T: Tokenizer, M: CausalLm> LocalDecoderBackend<T, M> {
    pub fn new(tokenizer: T, model: M, params: SamplingParams) -> Self {
        Self { tokenizer, model, params, rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Reproducible sampling, for tests.
    pub fn with_seed(tokenizer: T, model: M, params: SamplingParams, seed: u64) -> Self {
        Self { tokenizer, model, params, rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    fn decode_continuation(&self, prompt: &str) -> Result<String> {
        let mut ids = self.tokenizer.encode(prompt);
        let budget = self.params.max_length.saturating_sub(ids.len());
        if budget == 0 {
            return Err(SkinGenError::Generation(format!(
                "prompt is {} tokens, max_length is {}",
                ids.len(),
                self.params.max_length
            )));
        }

        let eos = self.tokenizer.eos_token();
        let mut generated = Vec::with_capacity(budget);
        let mut rng = self.rng.lock();
        for _ in 0..budget {
            let logits = self.model.next_token_logits(&ids)?;
            let next = sample_top_k(&logits, self.params.top_k, self.params.temperature, &mut *rng)
                .ok_or_else(|| SkinGenError::Generation("model produced no usable logits".into()))?;
            if Some(next) == eos {
                break;
            }
            ids.push(next);
            generated.push(next);
        }

        let text = self.tokenizer.decode(&generated);
        if text.trim().is_empty() {
            return Err(SkinGenError::Generation("model produced no output".into()));
        }
        Ok(text)
    }
}

impl LocalDecoderBackend<PieceTokenizer, BigramModel> {
    pub fn from_weights_file(path: &Path, params: SamplingParams) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            SkinGenError::Configuration(format!("reading model weights {}: {e}", path.display()))
        })?;
        let weights: WeightsFile = serde_json::from_str(&raw).map_err(|e| {
            SkinGenError::Configuration(format!("parsing model weights {}: {e}", path.display()))
        })?;
        if weights.logits.len() != weights.vocab.len() {
            return Err(SkinGenError::Configuration(format!(
                "{} vocab entries but {} logit rows",
                weights.vocab.len(),
                weights.logits.len()
            )));
        }
        let tokenizer =
            PieceTokenizer::new(weights.vocab, weights.eos.as_deref(), weights.unk.as_deref())?;
        let start = tokenizer.eos_token().unwrap_or(0);
        let model = BigramModel::new(weights.logits, start)?;
        tracing::debug!(vocab = tokenizer.len(), path = %path.display(), "loaded local decoder");
        Ok(Self::new(tokenizer, model, params))
    }
}

#[async_trait]
impl<T: Tokenizer, M: CausalLm> super::Backend for LocalDecoderBackend<T, M> {
    fn name(&self) -> &'static str {
        "local"
    }

    fn prompt_for(&self, profile: &SkinProfile) -> String {
        prompt::build_completion_seed(profile)
    }

    /// Returns the prompt followed by the sampled continuation.
    async fn generate(&self, prompt: &str) -> Result<RoutineResult> {
        let continuation = self.decode_continuation(prompt)?;
        Ok(RoutineResult::new(format!("{prompt}{continuation}")))
    }
}
