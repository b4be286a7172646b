//! Detection of files that are themselves translation results.
//!
//! Watch folders frequently contain the output of earlier runs next to the
//! sources. The detector evaluates an ordered list of named rules; the first
//! rule that returns a definitive verdict decides. The rules only fire on
//! several layered naming cues, since dropping a real source file is worse
//! than queuing an output file that dedup catches later.

use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::FileType;
use crate::paths;

/// Suffix the pipeline appends to output names in pipeline mode.
pub const TRANSLATED_SUFFIX: &str = "_translated";

/// Model file suffix stripped before a model name is compared.
const MODEL_FILE_SUFFIX: &str = ".gguf";

/// Fragments of mainstream API provider identifiers.
const PROVIDER_FRAGMENTS: &[&str] = &[
    "openai",
    "anthropic",
    "claude",
    "gemini",
    "google",
    "deepseek",
    "qwen",
    "mistral",
    "moonshot",
    "kimi",
    "zhipu",
    "glm",
    "grok",
    "xai",
    "openrouter",
    "siliconflow",
    "ollama",
    "azure",
    "groq",
    "cohere",
    "doubao",
    "minimax",
];

/// Fragments of well-known model names.
const MODEL_FRAGMENTS: &[&str] = &[
    "gpt", "claude", "gemini", "deepseek", "qwen", "llama", "mistral", "glm", "sonnet", "opus",
    "haiku", "turbo", "mini", "chat", "reasoner", "coder", "instruct",
];

static RE_TRAILING_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_]+)_([^_]+)$").unwrap());

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The file is a translation result.
    Translated,
    /// The file should be treated as a source file.
    Source,
    /// The rule has no opinion; evaluation moves on.
    Continue,
}

/// The verdict together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: &'static str,
    pub verdict: Verdict,
}

/// Lower-cased pieces of the candidate path that every rule looks at.
struct Candidate {
    base: String,
    extension: Option<String>,
}

type Rule = fn(&TranslatedOutputDetector, &Candidate) -> Verdict;

const RULES: &[(&str, Rule)] = &[
    ("supported_extension", rule_supported_extension),
    ("translated_suffix", rule_translated_suffix),
    ("model_suffix", rule_model_suffix),
    ("provider_pattern", rule_provider_pattern),
    ("api_heuristic", rule_api_heuristic),
];

/// Strips the model file suffix and replaces characters that are not valid
/// in file names. Case is preserved; this is the form used in output names.
pub fn sanitize_model_name(name: &str) -> String {
    let trimmed = name.trim();
    let stem = if trimmed.to_lowercase().ends_with(MODEL_FILE_SUFFIX) {
        &trimmed[..trimmed.len() - MODEL_FILE_SUFFIX.len()]
    } else {
        trimmed
    };

    stem.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// The comparison form of a model name: sanitized and lower-cased.
pub fn normalize_model_name(name: &str) -> String {
    sanitize_model_name(name).to_lowercase()
}

/// Decides whether a path looks like an already produced translation.
#[derive(Debug, Clone)]
pub struct TranslatedOutputDetector {
    supported_extensions: Vec<String>,
    model_suffixes: Vec<String>,
    provider_markers: Vec<String>,
}

impl TranslatedOutputDetector {
    /// Creates a detector over the default supported extension set.
    pub fn new<M, P>(model_names: M, provider_names: P) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let supported = FileType::ALL.iter().map(|t| t.extension().to_string());
        Self::with_extensions(model_names, provider_names, supported)
    }

    pub fn with_extensions<M, P, E>(model_names: M, provider_names: P, extensions: E) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let mut model_suffixes: Vec<String> = model_names
            .into_iter()
            .map(|name| normalize_model_name(name.as_ref()))
            .filter(|name| !name.is_empty())
            .map(|name| format!("_{}", name))
            .collect();
        model_suffixes.sort();
        model_suffixes.dedup();

        let mut provider_markers: Vec<String> = provider_names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .map(|name| format!("_{}_", name))
            .collect();
        provider_markers.sort();
        provider_markers.dedup();

        Self {
            supported_extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            model_suffixes,
            provider_markers,
        }
    }

    /// Runs the rules in order and reports which one decided.
    pub fn evaluate(&self, path: &str) -> RuleOutcome {
        let lower = path.to_lowercase();
        let (base, extension) = paths::split_extension(paths::file_name(&lower));
        let candidate = Candidate {
            base: base.to_string(),
            extension: extension.map(str::to_string),
        };

        for (name, rule) in RULES {
            match rule(self, &candidate) {
                Verdict::Continue => continue,
                verdict => {
                    return RuleOutcome {
                        rule: *name,
                        verdict,
                    }
                }
            }
        }

        RuleOutcome {
            rule: "default",
            verdict: Verdict::Source,
        }
    }

    pub fn looks_like_translated_output(&self, path: &str) -> bool {
        self.evaluate(path).verdict == Verdict::Translated
    }
}

fn rule_supported_extension(detector: &TranslatedOutputDetector, c: &Candidate) -> Verdict {
    match &c.extension {
        Some(ext) if detector.supported_extensions.iter().any(|s| s == ext) => Verdict::Continue,
        _ => Verdict::Source,
    }
}

fn rule_translated_suffix(_: &TranslatedOutputDetector, c: &Candidate) -> Verdict {
    if c.base.ends_with(TRANSLATED_SUFFIX) {
        Verdict::Translated
    } else {
        Verdict::Continue
    }
}

fn rule_model_suffix(detector: &TranslatedOutputDetector, c: &Candidate) -> Verdict {
    if detector
        .model_suffixes
        .iter()
        .any(|suffix| c.base.ends_with(suffix.as_str()))
    {
        Verdict::Translated
    } else {
        Verdict::Continue
    }
}

fn rule_provider_pattern(detector: &TranslatedOutputDetector, c: &Candidate) -> Verdict {
    let matched = detector.provider_markers.iter().any(|marker| {
        c.base
            .match_indices(marker.as_str())
            .any(|(idx, m)| idx + m.len() < c.base.len())
    });
    if matched {
        Verdict::Translated
    } else {
        Verdict::Continue
    }
}

fn rule_api_heuristic(_: &TranslatedOutputDetector, c: &Candidate) -> Verdict {
    let Some(caps) = RE_TRAILING_TOKENS.captures(&c.base) else {
        return Verdict::Continue;
    };
    let provider = &caps[1];
    let model = &caps[2];

    if resembles_provider(provider) && looks_like_model(model) {
        Verdict::Translated
    } else {
        Verdict::Continue
    }
}

fn resembles_provider(token: &str) -> bool {
    PROVIDER_FRAGMENTS
        .iter()
        .any(|fragment| token.contains(fragment))
}

fn looks_like_model(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        || MODEL_FRAGMENTS.iter().any(|fragment| token.contains(fragment))
}
