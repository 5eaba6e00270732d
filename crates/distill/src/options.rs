// ABOUTME: Configuration for the distill engine: tunable Options, shared Config sets, and ExtractorBuilder.
// ABOUTME: ExtractorBuilder provides a fluent API and validates configuration once in build().

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dom::cleaners::{NOISE_CLASSES, NOISE_TAGS};
use crate::error::{DistillError, Result};
use crate::extractor::Extractor;
use crate::sanitize::SanitizePolicy;
use crate::stopwords::DEFAULT_STOPWORDS;

/// The content type format for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    Html,
    Markdown,
    #[default]
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => ContentType::Markdown,
            "html" => ContentType::Html,
            _ => ContentType::Text,
        }
    }
}

/// Heuristic thresholds used by the pipeline stages.
///
/// Defaults are the reference values; all of them are tuning knobs rather
/// than fixed law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Block wrappers without own text are dropped below this many characters.
    pub min_block_text_len: usize,
    /// Candidates with at least this many characters earn the baseline bonus.
    pub baseline_text_len: usize,
    pub baseline_bonus: f64,
    /// Multiplier applied to a candidate's stopword density.
    pub stopword_weight: f64,
    /// Candidates above this link density have their score scaled down.
    pub high_link_density: f64,
    /// Fraction of a candidate's score given to its parent, grandparent and great-grandparent.
    pub decay: [f64; 3],
    /// Siblings scoring at least this fraction of the winner are merged.
    pub sibling_score_ratio: f64,
    /// Text-bearing siblings must stay below this link density to be merged.
    pub sibling_link_density: f64,
    /// Text-bearing siblings longer than this are merged without sentence punctuation.
    pub long_paragraph_len: usize,
    /// Output paragraphs shorter than this are dropped.
    pub min_paragraph_len: usize,
    /// Output paragraphs above this link density are dropped.
    pub output_link_density: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_block_text_len: 30,
            baseline_text_len: 25,
            baseline_bonus: 1.0,
            stopword_weight: 3.0,
            high_link_density: 0.5,
            decay: [1.0, 0.5, 0.25],
            sibling_score_ratio: 0.2,
            sibling_link_density: 0.05,
            long_paragraph_len: 80,
            min_paragraph_len: 10,
            output_link_density: 0.5,
        }
    }
}

impl Options {
    /// Check that every ratio lies in `[0, 1]` and weights are non-negative.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("high_link_density", self.high_link_density),
            ("sibling_score_ratio", self.sibling_score_ratio),
            ("sibling_link_density", self.sibling_link_density),
            ("output_link_density", self.output_link_density),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(DistillError::config(
                    name,
                    format!("{} must be within [0, 1], got {}", name, value),
                ));
            }
        }

        let mut weights = vec![
            ("baseline_bonus", self.baseline_bonus),
            ("stopword_weight", self.stopword_weight),
        ];
        weights.extend(self.decay.iter().map(|d| ("decay", *d)));
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(DistillError::config(
                    name,
                    format!("{} must be a non-negative number, got {}", name, value),
                ));
            }
        }

        Ok(())
    }
}

/// Word, tag and class sets shared read-only by every extraction.
#[derive(Debug, Clone)]
pub struct Config {
    pub stopwords: HashSet<String>,
    pub noise_tags: HashSet<String>,
    pub noise_classes: HashSet<String>,
    pub sanitize: SanitizePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.clone(),
            noise_tags: NOISE_TAGS.iter().map(|t| (*t).to_string()).collect(),
            noise_classes: NOISE_CLASSES.iter().map(|c| (*c).to_string()).collect(),
            sanitize: SanitizePolicy::default(),
        }
    }
}

impl Config {
    /// Returns true if `word` (already lowercased) is a stopword.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Reject empty sets and sanitize policies ammonia cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.stopwords.is_empty() {
            return Err(DistillError::config("stopwords", "stopword set is empty"));
        }
        if self.noise_tags.is_empty() {
            return Err(DistillError::config("noise_tags", "noise tag set is empty"));
        }
        if self.noise_classes.is_empty() {
            return Err(DistillError::config(
                "noise_classes",
                "noise class set is empty",
            ));
        }
        self.sanitize.validate()
    }
}

/// Process-wide default configuration, initialized on first use.
pub static DEFAULT_CONFIG: Lazy<Arc<Config>> = Lazy::new(|| Arc::new(Config::default()));

/// Builder for constructing Extractor instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ExtractorBuilder {
    opts: Options,
    config: Option<Config>,
}

impl ExtractorBuilder {
    /// Create a new ExtractorBuilder with default options and the shared default config.
    pub fn new() -> Self {
        Self::default()
    }

    fn config_mut(&mut self) -> &mut Config {
        self.config
            .get_or_insert_with(|| DEFAULT_CONFIG.as_ref().clone())
    }

    /// Replace all thresholds at once.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Set the block length floor used by the cleaning stage.
    pub fn min_block_text_len(mut self, len: usize) -> Self {
        self.opts.min_block_text_len = len;
        self
    }

    /// Set the minimum length of an output paragraph.
    pub fn min_paragraph_len(mut self, len: usize) -> Self {
        self.opts.min_paragraph_len = len;
        self
    }

    /// Set the sibling merge ratio.
    pub fn sibling_score_ratio(mut self, ratio: f64) -> Self {
        self.opts.sibling_score_ratio = ratio;
        self
    }

    /// Replace the stopword set. Words are lowercased.
    pub fn stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config_mut().stopwords = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Add a tag to the structural-noise set.
    pub fn noise_tag(mut self, tag: impl Into<String>) -> Self {
        self.config_mut()
            .noise_tags
            .insert(tag.into().to_lowercase());
        self
    }

    /// Add a class to the non-content marker set.
    pub fn noise_class(mut self, class: impl Into<String>) -> Self {
        self.config_mut().noise_classes.insert(class.into());
        self
    }

    /// Use a custom sanitize policy for the standalone cleaning stage.
    pub fn sanitize_policy(mut self, policy: SanitizePolicy) -> Self {
        self.config_mut().sanitize = policy;
        self
    }

    /// Validate the configuration and build the Extractor.
    pub fn build(self) -> Result<Extractor> {
        self.opts.validate()?;
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                Arc::new(config)
            }
            None => Arc::clone(&DEFAULT_CONFIG),
        };
        Ok(Extractor::from_parts(config, self.opts))
    }
}
