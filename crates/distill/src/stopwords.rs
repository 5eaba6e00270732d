// ABOUTME: Built-in English stopword list used as a prose signal by the density metrics.
// ABOUTME: Loaded once into a process-wide read-only set.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// High-frequency English function words.
pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "according", "across", "after", "afterwards", "again", "against",
    "all", "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anybody", "anyhow", "anyone", "anything",
    "anyway", "anywhere", "are", "around", "as", "aside", "at", "away", "back", "be", "became",
    "because", "become", "becomes", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "best", "better", "between", "beyond", "both", "but", "by", "came",
    "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "during", "each",
    "either", "else", "elsewhere", "enough", "even", "ever", "every", "everybody", "everyone",
    "everything", "everywhere", "except", "few", "first", "five", "for", "former", "formerly",
    "four", "from", "further", "get", "gets", "getting", "given", "gives", "go", "goes",
    "going", "gone", "got", "had", "has", "have", "having", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "if", "in", "indeed", "instead", "into", "is", "it", "its", "itself",
    "just", "keep", "know", "last", "latter", "least", "less", "let", "like", "likely",
    "made", "many", "may", "me", "meanwhile", "might", "more", "moreover", "most", "mostly",
    "much", "must", "my", "myself", "near", "nearly", "neither", "never", "nevertheless",
    "new", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere", "of",
    "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
    "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please", "quite",
    "rather", "really", "said", "same", "say", "says", "second", "see", "seem", "seemed",
    "seems", "several", "she", "should", "since", "so", "some", "somebody", "somehow",
    "someone", "something", "sometimes", "somewhere", "still", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "thereafter",
    "thereby", "therefore", "therein", "these", "they", "third", "this", "those", "though",
    "three", "through", "throughout", "thus", "to", "together", "too", "toward", "towards",
    "two", "under", "until", "up", "upon", "us", "very", "via", "was", "way", "we", "well",
    "went", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereas",
    "whereby", "wherein", "wherever", "whether", "which", "while", "who", "whoever", "whole",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "yourself", "yourselves",
];

/// The default stopword set, built on first use and never mutated afterwards.
pub static DEFAULT_STOPWORDS: Lazy<HashSet<String>> =
    Lazy::new(|| ENGLISH.iter().map(|w| (*w).to_string()).collect());
