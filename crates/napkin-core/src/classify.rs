//! Semantic Classifier: assigns a flowchart class to each logical node from
//! shape geometry, overridden by text evidence when any is available.

use regex::Regex;

use crate::config::NapkinConfig;
use crate::model::{LogicalNode, SemanticClass, ShapeKind};

/// Text-only classification seam. The keyword-rule implementation is always
/// available; richer linguistic models can be injected behind the same trait
/// and are consulted only when no keyword matches.
pub trait TextClassifier: std::fmt::Debug + Send + Sync {
    /// Classify joined, lowercased label text; `None` when undecided.
    fn classify(&self, text: &str) -> Option<SemanticClass>;
}

/// Ordered `\b`-anchored keyword pattern groups. Evaluation order is fixed
/// (start, end, process, decision, data); the first group with a match wins.
#[derive(Debug)]
pub struct KeywordClassifier {
    groups: Vec<(SemanticClass, Vec<Regex>)>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(&format!(r"(?i)\b{p}\b")).unwrap())
                .collect()
        };
        Self {
            groups: vec![
                (SemanticClass::Start, compile(&["start", "begin", "enter"])),
                (
                    SemanticClass::End,
                    compile(&["end", "stop", "exit", "terminate"]),
                ),
                (
                    SemanticClass::Process,
                    compile(&["process", "execute", "perform", "do", "action"]),
                ),
                (
                    SemanticClass::Decision,
                    compile(&["decision", "if", "condition", "choice", "check"]),
                ),
                (
                    SemanticClass::Data,
                    compile(&["data", "database", "store", "input", "output"]),
                ),
            ],
        }
    }

    /// Whether any keyword of `class` occurs in `text`. Classes without a
    /// keyword group (terminal, connector) never match.
    pub fn matches(&self, class: SemanticClass, text: &str) -> bool {
        self.groups
            .iter()
            .find(|(c, _)| *c == class)
            .is_some_and(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
    }
}

impl TextClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Option<SemanticClass> {
        self.groups
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
            .map(|(class, _)| *class)
    }
}

/// Word-list stand-in for a part-of-speech model: action verbs imply
/// process, start/begin lemmas imply start, end/stop lemmas imply end, and
/// data-ish nouns imply data. Checked token by token, first hit wins.
#[derive(Debug, Default)]
pub struct LexiconClassifier;

const ACTION_VERBS: &[&str] = &[
    "run", "send", "receive", "read", "write", "load", "save", "update", "delete", "create",
    "compute", "calculate", "validate", "fetch", "parse", "print", "display", "submit", "return",
    "call", "wait", "retry", "open", "close", "generate", "verify",
];

const START_LEMMAS: &[&str] = &["start", "starts", "started", "starting", "begin", "begins", "began", "beginning"];

const END_LEMMAS: &[&str] = &["end", "ends", "ended", "ending", "stop", "stops", "stopped", "stopping"];

const DATA_NOUNS: &[&str] = &["data", "database", "file", "record"];

impl TextClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Option<SemanticClass> {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        for token in &tokens {
            let token = token.as_str();
            if ACTION_VERBS.contains(&token) {
                return Some(SemanticClass::Process);
            }
            if START_LEMMAS.contains(&token) {
                return Some(SemanticClass::Start);
            }
            if END_LEMMAS.contains(&token) {
                return Some(SemanticClass::End);
            }
        }
        if tokens.iter().any(|t| DATA_NOUNS.contains(&t.as_str())) {
            return Some(SemanticClass::Data);
        }
        None
    }
}

/// Shape-geometry default, used when text gives no signal.
pub fn shape_default(shape: ShapeKind) -> SemanticClass {
    match shape {
        ShapeKind::Circle | ShapeKind::Oval => SemanticClass::Terminal,
        ShapeKind::Rectangle => SemanticClass::Process,
        ShapeKind::Diamond => SemanticClass::Decision,
        ShapeKind::Polygon => SemanticClass::Data,
        ShapeKind::Triangle | ShapeKind::Unknown => SemanticClass::Connector,
    }
}

#[derive(Debug)]
pub struct SemanticClassifier {
    keywords: KeywordClassifier,
    fallback: Option<Box<dyn TextClassifier>>,
}

impl SemanticClassifier {
    pub fn new(fallback: Option<Box<dyn TextClassifier>>) -> Self {
        Self {
            keywords: KeywordClassifier::new(),
            fallback,
        }
    }

    pub fn from_config(config: &NapkinConfig) -> Self {
        let fallback: Option<Box<dyn TextClassifier>> = if config.use_lexicon_fallback {
            Some(Box::new(LexiconClassifier))
        } else {
            None
        };
        Self::new(fallback)
    }

    /// Set `semantic_class` and `confidence` on every node.
    pub fn classify_nodes(&self, nodes: &mut [LogicalNode]) {
        for node in nodes.iter_mut() {
            let (class, confidence) = self.classify_node(node);
            node.semantic_class = Some(class);
            node.confidence = confidence;
        }
    }

    fn classify_node(&self, node: &LogicalNode) -> (SemanticClass, f64) {
        let base = shape_default(node.shape);

        if node.labels.is_empty() {
            // No textual evidence at all: keep the shape default with a flat
            // middle-of-the-road confidence.
            return (base, 0.5);
        }

        let text = node.label_text().to_lowercase();
        let class = self
            .keywords
            .classify(&text)
            .or_else(|| self.fallback.as_ref().and_then(|f| f.classify(&text)))
            .unwrap_or(base);

        (class, self.confidence(class, node.labels.len(), &text))
    }

    /// `0.3 * label_count_score + 0.7 * keyword_score`, where the keyword
    /// score is 0.95 when the winning class's keywords match the text and
    /// 0.5 otherwise.
    fn confidence(&self, class: SemanticClass, label_count: usize, text: &str) -> f64 {
        let label_count_score = (label_count as f64 / 3.0).min(1.0);
        let keyword_score = if self.keywords.matches(class, text) {
            0.95
        } else {
            0.5
        };
        0.3 * label_count_score + 0.7 * keyword_score
    }
}
