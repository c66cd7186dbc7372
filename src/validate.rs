use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use regex::Regex;
use rustpython_parser::{Mode, parse};

const JS_TS_KEYWORDS: &[&str] = &[
    "function",
    "class",
    "interface",
    "export",
    "const",
    "let",
    "var",
];
const GO_KEYWORDS: &[&str] = &["func", "type", "var", "const", "package"];
const JAVA_KEYWORDS: &[&str] = &["class", "public", "private", "protected", "interface"];

static JS_TS_CONSTRUCTS: LazyLock<Regex> = LazyLock::new(|| keyword_regex(JS_TS_KEYWORDS));
static GO_CONSTRUCTS: LazyLock<Regex> = LazyLock::new(|| keyword_regex(GO_KEYWORDS));
static JAVA_CONSTRUCTS: LazyLock<Regex> = LazyLock::new(|| keyword_regex(JAVA_KEYWORDS));

fn keyword_regex(keywords: &[&str]) -> Regex {
    let pattern = format!(r"\b(?:{})\b", keywords.join("|"));
    Regex::new(&pattern).unwrap_or_else(|err| panic!("invalid keyword pattern {pattern}: {err}"))
}

/// Advisory outcome of a content check. It never blocks delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub reason: String,
}

impl ValidationVerdict {
    fn valid(reason: impl Into<String>) -> Self {
        Self {
            valid: true,
            reason: reason.into(),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
}

impl Language {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" => Some(Self::Python),
            "javascript" => Some(Self::JavaScript),
            "typescript" => Some(Self::TypeScript),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    fn checker(self) -> fn(&str) -> ValidationVerdict {
        match self {
            Self::Python => check_python,
            Self::JavaScript | Self::TypeScript => check_js_ts,
            Self::Go => check_go,
            Self::Java => check_java,
        }
    }
}

/// Cheap per-language sanity check of generated code.
///
/// Tags outside [`Language`] are not checked at all and come back valid, so a
/// `true` verdict for an unknown tag says nothing about the content.
pub fn validate(content: &str, language: &str) -> ValidationVerdict {
    if content.trim().is_empty() {
        return ValidationVerdict::invalid("Empty content");
    }

    match Language::from_tag(language) {
        Some(lang) => (lang.checker())(content),
        None => ValidationVerdict::valid(format!("No validator for language '{language}'")),
    }
}

fn check_python(content: &str) -> ValidationVerdict {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        parse(content, Mode::Module, "<generated>")
    }));
    match outcome {
        Ok(Ok(_)) => ValidationVerdict::valid("Valid"),
        Ok(Err(err)) => ValidationVerdict::invalid(format!("Syntax error: {err}")),
        Err(_) => ValidationVerdict::invalid("Validation error: Python parser aborted"),
    }
}

fn check_keywords(content: &str, constructs: &Regex, label: &str) -> ValidationVerdict {
    if constructs.is_match(content) {
        ValidationVerdict::valid("Valid")
    } else {
        ValidationVerdict::invalid(format!("No valid {label} constructs found"))
    }
}

fn check_js_ts(content: &str) -> ValidationVerdict {
    check_keywords(content, &JS_TS_CONSTRUCTS, "JS/TS")
}

fn check_go(content: &str) -> ValidationVerdict {
    check_keywords(content, &GO_CONSTRUCTS, "Go")
}

fn check_java(content: &str) -> ValidationVerdict {
    check_keywords(content, &JAVA_CONSTRUCTS, "Java")
}

#[cfg(test)]
mod tests {
    use super::{Language, ValidationVerdict, validate};

    fn invalid(reason: &str) -> ValidationVerdict {
        ValidationVerdict {
            valid: false,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn empty_or_blank_content_is_invalid_for_any_language() {
        assert_eq!(validate("", "python"), invalid("Empty content"));
        assert_eq!(validate("  \n\t", "go"), invalid("Empty content"));
        assert_eq!(validate("", "cobol"), invalid("Empty content"));
    }

    #[test]
    fn python_accepts_parseable_source() {
        assert!(validate("def f(): pass", "python").valid);
        let module = "class Calculator:\n    def add(self, a, b):\n        return a + b\n";
        assert!(validate(module, "Python").valid);
    }

    #[test]
    fn python_reports_syntax_errors() {
        let verdict = validate("def f(:", "python");
        assert!(!verdict.valid);
        assert!(
            verdict.reason.starts_with("Syntax error:"),
            "unexpected reason: {}",
            verdict.reason
        );
    }

    #[test]
    fn python_rejects_markdown_fenced_output() {
        let fenced = "```python\ndef f():\n    return 1\n```";
        assert!(!validate(fenced, "python").valid);
    }

    #[test]
    fn go_requires_a_go_construct() {
        assert_eq!(
            validate("blah blah", "go"),
            invalid("No valid Go constructs found")
        );
        assert!(validate("package main\nfunc main(){}", "go").valid);
    }

    #[test]
    fn js_and_ts_share_keyword_check() {
        assert!(validate("export function sum(xs) { return 0; }", "javascript").valid);
        assert!(validate("interface Config { apiUrl: string }", "TypeScript").valid);
        assert_eq!(
            validate("hello world", "typescript"),
            invalid("No valid JS/TS constructs found")
        );
    }

    #[test]
    fn keywords_must_match_whole_words() {
        assert_eq!(
            validate("classification functional", "javascript"),
            invalid("No valid JS/TS constructs found")
        );
        assert_eq!(
            validate("funcy typewriter", "go"),
            invalid("No valid Go constructs found")
        );
    }

    #[test]
    fn java_requires_a_java_construct() {
        assert!(validate("public class Main {}", "java").valid);
        assert_eq!(
            validate("int x = 1;", "java"),
            invalid("No valid Java constructs found")
        );
    }

    #[test]
    fn unknown_language_is_vacuously_valid() {
        let verdict = validate("anything at all", "rust");
        assert!(verdict.valid);
        assert_eq!(verdict.reason, "No validator for language 'rust'");
    }

    #[test]
    fn language_tags_are_case_insensitive() {
        assert_eq!(Language::from_tag("GO"), Some(Language::Go));
        assert_eq!(Language::from_tag(" java "), Some(Language::Java));
        assert_eq!(Language::from_tag("unknown"), None);
    }
}
