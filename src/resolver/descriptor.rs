use regex::Regex;

/// Broad element categories extracted from descriptor phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    Link,
    Input,
    Checkbox,
    Radio,
    Dropdown,
    DateRange,
    Tab,
    Menu,
}

impl ElementKind {
    /// Role strings a node may carry for this kind.
    pub fn roles(&self) -> &'static [&'static str] {
        match self {
            ElementKind::Button => &["button"],
            ElementKind::Link => &["link", "anchor"],
            ElementKind::Input => &["input", "textbox", "textarea"],
            ElementKind::Checkbox => &["checkbox"],
            ElementKind::Radio => &["radio"],
            ElementKind::Dropdown => &["select", "combobox", "dropdown"],
            ElementKind::DateRange => &["daterange", "datepicker"],
            ElementKind::Tab => &["tab"],
            ElementKind::Menu => &["menu", "menuitem"],
        }
    }

    pub fn matches_role(&self, role: &str) -> bool {
        let role = role.to_lowercase();
        self.roles().iter().any(|r| *r == role)
    }
}

/// Kind keywords recognized inside descriptor phrases, longest first so
/// "radio button" wins over "button".
const KIND_KEYWORDS: [(&str, ElementKind); 15] = [
    ("radio button", ElementKind::Radio),
    ("check box", ElementKind::Checkbox),
    ("combo box", ElementKind::Dropdown),
    ("text box", ElementKind::Input),
    ("date range", ElementKind::DateRange),
    ("datepicker", ElementKind::DateRange),
    ("checkbox", ElementKind::Checkbox),
    ("dropdown", ElementKind::Dropdown),
    ("button", ElementKind::Button),
    ("field", ElementKind::Input),
    ("input", ElementKind::Input),
    ("link", ElementKind::Link),
    ("radio", ElementKind::Radio),
    ("menu", ElementKind::Menu),
    ("tab", ElementKind::Tab),
];

/// The natural-language phrase naming a UI target, analyzed into the parts
/// the strategies consume. Ephemeral: built per step, never retained.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Phrase as written in the step
    pub raw: String,

    /// Residual target text after stripping articles, kind keywords, and
    /// attribute words
    pub target: String,

    /// Element kind named in the phrase ("the blue Login button") or
    /// implied by the action ("... in the Challenge Name field")
    pub kind: Option<ElementKind>,

    /// Color attribute word, if any ("the blue Login button")
    pub color: Option<String>,
}

impl Descriptor {
    /// Analyze a descriptor phrase: pull out the element kind, color
    /// attributes, and articles; whatever remains is the target text.
    pub fn parse(phrase: &str) -> Self {
        let raw = phrase.trim().to_string();
        let mut rest = raw.to_lowercase();

        let mut kind = None;
        for (keyword, k) in KIND_KEYWORDS {
            let pattern = Regex::new(&format!(r"\b{}s?\b", regex::escape(keyword))).unwrap();
            if pattern.is_match(&rest) {
                kind = Some(k);
                rest = pattern.replace_all(&rest, " ").into_owned();
                break;
            }
        }

        let color_re =
            Regex::new(r"\b(red|blue|green|yellow|black|white|gray|grey|orange|purple)\b").unwrap();
        let color = color_re
            .captures(&rest)
            .map(|c| c[1].to_string());
        if color.is_some() {
            rest = color_re.replace_all(&rest, " ").into_owned();
        }

        let article_re = Regex::new(r"\b(the|a|an)\b").unwrap();
        rest = article_re.replace_all(&rest, " ").into_owned();

        // Recover original casing of the residual words from the raw phrase
        let kept: Vec<&str> = rest.split_whitespace().collect();
        let target = raw
            .split_whitespace()
            .filter(|w| kept.contains(&w.to_lowercase().trim_matches(|c: char| !c.is_alphanumeric())))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            raw,
            target,
            kind,
            color,
        }
    }

    /// Attach an element kind implied by the action variant when the
    /// phrase itself named none.
    pub fn with_kind_hint(mut self, hint: ElementKind) -> Self {
        if self.kind.is_none() {
            self.kind = Some(hint);
        }
        self
    }
}

/// Normalize text for comparison: lowercase, collapse whitespace, strip
/// punctuation.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token set overlap in [0, 1]: |a ∩ b| / |a ∪ b| over normalized tokens.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    use std::collections::HashSet;
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count() as f64;
    let union = ta.union(&tb).count() as f64;
    inter / union
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_and_color() {
        let d = Descriptor::parse("the blue Login button");
        assert_eq!(d.kind, Some(ElementKind::Button));
        assert_eq!(d.color.as_deref(), Some("blue"));
        assert_eq!(d.target, "Login");
    }

    #[test]
    fn test_parse_field_descriptor() {
        let d = Descriptor::parse("Challenge Name field");
        assert_eq!(d.kind, Some(ElementKind::Input));
        assert_eq!(d.target, "Challenge Name");
    }

    #[test]
    fn test_radio_button_beats_button() {
        let d = Descriptor::parse("Public radio button");
        assert_eq!(d.kind, Some(ElementKind::Radio));
        assert_eq!(d.target, "Public");
    }

    #[test]
    fn test_plain_phrase_has_no_kind() {
        let d = Descriptor::parse("Challenges");
        assert_eq!(d.kind, None);
        assert_eq!(d.target, "Challenges");
    }

    #[test]
    fn test_kind_hint_does_not_override() {
        let d = Descriptor::parse("Save button").with_kind_hint(ElementKind::Input);
        assert_eq!(d.kind, Some(ElementKind::Button));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Challenge   Name! "), "challenge name");
    }

    #[test]
    fn test_token_overlap() {
        assert_eq!(token_overlap("challenge name", "challenge name"), 1.0);
        assert!(token_overlap("challenge name", "challenge period") > 0.0);
        assert_eq!(token_overlap("a b", "c d"), 0.0);
    }
}
