//! Locator strategy generation
//!
//! Five strategies in confidence order:
//! 1. Distilled id - perception-injected identity attribute
//! 2. Test id - stable test-oriented attributes
//! 3. ARIA role - role and accessible name, plus placeholder for text entry
//! 4. Text - exact text, then tag containing text
//! 5. CSS - raw selector hints from perception

use action_primitives::LocatorSpec;
use locus_core_types::{ElementDescriptor, StrategyKind};
use locus_policy_center::LocatorPolicy;
use tracing::debug;

use crate::types::LocatorCandidate;

/// WAI-ARIA roles a role query can be built for.
const KNOWN_ARIA_ROLES: &[&str] = &[
    "alert",
    "alertdialog",
    "application",
    "article",
    "banner",
    "blockquote",
    "button",
    "caption",
    "cell",
    "checkbox",
    "code",
    "columnheader",
    "combobox",
    "complementary",
    "contentinfo",
    "definition",
    "deletion",
    "dialog",
    "directory",
    "document",
    "emphasis",
    "feed",
    "figure",
    "form",
    "generic",
    "grid",
    "gridcell",
    "group",
    "heading",
    "img",
    "insertion",
    "link",
    "list",
    "listbox",
    "listitem",
    "log",
    "main",
    "marquee",
    "math",
    "menu",
    "menubar",
    "menuitem",
    "menuitemcheckbox",
    "menuitemradio",
    "meter",
    "navigation",
    "none",
    "note",
    "option",
    "paragraph",
    "presentation",
    "progressbar",
    "radio",
    "radiogroup",
    "region",
    "row",
    "rowgroup",
    "rowheader",
    "scrollbar",
    "search",
    "searchbox",
    "separator",
    "slider",
    "spinbutton",
    "status",
    "strong",
    "subscript",
    "superscript",
    "switch",
    "tab",
    "table",
    "tablist",
    "tabpanel",
    "term",
    "textbox",
    "time",
    "timer",
    "toolbar",
    "tooltip",
    "tree",
    "treegrid",
    "treeitem",
];

/// Builds the ordered candidate list for one descriptor.
///
/// Generation never touches the page and never fails; unusable fields are
/// skipped.
#[derive(Debug, Clone)]
pub struct StrategyGenerator {
    identity_attributes: Vec<String>,
    test_id_attributes: Vec<String>,
}

impl StrategyGenerator {
    pub fn new(policy: &LocatorPolicy) -> Self {
        Self {
            identity_attributes: policy.identity_attributes.clone(),
            test_id_attributes: policy.test_id_attributes.clone(),
        }
    }

    /// Candidates for `descriptor`, highest confidence first
    pub fn generate(&self, descriptor: &ElementDescriptor) -> Vec<LocatorCandidate> {
        let mut candidates = Vec::new();
        self.distilled_id(descriptor, &mut candidates);
        self.test_ids(descriptor, &mut candidates);
        aria_role(descriptor, &mut candidates);
        text(descriptor, &mut candidates);
        css_hints(descriptor, &mut candidates);
        candidates
    }

    fn distilled_id(&self, descriptor: &ElementDescriptor, out: &mut Vec<LocatorCandidate>) {
        let found = self
            .identity_attributes
            .iter()
            .find_map(|key| descriptor.attribute(key).map(|value| (key, value)));
        if let Some((key, value)) = found {
            out.push(LocatorCandidate::new(
                StrategyKind::DistilledId,
                LocatorSpec::attribute(key, value),
            ));
        }
    }

    fn test_ids(&self, descriptor: &ElementDescriptor, out: &mut Vec<LocatorCandidate>) {
        for key in &self.test_id_attributes {
            if let Some(value) = descriptor.attribute(key) {
                out.push(LocatorCandidate::new(
                    StrategyKind::TestId,
                    LocatorSpec::attribute(key, value),
                ));
            }
        }
    }
}

impl Default for StrategyGenerator {
    fn default() -> Self {
        Self::new(&locus_policy_center::PolicyView::default().locator)
    }
}

fn aria_role(descriptor: &ElementDescriptor, out: &mut Vec<LocatorCandidate>) {
    let Some(role) = descriptor.role.as_deref() else {
        return;
    };

    let role = role.trim().to_ascii_lowercase();
    if is_known_role(&role) {
        let name = descriptor
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        out.push(LocatorCandidate::new(
            StrategyKind::AriaRole,
            LocatorSpec::Role { role, name },
        ));
    } else {
        debug!(
            element_id = %descriptor.element_id,
            role = %role,
            "Skipping unknown ARIA role"
        );
    }

    if descriptor.is_text_entry() {
        if let Some(placeholder) = descriptor.attribute("placeholder") {
            out.push(LocatorCandidate::new(
                StrategyKind::AriaRole,
                LocatorSpec::Placeholder(placeholder.to_string()),
            ));
        }
    }
}

fn text(descriptor: &ElementDescriptor, out: &mut Vec<LocatorCandidate>) {
    let Some(text) = descriptor
        .text
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
    else {
        return;
    };

    out.push(LocatorCandidate::new(
        StrategyKind::Text,
        LocatorSpec::Text {
            text: text.to_string(),
            exact: true,
        },
    ));
    if !descriptor.tag_name.trim().is_empty() {
        out.push(LocatorCandidate::new(
            StrategyKind::Text,
            LocatorSpec::TagWithText {
                tag: descriptor.tag_name.trim().to_ascii_lowercase(),
                text: text.to_string(),
            },
        ));
    }
}

fn css_hints(descriptor: &ElementDescriptor, out: &mut Vec<LocatorCandidate>) {
    for hint in &descriptor.selector_hints {
        let selector = hint.trim();
        if is_well_formed_selector(selector) {
            out.push(LocatorCandidate::new(
                StrategyKind::Css,
                LocatorSpec::Css(selector.to_string()),
            ));
        } else {
            debug!(
                element_id = %descriptor.element_id,
                selector = %hint,
                "Skipping malformed selector hint"
            );
        }
    }
}

/// Check if `role` is a WAI-ARIA role
pub fn is_known_role(role: &str) -> bool {
    KNOWN_ARIA_ROLES.contains(&role)
}

/// Cheap structural check: non-empty, balanced brackets and closed quotes.
pub fn is_well_formed_selector(selector: &str) -> bool {
    if selector.is_empty() {
        return false;
    }

    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in selector.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' | '(' => stack.push(ch),
            ']' => {
                if stack.pop() != Some('[') {
                    return false;
                }
            }
            ')' => {
                if stack.pop() != Some('(') {
                    return false;
                }
            }
            _ => {}
        }
    }

    quote.is_none() && stack.is_empty() && !escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(candidates: &[LocatorCandidate]) -> Vec<StrategyKind> {
        candidates.iter().map(|c| c.kind).collect()
    }

    fn selectors(candidates: &[LocatorCandidate]) -> Vec<String> {
        candidates.iter().map(LocatorCandidate::selector).collect()
    }

    #[test]
    fn full_descriptor_follows_cascade() {
        let descriptor = ElementDescriptor::new("12", "button")
            .with_attribute("id", "submit")
            .with_attribute("data-mark-id", "12")
            .with_attribute("data-testid", "submit-btn")
            .with_attribute("data-qa", "submit")
            .with_role("button")
            .with_name("Submit")
            .with_text("  Submit  ")
            .with_selector_hint("form > button.primary");

        let candidates = StrategyGenerator::default().generate(&descriptor);
        assert_eq!(
            kinds(&candidates),
            vec![
                StrategyKind::DistilledId,
                StrategyKind::TestId,
                StrategyKind::TestId,
                StrategyKind::AriaRole,
                StrategyKind::Text,
                StrategyKind::Text,
                StrategyKind::Css,
            ]
        );
        assert_eq!(
            selectors(&candidates),
            vec![
                "[data-mark-id='12']".to_string(),
                "[data-testid='submit-btn']".to_string(),
                "[data-qa='submit']".to_string(),
                r#"role=button[name="Submit"]"#.to_string(),
                r#"text="Submit""#.to_string(),
                r#"button:has-text("Submit")"#.to_string(),
                "form > button.primary".to_string(),
            ]
        );
    }

    #[test]
    fn identity_stops_at_first_preferred_attribute() {
        let descriptor = ElementDescriptor::new("4", "a")
            .with_attribute("id", "home")
            .with_attribute("data-element-id", "e4");
        let candidates = StrategyGenerator::default().generate(&descriptor);
        assert_eq!(selectors(&candidates), vec!["[data-element-id='e4']"]);
    }

    #[test]
    fn placeholder_variant_for_text_entry() {
        let descriptor = ElementDescriptor::new("q", "input")
            .with_role("searchbox")
            .with_attribute("placeholder", "Search");
        let candidates = StrategyGenerator::default().generate(&descriptor);
        assert_eq!(
            selectors(&candidates),
            vec!["role=searchbox", r#"placeholder="Search""#]
        );
        assert!(candidates
            .iter()
            .all(|c| c.kind == StrategyKind::AriaRole));
    }

    #[test]
    fn skips_unknown_role_and_malformed_hints() {
        let descriptor = ElementDescriptor::new("9", "div")
            .with_role("fancy-widget")
            .with_selector_hint("")
            .with_selector_hint("div[data-x='1'")
            .with_selector_hint("div.card:nth-child(2)");
        let candidates = StrategyGenerator::default().generate(&descriptor);
        assert_eq!(selectors(&candidates), vec!["div.card:nth-child(2)"]);
    }

    #[test]
    fn blank_text_is_ignored() {
        let descriptor = ElementDescriptor::new("1", "span").with_text("   ");
        assert!(StrategyGenerator::default().generate(&descriptor).is_empty());
    }

    #[test]
    fn attribute_lists_follow_policy() {
        let policy = LocatorPolicy {
            identity_attributes: vec!["data-node".into()],
            test_id_attributes: vec!["data-cy".into()],
        };
        let descriptor = ElementDescriptor::new("1", "button")
            .with_attribute("id", "ignored")
            .with_attribute("data-node", "n1")
            .with_attribute("data-cy", "go");
        let candidates = StrategyGenerator::new(&policy).generate(&descriptor);
        assert_eq!(
            selectors(&candidates),
            vec!["[data-node='n1']", "[data-cy='go']"]
        );
    }

    #[test]
    fn selector_check() {
        assert!(is_well_formed_selector("a[href='x]y']"));
        assert!(is_well_formed_selector(r"#id\[1\]"));
        assert!(!is_well_formed_selector("a[href"));
        assert!(!is_well_formed_selector("li:nth-child(2"));
        assert!(!is_well_formed_selector("a[title=\"x]"));
    }
}
