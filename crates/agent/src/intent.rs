//! Intent Matchers
//!
//! Fixed-pattern classification of inbound text. Every matcher expects
//! normalized text (see [`normalize`]) and is a pure function.

use once_cell::sync::Lazy;
use regex::Regex;

use chat_agent_core::{MenuOption, PlanKind};

static MENU_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^menu$").unwrap());

static AFFIRMATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(sim|s|quero|claro|ok|blz|beleza|bora|vamos|perfeito|top|quero sim|yes|yep)\b")
        .unwrap()
});

static NEGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(n[ãa]o|nao|n|agora n[ãa]o|depois|prefiro n[ãa]o|negativo)\b").unwrap()
});

/// Plan-name patterns in priority order; the first match wins
static PLAN_PATTERNS: Lazy<Vec<(PlanKind, Regex)>> = Lazy::new(|| {
    PlanKind::PRIORITY
        .iter()
        .map(|kind| {
            let pattern = match kind {
                PlanKind::Starter => r"(?i)iniciante",
                PlanKind::Fighter => r"(?i)lutador",
                PlanKind::Champion => r"(?i)campe(ã|a)o",
                PlanKind::GymPassPartner => {
                    r"(?i)gympass|wellhub|welhub|gimpass|ginpass|ginpas|gympas|gimpas"
                },
            };
            (*kind, Regex::new(pattern).unwrap())
        })
        .collect()
});

/// Answer to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmative,
    Negative,
    /// Neither vocabulary matched; the caller re-prompts
    Unclear,
}

/// Trim and lower-case inbound text
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Exact match on the menu keyword
pub fn is_menu_keyword(text: &str) -> bool {
    MENU_KEYWORD.is_match(text)
}

pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE.is_match(text)
}

pub fn is_negative(text: &str) -> bool {
    NEGATIVE.is_match(text)
}

/// Classify a yes/no answer. Affirmative wins when both vocabularies match.
pub fn classify_confirmation(text: &str) -> Confirmation {
    if is_affirmative(text) {
        Confirmation::Affirmative
    } else if is_negative(text) {
        Confirmation::Negative
    } else {
        Confirmation::Unclear
    }
}

/// True iff the text is exactly one menu digit (0-6)
pub fn is_numeric_option(text: &str) -> bool {
    parse_menu_option(text).is_some()
}

/// Parse a single menu digit
pub fn parse_menu_option(text: &str) -> Option<MenuOption> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(digit), None) => MenuOption::from_digit(digit),
        _ => None,
    }
}

/// First plan whose name occurs in the text, by fixed priority
pub fn match_plan_name(text: &str) -> Option<PlanKind> {
    PLAN_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(text))
        .map(|(kind, _)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  MeNu \n"), "menu");
        assert_eq!(normalize("Quero o CAMPEÃO"), "quero o campeão");
    }

    #[test]
    fn test_menu_keyword() {
        assert!(is_menu_keyword("menu"));
        assert!(is_menu_keyword("MENU"));
        assert!(!is_menu_keyword("o menu"));
        assert!(!is_menu_keyword("menus"));
        assert!(!is_menu_keyword("/menu"));
    }

    #[test]
    fn test_affirmative_vocabulary() {
        let affirmatives = [
            "sim", "s", "quero", "claro", "ok", "beleza", "bora", "yes", "pode ser, sim!",
        ];
        for text in affirmatives {
            assert!(is_affirmative(text), "{text:?} should be affirmative");
        }
        assert!(!is_affirmative("simples"));
        assert!(!is_affirmative("talvez"));
    }

    #[test]
    fn test_negative_vocabulary() {
        for text in ["não", "nao", "n", "depois", "negativo", "agora não"] {
            assert!(is_negative(text), "{text:?} should be negative");
        }
        assert!(!is_negative("nada"));
        assert!(!is_negative("talvez"));
    }

    #[test]
    fn test_confirmation_is_exhaustive() {
        assert_eq!(classify_confirmation("sim"), Confirmation::Affirmative);
        assert_eq!(classify_confirmation("não"), Confirmation::Negative);
        assert_eq!(classify_confirmation("talvez amanhã"), Confirmation::Unclear);
        assert_eq!(classify_confirmation(""), Confirmation::Unclear);
        // both vocabularies present
        assert_eq!(classify_confirmation("não, quero"), Confirmation::Affirmative);
    }

    #[test]
    fn test_numeric_bounds() {
        for digit in ["0", "1", "2", "3", "4", "5", "6"] {
            assert!(is_numeric_option(digit), "{digit} should be accepted");
        }
        for text in ["7", "8", "9", "-1", "10", "", "a", "1 ", "１"] {
            assert!(!is_numeric_option(text), "{text:?} should be rejected");
        }
        assert_eq!(parse_menu_option("3"), Some(MenuOption::Plans));
    }

    #[test]
    fn test_plan_names() {
        assert_eq!(match_plan_name("quero o iniciante"), Some(PlanKind::Starter));
        assert_eq!(match_plan_name("plano lutador"), Some(PlanKind::Fighter));
        assert_eq!(match_plan_name("quero o campeão"), Some(PlanKind::Champion));
        assert_eq!(match_plan_name("campeao"), Some(PlanKind::Champion));
        assert_eq!(match_plan_name("tenho wellhub"), Some(PlanKind::GymPassPartner));
        assert_eq!(match_plan_name("gimpas"), Some(PlanKind::GymPassPartner));
        assert_eq!(match_plan_name("universitário"), None);
    }

    #[test]
    fn test_plan_priority() {
        assert_eq!(match_plan_name("quero o lutador campeão"), Some(PlanKind::Fighter));
        assert_eq!(match_plan_name("campeão ou iniciante?"), Some(PlanKind::Starter));
        assert_eq!(match_plan_name("gympass campeão"), Some(PlanKind::Champion));
    }
}
