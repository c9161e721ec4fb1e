//! Inclusion policy: keyword classification and the major-festival filter
//!
//! Classification data lives in the tables below; the functions only walk them.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::{Category, DestinationSettings, FestivalEvent};

/// Keywords per category, matched as whole words against the lower-cased name.
/// Earlier rows win when a name matches more than one category.
pub const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Hindu,
        &[
            "diwali",
            "deepavali",
            "holi",
            "holika",
            "navratri",
            "navaratri",
            "durga",
            "dussehra",
            "dasara",
            "vijaya dashami",
            "janmashtami",
            "ganesh",
            "ganesha",
            "chaturthi",
            "raksha bandhan",
            "rakhi",
            "pongal",
            "sankranti",
            "onam",
            "shivaratri",
            "ram navami",
            "rama navami",
            "karva chauth",
            "chhath",
            "lohri",
            "ugadi",
            "gudi padwa",
            "vaisakhi",
            "baisakhi",
            "bhai dooj",
            "bhai duj",
            "govardhan",
            "dhanteras",
            "hanuman",
            "vasant panchami",
            "basant panchami",
            "guru purnima",
            "rath yatra",
            "hindu",
        ],
    ),
    (
        Category::Muslim,
        &[
            "eid",
            "id-ul",
            "id ul",
            "idul",
            "bakrid",
            "bakri id",
            "ramadan",
            "ramzan",
            "muharram",
            "ashura",
            "milad",
            "mawlid",
            "prophet",
            "shab-e-barat",
            "shab e barat",
            "shab-e-qadr",
            "laylat al-qadr",
            "jamat ul-vida",
            "hijri",
            "islamic",
        ],
    ),
    (
        Category::Christian,
        &[
            "christmas",
            "easter",
            "good friday",
            "holy saturday",
            "maundy thursday",
            "palm sunday",
            "ash wednesday",
            "lent",
            "advent",
            "pentecost",
            "epiphany",
            "ascension",
            "assumption",
            "all saints",
            "all souls",
            "christ",
        ],
    ),
];

/// Name fragments that always count as a major festival
pub const MAJOR_ALLOW_LIST: &[&str] = &[
    "diwali",
    "deepavali",
    "holi",
    "navratri",
    "dussehra",
    "janmashtami",
    "ganesh chaturthi",
    "raksha bandhan",
    "pongal",
    "makar sankranti",
    "onam",
    "maha shivaratri",
    "ram navami",
    "eid",
    "id-ul",
    "bakrid",
    "ramadan",
    "muharram",
    "milad",
    "christmas",
    "easter",
    "good friday",
];

/// Primary-type fragments that mark a religious or cultural classification
pub const RELIGIOUS_PRIMARY_TYPES: &[&str] = &[
    "religious",
    "hinduism",
    "hindu",
    "muslim",
    "islam",
    "christian",
    "christianity",
    "cultural",
];

/// Type-tag fragment marking a minor observance
pub const OBSERVANCE_TAG: &str = "observance";

/// Type-tag fragment marking a national holiday
pub const NATIONAL_HOLIDAY_TAG: &str = "national holiday";

static CATEGORY_PATTERNS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| (*category, keyword_pattern(keywords)))
        .collect()
});

static MAJOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| keyword_pattern(MAJOR_ALLOW_LIST));

fn keyword_pattern(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    // Built from escaped literals, so it always compiles.
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("keyword table compiles")
}

/// Map an event name to its category, if any keyword matches
pub fn classify(name: &str) -> Option<Category> {
    let lowered = name.to_lowercase();
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&lowered))
        .map(|(category, _)| *category)
}

/// Whether an event is significant enough for a major-only destination
pub fn is_major(event: &FestivalEvent) -> bool {
    let name = event.name.to_lowercase();
    if MAJOR_PATTERN.is_match(&name) {
        return true;
    }

    let tags: Vec<String> = event.type_tags.iter().map(|t| t.to_lowercase()).collect();
    let primary = event.primary_type.to_lowercase();

    let religious = RELIGIOUS_PRIMARY_TYPES
        .iter()
        .any(|fragment| primary.contains(fragment));
    let observance = tags.iter().any(|t| t.contains(OBSERVANCE_TAG));
    if religious && !observance {
        return true;
    }

    tags.iter().any(|t| t.contains(NATIONAL_HOLIDAY_TAG))
}

/// Events a destination wants today, paired with their category
pub fn select_for(
    events: &[FestivalEvent],
    settings: &DestinationSettings,
) -> Vec<(FestivalEvent, Category)> {
    events
        .iter()
        .filter_map(|event| {
            let category = classify(&event.name)?;
            if !settings.categories.contains(&category) {
                return None;
            }
            if settings.major_only && !is_major(event) {
                return None;
            }
            Some((event.clone(), category))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn event(name: &str, tags: &[&str], primary: &str) -> FestivalEvent {
        FestivalEvent {
            name: name.to_string(),
            description: String::new(),
            type_tags: tags.iter().map(|t| t.to_string()).collect(),
            primary_type: primary.to_string(),
        }
    }

    fn settings(categories: &[Category], major_only: bool) -> DestinationSettings {
        DestinationSettings {
            categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            major_only,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_every_keyword_maps_to_its_category() {
        for (category, keywords) in CATEGORY_KEYWORDS {
            for keyword in *keywords {
                let name = format!("Festival of {}", keyword.to_uppercase());
                let found = classify(&name);
                // A keyword may also appear in an earlier row; it must still classify.
                assert!(found.is_some(), "{} did not classify", keyword);
                if found != Some(*category) {
                    let earlier = CATEGORY_KEYWORDS
                        .iter()
                        .take_while(|(c, _)| c != category)
                        .any(|(_, ks)| ks.iter().any(|k| name.to_lowercase().contains(k)));
                    assert!(earlier, "{} classified as {:?}", keyword, found);
                }
            }
        }
    }

    #[test]
    fn test_classify_known_names() {
        assert_eq!(classify("Diwali/Deepavali"), Some(Category::Hindu));
        assert_eq!(classify("Id-ul-Fitr (Eid)"), Some(Category::Muslim));
        assert_eq!(classify("Christmas Day"), Some(Category::Christian));
        assert_eq!(classify("Good Friday"), Some(Category::Christian));
    }

    #[test]
    fn test_classify_unmatched_is_none() {
        assert_eq!(classify("Republic Day"), None);
        assert_eq!(classify("Bank Holiday"), None);
        assert_eq!(classify("Valentine's Day"), None);
    }

    #[test]
    fn test_classify_requires_whole_words() {
        // "holi" must not match inside "holiday"
        assert_eq!(classify("Public holiday"), None);
    }

    #[test]
    fn test_is_major_allow_list_ignores_other_fields() {
        for entry in MAJOR_ALLOW_LIST {
            let e = event(&format!("Day of {}", entry), &["Observance"], "Observance");
            assert!(is_major(&e), "{} should be major", entry);
        }
    }

    #[test]
    fn test_is_major_allow_list_requires_whole_words() {
        // "holi" inside "holiday" is not Holi
        let e = event("Chhath Puja Holiday", &["Observance"], "Observance");
        assert!(!is_major(&e));

        let e = event("Feid Memorial", &["Observance"], "Observance");
        assert!(!is_major(&e));

        let e = event("Id-ul-Fitr (Eid)", &["Observance"], "Observance");
        assert!(is_major(&e));
    }

    #[test]
    fn test_is_major_religious_primary_type_without_observance() {
        let e = event("Guru Purnima", &["Hinduism"], "Hinduism");
        assert!(is_major(&e));

        let observed = event("Guru Purnima", &["Observance", "Hinduism"], "Hinduism");
        assert!(!is_major(&observed));
    }

    #[test]
    fn test_is_major_national_holiday_tag() {
        let e = event("Some Feast", &["National holiday"], "");
        assert!(is_major(&e));
    }

    #[test]
    fn test_is_major_defaults_to_false() {
        let e = event("Chhath Puja", &["Restricted Holiday"], "Restricted Holiday");
        assert!(!is_major(&e));
    }

    #[test]
    fn test_select_for_only_enabled_categories() {
        let events = vec![
            event("Diwali", &["Gazetted Holiday"], "Gazetted Holiday"),
            event("Eid al-Fitr", &["Gazetted Holiday"], "Gazetted Holiday"),
            event("Christmas", &["Gazetted Holiday"], "Gazetted Holiday"),
            event("Republic Day", &["National holiday"], "National holiday"),
        ];

        for major_only in [true, false] {
            let selected = select_for(&events, &settings(&[Category::Hindu], major_only));
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].0.name, "Diwali");
            assert_eq!(selected[0].1, Category::Hindu);
        }
    }

    #[test]
    fn test_select_for_major_only_drops_minor_events() {
        let events = vec![event("Chhath Puja", &["Restricted Holiday"], "Restricted Holiday")];

        assert!(select_for(&events, &settings(&Category::ALL, true)).is_empty());
        assert_eq!(select_for(&events, &settings(&Category::ALL, false)).len(), 1);
    }
}
