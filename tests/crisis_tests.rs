// tests for crisis phrase detection

use std::io::Write;
use wellbeing_relay::{CrisisCategory, CrisisDetector};

#[test]
fn test_everyday_message_is_not_crisis() {
    let detector = CrisisDetector::default();
    assert!(!detector.classify("hoy comí ensalada"));
    assert!(!detector.classify("me siento un poco cansado después del trabajo"));
}

#[test]
fn test_desire_to_die() {
    let detector = CrisisDetector::default();
    assert!(detector.classify("no quiero vivir"));
    assert_eq!(
        detector.detect("a veces pienso que quiero morir"),
        Some(CrisisCategory::DesireToDie)
    );
}

#[test]
fn test_suicidal_ideation() {
    let detector = CrisisDetector::default();
    assert_eq!(
        detector.detect("he pensado en el suicidio"),
        Some(CrisisCategory::SuicidalIdeation)
    );
    assert!(detector.classify("quiero acabar con mi vida"));
}

#[test]
fn test_self_harm() {
    let detector = CrisisDetector::default();
    assert_eq!(
        detector.detect("tengo ganas de hacerme daño"),
        Some(CrisisCategory::SelfHarm)
    );
}

#[test]
fn test_case_insensitive() {
    let detector = CrisisDetector::default();
    assert!(detector.classify("NO QUIERO VIVIR"));
    assert!(detector.classify("No Quiero Vivir más"));
    assert!(detector.classify("QUIERO HACERME DAÑO"));
}

#[test]
fn test_substring_match_over_triggers() {
    // not whole-word: a phrase inside a longer word still counts
    let detector = CrisisDetector::new([("vivir", CrisisCategory::DesireToDie)]);
    assert!(detector.classify("convivir"));
}

#[test]
fn test_empty_input() {
    let detector = CrisisDetector::default();
    assert!(!detector.classify(""));
    assert_eq!(detector.detect(""), None);
}

#[test]
fn test_every_default_phrase_triggers() {
    let detector = CrisisDetector::default();
    for phrase in [
        "suicidio",
        "quitarme la vida",
        "matarme",
        "lastimarme",
        "cortarme",
        "autolesión",
        "quiero morirme",
        "ya no quiero estar aquí",
    ] {
        assert!(detector.classify(phrase), "{phrase} should trigger");
        assert!(
            detector.classify(&format!("bla bla {} bla", phrase.to_uppercase())),
            "{phrase} should trigger in any case"
        );
    }
}

#[test]
fn test_custom_phrases_replace_defaults() {
    let detector = CrisisDetector::new([("Want To Disappear", CrisisCategory::DesireToDie)]);
    assert_eq!(detector.len(), 1);
    assert!(detector.classify("sometimes I want to disappear"));
    assert!(!detector.classify("no quiero vivir"));
}

#[test]
fn test_blank_phrases_are_ignored() {
    let detector = CrisisDetector::new([
        ("", CrisisCategory::SelfHarm),
        ("   ", CrisisCategory::SelfHarm),
    ]);
    assert!(detector.is_empty());
    assert!(!detector.classify("anything at all"));
}

#[test]
fn test_load_phrases_from_file() {
    let path = std::env::temp_dir().join(format!("relay-phrases-{}.json", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{ "end it all": "suicidal_ideation", "hurt myself": "self_harm" }}"#
    )
    .unwrap();

    let detector = CrisisDetector::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(detector.len(), 2);
    assert_eq!(
        detector.detect("I might HURT MYSELF"),
        Some(CrisisCategory::SelfHarm)
    );
}

#[test]
fn test_phrase_file_with_unknown_category_is_rejected() {
    let path = std::env::temp_dir().join(format!("relay-bad-phrases-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "sad": "mild_sadness" }"#).unwrap();

    let result = CrisisDetector::from_file(&path);
    std::fs::remove_file(&path).ok();

    assert!(result.is_err());
}

#[test]
fn test_missing_phrase_file() {
    let result = CrisisDetector::from_file(std::path::Path::new("/nonexistent/phrases.json"));
    assert!(result.is_err());
}
