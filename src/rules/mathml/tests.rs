use crate::engine::test_support::{TestEval, node};
use crate::rules::mathml::{self, CUBE_CONSTRAINTS, SQUARE_CONSTRAINTS};
use crate::{ComponentKind, Fallback, RuleStore};

#[test]
fn default_rules_load_cleanly() {
    let store = mathml::store();
    let stats = store.stats();

    assert!(stats.is_clean(), "{:?}", stats.errors);
    assert_eq!(stats.defined, mathml::get().len());
    assert_eq!(stats.aliases, mathml::ALIASES.len());
    assert_eq!(store.len(), mathml::get().len() + mathml::ALIASES.len());
    assert!(store.missing_defaults().is_empty(), "{:?}", store.missing_defaults());
}

#[test]
fn element_rules_by_tag() {
    let store = RuleStore::mathml();
    let eval = TestEval::holding(&[]);

    // (tag, expected key, first component kind)
    let cases: Vec<(&str, &str, ComponentKind)> = vec![
        ("math", "math", ComponentKind::Multi),
        ("semantics", "semantics", ComponentKind::Node),
        ("mrow", "mrow", ComponentKind::Multi),
        ("mi", "mi", ComponentKind::Node),
        ("mn", "mn", ComponentKind::Node),
        ("mo", "mo", ComponentKind::Node),
        ("mtext", "mtext", ComponentKind::Text),
        ("mspace", "mspace", ComponentKind::Personality),
        ("mfrac", "mfrac", ComponentKind::Personality),
        ("msqrt", "msqrt", ComponentKind::Text),
        ("msub", "msub", ComponentKind::Node),
        ("msup", "msup", ComponentKind::Node),
        ("msubsup", "msubsup", ComponentKind::Node),
        ("mtable", "mtable", ComponentKind::Text),
        ("mtr", "mtr", ComponentKind::Multi),
        ("mstyle", "mrow", ComponentKind::Multi),
        ("mpadded", "mrow", ComponentKind::Multi),
        ("mtd", "mrow", ComponentKind::Multi),
    ];

    for (id, (tag, key, kind)) in cases.into_iter().enumerate() {
        let found = store
            .lookup_rule_verbose(&node(id as u32, tag), "default", "default", &eval)
            .unwrap()
            .unwrap_or_else(|| panic!("no rule for {tag}"));
        assert_eq!(found.key, key, "tag {tag}");
        assert_eq!(found.action.components[0].kind, kind, "tag {tag}");
        assert!(found.fallback.is_empty(), "tag {tag}");
    }
}

#[test]
fn unknown_elements_have_no_rule() {
    let store = mathml::store();
    let eval = TestEval::holding(&[]);
    for tag in ["svg", "annotation", "mglyph"] {
        assert_eq!(store.lookup_rule(&node(0, tag), "default", "default", &eval), Ok(None), "{tag}");
    }
}

#[test]
fn exponent_constraints_pick_square_and_cube() {
    let store = mathml::store();
    let msup = node(1, "msup");

    let cases: Vec<(&[&str], &str, &str)> = vec![
        (&[], "msup", "super"),
        (SQUARE_CONSTRAINTS, "square", "squared"),
        (CUBE_CONSTRAINTS, "cube", "cubed"),
        // Partial match: only two of the three square constraints hold.
        (&SQUARE_CONSTRAINTS[..2], "msup", "super"),
    ];

    for (holding, key, word) in cases {
        let eval = TestEval::holding(holding);
        let found = store.lookup_rule_verbose(&msup, "default", "default", &eval).unwrap().unwrap();
        assert_eq!(found.key, key);
        assert_eq!(found.action.components[1].literal(), Some(word));
    }
}

#[test]
fn binomial_needs_zero_linethickness() {
    let store = mathml::store();
    let frac = node(2, "mfrac");

    let plain = store.lookup_rule_verbose(&frac, "default", "default", &TestEval::holding(&[])).unwrap().unwrap();
    assert_eq!(plain.key, "mfrac");

    let eval = TestEval::holding(&["@linethickness", "@linethickness='0'"]);
    let binomial = store.lookup_rule_verbose(&frac, "default", "default", &eval).unwrap().unwrap();
    assert_eq!(binomial.key, "binomial");
    assert_eq!(binomial.candidates, 2);
}

#[test]
fn mathspeak_tables_add_styles() {
    let store = mathml::store();
    let eval = TestEval::holding(&[]);

    // (tag, domain, style, second literal word, fallback)
    let cases: Vec<(&str, &str, &str, Option<&str>, Fallback)> = vec![
        ("mfrac", "mathspeak", "default", Some("StartFraction"), Fallback::empty()),
        ("mfrac", "mathspeak", "brief", Some("StartFrac"), Fallback::empty()),
        ("msub", "mathspeak", "brief", Some("Sub"), Fallback::empty()),
        ("msup", "mathspeak", "default", Some("Superscript"), Fallback::empty()),
        // No clearspeak domain anywhere: default.default.
        ("msup", "clearspeak", "default", Some("super"), Fallback::DOMAIN),
        // mathspeak.verbose is not defined: default.verbose is missing too.
        ("mi", "mathspeak", "verbose", None, Fallback::DOMAIN | Fallback::STYLE),
    ];

    for (tag, domain, style, word, fallback) in cases {
        let found = store.lookup_rule_verbose(&node(3, tag), domain, style, &eval).unwrap().unwrap();
        let spoken = found.action.iter().find_map(|c| c.literal());
        assert_eq!(spoken, word, "{tag} {domain}.{style}");
        assert_eq!(found.fallback, fallback, "{tag} {domain}.{style}");
    }
}

#[test]
fn brief_square_comes_from_tables() {
    let store = mathml::store();
    let eval = TestEval::holding(SQUARE_CONSTRAINTS);

    let brief = store.lookup_rule(&node(1, "msup"), "mathspeak", "brief", &eval).unwrap().unwrap();
    assert_eq!(brief.to_string(), r#"[n] ./*[1]; [t] "squared""#);

    // Domain present, style missing: skips mathspeak.default and uses the
    // default domain.
    let full = store.lookup_rule_verbose(&node(1, "msup"), "mathspeak", "default", &eval).unwrap().unwrap();
    assert_eq!(full.key, "square");
    assert_eq!(full.fallback, Fallback::DOMAIN);
}

#[test]
fn every_printed_rule_parses_back() {
    let store = mathml::store();
    for line in store.print_all_rules() {
        let (_, text) = line.split_once(": ").unwrap();
        let action: crate::Action = text.parse().unwrap();
        assert_eq!(action.to_string(), text, "{line}");
    }
}
