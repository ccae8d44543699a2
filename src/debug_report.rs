use speech_rules::{Action, ComponentKind, Fallback, Lookup, PreconditionReport, Result, RuleStore};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

fn section(title: &str, palette: &ansi::Palette) {
    println!("\n{}", palette.paint(format!("━━━ {title} ━━━"), ansi::GRAY));
}

/// Returns false when the text did not parse.
pub fn print_parse(input: &str, parsed: &Result<Action>, color: bool) -> bool {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: {}", input.trim()), ansi::CYAN)));

    let action = match parsed {
        Ok(action) => action,
        Err(err) => {
            section("Error", &palette);
            println!("  {}", palette.paint(err.to_string(), ansi::RED));
            println!();
            return false;
        }
    };

    section("Components", &palette);
    if action.is_empty() {
        println!("{}", palette.dim("  Empty action"));
    }
    for (idx, comp) in action.iter().enumerate() {
        let kind = match comp.kind {
            ComponentKind::Node => "node",
            ComponentKind::Multi => "multi",
            ComponentKind::Text => "text",
            ComponentKind::Personality => "personality",
        };
        println!(
            "  {} {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.paint(format!("{kind:<11}"), ansi::BLUE),
            palette.bold(&comp.content),
        );
        for (name, value) in comp.attributes() {
            println!("      {} {}", palette.dim(format!("{name}:")), palette.paint(value, ansi::YELLOW));
        }
    }

    section("Canonical", &palette);
    println!("  {}", palette.paint(action.to_string(), ansi::GREEN));
    println!();
    true
}

pub fn print_rules(store: &RuleStore, color: bool) {
    let palette = ansi::Palette::new(color);
    for atom in store.atoms() {
        section(&format!("{} ({})", atom.key(), atom.category()), &palette);
        for (domain, style, action) in atom.mappings() {
            println!("  {} {}", palette.paint(format!("{domain}.{style}:"), ansi::BLUE), action);
        }
    }
    println!(
        "\n{} {}  {} {}",
        palette.dim("rules:"),
        palette.paint(store.atoms().count().to_string(), ansi::GREEN),
        palette.dim("preconditions:"),
        palette.paint(store.len().to_string(), ansi::GREEN),
    );
}

/// Returns false when something was skipped or a default is missing.
pub fn print_check(store: &RuleStore, color: bool) -> bool {
    let palette = ansi::Palette::new(color);
    let stats = store.stats();

    section("Load", &palette);
    println!(
        "  {} {}  {} {}  {} {}  {} {}",
        palette.dim("defined:"),
        palette.paint(stats.defined.to_string(), ansi::GREEN),
        palette.dim("aliases:"),
        palette.paint(stats.aliases.to_string(), ansi::GREEN),
        palette.dim("mappings:"),
        palette.paint(stats.mappings.to_string(), ansi::GREEN),
        palette.dim("skipped:"),
        palette.paint(stats.skipped().to_string(), if stats.is_clean() { ansi::GREEN } else { ansi::RED }),
    );
    for (key, err) in &stats.errors {
        println!("  {} {}", palette.paint(key, ansi::YELLOW), palette.dim(err.to_string()));
    }

    section("Defaults", &palette);
    let missing = store.missing_defaults();
    if missing.is_empty() {
        println!("  {}", palette.paint("✓ every rule has a default.default mapping", ansi::GREEN));
    } else {
        for key in &missing {
            println!("  {} {}", palette.paint("✗", ansi::RED), palette.paint(*key, ansi::YELLOW));
        }
    }

    let domains: Vec<&str> = store.all_domains().iter().map(String::as_str).collect();
    let styles: Vec<&str> = store.all_styles().iter().map(String::as_str).collect();
    println!("\n  {} {}", palette.dim("domains:"), domains.join(", "));
    println!("  {} {}", palette.dim("styles:"), styles.join(", "));
    println!();

    stats.is_clean() && missing.is_empty()
}

/// Returns false when no rule was found or resolution failed.
pub fn print_lookup(
    element: &str,
    domain: &str,
    found: &Result<Option<Lookup<'_>>>,
    near_misses: &[PreconditionReport],
    color: bool,
) -> bool {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Lookup: <{element}> in {domain}"), ansi::CYAN)));

    let ok = match found {
        Ok(Some(lookup)) => {
            section("Selected", &palette);
            println!(
                "  {} {}  {} {}",
                palette.bold(palette.paint(lookup.key, ansi::GREEN)),
                palette.dim(format!("entry #{}", lookup.position)),
                palette.dim("│ candidates:"),
                palette.paint(lookup.candidates.to_string(), ansi::YELLOW),
            );
            println!("  {} {}", palette.dim("fallback:"), fallback_label(lookup.fallback));
            println!("  {}", lookup.action);
            true
        }
        Ok(None) => {
            section("Selected", &palette);
            println!("{}", palette.dim("  No rule applies"));
            false
        }
        Err(err) => {
            section("Error", &palette);
            println!("  {}", palette.paint(err.to_string(), ansi::RED));
            false
        }
    };

    if !near_misses.is_empty() {
        section("Preconditions", &palette);
        for report in near_misses {
            let mark = if report.matched() { palette.paint("✓", ansi::GREEN) } else { palette.paint("✗", ansi::RED) };
            for (idx, line) in report.to_string().lines().enumerate() {
                if idx == 0 {
                    println!("  {mark} {line}");
                } else {
                    println!("    {}", palette.dim(line));
                }
            }
        }
    }
    println!();
    ok
}

fn fallback_label(fallback: Fallback) -> &'static str {
    if fallback.contains(Fallback::DOMAIN | Fallback::STYLE) {
        "default.default"
    } else if fallback.contains(Fallback::DOMAIN) {
        "default domain"
    } else if fallback.contains(Fallback::STYLE) {
        "default style"
    } else {
        "none"
    }
}
