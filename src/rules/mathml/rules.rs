use crate::RuleDefinition;

/// Constraints selecting a two-child `msup` whose exponent is the number 2.
pub const SQUARE_CONSTRAINTS: &[&str] = &["count(./*)=2", "name(./*[2])='mn'", "./*[2]/text()='2'"];

/// Same shape as [`SQUARE_CONSTRAINTS`], exponent 3.
pub const CUBE_CONSTRAINTS: &[&str] = &["count(./*)=2", "name(./*[2])='mn'", "./*[2]/text()='3'"];

/// Elements that are read exactly like `mrow`.
pub const ALIASES: [(&str, &str); 5] = [
    ("mrow", "self::mathml:mstyle"),
    ("mrow", "self::mathml:mpadded"),
    ("mrow", "self::mathml:merror"),
    ("mrow", "self::mathml:mphantom"),
    ("mrow", "self::mathml:mtd"),
];

// Containers

fn rule_math() -> RuleDefinition {
    rule! { key: "math", query: "self::mathml:math", text: "[m] ./*" }
}

fn rule_semantics() -> RuleDefinition {
    rule! { key: "semantics", query: "self::mathml:semantics", text: "[n] ./*[1]" }
}

fn rule_mrow() -> RuleDefinition {
    rule! { key: "mrow", query: "self::mathml:mrow", text: "[m] ./*" }
}

fn rule_mfenced() -> RuleDefinition {
    rule! {
        key: "mfenced",
        query: "self::mathml:mfenced",
        text: r#"[t] "open"; [m] ./* (separator:"comma"); [t] "close""#,
    }
}

fn rule_menclose() -> RuleDefinition {
    rule! { key: "menclose", query: "self::mathml:menclose", text: r#"[t] "enclosed"; [m] ./*; [p] (pause:200)"# }
}

// Tokens

fn rule_mi() -> RuleDefinition {
    rule! { key: "mi", query: "self::mathml:mi", text: "[n] text()" }
}

fn rule_mn() -> RuleDefinition {
    rule! { key: "mn", query: "self::mathml:mn", text: "[n] text()" }
}

fn rule_mo() -> RuleDefinition {
    rule! { key: "mo", query: "self::mathml:mo", text: "[n] text() (rate:-0.1)" }
}

fn rule_mtext() -> RuleDefinition {
    rule! { key: "mtext", query: "self::mathml:mtext", text: "[t] text() (pause:100)" }
}

fn rule_ms() -> RuleDefinition {
    rule! { key: "ms", query: "self::mathml:ms", text: r#"[t] "string"; [t] text() (pause:100)"# }
}

fn rule_mspace() -> RuleDefinition {
    rule! { key: "mspace", query: "self::mathml:mspace", text: "[p] (pause:250)" }
}

// Scripts and layout

fn rule_mfrac() -> RuleDefinition {
    rule! {
        key: "mfrac",
        query: "self::mathml:mfrac",
        text: r#"[p] (pause:400); [n] ./*[1] (pitch:0.3); [t] "divided by"; [n] ./*[2] (pitch:-0.3); [p] (pause:400)"#,
    }
}

fn rule_binomial() -> RuleDefinition {
    rule! {
        key: "binomial",
        query: "self::mathml:mfrac",
        constraints: ["@linethickness", "@linethickness='0'"],
        text: r#"[n] ./*[1]; [t] "choose"; [n] ./*[2]; [p] (pause:300)"#,
    }
}

fn rule_msqrt() -> RuleDefinition {
    rule! {
        key: "msqrt",
        query: "self::mathml:msqrt",
        text: r#"[t] "Square root of"; [m] ./* (rate:0.2); [p] (pause:400)"#,
    }
}

fn rule_mroot() -> RuleDefinition {
    rule! {
        key: "mroot",
        query: "self::mathml:mroot",
        text: r#"[t] "root of order"; [n] ./*[2]; [t] "over"; [n] ./*[1] (rate:0.2); [p] (pause:400)"#,
    }
}

fn rule_msub() -> RuleDefinition {
    rule! {
        key: "msub",
        query: "self::mathml:msub",
        text: r#"[n] ./*[1]; [t] "sub"; [n] ./*[2] (pitch:-0.35); [p] (pause:300)"#,
    }
}

fn rule_msup() -> RuleDefinition {
    rule! {
        key: "msup",
        query: "self::mathml:msup",
        text: r#"[n] ./*[1]; [t] "super"; [n] ./*[2] (pitch:0.35); [p] (pause:300)"#,
    }
}

fn rule_square() -> RuleDefinition {
    RuleDefinition {
        constraints: SQUARE_CONSTRAINTS,
        ..rule! {
            key: "square",
            query: "self::mathml:msup",
            text: r#"[n] ./*[1]; [t] "squared" (pitch:0.35); [p] (pause:300)"#,
        }
    }
}

fn rule_cube() -> RuleDefinition {
    RuleDefinition {
        constraints: CUBE_CONSTRAINTS,
        ..rule! {
            key: "cube",
            query: "self::mathml:msup",
            text: r#"[n] ./*[1]; [t] "cubed" (pitch:0.35); [p] (pause:300)"#,
        }
    }
}

fn rule_msubsup() -> RuleDefinition {
    rule! {
        key: "msubsup",
        query: "self::mathml:msubsup",
        text: r#"[n] ./*[1]; [t] "sub"; [n] ./*[2] (pitch:-0.35); [p] (pause:200); [t] "super"; [n] ./*[3] (pitch:0.35); [p] (pause:300)"#,
    }
}

fn rule_munder() -> RuleDefinition {
    rule! {
        key: "munder",
        query: "self::mathml:munder",
        text: r#"[n] ./*[1]; [t] "under"; [n] ./*[2] (pitch:-0.35); [p] (pause:300)"#,
    }
}

fn rule_mover() -> RuleDefinition {
    rule! {
        key: "mover",
        query: "self::mathml:mover",
        text: r#"[n] ./*[1]; [t] "over"; [n] ./*[2] (pitch:0.35); [p] (pause:300)"#,
    }
}

fn rule_munderover() -> RuleDefinition {
    rule! {
        key: "munderover",
        query: "self::mathml:munderover",
        text: r#"[n] ./*[1]; [t] "under and"; [n] ./*[2] (pitch:-0.35); [t] "over"; [n] ./*[3] (pitch:0.35); [p] (pause:400)"#,
    }
}

// Tables

fn rule_mtable() -> RuleDefinition {
    rule! {
        key: "mtable",
        query: "self::mathml:mtable",
        text: r#"[t] "matrix"; [m] ./* (ctxtfunc:nodeCounter, context:"row", pause:100)"#,
    }
}

fn rule_mtr() -> RuleDefinition {
    rule! { key: "mtr", query: "self::mathml:mtr", text: r#"[m] ./* (ctxtfunc:nodeCounter, context:"column", pause:100)"# }
}

/// All default MathML rule definitions, in registration order.
pub fn get() -> Vec<RuleDefinition> {
    vec![
        rule_math(),
        rule_semantics(),
        rule_mrow(),
        rule_mfenced(),
        rule_menclose(),
        rule_mi(),
        rule_mn(),
        rule_mo(),
        rule_mtext(),
        rule_ms(),
        rule_mspace(),
        rule_mfrac(),
        rule_binomial(),
        rule_msqrt(),
        rule_mroot(),
        rule_msub(),
        rule_msup(),
        rule_square(),
        rule_cube(),
        rule_msubsup(),
        rule_munder(),
        rule_mover(),
        rule_munderover(),
        rule_mtable(),
        rule_mtr(),
    ]
}
