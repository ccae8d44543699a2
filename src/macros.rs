#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`RuleDefinition`](crate::RuleDefinition).
///
/// `category` defaults to `"Mathml"` and `domain` to `"default.default"`.
///
/// ```
/// use speech_rules::{RuleStore, rule};
///
/// let mut store = RuleStore::new();
/// store.define(&rule! {
///     key: "msup",
///     query: "self::msup",
///     text: r#"[n] ./*[1]; [t] "super"; [n] ./*[2]"#,
/// }).unwrap();
/// assert_eq!(store.len(), 1);
/// ```
#[macro_export]
macro_rules! rule {
    (
        key: $key:expr
        $(, category: $category:expr)?
        $(, domain: $domain:expr)?
        , query: $query:expr
        $(, constraints: [ $($cstr:expr),* $(,)? ])?
        , text: $text:expr
        $(,)?
    ) => {{
        #[allow(unused_mut, unused_assignments)]
        let mut category: &'static str = "Mathml";
        $(category = $category;)?
        #[allow(unused_mut, unused_assignments)]
        let mut domain: &'static str = "default.default";
        $(domain = $domain;)?
        $crate::RuleDefinition {
            key: $key,
            category,
            domain,
            text: $text,
            query: $query,
            constraints: &[ $($($cstr),*)? ],
        }
    }};
}
