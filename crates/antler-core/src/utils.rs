/// Uppercase the first character, leaving the rest untouched.
///
/// # Examples
/// ```
/// use antler_core::utils::capitalize;
/// assert_eq!(capitalize("primaryExpr"), "PrimaryExpr");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generated context type name for a rule or alternative label.
///
/// # Examples
/// ```
/// use antler_core::utils::context_name;
/// assert_eq!(context_name("expr"), "ExprContext");
/// ```
pub fn context_name(name: &str) -> String {
    format!("{}Context", capitalize(name))
}
