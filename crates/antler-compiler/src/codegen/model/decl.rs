//! Declarations placed in rule functions and context structs.

use serde::Serialize;

/// A field, local variable or accessor in generated code.
///
/// Getter variants carry a `signature` flag: the signature form has the same
/// shape and is used for interface and overload declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decl")]
pub enum Decl {
    /// `x=ID` label, or the implicit `_ID` label of a `+=` token.
    TokenDecl { name: String, implicit: bool },
    /// Temporary holding the next token type (`_la`).
    TokenTypeDecl { name: String },
    TokenListDecl { name: String },
    RuleContextDecl {
        name: String,
        ctx_name: String,
        implicit: bool,
    },
    RuleContextListDecl { name: String, ctx_name: String },
    /// Rule argument, return value or local.
    AttributeDecl {
        name: String,
        ty: String,
        init: Option<String>,
    },
    ContextTokenGetter {
        name: String,
        optional: bool,
        signature: bool,
    },
    ContextTokenListGetter { name: String, signature: bool },
    ContextTokenListIndexedGetter { name: String, signature: bool },
    ContextRuleGetter {
        name: String,
        ctx_name: String,
        optional: bool,
        signature: bool,
    },
    ContextRuleListGetter {
        name: String,
        ctx_name: String,
        signature: bool,
    },
    ContextRuleListIndexedGetter {
        name: String,
        ctx_name: String,
        signature: bool,
    },
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Decl::TokenDecl { name, .. }
            | Decl::TokenTypeDecl { name }
            | Decl::TokenListDecl { name }
            | Decl::RuleContextDecl { name, .. }
            | Decl::RuleContextListDecl { name, .. }
            | Decl::AttributeDecl { name, .. }
            | Decl::ContextTokenGetter { name, .. }
            | Decl::ContextTokenListGetter { name, .. }
            | Decl::ContextTokenListIndexedGetter { name, .. }
            | Decl::ContextRuleGetter { name, .. }
            | Decl::ContextRuleListGetter { name, .. }
            | Decl::ContextRuleListIndexedGetter { name, .. } => name,
        }
    }

    pub fn is_getter(&self) -> bool {
        matches!(
            self,
            Decl::ContextTokenGetter { .. }
                | Decl::ContextTokenListGetter { .. }
                | Decl::ContextTokenListIndexedGetter { .. }
                | Decl::ContextRuleGetter { .. }
                | Decl::ContextRuleListGetter { .. }
                | Decl::ContextRuleListIndexedGetter { .. }
        )
    }

    /// Argument type of a getter: indexed getters take an index.
    fn getter_arg(&self) -> Option<&'static str> {
        match self {
            Decl::ContextTokenListIndexedGetter { .. } | Decl::ContextRuleListIndexedGetter { .. } => {
                Some("i")
            }
            _ if self.is_getter() => Some(""),
            _ => None,
        }
    }

    /// Two declarations occupy the same slot in a struct or function.
    ///
    /// Plain declarations collide by name; getters by name and argument list,
    /// so a list getter and its indexed form coexist.
    pub fn same_slot(&self, other: &Decl) -> bool {
        self.name() == other.name() && self.getter_arg() == other.getter_arg()
    }

    /// Copy of this declaration with the signature flag set to `signature`.
    /// Non-getters are returned unchanged.
    pub fn with_signature(&self, signature: bool) -> Decl {
        let mut copy = self.clone();
        match &mut copy {
            Decl::ContextTokenGetter { signature: s, .. }
            | Decl::ContextTokenListGetter { signature: s, .. }
            | Decl::ContextTokenListIndexedGetter { signature: s, .. }
            | Decl::ContextRuleGetter { signature: s, .. }
            | Decl::ContextRuleListGetter { signature: s, .. }
            | Decl::ContextRuleListIndexedGetter { signature: s, .. } => *s = signature,
            _ => {}
        }
        copy
    }

    pub fn is_signature(&self) -> bool {
        matches!(
            self,
            Decl::ContextTokenGetter { signature: true, .. }
                | Decl::ContextTokenListGetter { signature: true, .. }
                | Decl::ContextTokenListIndexedGetter { signature: true, .. }
                | Decl::ContextRuleGetter { signature: true, .. }
                | Decl::ContextRuleListGetter { signature: true, .. }
                | Decl::ContextRuleListIndexedGetter { signature: true, .. }
        )
    }
}

/// Append `decl` unless a declaration with the same slot is already present.
pub(crate) fn add_unique(decls: &mut Vec<Decl>, decl: Decl) {
    if !decls.iter().any(|d| d.same_slot(&decl)) {
        decls.push(decl);
    }
}

/// Parse a rule attribute list such as `int a, List<String> names = null`.
///
/// The last identifier of each entry is the name and everything before it the
/// type. Commas nested in `<>`, `()` or `[]` do not split entries.
pub fn parse_attributes(text: &str) -> Vec<Decl> {
    split_top_level(text)
        .into_iter()
        .filter_map(|entry| {
            let (decl, init) = match entry.split_once('=') {
                Some((decl, init)) => (decl.trim(), Some(init.trim().to_string())),
                None => (entry.trim(), None),
            };
            if decl.is_empty() {
                return None;
            }
            let split = decl
                .rfind(|c: char| !(c.is_alphanumeric() || c == '_'))
                .map_or(0, |i| i + 1);
            let name = decl[split..].to_string();
            let ty = decl[..split].trim().to_string();
            Some(Decl::AttributeDecl { name, ty, init })
        })
        .collect()
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
