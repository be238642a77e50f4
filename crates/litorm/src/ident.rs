//! SQL identifier handling.
//!
//! This module provides [`Ident`] which represents a SQL identifier (schema/table/column)
//! in dotted notation. Each part is quoted on its own, so `users.id` renders as
//! `` `users`.`id` `` under MySQL/SQLite and `"users"."id"` under PostgreSQL.
//!
//! - `*` is never quoted (`users.*` renders as `` `users`.* ``)
//! - An embedded quote character is escaped by doubling it
//!
//! # Example
//! ```
//! use litorm::Ident;
//!
//! let col = Ident::parse("public.users");
//! assert_eq!(col.to_sql('"'), r#""public"."users""#);
//! ```

/// A SQL identifier (column, table, or schema name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<String>,
}

impl Ident {
    /// Split an identifier string on `.` into its parts.
    pub fn parse(s: &str) -> Self {
        Self {
            parts: s.split('.').map(str::to_string).collect(),
        }
    }

    /// Render the identifier quoted with `quote`.
    pub fn to_sql(&self, quote: char) -> String {
        let mut cap = self.parts.len().saturating_sub(1); // dots
        for part in &self.parts {
            cap += part.len() + 2; // surrounding quotes (escapes may add more)
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(quote, &mut out);
        out
    }

    pub(crate) fn write_sql(&self, quote: char, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            if part == "*" {
                out.push('*');
                continue;
            }
            out.push(quote);
            for ch in part.chars() {
                if ch == quote {
                    out.push(quote);
                }
                out.push(ch);
            }
            out.push(quote);
        }
    }
}

/// Quote a dotted identifier string in one step.
pub fn quote_identifier(identifier: &str, quote: char) -> String {
    Ident::parse(identifier).to_sql(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        assert_eq!(quote_identifier("users", '`'), "`users`");
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(quote_identifier("public.users", '"'), r#""public"."users""#);
    }

    #[test]
    fn ident_three_parts() {
        assert_eq!(
            quote_identifier("schema.table.column", '`'),
            "`schema`.`table`.`column`"
        );
    }

    #[test]
    fn ident_star_untouched() {
        assert_eq!(quote_identifier("*", '`'), "*");
        assert_eq!(quote_identifier("users.*", '"'), r#""users".*"#);
    }

    #[test]
    fn ident_escapes_quote_char() {
        assert_eq!(quote_identifier(r#"has"quote"#, '"'), r#""has""quote""#);
        assert_eq!(quote_identifier("back`tick", '`'), "`back``tick`");
        assert_eq!(quote_identifier(r#"has"quote"#, '`'), r#"`has"quote`"#);
    }

    #[test]
    fn ident_parts() {
        let ident = Ident::parse("a.b");
        assert_eq!(ident.parts, vec!["a".to_string(), "b".to_string()]);
    }
}
