//! SQL dialect detection and placeholder rewriting.

/// The database family a client talks to.
///
/// Only identifier quoting depends on it; the compiled SQL is otherwise identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
    Postgres,
    SqlServer,
    /// Unknown driver; quoted like MySQL.
    Other,
}

impl Dialect {
    /// Map a driver name (`"sqlite"`, `"pgsql"`, `"mysql"`, ...) to a dialect.
    pub fn from_driver_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite2" | "sqlite3" => Dialect::Sqlite,
            "mysql" | "mariadb" => Dialect::MySql,
            "pgsql" | "postgres" | "postgresql" => Dialect::Postgres,
            "sqlsrv" | "mssql" | "dblib" | "sybase" => Dialect::SqlServer,
            _ => Dialect::Other,
        }
    }

    /// The identifier quote character for this dialect.
    pub fn quote_char(self) -> char {
        match self {
            Dialect::Postgres | Dialect::SqlServer => '"',
            Dialect::Sqlite | Dialect::MySql | Dialect::Other => '`',
        }
    }
}

/// Replace every `?` placeholder in `sql` with `render(index)` (0-based).
///
/// `?` inside single-quoted literals and `"`/`` ` ``-quoted identifiers is left alone.
/// Doubled quote characters inside a quoted run are escapes and keep the run open.
pub(crate) fn rewrite_placeholders(sql: &str, mut render: impl FnMut(usize) -> String) -> String {
    let mut result = String::with_capacity(sql.len() + 8);
    let mut chars = sql.chars().peekable();
    let mut index = 0;

    while let Some(ch) = chars.next() {
        match ch {
            '?' => {
                result.push_str(&render(index));
                index += 1;
            }
            '\'' | '"' | '`' => {
                result.push(ch);
                while let Some(inner) = chars.next() {
                    result.push(inner);
                    if inner == ch {
                        if chars.peek() == Some(&ch) {
                            if let Some(escaped) = chars.next() {
                                result.push(escaped);
                            }
                        } else {
                            break;
                        }
                    }
                }
            }
            _ => result.push(ch),
        }
    }

    result
}
