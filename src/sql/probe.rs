//! Probe query builders and quoting helpers.

// =============================================================================
// Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Wrap a value in single quotes for use as a SQL literal.
///
/// Embedded single quotes are NOT escaped. Values such as `O'Hare` produce
/// invalid SQL; use [`quote_literal_escaped`] when the caller cannot guarantee
/// clean input.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value)
}

/// Quote string with single quotes, doubling embedded quotes (standard SQL).
pub fn quote_literal_escaped(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// =============================================================================
// Probes
// =============================================================================

/// `SELECT * FROM (<table_expr>) LIMIT 1`
///
/// The expression is parenthesised so sub-queries work as well as table names.
pub fn schema_probe(table_expr: &str) -> String {
    format!("SELECT * FROM ({}) LIMIT 1", table_expr.trim())
}

/// One `array_agg(DISTINCT "<source>") AS "<alias>"` per column over the whole table.
///
/// Each item is `(source_name, alias)`; the alias is what the result set
/// column will be called. The expression is parenthesised and aliased the same
/// way for table names and sub-queries. Callers must not pass an empty column
/// list.
pub fn distinct_probe<'a, I>(table_expr: &str, columns: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let aggregates: Vec<String> = columns
        .into_iter()
        .map(|(source, alias)| {
            format!(
                "array_agg(DISTINCT {}) AS {}",
                quote_identifier(source),
                quote_identifier(alias)
            )
        })
        .collect();

    format!(
        "SELECT {} FROM ({}) AS t",
        aggregates.join(", "),
        table_expr.trim()
    )
}
