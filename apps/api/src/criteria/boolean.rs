//! Boolean-query fix-ups applied before a query is sent to LinkedIn.
//!
//! The model is told the syntax rules but still makes recurring mistakes;
//! these rewrites catch the ones LinkedIn rejects outright.

/// Normalizes a LinkedIn boolean query:
/// - whitespace runs (newlines, tabs) collapse to single spaces
/// - a bare `NOT` between groups becomes `AND NOT` (LinkedIn requires it)
/// - `AND AND NOT` left behind by the previous fix collapses to `AND NOT`
/// - `&` is replaced since LinkedIn's parser rejects it
pub fn sanitize_boolean_query(query: &str) -> String {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut fixed = collapsed;
    for pattern in [") NOT (", ")NOT (", ") NOT(", ")NOT("] {
        fixed = fixed.replace(pattern, ") AND NOT (");
    }

    // Token-wise scan so "BRAND AND NOT" is not mistaken for "AND AND NOT".
    let tokens: Vec<&str> = fixed.split(' ').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "AND"
            && tokens.get(i + 1) == Some(&"AND")
            && tokens.get(i + 2) == Some(&"NOT")
        {
            i += 1;
            continue;
        }
        kept.push(tokens[i]);
        i += 1;
    }

    kept.join(" ").replace('&', "and")
}
