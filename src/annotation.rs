//! Comment-block annotation parser.
//!
//! A handler's descriptive comment is a tiny DSL:
//!
//! ```text
//! Fetch one model by its identifier.
//!
//! Anything after the first line is free text and is ignored.
//!
//! @param id     int      The model identifier
//! @param fields string?  Comma-separated list of fields to return
//! @param limit  int optional Maximum number of related rows
//! ```
//!
//! - The **synopsis** is the first non-empty line that is not a tag.
//! - Each `@param <name> <type> [optional] <description>` line yields one
//!   parameter. A parameter is required unless its type ends in `?`, the
//!   token after the type is `optional` / `[optional]`, or the description
//!   ends with `(optional)`.
//! - Comment markers (`///`, `//`, `/**`, `*`, `*/`) at the start or end of a
//!   line are stripped, so the text can be pasted straight out of a doc block.
//! - Unknown tags and malformed `@param` lines are skipped.
//!
//! Parsing is a pure function of the text; the same block always yields the
//! same [`Annotation`].

use crate::route::ParamDoc;

/// What a comment block says about its handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotation {
    pub synopsis: String,
    pub parameters: Vec<ParamDoc>,
}

const PARAM_TAG: &str = "@param";

/// Parses a comment block. An empty block yields an empty annotation.
pub fn parse(block: &str) -> Annotation {
    let mut annotation = Annotation::default();

    for line in block.lines().map(strip_markers) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with('@') {
            if let Some(param) = parse_param(line) {
                annotation.parameters.push(param);
            }
            continue;
        }
        if annotation.synopsis.is_empty() {
            annotation.synopsis = line.to_owned();
        }
    }

    annotation
}

fn strip_markers(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line).trim_end();
    let line = ["/**", "///", "//!", "//", "/*", "*"]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .unwrap_or(line);
    line.trim()
}

fn parse_param(line: &str) -> Option<ParamDoc> {
    let rest = line.strip_prefix(PARAM_TAG)?;
    // `@params` and friends are different tags.
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let mut tokens = rest.split_whitespace().peekable();
    let name = tokens.next()?.trim_start_matches('$');
    let raw_type = tokens.next()?;
    if name.is_empty() {
        return None;
    }

    let (kind, mut optional) = match raw_type.strip_suffix('?') {
        Some(kind) => (kind, true),
        None => (raw_type, false),
    };

    if tokens.next_if(|t| t.eq_ignore_ascii_case("optional") || t.eq_ignore_ascii_case("[optional]")).is_some() {
        optional = true;
    }

    let mut description = tokens.collect::<Vec<_>>().join(" ");
    if let Some(stripped) = description.strip_suffix("(optional)") {
        optional = true;
        description = stripped.trim_end().to_owned();
    }

    Some(ParamDoc {
        name: name.to_owned(),
        kind: kind.to_owned(),
        required: !optional,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, kind: &str, required: bool, description: &str) -> ParamDoc {
        ParamDoc {
            name: name.to_owned(),
            kind: kind.to_owned(),
            required,
            description: description.to_owned(),
        }
    }

    #[test]
    fn synopsis_is_first_non_empty_line() {
        let a = parse("\n\n   Lists every model.\nSecond line is ignored.\n");
        assert_eq!(a.synopsis, "Lists every model.");
        assert!(a.parameters.is_empty());
    }

    #[test]
    fn empty_block_yields_empty_annotation() {
        assert_eq!(parse(""), Annotation::default());
        assert_eq!(parse("   \n\t\n"), Annotation::default());
    }

    #[test]
    fn params_in_declaration_order() {
        let a = parse(
            "Fetch one model.\n\
             @param id int The model identifier\n\
             @param fields string? Fields to return\n\
             @param limit int optional Max related rows\n\
             @param sort string Sort order (optional)\n",
        );
        assert_eq!(a.synopsis, "Fetch one model.");
        assert_eq!(
            a.parameters,
            vec![
                param("id", "int", true, "The model identifier"),
                param("fields", "string", false, "Fields to return"),
                param("limit", "int", false, "Max related rows"),
                param("sort", "string", false, "Sort order"),
            ]
        );
    }

    #[test]
    fn doc_block_markers_are_stripped() {
        let a = parse(
            "/**\n\
             * Creates a model.\n\
             *\n\
             * @param $name string Display name\n\
             */",
        );
        assert_eq!(a.synopsis, "Creates a model.");
        assert_eq!(a.parameters, vec![param("name", "string", true, "Display name")]);

        let b = parse("/// Deletes a model.\n/// @param id int\n");
        assert_eq!(b.synopsis, "Deletes a model.");
        assert_eq!(b.parameters, vec![param("id", "int", true, "")]);
    }

    #[test]
    fn malformed_and_unknown_tags_are_skipped() {
        let a = parse("@param\n@param lonely\n@params x int nope\n@deprecated\nStill documented.");
        assert_eq!(a.synopsis, "Still documented.");
        assert!(a.parameters.is_empty());
    }

    #[test]
    fn parsing_is_stable() {
        let block = "Search.\n@param q string Query text\n@param page int? Page";
        assert_eq!(parse(block), parse(block));
    }
}
