//! Parser façade over oxc.
//!
//! Wraps `oxc_parser` with path-based source type detection and lenient
//! error handling: a file that fails to parse outright yields no program,
//! and the caller degrades it to an empty analysis.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parsed program plus the metadata the analyzer needs.
pub struct ParsedSource<'a> {
    /// The parsed AST. Present even with recoverable syntax errors; oxc
    /// produces a partial tree we can still walk.
    pub program: Program<'a>,
    /// Source type inferred from the file path.
    pub source_type: SourceType,
}

/// Infer the oxc source type from a file path.
///
/// `.tsx`/`.jsx` parse with JSX enabled, `.d.ts`-style declaration files
/// come back flagged as TypeScript definitions. Unknown extensions fall
/// back to TSX, the most permissive grammar.
pub fn source_type_for(path: &Path) -> SourceType {
    SourceType::from_path(path).unwrap_or_else(|_| SourceType::tsx())
}

/// Parse a source file into an AST.
///
/// Returns `None` only when the parser panicked (irrecoverable input);
/// recoverable syntax errors still produce a usable partial program.
pub fn parse_source<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    path: &Path,
) -> Option<ParsedSource<'a>> {
    let source_type = source_type_for(path);
    let result = Parser::new(allocator, source, source_type).parse();

    if result.panicked {
        tracing::debug!(path = %path.display(), "parser panicked; treating file as empty");
        return None;
    }
    if !result.errors.is_empty() {
        tracing::debug!(
            path = %path.display(),
            errors = result.errors.len(),
            "parsed with recoverable syntax errors"
        );
    }

    Some(ParsedSource {
        program: result.program,
        source_type,
    })
}
