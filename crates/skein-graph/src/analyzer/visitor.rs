//! AST visitor that collects outward module references.
//!
//! Walks a parsed program and records every syntactic form that names
//! another module with a literal string specifier. Computed specifiers
//! (`import(variable)`, `require(a + b)`) are ignored.

use oxc_ast::ast::{
    CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, TSImportEqualsDeclaration, TSImportType,
    TSModuleReference,
};
use oxc_ast_visit::{walk, Visit};

/// Two-part property-access callees whose first string argument is a
/// module specifier: loader resolution, module-scoped require, and the
/// usual test-framework mock helpers.
const PROPERTY_CALL_ALLOWLIST: &[(&str, &str)] = &[
    ("require", "resolve"),
    ("module", "require"),
    ("jest", "mock"),
    ("jest", "requireActual"),
    ("jest", "requireMock"),
    ("vi", "mock"),
    ("vi", "importActual"),
    ("vi", "importMock"),
];

/// Syntactic context a reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `import ... from 'mod'`
    Static,
    /// `export ... from 'mod'`
    ExportFrom,
    /// `import x = require('mod')`
    ImportEquals,
    /// `import('mod').T` in a type position
    TypeReference,
    /// `import('mod')` expression
    Dynamic,
    /// `require('mod')`
    Require,
    /// Allow-listed property call such as `jest.mock('mod')`
    PropertyCall,
}

/// One collected module reference.
#[derive(Debug, Clone)]
pub struct ModuleRef {
    pub specifier: String,
    pub kind: RefKind,
    /// The reference only contributes types; type-only references never
    /// create internal dependency edges.
    pub type_only: bool,
}

/// Collects [`ModuleRef`]s from a program.
#[derive(Debug, Default)]
pub struct ImportCollector {
    pub refs: Vec<ModuleRef>,
}

impl ImportCollector {
    fn push(&mut self, specifier: &str, kind: RefKind, type_only: bool) {
        self.refs.push(ModuleRef {
            specifier: specifier.to_string(),
            kind,
            type_only,
        });
    }
}

/// True when an import declaration carries bindings and every one of
/// them is type-only. An empty binding list (`import {} from 'm'`) is
/// not type-only: the module still executes.
fn bindings_all_type_only(decl: &ImportDeclaration) -> bool {
    match &decl.specifiers {
        Some(specs) if !specs.is_empty() => specs.iter().all(|spec| match spec {
            ImportDeclarationSpecifier::ImportSpecifier(named) => named.import_kind.is_type(),
            // Default and namespace bindings are always value imports.
            _ => false,
        }),
        _ => false,
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        let type_only = it.import_kind.is_type() || bindings_all_type_only(it);
        self.push(it.source.value.as_str(), RefKind::Static, type_only);
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            let type_only = it.export_kind.is_type()
                || (!it.specifiers.is_empty()
                    && it.specifiers.iter().all(|spec| spec.export_kind.is_type()));
            self.push(source.value.as_str(), RefKind::ExportFrom, type_only);
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push(
            it.source.value.as_str(),
            RefKind::ExportFrom,
            it.export_kind.is_type(),
        );
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_ts_import_equals_declaration(&mut self, it: &TSImportEqualsDeclaration<'a>) {
        if let TSModuleReference::ExternalModuleReference(external) = &it.module_reference {
            self.push(
                external.expression.value.as_str(),
                RefKind::ImportEquals,
                it.import_kind.is_type(),
            );
        }
        walk::walk_ts_import_equals_declaration(self, it);
    }

    fn visit_ts_import_type(&mut self, it: &TSImportType<'a>) {
        self.push(it.source.value.as_str(), RefKind::TypeReference, true);
        walk::walk_ts_import_type(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(source) = &it.source {
            self.push(source.value.as_str(), RefKind::Dynamic, false);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let kind = match &it.callee {
            Expression::Identifier(ident) if ident.name == "require" => Some(RefKind::Require),
            Expression::StaticMemberExpression(member) => match &member.object {
                Expression::Identifier(object)
                    if PROPERTY_CALL_ALLOWLIST.iter().any(|(obj, prop)| {
                        object.name == *obj && member.property.name == *prop
                    }) =>
                {
                    Some(RefKind::PropertyCall)
                }
                _ => None,
            },
            _ => None,
        };

        if let Some(kind) = kind {
            // Only the first argument counts, and only when literal.
            if let Some(arg) = it.arguments.first() {
                if let Some(Expression::StringLiteral(source)) = arg.as_expression() {
                    self.push(source.value.as_str(), kind, false);
                }
            }
        }

        walk::walk_call_expression(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;
    use oxc_allocator::Allocator;
    use std::path::Path;

    fn collect(source: &str, file: &str) -> Vec<ModuleRef> {
        let allocator = Allocator::default();
        let parsed = parse_source(&allocator, source, Path::new(file)).unwrap();
        let mut collector = ImportCollector::default();
        collector.visit_program(&parsed.program);
        collector.refs
    }

    fn specs(refs: &[ModuleRef]) -> Vec<&str> {
        refs.iter().map(|r| r.specifier.as_str()).collect()
    }

    #[test]
    fn static_imports_and_reexports() {
        let refs = collect(
            "import a from 'dep-a';\n\
             import { b } from 'dep-b';\n\
             export { c } from 'dep-c';\n\
             export * from 'dep-d';\n",
            "index.ts",
        );
        assert_eq!(specs(&refs), vec!["dep-a", "dep-b", "dep-c", "dep-d"]);
        assert!(refs.iter().all(|r| !r.type_only));
    }

    #[test]
    fn type_only_forms_are_marked() {
        let refs = collect(
            "import type { T } from 'types-a';\n\
             import { type U, type V } from 'types-b';\n\
             export type { W } from 'types-c';\n\
             import { type X, y } from 'mixed';\n",
            "index.ts",
        );
        assert_eq!(refs.len(), 4);
        assert!(refs[0].type_only, "import type");
        assert!(refs[1].type_only, "all bindings type-only");
        assert!(refs[2].type_only, "export type from");
        assert!(!refs[3].type_only, "mixed bindings stay runtime");
    }

    #[test]
    fn dynamic_import_and_require() {
        let refs = collect(
            "const a = import('dyn');\n\
             const b = require('legacy');\n\
             const c = require(someVariable);\n\
             const d = import(`tpl-${x}`);\n",
            "index.js",
        );
        assert_eq!(specs(&refs), vec!["dyn", "legacy"]);
        assert_eq!(refs[0].kind, RefKind::Dynamic);
        assert_eq!(refs[1].kind, RefKind::Require);
    }

    #[test]
    fn property_call_allowlist() {
        let refs = collect(
            "require.resolve('res');\n\
             module.require('modreq');\n\
             jest.mock('mocked');\n\
             jest.requireActual('actual');\n\
             vi.mock('vimocked');\n\
             foo.bar('not-a-module');\n\
             jest.spyOn(obj, 'method');\n",
            "index.spec.js",
        );
        assert_eq!(
            specs(&refs),
            vec!["res", "modreq", "mocked", "actual", "vimocked"]
        );
        assert!(refs.iter().all(|r| r.kind == RefKind::PropertyCall));
    }

    #[test]
    fn import_equals_external_reference() {
        let refs = collect("import lib = require('legacy-lib');\n", "index.ts");
        assert_eq!(specs(&refs), vec!["legacy-lib"]);
        assert_eq!(refs[0].kind, RefKind::ImportEquals);
    }

    #[test]
    fn type_reference_expression() {
        let refs = collect(
            "type Props = import('pkg-types').Props;\n",
            "index.ts",
        );
        assert_eq!(specs(&refs), vec!["pkg-types"]);
        assert!(refs[0].type_only);
        assert_eq!(refs[0].kind, RefKind::TypeReference);
    }

    #[test]
    fn side_effect_import_is_runtime() {
        let refs = collect("import 'polyfill';\nimport {} from 'empty';\n", "index.ts");
        assert_eq!(refs.len(), 2);
        assert!(!refs[0].type_only);
        assert!(!refs[1].type_only);
    }

    #[test]
    fn nested_requires_inside_functions() {
        let refs = collect(
            "export function load() {\n\
               if (cond) { return require('lazy'); }\n\
               return null;\n\
             }\n",
            "index.js",
        );
        assert_eq!(specs(&refs), vec!["lazy"]);
    }
}
