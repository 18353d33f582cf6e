//! Parse Module
//!
//! The only place that touches the oxc AST. A file is parsed once with module,
//! JSX and TypeScript syntax enabled and lowered into the closed
//! [`MarkupModule`] IR.

use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::TaggerError;
use crate::markup::{
    AttributeNode, ByteSpan, ElementNode, ImportBinding, ImportDecl, ImportKind, LineIndex,
    LiteralValue, MarkupModule, MarkupNode, TagName, TextNode,
};

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn parser_source_type() -> SourceType {
    SourceType::default()
        .with_module(true)
        .with_jsx(true)
        .with_typescript(true)
}

/// Parse `source` and lower it. Any parser diagnostic fails the whole file.
pub fn parse_module(source: &str, file_path: &str) -> Result<MarkupModule, TaggerError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, parser_source_type()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = if ret.errors.is_empty() {
            "parser aborted".to_string()
        } else {
            ret.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(TaggerError::parse(file_path, message));
    }

    let imports = ret
        .program
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::ImportDeclaration(decl) => Some(lower_import(decl)),
            _ => None,
        })
        .collect();

    let mut lowerer = MarkupLowerer::new(source);
    lowerer.visit_program(&ret.program);

    Ok(MarkupModule {
        imports,
        elements: lowerer.roots,
    })
}

/// True when `source` parses cleanly under the same configuration.
pub fn is_valid_source(source: &str) -> bool {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, parser_source_type()).parse();
    !ret.panicked && ret.errors.is_empty()
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORTS
// ═══════════════════════════════════════════════════════════════════════════════

fn lower_import(decl: &ImportDeclaration<'_>) -> ImportDecl {
    let mut bindings = Vec::new();
    if let Some(specifiers) = &decl.specifiers {
        for spec in specifiers {
            let binding = match spec {
                ImportDeclarationSpecifier::ImportSpecifier(s) => ImportBinding {
                    kind: ImportKind::Named,
                    local: s.local.name.to_string(),
                },
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => ImportBinding {
                    kind: ImportKind::Default,
                    local: s.local.name.to_string(),
                },
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => ImportBinding {
                    kind: ImportKind::Namespace,
                    local: s.local.name.to_string(),
                },
            };
            bindings.push(binding);
        }
    }

    ImportDecl {
        source: decl.source.value.to_string(),
        bindings,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENT LOWERING
// Elements found while another element is open become its children, wherever
// they sit (children, attribute values, expression containers).
// ═══════════════════════════════════════════════════════════════════════════════

struct MarkupLowerer<'s> {
    source: &'s str,
    lines: LineIndex,
    roots: Vec<MarkupNode>,
    open: Vec<ElementNode>,
}

impl<'s> MarkupLowerer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            lines: LineIndex::new(source),
            roots: Vec::new(),
            open: Vec::new(),
        }
    }

    fn attach(&mut self, node: MarkupNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn lower_opening(&self, element: &JSXElement<'_>) -> ElementNode {
        let opening = &element.opening_element;
        let start = opening.span.start as usize;
        let end = opening.span.end as usize;

        ElementNode {
            name: tag_name(&opening.name),
            opening_span: ByteSpan::new(start, end),
            self_closing: element.closing_element.is_none(),
            location: Some(self.lines.position(self.source, start)),
            attributes: opening.attributes.iter().map(lower_attribute).collect(),
            children: Vec::new(),
        }
    }
}

impl<'a> Visit<'a> for MarkupLowerer<'_> {
    fn visit_jsx_element(&mut self, element: &JSXElement<'a>) {
        let node = self.lower_opening(element);
        self.open.push(node);
        walk::walk_jsx_element(self, element);
        if let Some(node) = self.open.pop() {
            self.attach(MarkupNode::Element(node));
        }
    }

    fn visit_jsx_text(&mut self, text: &JSXText<'a>) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(MarkupNode::Text(TextNode {
                value: text.value.to_string(),
            }));
        }
    }
}

fn tag_name(name: &JSXElementName<'_>) -> TagName {
    match name {
        JSXElementName::Identifier(id) => TagName::Identifier(id.name.to_string()),
        JSXElementName::IdentifierReference(id) => TagName::Identifier(id.name.to_string()),
        JSXElementName::NamespacedName(ns) => TagName::Namespaced {
            namespace: ns.namespace.name.to_string(),
            name: ns.name.name.to_string(),
        },
        JSXElementName::MemberExpression(me) => {
            let mut parts = Vec::new();
            member_parts(me, &mut parts);
            TagName::Member(parts)
        }
        JSXElementName::ThisExpression(_) => TagName::Identifier("this".to_string()),
    }
}

fn member_parts(me: &JSXMemberExpression<'_>, parts: &mut Vec<String>) {
    match &me.object {
        JSXMemberExpressionObject::IdentifierReference(id) => parts.push(id.name.to_string()),
        JSXMemberExpressionObject::MemberExpression(inner) => member_parts(inner, parts),
        JSXMemberExpressionObject::ThisExpression(_) => parts.push("this".to_string()),
    }
    parts.push(me.property.name.to_string());
}

fn lower_attribute(item: &JSXAttributeItem<'_>) -> AttributeNode {
    let attr = match item {
        JSXAttributeItem::Attribute(attr) => attr,
        JSXAttributeItem::SpreadAttribute(_) => return AttributeNode::Spread,
    };

    let name = match &attr.name {
        JSXAttributeName::Identifier(id) => id.name.to_string(),
        JSXAttributeName::NamespacedName(ns) => format!("{}:{}", ns.namespace.name, ns.name.name),
    };

    let literal = match &attr.value {
        None => Some(LiteralValue::Bool(true)),
        Some(JSXAttributeValue::StringLiteral(s)) => Some(LiteralValue::String(s.value.to_string())),
        Some(JSXAttributeValue::ExpressionContainer(container)) => {
            match container.expression.as_expression() {
                Some(Expression::StringLiteral(s)) => {
                    Some(LiteralValue::String(s.value.to_string()))
                }
                Some(Expression::NumericLiteral(n)) => Some(LiteralValue::Number(n.value)),
                Some(Expression::BooleanLiteral(b)) => Some(LiteralValue::Bool(b.value)),
                _ => None,
            }
        }
        Some(JSXAttributeValue::Element(_)) | Some(JSXAttributeValue::Fragment(_)) => None,
    };

    match literal {
        Some(value) => AttributeNode::Literal { name, value },
        None => AttributeNode::Expression { name },
    }
}
