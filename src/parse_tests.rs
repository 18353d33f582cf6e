#[cfg(test)]
mod tests {
    use crate::error::TaggerError;
    use crate::markup::{
        AttributeNode, ElementNode, ImportKind, LiteralValue, MarkupNode, SourcePosition, TagName,
    };
    use crate::parse::{is_valid_source, parse_module};

    fn element(node: &MarkupNode) -> &ElementNode {
        match node {
            MarkupNode::Element(el) => el,
            MarkupNode::Text(t) => panic!("expected element, got text {:?}", t.value),
        }
    }

    fn child_elements(el: &ElementNode) -> Vec<&ElementNode> {
        el.children
            .iter()
            .filter_map(|c| match c {
                MarkupNode::Element(e) => Some(e),
                MarkupNode::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_import_extraction() {
        let src = r#"
import React, { useState as useS } from "react";
import * as THREE from "three";
import "./side-effect.css";
export const A = () => <div />;
"#;
        let module = parse_module(src, "A.tsx").unwrap();
        assert_eq!(module.imports.len(), 3);

        let react = &module.imports[0];
        assert_eq!(react.source, "react");
        assert_eq!(react.bindings[0].kind, ImportKind::Default);
        assert_eq!(react.bindings[0].local, "React");
        assert_eq!(react.bindings[1].kind, ImportKind::Named);
        assert_eq!(react.bindings[1].local, "useS");

        assert_eq!(module.imports[1].bindings[0].kind, ImportKind::Namespace);
        assert_eq!(module.imports[1].bindings[0].local, "THREE");
        assert!(module.imports[2].bindings.is_empty());
    }

    #[test]
    fn test_nesting_and_text() {
        let src = "const x = (\n  <ul>\n    <li>One</li>\n    <li>Two <b>!</b></li>\n  </ul>\n);\n";
        let module = parse_module(src, "x.tsx").unwrap();
        assert_eq!(module.elements.len(), 1);

        let ul = element(&module.elements[0]);
        assert_eq!(ul.name, TagName::Identifier("ul".into()));
        assert_eq!(ul.location, Some(SourcePosition { line: 2, column: 2 }));
        assert!(!ul.self_closing);

        let items = child_elements(ul);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].flattened_text().as_deref(), Some("One"));
        assert_eq!(items[1].flattened_text().as_deref(), Some("Two"));
        assert_eq!(child_elements(items[1]).len(), 1);
    }

    #[test]
    fn test_opening_span_covers_tag_only() {
        let src = "const x = <a href=\"/\">link</a>;";
        let module = parse_module(src, "x.tsx").unwrap();
        let a = element(&module.elements[0]);
        assert_eq!(&src[a.opening_span.start..a.opening_span.end], "<a href=\"/\">");
    }

    #[test]
    fn test_tag_name_shapes() {
        let src = "const x = <><Motion.div /><svg:rect /><this.Item /></>;";
        let module = parse_module(src, "x.tsx").unwrap();
        let names: Vec<String> = module
            .elements
            .iter()
            .map(|n| element(n).name.to_string())
            .collect();
        assert_eq!(names, vec!["Motion.div", "svg:rect", "this.Item"]);
    }

    #[test]
    fn test_attribute_lowering() {
        let src = r#"const x = <input type="text" max={5} disabled checked={false} label={"hi"} onChange={f} {...rest} />;"#;
        let module = parse_module(src, "x.tsx").unwrap();
        let input = element(&module.elements[0]);
        assert!(input.self_closing);
        assert_eq!(
            input.attributes,
            vec![
                AttributeNode::Literal {
                    name: "type".into(),
                    value: LiteralValue::String("text".into())
                },
                AttributeNode::Literal {
                    name: "max".into(),
                    value: LiteralValue::Number(5.0)
                },
                AttributeNode::Literal {
                    name: "disabled".into(),
                    value: LiteralValue::Bool(true)
                },
                AttributeNode::Literal {
                    name: "checked".into(),
                    value: LiteralValue::Bool(false)
                },
                AttributeNode::Literal {
                    name: "label".into(),
                    value: LiteralValue::String("hi".into())
                },
                AttributeNode::Expression {
                    name: "onChange".into()
                },
                AttributeNode::Spread,
            ]
        );
    }

    #[test]
    fn test_elements_in_attributes_become_children() {
        let src = "const x = <Route element={<Home />} />;";
        let module = parse_module(src, "x.tsx").unwrap();
        let route = element(&module.elements[0]);
        let inner = child_elements(route);
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].name, TagName::Identifier("Home".into()));
    }

    #[test]
    fn test_typescript_generics() {
        let src = "const x = <List<Item> items={items} render={(i: Item) => <li />} />;";
        let module = parse_module(src, "x.tsx").unwrap();
        let list = element(&module.elements[0]);
        assert_eq!(list.name, TagName::Identifier("List".into()));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_module("const x = <div>;", "bad.tsx").unwrap_err();
        match err {
            TaggerError::Parse { file, .. } => assert_eq!(file, "bad.tsx"),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!is_valid_source("const x = <div>;"));
        assert!(is_valid_source("const x = <div />;"));
    }
}
