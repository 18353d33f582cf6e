use crate::markup::{ElementNode, MarkupModule, MarkupNode, TextNode};

/// The MarkupVisitor trait defines the single authoritative traversal mechanism for markup IR.
///
/// Rules:
/// 1. Traversal order is source order, parents before children.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call `walk_*` functions to continue traversal unless pruning is intended.
pub trait MarkupVisitor {
    fn visit_module(&mut self, module: &MarkupModule) {
        walk_module(self, module);
    }

    fn visit_node(&mut self, node: &MarkupNode) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &ElementNode) {
        walk_element(self, element);
    }

    fn visit_text(&mut self, _text: &TextNode) {
        // Leaf node
    }

    fn visit_children(&mut self, children: &[MarkupNode]) {
        walk_children(self, children);
    }
}

pub fn walk_module<V: MarkupVisitor + ?Sized>(visitor: &mut V, module: &MarkupModule) {
    visitor.visit_children(&module.elements);
}

pub fn walk_children<V: MarkupVisitor + ?Sized>(visitor: &mut V, children: &[MarkupNode]) {
    for node in children {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: MarkupVisitor + ?Sized>(visitor: &mut V, node: &MarkupNode) {
    match node {
        MarkupNode::Element(el) => visitor.visit_element(el),
        MarkupNode::Text(t) => visitor.visit_text(t),
    }
}

pub fn walk_element<V: MarkupVisitor + ?Sized>(visitor: &mut V, element: &ElementNode) {
    visitor.visit_children(&element.children);
}
