//! Element eligibility: exclude lists, library imports, depth bounds, predicate.

#[cfg(test)]
mod tests {
    use crate::callbacks::CallbackError;
    use crate::classify::{ElementClassifier, Exclusion};
    use crate::config::{resolve, PluginOptions};
    use crate::context::ElementContext;
    use crate::imports::ImportBindings;
    use crate::markup::TagName;

    fn ident(name: &str) -> TagName {
        TagName::Identifier(name.to_string())
    }

    fn member(parts: &[&str]) -> TagName {
        TagName::Member(parts.iter().map(|s| s.to_string()).collect())
    }

    fn ctx(name: &str, depth: usize) -> ElementContext {
        ElementContext {
            element_name: name.to_string(),
            file_path: "src/App.tsx".to_string(),
            line: 4,
            column: 2,
            file_name: "App.tsx".to_string(),
            depth,
            props: None,
            content: None,
        }
    }

    fn library_imports() -> ImportBindings {
        let mut imports = ImportBindings::default();
        imports.named.insert("Canvas".to_string());
        imports.namespaces.insert("Drei".to_string());
        imports
    }

    #[test]
    fn test_static_exclusions_in_order() {
        let config = resolve(PluginOptions {
            exclude_elements: Some(vec!["Fragment".into(), "Canvas".into()]),
            ..Default::default()
        });
        let imports = library_imports();
        let classifier = ElementClassifier::new(&config, &imports);

        assert_eq!(
            classifier.exclusion(&ident("Canvas"), 1),
            Some(Exclusion::ExcludeList)
        );
        assert_eq!(
            classifier.exclusion(&ident("mesh"), 1),
            Some(Exclusion::CustomExclude)
        );
        assert_eq!(
            classifier.exclusion(&member(&["Drei", "OrbitControls"]), 1),
            Some(Exclusion::LibraryNamespace)
        );
        assert!(classifier.is_eligible(&ident("div"), 1));
        assert!(classifier.is_eligible(&member(&["Motion", "div"]), 1));
    }

    #[test]
    fn test_library_named_import_excluded() {
        let config = resolve(PluginOptions::default());
        let imports = library_imports();
        let classifier = ElementClassifier::new(&config, &imports);
        assert_eq!(
            classifier.exclusion(&ident("Canvas"), 3),
            Some(Exclusion::LibraryImport)
        );
    }

    #[test]
    fn test_member_fragment_excluded_by_default() {
        let config = resolve(PluginOptions::default());
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(!classifier.is_eligible(&member(&["React", "Fragment"]), 1));
        assert!(!classifier.is_eligible(&ident("Fragment"), 1));
    }

    #[test]
    fn test_root_only_mode() {
        let config = resolve(PluginOptions {
            tag_only_roots: Some(true),
            min_depth: Some(3),
            ..Default::default()
        });
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(classifier.is_eligible(&ident("div"), 1));
        assert_eq!(
            classifier.exclusion(&ident("div"), 2),
            Some(Exclusion::RootOnly)
        );
    }

    #[test]
    fn test_depth_window() {
        let config = resolve(PluginOptions {
            min_depth: Some(2),
            max_depth: Some(3),
            ..Default::default()
        });
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        let eligible: Vec<usize> = (1..=5)
            .filter(|d| classifier.is_eligible(&ident("div"), *d))
            .collect();
        assert_eq!(eligible, vec![2, 3]);
        assert_eq!(
            classifier.exclusion(&ident("div"), 1),
            Some(Exclusion::BelowMinDepth)
        );
        assert_eq!(
            classifier.exclusion(&ident("div"), 4),
            Some(Exclusion::AboveMaxDepth)
        );
    }

    #[test]
    fn test_static_exclusion_beats_depth() {
        let config = resolve(PluginOptions {
            tag_only_roots: Some(true),
            ..Default::default()
        });
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert_eq!(
            classifier.exclusion(&ident("Fragment"), 1),
            Some(Exclusion::ExcludeList)
        );
    }

    #[test]
    fn test_predicate_filters() {
        let config = resolve(
            PluginOptions::default().with_should_tag(|ctx| Ok(ctx.element_name != "span")),
        );
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(classifier.should_tag(&ctx("div", 1)));
        assert!(!classifier.should_tag(&ctx("span", 1)));
    }

    #[test]
    fn test_predicate_error_is_fail_open() {
        let config = resolve(
            PluginOptions::default().with_should_tag(|_| Err(CallbackError::from("broken"))),
        );
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(classifier.should_tag(&ctx("div", 1)));
    }

    #[test]
    fn test_predicate_panic_is_fail_open() {
        let config = resolve(PluginOptions::default().with_should_tag(|ctx| {
            if ctx.depth > 0 {
                panic!("predicate bug");
            }
            Ok(false)
        }));
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(classifier.should_tag(&ctx("div", 2)));
    }

    #[test]
    fn test_predicate_sees_context() {
        let config = resolve(PluginOptions::default().with_should_tag(|ctx| {
            Ok(ctx.file_name == "App.tsx" && ctx.line == 4 && ctx.depth == 2)
        }));
        let imports = ImportBindings::default();
        let classifier = ElementClassifier::new(&config, &imports);
        assert!(classifier.should_tag(&ctx("div", 2)));
        assert!(!classifier.should_tag(&ctx("div", 1)));
    }
}
