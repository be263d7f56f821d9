//! Stylesheets through extraction and resolution.

use std::path::Path;

use tokensmith::{Confidence, Engine, EngineConfig, MemoryLoader, ThemeError};

const SHEET: &str = r#"
@theme {
  --color-surface: #ffffff;
  --color-text: #111827;
  --color-primary: var(--brand);
  --radius-md: 0.375rem;
  --text-sm: 0.875rem;
  --text-sm--line-height: 1.25rem;
  --animate-spin: spin 1s linear infinite;

  @keyframes spin {
    to { transform: rotate(360deg); }
  }
}

:root {
  --brand: #3b82f6;
}

.dark {
  --color-surface: #0b0b0f;
  --brand: #60a5fa;

  &.contrast {
    --color-text: #ffffff;
  }

  .bg-surface {
    background-color: #000000;
  }
}

@media (prefers-color-scheme: light) {
  :root {
    --color-surface: #fafafa;
  }
}
"#;

#[test]
fn base_theme_from_css() {
    let resolved = Engine::default().resolve_css(SHEET).unwrap();
    let base = &resolved.base;
    assert_eq!(base.lookup("colors.surface"), Some("#ffffff"));
    assert_eq!(base.lookup("colors.primary"), Some("#3b82f6"));
    assert_eq!(base.lookup("radius.md"), Some("0.375rem"));
    assert_eq!(base.lookup("fontSize.sm"), Some("0.875rem"));
    assert_eq!(base.lookup("fontSize.sm.lineHeight"), Some("1.25rem"));
    assert_eq!(base.keyframes().len(), 1);
    assert_eq!(base.keyframes()[0].name, "spin");
}

#[test]
fn class_variant_and_alias_routing() {
    let mut engine = Engine::new(EngineConfig::from_yaml("auto-apply: false").unwrap()).unwrap();
    let resolved = engine.resolve_css(SHEET).unwrap();
    let dark = resolved.variant("dark").unwrap();
    assert_eq!(dark.selector, ".dark");
    assert_eq!(dark.theme.lookup("colors.surface"), Some("#0b0b0f"));
    assert_eq!(dark.theme.lookup("colors.primary"), Some("#60a5fa"));
    assert_eq!(dark.theme.lookup("colors.text"), Some("#111827"));
}

#[test]
fn nested_modifier_becomes_compound_variant() {
    let resolved = Engine::default().resolve_css(SHEET).unwrap();
    let contrast = resolved.variant("dark.contrast").unwrap();
    assert_eq!(contrast.selector, ".dark.contrast");
    assert_eq!(contrast.theme.lookup("colors.text"), Some("#ffffff"));
    assert_eq!(contrast.theme.lookup("colors.surface"), Some("#0b0b0f"));
}

#[test]
fn compound_of_selector_list() {
    let css = r#"
        @theme { --color-a: 0; --color-b: 0; }
        .dark, [data-theme="dark"] {
          --color-a: 1;
          &.compact { --color-b: 2; }
        }
    "#;
    let resolved = Engine::default().resolve_css(css).unwrap();
    let dark = resolved.variant("dark").unwrap();
    assert_eq!(dark.selector, r#".dark, [data-theme="dark"]"#);
    let compact = resolved.variant("dark.compact").unwrap();
    assert_eq!(compact.selector, r#".dark.compact, [data-theme="dark"].compact"#);
    assert_eq!(compact.theme.lookup("colors.a"), Some("1"));
    assert_eq!(compact.theme.lookup("colors.b"), Some("2"));
}

#[test]
fn media_query_variant() {
    let resolved = Engine::default().resolve_css(SHEET).unwrap();
    let ids: Vec<_> = resolved.variants.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["dark", "dark.contrast", "light"]);
    let light = resolved.variant("light").unwrap();
    assert_eq!(light.theme.lookup("colors.surface"), Some("#fafafa"));
    assert!(light.selector.starts_with("@media"));

    let css = "@theme { --color-surface: #fff; }
        @media (prefers-color-scheme: dark) { :root { --color-surface: #000; } }";
    let resolved = Engine::default().resolve_css(css).unwrap();
    let dark = resolved.variant("dark").unwrap();
    assert_eq!(dark.selector, "@media (prefers-color-scheme: dark)");
    assert_eq!(dark.theme.lookup("colors.surface"), Some("#000"));
}

#[test]
fn rule_override_conflict_is_applied() {
    let resolved = Engine::default().resolve_css(SHEET).unwrap();
    assert_eq!(resolved.conflicts.len(), 1);
    let conflict = &resolved.conflicts[0];
    assert_eq!(conflict.variant_id, "dark");
    assert_eq!(conflict.theme_property, "colors");
    assert_eq!(conflict.theme_key, "surface");
    assert_eq!(conflict.variable_value, "#0b0b0f");
    assert_eq!(conflict.confidence, Confidence::High);

    let dark = resolved.variant("dark").unwrap();
    assert_eq!(dark.theme.lookup("colors.surface"), Some("#000000"));
}

#[test]
fn conflicts_left_alone_without_auto_apply() {
    let mut engine = Engine::new(EngineConfig::from_yaml("auto-apply: false").unwrap()).unwrap();
    let resolved = engine.resolve_css(SHEET).unwrap();
    assert_eq!(resolved.conflicts.len(), 1);
    let dark = resolved.variant("dark").unwrap();
    assert_eq!(dark.theme.lookup("colors.surface"), Some("#0b0b0f"));
}

#[test]
fn qualified_override_scores_lower() {
    let css = r#"
        @theme { --color-primary: #00f; }
        .dark { --color-primary: #33f; }
        .dark button.bg-primary:hover { background-color: #66f; }
    "#;
    let resolved = Engine::default().resolve_css(css).unwrap();
    assert_eq!(resolved.conflicts.len(), 1);
    assert_eq!(resolved.conflicts[0].confidence, Confidence::Low);
    assert!(!resolved.conflicts[0].auto_applicable);
    assert_eq!(resolved.variant("dark").unwrap().theme.lookup("colors.primary"), Some("#33f"));
}

#[test]
fn entry_with_imports() {
    let loader = MemoryLoader::new()
        .with("src/app.css", r#"@import "./tokens/colors.css"; @import "./tokens/dark.css";"#)
        .with("src/tokens/colors.css", "@theme { --color-ink: #111; --color-paper: #fff; }")
        .with("src/tokens/dark.css", r#"@import "colors.css"; .dark { --color-ink: #eee; }"#);

    let resolved = Engine::default()
        .resolve_entry(Path::new("src/app.css"), &loader)
        .unwrap();
    assert_eq!(resolved.base.lookup("colors.ink"), Some("#111"));
    assert_eq!(resolved.variant("dark").unwrap().theme.lookup("colors.ink"), Some("#eee"));
    assert_eq!(resolved.declarations.len(), 3);
}

#[test]
fn import_depth_is_bounded() {
    let mut loader = MemoryLoader::new();
    for level in 0..40 {
        loader.add(format!("{}.css", level), format!(r#"@import "{}.css";"#, level + 1));
    }
    let err = Engine::default()
        .resolve_entry(Path::new("0.css"), &loader)
        .unwrap_err();
    assert!(matches!(err, ThemeError::ImportDepthExceeded { .. }));
}

#[test]
fn sheet_without_tokens_is_an_error() {
    let err = Engine::default().resolve_css(".btn { color: red; }").unwrap_err();
    assert!(matches!(err, ThemeError::NoDeclarations));
}
