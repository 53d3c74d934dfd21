//! End-to-end rendering through the [`Engine`] with in-memory templates.

use fith::{CompileError, Config, Engine, EvalError, FithError, MemoryLoader, Value};
use serde_json::json;

fn engine(templates: &[(&str, &str)]) -> Engine {
    engine_with(Config::default(), templates)
}

fn engine_with(config: Config, templates: &[(&str, &str)]) -> Engine {
    let loader = MemoryLoader::new(config.to_delimiters());
    for (name, source) in templates {
        loader.add(*name, *source);
    }
    Engine::with_loader(config, loader).unwrap()
}

fn eval_root(err: &FithError) -> &EvalError {
    match err {
        FithError::Eval(eval) => eval.root(),
        other => panic!("expected an eval error, got {other:?}"),
    }
}

// =========================================
// Scopes
// =========================================

#[test]
fn range_bindings_and_scope_isolation() {
    let engine = engine(&[]);
    let data = json!({"Items": ["a", "b", "c"], "Name": "outer"});
    let out = engine
        .render_string("{{range .Items}}{{@index}}:{{.}} {{end}}|{{.Name}}", data)
        .unwrap();
    assert_eq!(out, "0:a 1:b 2:c |outer");
}

#[test]
fn range_first_last_and_nesting() {
    let engine = engine(&[]);
    let data = json!({"Rows": [[1, 2], [3]]});
    let src = "{{range .Rows}}[{{range .}}{{if @first}}<{{end}}{{.}}{{if @last}}>{{end}}{{end}}]{{end}}";
    assert_eq!(engine.render_string(src, data).unwrap(), "[<12>][<3>]");
}

#[test]
fn range_over_mapping_and_else() {
    let engine = engine(&[]);
    let data = json!({"M": {"b": 2, "a": 1}, "Empty": []});
    assert_eq!(
        engine.render_string("{{range .M}}{{@key}}={{.}} {{end}}", data.clone()).unwrap(),
        "a=1 b=2 "
    );
    assert_eq!(
        engine.render_string("{{range .Empty}}x{{else}}none{{end}}", data).unwrap(),
        "none"
    );
}

#[test]
fn range_over_scalar_is_not_iterable() {
    let err = engine(&[]).render_string("{{range .N}}{{end}}", json!({"N": 3})).unwrap_err();
    assert!(matches!(eval_root(&err), EvalError::NotIterable { .. }));
}

// =========================================
// Truthiness and operators
// =========================================

#[test]
fn truthiness_table() {
    let engine = engine(&[]);
    let data = json!({
        "EmptyStr": "", "Zero": 0, "ZeroF": 0.0, "EmptySeq": [], "EmptyMap": {},
        "ZeroStr": "0", "One": 1, "Seq": [0], "Map": {"k": null}, "Null": null,
    });
    let check = |field: &str| {
        let src = format!("{{{{if .{field}}}}}T{{{{else}}}}F{{{{end}}}}");
        engine.render_string(&src, data.clone()).unwrap()
    };
    for falsy in ["EmptyStr", "Zero", "ZeroF", "EmptySeq", "EmptyMap"] {
        assert_eq!(check(falsy), "F", "{falsy} should be falsy");
    }
    for truthy in ["ZeroStr", "One", "Seq", "Map"] {
        assert_eq!(check(truthy), "T", "{truthy} should be truthy");
    }

    // A null field is unresolved in strict mode and falsy in lenient mode.
    assert!(engine.render_string("{{if .Null}}T{{end}}", data.clone()).is_err());
    let lenient = engine_with(Config::default().strict_variables(false), &[]);
    assert_eq!(lenient.render_string("{{if .Null}}T{{else}}F{{end}}", data).unwrap(), "F");
}

#[test]
fn division_and_modulo_by_zero_error() {
    let engine = engine(&[]);
    for src in ["{{.A / 0}}", "{{.A % 0}}", "{{.F / 0}}", "{{.A / .Z}}"] {
        let err = engine.render_string(src, json!({"A": 5, "F": 1.5, "Z": 0})).unwrap_err();
        assert!(
            matches!(
                eval_root(&err),
                EvalError::DivisionByZero { .. } | EvalError::ModuloByZero { .. }
            ),
            "{src} should fail"
        );
    }
}

#[test]
fn arithmetic_and_grouping() {
    let engine = engine(&[]);
    let data = json!({"A": 2, "B": 3, "C": 5});
    assert_eq!(engine.render_string("{{.A + .B}}", data.clone()).unwrap(), "5");
    assert_eq!(engine.render_string("{{.C / .A}}", data.clone()).unwrap(), "2.5");
    assert_eq!(
        engine.render_string("{{if (.A + .B) == .C}}yes{{end}}", data.clone()).unwrap(),
        "yes"
    );
    assert!(engine.render_string("{{.A + .B == .C}}", data).unwrap_err().is_parse());
}

// =========================================
// Functions
// =========================================

#[test]
fn pipe_matches_nested_calls() {
    let engine = engine(&[]);
    let piped = engine.render_string(r#"{{upper " hello " | trim}}"#, Value::Null).unwrap();
    let nested = engine.render_string(r#"{{trim (upper " hello ")}}"#, Value::Null).unwrap();
    assert_eq!(piped, "HELLO");
    assert_eq!(piped, nested);
}

#[test]
fn builtin_functions_in_templates() {
    let engine = engine(&[]);
    let data = json!({"Tags": ["a", "b"], "Q": "a b&c", "Html": "<b>", "Missing": ""});
    let src = r#"{{join .Tags ", "}}|{{len .Tags}}|{{urlEncode .Q}}|{{htmlEscape .Html}}|{{default .Missing "n/a"}}|{{date "YYYY-MM-DD" "2024-03-09T10:00:00Z"}}"#;
    assert_eq!(
        engine.render_string(src, data).unwrap(),
        "a, b|2|a+b%26c|&lt;b&gt;|n/a|2024-03-09"
    );
}

#[test]
fn function_errors_surface() {
    let engine = engine(&[]);
    let err = engine.render_string("{{upper}}", Value::Null).unwrap_err();
    assert!(matches!(eval_root(&err), EvalError::Function { name, .. } if name == "upper"));

    let err = engine.render_string("{{shout 1}}", Value::Null).unwrap_err();
    assert!(matches!(eval_root(&err), EvalError::UnknownFunction { name, .. } if name == "shout"));
}

// =========================================
// Composition
// =========================================

const LAYOUT: &str = r#"<title>{{block "title"}}Site{{end}}</title><body>{{block "body"}}nothing{{end}}</body>"#;

#[test]
fn inheritance_overrides_one_block_regardless_of_order() {
    let engine = engine(&[
        ("layout", LAYOUT),
        ("a", r#"{{extends "layout"}}{{block "body"}}A{{end}}"#),
        ("b", "\n  {{extends \"layout\"}}\n{{block \"body\"}}B{{end}}{{block \"title\"}}Bee{{end}}"),
    ]);
    assert_eq!(engine.render("a", Value::Null).unwrap(), "<title>Site</title><body>A</body>");
    assert_eq!(engine.render("b", Value::Null).unwrap(), "<title>Bee</title><body>B</body>");
}

#[test]
fn conditional_extends_is_not_hoisted_by_folding() {
    let engine = engine(&[
        ("base", r#"<{{block "t"}}{{end}}>"#),
        ("page", r#"{{if true}}{{extends "base"}}{{end}}{{block "t"}}C{{end}}"#),
    ]);
    // Compiled entry point and raw include of the same source agree.
    assert_eq!(engine.render("page", Value::Null).unwrap(), "C");
    assert_eq!(engine.render_string(r#"{{include "page"}}"#, Value::Null).unwrap(), "C");
}

#[test]
fn circular_include_is_reported() {
    let engine = engine(&[("a", r#"{{include "b"}}"#), ("b", r#"{{include "a"}}"#)]);
    let err = engine.render_string(r#"{{include "a"}}"#, Value::Null).unwrap_err();
    assert!(matches!(eval_root(&err), EvalError::CircularInclude { .. }));
    assert!(err.to_string().contains("circular include"));
}

#[test]
fn compiled_dependencies_cover_the_include_graph() {
    let engine = engine(&[
        ("page", r#"{{extends "layout"}}{{block "body"}}{{include "card"}}{{end}}"#),
        ("layout", LAYOUT),
        ("card", r#"{{include "icon"}}"#),
        ("icon", "*"),
    ]);
    let compiled = engine.compile("page").unwrap();
    assert_eq!(compiled.dependencies, vec!["layout", "card", "icon"]);
    assert!(compiled.depends_on("icon"));
}

#[test]
fn missing_include_target_fails_compilation() {
    let engine = engine(&[("page", r#"{{include "ghost"}}"#)]);
    let err = engine.render("page", Value::Null).unwrap_err();
    assert_eq!(
        err,
        FithError::Compile(CompileError::TemplateNotFound { name: "ghost".into() })
    );
}

fn include_chain(n: usize) -> Vec<(String, String)> {
    (1..=n)
        .map(|i| {
            let body = if i == n {
                format!("{i}")
            } else {
                format!(r#"{i}{{{{include "t{}"}}}}"#, i + 1)
            };
            (format!("t{i}"), body)
        })
        .collect()
}

fn render_chain(n: usize, max: usize) -> Result<String, FithError> {
    let owned = include_chain(n);
    let templates: Vec<(&str, &str)> = owned.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let engine = engine_with(Config::default().max_include_depth(max), &templates);
    engine.render_string(r#"{{include "t1"}}"#, Value::Null)
}

#[test]
fn include_depth_boundary() {
    assert_eq!(render_chain(5, 5).unwrap(), "12345");
    assert_eq!(render_chain(4, 5).unwrap(), "1234");

    let err = render_chain(6, 5).unwrap_err();
    assert!(matches!(
        eval_root(&err),
        EvalError::IncludeDepthExceeded { name, max: 5 } if name == "t6"
    ));
}

// =========================================
// Determinism
// =========================================

#[test]
fn rendering_is_deterministic() {
    let engine = engine(&[("t", r#"{{range .}}{{@key}}{{.}}{{end}}{{# note #}}"#)]);
    let data = json!({"z": 1, "a": 2, "m": 3});
    let first = engine.render("t", data.clone()).unwrap();
    for _ in 0..5 {
        assert_eq!(engine.render("t", data.clone()).unwrap(), first);
    }
    assert_eq!(first, "a2m3z1");
}
