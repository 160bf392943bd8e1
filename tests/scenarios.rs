//! End-to-end translation through the public API

use jspy::frontend::ast::{BinOp, DeclKind, Expr, Stmt, VarDecl};
use jspy::frontend::lexer::Lexer;
use jspy::frontend::token::TokenKind;
use jspy::utils::NameKind;
use jspy::{check, translate, Error, Mode, Options};
use pretty_assertions::assert_eq;

fn output(source: &str) -> String {
    translate(source, &Options::default())
        .output
        .expect("no output generated")
}

#[test]
fn declaration_through_every_stage() {
    let source = "var x = 1 + 2;";

    let kinds: Vec<TokenKind> = Lexer::new(source)
        .tokenize()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Var,
            TokenKind::Identifier("x".to_string()),
            TokenKind::Assign,
            TokenKind::Number(1),
            TokenKind::Plus,
            TokenKind::Number(2),
            TokenKind::Semicolon,
        ]
    );

    let (program, warnings) = jspy::parse(source).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(
        program.body,
        vec![Stmt::VarDeclaration(VarDecl {
            kind: DeclKind::Var,
            name: "x".to_string(),
            init: Some(Expr::binary(BinOp::Add, Expr::Number(1), Expr::Number(2))),
        })]
    );

    assert_eq!(output(source), "x = 1 + 2");
}

#[test]
fn undeclared_use_still_generates() {
    let t = translate("console.log(y);", &Options::default());

    assert_eq!(
        t.diagnostics,
        vec![Error::UndeclaredVariable {
            name: "y".to_string()
        }]
    );
    assert_eq!(t.output.as_deref(), Some("print(y)"));
}

#[test]
fn for_loop_becomes_while() {
    assert_eq!(
        output("for (var i = 0; i < 3; i = i + 1) { console.log(i); }"),
        "i = 0\nwhile i < 3:\n    print(i)\n    i = i + 1"
    );
}

#[test]
fn redeclaration_reported_but_emitted() {
    let t = translate("var a = 1; var a = 2;", &Options::default());

    let redeclared: Vec<_> = t
        .diagnostics
        .iter()
        .filter(|e| matches!(e, Error::Redeclared { name, .. } if name == "a"))
        .collect();
    assert_eq!(redeclared.len(), 1);
    assert_eq!(t.output.as_deref(), Some("a = 1\na = 2"));
}

#[test]
fn array_length() {
    assert_eq!(
        output("const arr = [1, 2, 3]; console.log(arr.length);"),
        "arr = [1, 2, 3]\nprint(len(arr))"
    );
}

#[test]
fn bare_prompt_call() {
    assert_eq!(output("prompt(\"x\");"), "input(\"x\")");
}

#[test]
fn whole_program() {
    let source = r#"
        // guessing game
        function score(guess, target) {
            if (guess == target) {
                return 0;
            } else if (guess < target) {
                return -1;
            }
            return 1;
        }

        let tries = 0;
        let history = [];
        while (tries < 3) {
            var answer = prompt("Guess:");
            tries = tries + 1;
            if (score(answer, 7) == 0 && !false) {
                console.log("found after", tries);
                break;
            }
        }
        console.log(history.length);
    "#;

    let t = translate(source, &Options::default());
    assert!(t.diagnostics.is_empty(), "{:?}", t.diagnostics);
    assert_eq!(
        t.output.as_deref(),
        Some(
            "def score(guess, target):
    if guess == target:
        return 0
    elif guess < target:
        return -1
    return 1
tries = 0
history = []
while tries < 3:
    answer = input(\"Guess:\")
    tries = tries + 1
    if score(answer, 7) == 0 and not False:
        print(\"found after\", tries)
        break
print(len(history))"
        )
    );
}

#[test]
fn uninitialized_is_not_undeclared() {
    let t = check("var u; console.log(u);");

    assert_eq!(
        t.diagnostics,
        vec![Error::UninitializedVariable {
            name: "u".to_string()
        }]
    );
}

#[test]
fn arity_checked_for_user_functions_only() {
    let t = check(
        "function add(a, b) { return a + b; }
         add(1);
         add(1, 2);
         add(1, 2, 3);
         console.log();
         console.log(1, 2, 3, 4);",
    );

    let mismatches: Vec<_> = t
        .diagnostics
        .iter()
        .filter_map(|e| match e {
            Error::ArgCountMismatch { got, .. } => Some(*got),
            _ => None,
        })
        .collect();
    assert_eq!(mismatches, vec![1, 3]);
    assert_eq!(t.diagnostics.len(), 2);
}

#[test]
fn one_table_for_the_whole_program() {
    let t = check("function f() { var t = 1; } function g() { var t = 2; } console.log(t);");

    assert_eq!(
        t.diagnostics,
        vec![Error::Redeclared {
            name: "t".to_string(),
            kind: NameKind::Variable,
        }]
    );
}

#[test]
fn strict_mode_withholds_output() {
    let strict = Options {
        mode: Mode::Strict,
        ..Options::default()
    };

    assert!(translate("x = 1;", &strict).output.is_none());
    assert_eq!(translate("var x; x = 1;", &strict).output.as_deref(), Some("x = None\nx = 1"));
}

#[test]
fn fatal_errors_stop_the_pipeline() {
    let syntax = translate("var = 3;", &Options::default());
    assert!(syntax.output.is_none());
    assert!(matches!(syntax.fatal(), Some(Error::UnexpectedToken { .. })));

    let generation = translate("var s = \"abc\"; console.log(s.size);", &Options::default());
    assert!(generation.output.is_none());
    assert!(matches!(generation.fatal(), Some(Error::UnsupportedProperty { .. })));
}

#[test]
fn deep_nesting_is_a_syntax_error() {
    let depth = 200_000;
    let source = format!("var x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let t = translate(&source, &Options::default());

    assert!(t.output.is_none());
    assert!(matches!(t.fatal(), Some(Error::NestingTooDeep { .. })));

    let nots = format!("var y = {}true;", "!".repeat(200));
    assert!(translate(&nots, &Options::default()).output.is_some());
}

#[test]
fn translation_is_repeatable() {
    let source = "let n = 10; while (n > 0) { n = n - 3; }";
    let first = translate(source, &Options::default());
    let second = translate(source, &Options::default());

    assert_eq!(first.output, second.output);
    assert_eq!(first.diagnostics, second.diagnostics);
}
