//! Parser integration tests.
//!
//! Verifies that the parser builds the expected AST for every construct,
//! recovers from syntax errors, honors the error ceiling and produces a CST
//! that reproduces its input.

use bumpalo::Bump;
use limit_ast::*;
use limit_cst::{reconstruct_source, NodeDetail, NodeKind};
use limit_diagnostics::DiagnosticCategory;
use limit_parser::{parse_source, ParseResult, ParserOptions};

/// Helper: parse `source` with `options` and hand the result to `check`.
fn with_parse<R>(source: &str, options: ParserOptions, check: impl FnOnce(&ParseResult<'_>) -> R) -> R {
    let arena = Bump::new();
    let result = parse_source(&arena, "test.lm", source, options);
    check(&result)
}

/// Helper: parse without errors and inspect the top-level statements.
fn parse_clean<R>(source: &str, check: impl FnOnce(&[Statement<'_>]) -> R) -> R {
    with_parse(source, ParserOptions::default(), |result| {
        assert!(
            !result.has_errors(),
            "unexpected errors for {:?}: {:?}",
            source,
            messages(result)
        );
        check(result.program.statements)
    })
}

/// Helper: parse a single expression statement.
fn with_expression<R>(source: &str, check: impl FnOnce(&Expression<'_>) -> R) -> R {
    parse_clean(source, |stmts| {
        assert_eq!(stmts.len(), 1, "source: {}", source);
        match &stmts[0] {
            Statement::Expression(stmt) => check(stmt.expression),
            other => panic!("expected expression statement, got {:?}", other),
        }
    })
}

/// Helper: parse `type T = <source>;` and inspect the aliased type.
fn with_type<R>(source: &str, check: impl FnOnce(&TypeAnnotation<'_>) -> R) -> R {
    let text = format!("type T = {};", source);
    parse_clean(&text, |stmts| match &stmts[0] {
        Statement::TypeDeclaration(decl) => check(decl.ty),
        other => panic!("expected type declaration, got {:?}", other),
    })
}

/// Helper: the single initializer of `var x = <source>`.
fn with_initializer<R>(source: &str, check: impl FnOnce(&Expression<'_>) -> R) -> R {
    let text = format!("var x = {}", source);
    parse_clean(&text, |stmts| match &stmts[0] {
        Statement::VarDeclaration(decl) => check(decl.initializer.expect("initializer")),
        other => panic!("expected var declaration, got {:?}", other),
    })
}

fn messages(result: &ParseResult<'_>) -> Vec<String> {
    result
        .diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.message_text.clone())
        .collect()
}

/// Helper: diagnostic messages for `source` under default options.
fn diagnostics_of(source: &str) -> Vec<String> {
    with_parse(source, ParserOptions::default(), messages)
}

fn cst_options() -> ParserOptions {
    ParserOptions::default().with_cst_mode(true)
}

fn assert_cst_round_trip(source: &str) {
    with_parse(source, cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert_eq!(reconstruct_source(cst, true), source);
    });
}

fn class_of<'s, 'a>(stmt: &'s Statement<'a>) -> &'s ClassDeclaration<'a> {
    match stmt {
        Statement::ClassDeclaration(class) => class,
        other => panic!("expected class, got {:?}", other),
    }
}

fn function_of<'s, 'a>(stmt: &'s Statement<'a>) -> &'s FunctionDeclaration<'a> {
    match stmt {
        Statement::FunctionDeclaration(func) => func,
        other => panic!("expected function, got {:?}", other),
    }
}

fn is_int(expr: &Expression<'_>, text: &str) -> bool {
    matches!(expr.kind, ExpressionKind::Literal(Literal::Integer(value)) if value == text)
}

fn is_variable(expr: &Expression<'_>, name: &str) -> bool {
    matches!(expr.kind, ExpressionKind::Variable(value) if value == name)
}

// ============================================================================
// Operator precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    with_expression("1 + 2 * 3", |expr| match &expr.kind {
        ExpressionKind::Binary(add) => {
            assert_eq!(add.operator, BinaryOperator::Add);
            assert!(is_int(add.left, "1"));
            match &add.right.kind {
                ExpressionKind::Binary(mul) => assert_eq!(mul.operator, BinaryOperator::Multiply),
                other => panic!("expected multiplication, got {:?}", other),
            }
        }
        other => panic!("expected binary, got {:?}", other),
    });
}

#[test]
fn test_subtraction_is_left_associative() {
    with_expression("10 - 4 - 3", |expr| match &expr.kind {
        ExpressionKind::Binary(outer) => {
            assert!(is_int(outer.right, "3"));
            assert!(matches!(outer.left.kind, ExpressionKind::Binary(_)));
        }
        other => panic!("expected binary, got {:?}", other),
    });
}

#[test]
fn test_power_is_right_associative() {
    with_expression("2 ** 3 ** 2", |expr| match &expr.kind {
        ExpressionKind::Binary(outer) => {
            assert_eq!(outer.operator, BinaryOperator::Power);
            assert!(is_int(outer.left, "2"));
            match &outer.right.kind {
                ExpressionKind::Binary(inner) => {
                    assert_eq!(inner.operator, BinaryOperator::Power);
                    assert!(is_int(inner.left, "3"));
                    assert!(is_int(inner.right, "2"));
                }
                other => panic!("expected nested power, got {:?}", other),
            }
        }
        other => panic!("expected binary, got {:?}", other),
    });
}

#[test]
fn test_unary_minus_applies_to_power() {
    with_expression("-2 ** 2", |expr| match &expr.kind {
        ExpressionKind::Unary(unary) => {
            assert_eq!(unary.operator, UnaryOperator::Negate);
            match &unary.operand.kind {
                ExpressionKind::Binary(power) => assert_eq!(power.operator, BinaryOperator::Power),
                other => panic!("expected power, got {:?}", other),
            }
        }
        other => panic!("expected unary, got {:?}", other),
    });
}

#[test]
fn test_logical_operators() {
    with_expression("a or b and c", |expr| match &expr.kind {
        ExpressionKind::Binary(or) => {
            assert_eq!(or.operator, BinaryOperator::Or);
            match &or.right.kind {
                ExpressionKind::Binary(and) => assert_eq!(and.operator, BinaryOperator::And),
                other => panic!("expected and, got {:?}", other),
            }
        }
        other => panic!("expected binary, got {:?}", other),
    });
}

#[test]
fn test_range_expression() {
    with_expression("0..10", |expr| match &expr.kind {
        ExpressionKind::Range(range) => {
            assert!(range.inclusive);
            assert!(is_int(range.start, "0"));
            assert!(is_int(range.end, "10"));
        }
        other => panic!("expected range, got {:?}", other),
    });
}

#[test]
fn test_assignment_is_right_associative() {
    with_expression("a = b += 1", |expr| match &expr.kind {
        ExpressionKind::Assign(outer) => {
            assert_eq!(outer.operator, AssignOperator::Assign);
            match &outer.value.kind {
                ExpressionKind::Assign(inner) => {
                    assert_eq!(inner.operator, AssignOperator::AddAssign)
                }
                other => panic!("expected compound assignment, got {:?}", other),
            }
        }
        other => panic!("expected assignment, got {:?}", other),
    });
}

#[test]
fn test_invalid_assignment_target_is_reported() {
    with_parse("1 = 2", ParserOptions::default(), |result| {
        assert_eq!(messages(result), vec!["Invalid assignment target.".to_string()]);
        match &result.program.statements[0] {
            Statement::Expression(stmt) => {
                assert!(matches!(stmt.expression.kind, ExpressionKind::Assign(_)))
            }
            other => panic!("expected expression statement, got {:?}", other),
        }
    });
}

// ============================================================================
// Primary and postfix expressions
// ============================================================================

#[test]
fn test_tuple_versus_grouping() {
    with_expression("(1, 2)", |expr| match &expr.kind {
        ExpressionKind::Tuple(elements) => assert_eq!(elements.len(), 2),
        other => panic!("expected tuple, got {:?}", other),
    });
    with_expression("(1 + 2)", |expr| match &expr.kind {
        ExpressionKind::Grouping(inner) => match &inner.kind {
            ExpressionKind::Binary(add) => assert_eq!(add.operator, BinaryOperator::Add),
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected grouping, got {:?}", other),
    });
    with_expression("()", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Tuple(elements) if elements.is_empty()))
    });
}

#[test]
fn test_literals() {
    with_initializer("true", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Literal(Literal::Bool(true))))
    });
    with_initializer("nil", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Literal(Literal::Nil)))
    });
    with_initializer("3.25", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Literal(Literal::Float("3.25"))))
    });
    with_initializer("\"a\\tb\"", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Literal(Literal::String("a\tb"))))
    });
}

#[test]
fn test_invalid_integer_becomes_zero() {
    with_parse("var n = 99999999999999999999999", ParserOptions::default(), |result| {
        assert_eq!(
            messages(result),
            vec!["Invalid integer format: 99999999999999999999999".to_string()]
        );
        match &result.program.statements[0] {
            Statement::VarDeclaration(decl) => {
                assert!(is_int(decl.initializer.expect("initializer"), "0"))
            }
            other => panic!("expected var, got {:?}", other),
        }
    });
}

#[test]
fn test_list_and_dict_literals() {
    with_initializer("[1, 2, 3,]", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::List(items) if items.len() == 3))
    });
    with_initializer("{\"a\": 1, \"b\": 2}", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::Dict(entries) if entries.len() == 2))
    });
}

#[test]
fn test_call_with_named_arguments_and_trailing_comma() {
    with_expression("connect(host, port = 80, retry = true,)", |expr| match &expr.kind {
        ExpressionKind::Call(call) => {
            assert!(is_variable(call.callee, "connect"));
            assert_eq!(call.arguments.len(), 1);
            assert_eq!(call.named_arguments.len(), 2);
            assert_eq!(call.named_arguments[0].name, "port");
            assert!(is_int(call.named_arguments[0].value, "80"));
        }
        other => panic!("expected call, got {:?}", other),
    });
}

#[test]
fn test_member_call_index_chain() {
    with_expression("a.b.c(1)[0]", |expr| match &expr.kind {
        ExpressionKind::Index(index) => match &index.object.kind {
            ExpressionKind::Call(call) => match &call.callee.kind {
                ExpressionKind::Member(member) => {
                    assert_eq!(member.name, "c");
                    assert!(matches!(member.object.kind, ExpressionKind::Member(_)));
                }
                other => panic!("expected member, got {:?}", other),
            },
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected index, got {:?}", other),
    });
}

#[test]
fn test_tuple_index() {
    with_expression("pair.1", |expr| match &expr.kind {
        ExpressionKind::Index(index) => {
            assert!(is_variable(index.object, "pair"));
            assert!(is_int(index.index, "1"));
        }
        other => panic!("expected index, got {:?}", other),
    });
}

#[test]
fn test_this_and_super() {
    with_expression("this.name", |expr| match &expr.kind {
        ExpressionKind::Member(member) => assert!(matches!(member.object.kind, ExpressionKind::This)),
        other => panic!("expected member, got {:?}", other),
    });
    with_expression("super.init()", |expr| match &expr.kind {
        ExpressionKind::Call(call) => match &call.callee.kind {
            ExpressionKind::Member(member) => {
                assert!(matches!(member.object.kind, ExpressionKind::Super))
            }
            other => panic!("expected member, got {:?}", other),
        },
        other => panic!("expected call, got {:?}", other),
    });
}

#[test]
fn test_object_literal() {
    with_initializer("Point { x: 1, y: 2 }", |expr| match &expr.kind {
        ExpressionKind::ObjectLiteral(object) => {
            assert_eq!(object.constructor, "Point");
            let names: Vec<_> = object.properties.iter().map(|p| p.name).collect();
            assert_eq!(names, vec!["x", "y"]);
        }
        other => panic!("expected object literal, got {:?}", other),
    });
}

#[test]
fn test_lambda() {
    with_initializer("fn(a: int, b): int { return a + b }", |expr| match &expr.kind {
        ExpressionKind::Lambda(lambda) => {
            assert_eq!(lambda.params.len(), 2);
            assert!(lambda.params[0].type_annotation.is_some());
            assert!(lambda.params[1].type_annotation.is_none());
            assert!(lambda.return_type.is_some());
            assert_eq!(lambda.body.statements.len(), 1);
        }
        other => panic!("expected lambda, got {:?}", other),
    });
}

#[test]
fn test_immediately_called_lambda_statement() {
    with_expression("fn(x) { return x }(3)", |expr| match &expr.kind {
        ExpressionKind::Call(call) => {
            assert!(matches!(call.callee.kind, ExpressionKind::Lambda(_)));
            assert_eq!(call.arguments.len(), 1);
        }
        other => panic!("expected call, got {:?}", other),
    });
}

#[test]
fn test_error_and_ok_constructs() {
    with_initializer("err(NetworkError(404, \"down\"))", |expr| match &expr.kind {
        ExpressionKind::ErrorConstruct(construct) => {
            assert_eq!(construct.error_type, "NetworkError");
            assert_eq!(construct.arguments.len(), 2);
        }
        other => panic!("expected error construct, got {:?}", other),
    });
    with_initializer("ok(42)", |expr| {
        assert!(matches!(expr.kind, ExpressionKind::OkConstruct(value) if is_int(value, "42")))
    });
}

#[test]
fn test_fallible_expression() {
    with_initializer("compute()?", |expr| match &expr.kind {
        ExpressionKind::Fallible(fallible) => {
            assert!(fallible.else_variable.is_none());
            assert!(fallible.else_handler.is_none());
        }
        other => panic!("expected fallible, got {:?}", other),
    });
    with_initializer("divide(1, 0)? else e { print(e) }", |expr| match &expr.kind {
        ExpressionKind::Fallible(fallible) => {
            assert_eq!(fallible.else_variable, Some("e"));
            assert!(matches!(fallible.else_handler, Some(Statement::Block(_))));
        }
        other => panic!("expected fallible, got {:?}", other),
    });
}

#[test]
fn test_interpolated_string() {
    with_initializer("\"Hello, {name}!\"", |expr| match &expr.kind {
        ExpressionKind::InterpolatedString(parts) => {
            assert_eq!(parts.len(), 3);
            assert!(matches!(parts[0], InterpolationPart::Text("Hello, ")));
            assert!(matches!(parts[1], InterpolationPart::Expression(e) if is_variable(e, "name")));
            assert!(matches!(parts[2], InterpolationPart::Text("!")));
        }
        other => panic!("expected interpolation, got {:?}", other),
    });
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_dictionary_type() {
    with_type("{str: int}", |ty| match &ty.kind {
        TypeKind::Dict { key, value } => {
            assert!(key.is_primitive(PrimitiveType::Str));
            assert!(value.is_primitive(PrimitiveType::Int));
        }
        other => panic!("expected dict type, got {:?}", other),
    });
}

#[test]
fn test_structural_type() {
    with_type("{name: str, age: int}", |ty| match &ty.kind {
        TypeKind::Structural(record) => {
            let names: Vec<_> = record.fields.iter().map(|f| f.name).collect();
            assert_eq!(names, vec!["name", "age"]);
            assert!(!record.has_rest);
        }
        other => panic!("expected structural type, got {:?}", other),
    });
    with_type("{name: str, ...Base}", |ty| match &ty.kind {
        TypeKind::Structural(record) => {
            assert!(record.has_rest);
            assert_eq!(record.base_records, &["Base"]);
        }
        other => panic!("expected structural type, got {:?}", other),
    });
}

#[test]
fn test_optional_versus_fallible_suffix() {
    with_type("int?", |ty| {
        assert!(ty.is_optional());
        assert!(ty.is_primitive(PrimitiveType::Int));
    });
    with_type("int?NotFound", |ty| {
        assert!(ty.is_fallible());
        assert_eq!(ty.error_types(), &["NotFound"]);
    });
}

#[test]
fn test_error_list_stays_on_the_suffix_line() {
    parse_clean("var x: int?\ny = 5", |stmts| {
        assert_eq!(stmts.len(), 2);
        match &stmts[0] {
            Statement::VarDeclaration(decl) => {
                let ty = decl.type_annotation.expect("type annotation");
                assert!(ty.is_optional());
                assert!(decl.initializer.is_none());
            }
            other => panic!("expected var x, got {:?}", other),
        }
        match &stmts[1] {
            Statement::Expression(stmt) => {
                assert!(matches!(stmt.expression.kind, ExpressionKind::Assign(_)))
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    });
    with_type("int?NotFound, Timeout", |ty| {
        assert_eq!(ty.error_types(), &["NotFound", "Timeout"]);
    });
}

#[test]
fn test_union_intersection_and_refinement() {
    with_type("int | str | nil", |ty| {
        assert!(matches!(ty.kind, TypeKind::Union(members) if members.len() == 3))
    });
    with_type("Named and Aged", |ty| {
        assert!(matches!(ty.kind, TypeKind::Intersection(members) if members.len() == 2))
    });
    with_type("int where value > 0", |ty| {
        assert!(ty.refinement.is_some());
        assert!(ty.is_primitive(PrimitiveType::Int));
    });
}

#[test]
fn test_collection_and_tuple_types() {
    with_type("[int]", |ty| {
        assert!(matches!(ty.kind, TypeKind::List(element) if element.is_primitive(PrimitiveType::Int)))
    });
    with_type("list", |ty| {
        assert!(matches!(ty.kind, TypeKind::List(element) if element.is_primitive(PrimitiveType::Any)))
    });
    with_type("(int, str)", |ty| {
        assert!(matches!(ty.kind, TypeKind::Tuple(elements) if elements.len() == 2))
    });
    with_type("\"Some\"", |ty| assert!(matches!(ty.kind, TypeKind::Literal("Some"))));
    with_type("Result", |ty| assert!(matches!(ty.kind, TypeKind::Named("Result"))));
}

#[test]
fn test_function_type() {
    with_type("fn(a: int, b?: str): bool", |ty| match &ty.kind {
        TypeKind::Function(func) => {
            assert_eq!(func.params.len(), 2);
            assert_eq!(func.params[0].name, Some("a"));
            assert!(!func.params[0].is_optional);
            assert!(func.params[1].is_optional);
            assert!(func.return_type.is_primitive(PrimitiveType::Bool));
        }
        other => panic!("expected function type, got {:?}", other),
    });
    with_type("fn(int)", |ty| match &ty.kind {
        TypeKind::Function(func) => {
            assert_eq!(func.params[0].name, None);
            assert!(func.return_type.is_primitive(PrimitiveType::Nil));
        }
        other => panic!("expected function type, got {:?}", other),
    });
}

#[test]
fn test_type_display() {
    with_type("{str: [int]}?", |ty| assert_eq!(ty.to_string(), "{str: [int]}?"));
}

// ============================================================================
// Variable declarations
// ============================================================================

#[test]
fn test_var_declaration() {
    parse_clean("var count: int = 0;", |stmts| match &stmts[0] {
        Statement::VarDeclaration(decl) => {
            assert_eq!(decl.name, "count");
            assert!(decl.type_annotation.is_some_and(|t| t.is_primitive(PrimitiveType::Int)));
            assert!(is_int(decl.initializer.expect("initializer"), "0"));
            assert_eq!(decl.visibility, Visibility::Private);
            assert_eq!(decl.data.line, 1);
        }
        other => panic!("expected var, got {:?}", other),
    });
}

#[test]
fn test_semicolons_are_optional() {
    parse_clean("var a = 1\nvar b = 2\nprint(a)\nreturn", |stmts| {
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[1].line(), 2);
        assert_eq!(stmts[3].line(), 4);
    });
}

#[test]
fn test_destructuring_declaration() {
    parse_clean("var (a, b, c) = triple();", |stmts| match &stmts[0] {
        Statement::Destructuring(decl) => {
            assert_eq!(decl.names, &["a", "b", "c"]);
            assert!(matches!(decl.initializer.kind, ExpressionKind::Call(_)));
        }
        other => panic!("expected destructuring, got {:?}", other),
    });
}

#[test]
fn test_modifiers_and_annotations() {
    parse_clean("@inline pub const var limit = 10", |stmts| match &stmts[0] {
        Statement::VarDeclaration(decl) => {
            assert!(decl.modifiers.contains(Modifiers::PUB | Modifiers::CONST));
            assert_eq!(decl.visibility, Visibility::Public);
        }
        other => panic!("expected var, got {:?}", other),
    });
    parse_clean("data class Point {}", |stmts| {
        let class = class_of(&stmts[0]);
        assert!(class.modifiers.contains(Modifiers::DATA | Modifiers::FINAL));
    });
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_declaration() {
    let source = "fn divide[T](a: int, b: int = 1, label: str?): int?DivisionByZero, Overflow {\n    return a / b\n}";
    parse_clean(source, |stmts| {
        let func = function_of(&stmts[0]);
        assert_eq!(func.name, "divide");
        assert_eq!(func.generic_params, &["T"]);
        assert_eq!(func.params.len(), 1);
        assert_eq!(func.optional_params.len(), 2);
        assert_eq!(func.param_count(), 3);
        assert!(func.can_fail);
        assert_eq!(func.declared_error_types, &["DivisionByZero", "Overflow"]);
        assert_eq!(func.body.map(|b| b.statements.len()), Some(1));
    });
}

#[test]
fn test_function_without_body() {
    parse_clean("abstract fn area(): float;", |stmts| {
        let func = function_of(&stmts[0]);
        assert!(func.body.is_none());
        assert!(func.is_abstract());
        assert!(!func.can_fail);
    });
}

#[test]
fn test_return_without_value() {
    parse_clean("fn stop() { return }", |stmts| {
        let body = function_of(&stmts[0]).body.expect("body");
        assert!(matches!(body.statements[0], Statement::Return(ReturnStatement { value: None, .. })));
    });
}

// ============================================================================
// Classes
// ============================================================================

#[test]
fn test_inline_constructor_generates_init() {
    parse_clean("class P(x: int) { }", |stmts| {
        let class = class_of(&stmts[0]);
        assert_eq!(class.constructor_params.len(), 1);
        let init = class.method("init").expect("init method");
        assert_eq!(init.params.len(), 1);
        assert_eq!(init.params[0].name, "x");
        let body = init.body.expect("body");
        assert_eq!(body.statements.len(), 1);
        match &body.statements[0] {
            Statement::Expression(stmt) => match &stmt.expression.kind {
                ExpressionKind::Assign(assign) => {
                    assert!(matches!(
                        assign.target.kind,
                        ExpressionKind::Member(MemberExpression { name: "x", .. })
                    ));
                    assert!(is_variable(assign.value, "x"));
                }
                other => panic!("expected assignment, got {:?}", other),
            },
            other => panic!("expected expression statement, got {:?}", other),
        }
    });
}

#[test]
fn test_inline_constructor_calls_super_init() {
    parse_clean("class C(a: int, b: str) : Base(a) { }", |stmts| {
        let class = class_of(&stmts[0]);
        assert_eq!(class.superclass, Some("Base"));
        assert_eq!(class.super_args.len(), 1);
        let body = class.method("init").and_then(|m| m.body).expect("init body");
        assert_eq!(body.statements.len(), 3);
        match &body.statements[0] {
            Statement::Expression(stmt) => match &stmt.expression.kind {
                ExpressionKind::Call(call) => {
                    assert_eq!(call.arguments.len(), 1);
                    assert!(matches!(
                        call.callee.kind,
                        ExpressionKind::Member(MemberExpression { name: "init", .. })
                    ));
                }
                other => panic!("expected call, got {:?}", other),
            },
            other => panic!("expected expression statement, got {:?}", other),
        }
    });
}

#[test]
fn test_class_members() {
    let source = r#"
class Animal : Base {
    var name: str = "x"
    pub static fn create(): Animal { return Animal { name: "a" } }
    Animal(name: str) { this.name = name }
    age: int = 3;
    private legs: int
}
"#;
    parse_clean(source, |stmts| {
        let class = class_of(&stmts[0]);
        assert_eq!(class.name, "Animal");
        let fields: Vec<_> = class.fields.iter().map(|f| f.name).collect();
        assert_eq!(fields, vec!["name", "age", "legs"]);
        let methods: Vec<_> = class.methods.iter().map(|m| m.name).collect();
        assert_eq!(methods, vec!["create", "Animal"]);
        assert!(class.methods[0].modifiers.contains(Modifiers::PUB | Modifiers::STATIC));
        assert!(class.method("init").is_none());
    });
}

#[test]
fn test_invalid_class_member() {
    let messages = diagnostics_of("class A { 42 }");
    assert_eq!(messages[0], "Expected class member declaration.");
    let messages = diagnostics_of("class A { size int }");
    assert_eq!(messages[0], "Expected ':' after field name in class member declaration.");
}

// ============================================================================
// Enums, type aliases, traits, interfaces, modules, imports
// ============================================================================

#[test]
fn test_enum_declaration() {
    parse_clean("enum Shape { Circle(float), Square(float), Empty, }", |stmts| match &stmts[0] {
        Statement::EnumDeclaration(decl) => {
            assert_eq!(decl.name, "Shape");
            assert_eq!(decl.variants.len(), 3);
            assert!(decl.variants[0].payload.is_some());
            assert!(decl.variants[2].payload.is_none());
        }
        other => panic!("expected enum, got {:?}", other),
    });
}

#[test]
fn test_trait_declaration() {
    let source = "trait open Drawable {\n    fn draw(ctx: Canvas): nil;\n    fn size(): int { return 1 }\n}";
    parse_clean(source, |stmts| match &stmts[0] {
        Statement::TraitDeclaration(decl) => {
            assert!(decl.is_open);
            assert_eq!(decl.methods.len(), 2);
            assert!(decl.methods[0].body.is_none());
            assert!(decl.methods[1].body.is_some());
        }
        other => panic!("expected trait, got {:?}", other),
    });
    assert_eq!(
        diagnostics_of("trait T { var x = 1 }")[0],
        "Expected method declaration in trait."
    );
}

#[test]
fn test_interface_declaration() {
    parse_clean("interface @open Shape { fn area(): float; }", |stmts| match &stmts[0] {
        Statement::InterfaceDeclaration(decl) => {
            assert!(decl.is_open);
            assert_eq!(decl.methods.len(), 1);
            assert!(decl.methods[0].body.is_none());
        }
        other => panic!("expected interface, got {:?}", other),
    });
    assert_eq!(
        diagnostics_of("interface I { x: int }")[0],
        "Expected method declaration in interface."
    );
}

#[test]
fn test_module_buckets_members() {
    let source = r#"
module geometry {
    @public fn area(r: float): float { return r }
    @protected var scale = 2
    fn helper() {}
}
"#;
    parse_clean(source, |stmts| match &stmts[0] {
        Statement::ModuleDeclaration(module) => {
            assert_eq!(module.name, "geometry");
            assert_eq!(module.public_members.len(), 1);
            assert_eq!(module.protected_members.len(), 1);
            assert_eq!(module.private_members.len(), 1);
        }
        other => panic!("expected module, got {:?}", other),
    });
}

#[test]
fn test_import_declarations() {
    parse_clean("import std.math as m show sin, cos;", |stmts| match &stmts[0] {
        Statement::ImportDeclaration(import) => {
            assert_eq!(import.path, "std.math");
            assert_eq!(import.alias, Some("m"));
            let filter = import.filter.as_ref().expect("filter");
            assert_eq!(filter.kind, ImportFilterKind::Show);
            assert_eq!(filter.names, &["sin", "cos"]);
        }
        other => panic!("expected import, got {:?}", other),
    });
    parse_clean("import (\"lib/util.lm\")", |stmts| match &stmts[0] {
        Statement::ImportDeclaration(import) => {
            assert_eq!(import.path, "lib/util.lm");
            assert!(import.filter.is_none());
        }
        other => panic!("expected import, got {:?}", other),
    });
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_elif_chain_nests_through_else_branch() {
    let source = "if (a) { x = 1 } elif (b) { x = 2 } elif (c) { x = 3 } else { x = 4 }";
    parse_clean(source, |stmts| {
        let Statement::If(first) = &stmts[0] else { panic!("expected if") };
        assert!(is_variable(first.condition, "a"));
        let Some(Statement::If(second)) = first.else_branch else { panic!("expected elif b") };
        assert!(is_variable(second.condition, "b"));
        let Some(Statement::If(third)) = second.else_branch else { panic!("expected elif c") };
        assert!(is_variable(third.condition, "c"));
        assert!(matches!(third.else_branch, Some(Statement::Block(_))));
    });
}

#[test]
fn test_if_without_braces() {
    parse_clean("if (ready) print(1) else print(2)", |stmts| match &stmts[0] {
        Statement::If(stmt) => {
            assert!(matches!(stmt.then_branch, Statement::Print(_)));
            assert!(matches!(stmt.else_branch, Some(Statement::Print(_))));
        }
        other => panic!("expected if, got {:?}", other),
    });
}

#[test]
fn test_for_loop_shapes() {
    parse_clean("for (var i = 0; i < 10; i += 1) { }", |stmts| match &stmts[0] {
        Statement::For(stmt) => match &stmt.kind {
            ForKind::Traditional {
                initializer,
                condition,
                increment,
            } => {
                assert!(matches!(initializer, Some(Statement::VarDeclaration(_))));
                assert!(condition.is_some());
                assert!(increment.is_some());
            }
            other => panic!("expected traditional loop, got {:?}", other),
        },
        other => panic!("expected for, got {:?}", other),
    });

    parse_clean("for (x in items) print(x)", |stmts| match &stmts[0] {
        Statement::For(ForStatement {
            kind:
                ForKind::Iterable {
                    variable,
                    second_variable,
                    ..
                },
            ..
        }) => {
            assert_eq!(*variable, "x");
            assert_eq!(*second_variable, None);
        }
        other => panic!("expected iterable loop, got {:?}", other),
    });

    parse_clean("for (var k, v in pairs) { }", |stmts| match &stmts[0] {
        Statement::For(ForStatement {
            kind:
                ForKind::Iterable {
                    variable,
                    second_variable,
                    ..
                },
            ..
        }) => {
            assert_eq!(*variable, "k");
            assert_eq!(*second_variable, Some("v"));
        }
        other => panic!("expected iterable loop, got {:?}", other),
    });

    parse_clean("for (i = 0; i < 3; i += 1) { }", |stmts| {
        assert!(matches!(
            &stmts[0],
            Statement::For(ForStatement {
                kind: ForKind::Traditional {
                    initializer: Some(Statement::Expression(_)),
                    ..
                },
                ..
            })
        ));
    });

    parse_clean("for (;;) { break }", |stmts| {
        assert!(matches!(
            &stmts[0],
            Statement::For(ForStatement {
                kind: ForKind::Traditional {
                    initializer: None,
                    condition: None,
                    increment: None,
                },
                ..
            })
        ));
    });
}

#[test]
fn test_while_break_continue() {
    parse_clean("while (true) { break; continue }", |stmts| match &stmts[0] {
        Statement::While(stmt) => match stmt.body {
            Statement::Block(block) => {
                assert!(matches!(block.statements[0], Statement::Break(_)));
                assert!(matches!(block.statements[1], Statement::Continue(_)));
            }
            other => panic!("expected block, got {:?}", other),
        },
        other => panic!("expected while, got {:?}", other),
    });
}

#[test]
fn test_iter_statement() {
    parse_clean("iter (i in 0..10) { print(i) }", |stmts| match &stmts[0] {
        Statement::Iter(stmt) => {
            assert_eq!(stmt.variable, "i");
            assert!(matches!(stmt.iterable.kind, ExpressionKind::Range(_)));
        }
        other => panic!("expected iter, got {:?}", other),
    });
    parse_clean("iter (var k, v in table) { }", |stmts| match &stmts[0] {
        Statement::Iter(stmt) => assert_eq!(stmt.second_variable, Some("v")),
        other => panic!("expected iter, got {:?}", other),
    });
}

#[test]
fn test_iter_errors() {
    assert_eq!(
        diagnostics_of("iter (1 in xs) { }")[0],
        "Expected variable name or identifier after 'iter ('."
    );
    assert_eq!(diagnostics_of("iter (x xs) { }")[0], "Expected 'in' after loop variable.");
}

#[test]
fn test_match_statement_patterns() {
    let source = r#"
match (value) {
    1 => print("one"),
    val n where n > 10 => print(n),
    err e => print(e),
    [a, b, ...rest] => print(a),
    {name, age: years} => print(name),
    (x, y) => print(x),
    int => print("int"),
    Some(x) -> print(x),
    NetworkError(code) => print(code),
    _ => print("other")
}
"#;
    parse_clean(source, |stmts| {
        let Statement::Match(stmt) = &stmts[0] else { panic!("expected match") };
        let cases = stmt.cases;
        assert_eq!(cases.len(), 10);
        assert!(is_int(cases[0].pattern, "1"));
        assert!(matches!(cases[1].pattern.kind, ExpressionKind::ValPattern("n")));
        assert!(cases[1].guard.is_some());
        assert!(matches!(
            cases[2].pattern.kind,
            ExpressionKind::ErrPattern(ErrPattern { variable: Some("e"), error_type: None })
        ));
        match &cases[3].pattern.kind {
            ExpressionKind::ListPattern(list) => {
                assert_eq!(list.elements.len(), 2);
                assert_eq!(list.rest, Some("rest"));
            }
            other => panic!("expected list pattern, got {:?}", other),
        }
        match &cases[4].pattern.kind {
            ExpressionKind::DictPattern(dict) => {
                assert_eq!(dict.fields.len(), 2);
                assert_eq!(dict.fields[0].binding, None);
                assert_eq!(dict.fields[1].binding, Some("years"));
            }
            other => panic!("expected dict pattern, got {:?}", other),
        }
        assert!(matches!(cases[5].pattern.kind, ExpressionKind::TuplePattern(items) if items.len() == 2));
        assert!(matches!(
            cases[6].pattern.kind,
            ExpressionKind::TypePattern(ty) if ty.is_primitive(PrimitiveType::Int)
        ));
        assert!(matches!(
            cases[7].pattern.kind,
            ExpressionKind::BindingPattern(BindingPattern { type_name: "Some", variable: "x" })
        ));
        match &cases[8].pattern.kind {
            ExpressionKind::ErrorTypePattern(pattern) => {
                assert_eq!(pattern.error_type, "NetworkError");
                assert_eq!(pattern.params, &["code"]);
            }
            other => panic!("expected error type pattern, got {:?}", other),
        }
        assert!(matches!(cases[9].pattern.kind, ExpressionKind::Wildcard));
    });
}

#[test]
fn test_match_errors() {
    assert_eq!(
        diagnostics_of("match (v) { 1 print(1) }")[0],
        "Expected '=>' after match pattern."
    );
    assert_eq!(diagnostics_of("match (v) { => 1 }")[0], "Expected pattern in match case.");
}

// ============================================================================
// Concurrency, contracts, comptime, unsafe
// ============================================================================

#[test]
fn test_parallel_block_with_parameters() {
    let source = "parallel(ch=results, mode=\"batch\", cores=4, timeout=30s) {\n    task(i in items) { print(i) }\n}";
    parse_clean(source, |stmts| match &stmts[0] {
        Statement::Parallel(stmt) => {
            assert_eq!(stmt.channel, "results");
            assert_eq!(stmt.mode, "batch");
            assert_eq!(stmt.cores, "4");
            assert_eq!(stmt.timeout, "30s");
            assert_eq!(stmt.on_error, "stop");
            assert_eq!(stmt.on_timeout, "partial");
            match &stmt.body.statements[0] {
                Statement::Task(task) => {
                    assert_eq!(task.loop_variable, Some("i"));
                    assert!(task.iterable.is_some_and(|e| is_variable(e, "items")));
                }
                other => panic!("expected task, got {:?}", other),
            }
        }
        other => panic!("expected parallel, got {:?}", other),
    });
}

#[test]
fn test_concurrent_block_defaults() {
    parse_clean("concurrent { worker(item) { print(item) } }", |stmts| match &stmts[0] {
        Statement::Concurrent(stmt) => {
            assert_eq!(stmt.mode, "batch");
            assert_eq!(stmt.cores, "auto");
            assert_eq!(stmt.channel, "");
            assert_eq!(stmt.grace, "0");
            assert!(matches!(
                stmt.body.statements[0],
                Statement::Worker(WorkerStatement { param: Some("item"), .. })
            ));
        }
        other => panic!("expected concurrent, got {:?}", other),
    });
    parse_clean("parallel { }", |stmts| {
        assert!(matches!(&stmts[0], Statement::Parallel(s) if s.mode == "fork-join"));
    });
}

#[test]
fn test_concurrency_typed_parameter() {
    parse_clean("concurrent(ch: channel, on_error=auto) { }", |stmts| match &stmts[0] {
        Statement::Concurrent(stmt) => {
            assert_eq!(stmt.typed_params.len(), 1);
            assert_eq!(stmt.typed_params[0].name, "ch");
            assert_eq!(stmt.on_error, "auto");
        }
        other => panic!("expected concurrent, got {:?}", other),
    });
}

#[test]
fn test_unknown_concurrency_parameter_is_not_fatal() {
    with_parse("parallel(speed=1) { print(1) }", ParserOptions::default(), |result| {
        assert_eq!(messages(result), vec!["Unknown parameter: speed".to_string()]);
        assert!(matches!(result.program.statements[0], Statement::Parallel(_)));
    });
}

#[test]
fn test_task_outside_concurrent_block_warns() {
    with_parse("task(x) { print(x) }", ParserOptions::default(), |result| {
        assert!(!result.has_errors());
        let diagnostics = result.diagnostics.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].category, DiagnosticCategory::Warning);
        assert!(matches!(result.program.statements[0], Statement::Task(_)));
    });
    parse_clean("task(5)", |stmts| {
        assert!(matches!(stmts[0], Statement::Expression(_)));
    });
}

#[test]
fn test_contract_comptime_unsafe() {
    parse_clean("contract(x > 0, \"positive\");", |stmts| match &stmts[0] {
        Statement::Contract(stmt) => assert!(stmt.message.is_some()),
        other => panic!("expected contract, got {:?}", other),
    });
    parse_clean("comptime var size = 4", |stmts| match &stmts[0] {
        Statement::Comptime(stmt) => {
            assert!(matches!(stmt.declaration, Statement::VarDeclaration(_)))
        }
        other => panic!("expected comptime, got {:?}", other),
    });
    parse_clean("unsafe { poke(1) }", |stmts| match &stmts[0] {
        Statement::Unsafe(stmt) => assert_eq!(stmt.body.statements.len(), 1),
        other => panic!("expected unsafe, got {:?}", other),
    });
}

// ============================================================================
// Error recovery
// ============================================================================

#[test]
fn test_recovery_resumes_at_next_statement() {
    with_parse("var x = ; var y = 5;", ParserOptions::default(), |result| {
        assert!(result.has_errors());
        assert_eq!(messages(result), vec!["Expected expression.".to_string()]);
        assert_eq!(result.program.statements.len(), 2);
        match &result.program.statements[0] {
            Statement::VarDeclaration(decl) => {
                assert_eq!(decl.name, "x");
                let init = decl.initializer.expect("placeholder initializer");
                assert!(matches!(init.kind, ExpressionKind::Error));
            }
            other => panic!("expected var x, got {:?}", other),
        }
        match &result.program.statements[1] {
            Statement::VarDeclaration(decl) => {
                assert_eq!(decl.name, "y");
                assert!(is_int(decl.initializer.expect("initializer"), "5"));
            }
            other => panic!("expected var y, got {:?}", other),
        }
    });
}

#[test]
fn test_synchronize_skips_to_statement_boundary() {
    with_parse("var = 5; print(1)", ParserOptions::default(), |result| {
        assert_eq!(messages(result), vec!["Expected variable name.".to_string()]);
        assert_eq!(result.program.statements.len(), 1);
        assert!(matches!(result.program.statements[0], Statement::Print(_)));
    });
}

#[test]
fn test_recovery_inside_block() {
    with_parse("fn f() { var = 1; var y = 2 }", ParserOptions::default(), |result| {
        assert_eq!(messages(result).len(), 1);
        let body = function_of(&result.program.statements[0]).body.expect("body");
        assert_eq!(body.statements.len(), 1);
    });
}

#[test]
fn test_unclosed_function_reports_cause() {
    let messages = diagnostics_of("fn f() {\n    var x = 1\n");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Expected '}' after block."));
    assert!(messages[0].contains("Caused by: Unterminated function starting at line 1:"));
    assert!(messages[0].contains("unclosed function starts here"));
}

#[test]
fn test_unclosed_class_reports_cause() {
    let messages = diagnostics_of("class A {\n    var x = 1\n");
    assert!(messages[0].contains("Caused by: Unterminated class starting at line 1:"));
}

#[test]
fn test_unclosed_if_block_reports_block() {
    let messages = diagnostics_of("if (a) {\n    print(1)\n");
    assert!(messages[0].contains("Unterminated if starting at line 1:"));
    assert!(messages[0].contains("unclosed block starts here"));
}

#[test]
fn test_stray_closing_brace() {
    with_parse("}\nvar a = 1", ParserOptions::default(), |result| {
        assert_eq!(messages(result), vec!["Unexpected closing brace '}'.".to_string()]);
        assert_eq!(result.program.statements.len(), 1);
    });
}

#[test]
fn test_diagnostic_location() {
    with_parse("var a = 1\nvar = 2", ParserOptions::default(), |result| {
        let diagnostic = &result.diagnostics.diagnostics()[0];
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.column, 5);
        assert_eq!(diagnostic.source_line.as_deref(), Some("var = 2"));
        assert_eq!(diagnostic.file.as_deref(), Some("test.lm"));
    });
}

#[test]
fn test_error_ceiling_stops_parse() {
    let source = "var = 1;\n".repeat(150);
    with_parse(&source, ParserOptions::default(), |result| {
        assert!(result.aborted);
        let count = result.diagnostics.len();
        assert!((100..=102).contains(&count), "got {} diagnostics", count);
        assert!(messages(result).last().is_some_and(|m| m.contains("parsing stopped")));
    });

    let options = ParserOptions::default().with_max_errors(10);
    with_parse(&source, options, |result| {
        assert!(result.aborted);
        assert_eq!(result.diagnostics.error_count(), 11);
    });
}

#[test]
fn test_below_error_ceiling_does_not_abort() {
    let source = "var = 1;\n".repeat(5);
    with_parse(&source, ParserOptions::default(), |result| {
        assert!(!result.aborted);
        assert_eq!(result.diagnostics.len(), 5);
    });
}

#[test]
fn test_deep_nesting_is_bounded() {
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let source = format!("{}1{}", "(".repeat(400), ")".repeat(400));
            let messages = diagnostics_of(&source);
            assert!(messages.iter().any(|m| m == "Maximum nesting depth exceeded."));

            let blocks = format!("{}{}", "{".repeat(400), "}".repeat(400));
            let messages = diagnostics_of(&blocks);
            assert!(!messages.is_empty());
        })
        .expect("spawn parser thread");
    handle.join().expect("parser thread panicked");
}

// ============================================================================
// CST
// ============================================================================

#[test]
fn test_cst_round_trip_preserves_trivia() {
    assert_cst_round_trip("var x = 1;\n");
    assert_cst_round_trip("  var   spaced\t=  2 ;  \n\n");
    assert_cst_round_trip("// leading comment\nfn f(a: int) {\n\treturn a /* inline */ + 1\n}\n");
    assert_cst_round_trip("class P(x: int) : Base(x) {\n  \tvar y = 2 // trailing\n}\n/* end */");
    assert_cst_round_trip("for (var i = 0; i < 3; i += 1) { print(\"{i}!\") }\n");
    assert_cst_round_trip("");
}

#[test]
fn test_cst_round_trip_after_errors() {
    assert_cst_round_trip("var x = ;\nclass {\n  fn ( {\n");
    assert_cst_round_trip("}} ) var = = 1; print(");
}

#[test]
fn test_cst_round_trip_after_abort() {
    let source = "var = 1;\n".repeat(30);
    let options = cst_options().with_max_errors(10);
    with_parse(&source, options, |result| {
        assert!(result.aborted);
        let cst = result.cst.as_ref().expect("cst");
        assert!(cst.has_errors());
        assert!(!cst.is_valid);
        assert_eq!(reconstruct_source(cst, true), source);
    });
}

#[test]
fn test_cst_absent_without_cst_mode() {
    with_parse("var x = 1", ParserOptions::default(), |result| assert!(result.cst.is_none()));
}

#[test]
fn test_cst_statement_nodes() {
    with_parse("var x = 1\nfn f() { return x }", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert_eq!(cst.kind, NodeKind::Program);
        assert!(!cst.has_errors());
        assert_eq!(cst.find_children(NodeKind::VarDeclaration).len(), 1);
        let func = cst.find_child(NodeKind::FunctionDeclaration).expect("function node");
        assert_eq!(func.find_descendants(NodeKind::ReturnStatement).len(), 1);
        assert!(func.find_child(NodeKind::Block).is_some());
    });
}

#[test]
fn test_cst_declarations_carry_descriptions() {
    let source = "class P { fn area() { return 1 } }\nfn main() {}\ntrait T { fn name(): str; }";
    with_parse(source, cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        let class = cst.find_child(NodeKind::ClassDeclaration).expect("class node");
        assert_eq!(class.description.as_deref(), Some("class P"));
        let methods = class.find_descendants(NodeKind::FunctionDeclaration);
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].description.as_deref(), Some("method area"));
        let main = cst.find_child(NodeKind::FunctionDeclaration).expect("function node");
        assert_eq!(main.description.as_deref(), Some("function main"));
        let trait_node = cst.find_child(NodeKind::TraitDeclaration).expect("trait node");
        assert_eq!(trait_node.description.as_deref(), Some("trait T"));
        assert!(cst.to_tree_string().contains("(class P)"));
    });
}

#[test]
fn test_cst_declaration_adopts_prefix() {
    with_parse("@inline pub fn f() {}", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        let func = cst.find_child(NodeKind::FunctionDeclaration).expect("function node");
        assert!(func.text_without_trivia().starts_with("@inline"));
    });
}

#[test]
fn test_cst_detailed_expression_nodes() {
    with_parse("var x = 1 + 2 * 3", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert!(cst.find_descendants(NodeKind::BinaryExpr).is_empty());
    });
    let options = cst_options().with_detailed_expression_nodes(true);
    with_parse("var x = 1 + 2 * 3", options, |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert_eq!(cst.find_descendants(NodeKind::BinaryExpr).len(), 2);
        assert_eq!(cst.find_descendants(NodeKind::LiteralExpr).len(), 3);
    });
}

#[test]
fn test_cst_type_and_pattern_nodes() {
    with_parse("type T = {name: str}\nmatch (v) { [a] => print(a) }", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert_eq!(cst.find_descendants(NodeKind::StructuralType).len(), 1);
        assert_eq!(cst.find_descendants(NodeKind::ListPattern).len(), 1);
        assert_eq!(cst.find_descendants(NodeKind::MatchCase).len(), 1);
    });
}

#[test]
fn test_cst_missing_and_incomplete_nodes() {
    with_parse("print(1", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert!(cst.has_errors());
        let missing = cst.find_descendants(NodeKind::Missing);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].detail, NodeDetail::Missing { expected: ")".to_string() });
        let incomplete = cst.find_descendants(NodeKind::Incomplete);
        assert_eq!(incomplete.len(), 1);
        assert_eq!(
            incomplete[0].detail,
            NodeDetail::Incomplete { target: NodeKind::PrintStatement }
        );
    });
}

#[test]
fn test_cst_error_node_wraps_skipped_tokens() {
    with_parse("var = 5 6; var y = 1", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        let errors = cst.find_descendants(NodeKind::Error);
        assert!(!errors.is_empty());
        assert!(errors[0].text_without_trivia().contains('6'));
        assert_eq!(cst.find_children(NodeKind::VarDeclaration).len(), 1);
    });
}

#[test]
fn test_cst_rewind_discards_speculative_tokens() {
    with_parse("for (var i = 0; i < 2; i += 1) { }", cst_options(), |result| {
        let cst = result.cst.as_ref().expect("cst");
        assert!(!cst.has_errors());
        let for_node = cst.find_child(NodeKind::ForStatement).expect("for node");
        let var_keywords = for_node
            .all_tokens()
            .into_iter()
            .filter(|t| t.text == "var")
            .count();
        assert_eq!(var_keywords, 1);
    });
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_options_from_partial_json() {
    let options: ParserOptions = serde_json::from_str(r#"{"cstMode": true}"#).expect("valid json");
    assert!(options.cst_mode);
    assert!(!options.detailed_expression_nodes);
    assert_eq!(options.max_errors, 100);
}
