//! Parser tests.

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParserError;
    use crate::lexer::{Scanner, TokenKind};
    use crate::parser::Parser;

    fn parse(source: &str) -> Vec<Stmt> {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap()
    }

    fn parse_errors(source: &str) -> Vec<ParserError> {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).parse().unwrap_err()
    }

    fn parse_expr(source: &str) -> Expr {
        match parse(source).into_iter().next().unwrap() {
            Stmt::Expression(expr) => expr,
            _ => panic!("Expected expression statement"),
        }
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 should parse as 1 + (2 * 3)
        let expr = parse_expr("1 + 2 * 3;");
        match expr.kind {
            ExprKind::Binary {
                operator, right, ..
            } => {
                assert_eq!(operator.kind, TokenKind::Plus);
                match right.kind {
                    ExprKind::Binary { operator, .. } => {
                        assert_eq!(operator.kind, TokenKind::Star)
                    }
                    _ => panic!("Expected multiply on right"),
                }
            }
            _ => panic!("Expected add at top"),
        }
    }

    #[test]
    fn test_power_binds_tighter_than_factor() {
        let expr = parse_expr("2 * 3 ^ 2;");
        match expr.kind {
            ExprKind::Binary { right, .. } => match right.kind {
                ExprKind::Binary { operator, .. } => assert_eq!(operator.kind, TokenKind::Caret),
                _ => panic!("Expected power on right"),
            },
            _ => panic!("Expected binary expression"),
        }
    }

    #[test]
    fn test_pipe_and_ampersand_are_terms() {
        let expr = parse_expr("1 | 2 * 3;");
        match expr.kind {
            ExprKind::Binary { operator, .. } => assert_eq!(operator.kind, TokenKind::Pipe),
            _ => panic!("Expected pipe at top"),
        }
    }

    #[test]
    fn test_call_get_and_index_chain() {
        let expr = parse_expr("a.b(1, 2)[0];");
        match expr.kind {
            ExprKind::GetItem { object, .. } => match object.kind {
                ExprKind::Call {
                    callee, arguments, ..
                } => {
                    assert_eq!(arguments.len(), 2);
                    assert!(matches!(callee.kind, ExprKind::Get { .. }));
                }
                _ => panic!("Expected call"),
            },
            _ => panic!("Expected index"),
        }
    }

    #[test]
    fn test_assignment_targets() {
        assert!(matches!(parse_expr("a = 1;").kind, ExprKind::Assign { .. }));
        assert!(matches!(parse_expr("a.b = 1;").kind, ExprKind::Set { .. }));
        assert!(matches!(
            parse_expr("a[0] = 1;").kind,
            ExprKind::SetItem { .. }
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let errors = parse_errors("1 + 2 = 3;");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Invalid assignment target.");
    }

    #[test]
    fn test_logical_keywords() {
        match parse_expr("a or b and c;").kind {
            ExprKind::Logical { operator, right, .. } => {
                assert_eq!(operator.kind, TokenKind::Or);
                assert!(matches!(right.kind, ExprKind::Logical { .. }));
            }
            _ => panic!("Expected logical expression"),
        }
    }

    #[test]
    fn test_super_expression() {
        let stmts = parse("class B extends A { init() { super(A).init(); } }");
        match &stmts[0] {
            Stmt::Class(class) => {
                assert_eq!(class.superclasses.len(), 1);
                assert_eq!(class.methods[0].name.lexeme, "init");
            }
            _ => panic!("Expected class"),
        }
    }

    #[test]
    fn test_multiple_superclasses() {
        let stmts = parse("class C extends A, B {}");
        match &stmts[0] {
            Stmt::Class(class) => {
                let names: Vec<_> = class
                    .superclasses
                    .iter()
                    .map(|s| match &s.kind {
                        ExprKind::Variable(name) => name.lexeme.clone(),
                        _ => panic!("Expected variable"),
                    })
                    .collect();
                assert_eq!(names, vec!["A", "B"]);
            }
            _ => panic!("Expected class"),
        }
    }

    #[test]
    fn test_arrow_functions() {
        for source in ["(a, b) -> a + b;", "() -> 1;", "-> 1;", "(x) -> { return x; };"] {
            match parse_expr(source).kind {
                ExprKind::Lambda(decl) => {
                    assert!(decl.anonymous);
                    assert!(matches!(decl.body[0], Stmt::Return { .. }));
                }
                other => panic!("Expected lambda for {}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_grouping_is_not_arrow() {
        assert!(matches!(parse_expr("(a);").kind, ExprKind::Grouping(_)));
    }

    #[test]
    fn test_map_literal() {
        match parse_expr("x = {a: 1, b: 'two'};").kind {
            ExprKind::Assign { value, .. } => match value.kind {
                ExprKind::Map(entries) => {
                    assert_eq!(entries.len(), 2);
                    assert_eq!(entries[1].0.lexeme, "b");
                }
                _ => panic!("Expected map literal"),
            },
            _ => panic!("Expected assignment"),
        }
    }

    #[test]
    fn test_for_desugars_to_while() {
        let stmts = parse("for (var i = 0; i < 3; i = i + 1) { print i; }");
        match &stmts[0] {
            Stmt::Block(inner) => {
                assert!(matches!(inner[0], Stmt::Var { .. }));
                match &inner[1] {
                    Stmt::While { body, .. } => match body.as_ref() {
                        Stmt::Block(parts) => {
                            assert!(matches!(parts[0], Stmt::Block(_)));
                            assert!(matches!(parts[1], Stmt::Expression(_)));
                        }
                        _ => panic!("Expected body block"),
                    },
                    _ => panic!("Expected while"),
                }
            }
            _ => panic!("Expected block"),
        }
    }

    #[test]
    fn test_import_and_export() {
        let stmts = parse("from './lib' import a, b as c; export var x = 1;");
        match &stmts[0] {
            Stmt::Import(import) => {
                assert_eq!(import.path.string_value(), "./lib");
                assert_eq!(import.items[1].binding().lexeme, "c");
            }
            _ => panic!("Expected import"),
        }
        assert!(matches!(stmts[1], Stmt::Export(_)));
    }

    #[test]
    fn test_import_requires_items() {
        let errors = parse_errors("from './lib';");
        assert_eq!(errors[0].message, "Expect at least one import item.");
    }

    #[test]
    fn test_try_requires_handler() {
        let errors = parse_errors("try { print 1; }");
        assert_eq!(errors[0].message, "Expect catch or finally block.");
    }

    #[test]
    fn test_try_catch_finally() {
        let stmts = parse("try { throw Error('x'); } catch (e) { print e; } finally { print 1; }");
        match &stmts[0] {
            Stmt::Try(decl) => {
                assert_eq!(decl.catch_param.as_ref().unwrap().lexeme, "e");
                assert!(decl.finally_block.is_some());
            }
            _ => panic!("Expected try"),
        }
    }

    #[test]
    fn test_if_without_braces() {
        let stmts = parse("if (a) return 1;");
        match &stmts[0] {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(matches!(then_branch.as_ref(), Stmt::Return { .. }));
                assert!(else_branch.is_none());
            }
            _ => panic!("Expected if"),
        }
    }

    #[test]
    fn test_synchronize_reports_every_error() {
        let errors = parse_errors("var = 1;\nprint ;\nvar ok = 2;");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Expect variable name.");
        assert_eq!(errors[1].message, "Expect expression.");
        assert_eq!(errors[1].token.line, 2);
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        let errors = parse_errors("print 1");
        assert_eq!(errors[0].token.kind, TokenKind::Eof);
        assert_eq!(errors[0].message, "Expect ';' after value.");
    }
}
