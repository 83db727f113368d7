use super::*;

fn not(e: Expr) -> Expr {
    Expr::Unary {
        op: UnaryOp::Not,
        expr: Box::new(e),
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(
        expr("a + b * c"),
        Expr::binary(
            col("a"),
            BinaryOp::Plus,
            Expr::binary(col("b"), BinaryOp::Multiply, col("c"))
        )
    );
    assert_eq!(
        expr("a - b - c"),
        Expr::binary(
            Expr::binary(col("a"), BinaryOp::Minus, col("b")),
            BinaryOp::Minus,
            col("c")
        )
    );
}

#[test]
fn test_boolean_precedence() {
    assert_eq!(
        expr("a or b and c"),
        Expr::binary(
            col("a"),
            BinaryOp::Or,
            Expr::binary(col("b"), BinaryOp::And, col("c"))
        )
    );
    assert_eq!(
        expr("not a = b and c"),
        Expr::binary(
            not(Expr::binary(col("a"), BinaryOp::Eq, col("b"))),
            BinaryOp::And,
            col("c")
        )
    );
}

#[test]
fn test_not_equal_spellings() {
    assert_eq!(expr("a != b"), expr("a <> b"));
}

#[test]
fn test_unary_binds_tighter_than_multiplication() {
    assert_eq!(
        expr("-a * b"),
        Expr::binary(
            Expr::Unary {
                op: UnaryOp::Minus,
                expr: Box::new(col("a")),
            },
            BinaryOp::Multiply,
            col("b")
        )
    );
}

#[test]
fn test_between_and_like() {
    assert_eq!(
        expr("a between 1 and 2 and b"),
        Expr::binary(
            Expr::Between {
                expr: Box::new(col("a")),
                negated: false,
                low: Box::new(num("1")),
                high: Box::new(num("2")),
            },
            BinaryOp::And,
            col("b")
        )
    );
    match expr("name not like 'a%' escape '!'") {
        Expr::Like {
            negated,
            op,
            escape,
            ..
        } => {
            assert!(negated);
            assert_eq!(op, LikeOp::Like);
            assert!(escape.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_in_list_and_subquery() {
    assert_eq!(
        expr("a not in (1, 2)"),
        Expr::InList {
            expr: Box::new(col("a")),
            negated: true,
            list: vec![num("1"), num("2")],
        }
    );
    assert!(matches!(expr("a in (select b from t)"), Expr::InSubquery { .. }));
    assert!(matches!(
        expr("not exists (select 1)"),
        Expr::Exists { negated: true, .. }
    ));
}

#[test]
fn test_is_tests() {
    assert_eq!(
        expr("a is not null"),
        Expr::Is {
            expr: Box::new(col("a")),
            negated: true,
            test: IsTest::Null,
        }
    );
    assert!(matches!(
        expr("a is unknown"),
        Expr::Is {
            test: IsTest::Unknown,
            ..
        }
    ));
}

#[test]
fn test_case_expression() {
    match expr("case x when 1 then 'one' when 2 then 'two' else 'many' end") {
        Expr::Case {
            operand,
            branches,
            else_result,
        } => {
            assert_eq!(operand, Some(Box::new(col("x"))));
            assert_eq!(branches.len(), 2);
            assert!(else_result.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_casts() {
    match expr("cast(a as varchar(10))") {
        Expr::Cast {
            data_type, style, ..
        } => {
            assert_eq!(style, CastStyle::Function);
            assert!(data_type.is("VARCHAR"));
            assert_eq!(data_type.args, vec!["10".to_string()]);
        }
        other => panic!("unexpected {other:?}"),
    }
    match expr("a::timestamp with time zone") {
        Expr::Cast {
            data_type, style, ..
        } => {
            assert_eq!(style, CastStyle::DoubleColon);
            assert_eq!(data_type.time_zone, Some(true));
        }
        other => panic!("unexpected {other:?}"),
    }
    match expr("cast(x as double precision)") {
        Expr::Cast { data_type, .. } => assert_eq!(data_type.name, "double precision"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_quantified_comparison() {
    match expr("a = any (select b from t)") {
        Expr::Binary {
            op: BinaryOp::Eq,
            right,
            ..
        } => assert!(matches!(
            *right,
            Expr::Quantified {
                quantifier: Quantifier::Any,
                ..
            }
        )),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_concat_binds_tighter_than_unary_minus() {
    assert_eq!(
        expr("-a || b"),
        Expr::Unary {
            op: UnaryOp::Minus,
            expr: Box::new(Expr::binary(col("a"), BinaryOp::Concat, col("b"))),
        }
    );
}

#[test]
fn test_parentheses() {
    assert_eq!(expr("(a)"), Expr::Nested(Box::new(col("a"))));
    assert_eq!(expr("(a, b)"), Expr::Tuple(vec![col("a"), col("b")]));
    assert!(matches!(expr("(select 1)"), Expr::Subquery(_)));
}

#[test]
fn test_function_calls() {
    match expr("count(*)") {
        Expr::Function(call) => assert_eq!(call.args, FunctionArgs::Star),
        other => panic!("unexpected {other:?}"),
    }
    match expr("count(distinct a) filter (where a > 0)") {
        Expr::Function(call) => {
            assert!(call.distinct);
            assert!(call.filter.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
    match expr("row_number() over (partition by a order by b desc)") {
        Expr::Function(call) => {
            let over = call.over.unwrap();
            assert_eq!(over.partition_by, vec![col("a")]);
            assert_eq!(over.order_by[0].asc, Some(false));
        }
        other => panic!("unexpected {other:?}"),
    }
    match expr("left(name, 3)") {
        Expr::Function(call) => assert_eq!(call.name.base(), "left"),
        other => panic!("unexpected {other:?}"),
    }
    match expr("pkg.fn(1)") {
        Expr::Function(call) => assert_eq!(call.name.to_string(), "pkg.fn"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_literals_and_parameters() {
    assert_eq!(expr("true"), Expr::Literal(Literal::Boolean(true)));
    assert_eq!(expr("null"), Expr::Literal(Literal::Null));
    assert_eq!(
        expr("'it''s'"),
        Expr::Literal(Literal::String(SqlString::new("'it''s'")))
    );
    assert_eq!(
        expr("$1"),
        Expr::Parameter {
            text: "$1".to_string()
        }
    );
    assert_eq!(
        expr(":name"),
        Expr::Parameter {
            text: ":name".to_string()
        }
    );
    match expr("date '2024-01-01'") {
        Expr::TypedString { data_type, value } => {
            assert!(data_type.is("DATE"));
            assert_eq!(value.value(), "2024-01-01");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_json_operators_in_postgres() {
    assert_eq!(
        expr_in("doc ->> 'name'", Dialect::PostgreSql),
        Expr::binary(
            col("doc"),
            BinaryOp::JsonGetText,
            Expr::Literal(Literal::String(SqlString::new("'name'")))
        )
    );
}
