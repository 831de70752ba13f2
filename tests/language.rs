use lilt::{Compiler, ErrorKind, Program, RuntimeError, Value};

fn run(source: &str) -> Program {
    let compiler = Compiler::new();
    let mut program = compiler.compile(source)
                              .unwrap_or_else(|e| panic!("parse failed:\n{}",
                                                         e.show("<test>", source)));
    program.run()
           .unwrap_or_else(|e| panic!("run failed:\n{}", e.show("<test>", source)));
    program
}

fn run_err(source: &str) -> RuntimeError {
    let compiler = Compiler::new();
    let mut program = compiler.compile(source).expect("script should parse");
    program.run().expect_err("script was expected to fail")
}

fn int(program: &Program, name: &str) -> i64 {
    program.var::<i64>(name).unwrap()
}

#[test]
fn declarations_and_arithmetic() {
    let program = run("int x; int y = 2 + 3 * 4; int z = (2 + 3) * 4;");

    assert_eq!(int(&program, "x"), 0);
    assert_eq!(int(&program, "y"), 14);
    assert_eq!(int(&program, "z"), 20);
}

#[test]
fn relational_binds_looser_than_arithmetic() {
    let program = run("bool below = 1 + 2 < 2 * 2; bool equal = (2 < 3) == (3 < 2);");

    assert!(program.var::<bool>("below").unwrap());
    assert!(!program.var::<bool>("equal").unwrap());
}

#[test]
fn assignment_chains_right_to_left() {
    let program = run("int a; int b; a = b = 3;");

    assert_eq!(int(&program, "a"), 3);
    assert_eq!(int(&program, "b"), 3);
}

#[test]
fn compound_assignments() {
    let program = run("int x = 2; x += 3; int y = 7; y -= 2; int m = 4; m *= 2; int d = 9; d /= 3;");

    assert_eq!(int(&program, "x"), 5);
    assert_eq!(int(&program, "y"), 5);
    assert_eq!(int(&program, "m"), 8);
    assert_eq!(int(&program, "d"), 3);
}

#[test]
fn increment_and_decrement() {
    let program = run("int i = 5; int a = i++; int b = ++i; int c = i--; int d = --i;");

    assert_eq!(int(&program, "a"), 5);
    assert_eq!(int(&program, "b"), 7);
    assert_eq!(int(&program, "c"), 7);
    assert_eq!(int(&program, "d"), 5);
    assert_eq!(int(&program, "i"), 5);
}

#[test]
fn inner_assignment_reaches_ancestor_scope() {
    let program = run("int x = 1; { int y = 5; x = y; }");

    assert_eq!(int(&program, "x"), 5);
}

#[test]
fn shadowing_leaves_the_outer_binding_alone() {
    let program = run("int x = 1; { int x = 2; x = 3; }");

    assert_eq!(int(&program, "x"), 1);
}

#[test]
fn while_loops() {
    let program = run("int n = 0; int steps = 0; while (n < 100) { n = n + 17; steps = steps + 1; }");

    assert_eq!(int(&program, "n"), 102);
    assert_eq!(int(&program, "steps"), 6);
}

#[test]
fn for_loop_with_break() {
    let program = run("int s = 0; for (int i = 0; i < 10; ++i) { if (i == 5) break; s = s + i; }");

    assert_eq!(int(&program, "s"), 10);
}

#[test]
fn for_loop_without_init_or_step() {
    let program = run("int i = 0; for (; i < 4;) i = i + 1;");

    assert_eq!(int(&program, "i"), 4);
}

#[test]
fn if_else_chains() {
    let source = "
        int classify(int n) {
            if (n < 0)
                return 0;
            else if (n == 0)
                return 1;
            else if (n < 10)
                return 2;
            else
                return 3;
        }

        int a = classify(0 - 5);
        int b = classify(0);
        int c = classify(7);
        int d = classify(99);
    ";
    let program = run(source);

    assert_eq!(int(&program, "a"), 0);
    assert_eq!(int(&program, "b"), 1);
    assert_eq!(int(&program, "c"), 2);
    assert_eq!(int(&program, "d"), 3);
}

#[test]
fn recursion_through_the_host() {
    let source = "
        int fibonacci_impl(int a, int b, int n) {
            if (n <= 0)
                return a;
            else
                return fibonacci_impl(b, a + b, n - 1);
        }

        int fibonacci(int n) {
            return fibonacci_impl(0, 1, n);
        }
    ";
    let mut program = run(source);

    let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34];
    for (n, want) in expected.into_iter().enumerate() {
        let result = program.call("fibonacci", &[Value::from(n as i64)]).unwrap();
        assert_eq!(as_int(&result), want, "fibonacci({n})");
    }
}

#[test]
fn strings_concatenate_and_compare() {
    let program = run(r#"string s = "foo" + "bar"; bool same = s == "foobar"; bool before = "abc" < "abd";"#);

    assert_eq!(program.var::<String>("s").unwrap(), "foobar");
    assert!(program.var::<bool>("same").unwrap());
    assert!(program.var::<bool>("before").unwrap());
}

#[test]
fn char_literals() {
    let program = run(r"char c = 'x'; char newline = '\n'; bool same = c == 'x';");

    assert_eq!(program.var::<char>("c").unwrap(), 'x');
    assert_eq!(program.var::<char>("newline").unwrap(), '\n');
    assert!(program.var::<bool>("same").unwrap());
}

#[test]
fn literal_typing_follows_suffixes() {
    let program = run("float f = 1.5f; double d = 1.5; int i = 3;");

    assert_eq!(program.get("f").unwrap().type_name(), "float");
    assert_eq!(program.get("d").unwrap().type_name(), "double");
    assert_eq!(program.get("i").unwrap().type_name(), "int");
    assert!((program.var::<f32>("f").unwrap() - 1.5).abs() < f32::EPSILON);
}

#[test]
fn numeric_conversions_follow_c() {
    let program = run("double d = 1; int whole = 7 / 2; double frac = 7.0 / 2; int back = int(7.9); u8 wrapped = u8(300);");

    assert!((program.var::<f64>("d").unwrap() - 1.0).abs() < f64::EPSILON);
    assert_eq!(int(&program, "whole"), 3);
    assert!((program.var::<f64>("frac").unwrap() - 3.5).abs() < f64::EPSILON);
    assert_eq!(int(&program, "back"), 7);
    assert_eq!(program.var::<u8>("wrapped").unwrap(), 44);
}

#[test]
fn struct_methods_observe_their_instance() {
    let source = "
        struct Number {
            void set(int n) {
                number = n;
            }
            int get() {
                return number;
            }

            void add(float n) {
                number = number + n;
            }

            int number;
        };

        Number x;
        x.set(10);
    ";
    let mut program = run(source);

    let got = program.call_method("x", "get", &[]).unwrap();
    assert_eq!(as_int(&got), 10);

    program.call_method("x", "set", &[Value::from(32i64)]).unwrap();
    let current = program.call_method("x", "get", &[]).unwrap();
    program.call_method("x", "add", &[current]).unwrap();

    let total = program.call_method("x", "get", &[]).unwrap();
    assert_eq!(as_int(&total), 64);
}

#[test]
fn aggregate_copies_are_independent() {
    let source = "
        struct Counter {
            void bump() {
                count = count + 1;
            }
            int count;
        };

        Counter a;
        a.bump();
        Counter b = a;
        b.bump();
        b.bump();

        int from_a = a.count;
        int from_b = b.count;
    ";
    let program = run(source);

    assert_eq!(int(&program, "from_a"), 1);
    assert_eq!(int(&program, "from_b"), 3);
}

#[test]
fn nested_aggregate_members() {
    let source = "
        struct Inner {
            int v;
        };

        struct Outer {
            Inner inner;
            int tag;
        };

        Outer o;
        o.inner.v = 3;
        o.tag = o.inner.v + 1;
    ";
    let program = run(source);

    assert_eq!(int(&program, "tag"), 4);
}

#[test]
fn struct_declaration_requires_trailing_semicolon() {
    let compiler = Compiler::new();
    let error = compiler.compile("struct S { int v; } int x = 1;").expect_err("should not parse");

    assert!(error.to_string().contains("Expected ';'"), "{error}");
}

#[test]
fn parse_errors_carry_locations() {
    let compiler = Compiler::new();
    let source = "int x = 1;\nint y = ;\n";
    let error = compiler.compile(source).expect_err("should not parse");

    assert_eq!(error.location().line, 2);
    let shown = error.show("<test>", source);
    assert!(shown.contains("int y = ;"), "{shown}");
    assert!(shown.contains('~'), "{shown}");
}

#[test]
fn type_mismatch_on_declaration() {
    let error = run_err(r#"int x = "hi";"#);

    assert_eq!(error.kind(), ErrorKind::Type);
}

#[test]
fn unknown_variable_is_a_name_error() {
    let error = run_err("int x = missing + 1;");

    assert_eq!(error.kind(), ErrorKind::Name);
}

#[test]
fn unknown_member_is_a_type_error() {
    let error = run_err("struct S { int v; }; S s; s.w = 1;");

    assert_eq!(error.kind(), ErrorKind::Type);
}

#[test]
fn integer_division_by_zero() {
    let error = run_err("int x = 1 / 0;");

    assert_eq!(error.kind(), ErrorKind::Runtime);
    assert!(error.to_string().contains("Division by zero"), "{error}");
}

#[test]
fn stray_break_is_rejected() {
    let error = run_err("break;");

    assert_eq!(error.kind(), ErrorKind::Runtime);
}

#[test]
fn missing_return_value_is_rejected() {
    let error = run_err("int f() { return; } int x = f();");

    assert!(error.to_string().contains("return type"), "{error}");
}

#[test]
fn runaway_recursion_is_cut_off() {
    let error = run_err("void f() { f(); } f();");

    assert!(error.to_string().contains("Recursion"), "{error}");
}

#[test]
fn fresh_programs_run_identically() {
    let source = "
        int acc = 0;
        for (int i = 1; i < 5; ++i)
            acc = acc * 10 + i;
    ";
    let first = run(source);
    let second = run(source);

    assert_eq!(int(&first, "acc"), 1234);
    assert_eq!(int(&first, "acc"), int(&second, "acc"));
}

fn as_int(value: &Value) -> i64 {
    lilt::FromValue::from_value(value).expect("call should produce an int")
}
