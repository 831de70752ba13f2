use std::{cell::RefCell, rc::Rc};

use lilt::{Compiler, ErrorKind, FromValue, Location, RuntimeError, Value};

#[derive(Clone, Default, PartialEq, Debug)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

fn bind_vec3(compiler: &mut Compiler) {
    compiler.bind_type::<Vec3>("Vec3")
            .ctor(|s: String| {
                let v: f32 = s.parse().unwrap_or(0.0);
                Vec3 { x: v, y: v, z: v }
            })
            .ctor(|v: f32| Vec3 { x: v, y: v, z: v })
            .ctor(|x: f32, y: f32, z: f32| Vec3 { x, y, z })
            .field("x", |v: &mut Vec3| &mut v.x)
            .field("y", |v: &mut Vec3| &mut v.y)
            .field("z", |v: &mut Vec3| &mut v.z);
}

#[derive(Clone, Default, PartialEq, Debug)]
struct IntVector {
    items: Vec<i64>,
}

fn bind_vector(compiler: &mut Compiler) {
    compiler.bind_type::<IntVector>("vector")
            .ctor(|n: i64| IntVector { items: vec![0; n.max(0) as usize] })
            .method("push", |v: &mut IntVector, n: i64| v.items.push(n))
            .method("size", |v: &mut IntVector| v.items.len() as i64)
            .indexer(|v: &IntVector, i: i64| {
                         v.items
                          .get(i as usize)
                          .copied()
                          .ok_or(RuntimeError::IndexOutOfRange { index:    i,
                                                                 length:   v.items.len(),
                                                                 location: Location::default(), })
                     },
                     |v: &mut IntVector, i: i64, value: i64| {
                         let length = v.items.len();
                         match v.items.get_mut(i as usize) {
                             Some(slot) => {
                                 *slot = value;
                                 Ok(())
                             },
                             None => Err(RuntimeError::IndexOutOfRange { index: i,
                                                                         length,
                                                                         location:
                                                                             Location::default() }),
                         }
                     });
}

#[test]
fn hello_world_reaches_the_host() {
    let output = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&output);

    let mut compiler = Compiler::new();
    compiler.bind("prints", move |s: String| {
                let mut buffer = sink.borrow_mut();
                buffer.push_str(&s);
                buffer.push('\n');
            });

    let mut program = compiler.compile(r#"prints("Hello World!");"#).unwrap();
    program.run().unwrap();

    assert_eq!(*output.borrow(), "Hello World!\n");
}

#[test]
fn host_functions_take_and_return_values() {
    let mut compiler = Compiler::new();
    compiler.bind("add", |a: i64, b: i64| a + b);
    compiler.bind("halve", |x: f64| x / 2.0);

    let mut program = compiler.compile("int s = add(20, 22); double h = halve(5);").unwrap();
    program.run().unwrap();

    assert_eq!(program.var::<i64>("s").unwrap(), 42);
    assert!((program.var::<f64>("h").unwrap() - 2.5).abs() < f64::EPSILON);
}

#[test]
fn void_host_result_cannot_initialize_a_variable() {
    let mut compiler = Compiler::new();
    compiler.bind("noop", || {});

    let mut program = compiler.compile("int x = noop();").unwrap();
    let error = program.run().expect_err("void cannot become int");

    assert_eq!(error.kind(), ErrorKind::Type);
}

#[test]
fn constructor_overloads_dispatch_on_argument_types() {
    let mut compiler = Compiler::new();
    bind_vec3(&mut compiler);

    let source = r#"
        Vec3 from_string = Vec3("5");
        Vec3 from_scalar = Vec3(4);
        Vec3 from_parts = Vec3(1, 2, 3);
    "#;
    let mut program = compiler.compile(source).unwrap();
    program.run().unwrap();

    assert_eq!(program.var::<Vec3>("from_string").unwrap(),
               Vec3 { x: 5.0, y: 5.0, z: 5.0 });
    assert_eq!(program.var::<Vec3>("from_scalar").unwrap(),
               Vec3 { x: 4.0, y: 4.0, z: 4.0 });
    assert_eq!(program.var::<Vec3>("from_parts").unwrap(),
               Vec3 { x: 1.0, y: 2.0, z: 3.0 });
}

#[test]
fn missing_constructor_overload_is_reported() {
    let mut compiler = Compiler::new();
    bind_vec3(&mut compiler);

    let mut program = compiler.compile("Vec3 v = Vec3(1, 2);").unwrap();
    let error = program.run().expect_err("no two-argument overload");

    assert_eq!(error.kind(), ErrorKind::Type);
    assert!(error.to_string().contains("constructor"), "{error}");
}

#[test]
fn host_fields_read_and_write_from_scripts() {
    let mut compiler = Compiler::new();
    bind_vec3(&mut compiler);

    let source = "
        Vec3 v = Vec3(1, 2, 3);
        float x = v.x;
        v.y = 9f;
        v.z = v.z + 1f;
    ";
    let mut program = compiler.compile(source).unwrap();
    program.run().unwrap();

    assert!((program.var::<f32>("x").unwrap() - 1.0).abs() < f32::EPSILON);
    assert_eq!(program.var::<Vec3>("v").unwrap(),
               Vec3 { x: 1.0, y: 9.0, z: 4.0 });
}

#[test]
fn indexing_reads_and_writes_host_elements() {
    let mut compiler = Compiler::new();
    bind_vector(&mut compiler);

    let source = "
        vector v = vector(1);
        v[0] = 10;
        int first = v[0];
    ";
    let mut program = compiler.compile(source).unwrap();
    program.run().unwrap();

    assert_eq!(program.var::<i64>("first").unwrap(), 10);
    assert_eq!(program.var::<IntVector>("v").unwrap().items, vec![10]);
}

#[test]
fn out_of_range_index_raises_a_range_error() {
    let mut compiler = Compiler::new();
    bind_vector(&mut compiler);

    let source = "
        vector v = vector(1);
        int x = v[1];
    ";
    let mut program = compiler.compile(source).unwrap();
    let error = program.run().expect_err("index 1 is out of range");

    assert_eq!(error.kind(), ErrorKind::Range);
    assert_eq!(error.location().line, 3);
}

#[test]
fn host_methods_mutate_the_receiver() {
    let mut compiler = Compiler::new();
    bind_vector(&mut compiler);

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

        vector list = vector(0);
        for (int i = 0; i < 5; ++i)
            list.push(fibonacci(i));
    ";
    let mut program = compiler.compile(source).unwrap();
    program.run().unwrap();

    // Keep extending the same list from the host side.
    for n in 5i64..10 {
        let next = program.call("fibonacci", &[Value::from(n)]).unwrap();
        program.call_method("list", "push", &[next]).unwrap();
    }

    assert_eq!(program.var::<IntVector>("list").unwrap().items,
               vec![0, 1, 1, 2, 3, 5, 8, 13, 21, 34]);

    let size = program.call_method("list", "size", &[]).unwrap();
    let size: i64 = FromValue::from_value(&size).unwrap();
    assert_eq!(size, 10);
}

#[test]
fn numeric_arguments_convert_at_the_boundary() {
    let mut compiler = Compiler::new();
    compiler.bind("takes_float", |x: f32| f64::from(x) * 2.0);

    let mut program = compiler.compile("double d = takes_float(3);").unwrap();
    program.run().unwrap();

    assert!((program.var::<f64>("d").unwrap() - 6.0).abs() < f64::EPSILON);
}

#[test]
fn host_writes_are_visible_to_later_calls() {
    let compiler = Compiler::new();

    let source = "
        int seed = 1;

        int doubled() {
            return seed * 2;
        }
    ";
    let mut program = compiler.compile(source).unwrap();
    program.run().unwrap();

    program.set("seed", 21i64).unwrap();
    let result = program.call("doubled", &[]).unwrap();
    let result: i64 = FromValue::from_value(&result).unwrap();

    assert_eq!(result, 42);
}

#[test]
fn zero_values_come_from_default_instances() {
    let mut compiler = Compiler::new();
    bind_vector(&mut compiler);

    let mut program = compiler.compile("vector empty;").unwrap();
    program.run().unwrap();

    assert_eq!(program.var::<IntVector>("empty").unwrap().items, Vec::<i64>::new());
}
