//! End-to-end program scenarios, run through the public embedding API.

use std::io::Write;

use moha::{run_file, CollectStringPrint, NoopTracer, ResourceLimits};
use pretty_assertions::assert_eq;

fn run_source(source: &str) -> String {
    let dir = std::env::temp_dir().join(format!("moha-scenario-{}-{}", std::process::id(), fastrand_stub()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("main.mo");
    std::fs::File::create(&file).unwrap().write_all(source.as_bytes()).unwrap();

    let mut print = CollectStringPrint::new();
    let mut tracer = NoopTracer;
    run_file(&file, ResourceLimits::default(), &mut print, &mut tracer).unwrap();

    let _ = std::fs::remove_dir_all(&dir);
    print.into_string()
}

/// A counter is enough to keep concurrent test runs from colliding on the
/// same temp directory; no real randomness needed.
fn fastrand_stub() -> usize {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[test]
fn prints_a_string_literal() {
    assert_eq!(run_source(r#"print("hello");"#), "hello\n");
}

#[test]
fn calls_a_function_with_two_arguments() {
    let source = r"
        def add(a, b) {
            return a + b;
        }
        print(add(2, 3));
    ";
    assert_eq!(run_source(source), "5\n");
}

#[test]
fn recursive_factorial_via_juxtaposed_guards() {
    let source = r"
        def fact(n) {
            if (n == 0) { return 1; } (n > 0) { return n * fact(n - 1); }
        }
        print(fact(5));
    ";
    assert_eq!(run_source(source), "120\n");
}

#[test]
fn recursive_factorial_via_comma_separated_guards() {
    let source = r"
        def fact(n) {
            if (n == 0) { return 1; }, (n > 0) { return n * fact(n - 1); };
        }
        print(fact(5));
    ";
    assert_eq!(run_source(source), "120\n");
}

#[test]
fn array_push_and_length() {
    let source = r"
        a = [];
        a.push(1);
        a.push(2);
        a.push(3);
        print(a.length());
    ";
    assert_eq!(run_source(source), "3\n");
}

#[test]
fn object_attribute_get_and_set() {
    let source = r#"
        o = {"x": 1};
        o.y = 2;
        print(o.x + o.y);
    "#;
    assert_eq!(run_source(source), "3\n");
}

#[test]
fn do_loop_accumulates_a_sum() {
    let source = r"
        i = 0;
        s = 0;
        do (i < 5) {
            s = s + i;
            i = i + 1;
        }
        print(s);
    ";
    assert_eq!(run_source(source), "10\n");
}

#[test]
fn import_exposes_exported_names_across_files() {
    let dir = std::env::temp_dir().join(format!("moha-import-test-{}-{}", std::process::id(), fastrand_stub()));
    std::fs::create_dir_all(&dir).unwrap();

    let lib_path = dir.join("lib.mo");
    std::fs::File::create(&lib_path)
        .unwrap()
        .write_all(
            br"
                def square(n) {
                    return n * n;
                }
                export square;
            ",
        )
        .unwrap();

    let main_path = dir.join("main.mo");
    std::fs::File::create(&main_path)
        .unwrap()
        .write_all(
            br#"
                from "./lib" import square;
                print(square(6));
            "#,
        )
        .unwrap();

    let mut print = CollectStringPrint::new();
    let mut tracer = NoopTracer;
    run_file(&main_path, ResourceLimits::default(), &mut print, &mut tracer).unwrap();
    assert_eq!(print.into_string(), "36\n");

    let _ = std::fs::remove_dir_all(&dir);
}
