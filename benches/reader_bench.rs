use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glisp::{Environment, load_str, tokenize};

const PROGRAM: &str = r#"
(defn fib [n]
  ; Calculate the nth Fibonacci number
  (if (< n 2)
      n
      (+ (fib (- n 1))
         (fib (- n 2)))))

(def table {:hex 0x1F :oct 017 :bin 0b101 :float -45.67e2})
(defmac unless [test & body]
  `(if ~test () (begin ~@body)))
'("string with escapes \"\n\r\t\"" true false 123 #\a (1 2 . 3))
"#;

// Repeats the sample so the input is a few hundred forms long.
fn bench_input(copies: usize) -> String {
    PROGRAM.repeat(copies)
}

fn bench_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reader");

    for copies in [1, 64] {
        let input = bench_input(copies);
        group.bench_with_input(BenchmarkId::new("tokenize", copies), &input, |b, input| {
            b.iter(|| tokenize(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("load_str", copies), &input, |b, input| {
            b.iter(|| {
                let mut env = Environment::new();
                load_str(black_box(input), &mut env)
            })
        });
    }

    group.finish();
}

fn bench_long_list(c: &mut Criterion) {
    let input = format!("({})", "42 ".repeat(100_000));
    c.bench_function("load_str long list", |b| {
        b.iter(|| {
            let mut env = Environment::new();
            load_str(black_box(&input), &mut env)
        })
    });
}

criterion_group!(benches, bench_reader, bench_long_list);
criterion_main!(benches);
