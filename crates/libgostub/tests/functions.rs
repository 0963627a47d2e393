//! Functions and methods: signatures are kept, bodies replaced.
mod utils;
use libgostub::FunctionBodies;
use utils::*;

gen_tests! {
    functions, {
        idemp {
            stub_bodies_are_kept: r#"
                func Foo(e bool) error {
                    panic("stub")
                }
            "#
        }
        rt {
            basic: {
                input: r#"
                    func Foo(e bool) error {
                        if !e {
                            return nil
                        }
                        return errors.New("error")
                    }
                "#,
                output: r#"
                    func Foo(e bool) error {
                        panic("stub")
                    }
                "#
            }
        }
        rt {
            unexported_skipped: {
                input: r#"
                    func foo() {}
                    func main() {}
                "#,
                output: ""
            }
        }
        rt {
            signatures: {
                input: r#"
                    func Div(a, b int) (int, error) { return a / b, nil }
                    func Named() (n int, err error) { return }
                    func Log(format string, args ...interface{}) {}
                    func Apply(f func(int) int, xs ...int) []int { return nil }
                    func Map[K comparable, V any](m map[K]V) []K { return nil }
                "#,
                output: r#"
                    func Div(a, b int) (int, error) {
                        panic("stub")
                    }
                    func Named() (n int, err error) {
                        panic("stub")
                    }
                    func Log(format string, args ...interface{}) {
                        panic("stub")
                    }
                    func Apply(f func(int) int, xs ...int) []int {
                        panic("stub")
                    }
                    func Map[K comparable, V any](m map[K]V) []K {
                        panic("stub")
                    }
                "#
            }
        }
        rt {
            erased_parameters: {
                input: r#"
                    import (
                        "io"

                        corev1 "k8s.io/api/core/v1"
                    )

                    func Baz(pod *corev1.Pod, writer io.Writer) (*corev1.Pod, error) {
                        return pod, nil
                    }
                "#,
                output: r#"
                    import "io"
                    func Baz(pod interface{}, writer io.Writer) (interface{}, error) {
                        panic("stub")
                    }
                "#
            }
        }
        rt {
            methods: {
                input: r#"
                    type List[T any] []T

                    type S struct{}

                    func (s S) Get() string { return "" }
                    func (s *S) set(v string) {}
                    func (S) Unnamed() {}
                    func (l *List[T]) Len() int { return len(*l) }
                "#,
                output: r#"
                    type List[T any] []T
                    type S struct{}
                    func (s S) Get() string {
                        panic("stub")
                    }
                    func (l *List[T]) Len() int {
                        panic("stub")
                    }
                "#
            }
        }
        rt_custom {
            function_bodies: {
                gostub: |g| g.with_function_bodies(
                    FunctionBodies::from_pairs([
                        ("stub.Foo", "return nil"),
                        ("stub.(*S).Get", "return s.name"),
                        ("stub.(List).Len", "return 0"),
                        ("other.Foo", "return nil"),
                    ])
                    .unwrap(),
                ),
                input: r#"
                    type List[T any] []T

                    type S struct{}

                    func Foo() error { return nil }
                    func (s *S) Get() string { return "" }
                    func (l *List[T]) Len() int { return len(*l) }
                "#,
                output: r#"
                    type List[T any] []T
                    type S struct{}
                    func Foo() error {
                        return nil
                    }
                    func (s *S) Get() string {
                        return s.name
                    }
                    func (l *List[T]) Len() int {
                        return 0
                    }
                "#
            }
        }
        rt_err {
            multiple_receiver_names: {
                gostub: |g| g,
                input: r#"
                    type S struct{}

                    func (a, b S) M() {}
                "#,
                error: "Malformed receiver for stub.M"
            }
        }
        rt_err {
            syntax_error: {
                gostub: |g| g,
                input: r#"
                    func {
                "#,
                error: "Failed to parse"
            }
        }
    }
}
