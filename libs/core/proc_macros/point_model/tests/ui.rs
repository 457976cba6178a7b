//! UI tests for compile-time error checking

#[test]
fn ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/missing_point_type.rs");
    t.compile_fail("tests/ui/empty_point_type.rs");
    t.compile_fail("tests/ui/point_type_field.rs");
    t.compile_fail("tests/ui/missing_vector.rs");
    t.pass("tests/ui/basic.rs");
}
